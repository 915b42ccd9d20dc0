use crate::Error;

/// Decoded view of the GT911 status byte at the `PointStatus` register.
///
/// The controller sets [`buffer_ready`](Self::buffer_ready) once a coordinate
/// report has been latched into the point buffer, and keeps it set until the
/// host writes the register back to zero. While the flag is clear the rest of
/// the byte is stale and the point buffer must not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
  /// A coordinate report is latched and waiting for the host.
  pub buffer_ready: bool,
  /// Large-area contact (possibly a palm) detected by the controller itself.
  pub large_detect: bool,
  /// Proximity sensing output is valid. Undocumented on most panels.
  pub proximity_valid: bool,
  /// A capacitive touch key is currently pressed.
  pub touch_key: bool,
  /// Raw point count nibble, unvalidated. See [`Status::touches`].
  pub points_raw: u8,
}

impl Status {
  const BUFFER_READY: u8 = 0b1000_0000;
  const LARGE_DETECT: u8 = 0b0100_0000;
  const PROXIMITY_VALID: u8 = 0b0010_0000;
  const TOUCH_KEY: u8 = 0b0001_0000;
  const POINT_COUNT: u8 = 0b0000_1111;

  /// Decode a raw status byte. Total: every byte value decodes.
  pub const fn from_byte(byte: u8) -> Self {
    Self {
      buffer_ready: byte & Self::BUFFER_READY != 0,
      large_detect: byte & Self::LARGE_DETECT != 0,
      proximity_valid: byte & Self::PROXIMITY_VALID != 0,
      touch_key: byte & Self::TOUCH_KEY != 0,
      points_raw: byte & Self::POINT_COUNT,
    }
  }

  /// Validated number of touch points in this report.
  ///
  /// The controller never reports more than five contacts; a nibble of 6..=15
  /// means the status byte is corrupt and the whole cycle must be abandoned
  /// without touching the point buffer or the handshake register.
  pub fn touches<E>(&self) -> Result<u8, Error<E>> {
    if self.points_raw as usize > crate::MAX_POINTS {
      return Err(Error::InvalidPointCount(self.points_raw));
    }
    Ok(self.points_raw)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Error;

  #[test]
  fn decodes_all_flags() {
    let status = Status::from_byte(0b1111_0011);
    assert!(status.buffer_ready);
    assert!(status.large_detect);
    assert!(status.proximity_valid);
    assert!(status.touch_key);
    assert_eq!(status.points_raw, 3);
  }

  #[test]
  fn idle_byte_decodes_to_nothing() {
    let status = Status::from_byte(0x00);
    assert!(!status.buffer_ready);
    assert_eq!(status.points_raw, 0);
    assert_eq!(status.touches::<()>().unwrap(), 0);
  }

  #[test]
  fn count_nibble_above_five_is_a_protocol_fault() {
    for nibble in 6..=15u8 {
      let status = Status::from_byte(0x80 | nibble);
      assert!(matches!(status.touches::<()>(), Err(Error::InvalidPointCount(n)) if n == nibble));
    }
  }

  #[test]
  fn every_byte_value_decodes() {
    for byte in 0..=255u8 {
      let status = Status::from_byte(byte);
      assert_eq!(status.points_raw, byte & 0x0F);
      assert_eq!(status.buffer_ready, byte & 0x80 != 0);
    }
  }
}
