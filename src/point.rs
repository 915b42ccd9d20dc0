use heapless::Vec;

use crate::reg::{MAX_POINTS, POINT_RECORD_LEN};
use crate::Error;

/// One contact as reported by the controller in a single coordinate report.
///
/// Coordinates are in the raw controller coordinate space; consumers apply
/// their own calibration or the transforms configured on the
/// [`Touchscreen`](crate::Touchscreen) facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchPoint {
  /// Controller-assigned track id, stable while the finger stays down.
  pub id: u8,
  pub x: u16,
  pub y: u16,
  /// Contact area in device-specific units.
  pub area: u16,
}

impl TouchPoint {
  /// Decode one 8-byte point record:
  /// `[id, x_lo, x_hi, y_lo, y_hi, area_lo, area_hi, reserved]`.
  fn from_record(record: &[u8]) -> Self {
    Self {
      id: record[0],
      x: u16::from_le_bytes([record[1], record[2]]),
      y: u16::from_le_bytes([record[3], record[4]]),
      area: u16::from_le_bytes([record[5], record[6]]),
    }
  }
}

/// The set of contacts captured in one poll cycle, in controller order.
///
/// Order is whatever the controller reported and is not stable across cycles;
/// the [`Tracker`](crate::Tracker) is what gives contacts a continuous
/// identity. Duplicate ids within one snapshot are a controller anomaly and
/// are passed through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
  points: Vec<TouchPoint, MAX_POINTS>,
}

impl Snapshot {
  /// Decode `count` fixed-width point records from the raw coordinate buffer.
  ///
  /// Fails with [`Error::Truncated`] when the buffer is shorter than the
  /// report claims, in which case the whole cycle is abandoned and the
  /// handshake register left untouched so the controller re-asserts ready.
  pub fn parse<E>(buffer: &[u8], count: u8) -> Result<Self, Error<E>> {
    let count = count as usize;
    debug_assert!(count <= MAX_POINTS);
    let needed = count * POINT_RECORD_LEN;
    if buffer.len() < needed {
      return Err(Error::Truncated { needed, got: buffer.len() });
    }

    let mut points = Vec::new();
    for record in buffer[..needed].chunks_exact(POINT_RECORD_LEN) {
      // Cannot overflow: count is bounded by MAX_POINTS.
      let _ = points.push(TouchPoint::from_record(record));
    }
    Ok(Self { points })
  }

  /// Build a snapshot directly from decoded points. Mostly useful for feeding
  /// a [`Tracker`](crate::Tracker) without bus hardware.
  pub fn from_points(points: &[TouchPoint]) -> Self {
    let mut vec = Vec::new();
    for &point in points.iter().take(MAX_POINTS) {
      let _ = vec.push(point);
    }
    Self { points: vec }
  }

  pub fn iter(&self) -> impl Iterator<Item = &TouchPoint> + '_ {
    self.points.iter()
  }

  pub fn len(&self) -> usize {
    self.points.len()
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Error;

  fn record(id: u8, x: u16, y: u16, area: u16) -> [u8; 8] {
    let (x, y, area) = (x.to_le_bytes(), y.to_le_bytes(), area.to_le_bytes());
    [id, x[0], x[1], y[0], y[1], area[0], area[1], 0]
  }

  #[test]
  fn decodes_little_endian_records() {
    let mut buffer = [0u8; 16];
    buffer[..8].copy_from_slice(&record(3, 0x0123, 0x0456, 20));
    buffer[8..].copy_from_slice(&record(7, 100, 200, 5));

    let snapshot = Snapshot::parse::<()>(&buffer, 2).unwrap();
    let points: heapless::Vec<_, 5> = snapshot.iter().copied().collect();
    assert_eq!(points[0], TouchPoint { id: 3, x: 0x0123, y: 0x0456, area: 20 });
    assert_eq!(points[1], TouchPoint { id: 7, x: 100, y: 200, area: 5 });
  }

  #[test]
  fn zero_points_parses_to_empty_snapshot() {
    let snapshot = Snapshot::parse::<()>(&[], 0).unwrap();
    assert!(snapshot.is_empty());
  }

  #[test]
  fn short_buffer_is_truncated_not_silently_clipped() {
    let buffer = record(1, 10, 20, 30);
    let result = Snapshot::parse::<()>(&buffer[..6], 1);
    assert!(matches!(result, Err(Error::Truncated { needed: 8, got: 6 })));

    // Two records claimed, one and a half present.
    let mut long = [0u8; 12];
    long[..8].copy_from_slice(&buffer);
    let result = Snapshot::parse::<()>(&long, 2);
    assert!(matches!(result, Err(Error::Truncated { needed: 16, got: 12 })));
  }

  #[test]
  fn trailing_bytes_are_ignored() {
    let mut buffer = [0xAAu8; 24];
    buffer[..8].copy_from_slice(&record(2, 1, 2, 3));
    let snapshot = Snapshot::parse::<()>(&buffer, 1).unwrap();
    assert_eq!(snapshot.len(), 1);
  }

  #[test]
  fn duplicate_ids_pass_through() {
    let mut buffer = [0u8; 16];
    buffer[..8].copy_from_slice(&record(4, 10, 10, 1));
    buffer[8..].copy_from_slice(&record(4, 90, 90, 1));
    let snapshot = Snapshot::parse::<()>(&buffer, 2).unwrap();
    assert_eq!(snapshot.len(), 2);
  }
}
