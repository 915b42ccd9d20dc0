/******************************************************************************
 * Refer to the GT911 programming guide for more information:                 *
 * - GT911 Programming Guide v0.1, Goodix Technology                          *
 * ========================================================================== *
 *                        GT911 - Registers & Memory Map                      *
*******************************************************************************/

/// Default 7-bit bus address (ADDR strap low at reset).
pub const DEFAULT_I2C_ADDR: u8 = 0x5D;
/// Alternate 7-bit bus address (ADDR strap high at reset).
pub const ALTERNATE_I2C_ADDR: u8 = 0x14;

/// Number of contact slots the controller reports. Protocol constant, not
/// configurable.
pub const MAX_POINTS: usize = 5;

/// Width of one point record in the coordinate buffer.
pub(crate) const POINT_RECORD_LEN: usize = 8;

#[allow(dead_code)]
#[repr(u16)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Reg {
  // Configuration area (0x8047..0x80FE)
  ConfigVersion = 0x8047,
  XOutputMax = 0x8048,
  YOutputMax = 0x804A,
  TouchNumber = 0x804C,

  // Product information (0x8140..0x814B)
  ProductId = 0x8140,
  FirmwareVersion = 0x8144,
  XResolution = 0x8146,
  YResolution = 0x8148,
  VendorId = 0x814A,

  // Coordinate area (0x814E..0x8177)
  //
  // PointStatus doubles as the buffer handshake register: the controller sets
  // bit 7 when a report is ready and the host writes 0 to re-arm it.
  PointStatus = 0x814E,
  // First of up to five contiguous 8-byte point records.
  PointBase = 0x814F,
}

impl From<Reg> for u16 {
  #[inline]
  fn from(r: Reg) -> Self {
    r as u16
  }
}

/// ASCII product identifier reported at [`Reg::ProductId`].
pub(crate) const PRODUCT_ID: [u8; 4] = *b"911\0";
