#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Polling async `no_std` driver for the Goodix GT911 capacitive touchscreen
//! controller.
//!
//! The GT911 latches up to five contacts into a register-mapped point buffer
//! and flags their availability in a status byte. On boards where the INT line
//! is not wired up the only option is to poll, and polling a touch controller
//! correctly is fiddlier than it looks: the status flag must be cleared
//! exactly once per consumed report, a corrupt report must abandon the cycle
//! without clearing anything, and raw per-cycle contact sets must be diffed
//! into per-finger press/move/release events that never repeat or go missing.
//! This crate packages that whole cycle:
//!
//! - Typed access to the GT911 register map over `embedded-hal-async` I²C
//! - Status-byte decoding with point-count validation
//! - Bounds-checked decoding of the fixed-width point records
//! - The read-then-clear buffer handshake, ordered so a failed bus write can
//!   never lose or duplicate an event
//! - A [`Tracker`] state machine giving contacts stable slots across cycles
//! - A [`Touchscreen`] facade running the fixed-period poll loop, with
//!   optional axis swap/inversion, scaling, and clamping of emitted
//!   coordinates
//!
//! ```no_run
//! use embedded_hal_async::{delay::DelayNs, i2c::{I2c, SevenBitAddress}};
//! use gt911_poll::{Config, Touchscreen, TouchPhase};
//!
//! async fn example<I2C, D, E>(i2c: I2C, delay: D) -> Result<(), gt911_poll::Error<E>>
//! where
//!   I2C: I2c<SevenBitAddress, Error = E>,
//!   D: DelayNs,
//! {
//!   let mut screen = Touchscreen::new(i2c, delay, Config::default());
//!   let panel = screen.initialize().await?;
//!   let _ = panel.resolution;
//!
//!   loop {
//!     let frame = screen.next_frame().await?;
//!     for event in frame.events.iter() {
//!       match event.phase {
//!         TouchPhase::Start => { /* finger down at (event.x, event.y) */ }
//!         TouchPhase::Move => { /* finger moved */ }
//!         TouchPhase::End => { /* finger lifted */ }
//!       }
//!     }
//!   }
//! }
//! ```
mod config;
mod point;
mod reg;
mod screen;
mod status;
mod tracker;

use embedded_hal_async::i2c::{I2c, SevenBitAddress};

pub use config::Config;
pub use point::{Snapshot, TouchPoint};
pub use reg::{ALTERNATE_I2C_ADDR, DEFAULT_I2C_ADDR, MAX_POINTS};
pub use screen::{Frame, Stream, Touchscreen};
pub use status::Status;
pub use tracker::{Events, TouchEvent, TouchPhase, Track, Tracker, TrackerUpdate};

use reg::{Reg, POINT_RECORD_LEN, PRODUCT_ID};

/// Errors that can occur while interacting with the controller.
///
/// None of these is fatal to a polling loop: a bad cycle leaves the tracker
/// state untouched and the next poll is the retry. Persistent bus failure
/// policy (give-up threshold, backoff) belongs to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
  /// I²C bus transaction failed with the underlying driver error.
  I2c(E),
  /// The device did not identify itself as a GT911 during bring-up.
  InvalidProductId([u8; 4]),
  /// The status byte claims more points than the protocol allows (6..=15).
  InvalidPointCount(u8),
  /// The point buffer was shorter than the report claims.
  Truncated { needed: usize, got: usize },
}

/// Panel details captured during [`Gt911::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Panel {
  /// Firmware version word.
  pub firmware: u16,
  /// Coordinate resolution `(x, y)` the controller reports positions in.
  pub resolution: (u16, u16),
  /// Configured output maxima `(x, y)` from the configuration area.
  pub boundary: (u16, u16),
}

/// Register-level driver for the GT911.
///
/// Owns the I²C peripheral and exposes the primitives of one poll cycle:
/// [`status`](Self::status), [`points`](Self::points) and
/// [`acknowledge`](Self::acknowledge). Most users want the [`Touchscreen`]
/// facade instead, which sequences these correctly and layers identity
/// tracking on top. The GT911 expects one read/clear cycle to finish before
/// the next begins, so the driver is strictly single-writer; do not share the
/// bus address across concurrent pollers.
pub struct Gt911<I> {
  i2c: I,
  address: u8,
}

impl<I, E> Gt911<I>
where
  I: I2c<SevenBitAddress, Error = E>,
{
  /// Create a new driver instance on the given bus address.
  pub fn new(i2c: I, address: u8) -> Self {
    Self { i2c, address }
  }

  /// Release the underlying I²C peripheral.
  pub fn into_inner(self) -> I {
    self.i2c
  }

  /// Verify the product identifier and capture panel details.
  ///
  /// Fails with [`Error::InvalidProductId`] when the chip at the configured
  /// address does not answer as a GT911. Does not write any configuration to
  /// the controller.
  pub async fn initialize(&mut self) -> Result<Panel, Error<E>> {
    let mut id = [0u8; 4];
    self.read_bytes(Reg::ProductId, &mut id).await?;
    if id != PRODUCT_ID {
      return Err(Error::InvalidProductId(id));
    }

    let firmware = self.read_u16(Reg::FirmwareVersion).await?;
    let resolution = (self.read_u16(Reg::XResolution).await?, self.read_u16(Reg::YResolution).await?);
    let boundary = (self.read_u16(Reg::XOutputMax).await?, self.read_u16(Reg::YOutputMax).await?);
    Ok(Panel { firmware, resolution, boundary })
  }

  /// Read and decode the status byte.
  pub async fn status(&mut self) -> Result<Status, Error<E>> {
    let mut byte = [0u8];
    self.read_bytes(Reg::PointStatus, &mut byte).await?;
    Ok(Status::from_byte(byte[0]))
  }

  /// Bulk-read `count` point records from the coordinate buffer.
  ///
  /// Only valid while the status byte has its buffer-ready flag set; the
  /// records are stale otherwise. `count` above [`MAX_POINTS`] fails with
  /// [`Error::InvalidPointCount`] without touching the bus, so an unvalidated
  /// [`Status::points_raw`] nibble can be forwarded here directly.
  pub async fn points(&mut self, count: u8) -> Result<Snapshot, Error<E>> {
    if count as usize > MAX_POINTS {
      return Err(Error::InvalidPointCount(count));
    }
    if count == 0 {
      return Ok(Snapshot::default());
    }
    let mut buffer = [0u8; MAX_POINTS * POINT_RECORD_LEN];
    let len = count as usize * POINT_RECORD_LEN;
    self.read_bytes(Reg::PointBase, &mut buffer[..len]).await?;
    Snapshot::parse(&buffer[..len], count)
  }

  /// Clear the status register, re-arming the controller for the next report.
  ///
  /// Must happen exactly once per successfully read report: skipping it stalls
  /// the controller (ready is never re-asserted), and it must never be written
  /// while the ready flag is clear, which would race the controller's own
  /// update. There is no retry here; a failed write fails the cycle and the
  /// next status read is the retry signal.
  pub async fn acknowledge(&mut self) -> Result<(), Error<E>> {
    self.write_byte(Reg::PointStatus, 0).await
  }

  // Register helpers. GT911 registers are 16-bit big-endian addresses;
  // multi-byte values are little-endian.
  async fn read_bytes(&mut self, reg: Reg, buf: &mut [u8]) -> Result<(), Error<E>> {
    let addr = u16::from(reg).to_be_bytes();
    self.i2c.write_read(self.address, &addr, buf).await.map_err(Error::I2c)
  }

  async fn read_u16(&mut self, reg: Reg) -> Result<u16, Error<E>> {
    let mut buf = [0u8; 2];
    self.read_bytes(reg, &mut buf).await?;
    Ok(u16::from_le_bytes(buf))
  }

  async fn write_byte(&mut self, reg: Reg, value: u8) -> Result<(), Error<E>> {
    let addr = u16::from(reg).to_be_bytes();
    self.i2c.write(self.address, &[addr[0], addr[1], value]).await.map_err(Error::I2c)
  }
}
