use crate::reg::DEFAULT_I2C_ADDR;

/// Driver configuration.
///
/// Everything here is host-side policy; nothing is written to the controller
/// (firmware configuration is out of scope for this driver). Axis transforms
/// and scaling apply to emitted event coordinates only, after identity
/// tracking, so the tracker always operates in the raw controller space.
///
/// # Example
/// ```no_run
/// use gt911_poll::Config;
///
/// let config = Config::default()
///   .with_poll_interval_ms(15)
///   .with_swap_axes(true)
///   .with_invert_y(true);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
  /// 7-bit bus address of the controller. The GT911 straps to either
  /// [`DEFAULT_I2C_ADDR`] or [`crate::ALTERNATE_I2C_ADDR`] at reset.
  pub address: u8,
  /// Period of the polling loop in milliseconds.
  pub poll_interval_ms: u32,
  /// Report X as Y and Y as X. Applied after inversion.
  pub swap_axes: bool,
  /// Mirror the X axis against the panel resolution.
  pub invert_x: bool,
  /// Mirror the Y axis against the panel resolution.
  pub invert_y: bool,
  /// Multiply emitted coordinates by this factor.
  pub scale: u16,
  /// Clamp emitted coordinates to the panel resolution.
  pub clamp: bool,
}

impl Default for Config {
  fn default() -> Self {
    Self::new()
  }
}

impl Config {
  /// Configuration matching an unmodified panel: default address, 10 ms poll
  /// period, no transforms.
  pub const fn new() -> Self {
    Self {
      address: DEFAULT_I2C_ADDR,
      poll_interval_ms: 10,
      swap_axes: false,
      invert_x: false,
      invert_y: false,
      scale: 1,
      clamp: false,
    }
  }

  pub const fn with_address(mut self, address: u8) -> Self {
    self.address = address;
    self
  }

  pub const fn with_poll_interval_ms(mut self, poll_interval_ms: u32) -> Self {
    self.poll_interval_ms = poll_interval_ms;
    self
  }

  pub const fn with_swap_axes(mut self, swap_axes: bool) -> Self {
    self.swap_axes = swap_axes;
    self
  }

  pub const fn with_invert_x(mut self, invert_x: bool) -> Self {
    self.invert_x = invert_x;
    self
  }

  pub const fn with_invert_y(mut self, invert_y: bool) -> Self {
    self.invert_y = invert_y;
    self
  }

  pub const fn with_scale(mut self, scale: u16) -> Self {
    self.scale = scale;
    self
  }

  pub const fn with_clamp(mut self, clamp: bool) -> Self {
    self.clamp = clamp;
    self
  }
}
