//! Fixed-period poll-loop facade on top of [`Gt911`].
//!
//! One cycle runs status read → decode → point read → flag acknowledge →
//! identity tracking → coordinate transforms, in that order. The acknowledge
//! write happens *before* the tracker consumes the snapshot: if the write
//! fails, the cycle aborts with the tracker untouched and the un-cleared
//! controller re-asserts ready on the next poll, so no event is ever lost and
//! none is emitted twice. Any error leaves the tracker state byte-for-byte as
//! it was, and the next poll is the retry.
//!
//! The facade is strictly single-writer: one loop, one bus, one tracker. A
//! host that wants asynchronous event delivery should hand the emitted
//! [`TouchEvent`]s off through a single-producer queue rather than sharing the
//! facade.

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{I2c, SevenBitAddress};

use crate::tracker::{Events, TouchEvent, Tracker};
use crate::{Config, Error, Gt911, Panel, Status};

/// Everything observed in one poll cycle with a ready report.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
  /// The decoded status byte this cycle was driven by.
  pub status: Status,
  /// Per-finger transitions, releases first. Coordinates have the configured
  /// transforms applied; consumers map them through their own calibration.
  pub events: Events,
  /// Number of fingers on the panel after this cycle.
  pub touches: u8,
  /// Contacts dropped for lack of a free slot (diagnostic, normally zero).
  pub dropped: u8,
}

impl Frame {
  /// Check whether this cycle changed anything a consumer cares about.
  pub fn has_activity(&self) -> bool {
    !self.events.is_empty()
  }
}

/// Polling touchscreen engine: a [`Gt911`] plus a delay source, the identity
/// [`Tracker`], and the coordinate transform parameters.
///
/// Events are delivered in strict per-cycle order; all of cycle N precedes any
/// of cycle N+1. Tracker state is process-lifetime only — after a restart,
/// fingers still on the panel re-report as fresh presses.
pub struct Touchscreen<I, D> {
  dev: Gt911<I>,
  delay: D,
  config: Config,
  tracker: Tracker,
  resolution: (u16, u16),
  failures: u32,
}

impl<I, D> Touchscreen<I, D> {
  /// Consume the facade and return the underlying register-level driver.
  pub fn into_inner(self) -> Gt911<I> {
    self.dev
  }

  /// Access low-level controller operations directly.
  pub fn controller(&mut self) -> &mut Gt911<I> {
    &mut self.dev
  }

  /// The identity tracker, e.g. for inspecting currently active tracks.
  pub fn tracker(&self) -> &Tracker {
    &self.tracker
  }

  /// The configuration this facade was built with.
  pub const fn config(&self) -> &Config {
    &self.config
  }

  /// Number of consecutive failed cycles, reset by any successful one.
  ///
  /// The facade itself never gives up on transient bus errors; a service
  /// wrapper can watch this to apply its own persistent-failure threshold.
  pub const fn consecutive_failures(&self) -> u32 {
    self.failures
  }
}

impl<I, D, E> Touchscreen<I, D>
where
  I: I2c<SevenBitAddress, Error = E>,
  D: DelayNs,
{
  /// Create a polling engine from a bus, a delay source and a configuration.
  pub fn new(i2c: I, delay: D, config: Config) -> Self {
    Self {
      dev: Gt911::new(i2c, config.address),
      delay,
      config,
      tracker: Tracker::new(),
      resolution: (0, 0),
      failures: 0,
    }
  }

  /// Verify the controller and capture the panel resolution used for axis
  /// inversion and clamping.
  pub async fn initialize(&mut self) -> Result<Panel, Error<E>> {
    let panel = self.dev.initialize().await?;
    // An unconfigured panel can report a zero resolution; fall back to the
    // configured output boundary so inversion still has a reference frame.
    self.resolution = if panel.resolution != (0, 0) { panel.resolution } else { panel.boundary };
    Ok(panel)
  }

  /// Run exactly one poll cycle.
  ///
  /// Returns `Ok(None)` when the controller has nothing ready (no register is
  /// written in that case), `Ok(Some(frame))` after a consumed report, and an
  /// error when the cycle had to be abandoned. An abandoned cycle is a no-op
  /// for tracker state; calling again next period is the retry.
  pub async fn poll_once(&mut self) -> Result<Option<Frame>, Error<E>> {
    match self.cycle().await {
      Ok(frame) => {
        self.failures = 0;
        Ok(frame)
      }
      Err(err) => {
        self.failures = self.failures.saturating_add(1);
        Err(err)
      }
    }
  }

  async fn cycle(&mut self) -> Result<Option<Frame>, Error<E>> {
    let status = self.dev.status().await?;
    if !status.buffer_ready {
      return Ok(None);
    }

    let count = status.touches()?;
    let snapshot = self.dev.points(count).await?;

    // Re-arm the controller before consuming the snapshot; see module docs
    // for why this ordering cannot lose or duplicate events.
    self.dev.acknowledge().await?;

    let update = self.tracker.update(&snapshot);
    #[cfg(feature = "defmt")]
    if update.dropped > 0 {
      defmt::warn!("gt911: dropped {=u8} contact(s), no free slot", update.dropped);
    }

    let mut events = Events::new();
    for event in update.events.iter() {
      let (x, y) = self.transform(event.x, event.y);
      let _ = events.push(TouchEvent { x, y, ..*event });
    }

    Ok(Some(Frame { status, events, touches: self.tracker.active() as u8, dropped: update.dropped }))
  }

  /// Poll at the configured period until a cycle produces events.
  ///
  /// Errors propagate to the caller; calling `next_frame` again retries from
  /// the status read. Give-up thresholds and backoff are deliberately left to
  /// the service layer.
  pub async fn next_frame(&mut self) -> Result<Frame, Error<E>> {
    loop {
      if let Some(frame) = self.poll_once().await? {
        if frame.has_activity() {
          return Ok(frame);
        }
      }
      self.delay.delay_ms(self.config.poll_interval_ms).await;
    }
  }

  /// The thin orchestrator loop: poll forever at a fixed period, forwarding
  /// events to `on_event` and skipping failed cycles.
  ///
  /// Transient errors are logged (under the `defmt` feature) and counted in
  /// [`consecutive_failures`](Self::consecutive_failures) but never terminate
  /// the loop. The stop signal is checked once per period boundary; a cycle
  /// already in flight finishes — including its flag acknowledge — before the
  /// loop exits, so the controller is never left unacknowledged.
  pub async fn run_until<S, F>(&mut self, mut stop: S, mut on_event: F)
  where
    S: FnMut() -> bool,
    F: FnMut(&TouchEvent),
  {
    while !stop() {
      match self.poll_once().await {
        Ok(Some(frame)) => {
          for event in frame.events.iter() {
            on_event(event);
          }
        }
        Ok(None) => {}
        Err(_) => {
          #[cfg(feature = "defmt")]
          defmt::warn!("gt911: poll cycle failed ({=u32} consecutive)", self.failures);
        }
      }
      self.delay.delay_ms(self.config.poll_interval_ms).await;
    }
  }

  /// Create an event stream yielding one [`Frame`] per call to
  /// [`Stream::next`].
  pub fn stream(&mut self) -> Stream<'_, I, D> {
    Stream { screen: self }
  }

  // Host-side coordinate mapping, applied to emitted events only so the
  // tracker always diffs in raw controller space. Inversion first, then axis
  // swap, then scaling, matching how panels are physically mounted rotated.
  fn transform(&self, mut x: u16, mut y: u16) -> (u16, u16) {
    let (res_x, res_y) = self.resolution;
    if self.config.invert_x && res_x > 0 {
      x = res_x.saturating_sub(x);
    }
    if self.config.invert_y && res_y > 0 {
      y = res_y.saturating_sub(y);
    }
    if self.config.swap_axes {
      core::mem::swap(&mut x, &mut y);
    }
    x = x.saturating_mul(self.config.scale);
    y = y.saturating_mul(self.config.scale);
    if self.config.clamp {
      let (bound_x, bound_y) = if self.config.swap_axes { (res_y, res_x) } else { (res_x, res_y) };
      if bound_x > 0 {
        x = x.min(bound_x.saturating_mul(self.config.scale));
      }
      if bound_y > 0 {
        y = y.min(bound_y.saturating_mul(self.config.scale));
      }
    }
    (x, y)
  }
}

/// A stream of touch frames from a polling [`Touchscreen`].
pub struct Stream<'a, I, D> {
  screen: &'a mut Touchscreen<I, D>,
}

impl<'a, I, D, E> Stream<'a, I, D>
where
  I: I2c<SevenBitAddress, Error = E>,
  D: DelayNs,
{
  /// Wait for the next frame with activity.
  pub async fn next(&mut self) -> Result<Option<Frame>, Error<E>> {
    Ok(Some(self.screen.next_frame().await?))
  }
}
