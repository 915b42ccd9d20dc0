//! Polling example: initialize the panel and forward touch transitions.
#![allow(unused)]
use embedded_hal_async::{
  delay::DelayNs,
  i2c::{I2c, SevenBitAddress},
};
use gt911_poll::{Config, TouchPhase, Touchscreen};

#[allow(dead_code)]
async fn main_async<I2C, D, E>(i2c: I2C, delay: D) -> Result<(), gt911_poll::Error<E>>
where
  I2C: I2c<SevenBitAddress, Error = E>,
  D: DelayNs,
{
  let config = Config::default().with_poll_interval_ms(15).with_swap_axes(true);
  let mut screen = Touchscreen::new(i2c, delay, config);

  let panel = screen.initialize().await?;
  let _ = panel.resolution;

  loop {
    let frame = screen.next_frame().await?;
    for event in frame.events.iter() {
      match event.phase {
        TouchPhase::Start => {
          // finger down at (event.x, event.y) on event.slot
        }
        TouchPhase::Move => {
          // finger moved
        }
        TouchPhase::End => {
          // finger lifted
        }
      }
    }
  }
}

fn main() {}
