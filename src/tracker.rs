//! Touch-identity tracking across poll cycles.
//!
//! The controller reports an unordered set of contacts every cycle, each
//! carrying a firmware-assigned track id. [`Tracker`] diffs successive
//! [`Snapshot`]s against its slot table and turns them into discrete
//! [`TouchEvent`]s with a stable slot index per finger, the shape consumers
//! such as multitouch input injection expect.
//!
//! The tracker is deliberately cut off from the bus: it is an infallible state
//! machine over decoded snapshots, so a failed read or a corrupt report simply
//! skips the cycle and leaves the table exactly as it was. No phantom releases
//! are ever emitted because a read failed.

use heapless::Vec;

use crate::point::{Snapshot, TouchPoint};
use crate::reg::MAX_POINTS;

/// Indicates how a finger changed compared to the previous cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TouchPhase {
  /// A new finger contact appeared on the panel.
  Start,
  /// An existing finger moved to a new position.
  Move,
  /// A finger was lifted off the panel.
  End,
}

impl TouchPhase {
  /// Returns `true` if this represents a new touch.
  pub const fn is_start(self) -> bool {
    matches!(self, TouchPhase::Start)
  }

  /// Returns `true` if this represents a touch movement.
  pub const fn is_move(self) -> bool {
    matches!(self, TouchPhase::Move)
  }

  /// Returns `true` if this represents a touch ending.
  pub const fn is_end(self) -> bool {
    matches!(self, TouchPhase::End)
  }
}

/// One discrete per-finger transition.
///
/// For a given track id, exactly one [`Start`](TouchPhase::Start) precedes any
/// [`Move`](TouchPhase::Move) and exactly one [`End`](TouchPhase::End) follows
/// the last one; `End` carries the last coordinates the finger was seen at.
/// The slot index stays fixed for the lifetime of the track and is reused by
/// later contacts once freed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchEvent {
  pub phase: TouchPhase,
  /// Stable slot index, `0..MAX_POINTS`.
  pub slot: u8,
  /// Controller-assigned track id.
  pub id: u8,
  pub x: u16,
  pub y: u16,
}

/// Bounded event list for one cycle: at most one release plus one press or
/// move per slot.
pub type Events = Vec<TouchEvent, { MAX_POINTS * 2 }>;

/// Per-slot state for a finger currently on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Track {
  /// Controller-assigned track id this slot is bound to.
  pub id: u8,
  pub x: u16,
  pub y: u16,
  pub area: u16,
  /// Cycle number this track was last present in a snapshot.
  pub last_seen: u64,
}

/// Outcome of feeding one snapshot to the tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrackerUpdate {
  /// Events for this cycle. All `End`s precede any `Start`/`Move`, so a slot
  /// freed this cycle can be reused by a press in the same cycle without the
  /// consumer observing stale occupancy.
  pub events: Events,
  /// Contacts dropped because no slot was free. The controller's own
  /// five-point ceiling makes this unreachable in practice; it exists so an
  /// out-of-spec report degrades into a diagnostic instead of a panic.
  pub dropped: u8,
}

impl TrackerUpdate {
  /// Check whether this cycle produced any events at all.
  pub fn is_empty(&self) -> bool {
    self.events.is_empty()
  }
}

/// The per-finger identity state machine.
///
/// Owns up to [`MAX_POINTS`] slots, each either idle or bound to a track id.
/// State is process-lifetime only: after a restart every finger still on the
/// panel re-reports as a fresh `Start` on its first snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tracker {
  slots: [Option<Track>; MAX_POINTS],
  cycle: u64,
}

impl Default for Tracker {
  fn default() -> Self {
    Self::new()
  }
}

impl Tracker {
  /// Create a tracker with every slot idle.
  pub const fn new() -> Self {
    Self { slots: [None; MAX_POINTS], cycle: 0 }
  }

  /// Number of fingers currently tracked.
  pub fn active(&self) -> usize {
    self.slots.iter().filter(|slot| slot.is_some()).count()
  }

  /// The track bound to `slot`, if any.
  pub fn track(&self, slot: u8) -> Option<&Track> {
    self.slots.get(slot as usize)?.as_ref()
  }

  /// Iterate over `(slot, track)` pairs for all active tracks.
  pub fn tracks(&self) -> impl Iterator<Item = (u8, &Track)> + '_ {
    self.slots.iter().enumerate().filter_map(|(slot, track)| Some((slot as u8, track.as_ref()?)))
  }

  /// Number of snapshots consumed so far.
  pub const fn cycle(&self) -> u64 {
    self.cycle
  }

  /// Consume one snapshot and emit the transitions since the previous one.
  ///
  /// Infallible by construction; bus and decode failures are handled upstream
  /// by never calling this, which carries the previous state forward
  /// unchanged.
  pub fn update(&mut self, snapshot: &Snapshot) -> TrackerUpdate {
    self.cycle = self.cycle.wrapping_add(1);

    // Collapse duplicate ids: last occurrence wins, first-appearance order.
    // The protocol does not define duplicates; this is a documented ambiguity
    // policy, not a fault.
    let mut current: Vec<TouchPoint, MAX_POINTS> = Vec::new();
    for point in snapshot.iter() {
      match current.iter_mut().find(|candidate| candidate.id == point.id) {
        Some(existing) => *existing = *point,
        None => {
          let _ = current.push(*point);
        }
      }
    }

    let mut update = TrackerUpdate::default();

    // Releases first, so freed slots are reusable within this same cycle.
    for (slot, entry) in self.slots.iter_mut().enumerate() {
      if let Some(track) = entry {
        if !current.iter().any(|point| point.id == track.id) {
          let _ = update.events.push(TouchEvent {
            phase: TouchPhase::End,
            slot: slot as u8,
            id: track.id,
            x: track.x,
            y: track.y,
          });
          *entry = None;
        }
      }
    }

    for point in current.iter() {
      match self.slot_of(point.id) {
        Some(slot) => {
          if let Some(track) = self.slots[slot].as_mut() {
            let moved = track.x != point.x || track.y != point.y;
            track.x = point.x;
            track.y = point.y;
            track.area = point.area;
            track.last_seen = self.cycle;
            if moved {
              let _ = update.events.push(TouchEvent {
                phase: TouchPhase::Move,
                slot: slot as u8,
                id: point.id,
                x: point.x,
                y: point.y,
              });
            }
          }
        }
        None => match self.slots.iter().position(|entry| entry.is_none()) {
          Some(slot) => {
            self.slots[slot] =
              Some(Track { id: point.id, x: point.x, y: point.y, area: point.area, last_seen: self.cycle });
            let _ = update.events.push(TouchEvent {
              phase: TouchPhase::Start,
              slot: slot as u8,
              id: point.id,
              x: point.x,
              y: point.y,
            });
          }
          None => update.dropped += 1,
        },
      }
    }

    update
  }

  fn slot_of(&self, id: u8) -> Option<usize> {
    self.slots.iter().position(|entry| matches!(entry, Some(track) if track.id == id))
  }
}
