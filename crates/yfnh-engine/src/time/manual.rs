use std::cell::Cell;
use std::rc::Rc;

use super::timer::Timer;

/// Timer driven by hand.
///
/// Clones share the same tick counter, so one clone can be moved into a
/// [`super::Clock`] while another advances time. Used for deterministic
/// replays and tests.
#[derive(Debug, Clone)]
pub struct ManualTimer {
    ticks: Rc<Cell<u64>>,
    resolution: u64,
}

impl ManualTimer {
    /// One tick per millisecond.
    pub fn millis() -> Self {
        Self::with_resolution(1000)
    }

    pub fn with_resolution(resolution: u64) -> Self {
        Self {
            ticks: Rc::new(Cell::new(0)),
            resolution,
        }
    }

    pub fn set(&self, ticks: u64) {
        self.ticks.set(ticks);
    }

    pub fn advance(&self, ticks: u64) {
        self.ticks.set(self.ticks.get().saturating_add(ticks));
    }
}

impl Timer for ManualTimer {
    fn ticks(&self) -> u64 {
        self.ticks.get()
    }

    fn resolution(&self) -> u64 {
        self.resolution
    }
}
