use std::time::Instant;

/// Source of raw monotonic ticks.
///
/// `resolution` is the number of ticks per second. A resolution of zero means
/// the timer is unusable and is rejected by [`super::Clock::new`].
pub trait Timer {
    fn ticks(&self) -> u64;
    fn resolution(&self) -> u64;
}

/// Nanosecond timer backed by `std::time::Instant`.
///
/// Ticks count from the moment the timer is created.
#[derive(Debug, Clone)]
pub struct SystemTimer {
    origin: Instant,
}

impl SystemTimer {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for SystemTimer {
    fn ticks(&self) -> u64 {
        // u64 nanoseconds covers ~584 years of uptime.
        u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    fn resolution(&self) -> u64 {
        1_000_000_000
    }
}

impl<T: Timer + ?Sized> Timer for &T {
    fn ticks(&self) -> u64 {
        (**self).ticks()
    }

    fn resolution(&self) -> u64 {
        (**self).resolution()
    }
}
