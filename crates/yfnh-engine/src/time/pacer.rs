use std::time::{Duration, Instant};

/// Blocking frame-rate limiter.
///
/// Each call waits until the current frame deadline, then schedules the next
/// one a full period later. A loop that falls more than one period behind is
/// re-based to "now" instead of bursting through the missed frames.
#[derive(Debug, Clone, Default)]
pub struct FramePacer {
    next_deadline: Option<Instant>,
}

impl FramePacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time to wait before the frame at `now` may end, for `rate` frames per second.
    ///
    /// A rate of zero disables pacing and forgets the schedule.
    pub fn wait_time(&mut self, rate: u32, now: Instant) -> Duration {
        if rate == 0 {
            self.next_deadline = None;
            return Duration::ZERO;
        }

        let period = Duration::from_secs(1) / rate;
        let mut target = self.next_deadline.unwrap_or(now);

        if now.saturating_duration_since(target) > period {
            log::trace!("frame pacer fell behind by {:?}; re-basing", now - target);
            target = now;
        }

        let wait = target.saturating_duration_since(now);
        self.next_deadline = Some(target + period);
        wait
    }

    /// Sleeps out the remainder of the current frame period.
    pub fn sync(&mut self, rate: u32) {
        let wait = self.wait_time(rate, Instant::now());
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }
    }
}
