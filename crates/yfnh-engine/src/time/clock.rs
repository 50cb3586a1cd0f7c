use crate::error::InitError;

use super::timer::Timer;

/// Millisecond frame clock.
///
/// Holds the timestamp of the last [`Clock::delta`] call. The baseline starts
/// at zero, so the very first delta is the full time since the timer origin;
/// callers prime the clock once during setup to discard it.
#[derive(Debug)]
pub struct Clock<T> {
    timer: T,
    last_frame: u64,
}

impl<T: Timer> Clock<T> {
    /// Wraps `timer`, rejecting one that reports a zero resolution.
    pub fn new(timer: T) -> Result<Self, InitError> {
        if timer.resolution() == 0 {
            return Err(InitError::Timer);
        }
        Ok(Self { timer, last_frame: 0 })
    }

    /// Current time in milliseconds: `ticks * 1000 / resolution`.
    pub fn now(&self) -> u64 {
        let ms = u128::from(self.timer.ticks()) * 1000 / u128::from(self.timer.resolution());
        u64::try_from(ms).unwrap_or(u64::MAX)
    }

    /// Milliseconds since the previous call, advancing the baseline.
    ///
    /// Two calls within the same millisecond return `0.0`.
    pub fn delta(&mut self) -> f32 {
        let now = self.now();
        let delta = now.saturating_sub(self.last_frame);
        self.last_frame = now;
        delta as f32
    }

    /// `1000 / delta()`, or `None` when no time has elapsed since the last call.
    ///
    /// Consumes a delta like [`Clock::delta`] does.
    pub fn frames_per_second(&mut self) -> Option<f32> {
        let delta = self.delta();
        if delta > 0.0 {
            Some(1000.0 / delta)
        } else {
            None
        }
    }

    /// Timestamp recorded by the last `delta()` call, in milliseconds.
    pub fn last_frame(&self) -> u64 {
        self.last_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualTimer;

    #[test]
    fn rejects_zero_resolution_timer() {
        let timer = ManualTimer::with_resolution(0);
        assert!(matches!(Clock::new(timer), Err(InitError::Timer)));
    }

    #[test]
    fn now_normalizes_to_milliseconds() {
        let timer = ManualTimer::with_resolution(1_000_000);
        timer.set(2_500_000);
        let clock = Clock::new(timer).unwrap();
        assert_eq!(clock.now(), 2500);
    }

    #[test]
    fn first_delta_is_measured_from_zero() {
        let timer = ManualTimer::millis();
        timer.set(1234);
        let mut clock = Clock::new(timer).unwrap();
        assert_eq!(clock.delta(), 1234.0);
        assert_eq!(clock.last_frame(), 1234);
    }

    #[test]
    fn deltas_are_successive_differences() {
        let timer = ManualTimer::millis();
        let mut clock = Clock::new(timer.clone()).unwrap();

        let stamps = [0u64, 16, 16, 33, 50, 50, 51, 1000];
        let mut prev = 0u64;
        for stamp in stamps {
            timer.set(stamp);
            let d = clock.delta();
            assert!(d >= 0.0);
            assert_eq!(d, (stamp - prev) as f32);
            prev = stamp;
        }
    }

    #[test]
    fn backwards_timer_clamps_to_zero() {
        let timer = ManualTimer::millis();
        let mut clock = Clock::new(timer.clone()).unwrap();
        timer.set(100);
        clock.delta();
        timer.set(90);
        assert_eq!(clock.delta(), 0.0);
    }

    #[test]
    fn fps_is_inverse_of_delta() {
        let timer = ManualTimer::millis();
        let mut clock = Clock::new(timer.clone()).unwrap();
        clock.delta();
        timer.advance(20);
        assert_eq!(clock.frames_per_second(), Some(50.0));
    }

    #[test]
    fn fps_is_undefined_for_zero_delta() {
        let timer = ManualTimer::millis();
        timer.set(500);
        let mut clock = Clock::new(timer).unwrap();
        clock.delta();
        assert_eq!(clock.frames_per_second(), None);
    }
}
