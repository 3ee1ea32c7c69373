use std::time::Instant;

pub use spin_sleep::SpinSleeper;

/// Blocks the poll loop until the next sampling tick.
pub trait Sleep: std::fmt::Debug + Send {
    /// Blocks until `deadline`. Returns immediately if `deadline` has already passed.
    fn sleep_until(&self, deadline: Instant);
}

/// Waits with [`std::thread::sleep`].
///
/// The wake-up may be late by the scheduler granularity, which is negligible for the default 500 ms interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StdSleeper;

impl Sleep for StdSleeper {
    fn sleep_until(&self, deadline: Instant) {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
    }
}

// For intervals of a few milliseconds
impl Sleep for SpinSleeper {
    fn sleep_until(&self, deadline: Instant) {
        self.sleep(deadline.saturating_duration_since(Instant::now()));
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[rstest::rstest]
    #[case(StdSleeper)]
    #[case(SpinSleeper::default())]
    #[test]
    fn sleep_until(#[case] sleeper: impl Sleep) {
        let start = Instant::now();
        sleeper.sleep_until(start + Duration::from_millis(10));
        assert!(Duration::from_millis(10) <= start.elapsed());

        let start = Instant::now();
        sleeper.sleep_until(start.checked_sub(Duration::from_millis(100)).unwrap_or(start));
        assert!(start.elapsed() < Duration::from_millis(10));
    }
}
