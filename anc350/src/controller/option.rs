use std::time::Duration;

/// The option used to wait for motion completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOption {
    /// The duration between status samples.
    pub interval: Duration,
    /// Time limit for the motion to complete. If `None`, the poll waits indefinitely.
    ///
    /// Continuous motion is never timed out.
    pub timeout: Option<Duration>,
}

impl Default for PollOption {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default() {
        let option = PollOption::default();
        assert_eq!(Duration::from_millis(500), option.interval);
        assert_eq!(None, option.timeout);
    }
}
