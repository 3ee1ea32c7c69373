use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A cooperative cancellation flag shared between a [`PollSession`] and its owners.
///
/// The poll loop checks the flag between samples. A status query in flight is never interrupted.
///
/// [`PollSession`]: super::PollSession
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a new token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Checks if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub(crate) fn is_same(&self, other: &CancelToken) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_shared() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!token.is_cancelled());
        other.cancel();
        assert!(token.is_cancelled());
        assert!(other.is_cancelled());
        assert!(token.is_same(&other));
        assert!(!token.is_same(&CancelToken::new()));
    }

    #[test]
    fn cancel_from_other_thread() -> anyhow::Result<()> {
        let token = CancelToken::new();
        let other = token.clone();
        std::thread::spawn(move || other.cancel())
            .join()
            .map_err(|_| anyhow::anyhow!("thread panicked"))?;
        assert!(token.is_cancelled());
        Ok(())
    }
}
