use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::foundation::error::{RelayError, RelayResult};

/// Cooperative cancellation signal polled by long-running blocking work.
pub trait Stop: Send + Sync {
    /// `true` once the work should be abandoned.
    fn should_stop(&self) -> bool;

    /// Return [`RelayError::Cancelled`] if the work should be abandoned.
    fn check(&self) -> RelayResult<()> {
        if self.should_stop() {
            Err(RelayError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// A [`Stop`] that never fires.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unstoppable;

impl Stop for Unstoppable {
    fn should_stop(&self) -> bool {
        false
    }
}

/// Shared flag that can be raised from another thread or task.
#[derive(Clone, Debug, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    /// Create a lowered flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag.
    pub fn raise(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Guard that raises the flag when dropped, e.g. when a request future is abandoned.
    pub fn raise_on_drop(&self) -> RaiseOnDrop {
        RaiseOnDrop(self.clone())
    }
}

impl Stop for StopFlag {
    fn should_stop(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Raises its [`StopFlag`] on drop.
#[derive(Debug)]
pub struct RaiseOnDrop(StopFlag);

impl Drop for RaiseOnDrop {
    fn drop(&mut self) {
        self.0.raise();
    }
}
