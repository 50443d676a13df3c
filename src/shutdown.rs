use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use thiserror::Error;

/// Returned by blocking device calls once the shutdown token has fired.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
#[error("the operation was cancelled")]
pub struct Cancelled;

/// A clonable cancellation token shared between the run loop, any blocking
/// device call and the host process.
///
/// Blocking opcodes (`Fx0A`) have to honor this token, so that an external
/// shutdown is never stuck behind a key press that will not arrive.
#[derive(Clone, Default)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    triggered: Mutex<bool>,
    condvar: Condvar,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the shutdown and wakes up everybody blocked on the token.
    pub fn trigger(&self) {
        let mut triggered = self.inner.triggered.lock();
        *triggered = true;
        self.inner.condvar.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        *self.inner.triggered.lock()
    }

    /// Blocks the calling thread until the token fires.
    pub fn wait(&self) {
        let mut triggered = self.inner.triggered.lock();
        while !*triggered {
            self.inner.condvar.wait(&mut triggered);
        }
    }

    /// Blocks until the token fires or `timeout` passed, reporting if the
    /// token has fired.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut triggered = self.inner.triggered.lock();
        if !*triggered {
            self.inner.condvar.wait_for(&mut triggered, timeout);
        }
        *triggered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_trigger_is_visible_to_clones() {
        let shutdown = Shutdown::new();
        let clone = shutdown.clone();
        assert!(!clone.is_triggered());
        shutdown.trigger();
        assert!(clone.is_triggered());
    }

    #[test]
    fn test_wait_wakes_up_on_trigger() {
        let shutdown = Shutdown::new();
        let waiter = shutdown.clone();

        let handle = thread::spawn(move || waiter.wait());

        shutdown.trigger();
        handle.join().expect("the waiting thread paniced");
    }

    #[test]
    fn test_wait_timeout_without_trigger() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.wait_timeout(Duration::from_millis(10)));
    }
}
