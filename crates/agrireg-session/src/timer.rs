//! Scoped ownership of background timer tasks

use std::future::Future;

use tokio::task::JoinHandle;

/// Handle to a spawned task that is aborted when dropped
#[derive(Debug)]
pub struct TimerGuard {
    handle: JoinHandle<()>,
}

impl TimerGuard {
    /// Spawn `future` on the current runtime
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(future),
        }
    }

    /// Whether the task has already returned or been aborted
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Abort the task now
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
