//! Cancellable one-shot timer used for debouncing.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Handle to at most one scheduled action.
///
/// Scheduling again replaces (aborts) the previous action. Aborting also
/// stops an action that already started running, at its next await point.
/// Dropping the handle cancels whatever is still scheduled.
///
/// Must be used from within a tokio runtime.
#[derive(Debug, Default)]
pub struct DebounceTimer {
    handle: Option<JoinHandle<()>>,
}

impl DebounceTimer {
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Run `action` after `delay`, cancelling any previously scheduled action.
    pub fn schedule<F>(&mut self, delay: Duration, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        }));
    }

    /// Cancel the scheduled action. Returns true if one was still pending or running.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    /// True while an action is waiting for its delay or still running.
    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
