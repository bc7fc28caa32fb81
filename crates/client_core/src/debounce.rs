//! Cancellable scheduled tasks for live previews, and the stale-response guard.

use std::{
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
    time::Duration,
};

use tokio::task::JoinHandle;

/// Collapses a burst of triggers into one action fired after a quiet period.
///
/// Rescheduling before the quiet period elapses cancels the pending action.
/// An action that has already fired runs to completion; it is detached from
/// the timer so later triggers never cancel an in-flight request.
pub struct Debouncer {
    quiet: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: Mutex::new(None),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    pub fn schedule<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let quiet = self.quiet;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            tokio::spawn(action);
        });
        if let Some(previous) = self.slot().replace(timer) {
            previous.abort();
        }
    }

    pub fn cancel(&self) {
        if let Some(previous) = self.slot().take() {
            previous.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.slot()
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    fn slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Hands out monotonically increasing tickets; only the newest ticket may
/// render its response.
#[derive(Debug, Default)]
pub struct ResponseSequencer {
    latest: AtomicU64,
}

impl ResponseSequencer {
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Marks every outstanding ticket as stale.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "tests/debounce_tests.rs"]
mod tests;
