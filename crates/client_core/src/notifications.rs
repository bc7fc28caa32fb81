//! Transient user-facing notifications with independent dismissal timers.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    time::Duration,
};

use tokio::sync::broadcast;
use tracing::debug;

pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_millis(3000);
/// Length of the fade-out between dismissal and removal.
pub const DISMISS_TRANSITION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn color(self) -> &'static str {
        match self {
            Severity::Success => "#4CAF50",
            Severity::Error => "#F44336",
            Severity::Warning => "#FF9800",
            Severity::Info => "#2196F3",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Severity::Success => "✅",
            Severity::Error => "❌",
            Severity::Warning => "⚠️",
            Severity::Info => "ℹ️",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPhase {
    Visible,
    Dismissing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    pub duration: Duration,
    pub phase: NotificationPhase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    Shown(Notification),
    Dismissing(NotificationId),
    Removed(NotificationId),
}

struct NotificationQueue {
    next_id: AtomicU64,
    active: Mutex<Vec<Notification>>,
    events: broadcast::Sender<NotificationEvent>,
}

impl NotificationQueue {
    fn active(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_dismiss(&self, id: NotificationId) {
        if let Some(notification) = self.active().iter_mut().find(|n| n.id == id) {
            notification.phase = NotificationPhase::Dismissing;
        }
        let _ = self.events.send(NotificationEvent::Dismissing(id));
    }

    fn remove(&self, id: NotificationId) {
        self.active().retain(|n| n.id != id);
        let _ = self.events.send(NotificationEvent::Removed(id));
    }
}

/// Cheap to clone; every clone feeds the same queue.
#[derive(Clone)]
pub struct NotificationCenter {
    queue: Arc<NotificationQueue>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCenter {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            queue: Arc::new(NotificationQueue {
                next_id: AtomicU64::new(1),
                active: Mutex::new(Vec::new()),
                events,
            }),
        }
    }

    pub fn notify(&self, message: impl Into<String>, severity: Severity) -> NotificationId {
        self.notify_for(message, severity, DEFAULT_NOTIFICATION_DURATION)
    }

    /// Must be called from within a tokio runtime; the dismissal timer is a task.
    pub fn notify_for(
        &self,
        message: impl Into<String>,
        severity: Severity,
        duration: Duration,
    ) -> NotificationId {
        let id = NotificationId(self.queue.next_id.fetch_add(1, Ordering::Relaxed));
        let notification = Notification {
            id,
            message: message.into(),
            severity,
            duration,
            phase: NotificationPhase::Visible,
        };
        debug!(id = id.0, ?severity, message = %notification.message, "notification shown");
        self.queue.active().push(notification.clone());
        let _ = self.queue.events.send(NotificationEvent::Shown(notification));

        let queue = Arc::clone(&self.queue);
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            queue.begin_dismiss(id);
            tokio::time::sleep(DISMISS_TRANSITION).await;
            queue.remove(id);
        });
        id
    }

    pub fn active(&self) -> Vec<Notification> {
        self.queue.active().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.queue.events.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/notifications_tests.rs"]
mod tests;
