//! Toast/notification presenter seam.
//!
//! The exchange controller reports outcomes through `Notifier`; presentation is
//! somebody else's job. `TracingNotifier` logs, `RecordingNotifier` keeps a list
//! a UI (or a test) can drain.

#[cfg(test)]
#[path = "notify_test.rs"]
mod notify_test;

use std::sync::{Mutex, PoisonError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A non-blocking user notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
}

impl Notification {
    #[must_use]
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Success, title: title.into(), description: description.into() }
    }

    #[must_use]
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Error, title: title.into(), description: description.into() }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Emits notifications as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => {
                tracing::info!(title = %notification.title, description = %notification.description, "notification");
            }
            NotificationLevel::Error => {
                tracing::warn!(title = %notification.title, description = %notification.description, "notification");
            }
        }
    }
}

/// Buffers notifications in arrival order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    entries: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Notification> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }

    #[must_use]
    pub fn count(&self, level: NotificationLevel) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|n| n.level == level)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}
