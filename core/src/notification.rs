//! Advisory notifications with explicit expiry.
//!
//! Each notification carries its own `expires_at_ms`; one `sweep` per
//! tick drops whatever has expired. No per-notification timers.

use crate::types::{DurationMs, TimestampMs};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id:                  String,
    pub kind:                NotificationKind,
    pub title:               String,
    pub message:             String,
    pub created_at_ms:       TimestampMs,
    pub display_duration_ms: DurationMs,
    pub expires_at_ms:       TimestampMs,
}

impl Notification {
    pub fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        now: TimestampMs,
        duration: DurationMs,
    ) -> Self {
        let span = TimestampMs::try_from(duration).unwrap_or(TimestampMs::MAX);
        Self {
            id: format!("notification-{}", uuid::Uuid::new_v4()),
            kind,
            title: title.into(),
            message: message.into(),
            created_at_ms: now,
            display_duration_ms: duration,
            expires_at_ms: now.saturating_add(span),
        }
    }

    pub fn is_expired(&self, now: TimestampMs) -> bool {
        now >= self.expires_at_ms
    }
}

#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    active: Vec<Notification>,
}

impl NotificationQueue {
    pub fn push(&mut self, notification: Notification) {
        log::debug!(
            "notification [{:?}] {}: {}",
            notification.kind, notification.title, notification.message
        );
        self.active.push(notification);
    }

    /// Remove expired entries. Returns how many were dropped.
    pub fn sweep(&mut self, now: TimestampMs) -> usize {
        let before = self.active.len();
        self.active.retain(|n| !n.is_expired(now));
        before - self.active.len()
    }

    pub fn dismiss(&mut self, id: &str) -> bool {
        let before = self.active.len();
        self.active.retain(|n| n.id != id);
        before != self.active.len()
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn active(&self) -> &[Notification] {
        &self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_drops_only_expired() {
        let mut queue = NotificationQueue::default();
        queue.push(Notification::new(NotificationKind::Info, "a", "short", 0, 1_000));
        queue.push(Notification::new(NotificationKind::Success, "b", "long", 0, 8_000));

        assert_eq!(queue.sweep(999), 0);
        assert_eq!(queue.sweep(1_000), 1);
        assert_eq!(queue.active().len(), 1);
        assert_eq!(queue.active()[0].title, "b");
    }

    #[test]
    fn dismiss_by_id() {
        let mut queue = NotificationQueue::default();
        let n = Notification::new(NotificationKind::Warning, "t", "m", 0, 5_000);
        let id = n.id.clone();
        queue.push(n);
        assert!(queue.dismiss(&id));
        assert!(!queue.dismiss(&id));
        assert!(queue.active().is_empty());
    }
}
