//! Transient notifications ("toasts")
//!
//! The application builds one `Notifier` and lends it to whatever needs to
//! raise a notification. Nothing here is global.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(4);
pub const DEFAULT_MAX_VISIBLE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub kind: NotificationKind,
    pub created_at: Instant,
    expires_at: Instant,
}

impl Notification {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug)]
pub struct Notifier {
    active: VecDeque<Notification>,
    ttl: Duration,
    max_visible: usize,
    next_id: u64,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_TTL, DEFAULT_MAX_VISIBLE)
    }
}

impl Notifier {
    pub fn new(ttl: Duration, max_visible: usize) -> Self {
        Self {
            active: VecDeque::new(),
            ttl,
            max_visible: max_visible.max(1),
            next_id: 0,
        }
    }

    pub fn notify(&mut self, message: impl Into<String>, kind: NotificationKind) -> u64 {
        self.notify_at(message, kind, Instant::now())
    }

    pub fn notify_at(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
        now: Instant,
    ) -> u64 {
        self.next_id += 1;
        let message = message.into();
        tracing::debug!(id = self.next_id, ?kind, %message, "notification raised");

        self.active.push_back(Notification {
            id: self.next_id,
            message,
            kind,
            created_at: now,
            expires_at: now + self.ttl,
        });
        while self.active.len() > self.max_visible {
            self.active.pop_front();
        }
        self.next_id
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.notify(message, NotificationKind::Info)
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.notify(message, NotificationKind::Success)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.notify(message, NotificationKind::Error)
    }

    /// Remove one notification early. Returns false if it was already gone.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.active.len();
        self.active.retain(|n| n.id != id);
        self.active.len() != before
    }

    /// Drop every notification whose time is up; returns how many went away
    pub fn prune_expired(&mut self, now: Instant) -> usize {
        let before = self.active.len();
        self.active.retain(|n| !n.is_expired(now));
        before - self.active.len()
    }

    pub fn visible(&self) -> impl Iterator<Item = &Notification> {
        self.active.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
