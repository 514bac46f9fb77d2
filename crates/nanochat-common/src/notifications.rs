//! Inline, non-fatal notices shown next to the transcript (for example a
//! failed reconfiguration). Fatal conditions use the error banner instead.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Severity level for inline notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// A notice with a time-to-live, evicted once expired.
#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub body: String,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl Notification {
    fn with_level(
        level: NotificationLevel,
        title: impl Into<String>,
        body: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            level,
            title: title.into(),
            body: body.into(),
            created_at: Instant::now(),
            ttl,
        }
    }

    /// Creates an info notice with a 5-second TTL.
    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::with_level(NotificationLevel::Info, title, body, Duration::from_secs(5))
    }

    /// Creates a warning notice with an 8-second TTL.
    pub fn warning(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::with_level(NotificationLevel::Warning, title, body, Duration::from_secs(8))
    }

    /// Creates an error notice with a 10-second TTL.
    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::with_level(NotificationLevel::Error, title, body, Duration::from_secs(10))
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

/// Bounded queue of notices that drops expired entries on access.
#[derive(Debug)]
pub struct NotificationQueue {
    items: VecDeque<Notification>,
    capacity: usize,
}

impl NotificationQueue {
    /// Creates a queue holding at most `capacity` notices (minimum one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Pushes a notice, evicting expired entries first and then the oldest
    /// entry if the queue is still full.
    pub fn push(&mut self, notification: Notification) {
        self.evict_expired();
        if self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(notification);
    }

    /// All notices that have not yet expired, oldest first.
    pub fn visible(&mut self) -> Vec<&Notification> {
        self.evict_expired();
        self.items.iter().collect()
    }

    /// Number of queued notices, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drops every notice, for example when the chat is reset.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn evict_expired(&mut self) {
        self.items.retain(|n| !n.is_expired());
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_level_and_ttl() {
        let n = Notification::error("Configuration", "host refused");
        assert_eq!(n.level, NotificationLevel::Error);
        assert_eq!(n.ttl, Duration::from_secs(10));
        assert_eq!(Notification::info("a", "b").ttl, Duration::from_secs(5));
        assert_eq!(Notification::warning("a", "b").ttl, Duration::from_secs(8));
    }

    #[test]
    fn queue_drops_oldest_at_capacity() {
        let mut q = NotificationQueue::new(2);
        q.push(Notification::info("one", ""));
        q.push(Notification::info("two", ""));
        q.push(Notification::info("three", ""));
        let titles: Vec<_> = q.visible().iter().map(|n| n.title.clone()).collect();
        assert_eq!(titles, vec!["two", "three"]);
    }

    #[test]
    fn expired_notices_are_hidden() {
        let mut q = NotificationQueue::new(4);
        let mut stale = Notification::info("stale", "");
        stale.ttl = Duration::ZERO;
        q.push(stale);
        q.push(Notification::info("fresh", ""));
        let visible = q.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "fresh");
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut q = NotificationQueue::new(0);
        q.push(Notification::info("only", ""));
        assert_eq!(q.len(), 1);
        q.clear();
        assert!(q.is_empty());
    }
}
