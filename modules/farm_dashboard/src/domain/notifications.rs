use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use crate::contract::model::{Notification, NotificationLevel};

#[derive(Default)]
struct Queue {
    next_id: u64,
    items: VecDeque<Notification>,
}

/// Bounded queue of transient notifications ("toasts").
///
/// Oldest entries are dropped once `capacity` is reached; [`expire`] drops
/// entries older than the configured time-to-live.
///
/// [`expire`]: NotificationCenter::expire
pub struct NotificationCenter {
    queue: Mutex<Queue>,
    capacity: usize,
    ttl: Duration,
}

impl NotificationCenter {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            queue: Mutex::new(Queue::default()),
            capacity: capacity.max(1),
            ttl,
        }
    }

    pub fn push(&self, level: NotificationLevel, message: impl Into<String>) -> u64 {
        self.push_at(level, message, Utc::now())
    }

    pub fn push_at(
        &self,
        level: NotificationLevel,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> u64 {
        let mut q = self.queue.lock();
        let id = q.next_id;
        q.next_id += 1;
        while q.items.len() >= self.capacity {
            q.items.pop_front();
        }
        q.items.push_back(Notification {
            id,
            level,
            message: message.into(),
            created_at: now,
        });
        id
    }

    /// Currently visible notifications, oldest first.
    pub fn active(&self) -> Vec<Notification> {
        self.queue.lock().items.iter().cloned().collect()
    }

    pub fn dismiss(&self, id: u64) -> bool {
        let mut q = self.queue.lock();
        let before = q.items.len();
        q.items.retain(|n| n.id != id);
        q.items.len() != before
    }

    /// Drop notifications older than the time-to-live. Returns how many went.
    pub fn expire(&self, now: DateTime<Utc>) -> usize {
        let mut q = self.queue.lock();
        let before = q.items.len();
        let ttl = self.ttl;
        q.items.retain(|n| now - n.created_at < ttl);
        before - q.items.len()
    }

    /// Remove and return everything queued.
    pub fn drain(&self) -> Vec<Notification> {
        self.queue.lock().items.drain(..).collect()
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(16, Duration::milliseconds(4000))
    }
}
