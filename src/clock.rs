//! Time and id sources the store depends on.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::domain::ticket::TicketId;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct FixedClock {
    now: std::sync::Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: std::sync::Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

pub trait TicketIdGenerator: Send + Sync {
    /// Makes sure future ids land above `existing`
    fn observe(&self, existing: &TicketId);

    fn next_id(&self) -> TicketId;
}

/// Hands out `TKT-<n>` ids counting up from the highest id seen so far
#[derive(Debug)]
pub struct SequentialTicketIds {
    next: AtomicU32,
}

impl SequentialTicketIds {
    pub const FIRST: u32 = 1001;

    pub fn new() -> Self {
        Self::starting_at(Self::FIRST)
    }

    pub fn starting_at(first: u32) -> Self {
        Self {
            next: AtomicU32::new(first),
        }
    }
}

impl Default for SequentialTicketIds {
    fn default() -> Self {
        Self::new()
    }
}

impl TicketIdGenerator for SequentialTicketIds {
    fn observe(&self, existing: &TicketId) {
        if let Some(n) = existing.number() {
            self.next.fetch_max(n.saturating_add(1), Ordering::SeqCst);
        }
    }

    fn next_id(&self) -> TicketId {
        TicketId::new(self.next.fetch_add(1, Ordering::SeqCst))
    }
}
