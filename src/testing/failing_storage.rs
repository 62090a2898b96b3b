//! Storage whose writes can be switched to fail.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::domain::{AdminPasscode, StaffRoster, Ticket};
use crate::error::{FixdeskError, Result};
use crate::storage::{MemoryStorage, Storage};

/// In-memory storage that rejects writes while `fail_writes` is set.
///
/// Reads always go through to the wrapped [`MemoryStorage`].
#[derive(Debug, Default)]
pub struct FailingStorage {
    inner: MemoryStorage,
    fail_writes: AtomicBool,
    rejected: AtomicUsize,
}

impl FailingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wrapping(inner: MemoryStorage) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of writes refused so far.
    pub fn rejected_writes(&self) -> usize {
        self.rejected.load(Ordering::SeqCst)
    }

    fn check_write(&self, record: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            self.rejected.fetch_add(1, Ordering::SeqCst);
            return Err(FixdeskError::Persistence(format!(
                "simulated write failure for {}",
                record
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FailingStorage {
    async fn initialize(&self) -> Result<()> {
        self.inner.initialize().await
    }

    async fn save_tickets(&self, tickets: &[Ticket]) -> Result<()> {
        self.check_write("tickets")?;
        self.inner.save_tickets(tickets).await
    }

    async fn load_tickets(&self) -> Result<Option<Vec<Ticket>>> {
        self.inner.load_tickets().await
    }

    async fn save_passcode(&self, passcode: &AdminPasscode) -> Result<()> {
        self.check_write("passcode")?;
        self.inner.save_passcode(passcode).await
    }

    async fn load_passcode(&self) -> Result<Option<AdminPasscode>> {
        self.inner.load_passcode().await
    }

    async fn save_roster(&self, roster: &StaffRoster) -> Result<()> {
        self.check_write("staff roster")?;
        self.inner.save_roster(roster).await
    }

    async fn load_roster(&self) -> Result<Option<StaffRoster>> {
        self.inner.load_roster().await
    }

    async fn is_initialized(&self) -> bool {
        self.inner.is_initialized().await
    }
}
