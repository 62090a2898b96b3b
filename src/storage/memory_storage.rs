use crate::{
    domain::{AdminPasscode, StaffRoster, Ticket},
    error::Result,
    storage::Storage,
};
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Records {
    tickets: Option<Vec<Ticket>>,
    passcode: Option<AdminPasscode>,
    roster: Option<StaffRoster>,
}

/// Non-durable storage for sessions that do not need to survive a restart
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: RwLock<Records>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds a ticket collection
    pub fn with_tickets(tickets: Vec<Ticket>) -> Self {
        Self {
            records: RwLock::new(Records {
                tickets: Some(tickets),
                ..Records::default()
            }),
        }
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn save_tickets(&self, tickets: &[Ticket]) -> Result<()> {
        self.records.write().await.tickets = Some(tickets.to_vec());
        Ok(())
    }

    async fn load_tickets(&self) -> Result<Option<Vec<Ticket>>> {
        Ok(self.records.read().await.tickets.clone())
    }

    async fn save_passcode(&self, passcode: &AdminPasscode) -> Result<()> {
        self.records.write().await.passcode = Some(passcode.clone());
        Ok(())
    }

    async fn load_passcode(&self) -> Result<Option<AdminPasscode>> {
        Ok(self.records.read().await.passcode.clone())
    }

    async fn save_roster(&self, roster: &StaffRoster) -> Result<()> {
        self.records.write().await.roster = Some(roster.clone());
        Ok(())
    }

    async fn load_roster(&self) -> Result<Option<StaffRoster>> {
        Ok(self.records.read().await.roster.clone())
    }

    async fn is_initialized(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_empty_memory_storage() {
        let storage = MemoryStorage::new();
        assert!(storage.load_tickets().await.unwrap().is_none());
        assert!(storage.load_roster().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_storage_overwrites() {
        let storage = MemoryStorage::with_tickets(vec![Ticket::seed(Utc::now())]);
        storage.save_tickets(&[]).await.unwrap();
        assert_eq!(storage.load_tickets().await.unwrap(), Some(Vec::new()));
    }
}
