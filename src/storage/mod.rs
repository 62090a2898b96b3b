use crate::{
    domain::{AdminPasscode, StaffRoster, Ticket},
    error::Result,
};
use async_trait::async_trait;

#[cfg(feature = "file-storage")]
pub mod file_storage;
pub mod memory_storage;

#[cfg(feature = "file-storage")]
pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;

/// Storage trait for the desk's durable records.
///
/// The ticket collection, the admin passcode and the staff roster are
/// independent last-writer-wins records. Loads return `Ok(None)` when a
/// record has never been written and an error when it exists but cannot be
/// read back.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Initializes the storage backend
    async fn initialize(&self) -> Result<()>;

    /// Replaces the stored ticket collection, keeping its order
    async fn save_tickets(&self, tickets: &[Ticket]) -> Result<()>;

    /// Loads the ticket collection
    async fn load_tickets(&self) -> Result<Option<Vec<Ticket>>>;

    /// Saves the admin passcode
    async fn save_passcode(&self, passcode: &AdminPasscode) -> Result<()>;

    /// Loads the admin passcode
    async fn load_passcode(&self) -> Result<Option<AdminPasscode>>;

    /// Saves the staff roster
    async fn save_roster(&self, roster: &StaffRoster) -> Result<()>;

    /// Loads the staff roster
    async fn load_roster(&self) -> Result<Option<StaffRoster>>;

    /// Checks if the backend has been initialized
    async fn is_initialized(&self) -> bool;
}
