use crate::{
    domain::{AdminPasscode, StaffRoster, Ticket},
    error::Result,
    storage::Storage,
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-based storage implementation
///
/// Each record is a pretty-printed JSON file in the data directory. Writes
/// land in a temporary sibling first and are renamed into place, so a
/// crash mid-write leaves the previous version readable.
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const TICKETS_FILE: &'static str = "tickets.json";
    const PASSCODE_FILE: &'static str = "passcode.json";
    const STAFF_FILE: &'static str = "staff.json";

    /// Creates a new FileStorage rooted at the given data directory
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            root_path: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    fn tickets_file(&self) -> PathBuf {
        self.root_path.join(Self::TICKETS_FILE)
    }

    fn passcode_file(&self) -> PathBuf {
        self.root_path.join(Self::PASSCODE_FILE)
    }

    fn staff_file(&self) -> PathBuf {
        self.root_path.join(Self::STAFF_FILE)
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    async fn write_json<T: Serialize + ?Sized>(&self, path: PathBuf, value: &T) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        let json = serde_json::to_string_pretty(value)?;
        let tmp_path = path.with_extension("json.tmp");

        fs::write(&tmp_path, json).await?;
        fs::rename(&tmp_path, &path).await?;
        Ok(())
    }

    async fn read_json<T: DeserializeOwned>(&self, path: PathBuf) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path).await?;
        let value: T = serde_json::from_str(&contents)?;

        Ok(Some(value))
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await
    }

    async fn save_tickets(&self, tickets: &[Ticket]) -> Result<()> {
        self.write_json(self.tickets_file(), tickets).await
    }

    async fn load_tickets(&self) -> Result<Option<Vec<Ticket>>> {
        self.read_json(self.tickets_file()).await
    }

    async fn save_passcode(&self, passcode: &AdminPasscode) -> Result<()> {
        self.write_json(self.passcode_file(), passcode).await
    }

    async fn load_passcode(&self) -> Result<Option<AdminPasscode>> {
        self.read_json(self.passcode_file()).await
    }

    async fn save_roster(&self, roster: &StaffRoster) -> Result<()> {
        self.write_json(self.staff_file(), roster).await
    }

    async fn load_roster(&self) -> Result<Option<StaffRoster>> {
        self.read_json(self.staff_file()).await
    }

    async fn is_initialized(&self) -> bool {
        self.root_path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TicketId, TicketStatus};
    use crate::error::FixdeskError;
    use chrono::Utc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_storage_initialization() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().join("desk"));

        assert!(!storage.is_initialized().await);

        storage.initialize().await.unwrap();

        assert!(storage.is_initialized().await);
    }

    #[tokio::test]
    async fn test_missing_records_load_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        storage.initialize().await.unwrap();

        assert!(storage.load_tickets().await.unwrap().is_none());
        assert!(storage.load_passcode().await.unwrap().is_none());
        assert!(storage.load_roster().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tickets_save_and_load_keep_order() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        storage.initialize().await.unwrap();

        let now = Utc::now();
        let mut second = Ticket::seed(now);
        second.id = TicketId::new(1002);
        second.status = TicketStatus::Done;
        second.date_completed = Some(now);
        let tickets = vec![second, Ticket::seed(now)];

        storage.save_tickets(&tickets).await.unwrap();

        let loaded = storage.load_tickets().await.unwrap().unwrap();
        assert_eq!(loaded, tickets);
        assert!(!storage.root_path().join("tickets.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_tickets_file_uses_browser_field_names() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        storage
            .save_tickets(&[Ticket::seed(Utc::now())])
            .await
            .unwrap();

        let raw = std::fs::read_to_string(temp_dir.path().join("tickets.json")).unwrap();
        assert!(raw.contains("\"requesterEmail\""));
        assert!(raw.contains("\"status\": \"New\""));
    }

    #[tokio::test]
    async fn test_passcode_and_roster_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        storage
            .save_passcode(&AdminPasscode::new("front-desk").unwrap())
            .await
            .unwrap();
        storage
            .save_roster(&StaffRoster::new(["Dov", "Avi"]))
            .await
            .unwrap();

        let passcode = storage.load_passcode().await.unwrap().unwrap();
        assert!(passcode.matches("front-desk"));
        let roster = storage.load_roster().await.unwrap().unwrap();
        assert_eq!(roster.names(), &["Dov", "Avi"]);
    }

    #[tokio::test]
    async fn test_corrupt_tickets_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        std::fs::write(temp_dir.path().join("tickets.json"), "{ not json").unwrap();

        let result = storage.load_tickets().await;
        assert!(matches!(result, Err(FixdeskError::SerializationError(_))));
    }
}
