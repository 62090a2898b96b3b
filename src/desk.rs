//! The boundary a front end talks to.
//!
//! A [`Desk`] owns the ticket store, the staff roster and the admin passcode
//! for one session. All mutations go through a single async lock, so updates
//! to a ticket are applied in the order they were invoked. Translation runs
//! in background tasks that never hold the lock while waiting on the
//! service.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    clock::{Clock, SequentialTicketIds, SystemClock, TicketIdGenerator},
    config::Config,
    domain::{
        AdminPasscode, StaffRoster, Ticket, TicketAction, TicketDraft, TicketFilter, TicketId,
        TicketUpdate,
    },
    error::{FixdeskError, Result},
    export::{export_done, ExportArtifact},
    notification::{EmailLog, NotificationRecorder},
    storage::Storage,
    store::TicketStore,
    translation::{TranslationEnricher, Translator},
};

struct DeskState {
    store: TicketStore,
    roster: StaffRoster,
    passcode: AdminPasscode,
}

pub struct Desk {
    state: Mutex<DeskState>,
    storage: Arc<dyn Storage>,
    enricher: Option<TranslationEnricher>,
}

/// Assembles a [`Desk`] from its collaborators
pub struct DeskBuilder {
    storage: Arc<dyn Storage>,
    config: Config,
    translator: Option<Arc<dyn Translator>>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn TicketIdGenerator>,
}

impl DeskBuilder {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            config: Config::default(),
            translator: None,
            clock: Arc::new(SystemClock),
            ids: Arc::new(SequentialTicketIds::new()),
        }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ids(mut self, ids: Arc<dyn TicketIdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Loads the durable records and returns the ready desk.
    ///
    /// Unreadable records fall back to their defaults; only an invalid
    /// configured default passcode is an error.
    pub async fn open(self) -> Result<Arc<Desk>> {
        let DeskBuilder {
            storage,
            config,
            translator,
            clock,
            ids,
        } = self;

        if let Err(e) = storage.initialize().await {
            warn!(error = %e, "Storage initialization failed, changes may not be saved");
        }

        let mut store = TicketStore::new(Arc::clone(&storage), clock, ids)
            .with_recorder(NotificationRecorder::new(
                config.notification.cc_address.clone(),
            ))
            .with_history_limit(config.notification.history_limit);
        store.load().await;

        let passcode = match storage.load_passcode().await {
            Ok(Some(passcode)) => passcode,
            Ok(None) => AdminPasscode::new(config.desk.default_passcode.clone())?,
            Err(e) => {
                warn!(error = %e, "Stored passcode is unreadable, using default");
                AdminPasscode::new(config.desk.default_passcode.clone())?
            }
        };

        let roster = match storage.load_roster().await {
            Ok(Some(roster)) => roster,
            Ok(None) => StaffRoster::new(&config.desk.default_roster),
            Err(e) => {
                warn!(error = %e, "Stored staff roster is unreadable, using default");
                StaffRoster::new(&config.desk.default_roster)
            }
        };

        let enricher = translator.map(|t| {
            info!(translator = t.name(), language = %config.translation.target_language, "Translation enabled");
            TranslationEnricher::new(t, config.translation.target_language.clone())
        });

        info!(tickets = store.len(), staff = roster.len(), "Desk opened");

        Ok(Arc::new(Desk {
            state: Mutex::new(DeskState {
                store,
                roster,
                passcode,
            }),
            storage,
            enricher,
        }))
    }
}

impl Desk {
    pub fn builder(storage: Arc<dyn Storage>) -> DeskBuilder {
        DeskBuilder::new(storage)
    }

    /// Opens a desk with the system clock and default id sequence
    pub async fn open(
        storage: Arc<dyn Storage>,
        config: Config,
        translator: Option<Arc<dyn Translator>>,
    ) -> Result<Arc<Desk>> {
        let mut builder = DeskBuilder::new(storage).config(config);
        if let Some(translator) = translator {
            builder = builder.translator(translator);
        }
        builder.open().await
    }

    /// Opens a file-backed desk, with Gemini translation if it is enabled
    #[cfg(feature = "file-storage")]
    pub async fn from_config(config: Config) -> Result<Arc<Desk>> {
        use crate::storage::FileStorage;
        use crate::translation::GeminiTranslator;

        crate::config::validate_config(&config)?;

        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(&config.storage.data_dir));

        let translator: Option<Arc<dyn Translator>> = if config.translation.enabled {
            let settings = &config.translation;
            let gemini = GeminiTranslator::new(
                settings.api_key.clone().unwrap_or_default(),
                settings.model.clone(),
            )
            .with_api_base(settings.api_base.clone())
            .with_timeout(settings.timeout());
            Some(Arc::new(gemini))
        } else {
            None
        };

        Self::open(storage, config, translator).await
    }

    /// Validates and files a new ticket, then asks for its translation
    pub async fn create_ticket(self: &Arc<Self>, draft: TicketDraft) -> Result<Ticket> {
        draft.validate()?;

        let ticket = self.state.lock().await.store.create(draft).await?;
        self.request_translation(&ticket.id).await;
        Ok(ticket)
    }

    /// Merges a partial update into a ticket
    pub async fn update_ticket(&self, id: &TicketId, update: TicketUpdate) -> Result<Ticket> {
        let mut state = self.state.lock().await;

        if let Some(Some(worker)) = &update.assigned_worker {
            check_worker(&state.roster, worker)?;
        }

        state.store.update(id, &update).await
    }

    /// Applies a staff action to a ticket
    pub async fn perform(&self, id: &TicketId, action: TicketAction) -> Result<Ticket> {
        let mut state = self.state.lock().await;

        if let TicketAction::Assign(worker) = &action {
            check_worker(&state.roster, worker)?;
        }

        state.store.apply_action(id, &action).await
    }

    pub async fn assign_worker(&self, id: &TicketId, worker: &str) -> Result<Ticket> {
        self.perform(id, TicketAction::Assign(worker.to_string())).await
    }

    pub async fn unassign_worker(&self, id: &TicketId) -> Result<Ticket> {
        self.perform(id, TicketAction::Unassign).await
    }

    pub async fn start_work(&self, id: &TicketId) -> Result<Ticket> {
        self.perform(id, TicketAction::StartWork).await
    }

    pub async fn order_part(&self, id: &TicketId) -> Result<Ticket> {
        self.perform(id, TicketAction::OrderPart).await
    }

    pub async fn resume_work(&self, id: &TicketId) -> Result<Ticket> {
        self.perform(id, TicketAction::ResumeWork).await
    }

    pub async fn mark_done(&self, id: &TicketId) -> Result<Ticket> {
        self.perform(id, TicketAction::MarkDone).await
    }

    pub async fn reopen(&self, id: &TicketId) -> Result<Ticket> {
        self.perform(id, TicketAction::Reopen).await
    }

    pub async fn reset(&self, id: &TicketId) -> Result<Ticket> {
        self.perform(id, TicketAction::Reset).await
    }

    pub async fn get_ticket(&self, id: &TicketId) -> Option<Ticket> {
        self.state.lock().await.store.get(id).cloned()
    }

    /// Tickets matching the filter, or all of them newest first
    pub async fn list_tickets(&self, filter: Option<&TicketFilter>) -> Vec<Ticket> {
        let state = self.state.lock().await;
        match filter {
            Some(filter) => state.store.list(filter),
            None => state.store.tickets().to_vec(),
        }
    }

    /// CSV of completed tickets; `None` when nothing is done yet
    pub async fn export_done(&self) -> Result<Option<ExportArtifact>> {
        let state = self.state.lock().await;
        let artifact = export_done(state.store.tickets())?;
        match &artifact {
            Some(a) => info!(rows = a.row_count(), "Exported completed tickets"),
            None => debug!("Nothing to export"),
        }
        Ok(artifact)
    }

    pub async fn verify_passcode(&self, input: &str) -> bool {
        let ok = self.state.lock().await.passcode.matches(input);
        if !ok {
            warn!("Admin passcode mismatch");
        }
        ok
    }

    /// Like [`Desk::verify_passcode`] but as an error
    pub async fn authorize(&self, input: &str) -> Result<()> {
        if self.verify_passcode(input).await {
            Ok(())
        } else {
            Err(FixdeskError::AuthFailed)
        }
    }

    /// Replaces the admin passcode; a failed save keeps the new one in memory
    pub async fn set_passcode(&self, passcode: &str) -> Result<()> {
        let passcode = AdminPasscode::new(passcode)?;
        let mut state = self.state.lock().await;

        if let Err(e) = self.storage.save_passcode(&passcode).await {
            warn!(error = %e, "Failed to save passcode, keeping it for this session");
        }
        state.passcode = passcode;
        info!("Admin passcode changed");
        Ok(())
    }

    /// Replaces the staff roster.
    ///
    /// Tickets already assigned to a removed name keep it.
    pub async fn set_staff_roster<I, S>(&self, names: I) -> StaffRoster
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roster = StaffRoster::new(names);
        let mut state = self.state.lock().await;

        if let Err(e) = self.storage.save_roster(&roster).await {
            warn!(error = %e, "Failed to save staff roster, keeping it for this session");
        }
        state.roster = roster.clone();
        info!(staff = roster.len(), "Staff roster updated");
        roster
    }

    pub async fn staff_roster(&self) -> StaffRoster {
        self.state.lock().await.roster.clone()
    }

    pub async fn recent_notifications(&self, count: usize) -> Vec<EmailLog> {
        self.state.lock().await.store.recent_notifications(count)
    }

    pub async fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.state.lock().await.store.last_saved()
    }

    pub fn translation_in_flight(&self, id: &TicketId) -> bool {
        self.enricher
            .as_ref()
            .is_some_and(|enricher| enricher.is_in_flight(id))
    }

    /// Starts a background translation for the ticket.
    ///
    /// Returns `None` when translation is off, the ticket does not need one,
    /// or a request for it is already outstanding.
    pub async fn request_translation(self: &Arc<Self>, id: &TicketId) -> Option<JoinHandle<()>> {
        let enricher = self.enricher.as_ref()?;
        let ticket = self.get_ticket(id).await?;

        if !TranslationEnricher::needs_translation(&ticket) {
            return None;
        }
        let guard = enricher.try_begin(id)?;

        let desk = Arc::clone(self);
        Some(tokio::spawn(async move {
            let _guard = guard;
            desk.run_translation(ticket).await;
        }))
    }

    /// Starts translations for every ticket still missing one
    pub async fn enrich_pending(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        let ids: Vec<TicketId> = self
            .state
            .lock()
            .await
            .store
            .tickets()
            .iter()
            .filter(|t| TranslationEnricher::needs_translation(t))
            .map(|t| t.id.clone())
            .collect();

        let mut handles = Vec::new();
        for id in ids {
            if let Some(handle) = self.request_translation(&id).await {
                handles.push(handle);
            }
        }
        handles
    }

    async fn run_translation(&self, ticket: Ticket) {
        let Some(enricher) = self.enricher.as_ref() else {
            return;
        };

        debug!(ticket_id = %ticket.id, translator = enricher.translator_name(), "Requesting translation");

        match enricher.translate(&ticket).await {
            Ok(text) => match self
                .update_ticket(&ticket.id, TicketUpdate::translation(text))
                .await
            {
                Ok(_) => info!(ticket_id = %ticket.id, "Translation attached"),
                Err(e) => warn!(ticket_id = %ticket.id, error = %e, "Could not attach translation"),
            },
            Err(e) => warn!(ticket_id = %ticket.id, error = %e, "Translation failed"),
        }
    }
}

fn check_worker(roster: &StaffRoster, worker: &str) -> Result<()> {
    let worker = worker.trim();
    if !worker.is_empty() && !roster.contains(worker) {
        return Err(FixdeskError::UnknownWorker(worker.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TicketStatus;
    use crate::storage::MemoryStorage;
    use crate::testing::fixtures;

    async fn desk() -> Arc<Desk> {
        Desk::open(Arc::new(MemoryStorage::new()), Config::default(), None)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_open_uses_configured_defaults() {
        let desk = desk().await;

        assert!(desk.verify_passcode("YU2025").await);
        assert_eq!(desk.staff_roster().await.names(), &["Beni", "Avi", "Moishe", "Yosef"]);
        assert_eq!(desk.list_tickets(None).await.len(), 1);
    }

    #[tokio::test]
    async fn test_assign_requires_rostered_worker() {
        let desk = desk().await;
        let id = TicketId::new(1001);

        let result = desk.assign_worker(&id, "Shlomo").await;
        assert!(matches!(result, Err(FixdeskError::UnknownWorker(name)) if name == "Shlomo"));

        let ticket = desk.assign_worker(&id, "Beni").await.unwrap();
        assert_eq!(ticket.status, TicketStatus::Assigned);
        assert_eq!(ticket.assigned_worker.as_deref(), Some("Beni"));
    }

    #[tokio::test]
    async fn test_removed_worker_stays_on_ticket() {
        let desk = desk().await;
        let id = TicketId::new(1001);

        desk.assign_worker(&id, "Avi").await.unwrap();
        desk.set_staff_roster(["Beni"]).await;

        let ticket = desk.get_ticket(&id).await.unwrap();
        assert_eq!(ticket.assigned_worker.as_deref(), Some("Avi"));
        assert!(desk.start_work(&id).await.is_ok());
    }

    #[tokio::test]
    async fn test_authorize_and_change_passcode() {
        let desk = desk().await;

        assert!(matches!(desk.authorize("yu2025").await, Err(FixdeskError::AuthFailed)));
        desk.set_passcode("maint-77").await.unwrap();
        assert!(!desk.verify_passcode("YU2025").await);
        assert!(desk.authorize("maint-77").await.is_ok());

        assert!(desk.set_passcode("   ").await.is_err());
        assert!(desk.verify_passcode("maint-77").await);
    }

    #[tokio::test]
    async fn test_create_validates_at_the_boundary() {
        let desk = desk().await;
        let mut draft = fixtures::draft("Noa Levi", "Drain is blocked");
        draft.entry_authorized = None;

        assert!(matches!(
            desk.create_ticket(draft).await,
            Err(FixdeskError::Validation { field: "entryAuthorized", .. })
        ));
        assert_eq!(desk.list_tickets(None).await.len(), 1);
    }

    #[tokio::test]
    async fn test_no_translation_without_translator() {
        let desk = desk().await;
        assert!(desk.request_translation(&TicketId::new(1001)).await.is_none());
        assert!(desk.enrich_pending().await.is_empty());
    }
}
