//! The ticket collection and everything that happens when it changes.
//!
//! Every committed mutation is flushed to [`Storage`] straight away. A failed
//! flush is logged and leaves the in-memory collection authoritative; the
//! last-saved stamp only moves on success.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    clock::{Clock, TicketIdGenerator},
    domain::{
        apply_action, apply_update, SideEffect, Ticket, TicketAction, TicketDraft, TicketFilter,
        TicketId, TicketUpdate, Transition,
    },
    error::{FixdeskError, Result},
    notification::{EmailLog, NotificationHistory, NotificationRecorder},
    storage::Storage,
};

pub struct TicketStore {
    /// Newest first
    tickets: Vec<Ticket>,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn TicketIdGenerator>,
    recorder: NotificationRecorder,
    history: NotificationHistory,
    last_saved: Option<DateTime<Utc>>,
}

impl TicketStore {
    /// An empty store; call [`TicketStore::load`] to read the durable state
    pub fn new(
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn TicketIdGenerator>,
    ) -> Self {
        Self {
            tickets: Vec::new(),
            storage,
            clock,
            ids,
            recorder: NotificationRecorder::default(),
            history: NotificationHistory::default(),
            last_saved: None,
        }
    }

    pub fn with_recorder(mut self, recorder: NotificationRecorder) -> Self {
        self.recorder = recorder;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history = NotificationHistory::new(limit);
        self
    }

    /// Replaces the in-memory collection with the stored one.
    ///
    /// Missing, unreadable or inconsistent state falls back to the seed
    /// ticket. Loading never fails.
    pub async fn load(&mut self) {
        let now = self.clock.now();

        self.tickets = match self.storage.load_tickets().await {
            Ok(Some(tickets)) => match check_collection(&tickets) {
                Ok(()) => {
                    info!(count = tickets.len(), "Loaded tickets");
                    tickets
                }
                Err(e) => {
                    warn!(error = %e, "Stored tickets are inconsistent, starting from seed");
                    vec![Ticket::seed(now)]
                }
            },
            Ok(None) => {
                debug!("No stored tickets, starting from seed");
                vec![Ticket::seed(now)]
            }
            Err(e) => {
                warn!(error = %e, "Stored tickets are unreadable, starting from seed");
                vec![Ticket::seed(now)]
            }
        };

        for ticket in &self.tickets {
            self.ids.observe(&ticket.id);
        }
    }

    /// Adds a new ticket at the front of the collection
    pub async fn create(&mut self, draft: TicketDraft) -> Result<Ticket> {
        draft.validate()?;

        let id = self.fresh_id()?;
        let ticket = Ticket::from_draft(id, draft, self.clock.now())?;

        self.tickets.insert(0, ticket.clone());
        info!(ticket_id = %ticket.id, location = %ticket.location, "Ticket created");

        self.flush().await;
        Ok(ticket)
    }

    /// Merges a partial update into a ticket
    pub async fn update(&mut self, id: &TicketId, update: &TicketUpdate) -> Result<Ticket> {
        let index = self.position(id)?;
        let transition = apply_update(&self.tickets[index], update, self.clock.now())?;
        Ok(self.commit(index, transition).await)
    }

    /// Applies a staff action to a ticket
    pub async fn apply_action(&mut self, id: &TicketId, action: &TicketAction) -> Result<Ticket> {
        let index = self.position(id)?;
        let transition = apply_action(&self.tickets[index], action, self.clock.now())?;
        debug!(ticket_id = %id, action = %action, "Applying action");
        Ok(self.commit(index, transition).await)
    }

    pub fn get(&self, id: &TicketId) -> Option<&Ticket> {
        self.tickets.iter().find(|t| &t.id == id)
    }

    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn list(&self, filter: &TicketFilter) -> Vec<Ticket> {
        filter.apply(&self.tickets)
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    /// When the collection was last written successfully
    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    pub fn recent_notifications(&self, count: usize) -> Vec<EmailLog> {
        self.history.recent(count)
    }

    pub fn notification_count(&self) -> usize {
        self.history.len()
    }

    async fn commit(&mut self, index: usize, transition: Transition) -> Ticket {
        if transition.status_changed() {
            info!(
                ticket_id = %transition.ticket.id,
                from = %transition.previous_status,
                to = %transition.ticket.status,
                "Ticket status changed"
            );
        }

        self.tickets[index] = transition.ticket.clone();
        self.flush().await;

        for effect in &transition.effects {
            match effect {
                SideEffect::NotifyResolved => {
                    let log = self.recorder.record(&transition.ticket, self.clock.now());
                    self.history.push(log);
                }
            }
        }

        transition.ticket
    }

    async fn flush(&mut self) {
        match self.storage.save_tickets(&self.tickets).await {
            Ok(()) => self.last_saved = Some(self.clock.now()),
            Err(e) => warn!(error = %e, "Failed to save tickets, keeping in-memory state"),
        }
    }

    fn position(&self, id: &TicketId) -> Result<usize> {
        self.tickets
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| FixdeskError::TicketNotFound(id.to_string()))
    }

    fn fresh_id(&self) -> Result<TicketId> {
        for _ in 0..=self.tickets.len() {
            let id = self.ids.next_id();
            if self.get(&id).is_none() {
                return Ok(id);
            }
            debug!(ticket_id = %id, "Generated id already taken, drawing again");
            self.ids.observe(&id);
        }
        Err(FixdeskError::InvalidTicketId(
            "could not generate an unused ticket id".to_string(),
        ))
    }
}

/// Every ticket is consistent and no id appears twice
fn check_collection(tickets: &[Ticket]) -> Result<()> {
    let mut seen = HashSet::with_capacity(tickets.len());
    for ticket in tickets {
        ticket.check_invariants()?;
        if !seen.insert(&ticket.id) {
            return Err(FixdeskError::validation(
                "id",
                format!("duplicate ticket id {}", ticket.id),
            ));
        }
    }
    Ok(())
}
