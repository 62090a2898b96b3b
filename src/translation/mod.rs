//! Translated work briefings for maintenance staff.
//!
//! A ticket without a translation gets one requested from a [`Translator`].
//! The result is advisory: failures are logged and the ticket carries on
//! untranslated. [`TranslationEnricher`] keeps at most one request per
//! ticket in flight.

pub mod gemini;

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::domain::ticket::{IssueType, Ticket, TicketId};

pub use gemini::GeminiTranslator;

pub const DEFAULT_TARGET_LANGUAGE: &str = "Hebrew";

/// Errors from a translation request
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Translation came back empty")]
    EmptyResponse,

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Translation service not configured")]
    NotConfigured,
}

/// What gets sent for translation
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationContext {
    pub ticket_id: TicketId,
    pub location: String,
    pub issue_types: Vec<IssueType>,
    pub description: String,
    pub entry_authorized: bool,
    pub target_language: String,
}

impl TranslationContext {
    pub fn from_ticket(ticket: &Ticket, target_language: impl Into<String>) -> Self {
        Self {
            ticket_id: ticket.id.clone(),
            location: ticket.location.clone(),
            issue_types: ticket.issue_types.clone(),
            description: ticket.description.clone(),
            entry_authorized: ticket.entry_authorized,
            target_language: target_language.into(),
        }
    }

    /// The user-facing text handed to the model
    pub fn prompt(&self) -> String {
        let issue_types = self
            .issue_types
            .iter()
            .map(IssueType::label)
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "Location: {}\nIssue Types: {}\nDescription: {}\nEntry Authorized: {}",
            self.location,
            issue_types,
            self.description,
            if self.entry_authorized { "Yes" } else { "No" }
        )
    }

    /// Instructions framing the translation task
    pub fn system_instruction(&self) -> String {
        format!(
            "You are a professional {lang} translator for a facility management team. \
             Translate the following maintenance issue categories, location, entry authorization \
             status, and specific description into natural, technical, and clear {lang}. \
             Format the output to be easily readable by a maintenance worker. \
             Only provide the translation text.",
            lang = self.target_language
        )
    }
}

/// A generative-text service able to render a ticket briefing
#[async_trait]
pub trait Translator: Send + Sync {
    /// Name of this translator for logging
    fn name(&self) -> &str;

    async fn translate(&self, context: &TranslationContext) -> Result<String, TranslationError>;
}

/// Keeps track of which tickets have a translation request outstanding
pub struct TranslationEnricher {
    translator: Arc<dyn Translator>,
    target_language: String,
    in_flight: Arc<Mutex<HashSet<TicketId>>>,
}

impl TranslationEnricher {
    pub fn new(translator: Arc<dyn Translator>, target_language: impl Into<String>) -> Self {
        Self {
            translator,
            target_language: target_language.into(),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn translator_name(&self) -> &str {
        self.translator.name()
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Tickets with a description and no translation yet are eligible
    pub fn needs_translation(ticket: &Ticket) -> bool {
        ticket.hebrew_translation.is_none() && !ticket.description.trim().is_empty()
    }

    /// Claims the ticket for enrichment.
    ///
    /// Returns `None` if a request for this ticket is already outstanding.
    /// The claim is released when the returned guard is dropped.
    pub fn try_begin(&self, id: &TicketId) -> Option<InFlightGuard> {
        let mut in_flight = lock(&self.in_flight);
        if !in_flight.insert(id.clone()) {
            debug!(ticket_id = %id, "Translation already in flight");
            return None;
        }

        Some(InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
            id: id.clone(),
        })
    }

    pub fn is_in_flight(&self, id: &TicketId) -> bool {
        lock(&self.in_flight).contains(id)
    }

    pub fn in_flight_count(&self) -> usize {
        lock(&self.in_flight).len()
    }

    /// Requests a translation for the ticket's current fields
    pub async fn translate(&self, ticket: &Ticket) -> Result<String, TranslationError> {
        let context = TranslationContext::from_ticket(ticket, &self.target_language);
        let text = self.translator.translate(&context).await?;

        let text = text.trim();
        if text.is_empty() {
            return Err(TranslationError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

/// Holds a ticket's in-flight slot until dropped
#[derive(Debug)]
pub struct InFlightGuard {
    in_flight: Arc<Mutex<HashSet<TicketId>>>,
    id: TicketId,
}

impl InFlightGuard {
    pub fn ticket_id(&self) -> &TicketId {
        &self.id
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock(&self.in_flight).remove(&self.id);
    }
}

fn lock(set: &Mutex<HashSet<TicketId>>) -> MutexGuard<'_, HashSet<TicketId>> {
    set.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
