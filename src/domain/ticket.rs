use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::{FixdeskError, Result};

static EMAIL_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

/// Checks the basic `local@domain.tld` shape used at intake
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .map(|re| re.is_match(email))
        .unwrap_or(false)
}

/// Unique identifier for a ticket (e.g., TKT-1001, TKT-1002)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketId(String);

impl TicketId {
    const PREFIX: &'static str = "TKT-";

    /// Creates a new TicketId from a counter
    pub fn new(counter: u32) -> Self {
        Self(format!("{}{}", Self::PREFIX, counter))
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric part of the id, if it follows the `TKT-<n>` form
    pub fn number(&self) -> Option<u32> {
        self.0
            .strip_prefix(Self::PREFIX)
            .and_then(|n| n.parse::<u32>().ok())
    }
}

impl FromStr for TicketId {
    type Err = FixdeskError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();

        match normalized.strip_prefix(Self::PREFIX) {
            Some(rest) if !rest.is_empty() && rest.parse::<u32>().is_ok() => Ok(Self(normalized)),
            _ => Err(FixdeskError::InvalidTicketId(s.to_string())),
        }
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a ticket in the maintenance workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    New,
    Assigned,
    #[serde(rename = "In Process")]
    InProcess,
    #[serde(rename = "Parts Ordered")]
    PartsOrdered,
    Done,
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "New"),
            Self::Assigned => write!(f, "Assigned"),
            Self::InProcess => write!(f, "In Process"),
            Self::PartsOrdered => write!(f, "Parts Ordered"),
            Self::Done => write!(f, "Done"),
        }
    }
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 5] = [
        Self::New,
        Self::Assigned,
        Self::InProcess,
        Self::PartsOrdered,
        Self::Done,
    ];

    /// Checks if a status transition is an edge of the workflow graph
    pub fn can_transition_to(&self, target: &TicketStatus) -> bool {
        match (self, target) {
            // From New
            (Self::New, Self::Assigned) => true,
            (Self::New, Self::InProcess) => true,

            // From Assigned
            (Self::Assigned, Self::InProcess) => true,
            (Self::Assigned, Self::PartsOrdered) => true,

            // Parts can be ordered and work resumed any number of times
            (Self::InProcess, Self::PartsOrdered) => true,
            (Self::PartsOrdered, Self::InProcess) => true,

            // Completion
            (Self::InProcess, Self::Done) => true,
            (Self::PartsOrdered, Self::Done) => true,

            // Reopened
            (Self::Done, Self::InProcess) => true,

            // Reset (and reopen of an unassigned ticket)
            (_, Self::New) => true,

            // Same status is always valid
            _ if self == target => true,

            _ => false,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Category tags a resident can pick when reporting an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueType {
    #[serde(rename = "Air conditioner")]
    AirConditioner,
    #[serde(rename = "Door / Lock")]
    DoorLock,
    Electricity,
    Fridge,
    Furniture,
    #[serde(rename = "Kitchen cabinets")]
    KitchenCabinets,
    Light,
    #[serde(rename = "Painting / Walls")]
    PaintingWalls,
    Plumbing,
    Stovetop,
    #[serde(rename = "Window / Shutter")]
    WindowShutter,
    Other,
}

impl IssueType {
    pub const ALL: [IssueType; 12] = [
        Self::AirConditioner,
        Self::DoorLock,
        Self::Electricity,
        Self::Fridge,
        Self::Furniture,
        Self::KitchenCabinets,
        Self::Light,
        Self::PaintingWalls,
        Self::Plumbing,
        Self::Stovetop,
        Self::WindowShutter,
        Self::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::AirConditioner => "Air conditioner",
            Self::DoorLock => "Door / Lock",
            Self::Electricity => "Electricity",
            Self::Fridge => "Fridge",
            Self::Furniture => "Furniture",
            Self::KitchenCabinets => "Kitchen cabinets",
            Self::Light => "Light",
            Self::PaintingWalls => "Painting / Walls",
            Self::Plumbing => "Plumbing",
            Self::Stovetop => "Stovetop",
            Self::WindowShutter => "Window / Shutter",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for IssueType {
    type Err = FixdeskError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| FixdeskError::validation("issueTypes", format!("unknown issue type '{}'", s)))
    }
}

/// What a resident submits; nothing here is trusted until validated
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketDraft {
    pub requester_name: String,
    pub requester_email: String,
    pub whatsapp_number: String,
    pub location: String,
    pub issue_types: Vec<IssueType>,
    pub description: String,
    /// Unset until the resident answers the entry question
    pub entry_authorized: Option<bool>,
    pub photo_url: Option<String>,
}

impl TicketDraft {
    /// Checks every required field, reporting the first one missing or malformed
    pub fn validate(&self) -> Result<()> {
        require("requesterName", &self.requester_name)?;

        if self.requester_email.trim().is_empty() {
            return Err(FixdeskError::validation("requesterEmail", "email is required"));
        }
        if !is_valid_email(self.requester_email.trim()) {
            return Err(FixdeskError::validation(
                "requesterEmail",
                "please enter a valid email address",
            ));
        }

        require("whatsappNumber", &self.whatsapp_number)?;
        require("location", &self.location)?;

        if self.issue_types.is_empty() {
            return Err(FixdeskError::validation(
                "issueTypes",
                "select at least one issue category",
            ));
        }

        if self.entry_authorized.is_none() {
            return Err(FixdeskError::validation(
                "entryAuthorized",
                "answer the entry authorization question",
            ));
        }

        require("description", &self.description)?;
        Ok(())
    }
}

fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(FixdeskError::validation(field, "field is required"));
    }
    Ok(())
}

/// Removes repeated tags while keeping the order they were picked in
pub(crate) fn dedup_issue_types(types: Vec<IssueType>) -> Vec<IssueType> {
    let mut seen = Vec::with_capacity(types.len());
    for t in types {
        if !seen.contains(&t) {
            seen.push(t);
        }
    }
    seen
}

/// A maintenance request and its lifecycle state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: TicketId,
    pub requester_name: String,
    pub requester_email: String,
    #[serde(default)]
    pub whatsapp_number: String,
    pub location: String,
    pub issue_types: Vec<IssueType>,
    pub description: String,
    pub entry_authorized: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub status: TicketStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_worker: Option<String>,
    pub date_submitted: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_completed: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hebrew_translation: Option<String>,
}

impl Ticket {
    /// Builds a fresh `New` ticket from a validated draft
    pub fn from_draft(id: TicketId, draft: TicketDraft, submitted_at: DateTime<Utc>) -> Result<Self> {
        draft.validate()?;

        let entry_authorized = draft
            .entry_authorized
            .ok_or_else(|| FixdeskError::validation("entryAuthorized", "answer the entry authorization question"))?;

        Ok(Self {
            id,
            requester_name: draft.requester_name.trim().to_string(),
            requester_email: draft.requester_email.trim().to_string(),
            whatsapp_number: draft.whatsapp_number.trim().to_string(),
            location: draft.location.trim().to_string(),
            issue_types: dedup_issue_types(draft.issue_types),
            description: draft.description,
            entry_authorized,
            photo_url: draft.photo_url.filter(|p| !p.trim().is_empty()),
            status: TicketStatus::New,
            assigned_worker: None,
            date_submitted: submitted_at,
            date_completed: None,
            hebrew_translation: None,
        })
    }

    /// The example ticket a brand new desk starts with
    pub fn seed(now: DateTime<Utc>) -> Self {
        Self {
            id: TicketId::new(1001),
            requester_name: "Ariel Goldberg".to_string(),
            requester_email: "ariel.g@mail.yu.edu".to_string(),
            whatsapp_number: "+972501234567".to_string(),
            location: "Gruss Campus, Room 204".to_string(),
            issue_types: vec![IssueType::AirConditioner, IssueType::Electricity],
            description: "AC is leaking water onto the electrical socket.".to_string(),
            entry_authorized: true,
            photo_url: None,
            status: TicketStatus::New,
            assigned_worker: None,
            date_submitted: now - Duration::hours(1),
            date_completed: None,
            hebrew_translation: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status.is_done()
    }

    /// Digits of the WhatsApp number, as used in contact links
    pub fn whatsapp_digits(&self) -> String {
        self.whatsapp_number
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect()
    }

    pub fn whatsapp_link(&self) -> Option<String> {
        let digits = self.whatsapp_digits();
        (!digits.is_empty()).then(|| format!("https://wa.me/{}", digits))
    }

    pub fn phone_link(&self) -> Option<String> {
        let digits = self.whatsapp_digits();
        (!digits.is_empty()).then(|| format!("tel:{}", digits))
    }

    pub fn mailto_link(&self) -> String {
        format!(
            "mailto:{}?subject=Maintenance Request Update: {}",
            self.requester_email, self.id
        )
    }

    /// Checks the invariants every stored ticket must satisfy
    pub fn check_invariants(&self) -> Result<()> {
        if self.issue_types.is_empty() {
            return Err(FixdeskError::validation(
                "issueTypes",
                "a ticket needs at least one issue category",
            ));
        }
        if self.status.is_done() != self.date_completed.is_some() {
            return Err(FixdeskError::validation(
                "dateCompleted",
                format!("completion date does not match status {}", self.status),
            ));
        }
        Ok(())
    }
}

/// A partial update; `None` leaves the field as it is.
///
/// Nested options distinguish "leave alone" (`None`) from "clear"
/// (`Some(None)`) for the optional ticket fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketUpdate {
    pub requester_name: Option<String>,
    pub requester_email: Option<String>,
    pub whatsapp_number: Option<String>,
    pub location: Option<String>,
    pub issue_types: Option<Vec<IssueType>>,
    pub description: Option<String>,
    pub entry_authorized: Option<bool>,
    pub photo_url: Option<Option<String>>,
    pub status: Option<TicketStatus>,
    pub assigned_worker: Option<Option<String>>,
    pub hebrew_translation: Option<Option<String>>,
}

impl TicketUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(status: TicketStatus) -> Self {
        Self::new().with_status(status)
    }

    pub fn assign(worker: impl Into<String>) -> Self {
        Self {
            assigned_worker: Some(Some(worker.into())),
            ..Self::default()
        }
    }

    pub fn unassign() -> Self {
        Self {
            assigned_worker: Some(None),
            ..Self::default()
        }
    }

    pub fn translation(text: impl Into<String>) -> Self {
        Self {
            hebrew_translation: Some(Some(text.into())),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_issue_types(mut self, issue_types: Vec<IssueType>) -> Self {
        self.issue_types = Some(issue_types);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
