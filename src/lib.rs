//! # Fixdesk Core
//!
//! Core business logic for a campus maintenance desk: residents file
//! repair tickets, staff move them through a guarded workflow, and
//! completed work is exported for the records.
//!
//! The crate has no UI. A front end talks to a [`Desk`], which owns the
//! ticket store, the staff roster and the admin passcode, and persists them
//! through a [`Storage`] backend. Resolution notices are recorded as
//! [`EmailLog`] entries rather than sent, and work descriptions can be
//! translated for staff by an injected [`Translator`].

pub mod clock;
pub mod config;
pub mod desk;
pub mod domain;
pub mod error;
pub mod export;
pub mod notification;
pub mod storage;
pub mod store;
pub mod testing;
pub mod translation;

// Re-export commonly used types
pub use config::{load_config, validate_config, Config};
pub use desk::{Desk, DeskBuilder};
pub use domain::{
    ticket::{IssueType, Ticket, TicketDraft, TicketId, TicketStatus, TicketUpdate},
    workflow::TicketAction,
    ListScope, SortField, SortOrder, StaffRoster, TicketFilter,
};
pub use error::{FixdeskError, Result};
pub use export::ExportArtifact;
pub use notification::EmailLog;
pub use storage::Storage;
pub use translation::{TranslationError, Translator};
