//! Testing utilities and mock implementations.
//!
//! Mocks for the translation service and for a storage backend whose writes
//! can be made to fail, plus fixtures for building valid drafts.
//!
//! # Example
//!
//! ```rust,ignore
//! use fixdesk_core::testing::{MockTranslator, FailingStorage};
//!
//! let translator = MockTranslator::new("תרגום");
//! let storage = FailingStorage::new();
//! storage.set_fail_writes(true);
//! ```

mod failing_storage;
mod mock_translator;

pub use failing_storage::FailingStorage;
pub use mock_translator::MockTranslator;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::domain::{IssueType, TicketDraft};

    /// A draft that passes validation.
    pub fn draft(name: &str, description: &str) -> TicketDraft {
        TicketDraft {
            requester_name: name.to_string(),
            requester_email: format!("{}@mail.yu.edu", name.to_lowercase().replace(' ', ".")),
            whatsapp_number: "+972 50-765-4321".to_string(),
            location: "Gruss Campus, Room 310".to_string(),
            issue_types: vec![IssueType::Plumbing],
            description: description.to_string(),
            entry_authorized: Some(true),
            photo_url: None,
        }
    }

    /// A draft with a description that needs CSV quoting.
    pub fn awkward_draft() -> TicketDraft {
        TicketDraft {
            description: "Leak under sink, \"urgent\"\nsecond line".to_string(),
            location: "Room 12, Block B".to_string(),
            ..draft("Dana Katz", "")
        }
    }
}
