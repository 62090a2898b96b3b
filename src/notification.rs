//! Records the resolution email a ticket would trigger.
//!
//! No mail is sent. The [`EmailLog`] is the audit record of what would have
//! gone out; a real transport must produce exactly the same record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::info;
use uuid::Uuid;

use crate::domain::ticket::Ticket;

pub const DEFAULT_CC_ADDRESS: &str = "gabi.sackett@yu.edu";
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

const DESCRIPTION_PREVIEW_CHARS: usize = 30;
const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailLog {
    pub id: String,
    pub to: String,
    pub cc: String,
    pub subject: String,
    pub body: String,
    pub timestamp: DateTime<Utc>,
}

/// Builds resolution notices for completed tickets
#[derive(Debug, Clone)]
pub struct NotificationRecorder {
    cc_address: String,
}

impl NotificationRecorder {
    pub fn new(cc_address: impl Into<String>) -> Self {
        Self {
            cc_address: cc_address.into(),
        }
    }

    pub fn cc_address(&self) -> &str {
        &self.cc_address
    }

    /// Builds the log entry for `ticket` and emits it to the trace log
    pub fn record(&self, ticket: &Ticket, at: DateTime<Utc>) -> EmailLog {
        let log = EmailLog {
            id: format!("email-{}", Uuid::new_v4()),
            to: ticket.requester_email.clone(),
            cc: self.cc_address.clone(),
            subject: format!("Maintenance Request Resolved - {}", ticket.id),
            body: format!(
                "Your maintenance request regarding [{}] has been resolved.",
                preview(&ticket.description)
            ),
            timestamp: at,
        };

        info!(
            ticket_id = %ticket.id,
            email_id = %log.id,
            to = %log.to,
            cc = %log.cc,
            subject = %log.subject,
            body = %log.body,
            "Resolution email recorded"
        );

        log
    }
}

impl Default for NotificationRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_CC_ADDRESS)
    }
}

/// First 30 characters of the description, with an ellipsis if cut
fn preview(description: &str) -> String {
    let mut chars = description.chars();
    let head: String = chars.by_ref().take(DESCRIPTION_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}{}", head, ELLIPSIS)
    } else {
        head
    }
}

/// Most recent notifications, newest first
#[derive(Debug, Clone)]
pub struct NotificationHistory {
    entries: VecDeque<EmailLog>,
    limit: usize,
}

impl NotificationHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    pub fn push(&mut self, log: EmailLog) {
        self.entries.push_front(log);
        self.entries.truncate(self.limit);
    }

    pub fn recent(&self, count: usize) -> Vec<EmailLog> {
        self.entries.iter().take(count).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for NotificationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket_with_description(description: &str) -> Ticket {
        let mut ticket = Ticket::seed(Utc::now());
        ticket.description = description.to_string();
        ticket
    }

    #[test]
    fn test_record_shape() {
        let now = Utc::now();
        let recorder = NotificationRecorder::new("office@campus.example");
        let ticket = ticket_with_description("Bulb is out");

        let log = recorder.record(&ticket, now);
        assert!(log.id.starts_with("email-"));
        assert_eq!(log.to, "ariel.g@mail.yu.edu");
        assert_eq!(log.cc, "office@campus.example");
        assert_eq!(log.subject, "Maintenance Request Resolved - TKT-1001");
        assert_eq!(
            log.body,
            "Your maintenance request regarding [Bulb is out] has been resolved."
        );
        assert_eq!(log.timestamp, now);
    }

    #[test]
    fn test_long_description_is_truncated() {
        let recorder = NotificationRecorder::default();
        let log = recorder.record(&ticket_with_description(&"x".repeat(40)), Utc::now());
        let expected = format!("[{}...]", "x".repeat(30));
        assert!(log.body.contains(&expected));
    }

    #[test]
    fn test_exactly_thirty_chars_has_no_ellipsis() {
        assert_eq!(preview(&"y".repeat(30)), "y".repeat(30));
        assert_eq!(preview(&"y".repeat(31)), format!("{}...", "y".repeat(30)));
    }

    #[test]
    fn test_truncation_counts_characters() {
        let hebrew = "מזגן מטפטף מים על השקע החשמלי בחדר";
        let cut = preview(hebrew);
        assert_eq!(cut.chars().count(), 33);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_record_ids_are_unique() {
        let recorder = NotificationRecorder::default();
        let ticket = ticket_with_description("Door sticks");
        let a = recorder.record(&ticket, Utc::now());
        let b = recorder.record(&ticket, Utc::now());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_history_is_newest_first_and_capped() {
        let recorder = NotificationRecorder::default();
        let mut history = NotificationHistory::new(2);
        for description in ["one", "two", "three"] {
            history.push(recorder.record(&ticket_with_description(description), Utc::now()));
        }

        assert_eq!(history.len(), 2);
        let recent = history.recent(3);
        assert!(recent[0].body.contains("[three]"));
        assert!(recent[1].body.contains("[two]"));
    }

    #[test]
    fn test_huge_history_limit_allocates_lazily() {
        let mut history = NotificationHistory::new(usize::MAX);
        assert!(history.is_empty());

        history.push(NotificationRecorder::default().record(&ticket_with_description("Fan"), Utc::now()));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_default_cc_is_facilities_office() {
        let log = NotificationRecorder::default().record(&ticket_with_description("Fan"), Utc::now());
        assert_eq!(log.cc, "gabi.sackett@yu.edu");
    }
}
