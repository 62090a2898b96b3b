//! Status workflow engine.
//!
//! Pure functions mapping a ticket plus a requested change to the next
//! ticket and the side effects the caller has to run. Nothing here touches
//! storage, the clock or the notification sink; the caller passes `now`.
//!
//! ```text
//! New -> Assigned -> InProcess <-> PartsOrdered -> Done
//!  \______________/^     \__________________________/^
//! Done -> InProcess (worker assigned) | New (no worker)
//! any  -> New (reset)
//! ```

use chrono::{DateTime, Utc};
use std::fmt;

use crate::domain::ticket::{dedup_issue_types, is_valid_email, Ticket, TicketStatus, TicketUpdate};
use crate::error::{FixdeskError, Result};

/// Staff-facing operations on a ticket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketAction {
    /// Put a worker on the ticket; advances `New` to `Assigned`
    Assign(String),
    Unassign,
    StartWork,
    OrderPart,
    ResumeWork,
    MarkDone,
    /// Back out of `Done`, to `InProcess` if someone is assigned, else `New`
    Reopen,
    /// Back to `New` with no worker and no completion date, from any state
    Reset,
}

impl TicketAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Assign(_) => "assign",
            Self::Unassign => "unassign",
            Self::StartWork => "start work",
            Self::OrderPart => "order part",
            Self::ResumeWork => "resume work",
            Self::MarkDone => "mark done",
            Self::Reopen => "reopen",
            Self::Reset => "reset",
        }
    }

    /// Translates the action into the partial update it stands for,
    /// rejecting it when the ticket is not in one of its source states.
    pub fn to_update(&self, ticket: &Ticket) -> Result<TicketUpdate> {
        use TicketStatus::*;

        let status = ticket.status;
        let legal = match self {
            Self::Assign(_) | Self::Unassign => status != Done,
            Self::StartWork => matches!(status, New | Assigned),
            Self::OrderPart => matches!(status, Assigned | InProcess),
            Self::ResumeWork => status == PartsOrdered,
            Self::MarkDone => matches!(status, InProcess | PartsOrdered),
            Self::Reopen => status == Done,
            Self::Reset => true,
        };

        if !legal {
            return Err(FixdeskError::InvalidAction {
                action: self.name().to_string(),
                status: status.to_string(),
            });
        }

        let update = match self {
            Self::Assign(worker) => TicketUpdate::assign(worker.clone()),
            Self::Unassign => TicketUpdate::unassign(),
            Self::StartWork | Self::ResumeWork => TicketUpdate::status(InProcess),
            Self::OrderPart => TicketUpdate::status(PartsOrdered),
            Self::MarkDone => TicketUpdate::status(Done),
            Self::Reopen => {
                if ticket.assigned_worker.is_some() {
                    TicketUpdate::status(InProcess)
                } else {
                    TicketUpdate::status(New)
                }
            }
            Self::Reset => TicketUpdate {
                assigned_worker: Some(None),
                ..TicketUpdate::status(New)
            },
        };

        Ok(update)
    }
}

impl fmt::Display for TicketAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assign(worker) => write!(f, "assign {}", worker),
            other => f.write_str(other.name()),
        }
    }
}

/// Work the caller must carry out after committing a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    /// The ticket just entered `Done`; tell the requester
    NotifyResolved,
}

/// Outcome of applying an update to a ticket
#[derive(Debug, Clone)]
pub struct Transition {
    pub previous_status: TicketStatus,
    pub ticket: Ticket,
    pub effects: Vec<SideEffect>,
}

impl Transition {
    pub fn status_changed(&self) -> bool {
        self.previous_status != self.ticket.status
    }

    pub fn entered_done(&self) -> bool {
        self.effects.contains(&SideEffect::NotifyResolved)
    }
}

/// Merges `update` into `current`.
///
/// Fields present in the update overwrite, absent ones are kept. An explicit
/// status must be an edge of the workflow graph or the whole update is
/// rejected. Without an explicit status, assigning a worker to a `New`
/// ticket advances it to `Assigned`. `date_completed` always follows the
/// status: stamped on entry into `Done`, kept on `Done -> Done`, cleared
/// otherwise.
pub fn apply_update(current: &Ticket, update: &TicketUpdate, now: DateTime<Utc>) -> Result<Transition> {
    let mut next = current.clone();

    if let Some(name) = &update.requester_name {
        next.requester_name = non_blank("requesterName", name)?;
    }
    if let Some(email) = &update.requester_email {
        let email = non_blank("requesterEmail", email)?;
        if !is_valid_email(&email) {
            return Err(FixdeskError::validation(
                "requesterEmail",
                "please enter a valid email address",
            ));
        }
        next.requester_email = email;
    }
    if let Some(number) = &update.whatsapp_number {
        next.whatsapp_number = non_blank("whatsappNumber", number)?;
    }
    if let Some(location) = &update.location {
        next.location = non_blank("location", location)?;
    }
    if let Some(types) = &update.issue_types {
        if types.is_empty() {
            return Err(FixdeskError::validation(
                "issueTypes",
                "a ticket needs at least one issue category",
            ));
        }
        next.issue_types = dedup_issue_types(types.clone());
    }
    if let Some(description) = &update.description {
        non_blank("description", description)?;
        next.description = description.clone();
    }
    if let Some(entry) = update.entry_authorized {
        next.entry_authorized = entry;
    }
    if let Some(photo) = &update.photo_url {
        next.photo_url = non_empty(photo);
    }
    if let Some(worker) = &update.assigned_worker {
        next.assigned_worker = non_empty(worker).map(|w| w.trim().to_string());
    }
    if let Some(translation) = &update.hebrew_translation {
        next.hebrew_translation = non_empty(translation);
    }

    let target = match update.status {
        Some(status) => status,
        None if current.status == TicketStatus::New
            && matches!(update.assigned_worker, Some(Some(ref w)) if !w.trim().is_empty()) =>
        {
            TicketStatus::Assigned
        }
        None => current.status,
    };

    if !current.status.can_transition_to(&target) {
        return Err(FixdeskError::InvalidStatusTransition {
            from: current.status.to_string(),
            to: target.to_string(),
        });
    }

    let mut effects = Vec::new();
    next.status = target;
    next.date_completed = match (current.status.is_done(), target.is_done()) {
        (false, true) => {
            effects.push(SideEffect::NotifyResolved);
            Some(now)
        }
        (true, true) => current.date_completed.or(Some(now)),
        (_, false) => None,
    };

    Ok(Transition {
        previous_status: current.status,
        ticket: next,
        effects,
    })
}

/// Applies a staff action, checking it against its source states first
pub fn apply_action(current: &Ticket, action: &TicketAction, now: DateTime<Utc>) -> Result<Transition> {
    let update = action.to_update(current)?;
    apply_update(current, &update, now)
}

fn non_blank(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FixdeskError::validation(field, "field is required"));
    }
    Ok(trimmed.to_string())
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .filter(|v| !v.trim().is_empty())
        .cloned()
}
