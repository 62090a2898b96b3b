use crate::domain::ticket::{Ticket, TicketStatus};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::str::FromStr;

/// Fields available for sorting tickets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Requester,
    Location,
    Status,
    Submitted,
    Completed,
}

/// Sort order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Which part of the board a listing covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListScope {
    /// Everything not yet done
    Queue,
    /// Resolved tickets only
    History,
    #[default]
    All,
}

impl ListScope {
    pub fn includes(&self, status: TicketStatus) -> bool {
        match self {
            Self::Queue => !status.is_done(),
            Self::History => status.is_done(),
            Self::All => true,
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "id" => Ok(SortField::Id),
            "requester" | "name" => Ok(SortField::Requester),
            "location" => Ok(SortField::Location),
            "status" => Ok(SortField::Status),
            "submitted" => Ok(SortField::Submitted),
            "completed" => Ok(SortField::Completed),
            _ => Err(format!(
                "Invalid sort field '{}'. Valid fields: id, requester, location, status, submitted, completed",
                s
            )),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Ascending),
            "desc" => Ok(SortOrder::Descending),
            _ => Err(format!(
                "Invalid sort order '{}'. Valid orders: asc, desc",
                s
            )),
        }
    }
}

impl FromStr for ListScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "queue" => Ok(ListScope::Queue),
            "history" => Ok(ListScope::History),
            "all" => Ok(ListScope::All),
            _ => Err(format!(
                "Invalid scope '{}'. Valid scopes: queue, history, all",
                s
            )),
        }
    }
}

/// Filter for `Desk::list_tickets`
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub scope: ListScope,
    /// Case-insensitive match against requester name or location
    pub search: Option<String>,
    pub sort: Option<(SortField, SortOrder)>,
}

impl TicketFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue() -> Self {
        Self::new().with_scope(ListScope::Queue)
    }

    pub fn history() -> Self {
        Self::new().with_scope(ListScope::History)
    }

    pub fn with_scope(mut self, scope: ListScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn sorted_by(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort = Some((field, order));
        self
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        if !self.scope.includes(ticket.status) {
            return false;
        }

        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                ticket.requester_name.to_lowercase().contains(&term)
                    || ticket.location.to_lowercase().contains(&term)
            }
        }
    }

    /// Filters and, if asked, sorts; otherwise collection order is kept
    pub fn apply<'a, I>(&self, tickets: I) -> Vec<Ticket>
    where
        I: IntoIterator<Item = &'a Ticket>,
    {
        let mut selected: Vec<Ticket> = tickets
            .into_iter()
            .filter(|t| self.matches(t))
            .cloned()
            .collect();

        if let Some((field, order)) = self.sort {
            sort_tickets(&mut selected, field, order);
        }
        selected
    }
}

/// Main sorting function for tickets
///
/// Sorts a slice of tickets in-place based on the specified field and order.
/// The sort is stable, so ties keep their collection order.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use fixdesk_core::domain::sorting::{sort_tickets, SortField, SortOrder};
/// use fixdesk_core::domain::ticket::{Ticket, TicketId};
///
/// let now = Utc::now();
/// let mut tickets: Vec<Ticket> = [1003, 1001, 1002]
///     .into_iter()
///     .map(|n| Ticket { id: TicketId::new(n), ..Ticket::seed(now) })
///     .collect();
///
/// sort_tickets(&mut tickets, SortField::Id, SortOrder::Ascending);
/// assert_eq!(tickets[0].id.as_str(), "TKT-1001");
/// ```
pub fn sort_tickets(tickets: &mut [Ticket], field: SortField, order: SortOrder) {
    tickets.sort_by(|a, b| {
        let cmp = match field {
            SortField::Id => compare_ids(a, b),
            SortField::Requester => a
                .requester_name
                .to_lowercase()
                .cmp(&b.requester_name.to_lowercase()),
            SortField::Location => a.location.to_lowercase().cmp(&b.location.to_lowercase()),
            SortField::Status => compare_status(&a.status, &b.status),
            SortField::Submitted => a.date_submitted.cmp(&b.date_submitted),
            SortField::Completed => {
                // Missing dates stay at the end in either direction
                return compare_option_dates(a.date_completed, b.date_completed, order);
            }
        };

        match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });
}

/// Numeric ids compare by number so TKT-999 sorts before TKT-1000
fn compare_ids(a: &Ticket, b: &Ticket) -> Ordering {
    match (a.id.number(), b.id.number()) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a.id.as_str().cmp(b.id.as_str()),
    }
}

/// Compare ticket status by logical workflow progression
///
/// Status order: New → Assigned → InProcess → PartsOrdered → Done
fn compare_status(a: &TicketStatus, b: &TicketStatus) -> Ordering {
    fn status_order(s: &TicketStatus) -> u8 {
        match s {
            TicketStatus::New => 0,
            TicketStatus::Assigned => 1,
            TicketStatus::InProcess => 2,
            TicketStatus::PartsOrdered => 3,
            TicketStatus::Done => 4,
        }
    }
    status_order(a).cmp(&status_order(b))
}

/// Compare Option<DateTime> with None always sorting to end
fn compare_option_dates(
    a: Option<DateTime<Utc>>,
    b: Option<DateTime<Utc>>,
    order: SortOrder,
) -> Ordering {
    match (a, b) {
        (Some(a_date), Some(b_date)) => match order {
            SortOrder::Ascending => a_date.cmp(&b_date),
            SortOrder::Descending => b_date.cmp(&a_date),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
