pub mod roster;
pub mod sorting;
pub mod ticket;
pub mod workflow;

pub use roster::{AdminPasscode, StaffRoster};
pub use sorting::{sort_tickets, ListScope, SortField, SortOrder, TicketFilter};
pub use ticket::{IssueType, Ticket, TicketDraft, TicketId, TicketStatus, TicketUpdate};
pub use workflow::{apply_action, apply_update, SideEffect, TicketAction, Transition};
