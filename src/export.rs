//! CSV export of resolved tickets.

use crate::domain::ticket::Ticket;
use crate::error::{FixdeskError, Result};

pub const EXPORT_FILENAME: &str = "Maintenance_History.csv";
pub const EXPORT_MIME_TYPE: &str = "text/csv";

const HEADER: [&str; 8] = [
    "ID",
    "Name",
    "Email",
    "WhatsApp",
    "Location",
    "Description",
    "Worker",
    "Date",
];

/// A ready-to-download export file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: &'static str,
    pub mime_type: &'static str,
    pub content: String,
    rows: usize,
}

impl ExportArtifact {
    /// Number of data rows, header excluded
    pub fn row_count(&self) -> usize {
        self.rows
    }
}

/// Serializes the `Done` subset of `tickets`.
///
/// Returns `Ok(None)` when there is nothing resolved, so callers never
/// produce a header-only file. Every field is quoted when it contains a
/// delimiter, quote or line break.
pub fn export_done<'a, I>(tickets: I) -> Result<Option<ExportArtifact>>
where
    I: IntoIterator<Item = &'a Ticket>,
{
    let done: Vec<&Ticket> = tickets.into_iter().filter(|t| t.is_done()).collect();
    if done.is_empty() {
        return Ok(None);
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for ticket in &done {
        let submitted = ticket.date_submitted.to_rfc3339();
        writer.write_record([
            ticket.id.as_str(),
            ticket.requester_name.as_str(),
            ticket.requester_email.as_str(),
            ticket.whatsapp_number.as_str(),
            ticket.location.as_str(),
            ticket.description.as_str(),
            ticket.assigned_worker.as_deref().unwrap_or(""),
            submitted.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| FixdeskError::Export(e.to_string()))?;
    let content = String::from_utf8(bytes).map_err(|e| FixdeskError::Export(e.to_string()))?;

    Ok(Some(ExportArtifact {
        filename: EXPORT_FILENAME,
        mime_type: EXPORT_MIME_TYPE,
        content,
        rows: done.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ticket::{TicketId, TicketStatus};
    use chrono::Utc;

    fn done_ticket(n: u32, description: &str) -> Ticket {
        let now = Utc::now();
        let mut ticket = Ticket::seed(now);
        ticket.id = TicketId::new(n);
        ticket.description = description.to_string();
        ticket.status = TicketStatus::Done;
        ticket.assigned_worker = Some("Beni".to_string());
        ticket.date_completed = Some(now);
        ticket
    }

    #[test]
    fn test_empty_input_produces_no_artifact() {
        assert!(export_done(&Vec::<Ticket>::new()).unwrap().is_none());
    }

    #[test]
    fn test_only_open_tickets_produces_no_artifact() {
        let open = vec![Ticket::seed(Utc::now())];
        assert!(export_done(&open).unwrap().is_none());
    }

    #[test]
    fn test_header_plus_one_row_per_done_ticket() {
        let tickets = vec![
            done_ticket(1, "Fixed light"),
            Ticket::seed(Utc::now()),
            done_ticket(2, "Replaced lock"),
        ];

        let artifact = export_done(&tickets).unwrap().unwrap();
        assert_eq!(artifact.filename, "Maintenance_History.csv");
        assert_eq!(artifact.mime_type, "text/csv");

        let lines: Vec<&str> = artifact.content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "ID,Name,Email,WhatsApp,Location,Description,Worker,Date");
        assert!(lines[1].starts_with("TKT-1,Ariel Goldberg,ariel.g@mail.yu.edu,+972501234567,"));
        assert!(lines[2].starts_with("TKT-2,"));
        assert_eq!(artifact.row_count(), 2);
    }

    #[test]
    fn test_delimiters_and_quotes_are_escaped_in_every_field() {
        // The seed location contains a comma, the description a quote
        let ticket = done_ticket(7, r#"Says "urgent", please"#);
        let artifact = export_done(&[ticket.clone()]).unwrap().unwrap();

        let mut reader = csv::Reader::from_reader(artifact.content.as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[0], "TKT-7");
        assert_eq!(&record[4], "Gruss Campus, Room 204");
        assert_eq!(&record[5], r#"Says "urgent", please"#);
        assert_eq!(&record[6], "Beni");
        assert_eq!(&record[7], ticket.date_submitted.to_rfc3339());
        assert!(artifact.content.contains(r#""Says ""urgent"", please""#));
    }

    #[test]
    fn test_unassigned_worker_is_blank() {
        let mut ticket = done_ticket(9, "Painted wall");
        ticket.assigned_worker = None;
        let artifact = export_done(&[ticket]).unwrap().unwrap();

        let mut reader = csv::Reader::from_reader(artifact.content.as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[6], "");
    }
}
