use thiserror::Error;

pub type Result<T> = std::result::Result<T, FixdeskError>;

#[derive(Debug, Error)]
pub enum FixdeskError {
    #[error("Ticket not found: {0}")]
    TicketNotFound(String),

    #[error("Invalid ticket ID format: {0}")]
    InvalidTicketId(String),

    #[error("Invalid value for {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Invalid ticket status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Cannot {action} a ticket that is {status}")]
    InvalidAction { action: String, status: String },

    #[error("Worker is not on the staff roster: {0}")]
    UnknownWorker(String),

    #[error("Passcode does not match")]
    AuthFailed,

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl FixdeskError {
    /// Shorthand for a rejected draft field
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

impl From<csv::Error> for FixdeskError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}

impl From<crate::config::ConfigError> for FixdeskError {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}
