//! Error types for zjuical.

use thiserror::Error;

use crate::term::Term;

/// Errors that can occur while turning scraped records into a calendar.
#[derive(Error, Debug)]
pub enum ZjuicalError {
    #[error("Unsupported term tags '{0}' (expected only 春/夏/秋/冬)")]
    TermTags(String),

    #[error("Invalid value for field '{field}': {reason}")]
    Field { field: &'static str, reason: String },

    #[error("Unknown period number: {0}")]
    UnknownPeriod(u32),

    #[error("Unknown day of week: {0}")]
    UnknownWeekday(u32),

    #[error("Malformed exam time '{0}'")]
    ExamTime(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No term configuration for {year}-{term}")]
    TermNotConfigured { year: String, term: Term },

    #[error("Snapshot has no course records for {year}-{term}")]
    MissingRecords { year: String, term: Term },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("ICS generation error: {0}")]
    IcsGenerate(String),
}

impl ZjuicalError {
    pub(crate) fn field(field: &'static str, reason: impl Into<String>) -> Self {
        ZjuicalError::Field {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type alias for zjuical operations.
pub type ZjuicalResult<T> = Result<T, ZjuicalError>;
