use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClefError {
    #[error("Not in a clef workspace. Run 'clef init' first.")]
    NotInitialized,

    #[error("Already initialized. Remove .clef/ to reinitialize.")]
    AlreadyInitialized,

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("ID '{0}' matches more than one record. Use a longer prefix.")]
    AmbiguousId(String),

    #[error("Invalid value: {0}")]
    InvalidInput(String),

    #[error("Invalid record kind: {0}")]
    InvalidRecordKind(String),

    #[error("Invalid date range: {end} is before {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),

    #[error("Permission denied: role {role} cannot {action}")]
    PermissionDenied { role: String, action: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClefError>;
