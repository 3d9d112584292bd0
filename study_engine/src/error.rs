//! Error types for the study engine.

use learning_records::StoreError;
use std::path::PathBuf;

/// Malformed caller input. Plan creation aborts on any of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid start date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid hours per day '{0}', expected a positive integer")]
    InvalidHours(String),

    #[error("invalid days available '{0}', expected a positive integer")]
    InvalidDays(String),

    #[error("a weekly plan can use at most 7 days per week, got {0}")]
    DaysExceedWeek(u32),

    #[error("no topics selected for the study plan")]
    NoTopics,

    #[error("study plan runs past the last representable date")]
    DateOutOfRange,

    #[error("unknown confidence filter '{0}', expected all, weak, moderate or strong")]
    UnknownFilter(String),
}

/// Errors raised by a calendar export collaborator.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to encode study plan: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by the tracker.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("failed to read configuration {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
