//! Storage errors.

use std::path::PathBuf;

/// The tables kept by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    TopicGraph,
    Students,
    History,
    Resources,
    StudyPlan,
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Table::TopicGraph => write!(f, "topic graph"),
            Table::Students => write!(f, "student records"),
            Table::History => write!(f, "confidence history"),
            Table::Resources => write!(f, "resources"),
            Table::StudyPlan => write!(f, "study plan"),
        }
    }
}

/// Errors raised while loading or persisting tables.
///
/// A missing table is reported as [`StoreError::Missing`], which is distinct
/// from a table that exists but has no rows.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{table} table not found at {}", path.display())]
    Missing { table: Table, path: PathBuf },

    #[error("failed to read {table} table from {}: {source}", path.display())]
    Read {
        table: Table,
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write {table} table to {}: {source}", path.display())]
    Write {
        table: Table,
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A writer panicked while holding the store lock.
    #[error("store lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;
