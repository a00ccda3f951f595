//! The module contains the errors the engine can report.
//!
//! The errors are:
//!
//! - [`StorageError`] returned by a [`KeyValueStore`] when reading or writing
//!   fails. The store never propagates it: it logs and falls back.
//! - [`CriteriaError`] returned when a raw filter value cannot be parsed.
//! - [`CalendarError`] returned when a timezone name is unknown.
//!
//!  [`KeyValueStore`]: crate::storage::KeyValueStore
use thiserror::Error;

/// Errors of the pluggable key-value storage.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Raised by the `FromStr` impls of the filter values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CriteriaError {
    #[error("unknown date filter \"{0}\"")]
    UnknownDateFilter(String),
    #[error("unknown transaction type filter \"{0}\"")]
    UnknownTypeFilter(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("unknown timezone \"{0}\"")]
    UnknownTimezone(String),
}

impl PartialEq for StorageError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Io(a), Self::Io(b)) => a.kind() == b.kind(),
            (Self::Json(a), Self::Json(b)) => a.to_string() == b.to_string(),
            (Self::Unavailable(a), Self::Unavailable(b)) => a == b,
            _ => false,
        }
    }
}
