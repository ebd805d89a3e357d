//! Error types for taskdesk operations.

use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskdeskError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Form is read-only in view mode")]
    ReadOnlyForm,
}

pub type Result<T> = std::result::Result<T, TaskdeskError>;

/// Why a single leave interval was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReason {
    /// `start_date` could not be parsed as `YYYY-MM-DD`.
    UnparseableStart,
    /// `end_date` could not be parsed as `YYYY-MM-DD`.
    UnparseableEnd,
    /// `start_date` falls after `end_date`.
    EndBeforeStart,
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationReason::UnparseableStart => f.write_str("unparseable start_date"),
            ValidationReason::UnparseableEnd => f.write_str("unparseable end_date"),
            ValidationReason::EndBeforeStart => f.write_str("end_date is before start_date"),
        }
    }
}

/// A malformed leave interval, named by its position in the source list and
/// its raw bounds.
///
/// These are collected per interval and never abort a whole evaluation: the
/// offending interval is dropped and the rest are kept.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid leave interval #{index} ({start_date} .. {end_date}): {reason}")]
pub struct ValidationError {
    pub index: usize,
    pub start_date: String,
    pub end_date: String,
    pub reason: ValidationReason,
}
