//! Record-level errors.
//!
//! None of these abort a batch on their own: callers collect them, log them
//! and keep going with the remaining records.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("malformed record {record}: {reason}")]
    Malformed { record: String, reason: String },

    #[error("duplicate identifier: {id}")]
    Duplicate { id: String },
}

impl RecordError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn malformed(record: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            record: record.into(),
            reason: reason.into(),
        }
    }
}
