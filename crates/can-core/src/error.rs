//! Error types for batch reconciliation
//!
//! Neither type aborts a batch: update failures keep the record staged and
//! notification failures are reported alongside the applied changes.

use std::fmt::Display;

/// Errors while writing a staged change to the arrival backend
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    /// Backend has no such arrival line
    #[error("arrival line {line_id} not found on {document_number}")]
    NotFound {
        /// Document the line belongs to
        document_number: String,
        /// Line that was looked up
        line_id: i64,
    },

    /// Proposed arrival date was cleared or unreadable
    #[error("no concrete arrival date staged for {document_number}")]
    MissingArrivalDate {
        /// Document whose change is incomplete
        document_number: String,
    },

    /// Backend rejected or failed the write
    #[error("backend error: {0}")]
    Backend(String),
}

impl UpdateError {
    /// Create backend error from any displayable cause
    pub fn backend(cause: impl Display) -> Self {
        Self::Backend(cause.to_string())
    }
}

/// Errors while telling an owner about applied changes
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Message could not be delivered
    #[error("could not notify {owner}: {message}")]
    Delivery {
        /// Intended recipient
        owner: String,
        /// Delivery failure detail
        message: String,
    },
}

impl NotifyError {
    /// Create delivery error
    pub fn delivery(owner: impl Into<String>, message: impl Display) -> Self {
        Self::Delivery {
            owner: owner.into(),
            message: message.to_string(),
        }
    }
}
