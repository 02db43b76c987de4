//! Error types for the staging store
//!
//! Only staging itself can fail from the caller's point of view. Channel and
//! restore errors are resolved inside the persistence bridge and surface as
//! log lines and [`PersistOutcome`](crate::PersistOutcome) values.

use can_record::RecordError;
use std::path::PathBuf;

/// Errors returned by staging operations
#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    /// The record could not be built
    #[error("cannot stage change: {0}")]
    Record(#[from] RecordError),
}

impl StagingError {
    /// Check if the rejection was a no-op edit
    #[inline]
    #[must_use]
    pub fn is_no_op(&self) -> bool {
        matches!(self, Self::Record(err) if err.is_no_op())
    }
}

/// Errors from a persistence channel
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// IO error on a file-backed slot
    #[error("io error on slot {path}: {source}")]
    Io {
        /// Slot file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl ChannelError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Reasons a persisted payload could not be restored
#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    /// Payload is not the expected JSON shape
    #[error("invalid payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Map key and record disagree on the document number
    #[error("payload key '{key}' holds record for '{document_number}'")]
    KeyMismatch {
        /// Key in the payload
        key: String,
        /// Document number inside the record
        document_number: String,
    },

    /// Slot could not be read
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staging_error_wraps_record_error() {
        let err: StagingError = RecordError::NoOpEdit {
            document_number: "CAN-1".to_string(),
        }
        .into();
        assert!(err.is_no_op());
        assert_eq!(err.to_string(), "cannot stage change: no changes detected for CAN-1");

        let err: StagingError = RecordError::missing("line_id").into();
        assert!(!err.is_no_op());
    }

    #[test]
    fn key_mismatch_display() {
        let err = RestoreError::KeyMismatch {
            key: "CAN-1".to_string(),
            document_number: "CAN-2".to_string(),
        };
        assert_eq!(err.to_string(), "payload key 'CAN-1' holds record for 'CAN-2'");
    }
}
