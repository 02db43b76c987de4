//! Error types for change records

/// Errors raised while building or parsing a change record
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// A required identity field was missing or blank
    #[error("missing required field: {field}")]
    Validation {
        /// Name of the missing field
        field: &'static str,
    },

    /// Original and proposed values are equal on every axis
    #[error("no changes detected for {document_number}")]
    NoOpEdit {
        /// Document the edit was aimed at
        document_number: String,
    },

    /// Status text matched no known arrival status
    #[error("unknown arrival status: '{0}'")]
    UnknownStatus(String),
}

impl RecordError {
    /// Create validation error for field
    #[inline]
    #[must_use]
    pub fn missing(field: &'static str) -> Self {
        Self::Validation { field }
    }

    /// Check if error is a no-op edit rejection
    #[inline]
    #[must_use]
    pub fn is_no_op(&self) -> bool {
        matches!(self, Self::NoOpEdit { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display() {
        let err = RecordError::missing("document_number");
        assert_eq!(err.to_string(), "missing required field: document_number");
    }

    #[test]
    fn no_op_display() {
        let err = RecordError::NoOpEdit {
            document_number: "CAN-7".to_string(),
        };
        assert!(err.is_no_op());
        assert_eq!(err.to_string(), "no changes detected for CAN-7");
    }
}
