//! Persistence bridge
//!
//! Moves staged records in and out of a [`PersistenceChannel`] so they
//! survive a stateless round trip such as a page reload.
//!
//! The slot only ever holds one of two things:
//!
//! ```text
//!            non-empty store, payload < budget
//!   EMPTY  ─────────────────────────────────────▶  HOLDING(json)
//!     ▲                                               │
//!     └───────────── empty store / overflow ──────────┘
//! ```
//!
//! An oversized payload is never truncated. The slot is emptied instead,
//! since a partial payload would restore wrong records.

use crate::channel::PersistenceChannel;
use crate::config::StagingConfig;
use crate::error::RestoreError;
use can_record::ChangeRecord;
use indexmap::IndexMap;

/// Staged records keyed by document number
pub type StagedRecords = IndexMap<String, ChangeRecord>;

/// What a persistence pass did to the slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// Payload written
    Persisted {
        /// Payload size in characters
        chars: usize,
    },
    /// Store was empty; slot emptied
    Erased,
    /// Nothing written this cycle
    Skipped(SkipReason),
}

impl PersistOutcome {
    /// Slot state this outcome leaves behind
    ///
    /// A failed channel write leaves the slot in an unknown state, reported
    /// as `None`.
    #[must_use]
    pub fn slot_state(&self) -> Option<SlotState> {
        match self {
            Self::Persisted { .. } => Some(SlotState::Holding),
            Self::Erased | Self::Skipped(SkipReason::Overflow { .. }) => Some(SlotState::Empty),
            Self::Skipped(_) => None,
        }
    }
}

/// Why a persistence pass wrote nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Payload reached the budget
    Overflow {
        /// Payload size in characters
        chars: usize,
        /// Configured budget
        budget: usize,
    },
    /// Records could not be encoded
    Encoding(String),
    /// Channel rejected the operation
    Channel(String),
}

/// State of the external slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Nothing persisted
    Empty,
    /// Valid payload under budget
    Holding,
}

/// Serializes staged records into a channel and restores them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistenceBridge {
    budget: usize,
}

impl PersistenceBridge {
    /// Create bridge with budget (characters)
    #[inline]
    #[must_use]
    pub fn new(budget: usize) -> Self {
        Self { budget }
    }

    /// Create bridge from configuration
    #[inline]
    #[must_use]
    pub fn from_config(config: &StagingConfig) -> Self {
        Self::new(config.persistence_budget)
    }

    /// Payload budget in characters
    #[inline]
    #[must_use]
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Encode records as `{document_number: record, ...}`
    ///
    /// # Errors
    /// Returns error if a record cannot be encoded
    pub fn serialize(&self, records: &StagedRecords) -> Result<String, serde_json::Error> {
        serde_json::to_string(records)
    }

    /// Decode a payload produced by [`serialize`](Self::serialize)
    ///
    /// # Errors
    /// Returns error if the payload is not valid JSON of the record shape,
    /// or a key does not match its record's document number
    pub fn decode(&self, payload: &str) -> Result<StagedRecords, RestoreError> {
        let records: StagedRecords = serde_json::from_str(payload)?;
        if let Some((key, record)) = records
            .iter()
            .find(|(key, record)| key.as_str() != record.document_number())
        {
            return Err(RestoreError::KeyMismatch {
                key: key.clone(),
                document_number: record.document_number().to_string(),
            });
        }
        Ok(records)
    }

    /// Write records to the channel, or empty it
    ///
    /// Only payloads strictly shorter than the budget are written.
    /// Never fails: problems are logged and reported in the outcome.
    pub fn persist<C>(&self, records: &StagedRecords, channel: &mut C) -> PersistOutcome
    where
        C: PersistenceChannel + ?Sized,
    {
        if records.is_empty() {
            return match channel.erase() {
                Ok(()) => PersistOutcome::Erased,
                Err(e) => {
                    tracing::warn!(error = %e, "could not clear persisted changes");
                    PersistOutcome::Skipped(SkipReason::Channel(e.to_string()))
                }
            };
        }

        let payload = match self.serialize(records) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "could not encode pending changes");
                // Whatever the slot holds is now stale
                if let Err(e) = channel.erase() {
                    tracing::warn!(error = %e, "could not clear persisted changes");
                }
                return PersistOutcome::Skipped(SkipReason::Encoding(e.to_string()));
            }
        };

        let chars = payload.chars().count();
        if chars >= self.budget {
            tracing::warn!(
                chars,
                budget = self.budget,
                count = records.len(),
                "pending changes too large to persist"
            );
            return match channel.erase() {
                Ok(()) => PersistOutcome::Skipped(SkipReason::Overflow {
                    chars,
                    budget: self.budget,
                }),
                Err(e) => {
                    tracing::warn!(error = %e, "could not clear persisted changes");
                    PersistOutcome::Skipped(SkipReason::Channel(e.to_string()))
                }
            };
        }

        match channel.write(&payload) {
            Ok(()) => {
                tracing::debug!(chars, count = records.len(), "persisted pending changes");
                PersistOutcome::Persisted { chars }
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not persist pending changes");
                PersistOutcome::Skipped(SkipReason::Channel(e.to_string()))
            }
        }
    }

    /// Read records back from the channel
    ///
    /// # Errors
    /// Returns error if the slot cannot be read or decoded
    pub fn try_restore<C>(&self, channel: &C) -> Result<StagedRecords, RestoreError>
    where
        C: PersistenceChannel + ?Sized,
    {
        match channel.read()? {
            Some(payload) => self.decode(&payload),
            None => Ok(StagedRecords::new()),
        }
    }

    /// Read records back, treating any failure as nothing to restore
    pub fn restore<C>(&self, channel: &C) -> StagedRecords
    where
        C: PersistenceChannel + ?Sized,
    {
        match self.try_restore(channel) {
            Ok(records) => {
                if !records.is_empty() {
                    tracing::info!(count = records.len(), "restored pending changes");
                }
                records
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not restore pending changes");
                StagedRecords::new()
            }
        }
    }
}

impl Default for PersistenceBridge {
    fn default() -> Self {
        Self::from_config(&StagingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::QueryParamChannel;
    use can_test_utils::{record, record_with_reason};
    use pretty_assertions::assert_eq;

    fn staged(records: Vec<ChangeRecord>) -> StagedRecords {
        records
            .into_iter()
            .map(|r| (r.document_number().to_string(), r))
            .collect()
    }

    #[test]
    fn persist_then_restore() {
        let bridge = PersistenceBridge::default();
        let mut channel = QueryParamChannel::new("pending_changes");
        let records = staged(vec![record("CAN-1"), record("CAN-2")]);

        let outcome = bridge.persist(&records, &mut channel);
        assert!(matches!(outcome, PersistOutcome::Persisted { .. }));
        assert_eq!(outcome.slot_state(), Some(SlotState::Holding));

        let restored = bridge.restore(&channel);
        assert_eq!(restored, records);
        assert_eq!(
            restored.keys().collect::<Vec<_>>(),
            vec!["CAN-1", "CAN-2"]
        );
    }

    #[test]
    fn empty_store_erases_slot() {
        let bridge = PersistenceBridge::default();
        let mut channel = QueryParamChannel::new("pending_changes");
        channel.write("stale").unwrap();

        let outcome = bridge.persist(&StagedRecords::new(), &mut channel);
        assert_eq!(outcome, PersistOutcome::Erased);
        assert_eq!(channel.read().unwrap(), None);
    }

    #[test]
    fn overflow_erases_previous_payload() {
        let bridge = PersistenceBridge::new(1500);
        let mut channel = QueryParamChannel::new("pending_changes");

        let small = staged(vec![record("CAN-1")]);
        assert!(matches!(
            bridge.persist(&small, &mut channel),
            PersistOutcome::Persisted { .. }
        ));

        let huge = staged(vec![record_with_reason("CAN-2", &"x".repeat(2000))]);
        let outcome = bridge.persist(&huge, &mut channel);
        assert!(matches!(
            outcome,
            PersistOutcome::Skipped(SkipReason::Overflow { budget: 1500, .. })
        ));
        assert_eq!(outcome.slot_state(), Some(SlotState::Empty));
        assert_eq!(channel.read().unwrap(), None);
    }

    #[test]
    fn budget_is_exclusive() {
        let records = staged(vec![record("CAN-1")]);
        let exact = PersistenceBridge::default()
            .serialize(&records)
            .unwrap()
            .chars()
            .count();

        let mut channel = QueryParamChannel::new("p");
        assert!(matches!(
            PersistenceBridge::new(exact + 1).persist(&records, &mut channel),
            PersistOutcome::Persisted { .. }
        ));
        assert_eq!(
            PersistenceBridge::new(exact).persist(&records, &mut channel),
            PersistOutcome::Skipped(SkipReason::Overflow {
                chars: exact,
                budget: exact
            })
        );
        assert_eq!(channel.read().unwrap(), None);
    }

    #[test]
    fn garbage_restores_as_empty() {
        let bridge = PersistenceBridge::default();
        for payload in ["not json", "[1,2,3]", r#"{"CAN-1": {"line_id": 1}}"#] {
            let mut channel = QueryParamChannel::new("pending_changes");
            channel.write(payload).unwrap();
            assert!(bridge.restore(&channel).is_empty(), "payload {payload}");
        }
    }

    #[test]
    fn mismatched_key_is_rejected() {
        let bridge = PersistenceBridge::default();
        let mut records = StagedRecords::new();
        records.insert("CAN-X".to_string(), record("CAN-1"));
        let payload = bridge.serialize(&records).unwrap();

        let err = bridge.decode(&payload).unwrap_err();
        assert!(matches!(err, RestoreError::KeyMismatch { .. }));
    }
}
