//! Staging store
//!
//! Single authoritative place for pending edits within one session. The
//! store owns its records and its persistence channel; callers get shared
//! references or clones, never a way to mutate a record in place.
//!
//! Every mutating operation runs the persistence bridge before returning.

use crate::bridge::{PersistOutcome, PersistenceBridge, StagedRecords};
use crate::channel::PersistenceChannel;
use crate::config::StagingConfig;
use crate::error::StagingError;
use crate::owner::{group_by_owner, OwnerGroups, OwnerResolver};
use can_record::{AxisSnapshot, ChangeRecord, ChangeRecordBuilder, RowSnapshot};

/// Session-scoped store of pending change records
///
/// Records are keyed by document number; staging a second change for the
/// same document replaces the first in place, so iteration order stays
/// stable for the session.
#[derive(Debug)]
pub struct StagingStore<C: PersistenceChannel> {
    records: StagedRecords,
    bridge: PersistenceBridge,
    channel: C,
    last_persist: Option<PersistOutcome>,
}

impl<C: PersistenceChannel> StagingStore<C> {
    /// Open a store over a channel, restoring whatever it holds
    #[must_use]
    pub fn open(channel: C, config: &StagingConfig) -> Self {
        let bridge = PersistenceBridge::from_config(config);
        let records = bridge.restore(&channel);
        Self {
            records,
            bridge,
            channel,
            last_persist: None,
        }
    }

    /// Stage a change described by a builder
    ///
    /// The staging time defaults to now when the builder has none.
    ///
    /// # Errors
    /// Returns [`StagingError::Record`] if the record cannot be built
    /// (missing identity, or nothing changed). The store is left untouched.
    pub fn stage(&mut self, draft: ChangeRecordBuilder) -> Result<&ChangeRecord, StagingError> {
        let record = draft.build().map_err(|e| {
            tracing::warn!(error = %e, "rejected staged change");
            e
        })?;

        let document = record.document_number().to_string();
        let (index, previous) = self.records.insert_full(document.clone(), record);
        if previous.is_some() {
            tracing::info!(document = %document, "replaced staged change");
        } else {
            tracing::info!(document = %document, "staged change");
        }

        self.sync();
        Ok(&self.records[index])
    }

    /// Stage a change from its parts
    ///
    /// Convenience over [`stage`](Self::stage) in the shape the editor uses.
    ///
    /// # Errors
    /// See [`stage`](Self::stage)
    pub fn stage_change(
        &mut self,
        line_id: i64,
        document_number: &str,
        original: AxisSnapshot,
        proposed: AxisSnapshot,
        reason: &str,
        row: &RowSnapshot,
    ) -> Result<&ChangeRecord, StagingError> {
        self.stage(
            ChangeRecord::builder()
                .line_id(line_id)
                .document_number(document_number)
                .original(original)
                .proposed(proposed)
                .reason(reason)
                .row(row),
        )
    }

    /// Remove the change for a document
    ///
    /// Returns `true` if a change existed. Removing an absent document is a
    /// no-op and does not touch the channel.
    pub fn remove(&mut self, document_number: &str) -> bool {
        if self.records.shift_remove(document_number).is_none() {
            return false;
        }
        tracing::info!(document = document_number, "removed staged change");
        self.sync();
        true
    }

    /// Change for a document
    #[inline]
    #[must_use]
    pub fn get(&self, document_number: &str) -> Option<&ChangeRecord> {
        self.records.get(document_number)
    }

    /// All staged changes, keyed by document number
    #[inline]
    #[must_use]
    pub fn get_all(&self) -> &StagedRecords {
        &self.records
    }

    /// Iterate staged changes in store order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &ChangeRecord> + '_ {
        self.records.values()
    }

    /// Number of staged changes
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Whether anything is staged
    #[inline]
    #[must_use]
    pub fn has_any(&self) -> bool {
        self.count() > 0
    }

    /// Whether a document has a staged change
    #[inline]
    #[must_use]
    pub fn has_change_for(&self, document_number: &str) -> bool {
        self.get(document_number).is_some()
    }

    /// Drop every staged change and empty the persisted slot
    pub fn clear_all(&mut self) {
        let count = self.records.len();
        self.records.clear();
        tracing::info!(count, "cleared all staged changes");
        self.sync();
    }

    /// Staged changes grouped by owner email
    ///
    /// Documents the resolver cannot place are left out.
    #[must_use]
    pub fn group_by_owner<R>(&self, resolver: &R) -> OwnerGroups
    where
        R: OwnerResolver + ?Sized,
    {
        group_by_owner(self.records.values(), resolver)
    }

    /// Outcome of the most recent persistence pass
    #[inline]
    #[must_use]
    pub fn last_persist(&self) -> Option<&PersistOutcome> {
        self.last_persist.as_ref()
    }

    /// Underlying channel
    #[inline]
    #[must_use]
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// End the session, handing back the channel
    #[inline]
    #[must_use]
    pub fn into_channel(self) -> C {
        self.channel
    }

    fn sync(&mut self) {
        self.last_persist = Some(self.bridge.persist(&self.records, &mut self.channel));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::SkipReason;
    use crate::channel::{FileChannel, QueryParamChannel};
    use can_record::ArrivalStatus;
    use can_test_utils::{draft, original_axes, sample_row};
    use pretty_assertions::assert_eq;

    fn store() -> StagingStore<QueryParamChannel> {
        StagingStore::open(
            QueryParamChannel::new("pending_changes"),
            &StagingConfig::default(),
        )
    }

    #[test]
    fn stage_then_get() {
        let mut store = store();
        let staged = store.stage(draft("CAN-1")).unwrap().clone();

        assert_eq!(store.get("CAN-1"), Some(&staged));
        assert!(store.has_change_for("CAN-1"));
        assert!(store.has_any());
        assert_eq!(store.count(), 1);
        assert!(matches!(
            store.last_persist(),
            Some(PersistOutcome::Persisted { .. })
        ));
    }

    #[test]
    fn restage_replaces_in_place() {
        let mut store = store();
        store.stage(draft("CAN-1")).unwrap();
        store.stage(draft("CAN-2")).unwrap();
        store
            .stage(draft("CAN-1").reason("second thoughts"))
            .unwrap();

        assert_eq!(store.count(), 2);
        assert_eq!(store.get("CAN-1").unwrap().reason(), "second thoughts");
        let order: Vec<&str> = store.iter().map(ChangeRecord::document_number).collect();
        assert_eq!(order, vec!["CAN-1", "CAN-2"]);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut store = store();
        store.stage(draft("CAN-1")).unwrap();

        assert!(store.remove("CAN-1"));
        assert!(!store.remove("CAN-1"));
        assert!(!store.has_any());
        assert_eq!(store.last_persist(), Some(&PersistOutcome::Erased));
    }

    #[test]
    fn rejected_stage_leaves_store_untouched() {
        let mut store = store();
        store.stage(draft("CAN-1")).unwrap();
        let before = store.channel().clone();

        let err = store
            .stage_change(
                5,
                "CAN-5",
                original_axes(),
                original_axes(),
                "nothing",
                &sample_row(),
            )
            .unwrap_err();
        assert!(err.is_no_op());
        assert_eq!(store.count(), 1);
        assert_eq!(store.channel(), &before);
    }

    #[test]
    fn stage_change_copies_row_fields() {
        let mut store = store();
        let record = store
            .stage_change(
                7,
                "CAN-7",
                original_axes(),
                original_axes().with_status(ArrivalStatus::Confirmed),
                "vendor confirmed",
                &sample_row(),
            )
            .unwrap();
        assert_eq!(record.line_id(), 7);
        assert_eq!(record.product_name(), "Vitamin C 500mg");
        assert_eq!(record.vendor_name(), "ACME Pharma");
    }

    #[test]
    fn clear_all_erases_slot() {
        let mut store = store();
        store.stage(draft("CAN-1")).unwrap();
        store.stage(draft("CAN-2")).unwrap();
        assert!(store.channel().read().unwrap().is_some());

        store.clear_all();
        assert_eq!(store.count(), 0);
        assert_eq!(store.channel().read().unwrap(), None);
    }

    #[test]
    fn reopen_restores_session() {
        let mut store = store();
        store.stage(draft("CAN-1")).unwrap();
        let snapshot = store.get_all().clone();

        let reopened = StagingStore::open(store.into_channel(), &StagingConfig::default());
        assert_eq!(reopened.get_all(), &snapshot);
    }

    #[test]
    fn failed_write_keeps_records_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let channel = FileChannel::new(dir.path().join("missing").join("slot.json"));
        let mut store = StagingStore::open(channel, &StagingConfig::default());

        let staged = store.stage(draft("CAN-1")).unwrap().clone();
        assert_eq!(store.get("CAN-1"), Some(&staged));

        let outcome = store.last_persist().unwrap();
        assert!(matches!(outcome, PersistOutcome::Skipped(SkipReason::Channel(_))));
        assert_eq!(outcome.slot_state(), None);
    }

    #[test]
    fn failed_erase_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        // A directory can be neither written nor removed as a slot file
        let mut store = StagingStore::open(FileChannel::new(dir.path()), &StagingConfig::default());
        assert!(!store.has_any());

        store.stage(draft("CAN-1")).unwrap();
        assert!(store.remove("CAN-1"));
        assert!(!store.has_any());
        assert!(matches!(
            store.last_persist(),
            Some(PersistOutcome::Skipped(SkipReason::Channel(_)))
        ));
        assert!(dir.path().is_dir());
    }

    #[test]
    fn overflow_keeps_records_in_memory() {
        let config = StagingConfig::default().with_persistence_budget(10);
        let mut store = StagingStore::open(QueryParamChannel::new("p"), &config);
        store.stage(draft("CAN-1")).unwrap();

        assert!(store.has_change_for("CAN-1"));
        assert!(matches!(
            store.last_persist(),
            Some(PersistOutcome::Skipped(SkipReason::Overflow { budget: 10, .. }))
        ));
        assert_eq!(store.channel().read().unwrap(), None);
    }
}
