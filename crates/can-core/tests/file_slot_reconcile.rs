use can_core::{
    ArrivalUpdate, ArrivalUpdater, BatchReconciler, ChangeNotifier, Modifier, NotifyError,
    UpdateError,
};
use can_record::ChangeRecord;
use can_staging::{FileChannel, StagingConfig, StagingStore};
use can_test_utils::{draft, undated_draft};
use std::sync::atomic::{AtomicUsize, Ordering};

struct AcceptAll;

#[async_trait::async_trait]
impl ArrivalUpdater for AcceptAll {
    async fn apply(&self, _update: &ArrivalUpdate, _by: &Modifier) -> Result<(), UpdateError> {
        Ok(())
    }
}

#[derive(Default)]
struct CountingNotifier(AtomicUsize);

#[async_trait::async_trait]
impl ChangeNotifier for CountingNotifier {
    async fn notify(
        &self,
        _owner: &str,
        changes: &[ChangeRecord],
        _by: &Modifier,
    ) -> Result<(), NotifyError> {
        self.0.fetch_add(changes.len(), Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn partial_batch_leaves_failures_in_slot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pending.json");
    let config = StagingConfig::default();

    let mut store = StagingStore::open(FileChannel::new(&path), &config);
    store.stage(draft("CAN-1")).unwrap();
    store.stage(undated_draft("CAN-2")).unwrap();

    let reconciler = BatchReconciler::new(AcceptAll, CountingNotifier::default(), |_: &str| {
        Some("owner@example.com".to_string())
    });
    let report = reconciler
        .reconcile(&mut store, &Modifier::new("planner@example.com", "Planner"))
        .await;

    assert_eq!(report.applied, vec!["CAN-1"]);
    assert_eq!(report.failed[0].document_number, "CAN-2");
    assert_eq!(reconciler.notifier().0.load(Ordering::SeqCst), 1);

    let next_session = StagingStore::open(FileChannel::new(&path), &config);
    assert_eq!(next_session.count(), 1);
    assert!(next_session.has_change_for("CAN-2"));
}
