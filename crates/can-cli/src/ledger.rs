//! Collaborators used by `apply`
//!
//! The ledger stands in for the arrival database: every applied update is
//! appended as one JSON line. Owners are "notified" through the log.

use can_core::{ArrivalUpdate, ArrivalUpdater, ChangeNotifier, Modifier, NotifyError, UpdateError};
use can_record::ChangeRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

#[derive(Serialize)]
struct LedgerEntry<'a> {
    #[serde(flatten)]
    update: &'a ArrivalUpdate,
    modified_by: &'a str,
    applied_at: DateTime<Utc>,
}

/// Appends updates to a JSON-lines file
#[derive(Debug, Clone)]
pub(crate) struct LedgerUpdater {
    path: PathBuf,
}

impl LedgerUpdater {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl ArrivalUpdater for LedgerUpdater {
    async fn apply(&self, update: &ArrivalUpdate, modifier: &Modifier) -> Result<(), UpdateError> {
        let entry = LedgerEntry {
            update,
            modified_by: &modifier.email,
            applied_at: Utc::now(),
        };
        let mut line = serde_json::to_string(&entry).map_err(UpdateError::backend)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(UpdateError::backend)?;
        file.write_all(line.as_bytes())
            .await
            .map_err(UpdateError::backend)?;
        file.flush().await.map_err(UpdateError::backend)
    }
}

/// Reports owner notifications through tracing
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LogNotifier;

#[async_trait::async_trait]
impl ChangeNotifier for LogNotifier {
    async fn notify(
        &self,
        owner: &str,
        changes: &[ChangeRecord],
        modifier: &Modifier,
    ) -> Result<(), NotifyError> {
        for change in changes {
            tracing::info!(
                owner,
                document = change.document_number(),
                modified_by = %modifier.email,
                changes = %change.changes_summary().collect::<Vec<_>>().join("; "),
                "owner notified"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use can_test_utils::record;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn ledger_appends_one_line_per_update() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.jsonl");
        let updater = LedgerUpdater::new(&path);
        let modifier = Modifier::new("planner@example.com", "Planner");

        for doc in ["CAN-1", "CAN-2"] {
            let update = ArrivalUpdate::try_from(&record(doc)).unwrap();
            updater.apply(&update, &modifier).await.unwrap();
        }

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["document_number"], "CAN-2");
        assert_eq!(lines[1]["arrival_date"], "2024-01-15");
        assert_eq!(lines[1]["status"], "STOCKED_IN_STATUS");
        assert_eq!(lines[0]["modified_by"], "planner@example.com");
    }

    #[tokio::test]
    async fn unwritable_ledger_is_a_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        let updater = LedgerUpdater::new(dir.path());
        let update = ArrivalUpdate::try_from(&record("CAN-1")).unwrap();

        let err = updater
            .apply(&update, &Modifier::default())
            .await
            .unwrap_err();
        assert!(matches!(err, UpdateError::Backend(_)));
    }
}
