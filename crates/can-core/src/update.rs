//! Backend collaborators
//!
//! The reconciler never talks to a database or a mail server itself. It
//! drives an [`ArrivalUpdater`] and a [`ChangeNotifier`] supplied by the
//! caller.

use crate::error::{NotifyError, UpdateError};
use can_record::{ArrivalStatus, ChangeRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Person applying the staged changes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifier {
    /// Email recorded as the last modifier
    pub email: String,
    /// Display name used in notifications
    pub name: String,
}

impl Modifier {
    /// Create modifier
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }
}

/// One line update ready for the backend
///
/// Built from a staged record; unlike the record it always carries a real
/// calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrivalUpdate {
    /// Line to update
    pub line_id: i64,
    /// Document the line belongs to
    pub document_number: String,
    /// New arrival date
    pub arrival_date: NaiveDate,
    /// New status
    pub status: ArrivalStatus,
    /// New warehouse id
    pub warehouse_id: i64,
    /// Why the change was made
    pub reason: String,
}

impl TryFrom<&ChangeRecord> for ArrivalUpdate {
    type Error = UpdateError;

    fn try_from(record: &ChangeRecord) -> Result<Self, Self::Error> {
        let proposed = record.proposed();
        let arrival_date = proposed
            .arrival_date
            .as_ref()
            .and_then(|d| d.as_date())
            .ok_or_else(|| UpdateError::MissingArrivalDate {
                document_number: record.document_number().to_string(),
            })?;

        Ok(Self {
            line_id: record.line_id(),
            document_number: record.document_number().to_string(),
            arrival_date,
            status: proposed.status,
            warehouse_id: proposed.warehouse_id,
            reason: record.reason().to_string(),
        })
    }
}

/// Writes line updates to the system of record
#[async_trait::async_trait]
pub trait ArrivalUpdater: Send + Sync {
    /// Apply one update on behalf of `modifier`
    async fn apply(&self, update: &ArrivalUpdate, modifier: &Modifier) -> Result<(), UpdateError>;
}

/// Tells document owners their notes were changed
#[async_trait::async_trait]
pub trait ChangeNotifier: Send + Sync {
    /// Send one message covering every change for `owner`
    async fn notify(
        &self,
        owner: &str,
        changes: &[ChangeRecord],
        modifier: &Modifier,
    ) -> Result<(), NotifyError>;
}
