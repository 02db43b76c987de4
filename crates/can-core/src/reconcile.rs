//! Batch reconciliation
//!
//! Applies every staged change, notifies owners about the ones that landed,
//! then drops them from the store. Changes that fail stay staged so the
//! user can fix and retry them.
//!
//! ```text
//! snapshot ──▶ apply each ──▶ group applied by owner ──▶ notify ──▶ remove applied
//!                  │
//!                  └── failed: stays staged
//! ```

use crate::error::{NotifyError, UpdateError};
use crate::update::{ArrivalUpdate, ArrivalUpdater, ChangeNotifier, Modifier};
use can_record::ChangeRecord;
use can_staging::{group_by_owner, OwnerResolver, PersistenceChannel, StagingStore};
use std::time::{Duration, Instant};

/// Change that could not be applied
#[derive(Debug)]
pub struct FailedChange {
    /// Document whose change failed
    pub document_number: String,
    /// Why it failed
    pub error: UpdateError,
}

/// Result of notifying one owner
#[derive(Debug)]
pub struct NotificationOutcome {
    /// Owner email
    pub owner: String,
    /// Documents covered by the message
    pub documents: Vec<String>,
    /// Delivery failure, if any
    pub error: Option<NotifyError>,
}

impl NotificationOutcome {
    /// Whether the message went out
    #[inline]
    #[must_use]
    pub fn delivered(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary of one reconciliation run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Documents written to the backend, in store order
    pub applied: Vec<String>,
    /// Changes left staged
    pub failed: Vec<FailedChange>,
    /// One entry per notified owner
    pub notifications: Vec<NotificationOutcome>,
    /// Wall time of the run
    pub elapsed: Duration,
}

impl BatchReport {
    /// Number of applied changes
    #[inline]
    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    /// Number of failed changes
    #[inline]
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Number of owners whose notification failed
    #[must_use]
    pub fn undelivered_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.delivered()).count()
    }

    /// Every change applied and every owner notified
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.undelivered_count() == 0
    }
}

/// Drives staged changes into the backend
pub struct BatchReconciler<U, N, R> {
    updater: U,
    notifier: N,
    resolver: R,
}

impl<U, N, R> BatchReconciler<U, N, R>
where
    U: ArrivalUpdater,
    N: ChangeNotifier,
    R: OwnerResolver,
{
    /// Create reconciler from its collaborators
    pub fn new(updater: U, notifier: N, resolver: R) -> Self {
        Self {
            updater,
            notifier,
            resolver,
        }
    }

    /// Backend updater
    #[inline]
    #[must_use]
    pub fn updater(&self) -> &U {
        &self.updater
    }

    /// Owner notifier
    #[inline]
    #[must_use]
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Apply every staged change
    ///
    /// Never fails as a whole; per-change and per-owner problems are
    /// collected in the report.
    pub async fn reconcile<C>(&self, store: &mut StagingStore<C>, modifier: &Modifier) -> BatchReport
    where
        C: PersistenceChannel,
    {
        let started = Instant::now();
        let mut report = BatchReport::default();

        let staged: Vec<ChangeRecord> = store.iter().cloned().collect();
        if staged.is_empty() {
            tracing::info!("no staged changes to apply");
            return report;
        }

        let mut applied = Vec::with_capacity(staged.len());
        for record in staged {
            let document_number = record.document_number().to_string();
            match self.apply_one(&record, modifier).await {
                Ok(()) => {
                    tracing::debug!(document = %document_number, "applied staged change");
                    applied.push(record);
                }
                Err(error) => {
                    tracing::warn!(document = %document_number, error = %error, "could not apply staged change");
                    report.failed.push(FailedChange {
                        document_number,
                        error,
                    });
                }
            }
        }

        for (owner, changes) in group_by_owner(&applied, &self.resolver) {
            let error = self.notifier.notify(&owner, &changes, modifier).await.err();
            if let Some(e) = &error {
                tracing::warn!(owner = %owner, error = %e, "owner notification failed");
            }
            report.notifications.push(NotificationOutcome {
                owner,
                documents: changes
                    .iter()
                    .map(|c| c.document_number().to_string())
                    .collect(),
                error,
            });
        }

        for record in &applied {
            store.remove(record.document_number());
            report.applied.push(record.document_number().to_string());
        }

        report.elapsed = started.elapsed();
        tracing::info!(
            applied = report.applied_count(),
            failed = report.failed_count(),
            owners = report.notifications.len(),
            elapsed_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
            "reconciled staged changes"
        );
        report
    }

    async fn apply_one(&self, record: &ChangeRecord, modifier: &Modifier) -> Result<(), UpdateError> {
        let update = ArrivalUpdate::try_from(record)?;
        self.updater.apply(&update, modifier).await
    }
}
