//! CAN Core
//!
//! Turns the staged changes held by a [`can_staging::StagingStore`] into
//! real updates, then tells each document owner what changed.
//!
//! # Core Concepts
//!
//! - **`ArrivalUpdater`**: writes one line update to the system of record
//! - **`ChangeNotifier`**: sends one message per owner
//! - **`BatchReconciler`**: runs the batch and reports what happened
//!
//! # Example
//!
//! ```rust,no_run
//! use can_core::{ArrivalUpdate, ArrivalUpdater, BatchReconciler, ChangeNotifier, Modifier};
//! use can_core::{NotifyError, UpdateError};
//! use can_record::ChangeRecord;
//! use can_staging::{QueryParamChannel, StagingConfig, StagingStore};
//! use std::collections::BTreeMap;
//!
//! struct Db;
//!
//! #[async_trait::async_trait]
//! impl ArrivalUpdater for Db {
//!     async fn apply(&self, _update: &ArrivalUpdate, _by: &Modifier) -> Result<(), UpdateError> {
//!         Ok(())
//!     }
//! }
//!
//! struct Mail;
//!
//! #[async_trait::async_trait]
//! impl ChangeNotifier for Mail {
//!     async fn notify(&self, _owner: &str, _changes: &[ChangeRecord], _by: &Modifier) -> Result<(), NotifyError> {
//!         Ok(())
//!     }
//! }
//!
//! # async fn run() {
//! let mut store = StagingStore::open(QueryParamChannel::new("pending_changes"), &StagingConfig::default());
//! let reconciler = BatchReconciler::new(Db, Mail, BTreeMap::<String, String>::new());
//! let report = reconciler.reconcile(&mut store, &Modifier::new("planner@example.com", "Planner")).await;
//! assert!(report.is_clean());
//! # }
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod reconcile;
pub mod update;

pub use error::{NotifyError, UpdateError};
pub use reconcile::{BatchReconciler, BatchReport, FailedChange, NotificationOutcome};
pub use update::{ArrivalUpdate, ArrivalUpdater, ChangeNotifier, Modifier};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
