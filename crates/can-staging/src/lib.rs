//! CAN Staging Store
//!
//! Holds pending edits to container arrival lines for one interactive
//! session, and keeps a best-effort copy of them in a size-limited external
//! slot so they survive a reload.
//!
//! # Architecture
//!
//! ```text
//! editor ──stage/remove/clear──▶ StagingStore ──persist──▶ PersistenceBridge ──▶ PersistenceChannel
//!                                     ▲                          │
//!                                     └────────── restore ───────┘
//! ```
//!
//! The slot is a convenience cache. The database stays the system of record,
//! so persistence problems are logged and never reach the caller.
//!
//! # Example
//!
//! ```rust
//! use can_record::{ArrivalStatus, AxisSnapshot, RowSnapshot};
//! use can_staging::{QueryParamChannel, StagingConfig, StagingStore};
//!
//! let mut store = StagingStore::open(QueryParamChannel::new("pending_changes"), &StagingConfig::default());
//!
//! let before = AxisSnapshot::default().with_warehouse(1, "HCM Main");
//! let after = before.clone().with_status(ArrivalStatus::WarehouseArrival);
//! store
//!     .stage_change(42, "CAN-100", before, after, "truck arrived", &RowSnapshot::new())
//!     .unwrap();
//!
//! assert!(store.has_change_for("CAN-100"));
//! assert_eq!(store.count(), 1);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod bridge;
pub mod channel;
pub mod config;
pub mod error;
pub mod owner;
pub mod store;

pub use bridge::{PersistOutcome, PersistenceBridge, SkipReason, SlotState, StagedRecords};
pub use channel::{FileChannel, PersistenceChannel, QueryParamChannel};
pub use config::{StagingConfig, DEFAULT_PERSISTENCE_BUDGET, DEFAULT_QUERY_PARAM};
pub use error::{ChannelError, RestoreError, StagingError};
pub use owner::{group_by_owner, OwnerGroups, OwnerResolver};
pub use store::StagingStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
