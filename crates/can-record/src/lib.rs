//! CAN Change Records
//!
//! Typed model of a staged edit to a container arrival note (CAN) line.
//!
//! # Core Concepts
//!
//! - [`ChangeRecord`]: Immutable snapshot of one proposed edit
//! - [`AxisSnapshot`]: Date / status / warehouse values at one point in time
//! - [`ArrivalStatus`]: Database status vocabulary with display labels
//! - [`ArrivalDate`]: Lenient date that never fails on malformed text
//! - [`RowSnapshot`]: Schema-less copy of the source row
//!
//! # Example
//!
//! ```rust
//! use can_record::{ArrivalStatus, AxisSnapshot, ChangeRecord};
//! use chrono::NaiveDate;
//!
//! let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
//! let original = AxisSnapshot::new(Some(day(10).into()), ArrivalStatus::Request, 1, "W1");
//! let proposed = original.clone().with_date(day(15)).with_status(ArrivalStatus::StockedIn);
//!
//! let record = ChangeRecord::builder()
//!     .line_id(7)
//!     .document_number("CAN-100")
//!     .original(original)
//!     .proposed(proposed)
//!     .reason("vessel delayed")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(record.date_diff_days(), Some(5));
//! assert_eq!(record.changes_summary().count(), 2);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod axis;
mod date;
mod error;
mod record;
mod row;
mod status;

pub use axis::{Axis, AxisSnapshot, NOT_AVAILABLE};
pub use date::{day_delta, display_date, ArrivalDate, DISPLAY_DATE_FORMAT, ISO_DATE_FORMAT, NOT_SET};
pub use error::RecordError;
pub use record::{ChangeRecord, ChangeRecordBuilder, ChangeSummary};
pub use row::{RowSnapshot, RowValue};
pub use status::ArrivalStatus;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
