//! Editable axes of an arrival line: date, status, warehouse

use crate::date::ArrivalDate;
use crate::row::{RowSnapshot, RowValue};
use crate::status::ArrivalStatus;

/// Placeholder for names that upstream did not supply
pub const NOT_AVAILABLE: &str = "N/A";

/// One of the three editable axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Arrival date
    Date,
    /// Arrival status
    Status,
    /// Receiving warehouse
    Warehouse,
}

impl Axis {
    /// Axes in summary order
    pub const ORDER: [Axis; 3] = [Axis::Date, Axis::Status, Axis::Warehouse];
}

/// Values of the editable axes at one point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisSnapshot {
    /// Arrival date, if any
    pub arrival_date: Option<ArrivalDate>,
    /// Status
    pub status: ArrivalStatus,
    /// Warehouse id (`0` when unknown)
    pub warehouse_id: i64,
    /// Warehouse display name
    pub warehouse_name: String,
}

impl Default for AxisSnapshot {
    fn default() -> Self {
        Self {
            arrival_date: None,
            status: ArrivalStatus::default(),
            warehouse_id: 0,
            warehouse_name: NOT_AVAILABLE.to_string(),
        }
    }
}

impl AxisSnapshot {
    /// Create snapshot with every axis set
    #[must_use]
    pub fn new(
        arrival_date: Option<ArrivalDate>,
        status: ArrivalStatus,
        warehouse_id: i64,
        warehouse_name: impl Into<String>,
    ) -> Self {
        Self {
            arrival_date,
            status,
            warehouse_id,
            warehouse_name: warehouse_name.into(),
        }
    }

    /// With arrival date
    #[inline]
    #[must_use]
    pub fn with_date(mut self, date: impl Into<ArrivalDate>) -> Self {
        self.arrival_date = Some(date.into());
        self
    }

    /// With status
    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: ArrivalStatus) -> Self {
        self.status = status;
        self
    }

    /// With warehouse
    #[inline]
    #[must_use]
    pub fn with_warehouse(mut self, id: i64, name: impl Into<String>) -> Self {
        self.warehouse_id = id;
        self.warehouse_name = name.into();
        self
    }

    /// Read axes from a possibly partial row
    ///
    /// Looks at `arrival_date`, `status` (falling back to `can_status`),
    /// `warehouse_id` and `warehouse_name`. Missing or unreadable keys keep
    /// their defaults.
    #[must_use]
    pub fn from_row(row: &RowSnapshot) -> Self {
        let defaults = Self::default();

        let arrival_date = match row.get("arrival_date") {
            Some(RowValue::Date(date)) => Some(ArrivalDate::from(*date)),
            Some(RowValue::Timestamp(ts)) => Some(ArrivalDate::from(ts.date())),
            Some(other) => other.as_text().as_deref().and_then(ArrivalDate::parse),
            None => None,
        };

        let status = row
            .text("status")
            .or_else(|| row.text("can_status"))
            .and_then(|text| text.parse().ok())
            .unwrap_or(defaults.status);

        Self {
            arrival_date,
            status,
            warehouse_id: row.int("warehouse_id").unwrap_or(defaults.warehouse_id),
            warehouse_name: row
                .text("warehouse_name")
                .unwrap_or(defaults.warehouse_name),
        }
    }

    /// Whether `other` differs on `axis`
    ///
    /// The warehouse axis compares ids; names are display-only.
    #[must_use]
    pub fn differs_on(&self, other: &Self, axis: Axis) -> bool {
        match axis {
            Axis::Date => self.arrival_date != other.arrival_date,
            Axis::Status => self.status != other.status,
            Axis::Warehouse => self.warehouse_id != other.warehouse_id,
        }
    }
}
