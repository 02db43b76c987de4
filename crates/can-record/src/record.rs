//! Change records
//!
//! A [`ChangeRecord`] is one staged, not yet committed edit to an arrival
//! line. Records are immutable once built; a new edit for the same document
//! produces a new record that replaces the old one.

use crate::axis::{Axis, AxisSnapshot, NOT_AVAILABLE};
use crate::date::{day_delta, display_date, ArrivalDate};
use crate::error::RecordError;
use crate::row::RowSnapshot;
use crate::status::ArrivalStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::iter::FusedIterator;

/// One staged edit to an arrival line
///
/// # Invariants
/// - `document_number` is non-blank and `line_id` is present
/// - at least one axis differs between `original` and `proposed`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PersistedChange", into = "PersistedChange")]
pub struct ChangeRecord {
    line_id: i64,
    document_number: String,
    product_name: String,
    vendor_name: String,
    original: AxisSnapshot,
    proposed: AxisSnapshot,
    reason: String,
    staged_at: DateTime<Utc>,
    row_data: Map<String, Value>,
}

impl ChangeRecord {
    /// Start building a record
    #[inline]
    #[must_use]
    pub fn builder() -> ChangeRecordBuilder {
        ChangeRecordBuilder::new()
    }

    /// Arrival line id
    #[inline]
    #[must_use]
    pub fn line_id(&self) -> i64 {
        self.line_id
    }

    /// Arrival note number (the staging key)
    #[inline]
    #[must_use]
    pub fn document_number(&self) -> &str {
        &self.document_number
    }

    /// Product name copied at staging time
    #[inline]
    #[must_use]
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    /// Vendor name copied at staging time
    #[inline]
    #[must_use]
    pub fn vendor_name(&self) -> &str {
        &self.vendor_name
    }

    /// Values before the edit
    #[inline]
    #[must_use]
    pub fn original(&self) -> &AxisSnapshot {
        &self.original
    }

    /// Proposed values
    #[inline]
    #[must_use]
    pub fn proposed(&self) -> &AxisSnapshot {
        &self.proposed
    }

    /// Reason given for the edit
    #[inline]
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// When the edit was staged
    #[inline]
    #[must_use]
    pub fn staged_at(&self) -> DateTime<Utc> {
        self.staged_at
    }

    /// JSON copy of the source row
    #[inline]
    #[must_use]
    pub fn row_data(&self) -> &Map<String, Value> {
        &self.row_data
    }

    /// Whether the arrival date changes
    #[inline]
    #[must_use]
    pub fn has_date_change(&self) -> bool {
        self.is_dirty(Axis::Date)
    }

    /// Whether the status changes
    #[inline]
    #[must_use]
    pub fn has_status_change(&self) -> bool {
        self.is_dirty(Axis::Status)
    }

    /// Whether the warehouse changes
    #[inline]
    #[must_use]
    pub fn has_warehouse_change(&self) -> bool {
        self.is_dirty(Axis::Warehouse)
    }

    /// Whether `axis` differs between original and proposed values
    #[inline]
    #[must_use]
    pub fn is_dirty(&self, axis: Axis) -> bool {
        self.original.differs_on(&self.proposed, axis)
    }

    /// Dirty axes in summary order
    pub fn dirty_axes(&self) -> impl Iterator<Item = Axis> + '_ {
        Axis::ORDER.into_iter().filter(|axis| self.is_dirty(*axis))
    }

    /// Signed days between original and proposed arrival date
    ///
    /// `None` when the date is unchanged, was never set, or either side
    /// could not be read as a date.
    #[must_use]
    pub fn date_diff_days(&self) -> Option<i64> {
        if !self.has_date_change() {
            return None;
        }
        day_delta(
            self.original.arrival_date.as_ref(),
            self.proposed.arrival_date.as_ref(),
        )
    }

    /// Human-readable description of each dirty axis
    ///
    /// The iterator is lazy; call again (or clone it) to restart.
    #[inline]
    #[must_use]
    pub fn changes_summary(&self) -> ChangeSummary<'_> {
        ChangeSummary {
            record: self,
            cursor: 0,
        }
    }

    fn describe(&self, axis: Axis) -> String {
        match axis {
            Axis::Date => {
                let diff = self
                    .date_diff_days()
                    .map(|days| format!(" ({days:+} days)"))
                    .unwrap_or_default();
                format!(
                    "Date: {} → {}{}",
                    display_date(self.original.arrival_date.as_ref()),
                    display_date(self.proposed.arrival_date.as_ref()),
                    diff
                )
            }
            Axis::Status => format!(
                "Status: {} → {}",
                self.original.status.label(),
                self.proposed.status.label()
            ),
            Axis::Warehouse => format!(
                "Warehouse: {} → {}",
                self.original.warehouse_name, self.proposed.warehouse_name
            ),
        }
    }
}

/// Lazy sequence of change descriptions, one per dirty axis
#[derive(Debug, Clone, Copy)]
pub struct ChangeSummary<'a> {
    record: &'a ChangeRecord,
    cursor: usize,
}

impl Iterator for ChangeSummary<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(axis) = Axis::ORDER.get(self.cursor).copied() {
            self.cursor += 1;
            if self.record.is_dirty(axis) {
                return Some(self.record.describe(axis));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(Axis::ORDER.len().saturating_sub(self.cursor)))
    }
}

impl FusedIterator for ChangeSummary<'_> {}

/// Builder for [`ChangeRecord`]
///
/// Only the identity fields are required; everything else falls back to
/// "not set" defaults because upstream rows are not guaranteed complete.
#[derive(Debug, Clone, Default)]
pub struct ChangeRecordBuilder {
    line_id: Option<i64>,
    document_number: Option<String>,
    product_name: Option<String>,
    vendor_name: Option<String>,
    original: AxisSnapshot,
    proposed: AxisSnapshot,
    reason: String,
    staged_at: Option<DateTime<Utc>>,
    row_data: Map<String, Value>,
}

impl ChangeRecordBuilder {
    /// Create new builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set arrival line id
    #[inline]
    #[must_use]
    pub fn line_id(mut self, line_id: i64) -> Self {
        self.line_id = Some(line_id);
        self
    }

    /// Set arrival note number
    #[inline]
    #[must_use]
    pub fn document_number(mut self, document_number: impl Into<String>) -> Self {
        self.document_number = Some(document_number.into());
        self
    }

    /// Override the product name taken from the row
    #[inline]
    #[must_use]
    pub fn product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    /// Override the vendor name taken from the row
    #[inline]
    #[must_use]
    pub fn vendor_name(mut self, name: impl Into<String>) -> Self {
        self.vendor_name = Some(name.into());
        self
    }

    /// Set values before the edit
    #[inline]
    #[must_use]
    pub fn original(mut self, original: AxisSnapshot) -> Self {
        self.original = original;
        self
    }

    /// Set proposed values
    #[inline]
    #[must_use]
    pub fn proposed(mut self, proposed: AxisSnapshot) -> Self {
        self.proposed = proposed;
        self
    }

    /// Set reason
    #[inline]
    #[must_use]
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Set staging time (defaults to now at build)
    #[inline]
    #[must_use]
    pub fn staged_at(mut self, at: DateTime<Utc>) -> Self {
        self.staged_at = Some(at);
        self
    }

    /// Capture the source row
    #[inline]
    #[must_use]
    pub fn row(mut self, row: &RowSnapshot) -> Self {
        self.row_data = row.to_json();
        self
    }

    /// Document number as given, if any
    #[inline]
    #[must_use]
    pub fn peek_document_number(&self) -> Option<&str> {
        self.document_number.as_deref()
    }

    /// Build record
    ///
    /// # Errors
    /// - [`RecordError::Validation`] if `document_number` is missing or blank,
    ///   or `line_id` is missing
    /// - [`RecordError::NoOpEdit`] if no axis differs
    pub fn build(self) -> Result<ChangeRecord, RecordError> {
        let document_number = self
            .document_number
            .filter(|doc| !doc.trim().is_empty())
            .ok_or_else(|| RecordError::missing("document_number"))?;
        let line_id = self
            .line_id
            .ok_or_else(|| RecordError::missing("line_id"))?;

        if !Axis::ORDER
            .into_iter()
            .any(|axis| self.original.differs_on(&self.proposed, axis))
        {
            return Err(RecordError::NoOpEdit { document_number });
        }

        let product_name = self
            .product_name
            .or_else(|| row_text(&self.row_data, "product_name"))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let vendor_name = self
            .vendor_name
            .or_else(|| row_text(&self.row_data, "vendor"))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        Ok(ChangeRecord {
            line_id,
            document_number,
            product_name,
            vendor_name,
            original: self.original,
            proposed: self.proposed,
            reason: self.reason,
            staged_at: self.staged_at.unwrap_or_else(Utc::now),
            row_data: self.row_data,
        })
    }
}

fn row_text(row: &Map<String, Value>, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Flat JSON shape of a record
///
/// Every field is optional on the way in so partial payloads still load;
/// identity checks run through the builder.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct PersistedChange {
    line_id: Option<i64>,
    document_number: Option<String>,
    product_name: Option<String>,
    vendor_name: Option<String>,
    original_arrival_date: Option<String>,
    original_status: Option<String>,
    original_warehouse_id: Option<i64>,
    original_warehouse_name: Option<String>,
    new_arrival_date: Option<String>,
    new_status: Option<String>,
    new_warehouse_id: Option<i64>,
    new_warehouse_name: Option<String>,
    reason: String,
    staged_at: Option<DateTime<Utc>>,
    row_data: Map<String, Value>,
}

fn axes_from_parts(
    date: Option<String>,
    status: Option<String>,
    warehouse_id: Option<i64>,
    warehouse_name: Option<String>,
) -> Result<AxisSnapshot, RecordError> {
    let defaults = AxisSnapshot::default();
    Ok(AxisSnapshot {
        arrival_date: date.as_deref().and_then(ArrivalDate::parse),
        status: status
            .as_deref()
            .map(str::parse::<ArrivalStatus>)
            .transpose()?
            .unwrap_or(defaults.status),
        warehouse_id: warehouse_id.unwrap_or(defaults.warehouse_id),
        warehouse_name: warehouse_name.unwrap_or(defaults.warehouse_name),
    })
}

impl TryFrom<PersistedChange> for ChangeRecord {
    type Error = RecordError;

    fn try_from(p: PersistedChange) -> Result<Self, Self::Error> {
        let original = axes_from_parts(
            p.original_arrival_date,
            p.original_status,
            p.original_warehouse_id,
            p.original_warehouse_name,
        )?;
        let proposed = axes_from_parts(
            p.new_arrival_date,
            p.new_status,
            p.new_warehouse_id,
            p.new_warehouse_name,
        )?;

        ChangeRecordBuilder {
            line_id: p.line_id,
            document_number: p.document_number,
            product_name: p.product_name,
            vendor_name: p.vendor_name,
            original,
            proposed,
            reason: p.reason,
            staged_at: p.staged_at,
            row_data: p.row_data,
        }
        .build()
    }
}

impl From<ChangeRecord> for PersistedChange {
    fn from(r: ChangeRecord) -> Self {
        Self {
            line_id: Some(r.line_id),
            document_number: Some(r.document_number),
            product_name: Some(r.product_name),
            vendor_name: Some(r.vendor_name),
            original_arrival_date: r.original.arrival_date.map(|d| d.to_storage_string()),
            original_status: Some(r.original.status.code().to_string()),
            original_warehouse_id: Some(r.original.warehouse_id),
            original_warehouse_name: Some(r.original.warehouse_name),
            new_arrival_date: r.proposed.arrival_date.map(|d| d.to_storage_string()),
            new_status: Some(r.proposed.status.code().to_string()),
            new_warehouse_id: Some(r.proposed.warehouse_id),
            new_warehouse_name: Some(r.proposed.warehouse_name),
            reason: r.reason,
            staged_at: Some(r.staged_at),
            row_data: r.row_data,
        }
    }
}
