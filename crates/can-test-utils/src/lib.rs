//! Testing utilities for the CAN staging workspace
//!
//! Shared fixtures: a representative view row, axis snapshots and ready
//! drafts with a fixed staging time so records compare equal across runs.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]

use can_record::{ArrivalStatus, AxisSnapshot, ChangeRecord, ChangeRecordBuilder, RowSnapshot};
use chrono::{DateTime, NaiveDate, Utc};

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn fixed_staged_at() -> DateTime<Utc> {
    "2024-01-09T10:00:00Z".parse().unwrap()
}

pub fn sample_row() -> RowSnapshot {
    RowSnapshot::new()
        .with("arrival_note_number", "CAN-100")
        .with("can_line_id", 42)
        .with("arrival_date", ymd(2024, 1, 10))
        .with("can_status", "pending")
        .with("warehouse_id", 1)
        .with("warehouse_name", "W1")
        .with("product_name", "Vitamin C 500mg")
        .with("vendor", "ACME Pharma")
        .with("pending_quantity", 120)
}

pub fn original_axes() -> AxisSnapshot {
    AxisSnapshot::new(Some(ymd(2024, 1, 10).into()), ArrivalStatus::Request, 1, "W1")
}

pub fn proposed_axes() -> AxisSnapshot {
    original_axes()
        .with_date(ymd(2024, 1, 15))
        .with_status(ArrivalStatus::StockedIn)
}

/// Draft with date and status changed, line id 1
pub fn draft(document_number: &str) -> ChangeRecordBuilder {
    ChangeRecord::builder()
        .line_id(1)
        .document_number(document_number)
        .original(original_axes())
        .proposed(proposed_axes())
        .reason("vessel delayed")
        .staged_at(fixed_staged_at())
}

pub fn record(document_number: &str) -> ChangeRecord {
    draft(document_number).build().unwrap()
}

pub fn record_with_reason(document_number: &str, reason: &str) -> ChangeRecord {
    draft(document_number).reason(reason).build().unwrap()
}

/// Draft whose proposed date has been cleared
pub fn undated_draft(document_number: &str) -> ChangeRecordBuilder {
    draft(document_number).proposed(AxisSnapshot {
        arrival_date: None,
        ..proposed_axes()
    })
}
