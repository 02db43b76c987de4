//! Command handlers
//!
//! Each handler runs one store operation and writes its human-readable
//! result to `out`. Logging goes to stderr, so `out` stays clean.

use crate::ledger::{LedgerUpdater, LogNotifier};
use anyhow::{bail, Context, Result};
use can_core::{BatchReconciler, BatchReport, Modifier};
use can_record::{ArrivalDate, ArrivalStatus, AxisSnapshot, ChangeRecord};
use can_staging::{OwnerResolver, PersistenceChannel, StagingStore};
use std::io::Write;

/// Parsed `stage` arguments
#[derive(Debug, Clone, Default)]
pub(crate) struct StageArgs {
    pub(crate) document_number: String,
    pub(crate) line_id: i64,
    pub(crate) from_date: Option<ArrivalDate>,
    /// `None` keeps the original date; `Some(None)` clears it
    pub(crate) to_date: Option<Option<ArrivalDate>>,
    pub(crate) from_status: ArrivalStatus,
    pub(crate) to_status: Option<ArrivalStatus>,
    pub(crate) from_warehouse: Option<(i64, String)>,
    pub(crate) to_warehouse: Option<(i64, String)>,
    pub(crate) reason: String,
    pub(crate) product_name: Option<String>,
    pub(crate) vendor_name: Option<String>,
}

impl StageArgs {
    fn axes(&self) -> (AxisSnapshot, AxisSnapshot) {
        let mut original = AxisSnapshot {
            arrival_date: self.from_date.clone(),
            status: self.from_status,
            ..AxisSnapshot::default()
        };
        if let Some((id, name)) = &self.from_warehouse {
            original = original.with_warehouse(*id, name.clone());
        }

        let mut proposed = original.clone();
        if let Some(date) = &self.to_date {
            proposed.arrival_date = date.clone();
        }
        if let Some(status) = self.to_status {
            proposed.status = status;
        }
        if let Some((id, name)) = &self.to_warehouse {
            proposed = proposed.with_warehouse(*id, name.clone());
        }
        (original, proposed)
    }
}

/// `ID:NAME` warehouse argument
pub(crate) fn parse_warehouse(text: &str) -> Result<(i64, String), String> {
    let (id, name) = text
        .split_once(':')
        .ok_or_else(|| format!("expected ID:NAME, got '{text}'"))?;
    let id = id
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid warehouse id '{id}': {e}"))?;
    Ok((id, name.trim().to_string()))
}

/// Date argument; blank or `none` means no date
pub(crate) fn parse_date(text: &str) -> Result<Option<ArrivalDate>, String> {
    if text.trim().eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let parsed = ArrivalDate::parse(text);
    match parsed.as_ref().and_then(ArrivalDate::as_unparsed) {
        Some(raw) => Err(format!("expected YYYY-MM-DD, got '{raw}'")),
        None => Ok(parsed),
    }
}

pub(crate) fn stage<C, W>(store: &mut StagingStore<C>, args: &StageArgs, out: &mut W) -> Result<()>
where
    C: PersistenceChannel,
    W: Write,
{
    let (original, proposed) = args.axes();
    let mut draft = ChangeRecord::builder()
        .line_id(args.line_id)
        .document_number(args.document_number.as_str())
        .original(original)
        .proposed(proposed)
        .reason(args.reason.as_str());
    if let Some(product) = &args.product_name {
        draft = draft.product_name(product.as_str());
    }
    if let Some(vendor) = &args.vendor_name {
        draft = draft.vendor_name(vendor.as_str());
    }

    let replacing = store.has_change_for(&args.document_number);
    let record = store
        .stage(draft)
        .with_context(|| format!("change for {} not staged", args.document_number))?;

    writeln!(
        out,
        "{} {}",
        if replacing { "replaced" } else { "staged" },
        record.document_number()
    )?;
    for line in record.changes_summary() {
        writeln!(out, "  {line}")?;
    }
    Ok(())
}

pub(crate) fn remove<C, W>(store: &mut StagingStore<C>, document_number: &str, out: &mut W) -> Result<()>
where
    C: PersistenceChannel,
    W: Write,
{
    if store.remove(document_number) {
        writeln!(out, "removed {document_number}")?;
    } else {
        writeln!(out, "nothing staged for {document_number}")?;
    }
    Ok(())
}

pub(crate) fn list<C, W>(store: &StagingStore<C>, out: &mut W) -> Result<()>
where
    C: PersistenceChannel,
    W: Write,
{
    writeln!(out, "{} pending change(s)", store.count())?;
    for record in store.iter() {
        writeln!(
            out,
            "{} line {} | {} | {}",
            record.document_number(),
            record.line_id(),
            record.product_name(),
            record.vendor_name()
        )?;
        for line in record.changes_summary() {
            writeln!(out, "  {line}")?;
        }
        if !record.reason().is_empty() {
            writeln!(out, "  Reason: {}", record.reason())?;
        }
    }
    Ok(())
}

pub(crate) fn show<C, W>(store: &StagingStore<C>, document_number: &str, out: &mut W) -> Result<()>
where
    C: PersistenceChannel,
    W: Write,
{
    let Some(record) = store.get(document_number) else {
        bail!("nothing staged for {document_number}");
    };
    writeln!(out, "{}", serde_json::to_string_pretty(record)?)?;
    Ok(())
}

pub(crate) fn clear<C, W>(store: &mut StagingStore<C>, out: &mut W) -> Result<()>
where
    C: PersistenceChannel,
    W: Write,
{
    let count = store.count();
    store.clear_all();
    writeln!(out, "cleared {count} pending change(s)")?;
    Ok(())
}

pub(crate) fn owners<C, R, W>(store: &StagingStore<C>, resolver: &R, out: &mut W) -> Result<()>
where
    C: PersistenceChannel,
    R: OwnerResolver + ?Sized,
    W: Write,
{
    let groups = store.group_by_owner(resolver);
    let grouped: usize = groups.values().map(Vec::len).sum();
    for (owner, records) in &groups {
        let docs: Vec<&str> = records.iter().map(ChangeRecord::document_number).collect();
        writeln!(out, "{owner}: {}", docs.join(", "))?;
    }
    let unowned = store.count() - grouped;
    if unowned > 0 {
        writeln!(out, "{unowned} change(s) without a known owner")?;
    }
    Ok(())
}

pub(crate) async fn apply<C, R, W>(
    store: &mut StagingStore<C>,
    reconciler: &BatchReconciler<LedgerUpdater, LogNotifier, R>,
    modifier: &Modifier,
    out: &mut W,
) -> Result<BatchReport>
where
    C: PersistenceChannel,
    R: OwnerResolver,
    W: Write,
{
    if modifier.email.trim().is_empty() {
        bail!("apply needs a [modifier] email in the config file");
    }

    let report = reconciler.reconcile(store, modifier).await;
    writeln!(
        out,
        "applied {} change(s), {} failed, {} owner(s) notified in {}ms",
        report.applied_count(),
        report.failed_count(),
        report.notifications.len() - report.undelivered_count(),
        report.elapsed.as_millis()
    )?;
    for failed in &report.failed {
        writeln!(out, "  {}: {}", failed.document_number, failed.error)?;
    }
    Ok(report)
}
