//! Row snapshots
//!
//! A schema-less copy of the source reporting row, captured when a change is
//! staged. Values are limited to a closed set so the JSON form stays total.

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

/// Single value in a row snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum RowValue {
    /// SQL NULL
    Null,
    /// Boolean flag
    Bool(bool),
    /// Integer column
    Int(i64),
    /// Floating point column
    Float(f64),
    /// Text column
    Text(String),
    /// Date column
    Date(NaiveDate),
    /// Timestamp column
    Timestamp(NaiveDateTime),
    /// Nested sequence
    List(Vec<RowValue>),
    /// Nested mapping
    Map(IndexMap<String, RowValue>),
}

impl RowValue {
    /// Text content, rendering scalars the way they would print
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Null | Self::List(_) | Self::Map(_) => None,
            Self::Text(s) => Some(s.clone()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Date(d) => Some(d.format(crate::date::ISO_DATE_FORMAT).to_string()),
            Self::Timestamp(ts) => Some(ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
        }
    }

    /// Integer content; integral floats and numeric text are accepted
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            #[allow(clippy::cast_possible_truncation)]
            Self::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Convert into a JSON value
    ///
    /// Dates and timestamps become ISO-8601 strings and nested values are
    /// converted recursively. Non-finite floats have no JSON form and fall
    /// back to their string representation; that branch is lossy and logged.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::Number((*i).into()),
            Self::Float(f) => Number::from_f64(*f).map_or_else(
                || {
                    tracing::warn!(value = %f, "row value has no JSON form, storing as text");
                    Value::String(f.to_string())
                },
                Value::Number,
            ),
            Self::Text(s) => Value::String(s.clone()),
            Self::Date(d) => Value::String(d.format(crate::date::ISO_DATE_FORMAT).to_string()),
            Self::Timestamp(ts) => {
                Value::String(ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
            }
            Self::List(items) => Value::Array(items.iter().map(RowValue::to_json).collect()),
            Self::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for RowValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RowValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for RowValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for RowValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for RowValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for RowValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<NaiveDate> for RowValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for RowValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::Timestamp(value)
    }
}

impl<T: Into<RowValue>> From<Option<T>> for RowValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Ordered key-value copy of a source row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSnapshot {
    fields: IndexMap<String, RowValue>,
}

impl RowSnapshot {
    /// Create empty snapshot
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, builder style
    #[inline]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<RowValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a field
    #[inline]
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RowValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Field by key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RowValue> {
        self.fields.get(key)
    }

    /// Text of a field; NULL and missing are both `None`
    #[must_use]
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(RowValue::as_text)
    }

    /// Integer of a field
    #[must_use]
    pub fn int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(RowValue::as_int)
    }

    /// Number of fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the snapshot has no fields
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// JSON object form of the snapshot
    #[must_use]
    pub fn to_json(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<RowValue>> FromIterator<(K, V)> for RowSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn dates_become_iso_strings() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let ts = date.and_hms_opt(9, 15, 0).unwrap();
        let row = RowSnapshot::new()
            .with("arrival_date", date)
            .with("created_at", ts);

        assert_eq!(
            Value::Object(row.to_json()),
            json!({
                "arrival_date": "2024-01-10",
                "created_at": "2024-01-10T09:15:00"
            })
        );
    }

    #[test]
    fn nested_values_are_recursed() {
        let inner: IndexMap<String, RowValue> =
            [("qty".to_string(), RowValue::Int(4))].into_iter().collect();
        let row = RowSnapshot::new().with(
            "lines",
            RowValue::List(vec![RowValue::Map(inner), RowValue::Null]),
        );

        assert_eq!(
            Value::Object(row.to_json()),
            json!({ "lines": [{ "qty": 4 }, null] })
        );
    }

    #[test]
    fn non_finite_float_falls_back_to_text() {
        assert_eq!(RowValue::Float(f64::NAN).to_json(), json!("NaN"));
        assert_eq!(RowValue::Float(f64::INFINITY).to_json(), json!("inf"));
        assert_eq!(RowValue::Float(1.5).to_json(), json!(1.5));
    }

    #[test]
    fn option_maps_to_null() {
        let missing: Option<&str> = None;
        assert_eq!(RowValue::from(missing), RowValue::Null);
        assert_eq!(RowValue::from(Some("x")), RowValue::Text("x".to_string()));
    }

    #[test]
    fn typed_accessors() {
        let row: RowSnapshot = [
            ("warehouse_id", RowValue::Text(" 12 ".to_string())),
            ("vendor", RowValue::from("ACME")),
            ("pending", RowValue::Null),
        ]
        .into_iter()
        .collect();

        assert_eq!(row.int("warehouse_id"), Some(12));
        assert_eq!(row.text("vendor").as_deref(), Some("ACME"));
        assert_eq!(row.text("pending"), None);
        assert_eq!(row.text("absent"), None);
        assert_eq!(row.len(), 3);
    }
}
