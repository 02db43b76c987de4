//! Arrival dates
//!
//! Upstream rows are not guaranteed clean, so a date that fails to parse is
//! kept as its raw text instead of being rejected.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt;

/// Storage format for dates (`2024-01-15`)
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Display format for dates (`Jan 15, 2024`)
pub const DISPLAY_DATE_FORMAT: &str = "%b %d, %Y";

/// Label for a missing date
pub const NOT_SET: &str = "Not set";

/// Arrival date as received from upstream
///
/// Either a calendar date or unreadable text kept as given. Unreadable text
/// only comes out of [`ArrivalDate::parse`], so the storage form always
/// parses back to the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrivalDate(Repr);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Repr {
    Date(NaiveDate),
    Unparsed(String),
}

impl ArrivalDate {
    /// Parse text into an arrival date
    ///
    /// Accepts `YYYY-MM-DD` and ISO timestamps (the time part is dropped).
    /// Blank text yields `None`; anything else unreadable is kept verbatim.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        let parsed = NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT)
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|dt| dt.date())
            })
            .or_else(|| {
                DateTime::parse_from_rfc3339(trimmed)
                    .ok()
                    .map(|dt| dt.date_naive())
            });

        Some(Self(match parsed {
            Some(date) => Repr::Date(date),
            None => Repr::Unparsed(trimmed.to_string()),
        }))
    }

    /// Calendar date, if the text was readable
    #[inline]
    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match &self.0 {
            Repr::Date(date) => Some(*date),
            Repr::Unparsed(_) => None,
        }
    }

    /// Raw text, if it could not be read as a date
    #[inline]
    #[must_use]
    pub fn as_unparsed(&self) -> Option<&str> {
        match &self.0 {
            Repr::Date(_) => None,
            Repr::Unparsed(raw) => Some(raw.as_str()),
        }
    }

    /// Storage form: ISO date, or the raw text
    #[must_use]
    pub fn to_storage_string(&self) -> String {
        match &self.0 {
            Repr::Date(date) => date.format(ISO_DATE_FORMAT).to_string(),
            Repr::Unparsed(raw) => raw.clone(),
        }
    }

    /// Whether the date lies strictly before `today`
    #[inline]
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.as_date().is_some_and(|date| date < today)
    }
}

impl From<NaiveDate> for ArrivalDate {
    #[inline]
    fn from(date: NaiveDate) -> Self {
        Self(Repr::Date(date))
    }
}

impl fmt::Display for ArrivalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Repr::Date(date) => write!(f, "{}", date.format(DISPLAY_DATE_FORMAT)),
            Repr::Unparsed(raw) => f.write_str(raw),
        }
    }
}

/// Display an optional date, `Not set` when absent
#[must_use]
pub fn display_date(date: Option<&ArrivalDate>) -> String {
    date.map_or_else(|| NOT_SET.to_string(), ToString::to_string)
}

/// Signed day delta from `from` to `to`
///
/// `None` when either side is missing or unreadable.
#[must_use]
pub fn day_delta(from: Option<&ArrivalDate>, to: Option<&ArrivalDate>) -> Option<i64> {
    let from = from?.as_date()?;
    let to = to?.as_date()?;
    Some((to - from).num_days())
}
