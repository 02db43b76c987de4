//! Arrival status vocabulary
//!
//! Codes match the `arrivals.status` database enum exactly. The reporting
//! view hands back lowercase spellings, so parsing accepts those too.

use crate::error::RecordError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a container arrival line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrivalStatus {
    /// Arrival requested, not yet confirmed
    #[default]
    #[serde(rename = "REQUEST_STATUS")]
    Request,
    /// Confirmed by the vendor
    #[serde(rename = "CONFIRMED_STATUS")]
    Confirmed,
    /// Held at customs
    #[serde(rename = "CUSTOM_CLEARANCE_STATUS")]
    CustomClearance,
    /// Physically at the warehouse
    #[serde(rename = "WH_ARRIVAL_STATUS")]
    WarehouseArrival,
    /// Fully stocked in
    #[serde(rename = "STOCKED_IN_STATUS")]
    StockedIn,
    /// Partially stocked in
    #[serde(rename = "PARTIALLY_STOCKED_IN_STATUS")]
    PartiallyStockedIn,
    /// Picked up by the consignee
    #[serde(rename = "PICKED_UP_STATUS")]
    PickedUp,
}

impl ArrivalStatus {
    /// Every status, in dropdown order
    pub const ALL: [ArrivalStatus; 7] = [
        ArrivalStatus::Request,
        ArrivalStatus::Confirmed,
        ArrivalStatus::CustomClearance,
        ArrivalStatus::WarehouseArrival,
        ArrivalStatus::StockedIn,
        ArrivalStatus::PartiallyStockedIn,
        ArrivalStatus::PickedUp,
    ];

    /// Database enum code
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            ArrivalStatus::Request => "REQUEST_STATUS",
            ArrivalStatus::Confirmed => "CONFIRMED_STATUS",
            ArrivalStatus::CustomClearance => "CUSTOM_CLEARANCE_STATUS",
            ArrivalStatus::WarehouseArrival => "WH_ARRIVAL_STATUS",
            ArrivalStatus::StockedIn => "STOCKED_IN_STATUS",
            ArrivalStatus::PartiallyStockedIn => "PARTIALLY_STOCKED_IN_STATUS",
            ArrivalStatus::PickedUp => "PICKED_UP_STATUS",
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            ArrivalStatus::Request => "Pending/Request",
            ArrivalStatus::Confirmed => "Confirmed",
            ArrivalStatus::CustomClearance => "Custom Clearance",
            ArrivalStatus::WarehouseArrival => "Warehouse Arrival",
            ArrivalStatus::StockedIn => "Stocked In",
            ArrivalStatus::PartiallyStockedIn => "Partially Stocked In",
            ArrivalStatus::PickedUp => "Picked Up",
        }
    }

    /// Parse a reporting-view spelling (`stocked_in`, `pending`, ...)
    fn from_view_value(s: &str) -> Option<Self> {
        let status = match s {
            "pending" | "request" => ArrivalStatus::Request,
            "confirmed" => ArrivalStatus::Confirmed,
            "custom_clearance" => ArrivalStatus::CustomClearance,
            "warehouse_arrival" => ArrivalStatus::WarehouseArrival,
            "stocked_in" => ArrivalStatus::StockedIn,
            "partially_stocked_in" => ArrivalStatus::PartiallyStockedIn,
            "picked_up" => ArrivalStatus::PickedUp,
            _ => return None,
        };
        Some(status)
    }
}

impl fmt::Display for ArrivalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ArrivalStatus {
    type Err = RecordError;

    /// Accepts database codes, view spellings and display labels
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.code() == trimmed || status.label() == trimmed)
            .or_else(|| Self::from_view_value(&trimmed.to_ascii_lowercase()))
            .ok_or_else(|| RecordError::UnknownStatus(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_database_codes() {
        for status in ArrivalStatus::ALL {
            assert_eq!(status.code().parse::<ArrivalStatus>().unwrap(), status);
        }
    }

    #[test]
    fn parses_view_spellings_and_labels() {
        assert_eq!("pending".parse::<ArrivalStatus>().unwrap(), ArrivalStatus::Request);
        assert_eq!("Stocked_In".parse::<ArrivalStatus>().unwrap(), ArrivalStatus::StockedIn);
        assert_eq!(
            "Warehouse Arrival".parse::<ArrivalStatus>().unwrap(),
            ArrivalStatus::WarehouseArrival
        );
    }

    #[test]
    fn rejects_unknown() {
        let err = "CUSTOMER_CLEARANCE_STATUS".parse::<ArrivalStatus>().unwrap_err();
        assert!(matches!(err, RecordError::UnknownStatus(_)));
    }

    #[test]
    fn serializes_as_code() {
        let json = serde_json::to_string(&ArrivalStatus::WarehouseArrival).unwrap();
        assert_eq!(json, "\"WH_ARRIVAL_STATUS\"");
        let back: ArrivalStatus = serde_json::from_str("\"PICKED_UP_STATUS\"").unwrap();
        assert_eq!(back, ArrivalStatus::PickedUp);
    }

    #[test]
    fn default_is_request() {
        assert_eq!(ArrivalStatus::default(), ArrivalStatus::Request);
        assert_eq!(ArrivalStatus::default().to_string(), "Pending/Request");
    }
}
