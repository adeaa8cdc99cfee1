//! Reconstructed hourly position rows.
//!
//! [`HourlyRow`] is the output table of the hourly alignment: one row per
//! user per grid point, combining the carried-forward account state with
//! the market snapshot prevailing at that grid point.

use crate::time::DATETIME_FORMAT;
use crate::EventType;
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Label written for grid points with no nearby action.
const NO_ACTION: &str = "none";

/// One grid point of a user's reconstructed position.
///
/// Field order is the column order of the persisted dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRow {
    /// The user's address (hex string).
    pub user_address: String,

    /// Grid timestamp (seconds since Unix epoch).
    pub timestamp: i64,

    /// Grid timestamp rendered as `YYYY-MM-DD HH:MM:SS` (UTC).
    #[serde(
        serialize_with = "serialize_datetime",
        deserialize_with = "deserialize_datetime"
    )]
    pub datetime: DateTime<Utc>,

    /// Carried-forward collateral balance (dust clamped).
    pub collateral: Decimal,

    /// Carried-forward debt balance (dust clamped).
    pub debt: Decimal,

    /// Loan-to-value ratio, `0` when collateral has no value.
    pub ltv: Decimal,

    /// Most recent action within one step of this grid point.
    #[serde(serialize_with = "serialize_action", deserialize_with = "deserialize_action")]
    pub action: Option<EventType>,

    pub total_supply: Decimal,
    pub total_borrow: Decimal,
    pub market_utilization: f64,
    pub borrow_rate: f64,
    pub supply_rate: f64,
    pub collateral_price: Decimal,

    /// Effective loan asset price (non-positive market values replaced by `1`).
    pub loan_asset_price: Decimal,

    pub volatility_6h: f64,
    pub drawdown_6h: f64,
}

impl HourlyRow {
    /// Returns true if this grid point is labeled with the position close.
    pub fn is_close(&self) -> bool {
        self.action == Some(EventType::PositionClose)
    }

    /// Label of this row's action, `none` when absent.
    pub fn action_label(&self) -> &str {
        self.action.as_ref().map(EventType::label).unwrap_or(NO_ACTION)
    }
}

fn serialize_datetime<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&dt.format(DATETIME_FORMAT))
}

fn deserialize_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&s, DATETIME_FORMAT)
        .map(|dt| dt.and_utc())
        .map_err(serde::de::Error::custom)
}

fn serialize_action<S>(action: &Option<EventType>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match action {
        Some(event) => serializer.serialize_str(event.label()),
        None => serializer.serialize_str(NO_ACTION),
    }
}

fn deserialize_action<'de, D>(deserializer: D) -> Result<Option<EventType>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if s == NO_ACTION {
        Ok(None)
    } else {
        Ok(Some(EventType::from_label(&s)))
    }
}
