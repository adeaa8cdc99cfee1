//! Raw CSV records and column layouts.

use lp_types::{ActionRecord, EventType, MarketSnapshot};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// Required columns of the action log.
pub const ACTION_COLUMNS: &[&str] = &[
    "user_address",
    "timestamp",
    "event_sequence_type",
    "collateral_after",
    "debt_after",
];

/// Required columns of the market series.
pub const MARKET_COLUMNS: &[&str] = &[
    "timestamp",
    "collateral_price",
    "loan_asset_price",
    "total_supply",
    "total_borrow",
    "utilization",
    "borrow_rate",
    "supply_rate",
    "volatility_6h",
    "drawdown_6h",
];

/// Columns of the hourly dataset, in output order.
pub const HOURLY_COLUMNS: &[&str] = &[
    "user_address",
    "timestamp",
    "datetime",
    "collateral",
    "debt",
    "ltv",
    "action",
    "total_supply",
    "total_borrow",
    "market_utilization",
    "borrow_rate",
    "supply_rate",
    "collateral_price",
    "loan_asset_price",
    "volatility_6h",
    "drawdown_6h",
];

/// Columns of the event chain table.
pub const CHAIN_COLUMNS: &[&str] = &["user_address", "event_chain", "total_events"];

/// Raw CSV record for the action log.
/// Maps directly to the CSV columns; extra columns are ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct ActionRow {
    pub user_address: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: i64,
    pub event_sequence_type: String,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub collateral_after: Decimal,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub debt_after: Decimal,
}

impl TryFrom<ActionRow> for ActionRecord {
    type Error = String;

    fn try_from(row: ActionRow) -> Result<Self, Self::Error> {
        if row.user_address.is_empty() {
            return Err("empty user_address".to_string());
        }
        if row.event_sequence_type.is_empty() {
            return Err("empty event_sequence_type".to_string());
        }

        Ok(ActionRecord::new(
            row.user_address,
            row.timestamp,
            EventType::from_label(&row.event_sequence_type),
            row.collateral_after,
            row.debt_after,
        ))
    }
}

/// Raw CSV record for the market series.
#[derive(Debug, Deserialize)]
pub(crate) struct MarketRow {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: i64,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub collateral_price: Decimal,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub loan_asset_price: Decimal,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub total_supply: Decimal,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub total_borrow: Decimal,
    #[serde(deserialize_with = "deserialize_stat")]
    pub utilization: f64,
    #[serde(deserialize_with = "deserialize_stat")]
    pub borrow_rate: f64,
    #[serde(deserialize_with = "deserialize_stat")]
    pub supply_rate: f64,
    #[serde(deserialize_with = "deserialize_stat")]
    pub volatility_6h: f64,
    #[serde(deserialize_with = "deserialize_stat")]
    pub drawdown_6h: f64,
}

impl From<MarketRow> for MarketSnapshot {
    fn from(row: MarketRow) -> Self {
        MarketSnapshot {
            timestamp: row.timestamp,
            collateral_price: row.collateral_price,
            loan_asset_price: row.loan_asset_price,
            total_supply: row.total_supply,
            total_borrow: row.total_borrow,
            utilization: row.utilization,
            borrow_rate: row.borrow_rate,
            supply_rate: row.supply_rate,
            volatility_6h: row.volatility_6h,
            drawdown_6h: row.drawdown_6h,
        }
    }
}

/// Parse a decimal in plain or scientific notation.
///
/// Values with more precision than a `Decimal` holds are rounded through
/// `f64`: magnitudes below `1e-28` become zero and magnitudes beyond
/// `Decimal::MAX` saturate.
pub fn parse_decimal(s: &str) -> Result<Decimal, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty decimal".to_string());
    }
    if s.eq_ignore_ascii_case("nan") {
        return Err("NaN is not a valid balance".to_string());
    }

    s.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(s))
        .or_else(|e| decimal_from_float(s).ok_or_else(|| format!("invalid decimal {:?}: {}", s, e)))
}

fn decimal_from_float(s: &str) -> Option<Decimal> {
    let f = s.parse::<f64>().ok().filter(|f| f.is_finite())?;
    if f.abs() < 1e-28 {
        return Some(Decimal::ZERO);
    }
    Some(Decimal::from_f64(f).unwrap_or_else(|| {
        tracing::warn!("Decimal {} out of range, saturating", s);
        if f < 0.0 {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    }))
}

/// Parse a market statistic. Empty cells and `NaN` both mean "not available".
pub fn parse_stat(s: &str) -> Result<f64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(f64::NAN);
    }
    s.parse::<f64>()
        .map_err(|e| format!("invalid number {:?}: {}", s, e))
}

/// Parse integer seconds, accepting floats with no fractional part.
pub fn parse_timestamp(s: &str) -> Result<i64, String> {
    let s = s.trim();
    if let Ok(ts) = s.parse::<i64>() {
        return Ok(ts);
    }

    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 => Ok(f as i64),
        _ => Err(format!("invalid timestamp: {:?}", s)),
    }
}

/// Deserialize decimal from string.
fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_decimal(&s).map_err(serde::de::Error::custom)
}

/// Deserialize a market statistic from string.
fn deserialize_stat<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_stat(&s).map_err(serde::de::Error::custom)
}

/// Deserialize integer seconds from string.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_timestamp(&s).map_err(serde::de::Error::custom)
}
