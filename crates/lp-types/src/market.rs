//! Market series observations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One observation of a lending market.
///
/// A snapshot is valid from its `timestamp` until the next observation's
/// timestamp (step function, last observation carried forward).
///
/// Prices and pool sizes are [`Decimal`]; rates and rolling statistics
/// are plain `f64` ratios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Observation time (seconds since Unix epoch).
    pub timestamp: i64,

    /// Collateral asset price.
    pub collateral_price: Decimal,

    /// Loan asset price. Non-positive values mark pricing gaps.
    pub loan_asset_price: Decimal,

    /// Total assets supplied to the market.
    pub total_supply: Decimal,

    /// Total assets borrowed from the market.
    pub total_borrow: Decimal,

    /// Borrow / supply ratio.
    pub utilization: f64,

    /// Borrow rate.
    pub borrow_rate: f64,

    /// Supply rate.
    pub supply_rate: f64,

    /// Rolling 6h collateral price volatility.
    pub volatility_6h: f64,

    /// Rolling 6h collateral price drawdown.
    pub drawdown_6h: f64,
}

impl MarketSnapshot {
    /// Loan asset price to use for valuation.
    ///
    /// Falls back to `1` when the series reports a non-positive price,
    /// which stands in for a stable loan asset.
    pub fn effective_loan_price(&self) -> Decimal {
        if self.loan_asset_price > Decimal::ZERO {
            self.loan_asset_price
        } else {
            Decimal::ONE
        }
    }
}
