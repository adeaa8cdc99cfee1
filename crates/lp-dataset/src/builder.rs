//! Dataset builder implementation.
//!
//! The [`DatasetBuilder`] is the main entry point for turning an action log
//! and a market series into the derived tables.

use crate::aligner::build_hourly_dataset;
use crate::chains::{build_event_chains, leave_valid_chains, ChainFilter};
use crate::config::DatasetConfig;
use crate::error::DatasetError;
use crate::market::MarketSeries;
use crate::period::{select_period, PeriodWindow};
use lp_types::{ActionRecord, EventChain, HourlyRow};

/// Builds the derived tables for one configuration.
///
/// # Example
///
/// ```rust
/// use lp_dataset::{DatasetBuilder, DatasetConfig, MarketSeries};
/// use lp_types::{ActionRecord, EventType, MarketSnapshot};
/// use rust_decimal_macros::dec;
///
/// let actions = vec![
///     ActionRecord::new("0xabc", 1000, EventType::PositionOpen, dec!(100), dec!(50)),
///     ActionRecord::new("0xabc", 5000, EventType::PositionClose, dec!(0), dec!(0)),
/// ];
/// let market = MarketSeries::new(vec![MarketSnapshot {
///     timestamp: 0,
///     collateral_price: dec!(10),
///     loan_asset_price: dec!(1),
///     total_supply: dec!(0),
///     total_borrow: dec!(0),
///     utilization: 0.0,
///     borrow_rate: 0.0,
///     supply_rate: 0.0,
///     volatility_6h: 0.0,
///     drawdown_6h: 0.0,
/// }]);
///
/// let builder = DatasetBuilder::new(DatasetConfig::default());
/// let rows = builder.build_hourly(&actions, &market).unwrap();
/// assert_eq!(rows[0].ltv, dec!(0.05));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DatasetBuilder {
    config: DatasetConfig,
}

impl DatasetBuilder {
    /// Create a builder with the given config.
    pub fn new(config: DatasetConfig) -> Self {
        Self { config }
    }

    /// Get the config.
    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// Select each user's first position opened inside `window`.
    ///
    /// Open positions are capped at the configured truncation timestamp.
    pub fn select_period(&self, actions: &[ActionRecord], window: &PeriodWindow) -> Vec<ActionRecord> {
        let selected = select_period(actions, window, self.config.truncation_ts);
        tracing::info!(
            "Selected {} of {} actions in window {} -> {}",
            selected.len(),
            actions.len(),
            window.start_ts,
            window.end_ts
        );
        selected
    }

    /// Reconstruct the hourly dataset.
    pub fn build_hourly(
        &self,
        actions: &[ActionRecord],
        market: &MarketSeries,
    ) -> Result<Vec<HourlyRow>, DatasetError> {
        tracing::info!(
            "Aligning {} actions against {} market rows (step {}s, parallel: {})",
            actions.len(),
            market.len(),
            self.config.step_secs,
            self.config.parallel
        );

        let rows = build_hourly_dataset(actions, market, &self.config)?;

        let users = rows
            .windows(2)
            .filter(|w| w[0].user_address != w[1].user_address)
            .count()
            + usize::from(!rows.is_empty());
        tracing::info!("Built {} hourly rows for {} users", rows.len(), users);
        Ok(rows)
    }

    /// Build event chains, optionally filtered.
    pub fn event_chains(
        &self,
        actions: &[ActionRecord],
        filter: Option<&ChainFilter>,
    ) -> Vec<EventChain> {
        let chains = build_event_chains(actions);
        let total = chains.len();

        let chains = match filter {
            Some(filter) => leave_valid_chains(&chains, filter),
            None => chains,
        };
        tracing::info!("Built {} event chains ({} kept)", total, chains.len());
        chains
    }
}
