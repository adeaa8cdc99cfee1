//! lp-dataset: Position time-series reconstruction for lending protocols.
//!
//! This crate provides the [`DatasetBuilder`], the main entry point for
//! turning a per-user action log and a market series into modeling tables.
//!
//! # Overview
//!
//! - [`select_period`] isolates each user's first position opened inside a
//!   [`PeriodWindow`], bounded by its first subsequent close
//! - [`build_hourly_dataset`] resamples every position onto a fixed grid,
//!   carrying balances forward and joining the market snapshot in effect
//! - [`build_event_chains`] and [`leave_valid_chains`] summarize users by
//!   their sequence of actions
//!
//! All operations are pure: inputs are borrowed, new tables are returned.
//!
//! # Example
//!
//! ```rust
//! use lp_dataset::{DatasetBuilder, DatasetConfig, PeriodWindow};
//! use lp_types::{ActionRecord, EventType};
//! use rust_decimal_macros::dec;
//!
//! let actions = vec![
//!     ActionRecord::new("0xabc", 1000, EventType::PositionOpen, dec!(100), dec!(50)),
//!     ActionRecord::new("0xabc", 2000, EventType::Borrow, dec!(100), dec!(60)),
//!     ActionRecord::new("0xabc", 5000, EventType::PositionClose, dec!(0), dec!(0)),
//!     ActionRecord::new("0xabc", 9000, EventType::Supply, dec!(5), dec!(0)),
//! ];
//!
//! let builder = DatasetBuilder::new(DatasetConfig::default());
//! let window = PeriodWindow::new(0, 1500).unwrap();
//! let selected = builder.select_period(&actions, &window);
//! assert_eq!(selected.len(), 3);
//! ```

mod aligner;
mod builder;
mod chains;
mod config;
mod error;
mod market;
mod period;
mod timeline;

pub use aligner::{align_user, build_hourly_dataset, collateral_dust, debt_dust, loan_to_value};
pub use builder::DatasetBuilder;
pub use chains::{build_event_chains, leave_valid_chains, ChainFilter, DEFAULT_LEN_LIM};
pub use config::{DatasetConfig, DEFAULT_STEP_SECS};
pub use error::DatasetError;
pub use market::MarketSeries;
pub use period::{select_period, PeriodWindow};
pub use timeline::{first_close_after, grid, Lifecycle, StateCursor, UserTimeline};

// Re-export commonly used types for convenience
pub use lp_types::{ActionRecord, EventChain, EventType, HourlyRow, MarketSnapshot};
