//! lp-types: Shared data structures for lending position datasets
//!
//! This crate defines the tables that flow through the workspace:
//! - [`EventType`] - Action label with lifecycle variants and an `Other` variant for extensibility
//! - [`ActionRecord`] - One row of a user's action log (state snapshot after the action)
//! - [`MarketSnapshot`] - One observation of the market series
//! - [`HourlyRow`] - One reconstructed grid point of a user's position
//! - [`EventChain`] - A user's ordered sequence of action labels
//!
//! # Example
//!
//! ```rust
//! use lp_types::{ActionRecord, EventType};
//! use rust_decimal_macros::dec;
//!
//! let open = ActionRecord::new("0xabc", 1_000, EventType::PositionOpen, dec!(100), dec!(50));
//! assert!(open.is_open());
//! assert_eq!(open.event_sequence_type.label(), "position_open");
//! ```

mod action;
mod chain;
mod error;
mod event;
mod hourly;
mod market;
pub mod time;

pub use action::ActionRecord;
pub use chain::{EventChain, CHAIN_SEPARATOR};
pub use error::TypeError;
pub use event::EventType;
pub use hourly::HourlyRow;
pub use market::MarketSnapshot;
pub use time::{parse_date_ts, SECONDS_PER_HOUR};
