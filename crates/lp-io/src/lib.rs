//! lp-io: Table persistence for lending position datasets.
//!
//! Readers load the two inputs of the reconstruction, validating every row:
//! - [`read_actions_csv`] / [`read_actions_file`] - the per-user action log
//! - [`read_market_csv`] / [`read_market_file`] - the market series
//!
//! Writers persist the derived tables as CSV (and the hourly dataset as JSON).
//!
//! # Example
//!
//! ```rust
//! use lp_io::{read_actions_csv, write_actions_csv};
//!
//! let data = "user_address,timestamp,event_sequence_type,collateral_after,debt_after\n\
//!             0xabc,1000,position_open,100,50\n";
//! let actions = read_actions_csv(data.as_bytes()).unwrap();
//!
//! let mut out = Vec::new();
//! write_actions_csv(&mut out, &actions).unwrap();
//! assert!(String::from_utf8(out).unwrap().contains("0xabc,1000,position_open,100,50"));
//! ```

mod error;
mod parser;
mod types;
mod writer;

pub use error::IoError;
pub use parser::{read_actions_csv, read_actions_file, read_market_csv, read_market_file};
pub use types::{
    parse_decimal, parse_stat, parse_timestamp, ACTION_COLUMNS, CHAIN_COLUMNS, HOURLY_COLUMNS, MARKET_COLUMNS,
};
pub use writer::{
    write_actions_csv, write_actions_file, write_chains_csv, write_chains_file, write_hourly_csv,
    write_hourly_file, write_hourly_json, write_hourly_json_file,
};
