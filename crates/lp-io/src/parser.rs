//! CSV readers for the action log and the market series.
//!
//! Readers fail fast: a missing column or a single unparsable row aborts
//! the whole read, so malformed input never reaches the reconstruction.

use crate::error::IoError;
use crate::types::{ActionRow, MarketRow, ACTION_COLUMNS, MARKET_COLUMNS};
use csv::StringRecord;
use lp_types::{ActionRecord, MarketSnapshot};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io;
use std::path::Path;

/// Parse an action log from CSV data.
///
/// # Example
///
/// ```rust
/// let data = "user_address,timestamp,event_sequence_type,collateral_after,debt_after\n\
///             0xabc,1000,position_open,100,50\n";
/// let actions = lp_io::read_actions_csv(data.as_bytes()).unwrap();
/// assert!(actions[0].is_open());
/// ```
pub fn read_actions_csv<R: io::Read>(reader: R) -> Result<Vec<ActionRecord>, IoError> {
    read_rows(reader, ACTION_COLUMNS, Some("user_address"), |row: ActionRow| {
        ActionRecord::try_from(row)
    })
}

/// Parse a market series from CSV data.
pub fn read_market_csv<R: io::Read>(reader: R) -> Result<Vec<MarketSnapshot>, IoError> {
    read_rows(reader, MARKET_COLUMNS, None, |row: MarketRow| {
        Ok(MarketSnapshot::from(row))
    })
}

/// Read an action log from a CSV file.
pub fn read_actions_file(path: impl AsRef<Path>) -> Result<Vec<ActionRecord>, IoError> {
    let path = path.as_ref();
    let actions = read_actions_csv(File::open(path)?)?;
    tracing::info!("Read {} actions from {}", actions.len(), path.display());
    Ok(actions)
}

/// Read a market series from a CSV file.
pub fn read_market_file(path: impl AsRef<Path>) -> Result<Vec<MarketSnapshot>, IoError> {
    let path = path.as_ref();
    let snapshots = read_market_csv(File::open(path)?)?;
    tracing::info!("Read {} market rows from {}", snapshots.len(), path.display());
    Ok(snapshots)
}

fn read_rows<R, Row, T, F>(
    reader: R,
    columns: &[&str],
    user_column: Option<&str>,
    convert: F,
) -> Result<Vec<T>, IoError>
where
    R: io::Read,
    Row: DeserializeOwned,
    F: Fn(Row) -> Result<T, String>,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    require_columns(&headers, columns)?;
    let user_idx = user_column.and_then(|name| headers.iter().position(|h| h == name));

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        let malformed = |reason: String| IoError::MalformedRow {
            line,
            user: user_idx
                .and_then(|idx| record.get(idx))
                .map(str::to_string),
            reason,
        };

        let row: Row = record
            .deserialize(Some(&headers))
            .map_err(|e| malformed(e.to_string()))?;
        rows.push(convert(row).map_err(malformed)?);
    }

    tracing::debug!("Parsed {} rows", rows.len());
    Ok(rows)
}

fn require_columns(headers: &StringRecord, columns: &[&str]) -> Result<(), IoError> {
    for column in columns {
        if !headers.iter().any(|h| h == *column) {
            return Err(IoError::MissingColumn {
                column: (*column).to_string(),
            });
        }
    }
    Ok(())
}
