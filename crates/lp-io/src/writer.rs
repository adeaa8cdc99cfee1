//! CSV and JSON writers for the derived tables.
//!
//! CSV output always starts with a header row, even for an empty table.

use crate::error::IoError;
use crate::types::{ACTION_COLUMNS, CHAIN_COLUMNS, HOURLY_COLUMNS};
use lp_types::{ActionRecord, EventChain, HourlyRow};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::Path;

/// Write the hourly dataset as CSV.
pub fn write_hourly_csv<W: io::Write>(writer: W, rows: &[HourlyRow]) -> Result<(), IoError> {
    write_csv(writer, HOURLY_COLUMNS, rows)
}

/// Write an action log as CSV (e.g. a period selection).
pub fn write_actions_csv<W: io::Write>(writer: W, actions: &[ActionRecord]) -> Result<(), IoError> {
    write_csv(writer, ACTION_COLUMNS, actions)
}

/// Write event chains as CSV.
pub fn write_chains_csv<W: io::Write>(writer: W, chains: &[EventChain]) -> Result<(), IoError> {
    write_csv(writer, CHAIN_COLUMNS, chains)
}

/// Write the hourly dataset as a pretty-printed JSON array.
pub fn write_hourly_json<W: io::Write>(writer: W, rows: &[HourlyRow]) -> Result<(), IoError> {
    serde_json::to_writer_pretty(writer, rows)?;
    Ok(())
}

pub fn write_hourly_file(path: impl AsRef<Path>, rows: &[HourlyRow]) -> Result<(), IoError> {
    let path = path.as_ref();
    write_hourly_csv(create_file(path)?, rows)?;
    tracing::info!("Wrote {} hourly rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn write_hourly_json_file(path: impl AsRef<Path>, rows: &[HourlyRow]) -> Result<(), IoError> {
    let path = path.as_ref();
    let mut writer = create_file(path)?;
    write_hourly_json(&mut writer, rows)?;
    io::Write::flush(&mut writer)?;
    tracing::info!("Wrote {} hourly rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn write_actions_file(path: impl AsRef<Path>, actions: &[ActionRecord]) -> Result<(), IoError> {
    let path = path.as_ref();
    write_actions_csv(create_file(path)?, actions)?;
    tracing::info!("Wrote {} actions to {}", actions.len(), path.display());
    Ok(())
}

pub fn write_chains_file(path: impl AsRef<Path>, chains: &[EventChain]) -> Result<(), IoError> {
    let path = path.as_ref();
    write_chains_csv(create_file(path)?, chains)?;
    tracing::info!("Wrote {} event chains to {}", chains.len(), path.display());
    Ok(())
}

fn write_csv<W, T>(writer: W, columns: &[&str], rows: &[T]) -> Result<(), IoError>
where
    W: io::Write,
    T: Serialize,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    writer.write_record(columns)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Create a file, creating missing parent directories first.
fn create_file(path: &Path) -> Result<BufWriter<File>, IoError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}
