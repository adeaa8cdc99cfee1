//! Configuration for dataset construction.
//!
//! # Environment Variables
//!
//! - `LP_STEP_HOURS`: grid spacing in hours (default: 1)
//! - `LP_TRUNCATION_DATE`: cap for positions without a close (default: unset)
//! - `LP_PARALLEL`: "1"/"true" to reconstruct users on the rayon pool (default: off)

use crate::error::DatasetError;
use lp_types::{parse_date_ts, SECONDS_PER_HOUR};
use std::env;

/// Default grid spacing (one hour).
pub const DEFAULT_STEP_SECS: i64 = SECONDS_PER_HOUR;

/// Configuration for hourly alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetConfig {
    /// Grid spacing in seconds.
    pub step_secs: i64,

    /// End of the reconstruction for positions that never close.
    /// Such positions are skipped when this is `None`.
    pub truncation_ts: Option<i64>,

    /// Reconstruct users in parallel.
    pub parallel: bool,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            step_secs: DEFAULT_STEP_SECS,
            truncation_ts: None,
            parallel: false,
        }
    }
}

impl DatasetConfig {
    /// Load configuration from `LP_*` environment variables.
    ///
    /// Missing, unparsable or zero step values fall back to the default.
    /// A truncation date that cannot be parsed is an error, since silently
    /// dropping it would change which positions are reconstructed.
    pub fn from_env() -> Result<Self, DatasetError> {
        let mut config = Self::default();

        if let Some(hours) = env::var("LP_STEP_HOURS")
            .ok()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|h| *h > 0)
        {
            config = config.with_step_hours(hours);
        }

        if let Ok(date) = env::var("LP_TRUNCATION_DATE") {
            if !date.trim().is_empty() {
                config = config.with_truncation_date(&date)?;
            }
        }

        config.parallel = matches!(
            env::var("LP_PARALLEL")
                .map(|s| s.to_lowercase())
                .as_deref(),
            Ok("1") | Ok("true") | Ok("yes")
        );

        Ok(config)
    }

    /// Set the grid spacing in hours.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lp_dataset::DatasetConfig;
    ///
    /// let config = DatasetConfig::default().with_step_hours(4);
    /// assert_eq!(config.step_secs, 4 * 3600);
    /// ```
    pub fn with_step_hours(mut self, hours: u32) -> Self {
        self.step_secs = i64::from(hours) * SECONDS_PER_HOUR;
        self
    }

    /// Set the grid spacing in seconds.
    pub fn with_step_secs(mut self, secs: i64) -> Self {
        self.step_secs = secs;
        self
    }

    /// Set the truncation date (`YYYY-MM-DD` or a datetime).
    pub fn with_truncation_date(mut self, date: &str) -> Result<Self, DatasetError> {
        self.truncation_ts = Some(parse_date_ts(date)?);
        Ok(self)
    }

    /// Set the truncation timestamp directly.
    pub fn with_truncation_ts(mut self, ts: i64) -> Self {
        self.truncation_ts = Some(ts);
        self
    }

    /// Enable or disable parallel reconstruction.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check that the configuration can drive a reconstruction.
    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.step_secs <= 0 {
            return Err(DatasetError::InvalidConfig(format!(
                "step must be positive, got {} seconds",
                self.step_secs
            )));
        }
        Ok(())
    }
}
