//! Market series with last-observation-carried-forward lookup.

use lp_types::MarketSnapshot;

/// A market series sorted by timestamp.
///
/// Each snapshot is valid until the next one, so the snapshot in effect at
/// time `t` is the rightmost one with `timestamp <= t`.
#[derive(Debug, Clone, Default)]
pub struct MarketSeries {
    snapshots: Vec<MarketSnapshot>,
}

impl MarketSeries {
    /// Create a series, sorting snapshots by timestamp.
    ///
    /// The sort is stable: for equal timestamps the last snapshot in input
    /// order is the one returned by [`MarketSeries::at`].
    pub fn new(mut snapshots: Vec<MarketSnapshot>) -> Self {
        if !snapshots.windows(2).all(|w| w[0].timestamp <= w[1].timestamp) {
            tracing::warn!(
                "Market series with {} rows is not sorted by timestamp, sorting",
                snapshots.len()
            );
            snapshots.sort_by_key(|s| s.timestamp);
        }
        Self { snapshots }
    }

    /// Snapshot in effect at `t`, or `None` if `t` precedes every observation.
    pub fn at(&self, t: i64) -> Option<&MarketSnapshot> {
        let idx = self.snapshots.partition_point(|s| s.timestamp <= t);
        idx.checked_sub(1).map(|i| &self.snapshots[i])
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Check if the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl From<Vec<MarketSnapshot>> for MarketSeries {
    fn from(snapshots: Vec<MarketSnapshot>) -> Self {
        Self::new(snapshots)
    }
}
