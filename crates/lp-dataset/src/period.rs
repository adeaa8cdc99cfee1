//! Period selection: isolate each user's first position within a window.
//!
//! Users qualify when they open a position inside the [`PeriodWindow`].
//! Their output slice runs from that open to the first subsequent close,
//! searched over their complete log rather than just the window.

use crate::error::DatasetError;
use crate::timeline::first_close_after;
use lp_types::{parse_date_ts, ActionRecord};
use std::collections::BTreeMap;

/// Inclusive window for candidate `position_open` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindow {
    /// Window start (seconds since epoch, inclusive).
    pub start_ts: i64,

    /// Window end (seconds since epoch, inclusive).
    pub end_ts: i64,
}

impl PeriodWindow {
    /// Create a window from timestamps.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTimeRange` if `start_ts > end_ts`.
    pub fn new(start_ts: i64, end_ts: i64) -> Result<Self, DatasetError> {
        if start_ts > end_ts {
            return Err(DatasetError::InvalidTimeRange(format!(
                "window start {} is after end {}",
                start_ts, end_ts
            )));
        }
        Ok(Self { start_ts, end_ts })
    }

    /// Create a window from date strings (`YYYY-MM-DD` or datetimes, UTC).
    ///
    /// # Example
    ///
    /// ```rust
    /// use lp_dataset::PeriodWindow;
    ///
    /// let window = PeriodWindow::from_dates("2024-01-01", "2024-02-01").unwrap();
    /// assert!(window.contains(1704067200));
    /// ```
    pub fn from_dates(start: &str, end: &str) -> Result<Self, DatasetError> {
        Self::new(parse_date_ts(start)?, parse_date_ts(end)?)
    }

    /// Check if a timestamp falls inside the window.
    pub fn contains(&self, ts: i64) -> bool {
        ts >= self.start_ts && ts <= self.end_ts
    }
}

/// Select the actions of each user's first in-window position.
///
/// For every user with a `position_open` inside `window` (the earliest one
/// if there are several):
/// - with a later `position_close`: actions in `[open, close]`
/// - without one: actions from the open onwards, capped at `truncation_ts`
///   when given
///
/// The result is sorted by `(user_address, timestamp)`. Actions sharing a
/// timestamp keep their input order, and duplicates are kept.
pub fn select_period(
    actions: &[ActionRecord],
    window: &PeriodWindow,
    truncation_ts: Option<i64>,
) -> Vec<ActionRecord> {
    let mut opens: BTreeMap<&str, i64> = BTreeMap::new();
    for action in actions
        .iter()
        .filter(|a| a.is_open() && window.contains(a.timestamp))
    {
        opens
            .entry(action.user_address.as_str())
            .and_modify(|ts| *ts = (*ts).min(action.timestamp))
            .or_insert(action.timestamp);
    }

    let mut by_user: BTreeMap<&str, Vec<&ActionRecord>> = BTreeMap::new();
    for action in actions {
        if opens.contains_key(action.user_address.as_str()) {
            by_user
                .entry(action.user_address.as_str())
                .or_default()
                .push(action);
        }
    }

    let mut selected = Vec::new();
    for (user, open_ts) in opens {
        let Some(user_actions) = by_user.get(user) else {
            continue;
        };

        let close_ts = first_close_after(user_actions.iter().copied(), open_ts);
        let upper = close_ts.or(truncation_ts);

        let mut slice: Vec<ActionRecord> = user_actions
            .iter()
            .filter(|a| a.timestamp >= open_ts && upper.map_or(true, |u| a.timestamp <= u))
            .map(|a| (*a).clone())
            .collect();
        slice.sort_by_key(|a| a.timestamp);

        tracing::debug!(
            "Selected {} actions for {} (open {}, close {:?})",
            slice.len(),
            user,
            open_ts,
            close_ts
        );
        selected.extend(slice);
    }

    selected
}
