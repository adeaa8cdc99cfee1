//! Per-user state reconstruction helpers.
//!
//! A [`UserTimeline`] is one user's normalized action log. It determines the
//! position [`Lifecycle`] and exposes the bounded slice of actions that a
//! [`StateCursor`] walks while the aligner moves along the [`grid`].

use crate::error::DatasetError;
use lp_types::ActionRecord;
use std::collections::BTreeMap;

/// Bounds of a reconstructed position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifecycle {
    /// Timestamp of the first `position_open`.
    pub open_ts: i64,

    /// Timestamp of the first `position_close` after the open, or the
    /// truncation timestamp when the position never closed.
    pub end_ts: i64,

    /// Whether `end_ts` is an actual close.
    pub closed: bool,
}

/// One user's action log, sorted by timestamp with duplicate timestamps
/// collapsed.
///
/// # Duplicate Timestamps
///
/// When several actions share a timestamp, the last one in input order
/// survives. Same-block transactions therefore report the state after the
/// final transaction of the block, and only its label.
#[derive(Debug, Clone)]
pub struct UserTimeline {
    user_address: String,
    actions: Vec<ActionRecord>,
}

impl UserTimeline {
    /// Normalize a user's actions.
    pub fn new(user_address: impl Into<String>, mut actions: Vec<ActionRecord>) -> Self {
        // Stable, so input order decides among equal timestamps.
        actions.sort_by_key(|a| a.timestamp);

        let mut deduped: Vec<ActionRecord> = Vec::with_capacity(actions.len());
        for action in actions {
            match deduped.last_mut() {
                Some(last) if last.timestamp == action.timestamp => *last = action,
                _ => deduped.push(action),
            }
        }

        Self {
            user_address: user_address.into(),
            actions: deduped,
        }
    }

    /// Split a multi-user action log into timelines, ordered by user address.
    ///
    /// # Errors
    ///
    /// Returns `MalformedAction` for a record with an empty user address.
    pub fn group(actions: &[ActionRecord]) -> Result<Vec<UserTimeline>, DatasetError> {
        let mut by_user: BTreeMap<&str, Vec<ActionRecord>> = BTreeMap::new();

        for (index, action) in actions.iter().enumerate() {
            if action.user_address.trim().is_empty() {
                return Err(DatasetError::MalformedAction {
                    index,
                    user: action.user_address.clone(),
                    reason: "empty user_address".to_string(),
                });
            }
            by_user
                .entry(action.user_address.as_str())
                .or_default()
                .push(action.clone());
        }

        Ok(by_user
            .into_iter()
            .map(|(user, actions)| UserTimeline::new(user, actions))
            .collect())
    }

    /// The user's address.
    pub fn user_address(&self) -> &str {
        &self.user_address
    }

    /// All normalized actions.
    pub fn actions(&self) -> &[ActionRecord] {
        &self.actions
    }

    /// Determine the position bounds.
    ///
    /// Uses the first `position_open` and the first `position_close`
    /// strictly after it. Without a close, the position runs until
    /// `truncation_ts`; without either, there is nothing to reconstruct.
    /// A truncation before the open also yields `None`.
    pub fn lifecycle(&self, truncation_ts: Option<i64>) -> Option<Lifecycle> {
        let open_ts = self.actions.iter().find(|a| a.is_open())?.timestamp;

        match first_close_after(&self.actions, open_ts) {
            Some(close_ts) => Some(Lifecycle {
                open_ts,
                end_ts: close_ts,
                closed: true,
            }),
            None => truncation_ts
                .filter(|end| *end >= open_ts)
                .map(|end_ts| Lifecycle {
                    open_ts,
                    end_ts,
                    closed: false,
                }),
        }
    }

    /// Actions with `open_ts <= timestamp <= end_ts`.
    pub fn bounded(&self, lifecycle: &Lifecycle) -> &[ActionRecord] {
        let start = self
            .actions
            .partition_point(|a| a.timestamp < lifecycle.open_ts);
        let end = self
            .actions
            .partition_point(|a| a.timestamp <= lifecycle.end_ts);
        &self.actions[start..end.max(start)]
    }
}

/// Timestamp of the first `position_close` strictly after `open_ts`.
///
/// Does not require sorted input.
pub fn first_close_after<'a>(
    actions: impl IntoIterator<Item = &'a ActionRecord>,
    open_ts: i64,
) -> Option<i64> {
    actions
        .into_iter()
        .filter(|a| a.is_close() && a.timestamp > open_ts)
        .map(|a| a.timestamp)
        .min()
}

/// Monotonic walk over a sorted action slice.
///
/// Each call to [`StateCursor::advance_to`] only moves forward, so walking a
/// whole grid costs O(grid + actions).
#[derive(Debug)]
pub struct StateCursor<'a> {
    actions: &'a [ActionRecord],
    next: usize,
    last_t: Option<i64>,
}

impl<'a> StateCursor<'a> {
    /// Create a cursor over actions sorted by timestamp.
    pub fn new(actions: &'a [ActionRecord]) -> Self {
        Self {
            actions,
            next: 0,
            last_t: None,
        }
    }

    /// Latest action with `timestamp <= t`.
    ///
    /// `t` must not decrease between calls.
    pub fn advance_to(&mut self, t: i64) -> Option<&'a ActionRecord> {
        debug_assert!(
            self.last_t.map_or(true, |prev| prev <= t),
            "StateCursor moved backwards"
        );
        self.last_t = Some(t);

        while self
            .actions
            .get(self.next)
            .is_some_and(|a| a.timestamp <= t)
        {
            self.next += 1;
        }

        self.next.checked_sub(1).map(|i| &self.actions[i])
    }
}

/// Fixed-step grid from `open_ts` up to `end_ts`.
///
/// Points are `open_ts + k * step_secs` for every value `<= end_ts`. When
/// `end_ts` is not on the grid, it is appended as a final, shorter step so
/// that the end of the position is always sampled.
///
/// Returns an empty grid when `end_ts < open_ts` or `step_secs <= 0`.
pub fn grid(open_ts: i64, end_ts: i64, step_secs: i64) -> Vec<i64> {
    if step_secs <= 0 || end_ts < open_ts {
        return Vec::new();
    }

    let mut points = Vec::new();
    let mut t = open_ts;
    while t <= end_ts {
        points.push(t);
        match t.checked_add(step_secs) {
            Some(next) => t = next,
            None => break,
        }
    }

    if points.last().is_some_and(|last| *last < end_ts) {
        points.push(end_ts);
    }
    points
}
