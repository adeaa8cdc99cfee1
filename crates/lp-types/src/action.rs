//! Action log records.
//!
//! This module provides [`ActionRecord`], one row of a user's action log.
//! Each record carries the account state immediately *after* the action,
//! so reconstruction never has to accumulate deltas.

use crate::EventType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single action taken by a user in a lending market.
///
/// # Fields
///
/// - `user_address`: Groups records into per-user logs
/// - `timestamp`: Seconds since Unix epoch, not unique per user
/// - `event_sequence_type`: Action label
/// - `collateral_after`: Collateral balance following this action
/// - `debt_after`: Debt balance following this action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The user's address (hex string).
    pub user_address: String,

    /// Timestamp of the action (seconds since Unix epoch).
    pub timestamp: i64,

    /// Action label.
    pub event_sequence_type: EventType,

    /// Collateral balance immediately after this action.
    pub collateral_after: Decimal,

    /// Debt balance immediately after this action.
    pub debt_after: Decimal,
}

impl ActionRecord {
    /// Create a new action record.
    pub fn new(
        user_address: impl Into<String>,
        timestamp: i64,
        event_sequence_type: EventType,
        collateral_after: Decimal,
        debt_after: Decimal,
    ) -> Self {
        Self {
            user_address: user_address.into(),
            timestamp,
            event_sequence_type,
            collateral_after,
            debt_after,
        }
    }

    /// Returns true if this action opens a position.
    pub fn is_open(&self) -> bool {
        self.event_sequence_type == EventType::PositionOpen
    }

    /// Returns true if this action closes a position.
    pub fn is_close(&self) -> bool {
        self.event_sequence_type == EventType::PositionClose
    }
}
