//! Action labels for lending protocol event logs.
//!
//! This module provides the [`EventType`] enum carried by every action in a
//! user's log. Only two labels have lifecycle meaning for reconstruction:
//! [`EventType::PositionOpen`] and [`EventType::PositionClose`]. The rest are
//! intermediate actions that simply carry a state snapshot.
//!
//! # Example
//!
//! ```rust
//! use lp_types::EventType;
//!
//! let open = EventType::from_label("position_open");
//! assert_eq!(open, EventType::PositionOpen);
//! assert_eq!(EventType::from_label("Position_Open"), EventType::Other("Position_Open".to_string()));
//!
//! let custom = EventType::from_label("flash_loan");
//! assert_eq!(custom, EventType::Other("flash_loan".to_string()));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label of a single action in a user's event log.
///
/// Known labels have dedicated variants. Unknown labels are kept verbatim
/// in [`EventType::Other`] so they survive a read/write cycle unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum EventType {
    /// First action of a position.
    PositionOpen,
    /// Action that brings the position back to zero.
    PositionClose,

    // Intermediate actions
    Supply,
    SupplyCollateral,
    Withdraw,
    WithdrawCollateral,
    Borrow,
    Repay,
    Liquidation,

    /// Any other label produced by the upstream collector.
    Other(String),
}

impl EventType {
    /// Create an EventType from its label.
    ///
    /// Known labels match exactly, ignoring surrounding whitespace.
    /// Anything else, including a known label in another casing, becomes
    /// [`EventType::Other`] with the string kept verbatim.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "position_open" => EventType::PositionOpen,
            "position_close" => EventType::PositionClose,
            "supply" => EventType::Supply,
            "supply_collateral" => EventType::SupplyCollateral,
            "withdraw" => EventType::Withdraw,
            "withdraw_collateral" => EventType::WithdrawCollateral,
            "borrow" => EventType::Borrow,
            "repay" => EventType::Repay,
            "liquidation" => EventType::Liquidation,
            _ => EventType::Other(label.to_string()),
        }
    }

    /// Get the canonical label for this event type.
    pub fn label(&self) -> &str {
        match self {
            EventType::PositionOpen => "position_open",
            EventType::PositionClose => "position_close",
            EventType::Supply => "supply",
            EventType::SupplyCollateral => "supply_collateral",
            EventType::Withdraw => "withdraw",
            EventType::WithdrawCollateral => "withdraw_collateral",
            EventType::Borrow => "borrow",
            EventType::Repay => "repay",
            EventType::Liquidation => "liquidation",
            EventType::Other(s) => s,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl From<&str> for EventType {
    fn from(s: &str) -> Self {
        EventType::from_label(s)
    }
}

impl From<String> for EventType {
    fn from(s: String) -> Self {
        EventType::from_label(&s)
    }
}

impl From<EventType> for String {
    fn from(event: EventType) -> Self {
        event.label().to_string()
    }
}
