//! Event chains: a user's action labels in time order.

use serde::{Deserialize, Serialize};

/// Separator between labels in an [`EventChain`].
pub const CHAIN_SEPARATOR: &str = "→";

/// A user's ordered sequence of action labels, used for clustering users
/// by behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventChain {
    /// The user's address (hex string).
    pub user_address: String,

    /// Labels joined with [`CHAIN_SEPARATOR`].
    pub event_chain: String,

    /// Number of actions in the user's log.
    pub total_events: usize,
}

impl EventChain {
    /// Build a chain from labels in time order.
    pub fn from_labels<'a>(
        user_address: impl Into<String>,
        labels: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let labels: Vec<&str> = labels.into_iter().collect();
        Self {
            user_address: user_address.into(),
            total_events: labels.len(),
            event_chain: labels.join(CHAIN_SEPARATOR),
        }
    }

    /// Iterate over the labels of this chain.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.event_chain
            .split(CHAIN_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
