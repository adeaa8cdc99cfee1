//! Event chains: each user's action labels in time order, with filtering
//! for behavioural clustering.

use lp_types::{ActionRecord, EventChain, CHAIN_SEPARATOR};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default upper bound (exclusive) on chain length.
pub const DEFAULT_LEN_LIM: usize = 10;

/// Filter applied by [`leave_valid_chains`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainFilter {
    /// Required chain prefix.
    pub prefix: String,

    /// Chains must have fewer than this many events.
    pub len_lim: usize,

    /// Truncate kept chains to their first `k` labels.
    pub leave_first_k: Option<usize>,

    /// Label (or label fragment) the chain must contain.
    pub contains_event: Option<String>,
}

impl Default for ChainFilter {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            len_lim: DEFAULT_LEN_LIM,
            leave_first_k: None,
            contains_event: None,
        }
    }
}

impl ChainFilter {
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_len_lim(mut self, len_lim: usize) -> Self {
        self.len_lim = len_lim;
        self
    }

    pub fn with_first_k(mut self, k: usize) -> Self {
        self.leave_first_k = Some(k);
        self
    }

    pub fn with_contains(mut self, event: impl Into<String>) -> Self {
        self.contains_event = Some(event.into());
        self
    }

    /// Check if a chain passes the prefix, length and content filters.
    pub fn matches(&self, chain: &EventChain) -> bool {
        chain.event_chain.starts_with(&self.prefix)
            && chain.total_events < self.len_lim
            && self
                .contains_event
                .as_deref()
                .map_or(true, |event| chain.event_chain.contains(event))
    }
}

/// Build one chain per user, ordered by user address.
///
/// Actions sharing a timestamp keep their input order.
pub fn build_event_chains(actions: &[ActionRecord]) -> Vec<EventChain> {
    let mut by_user: BTreeMap<&str, Vec<&ActionRecord>> = BTreeMap::new();
    for action in actions {
        by_user
            .entry(action.user_address.as_str())
            .or_default()
            .push(action);
    }

    by_user
        .into_iter()
        .map(|(user, mut user_actions)| {
            user_actions.sort_by_key(|a| a.timestamp);
            EventChain::from_labels(
                user,
                user_actions.iter().map(|a| a.event_sequence_type.label()),
            )
        })
        .collect()
}

/// Keep the chains accepted by `filter`, truncating them if requested.
///
/// `total_events` always reports the length of the full chain.
pub fn leave_valid_chains(chains: &[EventChain], filter: &ChainFilter) -> Vec<EventChain> {
    chains
        .iter()
        .filter(|chain| filter.matches(chain))
        .map(|chain| match filter.leave_first_k {
            Some(k) => EventChain {
                user_address: chain.user_address.clone(),
                event_chain: chain.labels().take(k).collect::<Vec<_>>().join(CHAIN_SEPARATOR),
                total_events: chain.total_events,
            },
            None => chain.clone(),
        })
        .collect()
}
