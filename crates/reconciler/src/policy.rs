//! Key derivation strategies used to index workloads.
//!
//! Registrations and pods are not always named the same way: a pod `web-1`
//! may be registered as `web-1-web`. A [`MatchPolicy`] lists the strategies
//! tried, in order, when indexing a pod.

use octopus_core::{IdentityKey, WorkloadRecord};
use serde::{Deserialize, Serialize};

/// One way of deriving an identity key from a workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStrategy {
    /// `(node, workload_id, address)`.
    Natural,
    /// `(node, workload_id + "-" + prefix, address)`.
    PrefixSuffixed,
}

impl KeyStrategy {
    /// Derive the key for `workload` under this strategy.
    pub fn key_for(self, workload: &WorkloadRecord, prefix: &str) -> IdentityKey {
        match self {
            Self::Natural => workload.identity_key(),
            Self::PrefixSuffixed => IdentityKey::new(
                &workload.node,
                format!("{}-{prefix}", workload.workload_id),
                &workload.workload_address,
            ),
        }
    }
}

/// Ordered list of key strategies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPolicy {
    strategies: Vec<KeyStrategy>,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self::new(vec![KeyStrategy::Natural, KeyStrategy::PrefixSuffixed])
    }
}

impl MatchPolicy {
    /// Create a policy from strategies, dropping repeats but keeping order.
    pub fn new(strategies: Vec<KeyStrategy>) -> Self {
        let mut unique = Vec::with_capacity(strategies.len());
        for strategy in strategies {
            if !unique.contains(&strategy) {
                unique.push(strategy);
            }
        }
        Self { strategies: unique }
    }

    /// Only the natural key.
    pub fn natural_only() -> Self {
        Self::new(vec![KeyStrategy::Natural])
    }

    /// Append a strategy to the end of the list.
    #[must_use]
    pub fn with_strategy(self, strategy: KeyStrategy) -> Self {
        let mut strategies = self.strategies;
        strategies.push(strategy);
        Self::new(strategies)
    }

    pub fn strategies(&self) -> &[KeyStrategy] {
        &self.strategies
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Every key of `workload`, in strategy order.
    pub fn keys_for<'a>(
        &'a self,
        workload: &'a WorkloadRecord,
        prefix: &'a str,
    ) -> impl Iterator<Item = IdentityKey> + 'a {
        self.strategies
            .iter()
            .map(move |strategy| strategy.key_for(workload, prefix))
    }
}
