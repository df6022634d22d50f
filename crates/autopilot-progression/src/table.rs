//! Cost tables.

use serde::{Deserialize, Serialize};

use crate::error::ProgressionError;

/// One point of the cost curve: from `threshold` upwards, each increment
/// costs `cost` points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostTier {
    /// Base value at which this tier starts.
    pub threshold: u32,
    /// Marginal cost of one increment inside this tier.
    pub cost: u32,
}

/// How the active tier is located for a base value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierLookup {
    /// Greatest threshold not above the base value.
    #[default]
    LastMatch,
    /// First threshold not above the base value, scanning ascending. On an
    /// ascending table this is always the lowest tier; kept for
    /// compatibility with data tuned against that behavior.
    FirstMatch,
}

/// Validated cost curve, ascending by threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostTable {
    tiers: Vec<CostTier>,
}

impl CostTable {
    /// Build a table, rejecting empty, unordered, or free tiers.
    pub fn new(tiers: Vec<CostTier>) -> Result<Self, ProgressionError> {
        if tiers.is_empty() {
            return Err(ProgressionError::EmptyTable);
        }
        for pair in tiers.windows(2) {
            if let [previous, next] = pair {
                if next.threshold <= previous.threshold {
                    return Err(ProgressionError::UnorderedTable {
                        previous: previous.threshold,
                        next: next.threshold,
                    });
                }
            }
        }
        if let Some(free) = tiers.iter().find(|t| t.cost == 0) {
            return Err(ProgressionError::ZeroCost {
                threshold: free.threshold,
            });
        }
        Ok(Self { tiers })
    }

    /// Build a table from `[threshold, cost]` pairs as found in breed data.
    pub fn from_pairs(pairs: &[[u32; 2]]) -> Result<Self, ProgressionError> {
        Self::new(
            pairs
                .iter()
                .map(|&[threshold, cost]| CostTier { threshold, cost })
                .collect(),
        )
    }

    /// Tiers in ascending order.
    pub fn tiers(&self) -> &[CostTier] {
        &self.tiers
    }

    /// Tier governing the next increment at `base`, if any.
    pub fn active_tier(&self, base: u32, lookup: TierLookup) -> Option<&CostTier> {
        match lookup {
            TierLookup::LastMatch => self.tiers.iter().rev().find(|t| base >= t.threshold),
            TierLookup::FirstMatch => self.tiers.iter().find(|t| base >= t.threshold),
        }
    }

    /// Marginal cost of the next increment at `base`, if any tier applies.
    pub fn active_cost(&self, base: u32, lookup: TierLookup) -> Option<u32> {
        self.active_tier(base, lookup).map(|t| t.cost)
    }
}
