//! Error types for cost table construction.

/// A cost table that cannot be used for allocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressionError {
    /// The table has no tiers.
    #[error("cost table is empty")]
    EmptyTable,

    /// Thresholds are not strictly ascending.
    #[error("cost table thresholds must be strictly ascending (found {previous} then {next})")]
    UnorderedTable {
        /// Threshold of the earlier tier.
        previous: u32,
        /// Threshold of the offending tier.
        next: u32,
    },

    /// A tier costs nothing, which would allow unbounded spending.
    #[error("cost tier at threshold {threshold} has zero cost")]
    ZeroCost {
        /// Threshold of the offending tier.
        threshold: u32,
    },
}
