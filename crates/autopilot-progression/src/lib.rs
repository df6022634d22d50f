//! Progression allocator.
//!
//! Pure functions that decide how many stat or spell points to spend. They
//! never touch the session: the caller passes the authoritative budget from
//! the latest acknowledgement and sends the resulting command itself.
//!
//! # Modules
//!
//! - [`table`] -- [`CostTable`] and tier lookup
//! - [`stats`] -- Single-shot and maximize planning for stat points
//! - [`spells`] -- Spell leveling with the final-level requirement
//! - [`error`] -- [`ProgressionError`]

pub mod error;
pub mod spells;
pub mod stats;
pub mod table;

pub use error::ProgressionError;
pub use spells::{
    FINAL_LEVEL_OFFSET, MAX_SPELL_LEVEL, SpellSpend, SpellUpgradeRequest, effective_spell_cap,
    plan_spell_upgrade,
};
pub use stats::{StatSpend, can_afford, plan_stat_boost};
pub use table::{CostTable, CostTier, TierLookup};
