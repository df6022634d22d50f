//! Shared type definitions for the account autopilot.
//!
//! This crate is the single source of truth for the records that cross the
//! session boundary: inbound server notifications (already decoded by the
//! transport), outbound commands, and the character/quest structures both
//! carry.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe wrappers for every game identifier
//! - [`enums`] -- Enumeration types (breed stats, sex, creation results, directions)
//! - [`structs`] -- Character, quest, map, and stat records
//! - [`notifications`] -- Inbound [`Notification`] payloads and their [`NotificationKind`] tags
//! - [`commands`] -- Outbound fire-and-forget [`Command`] records

pub mod commands;
pub mod enums;
pub mod ids;
pub mod notifications;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use commands::Command;
pub use enums::{BoostableStat, CreationResult, MapDirection, Sex};
pub use ids::{
    BreedId, CellId, CharacterId, CosmeticId, ItemGid, MapId, NpcId, ObjectiveId, QuestId,
    SessionId, SpellId, StepId,
};
pub use notifications::{Notification, NotificationKind};
pub use structs::{
    CharacterSummary, EntityPosition, MapInfo, MapNpc, QuestObjective, QuestStep, SpellLevel,
    StatsSnapshot,
};
