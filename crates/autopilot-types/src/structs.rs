//! Record types carried inside notifications and used by the live
//! character state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{BoostableStat, Sex};
use crate::ids::{
    BreedId, CellId, CharacterId, MapId, NpcId, ObjectiveId, QuestId, SpellId, StepId,
};

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// One entry of the account's character roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSummary {
    /// Server identifier of the character.
    pub id: CharacterId,
    /// Display name.
    pub name: String,
    /// Overall character level.
    pub level: u32,
    /// Breed (class) of the character.
    pub breed: BreedId,
    /// Sex of the character.
    pub sex: Sex,
}

// ---------------------------------------------------------------------------
// Progression
// ---------------------------------------------------------------------------

/// Authoritative progression budget and base characteristics.
///
/// Only ever replaced wholesale by a stats acknowledgement; the engine never
/// decrements these values speculatively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Unspent stat points.
    pub stats_points: u32,
    /// Unspent spell points.
    pub spells_points: u32,
    /// Base value of each boostable stat. Missing entries read as zero.
    #[serde(default)]
    pub bases: BTreeMap<BoostableStat, u32>,
}

impl StatsSnapshot {
    /// Base value of `stat`, zero when the server did not report it.
    pub fn base(&self, stat: BoostableStat) -> u32 {
        self.bases.get(&stat).copied().unwrap_or(0)
    }
}

/// A known spell and its current level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellLevel {
    /// Spell identifier.
    pub spell_id: SpellId,
    /// Current level, `0` when learnt but never upgraded.
    pub level: u8,
}

// ---------------------------------------------------------------------------
// Quests
// ---------------------------------------------------------------------------

/// One objective of a quest step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestObjective {
    /// Objective identifier.
    pub objective_id: ObjectiveId,
    /// Whether the objective still needs validation.
    pub open: bool,
}

/// Current step of an active quest, as delivered by the step-info notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestStep {
    /// Quest this step belongs to.
    pub quest_id: QuestId,
    /// Identity of the step. Re-delivery of the same identity is a duplicate.
    pub step_id: StepId,
    /// Objectives of the step.
    #[serde(default)]
    pub objectives: Vec<QuestObjective>,
}

impl QuestStep {
    /// Iterate over the objectives that are still open.
    pub fn open_objectives(&self) -> impl Iterator<Item = ObjectiveId> + '_ {
        self.objectives
            .iter()
            .filter(|o| o.open)
            .map(|o| o.objective_id)
    }
}

// ---------------------------------------------------------------------------
// Maps
// ---------------------------------------------------------------------------

/// Position of an actor on the current map or fight grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityPosition {
    /// Actor identifier. Characters and monsters share the id space.
    pub entity_id: CharacterId,
    /// Cell the actor stands on.
    pub cell: CellId,
}

/// An NPC placed on the current map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapNpc {
    /// Contextual NPC identifier.
    pub id: NpcId,
    /// Generic actions the NPC offers, in display order.
    #[serde(default)]
    pub actions: Vec<u32>,
}

/// Snapshot of a map delivered when the character enters it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapInfo {
    /// Map identifier.
    pub map_id: MapId,
    /// Characters on the map with their cells.
    #[serde(default)]
    pub actors: Vec<EntityPosition>,
    /// Cells occupied by monster groups.
    #[serde(default)]
    pub monster_groups: Vec<CellId>,
    /// NPCs on the map.
    #[serde(default)]
    pub npcs: Vec<MapNpc>,
}
