//! Outbound commands.
//!
//! Commands are fire-and-forget: the server never replies to a specific
//! request. Outcomes are observed later as [`Notification`](crate::Notification)s
//! and matched back by predicate.

use serde::{Deserialize, Serialize};

use crate::enums::{BoostableStat, MapDirection, Sex};
use crate::ids::{
    BreedId, CellId, CharacterId, CosmeticId, ItemGid, MapId, NpcId, ObjectiveId, QuestId, SpellId,
};

/// A client-originated command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    // --- Roster and creation ---
    /// Select a character for its first login.
    CharacterFirstSelection {
        /// Character to select.
        character_id: CharacterId,
        /// Whether the server should start the onboarding quest.
        do_tutorial: bool,
    },
    /// Ask the server for a random available name.
    CharacterNameSuggestionRequest,
    /// Create a character.
    CharacterCreation {
        /// Character name.
        name: String,
        /// Breed (class).
        breed: BreedId,
        /// Sex.
        sex: Sex,
        /// Five indexed colors.
        colors: Vec<i32>,
        /// Head cosmetic.
        cosmetic_id: CosmeticId,
    },

    // --- Quests ---
    /// Ask for the current step of a quest.
    QuestStepInfoRequest {
        /// Quest to inspect.
        quest_id: QuestId,
    },
    /// Validate one objective of the current step.
    QuestObjectiveValidation {
        /// Quest the objective belongs to.
        quest_id: QuestId,
        /// Objective to validate.
        objective_id: ObjectiveId,
    },

    // --- World ---
    /// Walk to a cell of the current map, or of the fight grid while fighting.
    MoveToCell {
        /// Destination cell.
        cell: CellId,
    },
    /// Trigger a generic action on an NPC.
    NpcGenericAction {
        /// Contextual NPC id.
        npc_id: NpcId,
        /// Action offered by the NPC.
        action_id: u32,
        /// Map the NPC stands on.
        map_id: MapId,
    },
    /// Answer an NPC question.
    NpcReply {
        /// Chosen reply.
        reply_id: u32,
    },
    /// Equip an inventory item.
    EquipItem {
        /// Generic id of the item.
        gid: ItemGid,
    },
    /// Leave the current map through one of its edges.
    ChangeMap {
        /// Edge to cross.
        direction: MapDirection,
    },

    // --- Fights ---
    /// Move to a placement cell during the fight placement phase.
    FightPlacementPosition {
        /// Placement cell.
        cell: CellId,
    },
    /// Mark the character ready to start the fight.
    FightReady,

    // --- Progression ---
    /// Spend stat points on one characteristic.
    StatsUpgrade {
        /// Characteristic to raise.
        stat: BoostableStat,
        /// Stat points to spend.
        boost_points: u32,
    },
    /// Raise a spell to a target level.
    SpellUpgrade {
        /// Spell to raise.
        spell_id: SpellId,
        /// Level after the upgrade.
        spell_level: u8,
    },
}

impl Command {
    /// Stable snake-case name, used for logging and transport subjects.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CharacterFirstSelection { .. } => "character_first_selection",
            Self::CharacterNameSuggestionRequest => "character_name_suggestion_request",
            Self::CharacterCreation { .. } => "character_creation",
            Self::QuestStepInfoRequest { .. } => "quest_step_info_request",
            Self::QuestObjectiveValidation { .. } => "quest_objective_validation",
            Self::MoveToCell { .. } => "move_to_cell",
            Self::NpcGenericAction { .. } => "npc_generic_action",
            Self::NpcReply { .. } => "npc_reply",
            Self::EquipItem { .. } => "equip_item",
            Self::ChangeMap { .. } => "change_map",
            Self::FightPlacementPosition { .. } => "fight_placement_position",
            Self::FightReady => "fight_ready",
            Self::StatsUpgrade { .. } => "stats_upgrade",
            Self::SpellUpgrade { .. } => "spell_upgrade",
        }
    }
}
