//! Inbound server notifications.
//!
//! The transport decodes wire messages into [`Notification`] values before
//! they reach a session. Each variant has a matching [`NotificationKind`]
//! tag, which is the subscription key on the event bus.

use autopilot_events::Tagged;
use serde::{Deserialize, Serialize};

use crate::enums::CreationResult;
use crate::ids::{CellId, CharacterId, ItemGid, QuestId, SpellId, StepId};
use crate::structs::{
    CharacterSummary, EntityPosition, MapInfo, QuestStep, SpellLevel, StatsSnapshot,
};

/// A decoded, server-originated notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    // --- Roster and creation ---
    /// The account's character roster. Re-delivered after every creation.
    CharactersList {
        /// Characters on the account, in server order.
        characters: Vec<CharacterSummary>,
    },
    /// Reply to a name suggestion request.
    NameSuggestion {
        /// Suggested character name.
        suggestion: String,
    },
    /// Reply to a character creation request.
    CreationResult {
        /// Server verdict.
        result: CreationResult,
    },
    /// A character was selected and entered the game.
    CharacterSelected {
        /// The selected character.
        character: CharacterSummary,
    },

    // --- Progression ---
    /// Authoritative stats and point budgets.
    StatsUpdated {
        /// Full stats snapshot.
        stats: StatsSnapshot,
    },
    /// The character gained one or more levels.
    LevelUp {
        /// Level after the gain.
        new_level: u32,
    },
    /// Full list of known spells.
    SpellList {
        /// Spells and their levels.
        spells: Vec<SpellLevel>,
    },
    /// A spell upgrade was accepted.
    SpellUpgraded {
        /// Spell and its new level.
        spell: SpellLevel,
    },

    // --- World ---
    /// The character entered a map.
    MapChanged {
        /// Snapshot of the new map.
        map: MapInfo,
    },
    /// An actor finished a movement on the current map or fight grid.
    MapMovement {
        /// Actor that moved.
        actor_id: CharacterId,
        /// Cell the actor arrived on.
        destination: CellId,
    },
    /// A fight is starting; the placement phase follows.
    FightStarting,
    /// Placement cells offered to the character's team.
    FightPlacementPositions {
        /// Cells available to the challenger team.
        challenger_cells: Vec<CellId>,
        /// Cell the character currently occupies, if placed.
        own_cell: Option<CellId>,
    },
    /// Positions of fighters after a placement change.
    EntitiesDisposition {
        /// Every fighter and its cell.
        positions: Vec<EntityPosition>,
    },
    /// A fighter cast a spell.
    SpellCast {
        /// Caster.
        source_id: CharacterId,
        /// Spell that was cast.
        spell_id: SpellId,
    },
    /// An NPC asked a question.
    NpcQuestion {
        /// Reply identifiers currently visible, in display order.
        visible_replies: Vec<u32>,
    },
    /// An item was moved onto an equipment slot.
    ObjectEquipped {
        /// Generic id of the equipped item.
        gid: ItemGid,
    },

    // --- Quests ---
    /// A quest was started.
    QuestStarted {
        /// Started quest.
        quest_id: QuestId,
    },
    /// Current step of an active quest.
    QuestStepInfo {
        /// Step and its objectives.
        step: QuestStep,
    },
    /// A quest step was completed.
    QuestStepValidated {
        /// Quest the step belongs to.
        quest_id: QuestId,
        /// Completed step.
        step_id: StepId,
    },
    /// A quest was completed.
    QuestValidated {
        /// Completed quest.
        quest_id: QuestId,
    },
}

/// Subscription tag of a [`Notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    /// [`Notification::CharactersList`].
    CharactersList,
    /// [`Notification::NameSuggestion`].
    NameSuggestion,
    /// [`Notification::CreationResult`].
    CreationResult,
    /// [`Notification::CharacterSelected`].
    CharacterSelected,
    /// [`Notification::StatsUpdated`].
    StatsUpdated,
    /// [`Notification::LevelUp`].
    LevelUp,
    /// [`Notification::SpellList`].
    SpellList,
    /// [`Notification::SpellUpgraded`].
    SpellUpgraded,
    /// [`Notification::MapChanged`].
    MapChanged,
    /// [`Notification::MapMovement`].
    MapMovement,
    /// [`Notification::FightStarting`].
    FightStarting,
    /// [`Notification::FightPlacementPositions`].
    FightPlacementPositions,
    /// [`Notification::EntitiesDisposition`].
    EntitiesDisposition,
    /// [`Notification::SpellCast`].
    SpellCast,
    /// [`Notification::NpcQuestion`].
    NpcQuestion,
    /// [`Notification::ObjectEquipped`].
    ObjectEquipped,
    /// [`Notification::QuestStarted`].
    QuestStarted,
    /// [`Notification::QuestStepInfo`].
    QuestStepInfo,
    /// [`Notification::QuestStepValidated`].
    QuestStepValidated,
    /// [`Notification::QuestValidated`].
    QuestValidated,
}

impl Notification {
    /// Subscription tag of this notification.
    pub const fn kind(&self) -> NotificationKind {
        match self {
            Self::CharactersList { .. } => NotificationKind::CharactersList,
            Self::NameSuggestion { .. } => NotificationKind::NameSuggestion,
            Self::CreationResult { .. } => NotificationKind::CreationResult,
            Self::CharacterSelected { .. } => NotificationKind::CharacterSelected,
            Self::StatsUpdated { .. } => NotificationKind::StatsUpdated,
            Self::LevelUp { .. } => NotificationKind::LevelUp,
            Self::SpellList { .. } => NotificationKind::SpellList,
            Self::SpellUpgraded { .. } => NotificationKind::SpellUpgraded,
            Self::MapChanged { .. } => NotificationKind::MapChanged,
            Self::MapMovement { .. } => NotificationKind::MapMovement,
            Self::FightStarting => NotificationKind::FightStarting,
            Self::FightPlacementPositions { .. } => NotificationKind::FightPlacementPositions,
            Self::EntitiesDisposition { .. } => NotificationKind::EntitiesDisposition,
            Self::SpellCast { .. } => NotificationKind::SpellCast,
            Self::NpcQuestion { .. } => NotificationKind::NpcQuestion,
            Self::ObjectEquipped { .. } => NotificationKind::ObjectEquipped,
            Self::QuestStarted { .. } => NotificationKind::QuestStarted,
            Self::QuestStepInfo { .. } => NotificationKind::QuestStepInfo,
            Self::QuestStepValidated { .. } => NotificationKind::QuestStepValidated,
            Self::QuestValidated { .. } => NotificationKind::QuestValidated,
        }
    }
}

impl Tagged for Notification {
    type Tag = NotificationKind;

    fn tag(&self) -> NotificationKind {
        self.kind()
    }
}
