//! The onboarding script as data.
//!
//! Each step number maps to an optional action, dispatched once the step
//! settles, and to the follow-up events that complete it. The table is pure
//! data so it can be inspected and tested without a running session.

use std::collections::BTreeMap;

use autopilot_types::{CellId, CharacterId, ItemGid, MapDirection, MapId, Notification};

use crate::config::{TimingConfig, TutorialConfig};

/// Something the character does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// Walk to a fixed cell.
    MoveToCell(CellId),
    /// Use an NPC action. Indexes are zero-based positions on the map.
    TalkToNpc {
        /// Position of the NPC in the map's NPC list.
        npc_index: usize,
        /// Position of the action in the NPC's action list.
        action_index: usize,
    },
    /// Equip an item.
    EquipItem(ItemGid),
    /// Cross a map edge.
    ChangeMap(MapDirection),
    /// Walk onto the first monster group to start a fight.
    StartFight,
    /// Move to a random free placement cell.
    PickPlacementCell,
    /// Equip the batch items one by one, starting with the first.
    EquipBatch,
}

/// An event that can complete or advance a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The character finished a movement.
    OwnMovement,
    /// A fight is starting.
    FightStarting,
    /// The character appears in a fighter disposition.
    PlacementConfirmed,
    /// The character cast a spell.
    OwnSpellCast,
    /// A specific item was equipped.
    Equipped(ItemGid),
    /// The batch item under the cursor was equipped.
    BatchItemEquipped,
    /// An NPC asked a question.
    NpcQuestion,
    /// The character entered a specific map.
    MapEntered(MapId),
}

/// Identity checks applied when matching a trigger.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerGuard {
    /// The selected character.
    pub own_id: Option<CharacterId>,
    /// The batch item currently expected.
    pub batch_item: Option<ItemGid>,
}

impl Trigger {
    /// Whether `event` fires this trigger.
    pub fn matches(self, event: &Notification, guard: &TriggerGuard) -> bool {
        let is_own = |id: CharacterId| guard.own_id == Some(id);
        match (self, event) {
            (Self::OwnMovement, Notification::MapMovement { actor_id, .. }) => is_own(*actor_id),
            (Self::FightStarting, Notification::FightStarting)
            | (Self::NpcQuestion, Notification::NpcQuestion { .. }) => true,
            (Self::PlacementConfirmed, Notification::EntitiesDisposition { positions }) => {
                positions.iter().any(|p| is_own(p.entity_id))
            }
            (Self::OwnSpellCast, Notification::SpellCast { source_id, .. }) => is_own(*source_id),
            (Self::Equipped(expected), Notification::ObjectEquipped { gid }) => *gid == expected,
            (Self::BatchItemEquipped, Notification::ObjectEquipped { gid }) => {
                guard.batch_item == Some(*gid)
            }
            (Self::MapEntered(expected), Notification::MapChanged { map }) => map.map_id == expected,
            _ => false,
        }
    }
}

/// An action performed after a delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedAction {
    /// Delay since the previous action of the sequence.
    pub delay_ms: u64,
    /// The action.
    pub action: StepAction,
}

/// What the engine does when a follow-up fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    /// Validate every open objective of the current step.
    ValidateObjectives,
    /// Validate, then signal ready for the fight after a delay.
    ValidateThenReady {
        /// Delay before the ready signal.
        delay_ms: u64,
    },
    /// Move the batch cursor; validate once the batch is exhausted.
    AdvanceBatch,
    /// Answer the NPC with its first visible reply.
    ReplyFirst,
    /// Run actions in sequence.
    Perform(Vec<TimedAction>),
}

impl Reaction {
    /// Whether a re-delivered trigger must not run the reaction again.
    /// Batch advances are keyed by the cursor and every NPC question gets
    /// its own reply, so those two may run repeatedly.
    pub const fn fires_once(&self) -> bool {
        !matches!(self, Self::AdvanceBatch | Self::ReplyFirst)
    }
}

/// A trigger and its reaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUp {
    /// Event that fires the reaction.
    pub trigger: Trigger,
    /// What to do.
    pub reaction: Reaction,
}

/// One step of the script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptStep {
    /// Dispatched once the step settles. `None` for server-driven steps.
    pub action: Option<StepAction>,
    /// Checked in order; the first match wins.
    pub follow_ups: Vec<FollowUp>,
}

impl ScriptStep {
    fn new(action: Option<StepAction>) -> Self {
        Self {
            action,
            follow_ups: Vec::new(),
        }
    }

    fn on(mut self, trigger: Trigger, reaction: Reaction) -> Self {
        self.follow_ups.push(FollowUp { trigger, reaction });
        self
    }

    /// Reaction to `event`, if it completes or advances this step.
    pub fn reaction_for(&self, event: &Notification, guard: &TriggerGuard) -> Option<&Reaction> {
        self.follow_up_for(event, guard).map(|(_, reaction)| reaction)
    }

    /// Like [`reaction_for`](Self::reaction_for), with the position of the
    /// matching follow-up inside the step.
    pub fn follow_up_for(
        &self,
        event: &Notification,
        guard: &TriggerGuard,
    ) -> Option<(usize, &Reaction)> {
        self.follow_ups
            .iter()
            .enumerate()
            .find(|(_, f)| f.trigger.matches(event, guard))
            .map(|(index, f)| (index, &f.reaction))
    }
}

/// The full onboarding script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorialScript {
    steps: BTreeMap<u32, ScriptStep>,
    batch_items: Vec<ItemGid>,
    batch_delay_ms: u64,
}

impl TutorialScript {
    /// The standard fourteen-step onboarding quest.
    pub fn standard(tutorial: &TutorialConfig, timing: &TimingConfig) -> Self {
        let first_npc = StepAction::TalkToNpc {
            npc_index: 0,
            action_index: 0,
        };
        let mut steps = BTreeMap::new();

        steps.insert(
            1,
            ScriptStep::new(Some(StepAction::MoveToCell(tutorial.first_cell)))
                .on(Trigger::OwnMovement, Reaction::ValidateObjectives),
        );
        steps.insert(
            2,
            ScriptStep::new(Some(first_npc.clone())).on(Trigger::NpcQuestion, Reaction::ReplyFirst),
        );
        steps.insert(
            3,
            ScriptStep::new(Some(StepAction::EquipItem(tutorial.first_equip_item))).on(
                Trigger::Equipped(tutorial.first_equip_item),
                Reaction::ValidateObjectives,
            ),
        );
        steps.insert(
            4,
            ScriptStep::new(Some(StepAction::ChangeMap(MapDirection::Right))),
        );
        steps.insert(
            5,
            ScriptStep::new(Some(StepAction::StartFight))
                .on(Trigger::FightStarting, Reaction::ValidateObjectives),
        );
        steps.insert(
            6,
            ScriptStep::new(Some(StepAction::PickPlacementCell)).on(
                Trigger::PlacementConfirmed,
                Reaction::ValidateThenReady {
                    delay_ms: timing.fight_ready_delay_ms,
                },
            ),
        );
        steps.insert(
            7,
            ScriptStep::new(None).on(Trigger::OwnMovement, Reaction::ValidateObjectives),
        );
        steps.insert(
            8,
            ScriptStep::new(None).on(Trigger::OwnSpellCast, Reaction::ValidateObjectives),
        );
        steps.insert(
            10,
            ScriptStep::new(None)
                .on(
                    Trigger::MapEntered(tutorial.map_second_after_fight),
                    Reaction::Perform(vec![TimedAction {
                        delay_ms: timing.npc_dialog_delay_ms,
                        action: first_npc.clone(),
                    }]),
                )
                .on(Trigger::NpcQuestion, Reaction::ReplyFirst),
        );
        steps.insert(
            11,
            ScriptStep::new(Some(StepAction::EquipBatch))
                .on(Trigger::BatchItemEquipped, Reaction::AdvanceBatch),
        );
        steps.insert(
            12,
            ScriptStep::new(Some(StepAction::ChangeMap(MapDirection::Right)))
                .on(
                    Trigger::MapEntered(tutorial.map_third_before_fight),
                    Reaction::Perform(vec![TimedAction {
                        delay_ms: 0,
                        action: StepAction::StartFight,
                    }]),
                )
                .on(Trigger::FightStarting, Reaction::ValidateObjectives),
        );
        steps.insert(
            14,
            ScriptStep::new(None)
                .on(
                    Trigger::MapEntered(tutorial.map_third_after_fight),
                    Reaction::Perform(vec![
                        TimedAction {
                            delay_ms: timing.hat_equip_delay_ms,
                            action: StepAction::EquipItem(tutorial.hat_item),
                        },
                        TimedAction {
                            delay_ms: timing.npc_after_hat_delay_ms,
                            action: first_npc,
                        },
                    ]),
                )
                .on(Trigger::NpcQuestion, Reaction::ReplyFirst),
        );

        Self {
            steps,
            batch_items: tutorial.batch_items.clone(),
            batch_delay_ms: timing.equip_batch_delay_ms,
        }
    }

    /// Definition of `step_number`, if the script has one.
    pub fn step(&self, step_number: u32) -> Option<&ScriptStep> {
        self.steps.get(&step_number)
    }

    /// Action dispatched when `step_number` settles.
    pub fn action(&self, step_number: u32) -> Option<&StepAction> {
        self.step(step_number).and_then(|s| s.action.as_ref())
    }

    /// Batch item at `cursor`.
    pub fn batch_item(&self, cursor: u32) -> Option<ItemGid> {
        usize::try_from(cursor)
            .ok()
            .and_then(|i| self.batch_items.get(i))
            .copied()
    }

    /// Number of batch items.
    pub fn batch_len(&self) -> usize {
        self.batch_items.len()
    }

    /// Delay between two batch items.
    pub const fn batch_delay_ms(&self) -> u64 {
        self.batch_delay_ms
    }
}
