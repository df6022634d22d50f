//! Onboarding quest automation.
//!
//! Every new step identity bumps the step number once, waits for the server
//! to settle, and dispatches the step's scripted action. Follow-up events
//! are matched against the current step only; anything else is dropped.
//! Continuations re-check the scope generation and the step number before
//! acting, so a stale timer never touches a newer step or a reset session.

use std::sync::Arc;
use std::time::Duration;

use autopilot_types::{CellId, Command, Notification};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, info, trace};

use crate::automation::{AutomationContext, AutomationState, Phase};
use crate::character::CharacterState;
use crate::error::AutomationError;
use crate::script::{Reaction, StepAction, TimedAction, TriggerGuard};
use crate::session::SessionCore;

const TARGET: &str = "autopilot::tutorial";

/// Pick a placement cell other than the one the character occupies.
pub fn pick_placement_cell(
    character: &CharacterState,
    rng: &mut impl Rng,
) -> Option<CellId> {
    character.free_placement_cells().choose(rng).copied()
}

impl SessionCore {
    pub(crate) fn on_quest_started(
        self: &Arc<Self>,
        notification: &Notification,
    ) -> Result<(), AutomationError> {
        let Notification::QuestStarted { quest_id } = notification else {
            return Ok(());
        };
        if *quest_id != self.settings.tutorial.quest_id {
            return Ok(());
        }
        if !self.preferences.creation().complete_tutorial {
            return Ok(());
        }

        let mut automation = self.automation.lock();
        if !automation.created || automation.context.active {
            return Ok(());
        }
        automation.context = AutomationContext {
            active: true,
            ..AutomationContext::default()
        };
        automation.current_step = None;
        automation.fired.clear();
        automation.phase = Phase::TutorialActive;
        self.sink.send(Command::QuestStepInfoRequest {
            quest_id: *quest_id,
        });
        info!(target: TARGET, session = %self.id, quest = %quest_id, "Onboarding started");
        Ok(())
    }

    pub(crate) fn on_step_info(
        self: &Arc<Self>,
        notification: &Notification,
    ) -> Result<(), AutomationError> {
        let Notification::QuestStepInfo { step } = notification else {
            return Ok(());
        };

        let mut automation = self.automation.lock();
        if !automation.context.active || step.quest_id != self.settings.tutorial.quest_id {
            return Ok(());
        }
        if automation.context.last_step_id == Some(step.step_id) {
            trace!(target: TARGET, session = %self.id, step_id = %step.step_id, "Duplicate step info");
            return Ok(());
        }

        automation.context.last_step_id = Some(step.step_id);
        automation.context.step_number = automation.context.step_number.saturating_add(1);
        automation.current_step = Some(step.clone());
        automation.fired.clear();
        let step_number = automation.context.step_number;
        drop(automation);

        info!(
            target: TARGET,
            session = %self.id,
            step = step_number,
            step_id = %step.step_id,
            "Entering onboarding step"
        );

        if let Some(action) = self.script.action(step_number).cloned() {
            self.schedule(
                step_number,
                vec![TimedAction {
                    delay_ms: self.settings.timing.step_settle_ms,
                    action,
                }],
            );
        }
        Ok(())
    }

    pub(crate) fn on_step_validated(
        self: &Arc<Self>,
        notification: &Notification,
    ) -> Result<(), AutomationError> {
        let Notification::QuestStepValidated { quest_id, step_id } = notification else {
            return Ok(());
        };
        if *quest_id != self.settings.tutorial.quest_id || !self.automation.lock().context.active {
            return Ok(());
        }
        debug!(target: TARGET, session = %self.id, step_id = %step_id, "Step validated");
        self.sink.send(Command::QuestStepInfoRequest {
            quest_id: *quest_id,
        });
        Ok(())
    }

    pub(crate) fn on_quest_validated(
        self: &Arc<Self>,
        notification: &Notification,
    ) -> Result<(), AutomationError> {
        let Notification::QuestValidated { quest_id } = notification else {
            return Ok(());
        };
        if *quest_id != self.settings.tutorial.quest_id {
            return Ok(());
        }

        let mut automation = self.automation.lock();
        if !automation.context.active {
            return Ok(());
        }
        let steps = automation.context.step_number;
        automation.context = AutomationContext::default();
        automation.current_step = None;
        automation.fired.clear();
        automation.phase = Phase::Inactive;
        drop(automation);

        self.preferences.clear_tutorial_flag();
        info!(target: TARGET, session = %self.id, steps, "Onboarding completed");
        Ok(())
    }

    pub(crate) fn on_follow_up(
        self: &Arc<Self>,
        notification: &Notification,
    ) -> Result<(), AutomationError> {
        let mut automation = self.automation.lock();
        if !automation.context.active {
            return Ok(());
        }
        let step_number = automation.context.step_number;
        let Some(step) = self.script.step(step_number) else {
            return Ok(());
        };
        let guard = TriggerGuard {
            own_id: self.character.read().id,
            batch_item: self.script.batch_item(automation.context.batch_cursor),
        };
        let Some((index, reaction)) = step.follow_up_for(notification, &guard) else {
            trace!(
                target: TARGET,
                session = %self.id,
                step = step_number,
                kind = ?notification.kind(),
                "Event does not match current step"
            );
            return Ok(());
        };
        if reaction.fires_once() {
            if automation.fired.contains(&index) {
                trace!(
                    target: TARGET,
                    session = %self.id,
                    step = step_number,
                    kind = ?notification.kind(),
                    "Follow-up already handled for this step"
                );
                return Ok(());
            }
            automation.fired.push(index);
        }

        match reaction {
            Reaction::ValidateObjectives => self.validate_objectives(&automation),
            Reaction::ValidateThenReady { delay_ms } => {
                self.validate_objectives(&automation);
                drop(automation);
                self.schedule_ready(step_number, *delay_ms);
            }
            Reaction::AdvanceBatch => {
                let cursor = automation.context.batch_cursor.saturating_add(1);
                automation.context.batch_cursor = cursor;
                match self.script.batch_item(cursor) {
                    None => self.validate_objectives(&automation),
                    Some(gid) => {
                        drop(automation);
                        debug!(target: TARGET, session = %self.id, cursor, gid = %gid, "Next batch item");
                        self.schedule(
                            step_number,
                            vec![TimedAction {
                                delay_ms: self.script.batch_delay_ms(),
                                action: StepAction::EquipItem(gid),
                            }],
                        );
                    }
                }
            }
            Reaction::ReplyFirst => {
                if let Notification::NpcQuestion { visible_replies } = notification {
                    if let Some(reply_id) = visible_replies.first() {
                        self.sink.send(Command::NpcReply { reply_id: *reply_id });
                    }
                }
            }
            Reaction::Perform(actions) => {
                let actions = actions.clone();
                drop(automation);
                self.schedule(step_number, actions);
            }
        }
        Ok(())
    }

    /// Send one validation per open objective of the current step.
    fn validate_objectives(&self, automation: &AutomationState) {
        let Some(step) = automation.current_step.as_ref() else {
            return;
        };
        let mut sent: u32 = 0;
        for objective_id in step.open_objectives() {
            self.sink.send(Command::QuestObjectiveValidation {
                quest_id: step.quest_id,
                objective_id,
            });
            sent = sent.saturating_add(1);
        }
        info!(
            target: TARGET,
            session = %self.id,
            step = automation.context.step_number,
            objectives = sent,
            "Validating step"
        );
    }

    /// Run `actions` in order, each after its delay, as long as the session
    /// is still on `step_number`.
    fn schedule(self: &Arc<Self>, step_number: u32, actions: Vec<TimedAction>) {
        let generation = self.scope.generation();
        let core = Arc::clone(self);
        self.scope.spawn("step-actions", async move {
            for timed in actions {
                if let Err(err) = core
                    .scope
                    .settle(Duration::from_millis(timed.delay_ms))
                    .await
                {
                    core.report("step-actions", &err.into());
                    return;
                }
                if let Err(err) = core.perform(generation, step_number, &timed.action) {
                    core.report("step-actions", &err);
                    return;
                }
            }
        });
    }

    fn schedule_ready(self: &Arc<Self>, step_number: u32, delay_ms: u64) {
        let generation = self.scope.generation();
        let settle = self.scope.settle(Duration::from_millis(delay_ms));
        let core = Arc::clone(self);
        self.scope.spawn("fight-ready", async move {
            if let Err(err) = settle.await {
                core.report("fight-ready", &err.into());
                return;
            }
            let automation = core.automation.lock();
            if core.is_live(&automation, generation, step_number) {
                core.sink.send(Command::FightReady);
            }
        });
    }

    fn is_live(&self, automation: &AutomationState, generation: u64, step_number: u32) -> bool {
        self.scope.is_current(generation)
            && automation.context.active
            && automation.context.step_number == step_number
    }

    /// Dispatch one scripted action if `step_number` is still current.
    fn perform(
        &self,
        generation: u64,
        step_number: u32,
        action: &StepAction,
    ) -> Result<(), AutomationError> {
        let mut automation = self.automation.lock();
        if !self.is_live(&automation, generation, step_number) {
            trace!(target: TARGET, session = %self.id, step = step_number, "Stale step action dropped");
            return Ok(());
        }
        let character = self.character.read();

        let command = match action {
            StepAction::MoveToCell(cell) => Command::MoveToCell { cell: *cell },
            StepAction::TalkToNpc {
                npc_index,
                action_index,
            } => {
                let map = character.map.as_ref().ok_or(AutomationError::NoNpc)?;
                let npc = map.npcs.get(*npc_index).ok_or(AutomationError::NoNpc)?;
                let action_id = npc
                    .actions
                    .get(*action_index)
                    .copied()
                    .ok_or(AutomationError::NoNpc)?;
                Command::NpcGenericAction {
                    npc_id: npc.id,
                    action_id,
                    map_id: map.map_id,
                }
            }
            StepAction::EquipItem(gid) => Command::EquipItem { gid: *gid },
            StepAction::ChangeMap(direction) => Command::ChangeMap {
                direction: *direction,
            },
            StepAction::StartFight => {
                let cell = character
                    .map
                    .as_ref()
                    .and_then(|m| m.monster_groups.first().copied())
                    .ok_or(AutomationError::NoMonsterGroup)?;
                Command::MoveToCell { cell }
            }
            StepAction::PickPlacementCell => {
                let cell = {
                    let mut rng = rand::rng();
                    pick_placement_cell(&character, &mut rng)
                }
                .ok_or(AutomationError::NoPlacementCell)?;
                Command::FightPlacementPosition { cell }
            }
            StepAction::EquipBatch => {
                automation.context.batch_cursor = 0;
                match self.script.batch_item(0) {
                    Some(gid) => Command::EquipItem { gid },
                    None => {
                        drop(character);
                        self.validate_objectives(&automation);
                        return Ok(());
                    }
                }
            }
        };

        debug!(
            target: TARGET,
            session = %self.id,
            step = step_number,
            command = command.name(),
            "Dispatching step action"
        );
        self.sink.send(command);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use autopilot_types::CharacterId;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn placement_never_picks_own_cell() {
        let mut character = CharacterState {
            id: Some(CharacterId::new(1)),
            ..CharacterState::default()
        };
        character.fight.challenger_cells = vec![CellId::new(10), CellId::new(11)];
        character.fight.own_cell = Some(CellId::new(10));
        let mut rng = SmallRng::seed_from_u64(9);
        for _ in 0..50 {
            assert_eq!(
                pick_placement_cell(&character, &mut rng),
                Some(CellId::new(11))
            );
        }
    }

    #[test]
    fn no_free_cell_yields_none() {
        let mut character = CharacterState::default();
        character.fight.challenger_cells = vec![CellId::new(10)];
        character.fight.own_cell = Some(CellId::new(10));
        let mut rng = SmallRng::seed_from_u64(9);
        assert_eq!(pick_placement_cell(&character, &mut rng), None);
    }
}
