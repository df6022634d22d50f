//! Session-level progression: explicit spend operations and the
//! opportunistic allocator run after each acknowledgement.

use std::sync::Arc;

use autopilot_progression::{SpellUpgradeRequest, can_afford, plan_spell_upgrade, plan_stat_boost};
use autopilot_types::{BoostableStat, Notification, SpellId};
use tracing::{debug, info};

use crate::error::AutomationError;
use crate::session::SessionCore;

const TARGET: &str = "autopilot::progression";

impl SessionCore {
    pub(crate) async fn boost_stat(
        &self,
        stat: BoostableStat,
        increments: u32,
    ) -> Result<bool, AutomationError> {
        let (breed_id, base, budget) = {
            let character = self.character.read();
            (character.breed, character.stats.base(stat), character.stats.stats_points)
        };
        let breed_id = breed_id.ok_or(AutomationError::NoCharacter)?;
        let breed = self
            .data
            .breed(breed_id)
            .await
            .ok_or_else(|| AutomationError::missing("breed", breed_id))?;
        let table = breed.cost_table(stat)?;

        let Some(spend) = plan_stat_boost(
            &table,
            base,
            budget,
            increments,
            self.settings.progression.tier_lookup,
        ) else {
            debug!(target: TARGET, session = %self.id, ?stat, base, budget, "Not enough stat points");
            return Ok(false);
        };

        self.sink.send(spend.command(stat));
        info!(
            target: TARGET,
            session = %self.id,
            ?stat,
            points = spend.points,
            increments = spend.increments,
            base = spend.final_base,
            "Boosting stat"
        );
        Ok(true)
    }

    pub(crate) async fn can_boost_stat(&self, stat: BoostableStat) -> Result<bool, AutomationError> {
        let (breed_id, base, budget) = {
            let character = self.character.read();
            (character.breed, character.stats.base(stat), character.stats.stats_points)
        };
        let breed_id = breed_id.ok_or(AutomationError::NoCharacter)?;
        let breed = self
            .data
            .breed(breed_id)
            .await
            .ok_or_else(|| AutomationError::missing("breed", breed_id))?;
        let table = breed.cost_table(stat)?;
        Ok(can_afford(
            &table,
            base,
            budget,
            self.settings.progression.tier_lookup,
        ))
    }

    pub(crate) async fn level_up_spell(
        &self,
        spell_id: SpellId,
        max_level: u8,
    ) -> Result<bool, AutomationError> {
        if spell_id.into_inner() == 0 {
            return Ok(false);
        }
        let (current_level, budget, character_level) = {
            let character = self.character.read();
            let Some(level) = character.spells.get(&spell_id).copied() else {
                return Ok(false);
            };
            (level, character.stats.spells_points, character.level)
        };
        if budget == 0 {
            return Ok(false);
        }

        let record = self
            .data
            .spells(&[spell_id])
            .await
            .into_iter()
            .next()
            .ok_or_else(|| AutomationError::missing("spell", spell_id))?;

        let Some(spend) = plan_spell_upgrade(&SpellUpgradeRequest {
            spell_id,
            current_level,
            budget,
            max_level,
            character_level,
            min_player_level: record.min_player_level,
        }) else {
            debug!(target: TARGET, session = %self.id, spell = %spell_id, budget, "Spell not upgradable now");
            return Ok(false);
        };

        self.sink.send(spend.command());
        info!(
            target: TARGET,
            session = %self.id,
            spell = %spell_id,
            level = spend.target_level,
            points = spend.points,
            "Leveling spell"
        );
        Ok(true)
    }

    /// Spend freshly acknowledged points on the configured targets.
    pub(crate) fn on_progression_ack(self: &Arc<Self>, notification: &Notification) {
        match notification {
            Notification::StatsUpdated { .. } | Notification::LevelUp { .. } => {
                self.auto_boost();
                self.auto_spells();
            }
            Notification::SpellList { .. } | Notification::SpellUpgraded { .. } => {
                self.auto_spells();
            }
            _ => {}
        }
    }

    fn auto_boost(self: &Arc<Self>) {
        let Some(stat) = self.settings.progression.auto_boost_stat else {
            return;
        };
        let key = {
            let character = self.character.read();
            if character.breed.is_none() || character.stats.stats_points == 0 {
                return;
            }
            (character.stats.stats_points, character.stats.base(stat))
        };
        {
            let mut guard = self.spend_guard.lock();
            if guard.stat == Some(key) {
                return;
            }
            guard.stat = Some(key);
        }

        let core = Arc::clone(self);
        self.scope.spawn("auto-boost", async move {
            if let Err(err) = core.boost_stat(stat, 0).await {
                core.report("auto-boost", &err);
            }
        });
    }

    fn auto_spells(self: &Arc<Self>) {
        let spells = self.settings.progression.auto_spells.clone();
        if spells.is_empty() {
            return;
        }
        let key = {
            let character = self.character.read();
            if character.stats.spells_points == 0 {
                return;
            }
            let levels: Vec<_> = spells
                .iter()
                .filter_map(|id| character.spells.get(id).map(|level| (*id, *level)))
                .collect();
            (character.stats.spells_points, character.level, levels)
        };
        {
            let mut guard = self.spend_guard.lock();
            if guard.spells.as_ref() == Some(&key) {
                return;
            }
            guard.spells = Some(key);
        }

        let max_level = self.settings.progression.auto_spell_max_level;
        let core = Arc::clone(self);
        self.scope.spawn("auto-spells", async move {
            for spell in spells {
                match core.level_up_spell(spell, max_level).await {
                    Ok(true) => return,
                    Ok(false) => {}
                    Err(err) => core.report("auto-spells", &err),
                }
            }
        });
    }
}
