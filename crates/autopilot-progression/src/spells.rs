//! Spell point planning.
//!
//! Raising a spell from level `L` to `L + 1` costs `L + 1` spell points.
//! Spells stop at level 6, and the last level is only reachable once the
//! character is [`FINAL_LEVEL_OFFSET`] levels above the spell's requirement.

use autopilot_types::{Command, SpellId};
use serde::{Deserialize, Serialize};

/// Highest spell level.
pub const MAX_SPELL_LEVEL: u8 = 6;

/// Character levels required above the spell's minimum to unlock the
/// final spell level.
pub const FINAL_LEVEL_OFFSET: u32 = 100;

/// Everything needed to plan one spell upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpellUpgradeRequest {
    /// Spell to raise. Spell `0` is the basic attack and is never raised.
    pub spell_id: SpellId,
    /// Current spell level.
    pub current_level: u8,
    /// Unspent spell points.
    pub budget: u32,
    /// Requested level cap.
    pub max_level: u8,
    /// Overall character level.
    pub character_level: u32,
    /// Minimum character level required by the spell.
    pub min_player_level: u32,
}

/// A planned spell point spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellSpend {
    /// Spell being raised.
    pub spell_id: SpellId,
    /// Level the spell reaches.
    pub target_level: u8,
    /// Spell points spent.
    pub points: u32,
    /// Spell points left over.
    pub remaining: u32,
}

impl SpellSpend {
    /// Upgrade command carrying this spend.
    pub const fn command(&self) -> Command {
        Command::SpellUpgrade {
            spell_id: self.spell_id,
            spell_level: self.target_level,
        }
    }
}

/// Level cap in effect for this attempt.
pub fn effective_spell_cap(max_level: u8, character_level: u32, min_player_level: u32) -> u8 {
    let cap = max_level.min(MAX_SPELL_LEVEL);
    let unlocked = character_level >= min_player_level.saturating_add(FINAL_LEVEL_OFFSET);
    if cap == MAX_SPELL_LEVEL && !unlocked {
        cap.saturating_sub(1)
    } else {
        cap
    }
}

/// Plan raising a spell as far as the budget and cap allow.
///
/// Returns `None` for the basic attack, when the spell is already at the
/// cap, or when the next level is unaffordable.
pub fn plan_spell_upgrade(request: &SpellUpgradeRequest) -> Option<SpellSpend> {
    if request.spell_id.into_inner() == 0 || request.budget == 0 {
        return None;
    }
    let cap = effective_spell_cap(
        request.max_level,
        request.character_level,
        request.min_player_level,
    );

    let mut level = request.current_level;
    let mut remaining = request.budget;
    while level < cap {
        let next = level.checked_add(1)?;
        let Some(left) = remaining.checked_sub(u32::from(next)) else {
            break;
        };
        remaining = left;
        level = next;
    }

    (level > request.current_level).then(|| SpellSpend {
        spell_id: request.spell_id,
        target_level: level,
        points: request.budget.saturating_sub(remaining),
        remaining,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(current_level: u8, budget: u32, character_level: u32) -> SpellUpgradeRequest {
        SpellUpgradeRequest {
            spell_id: SpellId::new(161),
            current_level,
            budget,
            max_level: MAX_SPELL_LEVEL,
            character_level,
            min_player_level: 1,
        }
    }

    #[test]
    fn levels_until_next_cost_is_unaffordable() {
        let spend = plan_spell_upgrade(&request(0, 6, 10)).unwrap();
        assert_eq!(spend.target_level, 3);
        assert_eq!(spend.points, 6);
        assert_eq!(spend.remaining, 0);
    }

    #[test]
    fn final_level_needs_level_offset() {
        assert_eq!(effective_spell_cap(6, 100, 1), 5);
        assert_eq!(effective_spell_cap(6, 101, 1), 6);
        assert_eq!(effective_spell_cap(4, 10, 1), 4);
        assert_eq!(effective_spell_cap(9, 500, 1), 6);

        let locked = plan_spell_upgrade(&request(4, 100, 50)).unwrap();
        assert_eq!(locked.target_level, 5);
        assert_eq!(locked.points, 5);

        let unlocked = plan_spell_upgrade(&request(4, 100, 150)).unwrap();
        assert_eq!(unlocked.target_level, 6);
        assert_eq!(unlocked.points, 11);
    }

    #[test]
    fn nothing_to_do_is_none() {
        assert_eq!(plan_spell_upgrade(&request(5, 100, 50)), None);
        assert_eq!(plan_spell_upgrade(&request(2, 2, 50)), None);
        assert_eq!(plan_spell_upgrade(&request(0, 0, 50)), None);

        let basic_attack = SpellUpgradeRequest {
            spell_id: SpellId::new(0),
            ..request(0, 10, 50)
        };
        assert_eq!(plan_spell_upgrade(&basic_attack), None);
    }

    #[test]
    fn spend_never_exceeds_budget() {
        for current in 0..=MAX_SPELL_LEVEL {
            for budget in 0..30 {
                for character_level in [1, 100, 101, 200] {
                    if let Some(spend) = plan_spell_upgrade(&request(current, budget, character_level)) {
                        assert!(spend.points <= budget);
                        assert!(spend.target_level <= MAX_SPELL_LEVEL);
                        assert!(spend.target_level > current);
                    }
                }
            }
        }
    }

    #[test]
    fn spend_builds_upgrade_command() {
        let spend = plan_spell_upgrade(&request(0, 1, 1)).unwrap();
        assert_eq!(
            spend.command(),
            Command::SpellUpgrade {
                spell_id: SpellId::new(161),
                spell_level: 1,
            }
        );
    }
}
