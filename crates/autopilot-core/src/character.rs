//! Live character state.
//!
//! Rebuilt only from acknowledgement notifications. The progression budget
//! read by the allocator comes from here and is never decremented locally.

use std::collections::BTreeMap;

use autopilot_types::{
    BreedId, CellId, CharacterId, MapId, MapNpc, Notification, SpellId, StatsSnapshot,
};

/// The map the character currently stands on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapState {
    /// Map identifier.
    pub map_id: MapId,
    /// Cell of the character, when it was listed among the actors.
    pub own_cell: Option<CellId>,
    /// Cells occupied by monster groups.
    pub monster_groups: Vec<CellId>,
    /// NPCs on the map.
    pub npcs: Vec<MapNpc>,
}

/// Placement state of the current fight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FightState {
    /// A fight is in progress.
    pub in_fight: bool,
    /// Placement cells of the character's team.
    pub challenger_cells: Vec<CellId>,
    /// Cell of the character on the fight grid.
    pub own_cell: Option<CellId>,
}

/// Everything the session knows about its character.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterState {
    /// Selected character.
    pub id: Option<CharacterId>,
    /// Overall level.
    pub level: u32,
    /// Breed of the selected character.
    pub breed: Option<BreedId>,
    /// Latest stats acknowledgement.
    pub stats: StatsSnapshot,
    /// Known spells and their levels.
    pub spells: BTreeMap<SpellId, u8>,
    /// Current map.
    pub map: Option<MapState>,
    /// Current fight.
    pub fight: FightState,
}

impl CharacterState {
    /// Fold `notification` into the state. Returns whether anything changed.
    pub fn apply(&mut self, notification: &Notification) -> bool {
        match notification {
            Notification::CharacterSelected { character } => {
                *self = Self {
                    id: Some(character.id),
                    level: character.level,
                    breed: Some(character.breed),
                    ..Self::default()
                };
                true
            }
            Notification::StatsUpdated { stats } => replace(&mut self.stats, stats.clone()),
            Notification::LevelUp { new_level } => replace(&mut self.level, *new_level),
            Notification::SpellList { spells } => {
                let known = spells.iter().map(|s| (s.spell_id, s.level)).collect();
                replace(&mut self.spells, known)
            }
            Notification::SpellUpgraded { spell } => {
                self.spells.insert(spell.spell_id, spell.level) != Some(spell.level)
            }
            Notification::MapChanged { map } => {
                let own_cell = self.id.and_then(|id| {
                    map.actors
                        .iter()
                        .find(|a| a.entity_id == id)
                        .map(|a| a.cell)
                });
                self.map = Some(MapState {
                    map_id: map.map_id,
                    own_cell,
                    monster_groups: map.monster_groups.clone(),
                    npcs: map.npcs.clone(),
                });
                self.fight = FightState::default();
                true
            }
            Notification::MapMovement {
                actor_id,
                destination,
            } => {
                if !self.is_self(*actor_id) {
                    return false;
                }
                if self.fight.in_fight {
                    replace(&mut self.fight.own_cell, Some(*destination))
                } else if let Some(map) = self.map.as_mut() {
                    replace(&mut map.own_cell, Some(*destination))
                } else {
                    false
                }
            }
            Notification::FightStarting => replace(&mut self.fight.in_fight, true),
            Notification::FightPlacementPositions {
                challenger_cells,
                own_cell,
            } => {
                self.fight.in_fight = true;
                self.fight.challenger_cells.clone_from(challenger_cells);
                if own_cell.is_some() {
                    self.fight.own_cell = *own_cell;
                }
                true
            }
            Notification::EntitiesDisposition { positions } => {
                let own = self
                    .id
                    .and_then(|id| positions.iter().find(|p| p.entity_id == id));
                own.is_some_and(|p| {
                    let cell = p.cell;
                    replace(&mut self.fight.own_cell, Some(cell))
                })
            }
            _ => false,
        }
    }

    /// Whether `actor` is the selected character.
    pub fn is_self(&self, actor: CharacterId) -> bool {
        self.id == Some(actor)
    }

    /// Placement cells other than the one the character occupies.
    pub fn free_placement_cells(&self) -> Vec<CellId> {
        self.fight
            .challenger_cells
            .iter()
            .copied()
            .filter(|c| Some(*c) != self.fight.own_cell)
            .collect()
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}
