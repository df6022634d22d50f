//! Game reference data.
//!
//! Breed cost tables, palettes, head cosmetics, and spell requirements are
//! owned outside the engine. [`GameDataProvider`] is the read-only seam;
//! [`StaticGameData`] serves a YAML snapshot loaded at startup.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use autopilot_progression::CostTable;
use autopilot_types::{BoostableStat, BreedId, CosmeticId, Sex, SpellId};
use serde::Deserialize;

use crate::config::ConfigError;
use crate::error::AutomationError;

/// A head cosmetic offered to one breed and sex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HeadRecord {
    /// Cosmetic identifier sent with the creation request.
    pub id: CosmeticId,
    /// Display order, `0..8`.
    pub order: u8,
    /// Sex the head belongs to.
    pub sex: Sex,
}

/// Reference data of one breed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BreedRecord {
    /// Breed identifier.
    pub id: BreedId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Cost curve per stat as `[threshold, cost]` pairs.
    #[serde(default)]
    pub stat_costs: BTreeMap<BoostableStat, Vec<[u32; 2]>>,
    /// Default palette for male characters.
    #[serde(default)]
    pub male_colors: Vec<i32>,
    /// Default palette for female characters.
    #[serde(default)]
    pub female_colors: Vec<i32>,
    /// Head cosmetics.
    #[serde(default)]
    pub heads: Vec<HeadRecord>,
}

impl BreedRecord {
    /// Validated cost table of `stat`.
    pub fn cost_table(&self, stat: BoostableStat) -> Result<CostTable, AutomationError> {
        let pairs = self
            .stat_costs
            .get(&stat)
            .ok_or_else(|| AutomationError::missing("stat cost table", format!("{}/{stat:?}", self.id)))?;
        Ok(CostTable::from_pairs(pairs)?)
    }

    /// Default palette for `sex`.
    pub fn default_colors(&self, sex: Sex) -> &[i32] {
        match sex {
            Sex::Male => &self.male_colors,
            Sex::Female => &self.female_colors,
        }
    }

    /// Cosmetic of the head at `order` for `sex`.
    pub fn cosmetic_id(&self, sex: Sex, order: u8) -> Option<CosmeticId> {
        self.heads
            .iter()
            .find(|h| h.sex == sex && h.order == order)
            .map(|h| h.id)
    }
}

/// Reference data of one spell.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpellRecord {
    /// Spell identifier.
    pub id: SpellId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Character level required to learn the spell.
    #[serde(default)]
    pub min_player_level: u32,
}

/// Read-only access to reference data. Lookups that miss return nothing.
#[async_trait]
pub trait GameDataProvider: Send + Sync {
    /// Look up one breed.
    async fn breed(&self, id: BreedId) -> Option<BreedRecord>;

    /// Every breed that can be created.
    async fn breed_ids(&self) -> Vec<BreedId>;

    /// Look up spells. Unknown ids are omitted from the result.
    async fn spells(&self, ids: &[SpellId]) -> Vec<SpellRecord>;
}

#[derive(Debug, Default, Deserialize)]
struct GameDataFile {
    #[serde(default)]
    breeds: Vec<BreedRecord>,
    #[serde(default)]
    spells: Vec<SpellRecord>,
}

/// Reference data loaded once from YAML.
#[derive(Debug, Clone, Default)]
pub struct StaticGameData {
    breeds: BTreeMap<BreedId, BreedRecord>,
    spells: BTreeMap<SpellId, SpellRecord>,
}

impl StaticGameData {
    /// Load reference data from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse reference data from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let file: GameDataFile = serde_yml::from_str(yaml)?;
        Ok(Self::new(file.breeds, file.spells))
    }

    /// Build from in-memory records.
    pub fn new(breeds: Vec<BreedRecord>, spells: Vec<SpellRecord>) -> Self {
        Self {
            breeds: breeds.into_iter().map(|b| (b.id, b)).collect(),
            spells: spells.into_iter().map(|s| (s.id, s)).collect(),
        }
    }

    /// Number of breeds loaded.
    pub fn breed_count(&self) -> usize {
        self.breeds.len()
    }
}

#[async_trait]
impl GameDataProvider for StaticGameData {
    async fn breed(&self, id: BreedId) -> Option<BreedRecord> {
        self.breeds.get(&id).cloned()
    }

    async fn breed_ids(&self) -> Vec<BreedId> {
        self.breeds.keys().copied().collect()
    }

    async fn spells(&self, ids: &[SpellId]) -> Vec<SpellRecord> {
        ids.iter()
            .filter_map(|id| self.spells.get(id).cloned())
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const YAML: &str = r"
breeds:
  - id: 8
    name: Iop
    stat_costs:
      strength: [[0, 1], [100, 2], [200, 3], [300, 4]]
    male_colors: [1, 2, 3, 4, 5]
    female_colors: [6, 7, 8, 9, 10]
    heads:
      - { id: 57, order: 0, sex: male }
      - { id: 65, order: 0, sex: female }
spells:
  - id: 161
    name: Pressure
    min_player_level: 1
";

    #[tokio::test]
    async fn loads_breeds_and_spells() {
        let data = StaticGameData::parse(YAML).unwrap();
        assert_eq!(data.breed_count(), 1);
        assert_eq!(data.breed_ids().await, vec![BreedId::new(8)]);

        let breed = data.breed(BreedId::new(8)).await.unwrap();
        assert_eq!(breed.cosmetic_id(Sex::Female, 0), Some(CosmeticId::new(65)));
        assert_eq!(breed.cosmetic_id(Sex::Female, 1), None);
        assert_eq!(breed.default_colors(Sex::Male), &[1, 2, 3, 4, 5]);

        let spells = data.spells(&[SpellId::new(161), SpellId::new(999)]).await;
        assert_eq!(spells.len(), 1);
    }

    #[tokio::test]
    async fn shipped_game_data_covers_every_head() {
        let data = StaticGameData::parse(include_str!("../../../data/game-data.yaml")).unwrap();
        for id in data.breed_ids().await {
            let breed = data.breed(id).await.unwrap();
            for sex in Sex::ALL {
                for order in 0..crate::config::HEAD_CHOICES {
                    assert!(breed.cosmetic_id(sex, order).is_some(), "{id} {sex:?} {order}");
                }
                assert_eq!(breed.default_colors(sex).len(), crate::config::PALETTE_SIZE);
            }
        }
    }

    #[tokio::test]
    async fn missing_cost_table_is_a_reference_miss() {
        let data = StaticGameData::parse(YAML).unwrap();
        let breed = data.breed(BreedId::new(8)).await.unwrap();
        assert!(breed.cost_table(BoostableStat::Strength).is_ok());
        assert!(matches!(
            breed.cost_table(BoostableStat::Wisdom),
            Err(AutomationError::MissingReference { .. })
        ));
        assert!(data.breed(BreedId::new(3)).await.is_none());
    }
}
