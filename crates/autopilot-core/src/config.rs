//! Configuration loading and typed config structures for the autopilot.
//!
//! The canonical configuration lives in `autopilot-config.yaml` at the
//! project root. Every section and field has a default, so a minimal file
//! only lists the accounts to drive.

use std::path::Path;

use autopilot_progression::TierLookup;
use autopilot_types::{BoostableStat, BreedId, CellId, ItemGid, MapId, QuestId, Sex, SpellId};
use serde::Deserialize;

/// Number of head cosmetics offered per breed and sex.
pub const HEAD_CHOICES: u8 = 8;

/// Number of indexed colors in a character palette.
pub const PALETTE_SIZE: usize = 5;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The file parsed but holds an unusable value.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level autopilot configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BotConfig {
    /// Accounts to drive, one session each.
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,

    /// Settling delays and the optional watchdog.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Automatic point spending.
    #[serde(default)]
    pub progression: ProgressionConfig,

    /// Onboarding quest constants.
    #[serde(default)]
    pub tutorial: TutorialConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Infrastructure connection strings and data paths.
    #[serde(default)]
    pub infrastructure: InfrastructureConfig,
}

impl BotConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `NATS_URL` overrides `infrastructure.nats_url`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.infrastructure.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for account in &self.accounts {
            if account.username.trim().is_empty() {
                return Err(ConfigError::Invalid("account username is empty".to_owned()));
            }
            account.creation.validate(&account.username)?;
        }
        if self.progression.auto_spell_max_level == 0 {
            return Err(ConfigError::Invalid(
                "progression.auto_spell_max_level must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

/// One account driven by the autopilot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountConfig {
    /// Account login, also used in transport subjects.
    pub username: String,

    /// Character creation preferences.
    #[serde(default)]
    pub creation: CreationConfig,
}

/// Character creation preferences. `None` picks uniformly at random.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreationConfig {
    /// One-shot flag: create a character on the next roster. Cleared once
    /// the created character is selected.
    #[serde(default)]
    pub create: bool,

    /// Walk the new character through the onboarding quest.
    #[serde(default = "default_true")]
    pub complete_tutorial: bool,

    /// Breed to create.
    #[serde(default)]
    pub breed: Option<BreedId>,

    /// Sex to create.
    #[serde(default)]
    pub sex: Option<Sex>,

    /// Head order, `0..8`.
    #[serde(default)]
    pub head: Option<u8>,

    /// Fixed name. Empty or missing asks the server for a suggestion.
    #[serde(default)]
    pub name: Option<String>,

    /// Custom palette. Used only with exactly five entries.
    #[serde(default)]
    pub colors: Vec<i32>,

    /// Attempts allowed after a name collision.
    #[serde(default = "default_max_name_retries")]
    pub max_name_retries: u32,
}

impl CreationConfig {
    /// The configured name, if it is usable verbatim.
    pub fn fixed_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.trim().is_empty())
    }

    /// The configured palette, if it overrides the breed defaults.
    pub fn palette(&self) -> Option<&[i32]> {
        (self.colors.len() == PALETTE_SIZE).then_some(self.colors.as_slice())
    }

    fn validate(&self, username: &str) -> Result<(), ConfigError> {
        if let Some(head) = self.head {
            if head >= HEAD_CHOICES {
                return Err(ConfigError::Invalid(format!(
                    "{username}: creation.head must be below {HEAD_CHOICES}, got {head}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for CreationConfig {
    fn default() -> Self {
        Self {
            create: false,
            complete_tutorial: default_true(),
            breed: None,
            sex: None,
            head: None,
            name: None,
            colors: Vec::new(),
            max_name_retries: default_max_name_retries(),
        }
    }
}

/// Settling delays, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimingConfig {
    /// Delay before sending the creation command.
    #[serde(default = "default_creation_settle_ms")]
    pub creation_settle_ms: u64,

    /// Delay before retrying after a name collision.
    #[serde(default = "default_name_retry_delay_ms")]
    pub name_retry_delay_ms: u64,

    /// Delay between a new onboarding step and its action.
    #[serde(default = "default_step_settle_ms")]
    pub step_settle_ms: u64,

    /// Delay between two items of an equip batch.
    #[serde(default = "default_equip_batch_delay_ms")]
    pub equip_batch_delay_ms: u64,

    /// Delay between placement and the ready signal.
    #[serde(default = "default_fight_ready_delay_ms")]
    pub fight_ready_delay_ms: u64,

    /// Delay before talking to an NPC after entering its map.
    #[serde(default = "default_npc_dialog_delay_ms")]
    pub npc_dialog_delay_ms: u64,

    /// Delay before equipping the hat on the final map.
    #[serde(default = "default_hat_equip_delay_ms")]
    pub hat_equip_delay_ms: u64,

    /// Delay between equipping the hat and talking to the NPC.
    #[serde(default = "default_npc_after_hat_delay_ms")]
    pub npc_after_hat_delay_ms: u64,

    /// Watchdog for correlation waits. `0` waits forever.
    #[serde(default)]
    pub wait_timeout_ms: u64,
}

impl TimingConfig {
    /// Watchdog duration, `None` when disabled.
    pub const fn wait_timeout(&self) -> Option<std::time::Duration> {
        if self.wait_timeout_ms == 0 {
            None
        } else {
            Some(std::time::Duration::from_millis(self.wait_timeout_ms))
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            creation_settle_ms: default_creation_settle_ms(),
            name_retry_delay_ms: default_name_retry_delay_ms(),
            step_settle_ms: default_step_settle_ms(),
            equip_batch_delay_ms: default_equip_batch_delay_ms(),
            fight_ready_delay_ms: default_fight_ready_delay_ms(),
            npc_dialog_delay_ms: default_npc_dialog_delay_ms(),
            hat_equip_delay_ms: default_hat_equip_delay_ms(),
            npc_after_hat_delay_ms: default_npc_after_hat_delay_ms(),
            wait_timeout_ms: 0,
        }
    }
}

/// Automatic point spending.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProgressionConfig {
    /// How the active cost tier is located.
    #[serde(default)]
    pub tier_lookup: TierLookup,

    /// Stat that receives every stat point after each acknowledgement.
    #[serde(default)]
    pub auto_boost_stat: Option<BoostableStat>,

    /// Spells leveled after each acknowledgement, in priority order.
    #[serde(default)]
    pub auto_spells: Vec<SpellId>,

    /// Level cap for automatically leveled spells.
    #[serde(default = "default_auto_spell_max_level")]
    pub auto_spell_max_level: u8,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            tier_lookup: TierLookup::default(),
            auto_boost_stat: None,
            auto_spells: Vec::new(),
            auto_spell_max_level: default_auto_spell_max_level(),
        }
    }
}

/// Onboarding quest constants.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TutorialConfig {
    /// The onboarding quest.
    #[serde(default = "default_quest_id")]
    pub quest_id: QuestId,

    /// Cell reached by the first movement step.
    #[serde(default = "default_first_cell")]
    pub first_cell: CellId,

    /// Item equipped by the first equip step.
    #[serde(default = "default_first_equip_item")]
    pub first_equip_item: ItemGid,

    /// Items equipped one after another by the batch step.
    #[serde(default = "default_batch_items")]
    pub batch_items: Vec<ItemGid>,

    /// Hat equipped on the final map.
    #[serde(default = "default_hat_item")]
    pub hat_item: ItemGid,

    /// Map whose NPC is talked to after the first fight.
    #[serde(default = "default_map_second_after_fight")]
    pub map_second_after_fight: MapId,

    /// Map holding the second fight.
    #[serde(default = "default_map_third_before_fight")]
    pub map_third_before_fight: MapId,

    /// Map whose NPC closes the quest.
    #[serde(default = "default_map_third_after_fight")]
    pub map_third_after_fight: MapId,
}

impl Default for TutorialConfig {
    fn default() -> Self {
        Self {
            quest_id: default_quest_id(),
            first_cell: default_first_cell(),
            first_equip_item: default_first_equip_item(),
            batch_items: default_batch_items(),
            hat_item: default_hat_item(),
            map_second_after_fight: default_map_second_after_fight(),
            map_third_before_fight: default_map_third_before_fight(),
            map_third_after_fight: default_map_third_after_fight(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Infrastructure connection strings and data paths.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InfrastructureConfig {
    /// NATS server URL.
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// Breed and spell reference data.
    #[serde(default = "default_game_data_path")]
    pub game_data_path: String,
}

impl InfrastructureConfig {
    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("NATS_URL") {
            self.nats_url = val;
        }
    }
}

impl Default for InfrastructureConfig {
    fn default() -> Self {
        Self {
            nats_url: default_nats_url(),
            game_data_path: default_game_data_path(),
        }
    }
}

const fn default_true() -> bool {
    true
}

const fn default_max_name_retries() -> u32 {
    5
}

const fn default_creation_settle_ms() -> u64 {
    1000
}

const fn default_name_retry_delay_ms() -> u64 {
    1000
}

const fn default_step_settle_ms() -> u64 {
    2000
}

const fn default_equip_batch_delay_ms() -> u64 {
    600
}

const fn default_fight_ready_delay_ms() -> u64 {
    1000
}

const fn default_npc_dialog_delay_ms() -> u64 {
    1600
}

const fn default_hat_equip_delay_ms() -> u64 {
    1200
}

const fn default_npc_after_hat_delay_ms() -> u64 {
    400
}

const fn default_auto_spell_max_level() -> u8 {
    6
}

const fn default_quest_id() -> QuestId {
    QuestId::new(1461)
}

const fn default_first_cell() -> CellId {
    CellId::new(259)
}

const fn default_first_equip_item() -> ItemGid {
    ItemGid::new(10785)
}

fn default_batch_items() -> Vec<ItemGid> {
    vec![
        ItemGid::new(10794),
        ItemGid::new(10797),
        ItemGid::new(10798),
        ItemGid::new(10799),
        ItemGid::new(10800),
    ]
}

const fn default_hat_item() -> ItemGid {
    ItemGid::new(10801)
}

const fn default_map_second_after_fight() -> MapId {
    MapId::new(153_092_354)
}

const fn default_map_third_before_fight() -> MapId {
    MapId::new(153_093_378)
}

const fn default_map_third_after_fight() -> MapId {
    MapId::new(153_093_380)
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_nats_url() -> String {
    "nats://localhost:4222".to_owned()
}

fn default_game_data_path() -> String {
    "data/game-data.yaml".to_owned()
}
