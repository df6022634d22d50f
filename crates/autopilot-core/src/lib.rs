//! Session automation for the account autopilot.
//!
//! An [`AccountSession`] consumes the decoded notification stream of one
//! logged-in account and drives it: it creates a character, walks it
//! through the onboarding quest, and spends progression points as they are
//! acknowledged. Outbound commands go through a fire-and-forget
//! [`CommandSink`]; reference data comes from a [`GameDataProvider`].
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration ([`BotConfig`])
//! - [`error`] -- [`AutomationError`]
//! - [`provider`] -- Breed and spell reference data
//! - [`transport`] -- The outbound [`CommandSink`] seam
//! - [`preferences`] -- Creation preferences and their one-shot flags
//! - [`character`] -- Live character state rebuilt from acknowledgements
//! - [`automation`] -- Automation phase and onboarding context
//! - [`script`] -- The onboarding script as a data table
//! - [`creation`] -- Character creation
//! - [`tutorial`] -- Onboarding step dispatch and follow-up matching
//! - [`session`] -- [`AccountSession`]

pub mod automation;
pub mod character;
pub mod config;
pub mod creation;
pub mod error;
pub mod preferences;
mod progression;
pub mod provider;
pub mod script;
pub mod session;
pub mod transport;
pub mod tutorial;

pub use automation::{AutomationContext, Phase};
pub use character::{CharacterState, FightState, MapState};
pub use config::{
    AccountConfig, BotConfig, ConfigError, CreationConfig, InfrastructureConfig, LoggingConfig,
    ProgressionConfig, TimingConfig, TutorialConfig,
};
pub use error::AutomationError;
pub use preferences::{InMemoryPreferences, PreferenceStore};
pub use provider::{BreedRecord, GameDataProvider, HeadRecord, SpellRecord, StaticGameData};
pub use script::TutorialScript;
pub use session::{AccountSession, Collaborators, SessionSettings};
pub use transport::{ChannelSink, CommandSink};
