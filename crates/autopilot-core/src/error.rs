//! Error types for session automation.

use autopilot_events::WaitError;
use autopilot_progression::ProgressionError;
use autopilot_types::CreationResult;

/// Why an automation operation stopped.
#[derive(Debug, thiserror::Error)]
pub enum AutomationError {
    /// Reference data required by the operation is missing.
    #[error("missing {kind} reference data for id {id}")]
    MissingReference {
        /// Kind of record (breed, spell, head).
        kind: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// The watchdog expired while waiting for an event.
    #[error("automation stalled: no matching event within {after_ms} ms")]
    Stalled {
        /// Watchdog duration in milliseconds.
        after_ms: u64,
    },

    /// The session was reset while the operation was suspended.
    #[error("operation cancelled by session reset")]
    Cancelled,

    /// The server refused the creation request.
    #[error("character creation rejected: {0:?}")]
    CreationRejected(CreationResult),

    /// The name kept colliding with existing characters.
    #[error("character name still taken after {attempts} attempts")]
    NameRetriesExhausted {
        /// Attempts made.
        attempts: u32,
    },

    /// No breed is available to pick from.
    #[error("no breed available for random selection")]
    EmptyRoster,

    /// A fight-start step found no monster group on the map.
    #[error("no monster group on the current map")]
    NoMonsterGroup,

    /// The placement step found no free placement cell.
    #[error("no free fight placement cell")]
    NoPlacementCell,

    /// A dialog step found no NPC to talk to.
    #[error("no NPC with an action on the current map")]
    NoNpc,

    /// An operation needs a selected character.
    #[error("no character selected")]
    NoCharacter,

    /// Reference cost data could not be used.
    #[error(transparent)]
    Progression(#[from] ProgressionError),
}

impl AutomationError {
    /// Shorthand for [`AutomationError::MissingReference`].
    pub fn missing(kind: &'static str, id: impl ToString) -> Self {
        Self::MissingReference {
            kind,
            id: id.to_string(),
        }
    }
}

impl From<WaitError> for AutomationError {
    fn from(err: WaitError) -> Self {
        match err {
            WaitError::Stalled { after_ms } => Self::Stalled { after_ms },
            WaitError::Cancelled => Self::Cancelled,
        }
    }
}
