//! Character creation.
//!
//! The roster notification drives everything: a session that already
//! created its character selects it, otherwise it resolves the creation
//! fields, asks the server for a name when none is configured, and sends
//! the creation request after a settling delay. A name collision restarts
//! the flow from scratch, including a fresh name suggestion.

use std::sync::Arc;
use std::time::Duration;

use autopilot_events::Event;
use autopilot_types::{BreedId, Command, CreationResult, Notification, Sex};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{info, trace, warn};

use crate::automation::Phase;
use crate::config::{CreationConfig, HEAD_CHOICES};
use crate::error::AutomationError;
use crate::session::SessionCore;

const TARGET: &str = "autopilot::creation";

/// Breed, sex, and head order for one creation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreationChoice {
    /// Breed to create.
    pub breed: BreedId,
    /// Sex to create.
    pub sex: Sex,
    /// Head order, `0..8`.
    pub head: u8,
}

/// Resolve the creation fields, picking uniformly at random whatever the
/// preferences leave unset.
pub fn roll_choice(
    prefs: &CreationConfig,
    breeds: &[BreedId],
    rng: &mut impl Rng,
) -> Result<CreationChoice, AutomationError> {
    let breed = match prefs.breed {
        Some(breed) => breed,
        None => *breeds.choose(rng).ok_or(AutomationError::EmptyRoster)?,
    };
    let sex = match prefs.sex {
        Some(sex) => sex,
        None => *Sex::ALL.choose(rng).ok_or(AutomationError::EmptyRoster)?,
    };
    let head = prefs
        .head
        .unwrap_or_else(|| rng.random_range(0..HEAD_CHOICES));
    Ok(CreationChoice { breed, sex, head })
}

impl SessionCore {
    pub(crate) fn on_characters_list(
        self: &Arc<Self>,
        notification: &Notification,
    ) -> Result<(), AutomationError> {
        let Notification::CharactersList { characters } = notification else {
            return Ok(());
        };
        let prefs = self.preferences.creation();
        if !prefs.create {
            return Ok(());
        }

        let mut automation = self.automation.lock();
        if automation.created {
            let first = characters.first().ok_or(AutomationError::NoCharacter)?;
            self.sink.send(Command::CharacterFirstSelection {
                character_id: first.id,
                do_tutorial: prefs.complete_tutorial,
            });
            self.preferences.clear_create_flag();
            info!(
                target: TARGET,
                session = %self.id,
                character = %first.id,
                name = %first.name,
                "Selecting created character"
            );
            return Ok(());
        }
        if automation.phase == Phase::CreationPending {
            trace!(target: TARGET, session = %self.id, "Roster re-delivered during creation");
            return Ok(());
        }

        automation.phase = Phase::CreationPending;
        automation.name_attempts = 0;
        drop(automation);

        info!(target: TARGET, session = %self.id, account = %self.account, "Starting character creation");
        self.spawn_creation(None);
        Ok(())
    }

    pub(crate) fn on_creation_result(
        self: &Arc<Self>,
        notification: &Notification,
    ) -> Result<(), AutomationError> {
        let Notification::CreationResult { result } = notification else {
            return Ok(());
        };

        let mut automation = self.automation.lock();
        if automation.phase != Phase::CreationPending {
            trace!(target: TARGET, session = %self.id, ?result, "Unsolicited creation result");
            return Ok(());
        }

        match result {
            CreationResult::Ok => {
                automation.created = true;
                automation.phase = Phase::Created;
                info!(target: TARGET, session = %self.id, "Character created");
            }
            CreationResult::NameAlreadyExists => {
                automation.name_attempts = automation.name_attempts.saturating_add(1);
                let attempts = automation.name_attempts;
                let max = self.preferences.creation().max_name_retries;
                if attempts > max {
                    automation.phase = Phase::Inactive;
                    drop(automation);
                    self.report("creation", &AutomationError::NameRetriesExhausted { attempts });
                    return Ok(());
                }
                drop(automation);

                warn!(target: TARGET, session = %self.id, attempts, "Name already taken, retrying");
                let delay = Duration::from_millis(self.settings.timing.name_retry_delay_ms);
                self.spawn_creation(Some(delay));
            }
            other => {
                automation.phase = Phase::Inactive;
                drop(automation);
                self.report("creation", &AutomationError::CreationRejected(*other));
            }
        }
        Ok(())
    }

    fn spawn_creation(self: &Arc<Self>, delay: Option<Duration>) {
        let generation = self.scope.generation();
        let settle = delay.map(|d| self.scope.settle(d));
        let core = Arc::clone(self);
        self.scope.spawn("creation", async move {
            let outcome = match settle {
                Some(settle) => match settle.await {
                    Ok(()) => core.run_creation(generation).await,
                    Err(err) => Err(err.into()),
                },
                None => core.run_creation(generation).await,
            };
            if let Err(err) = outcome {
                core.abort_creation(generation, &err);
            }
        });
    }

    async fn run_creation(&self, generation: u64) -> Result<(), AutomationError> {
        let prefs = self.preferences.creation();
        let breeds = if prefs.breed.is_some() {
            Vec::new()
        } else {
            self.data.breed_ids().await
        };
        let choice = {
            let mut rng = rand::rng();
            roll_choice(&prefs, &breeds, &mut rng)
        }?;

        let breed = self
            .data
            .breed(choice.breed)
            .await
            .ok_or_else(|| AutomationError::missing("breed", choice.breed))?;
        let cosmetic_id = breed.cosmetic_id(choice.sex, choice.head).ok_or_else(|| {
            AutomationError::missing("head", format!("{}/{:?}/{}", choice.breed, choice.sex, choice.head))
        })?;
        let colors = prefs
            .palette()
            .unwrap_or_else(|| breed.default_colors(choice.sex))
            .to_vec();

        let name = if let Some(name) = prefs.fixed_name() {
            name.to_owned()
        } else {
            let token = self.correlator.await_map(|event: &Event<Notification>| {
                match &event.payload {
                    Notification::NameSuggestion { suggestion } => Some(suggestion.clone()),
                    _ => None,
                }
            });
            self.sink.send(Command::CharacterNameSuggestionRequest);
            let suggestion = token.wait(self.settings.timing.wait_timeout()).await?;
            info!(target: TARGET, session = %self.id, name = %suggestion, "Received name suggestion");
            suggestion
        };

        self.scope
            .settle(Duration::from_millis(self.settings.timing.creation_settle_ms))
            .await?;

        let automation = self.automation.lock();
        if !self.scope.is_current(generation) || automation.phase != Phase::CreationPending {
            return Err(AutomationError::Cancelled);
        }
        info!(
            target: TARGET,
            session = %self.id,
            breed = %choice.breed,
            sex = ?choice.sex,
            head = choice.head,
            name = %name,
            "Requesting character creation"
        );
        self.sink.send(Command::CharacterCreation {
            name,
            breed: choice.breed,
            sex: choice.sex,
            colors,
            cosmetic_id,
        });
        drop(automation);
        Ok(())
    }

    fn abort_creation(&self, generation: u64, err: &AutomationError) {
        if !matches!(err, AutomationError::Cancelled) {
            let mut automation = self.automation.lock();
            if self.scope.is_current(generation) && automation.phase == Phase::CreationPending {
                automation.phase = Phase::Inactive;
            }
        }
        self.report("creation", err);
    }
}
