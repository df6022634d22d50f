//! Account sessions.
//!
//! An [`AccountSession`] owns everything one logged-in account needs: its
//! event bus, its correlation waiters, its task scope, the automation state,
//! and the live character. Sessions share nothing and can run in parallel.

use std::sync::Arc;

use autopilot_events::{Correlator, EventBus, PublishReport, TaskScope};
use autopilot_types::{BoostableStat, Notification, NotificationKind, SessionId, SpellId};
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::automation::{AutomationContext, AutomationState, Phase, SpendGuard};
use crate::character::CharacterState;
use crate::config::{BotConfig, ProgressionConfig, TimingConfig, TutorialConfig};
use crate::error::AutomationError;
use crate::preferences::PreferenceStore;
use crate::provider::GameDataProvider;
use crate::script::TutorialScript;
use crate::transport::CommandSink;

/// Session-wide settings taken from the configuration.
#[derive(Debug, Clone, Default)]
pub struct SessionSettings {
    /// Settling delays and the watchdog.
    pub timing: TimingConfig,
    /// Automatic point spending.
    pub progression: ProgressionConfig,
    /// Onboarding quest constants.
    pub tutorial: TutorialConfig,
}

impl SessionSettings {
    /// Extract the session settings from the full configuration.
    pub fn from_config(config: &BotConfig) -> Self {
        Self {
            timing: config.timing.clone(),
            progression: config.progression.clone(),
            tutorial: config.tutorial.clone(),
        }
    }
}

/// External collaborators of a session.
#[derive(Clone)]
pub struct Collaborators {
    /// Outbound command transport.
    pub sink: Arc<dyn CommandSink>,
    /// Reference data.
    pub data: Arc<dyn GameDataProvider>,
    /// Creation preferences and their one-shot flags.
    pub preferences: Arc<dyn PreferenceStore>,
}

/// State shared between the bus handlers and the tasks they spawn.
pub(crate) struct SessionCore {
    pub(crate) id: SessionId,
    pub(crate) account: String,
    pub(crate) settings: SessionSettings,
    pub(crate) script: TutorialScript,
    pub(crate) sink: Arc<dyn CommandSink>,
    pub(crate) data: Arc<dyn GameDataProvider>,
    pub(crate) preferences: Arc<dyn PreferenceStore>,
    pub(crate) correlator: Correlator<Notification>,
    pub(crate) scope: TaskScope,
    pub(crate) automation: Mutex<AutomationState>,
    pub(crate) character: RwLock<CharacterState>,
    pub(crate) spend_guard: Mutex<SpendGuard>,
}

impl SessionCore {
    /// Log a failed operation by kind.
    pub(crate) fn report(&self, task: &'static str, err: &AutomationError) {
        match err {
            AutomationError::Stalled { .. } => {
                warn!(session = %self.id, account = %self.account, task, error = %err, "Automation stalled");
            }
            AutomationError::Cancelled => {
                debug!(session = %self.id, task, "Operation cancelled by reset");
            }
            _ => {
                error!(session = %self.id, account = %self.account, task, error = %err, "Automation operation failed");
            }
        }
    }

    fn on_character_update(&self, notification: &Notification) -> Result<(), AutomationError> {
        self.character.write().apply(notification);
        Ok(())
    }
}

type Route = fn(&Arc<SessionCore>, &Notification) -> Result<(), AutomationError>;

/// One logged-in account.
pub struct AccountSession {
    core: Arc<SessionCore>,
    bus: EventBus<Notification>,
}

impl AccountSession {
    /// Build a session and register its subscriptions.
    ///
    /// Pending tasks are cancelled when `shutdown` is.
    pub fn new(
        account: impl Into<String>,
        settings: SessionSettings,
        collaborators: Collaborators,
        shutdown: &CancellationToken,
    ) -> Self {
        let id = SessionId::new();
        let account = account.into();
        let script = TutorialScript::standard(&settings.tutorial, &settings.timing);
        let core = Arc::new(SessionCore {
            id,
            scope: TaskScope::new(format!("{account}/{id}"), shutdown),
            account,
            settings,
            script,
            sink: collaborators.sink,
            data: collaborators.data,
            preferences: collaborators.preferences,
            correlator: Correlator::new(),
            automation: Mutex::new(AutomationState::default()),
            character: RwLock::new(CharacterState::default()),
            spend_guard: Mutex::new(SpendGuard::default()),
        });

        let bus = Self::subscriptions(&core);
        info!(session = %core.id, account = %core.account, "Account session created");
        Self { core, bus }
    }

    fn subscriptions(core: &Arc<SessionCore>) -> EventBus<Notification> {
        use NotificationKind as K;

        let character: Route = |core, n| core.on_character_update(n);
        let progression: Route = |core, n| {
            core.on_progression_ack(n);
            Ok(())
        };
        let follow_up: Route = |core, n| core.on_follow_up(n);

        let routes: [(K, &str, Route); 27] = [
            // Live character state first: later handlers read it.
            (K::CharacterSelected, "character", character),
            (K::StatsUpdated, "character", character),
            (K::LevelUp, "character", character),
            (K::SpellList, "character", character),
            (K::SpellUpgraded, "character", character),
            (K::MapChanged, "character", character),
            (K::MapMovement, "character", character),
            (K::FightStarting, "character", character),
            (K::FightPlacementPositions, "character", character),
            (K::EntitiesDisposition, "character", character),
            // Creation.
            (K::CharactersList, "creation", |core, n| core.on_characters_list(n)),
            (K::CreationResult, "creation", |core, n| core.on_creation_result(n)),
            // Onboarding.
            (K::QuestStarted, "tutorial", |core, n| core.on_quest_started(n)),
            (K::QuestStepInfo, "tutorial", |core, n| core.on_step_info(n)),
            (K::QuestStepValidated, "tutorial", |core, n| core.on_step_validated(n)),
            (K::QuestValidated, "tutorial", |core, n| core.on_quest_validated(n)),
            (K::MapMovement, "follow-up", follow_up),
            (K::FightStarting, "follow-up", follow_up),
            (K::EntitiesDisposition, "follow-up", follow_up),
            (K::SpellCast, "follow-up", follow_up),
            (K::ObjectEquipped, "follow-up", follow_up),
            (K::NpcQuestion, "follow-up", follow_up),
            (K::MapChanged, "follow-up", follow_up),
            // Opportunistic progression.
            (K::StatsUpdated, "progression", progression),
            (K::LevelUp, "progression", progression),
            (K::SpellList, "progression", progression),
            (K::SpellUpgraded, "progression", progression),
        ];

        let mut builder = EventBus::builder(core.correlator.clone());
        for (tag, name, route) in routes {
            let core = Arc::clone(core);
            builder = builder.subscribe_fn(tag, name, move |event| {
                route(&core, &event.payload)?;
                Ok(())
            });
        }
        builder.build()
    }

    /// Session identifier.
    pub fn id(&self) -> SessionId {
        self.core.id
    }

    /// Account login.
    pub fn account(&self) -> &str {
        &self.core.account
    }

    /// The session's event bus.
    pub const fn bus(&self) -> &EventBus<Notification> {
        &self.bus
    }

    /// Publish one inbound notification.
    pub fn publish(&self, notification: Notification) -> PublishReport<NotificationKind> {
        self.bus.publish(notification)
    }

    /// Publish notifications from `inbound` in arrival order until the
    /// channel closes or `shutdown` fires, then cancel pending tasks.
    pub async fn run(&self, mut inbound: mpsc::Receiver<Notification>, shutdown: CancellationToken) {
        info!(session = %self.core.id, account = %self.core.account, "Session running");
        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                next = inbound.recv() => match next {
                    Some(notification) => {
                        self.publish(notification);
                    }
                    None => break,
                },
            }
        }
        self.core.scope.shutdown();
        self.bus.cancel_waiters();
        info!(
            session = %self.core.id,
            account = %self.core.account,
            published = self.bus.published(),
            "Session stopped"
        );
    }

    /// Tear down all internal state: pending delays and correlation waits
    /// are cancelled and the automation starts over from `Inactive`.
    pub fn reset(&self) {
        let generation = self.core.scope.reset();
        let cancelled = self.bus.cancel_waiters();
        *self.core.automation.lock() = AutomationState::default();
        *self.core.character.write() = CharacterState::default();
        *self.core.spend_guard.lock() = SpendGuard::default();
        info!(
            session = %self.core.id,
            account = %self.core.account,
            generation,
            cancelled,
            "Session reset"
        );
    }

    /// Snapshot of the onboarding progress.
    pub fn context(&self) -> AutomationContext {
        self.core.automation.lock().context.clone()
    }

    /// Current automation phase.
    pub fn phase(&self) -> Phase {
        self.core.automation.lock().phase
    }

    /// Snapshot of the live character.
    pub fn character(&self) -> CharacterState {
        self.core.character.read().clone()
    }

    /// Spend stat points on `stat`. `increments == 0` spends as much as
    /// possible. Returns `false` when nothing is affordable.
    pub async fn boost_stat(&self, stat: BoostableStat, increments: u32) -> Result<bool, AutomationError> {
        self.core.boost_stat(stat, increments).await
    }

    /// Raise `spell` as far as spell points and `max_level` allow.
    /// Returns `false` when nothing was spent.
    pub async fn level_up_spell(&self, spell: SpellId, max_level: u8) -> Result<bool, AutomationError> {
        self.core.level_up_spell(spell, max_level).await
    }

    /// Whether one increment of `stat` is affordable right now.
    pub async fn can_boost_stat(&self, stat: BoostableStat) -> Result<bool, AutomationError> {
        self.core.can_boost_stat(stat).await
    }
}

impl Drop for AccountSession {
    fn drop(&mut self) {
        self.core.scope.shutdown();
    }
}

impl core::fmt::Debug for AccountSession {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AccountSession")
            .field("id", &self.core.id)
            .field("account", &self.core.account)
            .finish_non_exhaustive()
    }
}
