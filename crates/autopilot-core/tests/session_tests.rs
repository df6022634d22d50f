//! Integration tests for account sessions: character creation, the
//! onboarding script, reset semantics, and opportunistic progression.
//!
//! Every test runs on a paused clock, so settling delays elapse only when
//! the test sleeps past them.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use autopilot_core::{
    AccountSession, AutomationContext, AutomationError, ChannelSink, Collaborators,
    CreationConfig, InMemoryPreferences, Phase, PreferenceStore, SessionSettings, StaticGameData,
    TutorialConfig,
};
use autopilot_types::{
    BoostableStat, BreedId, CellId, CharacterId, CharacterSummary, Command, CosmeticId,
    CreationResult, EntityPosition, MapId, MapInfo, MapNpc, Notification, NpcId, ObjectiveId,
    QuestId, QuestObjective, QuestStep, Sex, SpellId, SpellLevel, StatsSnapshot, StepId,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const GAME_DATA: &str = r"
breeds:
  - id: 8
    name: Iop
    stat_costs:
      strength: [[0, 1], [10, 2], [20, 3]]
      vitality: [[0, 1]]
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

const OWN_ID: i64 = 42;

struct Harness {
    session: AccountSession,
    commands: mpsc::UnboundedReceiver<Command>,
    prefs: Arc<InMemoryPreferences>,
}

impl Harness {
    fn new(creation: CreationConfig, settings: SessionSettings) -> Self {
        let (sink, commands) = ChannelSink::new("tester");
        let prefs = Arc::new(InMemoryPreferences::new(creation));
        let collaborators = Collaborators {
            sink: Arc::new(sink),
            data: Arc::new(StaticGameData::parse(GAME_DATA).unwrap()),
            preferences: Arc::clone(&prefs) as Arc<dyn PreferenceStore>,
        };
        let session = AccountSession::new(
            "tester",
            settings,
            collaborators,
            &CancellationToken::new(),
        );
        Self {
            session,
            commands,
            prefs,
        }
    }

    fn publish(&self, notification: Notification) {
        self.session.publish(notification);
    }

    fn drain(&mut self) -> Vec<Command> {
        let mut out = Vec::new();
        while let Ok(command) = self.commands.try_recv() {
            out.push(command);
        }
        out
    }
}

async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

fn creation(name: Option<&str>) -> CreationConfig {
    CreationConfig {
        create: true,
        complete_tutorial: true,
        breed: Some(BreedId::new(8)),
        sex: Some(Sex::Male),
        head: Some(0),
        name: name.map(str::to_owned),
        ..CreationConfig::default()
    }
}

fn summary() -> CharacterSummary {
    CharacterSummary {
        id: CharacterId::new(OWN_ID),
        name: "Hero".to_owned(),
        level: 1,
        breed: BreedId::new(8),
        sex: Sex::Male,
    }
}

fn roster(characters: Vec<CharacterSummary>) -> Notification {
    Notification::CharactersList { characters }
}

fn step_info(step_id: u32) -> Notification {
    Notification::QuestStepInfo {
        step: QuestStep {
            quest_id: QuestId::new(1461),
            step_id: StepId::new(step_id),
            objectives: vec![
                QuestObjective {
                    objective_id: ObjectiveId::new(step_id * 10),
                    open: true,
                },
                QuestObjective {
                    objective_id: ObjectiveId::new(step_id * 10 + 1),
                    open: false,
                },
            ],
        },
    }
}

fn validations(commands: &[Command]) -> Vec<ObjectiveId> {
    commands
        .iter()
        .filter_map(|c| match c {
            Command::QuestObjectiveValidation { objective_id, .. } => Some(*objective_id),
            _ => None,
        })
        .collect()
}

fn created_names(commands: &[Command]) -> Vec<String> {
    commands
        .iter()
        .filter_map(|c| match c {
            Command::CharacterCreation { name, .. } => Some(name.clone()),
            _ => None,
        })
        .collect()
}

/// Create and select a character, then start the onboarding quest.
async fn onboarding(settings: SessionSettings) -> Harness {
    let mut h = Harness::new(creation(Some("Hero")), settings);
    h.publish(roster(Vec::new()));
    advance(1100).await;
    h.publish(Notification::CreationResult {
        result: CreationResult::Ok,
    });
    h.publish(roster(vec![summary()]));
    h.publish(Notification::CharacterSelected {
        character: summary(),
    });
    h.publish(Notification::QuestStarted {
        quest_id: QuestId::new(1461),
    });
    h.drain();
    assert_eq!(h.session.phase(), Phase::TutorialActive);
    h
}

/// Enter steps `1..=last` in quick succession; only the last one's action
/// survives the settling delay.
fn reach_step(h: &Harness, last: u32) {
    for id in 1..=last {
        h.publish(step_info(id));
    }
    assert_eq!(h.session.context().step_number, last);
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn creation_with_configured_name_waits_for_settle() {
    let mut h = Harness::new(creation(Some("Hero")), SessionSettings::default());

    h.publish(roster(Vec::new()));
    assert_eq!(h.session.phase(), Phase::CreationPending);

    advance(500).await;
    assert!(h.drain().is_empty());

    advance(600).await;
    assert_eq!(
        h.drain(),
        vec![Command::CharacterCreation {
            name: "Hero".to_owned(),
            breed: BreedId::new(8),
            sex: Sex::Male,
            colors: vec![1, 2, 3, 4, 5],
            cosmetic_id: CosmeticId::new(57),
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn configured_palette_overrides_breed_colors() {
    let prefs = CreationConfig {
        colors: vec![11, 12, 13, 14, 15],
        sex: Some(Sex::Female),
        ..creation(Some("Hero"))
    };
    let mut h = Harness::new(prefs, SessionSettings::default());
    h.publish(roster(Vec::new()));
    advance(1100).await;

    match h.drain().as_slice() {
        [Command::CharacterCreation {
            colors,
            cosmetic_id,
            ..
        }] => {
            assert_eq!(colors, &vec![11, 12, 13, 14, 15]);
            assert_eq!(*cosmetic_id, CosmeticId::new(65));
        }
        other => panic!("unexpected commands {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn created_character_is_selected_on_next_roster() {
    let mut h = Harness::new(creation(Some("Hero")), SessionSettings::default());
    h.publish(roster(Vec::new()));
    advance(1100).await;
    h.drain();

    h.publish(Notification::CreationResult {
        result: CreationResult::Ok,
    });
    assert_eq!(h.session.phase(), Phase::Created);

    h.publish(roster(vec![summary()]));
    assert_eq!(
        h.drain(),
        vec![Command::CharacterFirstSelection {
            character_id: CharacterId::new(OWN_ID),
            do_tutorial: true,
        }]
    );
    assert!(!h.prefs.creation().create);

    // The flag is cleared, so later rosters are left alone.
    h.publish(roster(vec![summary()]));
    advance(2000).await;
    assert!(h.drain().is_empty());
}

#[tokio::test(start_paused = true)]
async fn name_collision_requests_a_fresh_suggestion() {
    let mut h = Harness::new(creation(None), SessionSettings::default());

    h.publish(roster(Vec::new()));
    advance(10).await;
    assert_eq!(h.drain(), vec![Command::CharacterNameSuggestionRequest]);

    h.publish(Notification::NameSuggestion {
        suggestion: "Foo".to_owned(),
    });
    advance(1100).await;
    assert_eq!(created_names(&h.drain()), vec!["Foo".to_owned()]);

    h.publish(Notification::CreationResult {
        result: CreationResult::NameAlreadyExists,
    });
    assert_eq!(h.session.phase(), Phase::CreationPending);
    advance(1100).await;
    assert_eq!(h.drain(), vec![Command::CharacterNameSuggestionRequest]);

    h.publish(Notification::NameSuggestion {
        suggestion: "Bar".to_owned(),
    });
    advance(1100).await;
    let after_retry = h.drain();
    assert_eq!(created_names(&after_retry), vec!["Bar".to_owned()]);
}

#[tokio::test(start_paused = true)]
async fn roster_during_pending_creation_is_ignored() {
    let mut h = Harness::new(creation(None), SessionSettings::default());
    h.publish(roster(Vec::new()));
    h.publish(roster(Vec::new()));
    advance(10).await;
    assert_eq!(h.drain(), vec![Command::CharacterNameSuggestionRequest]);
}

#[tokio::test(start_paused = true)]
async fn name_retries_are_bounded() {
    let prefs = CreationConfig {
        max_name_retries: 1,
        ..creation(Some("Taken"))
    };
    let mut h = Harness::new(prefs, SessionSettings::default());
    h.publish(roster(Vec::new()));
    advance(1100).await;

    h.publish(Notification::CreationResult {
        result: CreationResult::NameAlreadyExists,
    });
    advance(2200).await;
    assert_eq!(created_names(&h.drain()).len(), 2);

    h.publish(Notification::CreationResult {
        result: CreationResult::NameAlreadyExists,
    });
    assert_eq!(h.session.phase(), Phase::Inactive);
    advance(5000).await;
    assert!(h.drain().is_empty());
}

#[tokio::test(start_paused = true)]
async fn other_rejection_halts_creation() {
    let mut h = Harness::new(creation(Some("Hero")), SessionSettings::default());
    h.publish(roster(Vec::new()));
    advance(1100).await;
    h.drain();

    h.publish(Notification::CreationResult {
        result: CreationResult::TooManyCharacters,
    });
    assert_eq!(h.session.phase(), Phase::Inactive);
    advance(5000).await;
    assert!(h.drain().is_empty());
}

#[tokio::test(start_paused = true)]
async fn missing_breed_aborts_creation() {
    let prefs = CreationConfig {
        breed: Some(BreedId::new(99)),
        ..creation(Some("Hero"))
    };
    let mut h = Harness::new(prefs, SessionSettings::default());
    h.publish(roster(Vec::new()));
    advance(2000).await;

    assert!(h.drain().is_empty());
    assert_eq!(h.session.phase(), Phase::Inactive);
}

#[tokio::test(start_paused = true)]
async fn watchdog_stalls_unanswered_suggestion() {
    let mut settings = SessionSettings::default();
    settings.timing.wait_timeout_ms = 3000;
    let mut h = Harness::new(creation(None), settings);

    h.publish(roster(Vec::new()));
    advance(3500).await;
    assert_eq!(h.drain(), vec![Command::CharacterNameSuggestionRequest]);
    assert_eq!(h.session.phase(), Phase::Inactive);

    // A late reply no longer creates anything.
    h.publish(Notification::NameSuggestion {
        suggestion: "Late".to_owned(),
    });
    advance(2000).await;
    assert!(h.drain().is_empty());
}

#[tokio::test(start_paused = true)]
async fn independent_events_during_pending_wait_commute() {
    let stats = Notification::StatsUpdated {
        stats: StatsSnapshot {
            stats_points: 5,
            spells_points: 1,
            bases: BTreeMap::new(),
        },
    };
    let map = Notification::MapChanged {
        map: MapInfo {
            map_id: MapId::new(7),
            actors: Vec::new(),
            monster_groups: vec![CellId::new(3)],
            npcs: Vec::new(),
        },
    };

    let mut a = Harness::new(creation(None), SessionSettings::default());
    let mut b = Harness::new(creation(None), SessionSettings::default());
    for h in [&a, &b] {
        h.publish(roster(Vec::new()));
        h.publish(Notification::CharacterSelected {
            character: summary(),
        });
    }
    advance(10).await;

    a.publish(stats.clone());
    a.publish(map.clone());
    b.publish(map);
    b.publish(stats);

    for h in [&a, &b] {
        h.publish(Notification::NameSuggestion {
            suggestion: "Foo".to_owned(),
        });
    }
    advance(1100).await;

    assert_eq!(a.session.context(), b.session.context());
    assert_eq!(a.session.phase(), b.session.phase());
    assert_eq!(a.session.character(), b.session.character());
    assert_eq!(created_names(&a.drain()), created_names(&b.drain()));
}

// ---------------------------------------------------------------------------
// Onboarding
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn quest_start_requests_step_info() {
    let mut h = Harness::new(creation(Some("Hero")), SessionSettings::default());
    h.publish(roster(Vec::new()));
    advance(1100).await;
    h.publish(Notification::CreationResult {
        result: CreationResult::Ok,
    });
    h.drain();

    h.publish(Notification::QuestStarted {
        quest_id: QuestId::new(1461),
    });
    assert_eq!(
        h.drain(),
        vec![Command::QuestStepInfoRequest {
            quest_id: QuestId::new(1461)
        }]
    );
    assert!(h.session.context().active);
}

#[tokio::test(start_paused = true)]
async fn quest_start_without_creation_is_ignored() {
    let mut h = Harness::new(creation(Some("Hero")), SessionSettings::default());
    h.publish(Notification::QuestStarted {
        quest_id: QuestId::new(1461),
    });
    assert!(h.drain().is_empty());
    assert_eq!(h.session.context(), AutomationContext::default());
}

#[tokio::test(start_paused = true)]
async fn duplicate_step_info_advances_once() {
    let mut h = onboarding(SessionSettings::default()).await;

    for _ in 0..3 {
        h.publish(step_info(1));
    }
    let context = h.session.context();
    assert_eq!(context.step_number, 1);
    assert_eq!(context.last_step_id, Some(StepId::new(1)));

    advance(1900).await;
    assert!(h.drain().is_empty());
    advance(200).await;
    assert_eq!(
        h.drain(),
        vec![Command::MoveToCell {
            cell: CellId::new(259)
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn own_movement_validates_open_objectives() {
    let mut h = onboarding(SessionSettings::default()).await;
    reach_step(&h, 1);
    advance(2100).await;
    h.drain();

    h.publish(Notification::MapMovement {
        actor_id: CharacterId::new(7),
        destination: CellId::new(259),
    });
    h.publish(Notification::FightStarting);
    assert!(h.drain().is_empty());

    h.publish(Notification::MapMovement {
        actor_id: CharacterId::new(OWN_ID),
        destination: CellId::new(259),
    });
    assert_eq!(validations(&h.drain()), vec![ObjectiveId::new(10)]);

    h.publish(Notification::QuestStepValidated {
        quest_id: QuestId::new(1461),
        step_id: StepId::new(1),
    });
    assert_eq!(
        h.drain(),
        vec![Command::QuestStepInfoRequest {
            quest_id: QuestId::new(1461)
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn npc_step_talks_and_replies_with_first_option() {
    let mut h = onboarding(SessionSettings::default()).await;
    h.publish(Notification::MapChanged {
        map: MapInfo {
            map_id: MapId::new(1),
            actors: Vec::new(),
            monster_groups: Vec::new(),
            npcs: vec![MapNpc {
                id: NpcId::new(-1),
                actions: vec![3],
            }],
        },
    });
    reach_step(&h, 2);
    advance(2100).await;
    assert_eq!(
        h.drain(),
        vec![Command::NpcGenericAction {
            npc_id: NpcId::new(-1),
            action_id: 3,
            map_id: MapId::new(1),
        }]
    );

    h.publish(Notification::NpcQuestion {
        visible_replies: vec![25, 26],
    });
    assert_eq!(h.drain(), vec![Command::NpcReply { reply_id: 25 }]);
}

#[tokio::test(start_paused = true)]
async fn placement_step_validates_then_signals_ready() {
    let mut h = onboarding(SessionSettings::default()).await;
    h.publish(Notification::FightPlacementPositions {
        challenger_cells: vec![CellId::new(300), CellId::new(301)],
        own_cell: Some(CellId::new(300)),
    });
    reach_step(&h, 6);
    advance(2100).await;
    assert_eq!(
        h.drain(),
        vec![Command::FightPlacementPosition {
            cell: CellId::new(301)
        }]
    );

    h.publish(Notification::EntitiesDisposition {
        positions: vec![EntityPosition {
            entity_id: CharacterId::new(OWN_ID),
            cell: CellId::new(301),
        }],
    });
    assert_eq!(validations(&h.drain()), vec![ObjectiveId::new(60)]);

    advance(1100).await;
    assert_eq!(h.drain(), vec![Command::FightReady]);
}

#[tokio::test(start_paused = true)]
async fn redelivered_disposition_validates_and_readies_once() {
    let mut h = onboarding(SessionSettings::default()).await;
    h.publish(Notification::FightPlacementPositions {
        challenger_cells: vec![CellId::new(300), CellId::new(301)],
        own_cell: Some(CellId::new(300)),
    });
    reach_step(&h, 6);
    advance(2100).await;
    h.drain();

    let disposition = Notification::EntitiesDisposition {
        positions: vec![EntityPosition {
            entity_id: CharacterId::new(OWN_ID),
            cell: CellId::new(301),
        }],
    };
    h.publish(disposition.clone());
    h.publish(disposition);
    advance(1100).await;

    let commands = h.drain();
    assert_eq!(validations(&commands), vec![ObjectiveId::new(60)]);
    assert_eq!(
        commands
            .iter()
            .filter(|c| **c == Command::FightReady)
            .count(),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn follow_ups_fire_again_on_the_next_step() {
    let mut h = onboarding(SessionSettings::default()).await;
    reach_step(&h, 1);
    let moved = Notification::MapMovement {
        actor_id: CharacterId::new(OWN_ID),
        destination: CellId::new(259),
    };
    h.publish(moved.clone());
    h.publish(moved.clone());
    assert_eq!(validations(&h.drain()), vec![ObjectiveId::new(10)]);

    // Step 7 completes on the same kind of event.
    for id in 2..=7 {
        h.publish(step_info(id));
    }
    h.publish(moved);
    assert_eq!(validations(&h.drain()), vec![ObjectiveId::new(70)]);
}

#[tokio::test(start_paused = true)]
async fn equip_batch_validates_after_last_item() {
    let tutorial = TutorialConfig::default();
    let mut h = onboarding(SessionSettings::default()).await;
    reach_step(&h, 11);
    advance(2100).await;

    // Earlier steps were superseded before their delay elapsed.
    assert_eq!(
        h.drain(),
        vec![Command::EquipItem {
            gid: tutorial.batch_items[0]
        }]
    );

    let last = tutorial.batch_items.len() - 1;
    for (index, gid) in tutorial.batch_items.iter().enumerate() {
        // An item other than the expected one does nothing.
        h.publish(Notification::ObjectEquipped {
            gid: tutorial.hat_item,
        });
        h.publish(Notification::ObjectEquipped { gid: *gid });
        if index == last {
            assert_eq!(validations(&h.drain()), vec![ObjectiveId::new(110)]);
        } else {
            assert!(h.drain().is_empty());
            advance(700).await;
            assert_eq!(
                h.drain(),
                vec![Command::EquipItem {
                    gid: tutorial.batch_items[index + 1]
                }]
            );
        }
    }
    assert_eq!(
        h.session.context().batch_cursor,
        u32::try_from(tutorial.batch_items.len()).unwrap()
    );
}

#[tokio::test(start_paused = true)]
async fn final_map_equips_hat_then_talks() {
    let tutorial = TutorialConfig::default();
    let mut h = onboarding(SessionSettings::default()).await;
    reach_step(&h, 14);
    advance(2100).await;
    h.drain();

    h.publish(Notification::MapChanged {
        map: MapInfo {
            map_id: tutorial.map_third_after_fight,
            actors: Vec::new(),
            monster_groups: Vec::new(),
            npcs: vec![MapNpc {
                id: NpcId::new(-3),
                actions: vec![3],
            }],
        },
    });
    advance(1300).await;
    assert_eq!(
        h.drain(),
        vec![Command::EquipItem {
            gid: tutorial.hat_item
        }]
    );
    advance(500).await;
    assert_eq!(
        h.drain(),
        vec![Command::NpcGenericAction {
            npc_id: NpcId::new(-3),
            action_id: 3,
            map_id: tutorial.map_third_after_fight,
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn redelivered_map_entry_runs_actions_once() {
    let tutorial = TutorialConfig::default();
    let mut h = onboarding(SessionSettings::default()).await;
    reach_step(&h, 14);
    advance(2100).await;
    h.drain();

    let entered = Notification::MapChanged {
        map: MapInfo {
            map_id: tutorial.map_third_after_fight,
            actors: Vec::new(),
            monster_groups: Vec::new(),
            npcs: vec![MapNpc {
                id: NpcId::new(-3),
                actions: vec![3],
            }],
        },
    };
    h.publish(entered.clone());
    advance(300).await;
    h.publish(entered);
    advance(3000).await;

    let commands = h.drain();
    assert_eq!(
        commands
            .iter()
            .filter(|c| matches!(c, Command::EquipItem { .. }))
            .count(),
        1
    );
    assert_eq!(
        commands
            .iter()
            .filter(|c| matches!(c, Command::NpcGenericAction { .. }))
            .count(),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn quest_validation_deactivates_and_clears_flag() {
    let mut h = onboarding(SessionSettings::default()).await;
    reach_step(&h, 3);

    h.publish(Notification::QuestValidated {
        quest_id: QuestId::new(1461),
    });
    assert_eq!(h.session.phase(), Phase::Inactive);
    assert_eq!(h.session.context(), AutomationContext::default());
    assert!(!h.prefs.creation().complete_tutorial);

    // The pending step action is now stale.
    advance(3000).await;
    assert!(h.drain().is_empty());
}

#[tokio::test(start_paused = true)]
async fn reset_cancels_pending_step_action() {
    let mut h = onboarding(SessionSettings::default()).await;
    h.publish(step_info(1));
    advance(500).await;

    h.session.reset();
    assert_eq!(h.session.phase(), Phase::Inactive);
    assert_eq!(h.session.context(), AutomationContext::default());

    advance(5000).await;
    assert!(h.drain().is_empty());

    // Step info after reset is ignored: the tutorial is no longer active.
    h.publish(step_info(2));
    assert_eq!(h.session.context().step_number, 0);
}

#[tokio::test(start_paused = true)]
async fn reset_cancels_pending_name_suggestion() {
    let mut h = Harness::new(creation(None), SessionSettings::default());
    h.publish(roster(Vec::new()));
    advance(10).await;
    h.drain();

    h.session.reset();
    h.publish(Notification::NameSuggestion {
        suggestion: "Foo".to_owned(),
    });
    advance(3000).await;
    assert!(h.drain().is_empty());
    assert_eq!(h.session.bus().correlator().pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn run_publishes_in_arrival_order_until_closed() {
    let mut h = Harness::new(creation(Some("Hero")), SessionSettings::default());
    let (tx, rx) = mpsc::channel(8);
    tx.send(roster(Vec::new())).await.unwrap();
    tx.send(Notification::CharacterSelected {
        character: summary(),
    })
    .await
    .unwrap();
    drop(tx);

    h.session.run(rx, CancellationToken::new()).await;
    assert_eq!(h.session.bus().published(), 2);
    assert_eq!(h.session.character().id, Some(CharacterId::new(OWN_ID)));

    // Leaving the loop shuts the scope down, so the pending creation never fires.
    advance(2000).await;
    assert!(h.drain().is_empty());
}

// ---------------------------------------------------------------------------
// Progression
// ---------------------------------------------------------------------------

fn stats(points: u32, strength: u32) -> Notification {
    Notification::StatsUpdated {
        stats: StatsSnapshot {
            stats_points: points,
            spells_points: 0,
            bases: BTreeMap::from([(BoostableStat::Strength, strength)]),
        },
    }
}

#[tokio::test(start_paused = true)]
async fn auto_boost_spends_once_per_acknowledgement() {
    let mut settings = SessionSettings::default();
    settings.progression.auto_boost_stat = Some(BoostableStat::Strength);
    let mut h = Harness::new(CreationConfig::default(), settings);
    h.publish(Notification::CharacterSelected {
        character: summary(),
    });

    h.publish(stats(5, 15));
    advance(10).await;
    assert_eq!(
        h.drain(),
        vec![Command::StatsUpgrade {
            stat: BoostableStat::Strength,
            boost_points: 4,
        }]
    );

    // Re-delivered acknowledgement: nothing new to spend.
    h.publish(stats(5, 15));
    advance(10).await;
    assert!(h.drain().is_empty());

    // Authoritative update after the spend: one point left at cost 2.
    h.publish(stats(1, 17));
    advance(10).await;
    assert!(h.drain().is_empty());
}

#[tokio::test(start_paused = true)]
async fn explicit_boost_reports_underfunding() {
    let mut h = Harness::new(CreationConfig::default(), SessionSettings::default());
    h.publish(Notification::CharacterSelected {
        character: summary(),
    });
    h.publish(stats(2, 25));

    assert!(!h.session.can_boost_stat(BoostableStat::Strength).await.unwrap());
    assert!(!h.session.boost_stat(BoostableStat::Strength, 1).await.unwrap());
    assert!(h.drain().is_empty());

    h.publish(stats(7, 25));
    assert!(h.session.boost_stat(BoostableStat::Strength, 1).await.unwrap());
    assert_eq!(
        h.drain(),
        vec![Command::StatsUpgrade {
            stat: BoostableStat::Strength,
            boost_points: 3,
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn boost_without_cost_table_is_a_reference_miss() {
    let mut h = Harness::new(CreationConfig::default(), SessionSettings::default());
    h.publish(Notification::CharacterSelected {
        character: summary(),
    });
    h.publish(stats(10, 0));

    let err = h
        .session
        .boost_stat(BoostableStat::Wisdom, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, AutomationError::MissingReference { .. }));
    assert!(h.drain().is_empty());

    let mut fresh = Harness::new(CreationConfig::default(), SessionSettings::default());
    assert!(matches!(
        fresh.session.boost_stat(BoostableStat::Strength, 0).await,
        Err(AutomationError::NoCharacter)
    ));
    assert!(fresh.drain().is_empty());
}

#[tokio::test(start_paused = true)]
async fn spell_leveling_respects_budget_and_cap() {
    let mut h = Harness::new(CreationConfig::default(), SessionSettings::default());
    h.publish(Notification::CharacterSelected {
        character: summary(),
    });
    h.publish(Notification::SpellList {
        spells: vec![SpellLevel {
            spell_id: SpellId::new(161),
            level: 0,
        }],
    });
    h.publish(Notification::StatsUpdated {
        stats: StatsSnapshot {
            stats_points: 0,
            spells_points: 6,
            bases: BTreeMap::new(),
        },
    });

    assert!(h.session.level_up_spell(SpellId::new(161), 6).await.unwrap());
    assert_eq!(
        h.drain(),
        vec![Command::SpellUpgrade {
            spell_id: SpellId::new(161),
            spell_level: 3,
        }]
    );

    assert!(!h.session.level_up_spell(SpellId::new(0), 6).await.unwrap());
    assert!(!h.session.level_up_spell(SpellId::new(999), 6).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn spell_without_reference_data_is_a_reference_miss() {
    let mut h = Harness::new(CreationConfig::default(), SessionSettings::default());
    h.publish(Notification::CharacterSelected {
        character: summary(),
    });
    h.publish(Notification::SpellList {
        spells: vec![SpellLevel {
            spell_id: SpellId::new(173),
            level: 1,
        }],
    });
    h.publish(Notification::StatsUpdated {
        stats: StatsSnapshot {
            stats_points: 0,
            spells_points: 3,
            bases: BTreeMap::new(),
        },
    });

    let err = h
        .session
        .level_up_spell(SpellId::new(173), 6)
        .await
        .unwrap_err();
    assert!(matches!(err, AutomationError::MissingReference { .. }));
    assert!(h.drain().is_empty());
}

#[tokio::test(start_paused = true)]
async fn level_up_unlocks_final_spell_level() {
    let mut settings = SessionSettings::default();
    settings.progression.auto_spells = vec![SpellId::new(161)];
    let mut h = Harness::new(CreationConfig::default(), settings);
    h.publish(Notification::CharacterSelected {
        character: summary(),
    });
    h.publish(Notification::SpellList {
        spells: vec![SpellLevel {
            spell_id: SpellId::new(161),
            level: 5,
        }],
    });
    h.publish(Notification::StatsUpdated {
        stats: StatsSnapshot {
            stats_points: 0,
            spells_points: 6,
            bases: BTreeMap::new(),
        },
    });
    advance(10).await;
    // Level 1 is below the final-level requirement.
    assert!(h.drain().is_empty());

    h.publish(Notification::LevelUp { new_level: 101 });
    advance(10).await;
    assert_eq!(
        h.drain(),
        vec![Command::SpellUpgrade {
            spell_id: SpellId::new(161),
            spell_level: 6,
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn auto_spells_level_first_affordable_spell() {
    let mut settings = SessionSettings::default();
    settings.progression.auto_spells = vec![SpellId::new(161)];
    let mut h = Harness::new(CreationConfig::default(), settings);
    h.publish(Notification::CharacterSelected {
        character: summary(),
    });
    h.publish(Notification::SpellList {
        spells: vec![SpellLevel {
            spell_id: SpellId::new(161),
            level: 1,
        }],
    });
    h.publish(Notification::StatsUpdated {
        stats: StatsSnapshot {
            stats_points: 0,
            spells_points: 2,
            bases: BTreeMap::new(),
        },
    });
    advance(10).await;
    assert_eq!(
        h.drain(),
        vec![Command::SpellUpgrade {
            spell_id: SpellId::new(161),
            spell_level: 2,
        }]
    );
}
