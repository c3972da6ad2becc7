//! Headless integration tests for Tallgrass.
//!
//! These tests exercise the game's ECS logic without a window or GPU.
//! They use Bevy's `MinimalPlugins` to tick the app, register only the
//! pure-logic plugins (skipping all rendering/UI), and drive the
//! overworld → battle → overworld loop the way a player would.
//!
//! Run with: `cargo test --test headless`

use std::path::PathBuf;
use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use tallgrass::bag::Bag;
use tallgrass::battle::state::{ActionOutcome, TurnPhase};
use tallgrass::battle::{ActiveBattle, BattlePlugin};
use tallgrass::data::DataPlugin;
use tallgrass::encounter::trainer::MAX_CHALLENGE_DISTANCE;
use tallgrass::encounter::{EncounterPlugin, TrainerTarget};
use tallgrass::save::{read_save, LoadRequestEvent, SaveReason, SaveRequestEvent, SavePlugin};
use tallgrass::scene::{BattleEntry, GameSession, ScenePlugin, SceneQueue, SceneRequest};
use tallgrass::settings::GameSettings;
use tallgrass::shared::*;
use tallgrass::world::WorldState;

// ─────────────────────────────────────────────────────────────────────────────
// Test App Builder
// ─────────────────────────────────────────────────────────────────────────────

/// A save path no other test touches.
fn temp_save_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("tallgrass-headless-{}-{}", name, std::process::id()))
        .join("game0.json")
}

fn cleanup(path: &PathBuf) {
    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}

/// Builds a minimal Bevy app with the scene, battle, encounter and save
/// plugins but NO rendering, windowing, input devices or asset loading.
/// `PlayerInput` is written by the tests directly.
fn build_test_app(save_path: &PathBuf) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)));

    // ── Game State ───────────────────────────────────────────────────────
    app.init_state::<GameState>();

    // ── Shared Resources (mirrors main.rs and the skipped plugins) ───────
    app.insert_resource(GameSettings {
        save_path: save_path.to_string_lossy().into_owned(),
        enemy_turn_delay: 0.25,
        ..Default::default()
    })
    .init_resource::<Bag>()
    .init_resource::<PlayerState>()
    .init_resource::<PlayerInput>()
    .insert_resource(WorldState::new(MapId::Town));

    // ── Shared Events (mirrors main.rs) ──────────────────────────────────
    app.add_event::<MapTransitionEvent>()
        .add_event::<PlaySfxEvent>()
        .add_event::<PlayMusicEvent>()
        .add_event::<ToastEvent>();

    app.configure_sets(
        Update,
        (
            OverworldSet::Movement,
            OverworldSet::World,
            OverworldSet::Encounter,
        )
            .chain(),
    );

    app.add_plugins(ScenePlugin)
        .add_plugins(BattlePlugin)
        .add_plugins(EncounterPlugin)
        .add_plugins(SavePlugin);

    app
}

/// Moves the app into `state` and ticks once to process it.
fn enter_state(app: &mut App, state: GameState) {
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(state);
    app.update();
}

fn current_state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

/// Holds `input` for exactly one frame.
fn press(app: &mut App, input: PlayerInput) {
    app.insert_resource(input);
    app.update();
    app.insert_resource(PlayerInput::default());
}

fn bag_with_placeholder() -> Bag {
    Bag::new(
        vec![Monster::placeholder_player()],
        vec![ItemStack::new(CATCH_ITEM, 3, "ingame_ui/ball.png")],
    )
}

/// Queue a wild battle against the placeholder enemy and enter it.
fn start_wild_battle(app: &mut App) {
    let bag = app.world().resource::<Bag>().clone();
    let player = bag.active_slot().map(|s| (s, bag.monsters[s].clone()));
    let source = EncounterSource::Bush { index: 0 };
    let entry = BattleEntry::new(player, Some(Monster::placeholder_enemy()), true, source);

    assert!(app
        .world_mut()
        .resource_mut::<GameSession>()
        .begin_battle(source));
    assert!(app
        .world_mut()
        .resource_mut::<SceneQueue>()
        .request(SceneRequest::Battle(entry)));

    // Last applies the queue, the next frame runs the transition.
    app.update();
    app.update();
    assert_eq!(current_state(app), GameState::Battle);
}

fn battle_phase(app: &App) -> TurnPhase {
    app.world().resource::<ActiveBattle>().0.phase
}

/// Ticks until the enemy has acted.
fn wait_for_player_turn(app: &mut App) {
    for _ in 0..20 {
        if battle_phase(app) != TurnPhase::EnemyTurn {
            return;
        }
        app.update();
    }
    panic!("enemy never took its turn");
}

/// SPACE on the finished battle, then the two frames of the scene change.
fn leave_battle(app: &mut App) {
    press(
        app,
        PlayerInput {
            interact: true,
            ..Default::default()
        },
    );
    app.update();
    assert_eq!(current_state(app), GameState::Overworld);
}

// ─────────────────────────────────────────────────────────────────────────────
// Boot
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_headless_boot_without_save_starts_new_game() {
    let path = temp_save_path("boot");
    cleanup(&path);
    let mut app = build_test_app(&path);
    app.add_plugins(DataPlugin);

    // First update enters Loading and sets up the game; second applies NextState.
    app.update();
    app.update();

    assert_eq!(current_state(&app), GameState::Overworld);
    let bag = app.world().resource::<Bag>();
    assert_eq!(bag.monsters.len(), 1);
    assert_eq!(bag.get_item(CATCH_ITEM).map(|i| i.count), Some(5));

    let world = app.world().resource::<WorldState>();
    assert_eq!(world.current_map(), MapId::Town);
    let (sx, sy) = world.map.spawn;
    assert_eq!(
        app.world().resource::<PlayerState>().position,
        tile_to_world(sx, sy)
    );
    cleanup(&path);
}

// ─────────────────────────────────────────────────────────────────────────────
// Wild battle, end to end
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_wild_battle_win_writes_result_and_autosaves() {
    let path = temp_save_path("wild-win");
    cleanup(&path);
    let mut app = build_test_app(&path);
    app.insert_resource(bag_with_placeholder());
    enter_state(&mut app, GameState::Overworld);
    start_wild_battle(&mut app);

    press(
        &mut app,
        PlayerInput {
            battle_attack: true,
            ..Default::default()
        },
    );
    // 60 atk against 15 def.
    assert_eq!(app.world().resource::<ActiveBattle>().0.enemy.hp, 27);
    assert_eq!(battle_phase(&app), TurnPhase::EnemyTurn);

    wait_for_player_turn(&mut app);
    // 70 atk against 15 def, applied to the roster entry itself.
    assert_eq!(app.world().resource::<Bag>().monsters[0].hp, 37);

    press(
        &mut app,
        PlayerInput {
            battle_attack: true,
            ..Default::default()
        },
    );
    {
        let battle = &app.world().resource::<ActiveBattle>().0;
        assert_eq!(battle.enemy.hp, 0);
        assert_eq!(battle.result, Some(BattleResult::Win));
    }

    leave_battle(&mut app);

    let session = app.world().resource::<GameSession>();
    assert!(!session.in_battle(), "guard is released after the battle");
    assert_eq!(
        session.last_battle_result, None,
        "the overworld consumes the result on entry"
    );
    assert!(app.world().get_resource::<ActiveBattle>().is_none());

    // The autosave requested on entry has been written.
    app.update();
    let saved = read_save(&path).expect("autosave should exist");
    assert_eq!(saved.bag.monsters[0].hp, 37);
    assert_eq!(saved.last_battle_result, None);
    cleanup(&path);
}

#[test]
fn test_battle_result_is_consumed_exactly_once() {
    let path = temp_save_path("consume-once");
    cleanup(&path);
    let mut app = build_test_app(&path);
    app.world_mut()
        .resource_mut::<GameSession>()
        .last_battle_result = Some(BattleResult::Lose);

    enter_state(&mut app, GameState::Overworld);
    app.update();
    assert_eq!(
        app.world().resource::<GameSession>().last_battle_result,
        None
    );
    assert!(path.exists(), "consuming a result autosaves");

    // No further autosaves without a new result.
    std::fs::remove_file(&path).expect("remove autosave");
    for _ in 0..5 {
        app.update();
    }
    assert!(!path.exists());
    cleanup(&path);
}

#[test]
fn test_catch_adds_monster_and_ends_battle() {
    let path = temp_save_path("catch");
    cleanup(&path);
    let mut app = build_test_app(&path);
    app.insert_resource(bag_with_placeholder());
    enter_state(&mut app, GameState::Overworld);
    start_wild_battle(&mut app);

    // A roll above the catch chance uses the ball and the turn.
    let outcome = app
        .world_mut()
        .resource_scope(|world, mut active: Mut<ActiveBattle>| {
            let mut bag = world.resource_mut::<Bag>();
            active.0.resolve_catch(&mut bag, 11)
        });
    assert_eq!(outcome, ActionOutcome::CatchFailed);
    wait_for_player_turn(&mut app);

    let outcome = app
        .world_mut()
        .resource_scope(|world, mut active: Mut<ActiveBattle>| {
            let mut bag = world.resource_mut::<Bag>();
            active.0.resolve_catch(&mut bag, 10)
        });
    assert_eq!(outcome, ActionOutcome::Caught("Gengar_fake".to_string()));

    let bag = app.world().resource::<Bag>();
    assert_eq!(bag.monsters.len(), 2);
    assert_eq!(bag.get_item(CATCH_ITEM).map(|i| i.count), Some(1));

    leave_battle(&mut app);
    assert!(!app.world().resource::<GameSession>().in_battle());
    cleanup(&path);
}

#[test]
fn test_run_returns_to_overworld_without_space() {
    let path = temp_save_path("run");
    cleanup(&path);
    let mut app = build_test_app(&path);
    app.insert_resource(bag_with_placeholder());
    enter_state(&mut app, GameState::Overworld);
    start_wild_battle(&mut app);

    press(
        &mut app,
        PlayerInput {
            battle_run: true,
            ..Default::default()
        },
    );
    app.update();
    assert_eq!(current_state(&app), GameState::Overworld);
    assert!(!app.world().resource::<GameSession>().in_battle());
    cleanup(&path);
}

// ─────────────────────────────────────────────────────────────────────────────
// Encounters
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_bush_search_respects_battle_guard() {
    let path = temp_save_path("bush-guard");
    cleanup(&path);
    let mut app = build_test_app(&path);
    app.insert_resource(bag_with_placeholder());
    app.insert_resource(WorldState::new(MapId::Route));
    let (bx, by) = {
        let bush = &app.world().resource::<WorldState>().bushes[0];
        (bush.x, bush.y)
    };
    app.world_mut().resource_mut::<PlayerState>().position = tile_to_world(bx, by);
    enter_state(&mut app, GameState::Overworld);

    // A battle already holds the guard.
    let trainer = EncounterSource::Trainer {
        map: MapId::Route,
        index: 0,
    };
    app.world_mut().resource_mut::<GameSession>().current_battle = Some(trainer);
    for _ in 0..30 {
        press(
            &mut app,
            PlayerInput {
                search: true,
                ..Default::default()
            },
        );
    }
    assert!(!app.world().resource::<SceneQueue>().is_pending());
    assert_eq!(
        app.world().resource::<GameSession>().current_battle,
        Some(trainer)
    );

    // Guard released: searching eventually turns something up.
    app.world_mut().resource_mut::<GameSession>().current_battle = None;
    let mut found = false;
    for _ in 0..50 {
        press(
            &mut app,
            PlayerInput {
                search: true,
                ..Default::default()
            },
        );
        if current_state(&app) == GameState::Battle {
            found = true;
            break;
        }
    }
    assert!(found, "90% per search should trigger within 50 tries");
    assert!(matches!(
        app.world().resource::<GameSession>().current_battle,
        Some(EncounterSource::Bush { .. })
    ));
    assert!(app.world().resource::<ActiveBattle>().0.is_wild);
    cleanup(&path);
}

#[test]
fn test_trainer_battle_writes_monster_back() {
    let path = temp_save_path("trainer");
    cleanup(&path);
    let mut app = build_test_app(&path);
    app.insert_resource(bag_with_placeholder());
    {
        let mut world = app.world_mut().resource_mut::<WorldState>();
        world.trainers_mut()[0].monster = Some(Monster::new("Bulbasaur", 200, 6, 10, 10));
    }
    // Two tiles below the town trainer, inside its sight.
    let (tx, ty) = {
        let world = app.world().resource::<WorldState>();
        (world.trainers()[0].x, world.trainers()[0].y)
    };
    app.world_mut().resource_mut::<PlayerState>().position = tile_to_world(tx, ty + 2);
    enter_state(&mut app, GameState::Overworld);
    app.update();

    let target = app.world().resource::<TrainerTarget>().clone();
    assert_eq!(target.index, Some(0));
    assert!(target.in_range());

    press(
        &mut app,
        PlayerInput {
            interact: true,
            ..Default::default()
        },
    );
    app.update();
    assert_eq!(current_state(&app), GameState::Battle);
    assert!(!app.world().resource::<ActiveBattle>().0.is_wild);

    press(
        &mut app,
        PlayerInput {
            battle_attack: true,
            ..Default::default()
        },
    );
    // 60 atk against 10 def.
    assert_eq!(app.world().resource::<ActiveBattle>().0.enemy.hp, 145);
    wait_for_player_turn(&mut app);

    // Catching is only for wild monsters.
    press(
        &mut app,
        PlayerInput {
            battle_catch: true,
            ..Default::default()
        },
    );
    assert_eq!(battle_phase(&app), TurnPhase::PlayerTurn);
    assert_eq!(
        app.world().resource::<Bag>().get_item(CATCH_ITEM).map(|i| i.count),
        Some(3)
    );

    press(
        &mut app,
        PlayerInput {
            battle_run: true,
            ..Default::default()
        },
    );
    app.update();
    assert_eq!(current_state(&app), GameState::Overworld);

    let world = app.world().resource::<WorldState>();
    let hp = world.trainers()[0].monster.as_ref().map(|m| m.hp);
    assert_eq!(hp, Some(145), "trainer keeps the damage it took");
    cleanup(&path);
}

/// Puts the player `tiles_below` tiles under the town trainer and enters
/// the overworld.
fn stand_below_town_trainer(app: &mut App, tiles_below: i32) {
    let (tx, ty) = {
        let world = app.world().resource::<WorldState>();
        (world.trainers()[0].x, world.trainers()[0].y)
    };
    app.world_mut().resource_mut::<PlayerState>().position = tile_to_world(tx, ty + tiles_below);
    enter_state(app, GameState::Overworld);
    app.update();
}

#[test]
fn test_trainer_challenge_respects_battle_guard() {
    let path = temp_save_path("trainer-guard");
    cleanup(&path);
    let mut app = build_test_app(&path);
    app.insert_resource(bag_with_placeholder());
    stand_below_town_trainer(&mut app, 2);
    assert!(app.world().resource::<TrainerTarget>().in_range());

    let held = EncounterSource::Bush { index: 0 };
    app.world_mut().resource_mut::<GameSession>().current_battle = Some(held);
    for _ in 0..3 {
        press(
            &mut app,
            PlayerInput {
                interact: true,
                ..Default::default()
            },
        );
    }
    app.update();

    assert!(!app.world().resource::<SceneQueue>().is_pending());
    assert_eq!(current_state(&app), GameState::Overworld);
    assert_eq!(
        app.world().resource::<GameSession>().current_battle,
        Some(held)
    );
    cleanup(&path);
}

#[test]
fn test_detected_trainer_out_of_reach_does_not_challenge() {
    let path = temp_save_path("trainer-far");
    cleanup(&path);
    let mut app = build_test_app(&path);
    app.insert_resource(bag_with_placeholder());
    // Still inside the four-tile sight line, but three tiles away.
    stand_below_town_trainer(&mut app, 3);

    let target = app.world().resource::<TrainerTarget>().clone();
    assert_eq!(target.index, Some(0));
    assert!(target.distance > MAX_CHALLENGE_DISTANCE);
    assert!(!target.in_range());

    press(
        &mut app,
        PlayerInput {
            interact: true,
            ..Default::default()
        },
    );
    app.update();

    assert!(!app.world().resource::<SceneQueue>().is_pending());
    assert_eq!(current_state(&app), GameState::Overworld);
    assert!(!app.world().resource::<GameSession>().in_battle());
    cleanup(&path);
}

// ─────────────────────────────────────────────────────────────────────────────
// Save / load
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_save_then_load_restores_state() {
    let path = temp_save_path("roundtrip");
    cleanup(&path);
    let mut app = build_test_app(&path);
    app.insert_resource(bag_with_placeholder());
    enter_state(&mut app, GameState::Overworld);

    app.world_mut()
        .resource_mut::<WorldState>()
        .enter_map(MapId::Route);
    app.world_mut().resource_mut::<PlayerState>().position = tile_to_world(5, 8);
    app.world_mut().send_event(SaveRequestEvent {
        reason: SaveReason::Manual,
    });
    app.update();
    assert!(path.exists());

    // Change everything the save covers.
    {
        let mut bag = app.world_mut().resource_mut::<Bag>();
        assert!(bag.remove_item(CATCH_ITEM, 3));
        bag.monsters[0].hp = 1;
    }
    app.world_mut()
        .resource_mut::<WorldState>()
        .enter_map(MapId::Town);
    app.world_mut().resource_mut::<PlayerState>().position = Vec2::ZERO;

    app.world_mut().send_event(LoadRequestEvent);
    app.update();

    let bag = app.world().resource::<Bag>();
    assert_eq!(bag.get_item(CATCH_ITEM).map(|i| i.count), Some(3));
    assert_eq!(bag.monsters[0].hp, 100);
    assert_eq!(
        app.world().resource::<WorldState>().current_map(),
        MapId::Route
    );
    assert_eq!(
        app.world().resource::<PlayerState>().position,
        tile_to_world(5, 8)
    );
    cleanup(&path);
}

#[test]
fn test_failed_load_leaves_state_unchanged() {
    let path = temp_save_path("missing");
    cleanup(&path);
    let mut app = build_test_app(&path);
    app.insert_resource(bag_with_placeholder());
    enter_state(&mut app, GameState::Overworld);

    let bag_before = app.world().resource::<Bag>().clone();
    let position_before = app.world().resource::<PlayerState>().position;

    app.world_mut().send_event(LoadRequestEvent);
    app.update();

    assert_eq!(*app.world().resource::<Bag>(), bag_before);
    assert_eq!(
        app.world().resource::<PlayerState>().position,
        position_before
    );
    assert_eq!(
        app.world().resource::<WorldState>().current_map(),
        MapId::Town
    );
    assert_eq!(current_state(&app), GameState::Overworld);
}
