//! Battle domain plugin: drives the turn machine in `state` from player
//! input and frame time, and hands the result back to the session.

use bevy::prelude::*;

use crate::bag::Bag;
use crate::save::{SaveReason, SaveRequestEvent};
use crate::scene::{BattleEntry, BattleHandoff, GameSession, SceneQueue, SceneRequest};
use crate::settings::GameSettings;
use crate::shared::*;
use crate::world::WorldState;

pub mod state;

use state::{ActionOutcome, Battle, Side};

pub struct BattlePlugin;

impl Plugin for BattlePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Battle), start_battle)
            .add_systems(OnExit(GameState::Battle), finish_battle)
            .add_systems(
                Update,
                (battle_actions, enemy_turn)
                    .chain()
                    .run_if(in_state(GameState::Battle)),
            );
    }
}

/// The battle in progress. Present only while in `GameState::Battle`.
#[derive(Resource, Debug, Clone)]
pub struct ActiveBattle(pub Battle);

// ═══════════════════════════════════════════════════════════════════════
// OUTCOME REPORTING
// ═══════════════════════════════════════════════════════════════════════

fn report_outcome(
    outcome: &ActionOutcome,
    battle: &Battle,
    bag: &Bag,
    settings: &GameSettings,
    sfx: &mut EventWriter<PlaySfxEvent>,
    saves: &mut EventWriter<SaveRequestEvent>,
) {
    match outcome {
        ActionOutcome::Ignored => return,
        ActionOutcome::Hit {
            attacker: Side::Player,
            damage,
            remaining_hp,
        } => {
            info!(
                "{} hits {} for {} damage ({} hp left).",
                battle.player(bag).name,
                battle.enemy.name,
                damage,
                remaining_hp
            );
            sfx.send(PlaySfxEvent {
                sfx_id: "hit".to_string(),
            });
        }
        ActionOutcome::Hit {
            attacker: Side::Enemy,
            damage,
            remaining_hp,
        } => {
            info!(
                "{} hits {} for {} damage ({} hp left).",
                battle.enemy.name,
                battle.player(bag).name,
                damage,
                remaining_hp
            );
            sfx.send(PlaySfxEvent {
                sfx_id: "hurt".to_string(),
            });
        }
        ActionOutcome::NoCatchItem => {
            info!("No {} left!", CATCH_ITEM);
        }
        ActionOutcome::CatchFailed => {
            info!("{} broke free!", battle.enemy.name);
            sfx.send(PlaySfxEvent {
                sfx_id: "catch_fail".to_string(),
            });
        }
        ActionOutcome::Caught(name) => {
            info!("Caught {}!", name);
            sfx.send(PlaySfxEvent {
                sfx_id: "catch".to_string(),
            });
        }
        ActionOutcome::Fled => {
            info!("Ran away from {}.", battle.enemy.name);
        }
    }

    if let Some(result) = battle.result {
        info!("Battle over: {}.", result.label());
    }

    if settings.autosave_during_battle && outcome.requests_autosave() {
        saves.send(SaveRequestEvent {
            reason: SaveReason::Auto,
        });
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

pub fn start_battle(
    mut commands: Commands,
    mut handoff: ResMut<BattleHandoff>,
    mut session: ResMut<GameSession>,
    settings: Res<GameSettings>,
    mut music: EventWriter<PlayMusicEvent>,
) {
    let entry = handoff.0.take().unwrap_or_else(|| {
        warn!("Battle started without an entry, using placeholders.");
        BattleEntry::new(None, None, true, EncounterSource::Unknown)
    });
    if !session.in_battle() {
        session.begin_battle(entry.source);
    }

    info!(
        "Battle start: {} (L{}) vs {}{} (L{}).",
        entry.player.name,
        entry.player.level,
        if entry.is_wild { "wild " } else { "" },
        entry.enemy.name,
        entry.enemy.level
    );

    let battle = Battle::new(entry).with_enemy_turn_delay(settings.enemy_turn_delay);
    commands.insert_resource(ActiveBattle(battle));
    music.send(PlayMusicEvent {
        track_id: "battle".to_string(),
    });
}

pub fn battle_actions(
    input: Res<PlayerInput>,
    mut active: ResMut<ActiveBattle>,
    mut bag: ResMut<Bag>,
    mut queue: ResMut<SceneQueue>,
    settings: Res<GameSettings>,
    mut sfx: EventWriter<PlaySfxEvent>,
    mut saves: EventWriter<SaveRequestEvent>,
) {
    let battle = &mut active.0;

    if battle.is_over() {
        if input.interact {
            queue.request(SceneRequest::Overworld);
        }
        return;
    }

    let outcome = if input.battle_attack {
        battle.player_attack(&mut bag)
    } else if input.battle_catch {
        battle.attempt_catch(&mut bag, &mut rand::thread_rng())
    } else if input.battle_run {
        battle.run()
    } else {
        return;
    };

    report_outcome(&outcome, battle, &bag, &settings, &mut sfx, &mut saves);

    if outcome == ActionOutcome::Fled {
        queue.request(SceneRequest::Overworld);
    }
}

pub fn enemy_turn(
    time: Res<Time>,
    mut active: ResMut<ActiveBattle>,
    mut bag: ResMut<Bag>,
    settings: Res<GameSettings>,
    mut sfx: EventWriter<PlaySfxEvent>,
    mut saves: EventWriter<SaveRequestEvent>,
) {
    let battle = &mut active.0;
    let outcome = battle.tick(time.delta_secs(), &mut bag);
    report_outcome(&outcome, battle, &bag, &settings, &mut sfx, &mut saves);
}

/// Hand the result to the session, free the guard, and write a trainer's
/// monster back so its damage sticks.
pub fn finish_battle(
    mut commands: Commands,
    active: Option<Res<ActiveBattle>>,
    mut session: ResMut<GameSession>,
    mut world: ResMut<WorldState>,
) {
    let Some(active) = active else {
        session.end_battle(None);
        return;
    };
    session.end_battle(active.0.finish(&mut world));
    commands.remove_resource::<ActiveBattle>();
}
