//! Encounter triggers: tall grass searches and trainer challenges.
//!
//! Detection runs every overworld frame. A battle is only queued when the
//! player presses the matching key, the current-battle guard is free, and
//! (for bushes) no other scene change is pending.

use bevy::prelude::*;
use rand::Rng;

use crate::bag::Bag;
use crate::scene::{BattleEntry, GameSession, SceneQueue, SceneRequest};
use crate::shared::*;
use crate::world::WorldState;

pub mod bush;
pub mod trainer;

use bush::{detected_bush, pick_wild, roll_triggers};
use trainer::{closest_detected, MAX_CHALLENGE_DISTANCE};

pub struct EncounterPlugin;

impl Plugin for EncounterPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TrainerTarget>().add_systems(
            Update,
            (
                update_trainer_detection,
                update_bush_detection,
                challenge_trainer,
                search_bush,
            )
                .chain()
                .in_set(OverworldSet::Encounter)
                .run_if(in_state(GameState::Overworld)),
        );
    }
}

/// The detected trainer closest to the player this frame.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct TrainerTarget {
    pub index: Option<usize>,
    pub distance: f32,
}

impl TrainerTarget {
    pub fn in_range(&self) -> bool {
        self.index.is_some() && self.distance <= MAX_CHALLENGE_DISTANCE
    }
}

/// The active roster monster together with its slot.
fn active_roster_entry(bag: &Bag) -> Option<(usize, Monster)> {
    let slot = bag.active_slot()?;
    Some((slot, bag.monsters[slot].clone()))
}

pub fn update_trainer_detection(
    player: Res<PlayerState>,
    mut world: ResMut<WorldState>,
    mut target: ResMut<TrainerTarget>,
) {
    let hitbox = player.hitbox();
    for trainer in world.trainers_mut().iter_mut() {
        trainer.update_detection(&hitbox);
    }

    let trainers = world.trainers();
    target.index = closest_detected(trainers, player.position);
    target.distance = target
        .index
        .map(|i| trainers[i].distance_to(player.position))
        .unwrap_or(f32::INFINITY);
}

pub fn update_bush_detection(player: Res<PlayerState>, mut world: ResMut<WorldState>) {
    let hitbox = player.hitbox();
    for bush in world.bushes.iter_mut() {
        bush.update_detection(&hitbox);
    }
}

/// SPACE next to a trainer who has spotted the player starts a trainer battle.
pub fn challenge_trainer(
    input: Res<PlayerInput>,
    target: Res<TrainerTarget>,
    world: Res<WorldState>,
    bag: Res<Bag>,
    mut session: ResMut<GameSession>,
    mut queue: ResMut<SceneQueue>,
) {
    if !input.interact {
        return;
    }
    let Some(index) = target.index else {
        return;
    };
    if !target.in_range() {
        info!("Trainer {} spotted you, but is too far away.", index);
        return;
    }
    if session.in_battle() {
        warn!("Trainer challenge ignored, a battle is already in progress.");
        return;
    }

    let map = world.current_map();
    let enemy = world.trainers()[index].monster.clone();
    let source = EncounterSource::Trainer { map, index };
    let entry = BattleEntry::new(active_roster_entry(&bag), enemy, false, source);

    if queue.request(SceneRequest::Battle(entry)) {
        session.begin_battle(source);
        info!("Trainer {} on {} challenges you!", index, map.name());
    }
}

/// E while standing in tall grass may turn up a wild monster.
pub fn search_bush(
    input: Res<PlayerInput>,
    world: Res<WorldState>,
    bag: Res<Bag>,
    mut session: ResMut<GameSession>,
    mut queue: ResMut<SceneQueue>,
) {
    if !input.search {
        return;
    }
    let (bushes, pool) = world.encounter_table();
    let Some(index) = detected_bush(bushes) else {
        return;
    };

    let mut rng = rand::thread_rng();
    let roll: f64 = rng.gen();
    if !roll_triggers(roll) {
        info!("Nothing in this bush.");
        return;
    }
    if session.in_battle() {
        warn!("Bush encounter ignored, a battle is already in progress.");
        return;
    }
    if queue.is_pending() {
        warn!("Bush encounter ignored, a scene change is already queued.");
        return;
    }
    let Some(enemy) = pick_wild(pool, &mut rng) else {
        warn!("Bush encounter ignored, this map has no wild monsters.");
        return;
    };

    let source = EncounterSource::Bush { index };
    let entry = BattleEntry::new(active_roster_entry(&bag), Some(enemy), true, source);
    if queue.request(SceneRequest::Battle(entry)) {
        session.begin_battle(source);
        info!("A wild monster jumped out of the grass!");
    }
}
