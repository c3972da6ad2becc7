//! Data layer: monster templates, new-game defaults and the startup load.
//!
//! This plugin runs in OnEnter(GameState::Loading): it restores the save
//! file if there is one, otherwise sets up a new game, then transitions
//! the game into GameState::Overworld.
//!
//! A save that exists but cannot be read stops the game rather than
//! silently overwriting it with a new one.

pub mod monsters;

use bevy::prelude::*;
use std::path::Path;

use crate::bag::Bag;
use crate::save::{read_save, SaveFile};
use crate::scene::GameSession;
use crate::settings::GameSettings;
use crate::shared::*;
use crate::world::WorldState;

use monsters::{build_monster, MONSTER_TEMPLATES, STARTER_LEVEL, STARTER_SPECIES};

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Loading), load_game);
    }
}

/// Items every new game starts with.
pub const STARTING_ITEMS: &[(&str, u32, &str)] = &[
    (CATCH_ITEM, 5, "ingame_ui/ball.png"),
    ("Potion", 3, "ingame_ui/potion.png"),
];

pub fn new_game_bag() -> Bag {
    let mut bag = Bag::default();
    let starter =
        build_monster(STARTER_SPECIES, STARTER_LEVEL).unwrap_or_else(Monster::placeholder_player);
    bag.add_monster(starter);
    for (name, count, sprite) in STARTING_ITEMS {
        bag.add_item(name, *count, sprite);
    }
    bag.heal_all();
    bag
}

/// Fresh bag, town map, player on the town spawn.
pub fn start_new_game(
    bag: &mut Bag,
    world: &mut WorldState,
    player: &mut PlayerState,
    session: &mut GameSession,
) {
    *bag = new_game_bag();
    *world = WorldState::new(MapId::Town);
    let (sx, sy) = world.map.spawn;
    *player = PlayerState {
        position: tile_to_world(sx, sy),
        ..Default::default()
    };
    *session = GameSession::default();
}

#[derive(Debug)]
pub enum StartupLoad {
    NewGame,
    Loaded(Box<SaveFile>),
}

/// A missing file means a new game; anything else that fails is an error.
pub fn startup_load(path: impl AsRef<Path>) -> Result<StartupLoad, String> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(StartupLoad::NewGame);
    }
    read_save(path).map(|file| StartupLoad::Loaded(Box::new(file)))
}

fn load_game(
    settings: Res<GameSettings>,
    mut bag: ResMut<Bag>,
    mut world: ResMut<WorldState>,
    mut player: ResMut<PlayerState>,
    mut session: ResMut<GameSession>,
    mut next_state: ResMut<NextState<GameState>>,
    mut exit: EventWriter<AppExit>,
) {
    info!("DataPlugin: {} monster templates.", MONSTER_TEMPLATES.len());

    match startup_load(&settings.save_path) {
        Ok(StartupLoad::NewGame) => {
            info!("No save at {}, starting a new game.", settings.save_path);
            start_new_game(&mut bag, &mut world, &mut player, &mut session);
        }
        Ok(StartupLoad::Loaded(file)) => {
            info!("Loaded save from {}.", settings.save_path);
            file.apply(&mut bag, &mut world, &mut player, &mut session);
        }
        Err(e) => {
            error!("Could not load {}: {}", settings.save_path, e);
            exit.send(AppExit::error());
            return;
        }
    }

    info!("DataPlugin: game ready. Transitioning to Overworld.");
    next_state.set(GameState::Overworld);
}
