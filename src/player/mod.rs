mod camera;
pub mod movement;
mod spawn;

use bevy::prelude::*;
use crate::shared::*;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerState>();

        app.add_systems(OnEnter(GameState::Overworld), spawn::spawn_player);
        app.add_systems(OnExit(GameState::Overworld), spawn::despawn_player);

        app.add_systems(
            Update,
            (
                movement::player_movement,
                spawn::sync_player_sprite,
                camera::camera_follow_player,
            )
                .chain()
                .in_set(OverworldSet::Movement)
                .run_if(in_state(GameState::Overworld)),
        );
    }
}
