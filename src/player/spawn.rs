use bevy::prelude::*;

use crate::shared::*;

const PLAYER_COLOR: Color = Color::srgb(0.2, 0.5, 0.8);

/// Spawn the player sprite. Runs on `OnEnter(GameState::Overworld)`; the
/// authoritative position lives in `PlayerState`.
pub fn spawn_player(
    mut commands: Commands,
    player: Res<PlayerState>,
    existing: Query<Entity, With<Player>>,
) {
    // Guard: don't double-spawn if returning to Overworld state.
    if !existing.is_empty() {
        return;
    }

    commands.spawn((
        Player,
        Sprite::from_color(PLAYER_COLOR, Vec2::splat(TILE_SIZE)),
        // Z = 10 so the player draws above terrain.
        Transform::from_translation(map_to_screen(player.position, 10.0)),
    ));
}

pub fn despawn_player(mut commands: Commands, query: Query<Entity, With<Player>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}

pub fn sync_player_sprite(
    player: Res<PlayerState>,
    mut query: Query<&mut Transform, With<Player>>,
) {
    for mut transform in query.iter_mut() {
        transform.translation = map_to_screen(player.position, 10.0);
    }
}
