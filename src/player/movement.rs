use bevy::prelude::*;

use crate::shared::*;
use crate::world::maps::Teleport;
use crate::world::WorldState;

/// Walking speed in pixels per second.
pub const PLAYER_SPEED: f32 = 4.0 * TILE_SIZE;
/// Seconds after a teleport before another one may fire.
pub const TELEPORT_COOLDOWN: f32 = 0.5;

/// Advance the player by one frame of input.
///
/// Collision is axis-separated so the player slides along walls. A blocked
/// axis snaps to the grid, which leaves the hitbox flush against the
/// obstacle. Returns the teleport the player landed on, if any fired.
pub fn step_player(
    player: &mut PlayerState,
    world: &WorldState,
    axis: Vec2,
    dt: f32,
) -> Option<Teleport> {
    player.teleport_cooldown = (player.teleport_cooldown - dt).max(0.0);

    if axis != Vec2::ZERO {
        // Map space: negative y is up.
        player.facing = if axis.y.abs() >= axis.x.abs() {
            if axis.y < 0.0 {
                Facing::Up
            } else {
                Facing::Down
            }
        } else if axis.x < 0.0 {
            Facing::Left
        } else {
            Facing::Right
        };

        let delta = axis * PLAYER_SPEED * dt;

        let moved_x = player.position + Vec2::new(delta.x, 0.0);
        if !world.check_collision(&Bounds::tile_at(moved_x)) {
            player.position = moved_x;
        } else {
            let snapped = Vec2::new(snap_to_grid(player.position.x), player.position.y);
            if !world.check_collision(&Bounds::tile_at(snapped)) {
                player.position = snapped;
            }
        }

        let moved_y = player.position + Vec2::new(0.0, delta.y);
        if !world.check_collision(&Bounds::tile_at(moved_y)) {
            player.position = moved_y;
        } else {
            let snapped = Vec2::new(player.position.x, snap_to_grid(player.position.y));
            if !world.check_collision(&Bounds::tile_at(snapped)) {
                player.position = snapped;
            }
        }
    }

    if player.teleport_cooldown > 0.0 {
        return None;
    }
    let teleport = world.check_teleport(player.position)?;
    player.teleport_cooldown = TELEPORT_COOLDOWN;
    Some(teleport)
}

/// Core movement system: reads the movement axis, applies it, and asks the
/// world domain to switch maps when a teleport fires.
pub fn player_movement(
    time: Res<Time>,
    input: Res<PlayerInput>,
    world: Res<WorldState>,
    mut player: ResMut<PlayerState>,
    mut transitions: EventWriter<MapTransitionEvent>,
) {
    if let Some(teleport) = step_player(&mut player, &world, input.move_axis, time.delta_secs()) {
        info!(
            "Teleport to {} ({}, {}).",
            teleport.to_map.name(),
            teleport.to_x,
            teleport.to_y
        );
        transitions.send(MapTransitionEvent {
            to_map: teleport.to_map,
            to_x: teleport.to_x,
            to_y: teleport.to_y,
        });
    }
}
