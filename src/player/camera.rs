use bevy::prelude::*;

use crate::shared::*;
use crate::world::WorldState;

/// Follow the player with the camera using a lerp, clamped to map bounds.
/// Snaps instead of lerping when the target jumps (teleports, loads).
pub fn camera_follow_player(
    time: Res<Time>,
    player: Res<PlayerState>,
    world: Res<WorldState>,
    mut camera_query: Query<(&mut Transform, &OrthographicProjection), With<Camera2d>>,
) {
    let Ok((mut cam_tf, projection)) = camera_query.get_single_mut() else {
        return;
    };

    let target = map_to_screen(player.position, 0.0);

    let dx = (target.x - cam_tf.translation.x).abs();
    let dy = (target.y - cam_tf.translation.y).abs();
    let should_snap = dx > TILE_SIZE * 4.0 || dy > TILE_SIZE * 4.0;

    let (smooth_x, smooth_y) = if should_snap {
        (target.x, target.y)
    } else {
        let lerp_speed = 5.0;
        let t = (lerp_speed * time.delta_secs()).min(1.0);
        (
            cam_tf.translation.x + (target.x - cam_tf.translation.x) * t,
            cam_tf.translation.y + (target.y - cam_tf.translation.y) * t,
        )
    };

    // Screen space: the map spans x in [0, w] and y in [-h, 0].
    let map_w = world.map.width as f32 * TILE_SIZE;
    let map_h = world.map.height as f32 * TILE_SIZE;

    let half_vw = projection.area.width() / 2.0 * cam_tf.scale.x;
    let half_vh = projection.area.height() / 2.0 * cam_tf.scale.y;

    let min_x = half_vw;
    let max_x = (map_w - half_vw).max(min_x);
    let max_y = -half_vh;
    let min_y = (-map_h + half_vh).min(max_y);

    cam_tf.translation.x = smooth_x.round().clamp(min_x, max_x);
    cam_tf.translation.y = smooth_y.round().clamp(min_y, max_y);
}
