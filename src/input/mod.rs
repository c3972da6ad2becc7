use bevy::prelude::*;
use crate::shared::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerInput>()
            .init_resource::<InputContext>()
            .init_resource::<KeyBindings>()
            .add_systems(
                PreUpdate,
                (manage_input_context, reset_and_read_input).chain(),
            );
    }
}

/// The single point where hardware input becomes game actions.
fn reset_and_read_input(
    keys: Res<ButtonInput<KeyCode>>,
    bindings: Res<KeyBindings>,
    context: Res<InputContext>,
    mut input: ResMut<PlayerInput>,
) {
    *input = PlayerInput::default();

    match *context {
        InputContext::Disabled => {}

        InputContext::Overworld => {
            // Map space grows downward, so "up" is negative y.
            let mut axis = Vec2::ZERO;
            if keys.pressed(bindings.move_up) || keys.pressed(KeyCode::ArrowUp) {
                axis.y -= 1.0;
            }
            if keys.pressed(bindings.move_down) || keys.pressed(KeyCode::ArrowDown) {
                axis.y += 1.0;
            }
            if keys.pressed(bindings.move_left) || keys.pressed(KeyCode::ArrowLeft) {
                axis.x -= 1.0;
            }
            if keys.pressed(bindings.move_right) || keys.pressed(KeyCode::ArrowRight) {
                axis.x += 1.0;
            }
            input.move_axis = axis.normalize_or_zero();

            input.interact = keys.just_pressed(bindings.interact);
            input.search = keys.just_pressed(bindings.search);

            input.quicksave = keys.just_pressed(KeyCode::F5);
            input.quickload = keys.just_pressed(KeyCode::F9);
            input.volume_up = keys.just_pressed(KeyCode::Equal);
            input.volume_down = keys.just_pressed(KeyCode::Minus);
            input.toggle_mute = keys.just_pressed(KeyCode::KeyM);
            input.toggle_bag = keys.just_pressed(bindings.bag);
            input.toggle_hitboxes = keys.just_pressed(KeyCode::KeyH);
        }

        InputContext::Battle => {
            input.interact = keys.just_pressed(bindings.interact);
            input.battle_attack = keys.just_pressed(bindings.attack);
            input.battle_run = keys.just_pressed(bindings.run);
            input.battle_catch = keys.just_pressed(bindings.catch);
            input.volume_up = keys.just_pressed(KeyCode::Equal);
            input.volume_down = keys.just_pressed(KeyCode::Minus);
            input.toggle_mute = keys.just_pressed(KeyCode::KeyM);
        }
    }
}

/// Derives InputContext from GameState. ONE system, replaces all per-domain guards.
fn manage_input_context(
    game_state: Res<State<GameState>>,
    mut context: ResMut<InputContext>,
) {
    *context = match *game_state.get() {
        GameState::Loading => InputContext::Disabled,
        GameState::Overworld => InputContext::Overworld,
        GameState::Battle => InputContext::Battle,
    };
}
