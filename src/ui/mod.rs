mod audio;
mod bag_panel;
mod battle_hud;
mod hud;
mod toast;
mod transitions;

use bevy::prelude::*;
use crate::shared::*;

pub use audio::{AudioControl, MusicState};
pub use transitions::ScreenFade;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MusicState>()
            .init_resource::<ScreenFade>();

        // ─── FADE OVERLAY + TOASTS, always present ───
        app.add_systems(
            Startup,
            (transitions::spawn_fade_overlay, toast::spawn_toast_container),
        );
        app.add_systems(
            Update,
            (
                transitions::trigger_fade_on_transition,
                transitions::update_fade,
            )
                .chain(),
        );
        app.add_systems(OnEnter(GameState::Overworld), transitions::fade_on_scene_change);
        app.add_systems(OnEnter(GameState::Battle), transitions::fade_on_scene_change);
        app.add_systems(
            Update,
            (
                toast::wire_save_toasts,
                toast::handle_toast_events,
                toast::update_toasts,
            )
                .chain(),
        );

        // ─── AUDIO ───
        app.add_systems(Update, (audio::handle_play_sfx, audio::handle_play_music));
        app.add_systems(
            Update,
            (audio::volume_keys, audio::mute_key)
                .chain()
                .run_if(in_state(GameState::Overworld).or(in_state(GameState::Battle))),
        );

        // ─── HUD, visible during Overworld ───
        app.add_systems(OnEnter(GameState::Overworld), hud::spawn_hud);
        app.add_systems(OnExit(GameState::Overworld), hud::despawn_hud);
        app.add_systems(
            Update,
            (hud::update_map_name, hud::update_interaction_prompt)
                .after(OverworldSet::Encounter)
                .run_if(in_state(GameState::Overworld)),
        );

        // ─── BAG PANEL, toggled with B in the overworld ───
        app.add_systems(OnEnter(GameState::Overworld), bag_panel::spawn_bag_panel);
        app.add_systems(OnExit(GameState::Overworld), bag_panel::despawn_bag_panel);
        app.add_systems(
            Update,
            (bag_panel::toggle_bag_panel, bag_panel::update_bag_panel)
                .chain()
                .run_if(in_state(GameState::Overworld)),
        );

        // ─── BATTLE SCREEN ───
        app.add_systems(
            OnEnter(GameState::Battle),
            battle_hud::spawn_battle_hud.after(crate::battle::start_battle),
        );
        app.add_systems(OnExit(GameState::Battle), battle_hud::despawn_battle_hud);
        app.add_systems(
            Update,
            battle_hud::update_battle_hud
                .after(crate::battle::enemy_turn)
                .run_if(in_state(GameState::Battle)),
        );
    }
}
