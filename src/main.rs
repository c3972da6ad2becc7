mod shared;
mod settings;
mod input;
mod bag;
mod world;
mod player;
mod encounter;
mod scene;
mod battle;
mod save;
mod data;
mod ui;

use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use shared::*;

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Tallgrass".into(),
                        resolution: WindowResolution::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                        present_mode: PresentMode::AutoVsync,
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        // Game state
        .init_state::<GameState>()
        // Shared resources
        .init_resource::<bag::Bag>()
        // Events
        .add_event::<MapTransitionEvent>()
        .add_event::<PlaySfxEvent>()
        .add_event::<PlayMusicEvent>()
        .add_event::<ToastEvent>()
        // Overworld frame order: move, then react to the map, then look for encounters
        .configure_sets(
            Update,
            (
                OverworldSet::Movement,
                OverworldSet::World,
                OverworldSet::Encounter,
            )
                .chain(),
        )
        // Domain plugins
        .add_plugins(settings::SettingsPlugin)
        .add_plugins(input::InputPlugin)
        .add_plugins(world::WorldPlugin)
        .add_plugins(player::PlayerPlugin)
        .add_plugins(encounter::EncounterPlugin)
        .add_plugins(scene::ScenePlugin)
        .add_plugins(battle::BattlePlugin)
        .add_plugins(ui::UiPlugin)
        .add_plugins(save::SavePlugin)
        // Data loading
        .add_plugins(data::DataPlugin)
        // Camera
        .add_systems(Startup, setup_camera)
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Transform::from_scale(Vec3::splat(1.0 / PIXEL_SCALE)),
    ));
}
