use bevy::audio::Volume;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::settings::{GameSettings, SETTINGS_PATH};
use crate::shared::*;

/// Volume change per key press.
const VOLUME_STEP: f32 = 0.1;

// ═══════════════════════════════════════════════════════════════════════
// MUSIC STATE: tracks the currently playing music entity
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Default)]
pub struct MusicState {
    pub current_track: Option<Entity>,
    pub current_track_id: String,
}

/// Marker for every spawned audio source, so volume changes reach them.
#[derive(Component)]
pub struct GameAudio;

// ═══════════════════════════════════════════════════════════════════════
// VOLUME CONTROL
// ═══════════════════════════════════════════════════════════════════════

/// Reads and changes the game volume. The setting is the source of truth;
/// playing sinks are updated immediately.
#[derive(SystemParam)]
pub struct AudioControl<'w, 's> {
    settings: ResMut<'w, GameSettings>,
    sinks: Query<'w, 's, &'static AudioSink, With<GameAudio>>,
}

impl AudioControl<'_, '_> {
    pub fn volume(&self) -> f32 {
        self.settings.volume
    }

    pub fn is_muted(&self) -> bool {
        self.settings.muted
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.settings.volume = volume.clamp(0.0, 1.0);
        self.apply();
    }

    /// Returns true when the game is now muted.
    pub fn toggle_mute(&mut self) -> bool {
        let muted = self.settings.toggle_muted();
        self.apply();
        muted
    }

    /// Push the effective volume to playing sinks and persist the settings.
    fn apply(&mut self) {
        let effective = self.settings.effective_volume();
        for sink in self.sinks.iter() {
            sink.set_volume(effective);
        }
        if let Err(e) = self.settings.write(SETTINGS_PATH) {
            warn!("Could not persist audio settings: {}", e);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PATH MAPPING
// ═══════════════════════════════════════════════════════════════════════

/// Maps SFX IDs (sent by other domains) to actual audio file paths.
fn sfx_path(sfx_id: &str) -> Option<&'static str> {
    match sfx_id {
        "hit" => Some("audio/sfx/sfx_damage_hit1.ogg"),
        "hurt" => Some("audio/sfx/sfx_sounds_damage1.ogg"),
        "catch" => Some("audio/sfx/sfx_sounds_fanfare1.ogg"),
        "catch_fail" => Some("audio/sfx/sfx_sounds_error1.ogg"),
        "door" => Some("audio/sfx/sfx_movement_dooropen1.ogg"),
        "menu_select" => Some("audio/sfx/sfx_menu_select1.ogg"),
        _ => None,
    }
}

/// Maps music track IDs to actual audio file paths.
fn music_path(track_id: &str) -> Option<&'static str> {
    match track_id {
        "overworld" => Some("audio/music/overworld.ogg"),
        "battle" => Some("audio/music/battle.ogg"),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

/// Listen for PlaySfxEvent and spawn one-shot audio sources that auto-despawn.
pub fn handle_play_sfx(
    mut events: EventReader<PlaySfxEvent>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    settings: Res<GameSettings>,
) {
    for event in events.read() {
        let Some(path) = sfx_path(&event.sfx_id) else {
            warn!("Unknown sfx id '{}'", event.sfx_id);
            continue;
        };
        commands.spawn((
            AudioPlayer::new(asset_server.load(path)),
            PlaybackSettings::DESPAWN.with_volume(Volume::new(settings.effective_volume())),
            GameAudio,
        ));
    }
}

/// Listen for PlayMusicEvent, stop the current music track, and start a new one.
/// Asking for the track that is already playing is a no-op.
pub fn handle_play_music(
    mut events: EventReader<PlayMusicEvent>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    settings: Res<GameSettings>,
    mut music_state: ResMut<MusicState>,
) {
    for event in events.read() {
        if music_state.current_track.is_some() && music_state.current_track_id == event.track_id {
            continue;
        }

        // Stop current track if playing
        if let Some(entity) = music_state.current_track.take() {
            commands.entity(entity).despawn_recursive();
        }

        if let Some(path) = music_path(&event.track_id) {
            let entity = commands
                .spawn((
                    AudioPlayer::new(asset_server.load(path)),
                    PlaybackSettings::LOOP.with_volume(Volume::new(settings.effective_volume())),
                    GameAudio,
                ))
                .id();
            music_state.current_track = Some(entity);
            music_state.current_track_id = event.track_id.clone();
        } else {
            music_state.current_track_id.clear();
        }
    }
}

/// `=` / `-` nudge the volume.
pub fn volume_keys(
    input: Res<PlayerInput>,
    mut audio: AudioControl,
    mut toasts: EventWriter<ToastEvent>,
) {
    let step = match (input.volume_up, input.volume_down) {
        (true, false) => VOLUME_STEP,
        (false, true) => -VOLUME_STEP,
        _ => return,
    };
    let volume = audio.volume() + step;
    audio.set_volume(volume);
    toasts.send(ToastEvent {
        message: format!("Volume {:.0}%", audio.volume() * 100.0),
        duration_secs: 1.0,
    });
}

/// `M` mutes or unmutes everything.
pub fn mute_key(
    input: Res<PlayerInput>,
    mut audio: AudioControl,
    mut toasts: EventWriter<ToastEvent>,
) {
    if !input.toggle_mute {
        return;
    }
    let message = if audio.toggle_mute() {
        "Sound off".to_string()
    } else {
        format!("Sound on ({:.0}%)", audio.volume() * 100.0)
    };
    toasts.send(ToastEvent {
        message,
        duration_secs: 1.0,
    });
}
