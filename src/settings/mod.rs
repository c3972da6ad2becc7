//! Player-facing settings, read from `settings.ron` next to the working
//! directory. Everything has a default; a missing or broken file never
//! stops the game.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const SETTINGS_PATH: &str = "settings.ron";
pub const DEFAULT_SAVE_PATH: &str = "saves/game0.json";

pub struct SettingsPlugin;

impl Plugin for SettingsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(GameSettings::load_or_default(SETTINGS_PATH));
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Music and sfx volume, 0.0 to 1.0.
    pub volume: f32,
    pub muted: bool,
    pub save_path: String,
    /// Persist after every damaging battle action, not only after the
    /// battle result is known.
    pub autosave_during_battle: bool,
    /// Seconds the enemy waits before acting.
    pub enemy_turn_delay: f32,
    pub draw_hitboxes: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            volume: 0.6,
            muted: false,
            save_path: DEFAULT_SAVE_PATH.to_string(),
            autosave_during_battle: false,
            enemy_turn_delay: 1.0,
            draw_hitboxes: false,
        }
    }
}

impl GameSettings {
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No settings file at {}, using defaults.", path.display());
            return Self::default();
        }
        match Self::read(path) {
            Ok(settings) => {
                info!("Loaded settings from {}.", path.display());
                settings
            }
            Err(e) => {
                warn!("{}. Using default settings.", e);
                Self::default()
            }
        }
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| format!("Read failed for {}: {}", path.display(), e))?;
        Self::from_ron(&text)
    }

    pub fn from_ron(text: &str) -> Result<Self, String> {
        let mut settings: GameSettings =
            ron::from_str(text).map_err(|e| format!("Settings parse failed: {}", e))?;
        settings.volume = settings.volume.clamp(0.0, 1.0);
        settings.enemy_turn_delay = settings.enemy_turn_delay.max(0.0);
        Ok(settings)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), String> {
        let path = path.as_ref();
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| format!("Settings serialization failed: {}", e))?;
        fs::write(path, text).map_err(|e| format!("Write failed for {}: {}", path.display(), e))
    }

    /// Flips `muted` and returns the new value.
    pub fn toggle_muted(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Flips `draw_hitboxes` and returns the new value.
    pub fn toggle_hitboxes(&mut self) -> bool {
        self.draw_hitboxes = !self.draw_hitboxes;
        self.draw_hitboxes
    }

    /// Volume actually applied to audio sinks.
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_settings_file_gives_defaults() {
        let settings = GameSettings::load_or_default("definitely/not/here/settings.ron");
        assert_eq!(settings, GameSettings::default());
        assert_eq!(settings.save_path, "saves/game0.json");
    }

    #[test]
    fn test_partial_ron_keeps_other_defaults() {
        let settings = GameSettings::from_ron("(volume: 0.25, autosave_during_battle: true)").unwrap();
        assert_eq!(settings.volume, 0.25);
        assert!(settings.autosave_during_battle);
        assert_eq!(settings.enemy_turn_delay, 1.0);
    }

    #[test]
    fn test_volume_is_clamped() {
        let settings = GameSettings::from_ron("(volume: 3.0)").unwrap();
        assert_eq!(settings.volume, 1.0);
    }

    #[test]
    fn test_broken_ron_is_an_error() {
        assert!(GameSettings::from_ron("(volume: ").is_err());
    }

    #[test]
    fn test_muted_volume_is_zero() {
        let settings = GameSettings {
            muted: true,
            ..Default::default()
        };
        assert_eq!(settings.effective_volume(), 0.0);
    }

    #[test]
    fn test_toggles_flip_and_survive_a_write() {
        let path = std::env::temp_dir().join(format!(
            "tallgrass-settings-test-{}.ron",
            std::process::id()
        ));
        let mut settings = GameSettings::default();
        assert!(settings.toggle_muted());
        assert_eq!(settings.effective_volume(), 0.0);
        assert!(settings.toggle_hitboxes());
        settings.write(&path).unwrap();

        let mut back = GameSettings::read(&path).unwrap();
        assert!(back.muted);
        assert!(back.draw_hitboxes);
        assert_eq!(back.volume, 0.6);

        assert!(!back.toggle_muted());
        assert_eq!(back.effective_volume(), 0.6);
        assert!(!back.toggle_hitboxes());
        let _ = fs::remove_file(&path);
    }
}
