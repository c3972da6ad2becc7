use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::bag::Bag;
use crate::scene::GameSession;
use crate::settings::GameSettings;
use crate::shared::*;
use crate::world::{MapSnapshot, WorldState};

// ═══════════════════════════════════════════════════════════════════════
// PUBLIC TYPES
// ═══════════════════════════════════════════════════════════════════════

pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveReason {
    /// F5 or a menu button.
    Manual,
    /// After a battle or a state-changing battle action.
    Auto,
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Event, Debug, Clone)]
pub struct SaveRequestEvent {
    pub reason: SaveReason,
}

#[derive(Event, Debug, Clone, Default)]
pub struct LoadRequestEvent;

/// Sent by SavePlugin after a save completes (success or failure).
#[derive(Event, Debug, Clone)]
pub struct SaveCompleteEvent {
    pub success: bool,
    pub error_message: Option<String>,
}

/// Sent by SavePlugin after a load completes.
#[derive(Event, Debug, Clone)]
pub struct LoadCompleteEvent {
    pub success: bool,
    pub error_message: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SaveRequestEvent>()
            .add_event::<LoadRequestEvent>()
            .add_event::<SaveCompleteEvent>()
            .add_event::<LoadCompleteEvent>()
            .add_systems(
                Update,
                quicksave_keybind.run_if(in_state(GameState::Overworld)),
            )
            .add_systems(
                Update,
                (handle_save_request, handle_load_request)
                    .chain()
                    .after(quicksave_keybind)
                    .run_if(not(in_state(GameState::Loading))),
            );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SAVE FILE
// ═══════════════════════════════════════════════════════════════════════

/// Player position in tile units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedPosition {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub facing: Facing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    pub version: u32,
    #[serde(default)]
    pub bag: Bag,
    pub map: MapSnapshot,
    pub player: SavedPosition,
    /// A result the overworld has not handled yet.
    #[serde(default)]
    pub last_battle_result: Option<BattleResult>,
}

impl SaveFile {
    pub fn capture(
        bag: &Bag,
        world: &WorldState,
        player: &PlayerState,
        session: &GameSession,
    ) -> Self {
        Self {
            version: SAVE_VERSION,
            bag: bag.clone(),
            map: world.snapshot(),
            player: SavedPosition {
                x: player.position.x / TILE_SIZE,
                y: player.position.y / TILE_SIZE,
                facing: player.facing,
            },
            last_battle_result: session.last_battle_result,
        }
    }

    pub fn apply(
        self,
        bag: &mut Bag,
        world: &mut WorldState,
        player: &mut PlayerState,
        session: &mut GameSession,
    ) {
        *bag = self.bag;
        world.restore(&self.map);
        player.position = Vec2::new(self.player.x, self.player.y) * TILE_SIZE;
        player.facing = self.player.facing;
        player.teleport_cooldown = 0.0;
        session.last_battle_result = self.last_battle_result;
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SAVE / LOAD LOGIC
// ═══════════════════════════════════════════════════════════════════════

pub fn write_save(path: impl AsRef<Path>, file: &SaveFile) -> Result<(), String> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .map_err(|e| format!("Could not create saves directory: {}", e))?;
    }

    let json =
        serde_json::to_string_pretty(file).map_err(|e| format!("Serialization failed: {}", e))?;

    // Write to a temp file first, then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, &json)
        .map_err(|e| format!("Write failed for {}: {}", tmp_path.display(), e))?;
    fs::rename(&tmp_path, path).map_err(|e| format!("Rename failed: {}", e))?;

    Ok(())
}

pub fn read_save(path: impl AsRef<Path>) -> Result<SaveFile, String> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(format!("Save file {} does not exist", path.display()));
    }
    let json = fs::read_to_string(path)
        .map_err(|e| format!("Read failed for {}: {}", path.display(), e))?;
    let file: SaveFile =
        serde_json::from_str(&json).map_err(|e| format!("Deserialization failed: {}", e))?;

    // Older versions load as-is; there are no migrations yet.
    if file.version != SAVE_VERSION {
        warn!(
            "Save file {} has version {} but current version is {}. Attempting to load anyway.",
            path.display(),
            file.version,
            SAVE_VERSION
        );
    }

    Ok(file)
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

/// Several requests in one frame produce a single write.
pub fn handle_save_request(
    mut save_events: EventReader<SaveRequestEvent>,
    mut complete_events: EventWriter<SaveCompleteEvent>,
    settings: Res<GameSettings>,
    bag: Res<Bag>,
    world: Res<WorldState>,
    player: Res<PlayerState>,
    session: Res<GameSession>,
) {
    let Some(ev) = save_events.read().last() else {
        return;
    };

    info!("Saving ({:?}) to {}...", ev.reason, settings.save_path);
    let file = SaveFile::capture(&bag, &world, &player, &session);

    match write_save(&settings.save_path, &file) {
        Ok(()) => {
            info!("Save succeeded.");
            complete_events.send(SaveCompleteEvent {
                success: true,
                error_message: None,
            });
        }
        Err(e) => {
            warn!("Save FAILED: {}", e);
            complete_events.send(SaveCompleteEvent {
                success: false,
                error_message: Some(e),
            });
        }
    }
}

/// A failed load leaves every resource as it was.
pub fn handle_load_request(
    mut load_events: EventReader<LoadRequestEvent>,
    mut complete_events: EventWriter<LoadCompleteEvent>,
    settings: Res<GameSettings>,
    mut bag: ResMut<Bag>,
    mut world: ResMut<WorldState>,
    mut player: ResMut<PlayerState>,
    mut session: ResMut<GameSession>,
) {
    if load_events.read().last().is_none() {
        return;
    }

    info!("Loading from {}...", settings.save_path);
    match read_save(&settings.save_path) {
        Ok(file) => {
            file.apply(&mut bag, &mut world, &mut player, &mut session);
            info!("Load succeeded.");
            complete_events.send(LoadCompleteEvent {
                success: true,
                error_message: None,
            });
        }
        Err(e) => {
            warn!("Load FAILED: {}", e);
            complete_events.send(LoadCompleteEvent {
                success: false,
                error_message: Some(e),
            });
        }
    }
}

/// F5 = quicksave, F9 = quickload.
fn quicksave_keybind(
    player_input: Res<PlayerInput>,
    mut save_writer: EventWriter<SaveRequestEvent>,
    mut load_writer: EventWriter<LoadRequestEvent>,
) {
    if player_input.quicksave {
        info!("F5 quicksave");
        save_writer.send(SaveRequestEvent {
            reason: SaveReason::Manual,
        });
    }
    if player_input.quickload {
        info!("F9 quickload");
        load_writer.send(LoadRequestEvent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_save_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("tallgrass-save-test-{}-{}", name, std::process::id()))
            .join("game0.json")
    }

    fn sample_file() -> SaveFile {
        let bag = Bag::new(
            vec![Monster::new("Pikachu", 62, 8, 44, 18)],
            vec![ItemStack::new("Pokeball", 5, "ingame_ui/ball.png")],
        );
        let mut world = WorldState::new(MapId::Town);
        world.enter_map(MapId::Route);
        let player = PlayerState {
            position: Vec2::new(3.0, 7.5) * TILE_SIZE,
            facing: Facing::Left,
            teleport_cooldown: 0.3,
        };
        let session = GameSession {
            current_battle: None,
            last_battle_result: Some(BattleResult::Win),
        };
        SaveFile::capture(&bag, &world, &player, &session)
    }

    #[test]
    fn test_capture_uses_tile_units() {
        let file = sample_file();
        assert_eq!(file.player.x, 3.0);
        assert_eq!(file.player.y, 7.5);
        assert_eq!(file.map.name, MapId::Route);
        assert_eq!(file.version, SAVE_VERSION);
    }

    #[test]
    fn test_disk_round_trip() {
        let path = temp_save_path("round-trip");
        let file = sample_file();
        write_save(&path, &file).unwrap();
        let back = read_save(&path).unwrap();
        assert_eq!(back, file);
        assert!(!path.with_extension("json.tmp").exists());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_file_field_names() {
        let value = serde_json::to_value(sample_file()).unwrap();
        assert!(value["bag"]["monsters"].is_array());
        assert!(value["bag"]["items"].is_array());
        assert_eq!(value["map"]["name"], "route");
        assert_eq!(value["last_battle_result"], "win");
        assert_eq!(value["player"]["x"], 3.0);
    }

    #[test]
    fn test_missing_result_reads_as_none() {
        let mut value = serde_json::to_value(sample_file()).unwrap();
        value.as_object_mut().unwrap().remove("last_battle_result");
        let file: SaveFile = serde_json::from_value(value).unwrap();
        assert_eq!(file.last_battle_result, None);
    }

    #[test]
    fn test_out_of_range_monster_stats_are_clamped_on_read() {
        let mut value = serde_json::to_value(sample_file()).unwrap();
        value["bag"]["monsters"][0]["hp"] = serde_json::json!(500);
        value["bag"]["monsters"][0]["level"] = serde_json::json!(-2);
        let file: SaveFile = serde_json::from_value(value).unwrap();
        let pikachu = &file.bag.monsters[0];
        assert_eq!(pikachu.hp, 62);
        assert_eq!(pikachu.max_hp, 62);
        assert_eq!(pikachu.level, 1);
    }

    #[test]
    fn test_apply_restores_state() {
        let file = sample_file();
        let mut bag = Bag::default();
        let mut world = WorldState::default();
        let mut player = PlayerState::default();
        let mut session = GameSession::default();
        file.clone().apply(&mut bag, &mut world, &mut player, &mut session);

        assert_eq!(bag, file.bag);
        assert_eq!(world.current_map(), MapId::Route);
        assert_eq!(player.position, Vec2::new(96.0, 240.0));
        assert_eq!(player.facing, Facing::Left);
        assert_eq!(session.last_battle_result, Some(BattleResult::Win));
    }

    #[test]
    fn test_missing_and_corrupt_files_are_errors() {
        let path = temp_save_path("corrupt");
        assert!(read_save(&path).is_err());

        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        let err = read_save(&path).unwrap_err();
        assert!(err.contains("Deserialization failed"));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
