//! Shared components, resources, events, and states for Tallgrass.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain's internals directly.
//!
//! Map-space coordinates are in pixels with `y` growing downward (row
//! order). Rendering flips `y` when it builds `Transform`s.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE: top-level scene machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Overworld,
    Battle,
}

/// Ordering of overworld gameplay within `Update`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverworldSet {
    Movement,
    World,
    Encounter,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const TILE_SIZE: f32 = 32.0;
pub const PIXEL_SCALE: f32 = 1.5;
pub const SCREEN_WIDTH: f32 = 1280.0;
pub const SCREEN_HEIGHT: f32 = 720.0;

/// Item consumed by a catch attempt.
pub const CATCH_ITEM: &str = "Pokeball";

// ═══════════════════════════════════════════════════════════════════════
// MAPS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MapId {
    #[default]
    Town,
    Route,
}

impl MapId {
    pub fn name(&self) -> &'static str {
        match self {
            MapId::Town => "town",
            MapId::Route => "route",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    Grass,
    TallGrass,
    Path,
    Sand,
    Water,
    Tree,
    Void,
}

impl TileKind {
    pub fn is_solid(&self) -> bool {
        matches!(self, TileKind::Water | TileKind::Tree | TileKind::Void)
    }
}

/// Marker for the player sprite.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;

/// Where the player is and which way they look, in map space.
#[derive(Resource, Debug, Clone)]
pub struct PlayerState {
    pub position: Vec2,
    pub facing: Facing,
    /// Seconds left before another teleport may fire.
    pub teleport_cooldown: f32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            facing: Facing::Down,
            teleport_cooldown: 0.0,
        }
    }
}

impl PlayerState {
    pub fn hitbox(&self) -> Bounds {
        Bounds::tile_at(self.position)
    }

    /// Tile under the center of the player's hitbox.
    pub fn tile(&self) -> (i32, i32) {
        let center = self.position + Vec2::splat(TILE_SIZE / 2.0);
        (
            (center.x / TILE_SIZE).floor() as i32,
            (center.y / TILE_SIZE).floor() as i32,
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════
// GEOMETRY
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

/// Axis-aligned rectangle in map space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// One tile anchored at a map-space position.
    pub fn tile_at(pos: Vec2) -> Self {
        Self::new(pos.x, pos.y, TILE_SIZE, TILE_SIZE)
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Strict overlap: rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

pub fn tile_to_world(x: i32, y: i32) -> Vec2 {
    Vec2::new(x as f32 * TILE_SIZE, y as f32 * TILE_SIZE)
}

pub fn snap_to_grid(v: f32) -> f32 {
    (v / TILE_SIZE).round() * TILE_SIZE
}

/// Screen translation for a tile anchored at a map-space position.
pub fn map_to_screen(pos: Vec2, z: f32) -> Vec3 {
    Vec3::new(pos.x + TILE_SIZE / 2.0, -(pos.y + TILE_SIZE / 2.0), z)
}

// ═══════════════════════════════════════════════════════════════════════
// MONSTERS & ITEMS
// ═══════════════════════════════════════════════════════════════════════

fn default_level() -> i32 {
    1
}
fn default_hp() -> i32 {
    1
}
fn default_atk() -> i32 {
    50
}
fn default_defense() -> i32 {
    40
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MonsterRecord")]
pub struct Monster {
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub level: i32,
    pub atk: i32,
    pub defense: i32,
    pub sprite_path: String,
    pub battle_sprite_path: String,
}

/// On-disk shape of a monster. Every stat is optional; `From` fills the
/// gaps and clamps the result.
#[derive(Deserialize)]
struct MonsterRecord {
    name: String,
    #[serde(default)]
    hp: Option<i32>,
    #[serde(default)]
    max_hp: Option<i32>,
    #[serde(default = "default_level")]
    level: i32,
    #[serde(default = "default_atk")]
    atk: i32,
    #[serde(default = "default_defense")]
    defense: i32,
    #[serde(default)]
    sprite_path: String,
    #[serde(default)]
    battle_sprite_path: String,
}

impl From<MonsterRecord> for Monster {
    fn from(record: MonsterRecord) -> Self {
        let max_hp = record.max_hp.or(record.hp).unwrap_or_else(default_hp);
        let hp = record.hp.unwrap_or(max_hp);
        let mut monster = Self {
            name: record.name,
            hp,
            max_hp,
            level: record.level,
            atk: record.atk,
            defense: record.defense,
            sprite_path: record.sprite_path,
            battle_sprite_path: record.battle_sprite_path,
        };
        monster.sanitize();
        monster
    }
}

impl Monster {
    pub fn new(name: impl Into<String>, max_hp: i32, level: i32, atk: i32, defense: i32) -> Self {
        let name = name.into();
        let slug = name.to_lowercase();
        Self {
            sprite_path: format!("menu_sprites/menusprite_{slug}.png"),
            battle_sprite_path: format!("sprites/{slug}.png"),
            name,
            hp: max_hp,
            max_hp,
            level: level.max(1),
            atk,
            defense,
        }
    }

    /// Force `max_hp >= 1`, `0 <= hp <= max_hp` and `level >= 1`.
    pub fn sanitize(&mut self) {
        self.max_hp = self.max_hp.max(1);
        self.hp = self.hp.clamp(0, self.max_hp);
        self.level = self.level.max(1);
    }

    /// Stand-in for a missing player monster at battle entry.
    pub fn placeholder_player() -> Self {
        Self {
            name: "Pikachu_fake".to_string(),
            hp: 100,
            max_hp: 100,
            level: 25,
            atk: 60,
            defense: 15,
            sprite_path: String::new(),
            battle_sprite_path: String::new(),
        }
    }

    /// Stand-in for a missing enemy monster at battle entry.
    pub fn placeholder_enemy() -> Self {
        Self {
            name: "Gengar_fake".to_string(),
            hp: 80,
            max_hp: 80,
            level: 30,
            atk: 70,
            defense: 15,
            sprite_path: String::new(),
            battle_sprite_path: String::new(),
        }
    }

    pub fn is_fainted(&self) -> bool {
        self.hp <= 0
    }

    /// Applies damage, clamping at zero. Returns the remaining hp.
    pub fn take_damage(&mut self, damage: i32) -> i32 {
        self.hp = self.hp.saturating_sub(damage).max(0);
        self.hp
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub name: String,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub sprite_path: String,
}

impl ItemStack {
    pub fn new(name: impl Into<String>, count: u32, sprite_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            count,
            sprite_path: sprite_path.into(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// BATTLE RESULT
// ═══════════════════════════════════════════════════════════════════════

/// Outcome of a finished battle. "No result" is `Option::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleResult {
    Win,
    Lose,
    Run,
}

impl BattleResult {
    pub fn label(&self) -> &'static str {
        match self {
            BattleResult::Win => "WIN",
            BattleResult::Lose => "LOSE",
            BattleResult::Run => "RUN",
        }
    }
}

/// What started a battle. Trainer indices are positions in that map's
/// trainer list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncounterSource {
    Trainer { map: MapId, index: usize },
    Bush { index: usize },
    Unknown,
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

/// Player stepped on a teleport; the world domain swaps maps.
#[derive(Event, Debug, Clone)]
pub struct MapTransitionEvent {
    pub to_map: MapId,
    pub to_x: i32,
    pub to_y: i32,
}

#[derive(Event, Debug, Clone)]
pub struct PlaySfxEvent {
    pub sfx_id: String,
}

#[derive(Event, Debug, Clone)]
pub struct PlayMusicEvent {
    pub track_id: String,
}

/// Short on-screen message.
#[derive(Event, Debug, Clone)]
pub struct ToastEvent {
    pub message: String,
    pub duration_secs: f32,
}

// ═══════════════════════════════════════════════════════════════════════
// INPUT
// ═══════════════════════════════════════════════════════════════════════

/// Game actions for the current frame. Rebuilt from hardware input every
/// PreUpdate; edge-triggered fields are true for exactly one frame.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerInput {
    /// Normalized movement in map space (y down).
    pub move_axis: Vec2,
    /// SPACE: challenge a trainer, leave a finished battle.
    pub interact: bool,
    /// E: search the bush the player is standing in.
    pub search: bool,
    pub battle_attack: bool,
    pub battle_run: bool,
    pub battle_catch: bool,
    pub quicksave: bool,
    pub quickload: bool,
    pub volume_up: bool,
    pub volume_down: bool,
    /// B: open or close the bag panel.
    pub toggle_bag: bool,
    pub toggle_mute: bool,
    /// Debug view of trainer sight lines.
    pub toggle_hitboxes: bool,
}

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputContext {
    #[default]
    Disabled,
    Overworld,
    Battle,
}

#[derive(Resource, Debug, Clone)]
pub struct KeyBindings {
    pub move_up: KeyCode,
    pub move_down: KeyCode,
    pub move_left: KeyCode,
    pub move_right: KeyCode,
    pub interact: KeyCode,
    pub search: KeyCode,
    pub attack: KeyCode,
    pub run: KeyCode,
    pub catch: KeyCode,
    pub bag: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_up: KeyCode::KeyW,
            move_down: KeyCode::KeyS,
            move_left: KeyCode::KeyA,
            move_right: KeyCode::KeyD,
            interact: KeyCode::Space,
            search: KeyCode::KeyE,
            attack: KeyCode::Digit1,
            run: KeyCode::Digit2,
            catch: KeyCode::Digit3,
            bag: KeyCode::KeyB,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_touching_edges_do_not_intersect() {
        let a = Bounds::new(0.0, 0.0, TILE_SIZE, TILE_SIZE);
        let b = Bounds::new(TILE_SIZE, 0.0, TILE_SIZE, TILE_SIZE);
        assert!(!a.intersects(&b));
        let c = Bounds::new(TILE_SIZE - 1.0, 0.0, TILE_SIZE, TILE_SIZE);
        assert!(a.intersects(&c));
        assert!(c.intersects(&a));
    }

    #[test]
    fn test_monster_missing_stats_use_fallbacks() {
        let m: Monster = serde_json::from_str(r#"{"name":"Blob"}"#).unwrap();
        assert_eq!(m.atk, 50);
        assert_eq!(m.defense, 40);
        assert_eq!(m.level, 1);
        assert!(m.sprite_path.is_empty());
    }

    #[test]
    fn test_battle_result_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&BattleResult::Run).unwrap(), "\"run\"");
        let none: Option<BattleResult> = serde_json::from_str("null").unwrap();
        assert_eq!(none, None);
    }

    #[test]
    fn test_map_id_serializes_as_name() {
        let text = serde_json::to_string(&MapId::Route).unwrap();
        assert_eq!(text, format!("\"{}\"", MapId::Route.name()));
    }

    #[test]
    fn test_player_tile_uses_hitbox_center() {
        let mut player = PlayerState::default();
        player.position = Vec2::new(TILE_SIZE * 2.0 + 15.0, TILE_SIZE * 3.0 - 15.0);
        assert_eq!(player.tile(), (2, 3));
        player.position.x += 2.0;
        assert_eq!(player.tile(), (3, 3));
    }

    #[test]
    fn test_facing_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Facing::Left).unwrap(), "\"LEFT\"");
    }

    #[test]
    fn test_missing_max_hp_follows_hp() {
        let m: Monster = serde_json::from_str(r#"{"name":"Blob","hp":50}"#).unwrap();
        assert_eq!(m.hp, 50);
        assert_eq!(m.max_hp, 50);

        let m: Monster = serde_json::from_str(r#"{"name":"Blob","max_hp":30}"#).unwrap();
        assert_eq!(m.hp, 30);
    }

    #[test]
    fn test_loaded_stats_are_clamped() {
        let m: Monster =
            serde_json::from_str(r#"{"name":"Blob","hp":-5,"max_hp":20,"level":0}"#).unwrap();
        assert_eq!(m.hp, 0);
        assert_eq!(m.level, 1);

        let m: Monster = serde_json::from_str(r#"{"name":"Blob","hp":90,"max_hp":20}"#).unwrap();
        assert_eq!(m.hp, 20);

        let m: Monster = serde_json::from_str(r#"{"name":"Blob","hp":0,"max_hp":-3}"#).unwrap();
        assert_eq!(m.max_hp, 1);
        assert_eq!(m.hp, 0);
        assert!(m.is_fainted());
    }

    #[test]
    fn test_sanitize_keeps_valid_monster() {
        let mut m = Monster::new("Sprig", 30, 3, 10, 10);
        m.hp = 12;
        let before = m.clone();
        m.sanitize();
        assert_eq!(m, before);
    }

    #[test]
    fn test_take_damage_saturates() {
        let mut m = Monster::new("Sprig", 30, 3, 10, 10);
        m.hp = i32::MIN + 1;
        assert_eq!(m.take_damage(i32::MAX), 0);
    }

    #[test]
    fn test_take_damage_clamps_at_zero() {
        let mut m = Monster::new("Sprig", 30, 3, 10, 10);
        assert_eq!(m.take_damage(12), 18);
        assert_eq!(m.take_damage(100), 0);
        assert!(m.is_fainted());
    }
}
