//! World domain plugin for Tallgrass.
//!
//! Responsible for:
//! - Generating and rendering tile maps
//! - Collision and teleport queries
//! - Map switching
//! - Trainer state for every visited map, bushes for the current one

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::encounter::bush::BushEncounter;
use crate::encounter::trainer::EnemyTrainer;
use crate::save::LoadCompleteEvent;
use crate::settings::{GameSettings, SETTINGS_PATH};
use crate::shared::*;

pub mod maps;

use maps::{generate_map, MapDef, Teleport};

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WorldState>()
            .add_systems(OnEnter(GameState::Overworld), spawn_map_sprites)
            .add_systems(OnExit(GameState::Overworld), despawn_map_sprites)
            .add_systems(
                Update,
                handle_map_transition
                    .in_set(OverworldSet::World)
                    .run_if(in_state(GameState::Overworld)),
            )
            .add_systems(
                Update,
                respawn_after_load
                    .after(crate::save::handle_load_request)
                    .run_if(in_state(GameState::Overworld)),
            )
            .add_systems(
                Update,
                toggle_hitboxes
                    .after(OverworldSet::World)
                    .run_if(in_state(GameState::Overworld)),
            )
            .add_systems(
                Update,
                tint_detected
                    .after(OverworldSet::Encounter)
                    .run_if(in_state(GameState::Overworld)),
            );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// RESOURCES
// ═══════════════════════════════════════════════════════════════════════

/// The loaded map plus everything on it that can change.
#[derive(Resource, Debug, Clone)]
pub struct WorldState {
    pub map: MapDef,
    /// Only populated on maps with a wild pool.
    pub bushes: Vec<BushEncounter>,
    /// Trainers per visited map. A map's entry is seeded from its
    /// placements the first time it is entered and kept afterwards.
    pub trainers: BTreeMap<MapId, Vec<EnemyTrainer>>,
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new(MapId::default())
    }
}

/// The persisted part of the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub name: MapId,
    #[serde(default)]
    pub trainers: BTreeMap<MapId, Vec<EnemyTrainer>>,
}

impl WorldState {
    pub fn new(map_id: MapId) -> Self {
        let mut world = Self {
            map: generate_map(map_id),
            bushes: Vec::new(),
            trainers: BTreeMap::new(),
        };
        world.enter_map(map_id);
        world
    }

    pub fn current_map(&self) -> MapId {
        self.map.id
    }

    pub fn enter_map(&mut self, map_id: MapId) {
        self.map = generate_map(map_id);

        self.bushes = if self.map.wild_pool.is_empty() {
            Vec::new()
        } else {
            self.map
                .tall_grass_tiles()
                .into_iter()
                .map(|(x, y)| BushEncounter::new(x, y))
                .collect()
        };

        let placements = &self.map.trainers;
        self.trainers
            .entry(map_id)
            .or_insert_with(|| placements.iter().map(EnemyTrainer::from_placement).collect());

        info!(
            "Entered map {} ({} bushes, {} trainers).",
            map_id.name(),
            self.bushes.len(),
            self.trainers().len()
        );
    }

    /// Trainers on the current map.
    pub fn trainers(&self) -> &[EnemyTrainer] {
        self.trainers
            .get(&self.map.id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn trainers_mut(&mut self) -> &mut Vec<EnemyTrainer> {
        self.trainers.entry(self.map.id).or_default()
    }

    pub fn trainer_mut(&mut self, map: MapId, index: usize) -> Option<&mut EnemyTrainer> {
        self.trainers.get_mut(&map).and_then(|v| v.get_mut(index))
    }

    /// True if `rect` overlaps a solid tile or a trainer on the current map.
    pub fn check_collision(&self, rect: &Bounds) -> bool {
        let x0 = (rect.x / TILE_SIZE).floor() as i32;
        let y0 = (rect.y / TILE_SIZE).floor() as i32;
        let x1 = (rect.right() / TILE_SIZE).ceil() as i32 - 1;
        let y1 = (rect.bottom() / TILE_SIZE).ceil() as i32 - 1;
        for ty in y0..=y1 {
            for tx in x0..=x1 {
                if self.map.get_tile(tx, ty).is_solid() {
                    return true;
                }
            }
        }
        self.trainers().iter().any(|t| t.hitbox().intersects(rect))
    }

    /// Teleport on the tile under the center of a hitbox anchored at `pos`.
    pub fn check_teleport(&self, pos: Vec2) -> Option<Teleport> {
        let center = pos + Vec2::splat(TILE_SIZE / 2.0);
        let tx = (center.x / TILE_SIZE).floor() as i32;
        let ty = (center.y / TILE_SIZE).floor() as i32;
        self.map
            .teleports
            .iter()
            .find(|t| t.x == tx && t.y == ty)
            .cloned()
    }

    pub fn encounter_table(&self) -> (&[BushEncounter], &[Monster]) {
        (&self.bushes, &self.map.wild_pool)
    }

    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            name: self.map.id,
            trainers: self.trainers.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: &MapSnapshot) {
        self.trainers = snapshot.trainers.clone();
        self.enter_map(snapshot.name);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

/// Marker for every sprite belonging to the current map (for bulk despawn).
#[derive(Component, Debug)]
pub struct MapTile;

/// Debug overlay of a trainer's line of sight.
#[derive(Component, Debug)]
pub struct SightLine;

#[derive(Component, Debug)]
pub struct TrainerSprite {
    pub index: usize,
}

#[derive(Component, Debug)]
pub struct BushSprite {
    pub index: usize,
}

// ═══════════════════════════════════════════════════════════════════════
// COLORS
// ═══════════════════════════════════════════════════════════════════════

fn tile_color(kind: TileKind) -> Color {
    match kind {
        TileKind::Grass => Color::srgb(0.3, 0.72, 0.32),
        TileKind::TallGrass => Color::srgb(0.16, 0.5, 0.2),
        TileKind::Path => Color::srgb(0.7, 0.65, 0.5),
        TileKind::Sand => Color::srgb(0.9, 0.85, 0.6),
        TileKind::Water => Color::srgb(0.2, 0.4, 0.82),
        TileKind::Tree => Color::srgb(0.08, 0.3, 0.12),
        TileKind::Void => Color::srgb(0.08, 0.08, 0.1),
    }
}

const TRAINER_COLOR: Color = Color::srgb(0.75, 0.2, 0.2);
const TRAINER_ALERT_COLOR: Color = Color::srgb(1.0, 0.55, 0.1);
const BUSH_ALERT_COLOR: Color = Color::srgb(0.45, 0.8, 0.3);
const SIGHT_COLOR: Color = Color::srgba(1.0, 0.9, 0.2, 0.25);

// ═══════════════════════════════════════════════════════════════════════
// MAP RENDERING
// ═══════════════════════════════════════════════════════════════════════

fn spawn_map_entities(commands: &mut Commands, world: &WorldState, draw_hitboxes: bool) {
    let map = &world.map;
    for y in 0..map.height {
        for x in 0..map.width {
            let tile = map.tiles[y * map.width + x];
            commands.spawn((
                Sprite::from_color(tile_color(tile), Vec2::splat(TILE_SIZE)),
                Transform::from_translation(map_to_screen(tile_to_world(x as i32, y as i32), 0.0)),
                MapTile,
            ));
        }
    }

    for (index, bush) in world.bushes.iter().enumerate() {
        commands.spawn((
            Sprite::from_color(tile_color(TileKind::TallGrass), Vec2::splat(TILE_SIZE * 0.8)),
            Transform::from_translation(map_to_screen(tile_to_world(bush.x, bush.y), 1.0)),
            BushSprite { index },
            MapTile,
        ));
    }

    for (index, trainer) in world.trainers().iter().enumerate() {
        commands.spawn((
            Sprite::from_color(TRAINER_COLOR, Vec2::splat(TILE_SIZE * 0.9)),
            Transform::from_translation(map_to_screen(trainer.position(), 5.0)),
            TrainerSprite { index },
            MapTile,
        ));

        if draw_hitboxes {
            let los = trainer.los_rect();
            let center = Vec3::new(los.x + los.w / 2.0, -(los.y + los.h / 2.0), 4.0);
            commands.spawn((
                Sprite::from_color(SIGHT_COLOR, Vec2::new(los.w, los.h)),
                Transform::from_translation(center),
                SightLine,
                MapTile,
            ));
        }
    }
}

fn despawn_map_entities(commands: &mut Commands, tiles: &Query<Entity, With<MapTile>>) {
    for entity in tiles.iter() {
        commands.entity(entity).despawn_recursive();
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

fn spawn_map_sprites(
    mut commands: Commands,
    world: Res<WorldState>,
    settings: Res<GameSettings>,
    existing: Query<Entity, With<MapTile>>,
) {
    despawn_map_entities(&mut commands, &existing);
    spawn_map_entities(&mut commands, &world, settings.draw_hitboxes);
}

fn despawn_map_sprites(mut commands: Commands, tiles: Query<Entity, With<MapTile>>) {
    despawn_map_entities(&mut commands, &tiles);
}

/// Handle MapTransitionEvent: swap the map and move the player.
pub fn handle_map_transition(
    mut commands: Commands,
    mut events: EventReader<MapTransitionEvent>,
    tiles: Query<Entity, With<MapTile>>,
    mut world: ResMut<WorldState>,
    mut player: ResMut<PlayerState>,
    settings: Option<Res<GameSettings>>,
) {
    // Only the last transition of a frame matters.
    let Some(event) = events.read().last() else {
        return;
    };

    despawn_map_entities(&mut commands, &tiles);
    world.enter_map(event.to_map);
    player.position = tile_to_world(event.to_x, event.to_y);

    let draw_hitboxes = settings.is_some_and(|s| s.draw_hitboxes);
    spawn_map_entities(&mut commands, &world, draw_hitboxes);
}

/// A load may have switched maps or changed trainers.
fn respawn_after_load(
    mut commands: Commands,
    mut loads: EventReader<LoadCompleteEvent>,
    tiles: Query<Entity, With<MapTile>>,
    world: Res<WorldState>,
    settings: Res<GameSettings>,
) {
    let loaded = loads.read().fold(false, |acc, ev| acc || ev.success);
    if !loaded {
        return;
    }
    despawn_map_entities(&mut commands, &tiles);
    spawn_map_entities(&mut commands, &world, settings.draw_hitboxes);
}

/// `H` shows or hides trainer sight lines. The map is redrawn right away
/// and the choice is saved to the settings file.
fn toggle_hitboxes(
    mut commands: Commands,
    input: Res<PlayerInput>,
    tiles: Query<Entity, With<MapTile>>,
    world: Res<WorldState>,
    mut settings: ResMut<GameSettings>,
    mut toasts: EventWriter<ToastEvent>,
) {
    if !input.toggle_hitboxes {
        return;
    }
    let shown = settings.toggle_hitboxes();
    if let Err(e) = settings.write(SETTINGS_PATH) {
        warn!("Could not persist hitbox setting: {}", e);
    }

    despawn_map_entities(&mut commands, &tiles);
    spawn_map_entities(&mut commands, &world, shown);

    toasts.send(ToastEvent {
        message: if shown { "Hitboxes shown" } else { "Hitboxes hidden" }.to_string(),
        duration_secs: 1.0,
    });
}

fn tint_detected(
    world: Res<WorldState>,
    mut trainers: Query<(&TrainerSprite, &mut Sprite), Without<BushSprite>>,
    mut bushes: Query<(&BushSprite, &mut Sprite), Without<TrainerSprite>>,
) {
    for (marker, mut sprite) in trainers.iter_mut() {
        let detected = world.trainers().get(marker.index).is_some_and(|t| t.detected);
        sprite.color = if detected { TRAINER_ALERT_COLOR } else { TRAINER_COLOR };
    }
    for (marker, mut sprite) in bushes.iter_mut() {
        let detected = world.bushes.get(marker.index).is_some_and(|b| b.detected);
        sprite.color = if detected {
            BUSH_ALERT_COLOR
        } else {
            tile_color(TileKind::TallGrass)
        };
    }
}
