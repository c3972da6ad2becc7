//! Trainers: line of sight, detection and challenge range.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::*;
use crate::world::maps::TrainerPlacement;

/// Line of sight length when a trainer does not set one.
pub const DEFAULT_SIGHT_TILES: u32 = 2;
/// The player must be this close to challenge a detected trainer.
pub const MAX_CHALLENGE_DISTANCE: f32 = 2.0 * TILE_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainerClassification {
    #[default]
    Stationary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyTrainer {
    /// Tile coordinates.
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub classification: TrainerClassification,
    #[serde(default)]
    pub facing: Facing,
    #[serde(default)]
    pub max_tiles: Option<u32>,
    #[serde(default)]
    pub monster: Option<Monster>,
    #[serde(skip)]
    pub detected: bool,
}

impl EnemyTrainer {
    pub fn new(x: i32, y: i32, facing: Facing, monster: Option<Monster>) -> Self {
        Self {
            x,
            y,
            classification: TrainerClassification::Stationary,
            facing,
            max_tiles: None,
            monster,
            detected: false,
        }
    }

    pub fn from_placement(placement: &TrainerPlacement) -> Self {
        Self {
            max_tiles: placement.max_tiles,
            ..Self::new(placement.x, placement.y, placement.facing, placement.monster.clone())
        }
    }

    /// Map-space position of the trainer's tile.
    pub fn position(&self) -> Vec2 {
        tile_to_world(self.x, self.y)
    }

    pub fn hitbox(&self) -> Bounds {
        Bounds::tile_at(self.position())
    }

    pub fn sight_tiles(&self) -> u32 {
        self.max_tiles.unwrap_or(DEFAULT_SIGHT_TILES)
    }

    /// One tile wide, `sight_tiles` long, starting next to the trainer.
    pub fn los_rect(&self) -> Bounds {
        let Vec2 { x, y } = self.position();
        let d = self.sight_tiles() as f32 * TILE_SIZE;
        match self.facing {
            Facing::Up => Bounds::new(x, y - d, TILE_SIZE, d),
            Facing::Down => Bounds::new(x, y + TILE_SIZE, TILE_SIZE, d),
            Facing::Left => Bounds::new(x - d, y, d, TILE_SIZE),
            Facing::Right => Bounds::new(x + TILE_SIZE, y, d, TILE_SIZE),
        }
    }

    /// A trainer whose monster has fainted has nothing left to fight with.
    pub fn can_battle(&self) -> bool {
        self.monster.as_ref().map_or(true, |m| !m.is_fainted())
    }

    /// Recompute `detected` against the player's hitbox.
    pub fn update_detection(&mut self, player: &Bounds) -> bool {
        self.detected = self.can_battle() && self.los_rect().intersects(player);
        self.detected
    }

    pub fn distance_to(&self, pos: Vec2) -> f32 {
        self.position().distance(pos)
    }
}

/// Index of the detected trainer nearest to `player_pos`.
pub fn closest_detected(trainers: &[EnemyTrainer], player_pos: Vec2) -> Option<usize> {
    trainers
        .iter()
        .enumerate()
        .filter(|(_, t)| t.detected)
        .min_by(|(_, a), (_, b)| {
            a.distance_to(player_pos)
                .total_cmp(&b.distance_to(player_pos))
        })
        .map(|(i, _)| i)
}
