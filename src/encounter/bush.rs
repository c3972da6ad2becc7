//! Tall grass patches that can start a wild battle.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::shared::*;

/// Chance that searching a bush turns up a wild monster.
pub const WILD_ENCOUNTER_CHANCE: f64 = 0.9;

#[derive(Debug, Clone, PartialEq)]
pub struct BushEncounter {
    /// Tile coordinates.
    pub x: i32,
    pub y: i32,
    pub detected: bool,
}

impl BushEncounter {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y, detected: false }
    }

    pub fn hitbox(&self) -> Bounds {
        Bounds::tile_at(tile_to_world(self.x, self.y))
    }

    pub fn update_detection(&mut self, player: &Bounds) -> bool {
        self.detected = self.hitbox().intersects(player);
        self.detected
    }
}

/// `roll` is uniform in [0, 1).
pub fn roll_triggers(roll: f64) -> bool {
    roll < WILD_ENCOUNTER_CHANCE
}

/// Uniform pick from the map's wild pool. The pool entry is cloned, never
/// handed out for mutation.
pub fn pick_wild(pool: &[Monster], rng: &mut impl Rng) -> Option<Monster> {
    pool.choose(rng).cloned()
}

/// The first detected bush, if the player is standing in one.
pub fn detected_bush(bushes: &[BushEncounter]) -> Option<usize> {
    bushes.iter().position(|b| b.detected)
}
