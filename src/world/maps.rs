//! Map data definitions for every game area.
//!
//! Each map is a 2D grid of TileKind values plus teleports, the wild
//! encounter pool and trainer placements.

use crate::data::monsters::build_monster;
use crate::shared::*;

/// Complete definition of a game map.
#[derive(Debug, Clone)]
pub struct MapDef {
    pub id: MapId,
    pub width: usize,
    pub height: usize,
    /// Row-major tile data: tiles[y * width + x]
    pub tiles: Vec<TileKind>,
    pub teleports: Vec<Teleport>,
    /// Species that can jump out of the tall grass. Empty means no bushes.
    pub wild_pool: Vec<Monster>,
    pub trainers: Vec<TrainerPlacement>,
    /// Where a new game puts the player, in tiles.
    pub spawn: (i32, i32),
}

impl MapDef {
    pub fn get_tile(&self, x: i32, y: i32) -> TileKind {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            TileKind::Void
        } else {
            self.tiles[y as usize * self.width + x as usize]
        }
    }

    /// Tile positions of every tall grass patch, row-major.
    pub fn tall_grass_tiles(&self) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.tiles[y * self.width + x] == TileKind::TallGrass {
                    out.push((x as i32, y as i32));
                }
            }
        }
        out
    }
}

/// Stepping on tile (x, y) moves the player to (to_x, to_y) on `to_map`.
#[derive(Debug, Clone, PartialEq)]
pub struct Teleport {
    pub x: i32,
    pub y: i32,
    pub to_map: MapId,
    pub to_x: i32,
    pub to_y: i32,
}

/// A trainer as the map designer placed it.
#[derive(Debug, Clone)]
pub struct TrainerPlacement {
    pub x: i32,
    pub y: i32,
    pub facing: Facing,
    pub max_tiles: Option<u32>,
    pub monster: Option<Monster>,
}

// ═══════════════════════════════════════════════════════════════════════
// MAP GENERATORS
// ═══════════════════════════════════════════════════════════════════════

pub fn generate_map(map_id: MapId) -> MapDef {
    match map_id {
        MapId::Town => generate_town(),
        MapId::Route => generate_route(),
    }
}

fn fill_rect(
    tiles: &mut [TileKind],
    w: usize,
    h: usize,
    (x0, y0, rw, rh): (usize, usize, usize, usize),
    kind: TileKind,
) {
    for dy in 0..rh {
        for dx in 0..rw {
            let xx = x0 + dx;
            let yy = y0 + dy;
            if xx < w && yy < h {
                tiles[yy * w + xx] = kind;
            }
        }
    }
}

/// Trees on every edge tile.
fn tree_border(tiles: &mut [TileKind], w: usize, h: usize) {
    fill_rect(tiles, w, h, (0, 0, w, 1), TileKind::Tree);
    fill_rect(tiles, w, h, (0, h - 1, w, 1), TileKind::Tree);
    fill_rect(tiles, w, h, (0, 0, 1, h), TileKind::Tree);
    fill_rect(tiles, w, h, (w - 1, 0, 1, h), TileKind::Tree);
}

// ---------------------------------------------------------------------------
// Town: 24x16
// Layout: pond top-left, east-west road through the middle, exit east
// ---------------------------------------------------------------------------
fn generate_town() -> MapDef {
    let w = 24usize;
    let h = 16usize;
    let mut tiles = vec![TileKind::Grass; w * h];
    tree_border(&mut tiles, w, h);

    // Main road, open on the east edge
    fill_rect(&mut tiles, w, h, (1, 7, 23, 2), TileKind::Path);
    // Pond with a sandy rim
    fill_rect(&mut tiles, w, h, (2, 1, 6, 5), TileKind::Sand);
    fill_rect(&mut tiles, w, h, (3, 2, 4, 3), TileKind::Water);
    // Square in front of the gym
    fill_rect(&mut tiles, w, h, (11, 2, 4, 4), TileKind::Sand);

    let teleports = vec![
        Teleport { x: 23, y: 7, to_map: MapId::Route, to_x: 1, to_y: 7 },
        Teleport { x: 23, y: 8, to_map: MapId::Route, to_x: 1, to_y: 8 },
    ];

    let trainers = vec![
        // Gym guard looking down onto the road
        TrainerPlacement {
            x: 12,
            y: 3,
            facing: Facing::Down,
            max_tiles: Some(4),
            monster: build_monster("Bulbasaur", 6),
        },
        // Youngster by the south fence
        TrainerPlacement {
            x: 6,
            y: 12,
            facing: Facing::Right,
            max_tiles: None,
            monster: build_monster("Squirtle", 5),
        },
    ];

    MapDef {
        id: MapId::Town,
        width: w,
        height: h,
        tiles,
        teleports,
        wild_pool: Vec::new(),
        trainers,
        spawn: (4, 7),
    }
}

// ---------------------------------------------------------------------------
// Route: 28x16
// Layout: road from the west gate, three tall grass patches
// ---------------------------------------------------------------------------
fn generate_route() -> MapDef {
    let w = 28usize;
    let h = 16usize;
    let mut tiles = vec![TileKind::Grass; w * h];
    tree_border(&mut tiles, w, h);

    // Road, open on the west edge
    fill_rect(&mut tiles, w, h, (0, 7, 27, 2), TileKind::Path);
    // Tall grass patches
    fill_rect(&mut tiles, w, h, (4, 2, 6, 4), TileKind::TallGrass);
    fill_rect(&mut tiles, w, h, (14, 10, 6, 4), TileKind::TallGrass);
    fill_rect(&mut tiles, w, h, (20, 2, 6, 3), TileKind::TallGrass);
    // Stream
    fill_rect(&mut tiles, w, h, (11, 1, 2, 6), TileKind::Water);

    let teleports = vec![
        Teleport { x: 0, y: 7, to_map: MapId::Town, to_x: 22, to_y: 7 },
        Teleport { x: 0, y: 8, to_map: MapId::Town, to_x: 22, to_y: 8 },
    ];

    let wild_pool = ["Pidgey", "Rattata", "Caterpie"]
        .iter()
        .zip([3, 3, 4])
        .filter_map(|(species, level)| build_monster(species, level))
        .collect();

    let trainers = vec![TrainerPlacement {
        x: 25,
        y: 8,
        facing: Facing::Left,
        max_tiles: Some(4),
        monster: build_monster("Gengar", 9),
    }];

    MapDef {
        id: MapId::Route,
        width: w,
        height: h,
        tiles,
        teleports,
        wild_pool,
        trainers,
        spawn: (1, 7),
    }
}
