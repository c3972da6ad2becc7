use crate::shared::*;

/// Base stats for a species. Stats at a level are `base + per_level * level`.
#[derive(Debug, Clone, Copy)]
pub struct MonsterTemplate {
    pub name: &'static str,
    pub base_hp: i32,
    pub hp_per_level: i32,
    pub base_atk: i32,
    pub atk_per_level: i32,
    pub base_defense: i32,
    pub defense_per_level: i32,
}

impl MonsterTemplate {
    pub fn at_level(&self, level: i32) -> Monster {
        let level = level.max(1);
        Monster::new(
            self.name,
            self.base_hp + self.hp_per_level * level,
            level,
            self.base_atk + self.atk_per_level * level,
            self.base_defense + self.defense_per_level * level,
        )
    }
}

pub const STARTER_SPECIES: &str = "Pikachu";
pub const STARTER_LEVEL: i32 = 8;

pub const MONSTER_TEMPLATES: &[MonsterTemplate] = &[
    // ── Starter ─────────────────────────────────────────────────────────
    MonsterTemplate {
        name: "Pikachu",
        base_hp: 30,
        hp_per_level: 4,
        base_atk: 20,
        atk_per_level: 3,
        base_defense: 10,
        defense_per_level: 1,
    },
    // ── Route wild pool ─────────────────────────────────────────────────
    MonsterTemplate {
        name: "Pidgey",
        base_hp: 20,
        hp_per_level: 3,
        base_atk: 14,
        atk_per_level: 2,
        base_defense: 8,
        defense_per_level: 1,
    },
    MonsterTemplate {
        name: "Rattata",
        base_hp: 18,
        hp_per_level: 3,
        base_atk: 16,
        atk_per_level: 2,
        base_defense: 6,
        defense_per_level: 1,
    },
    MonsterTemplate {
        name: "Caterpie",
        base_hp: 22,
        hp_per_level: 3,
        base_atk: 10,
        atk_per_level: 1,
        base_defense: 10,
        defense_per_level: 1,
    },
    // ── Trainer monsters ────────────────────────────────────────────────
    MonsterTemplate {
        name: "Bulbasaur",
        base_hp: 28,
        hp_per_level: 4,
        base_atk: 18,
        atk_per_level: 2,
        base_defense: 12,
        defense_per_level: 2,
    },
    MonsterTemplate {
        name: "Squirtle",
        base_hp: 26,
        hp_per_level: 4,
        base_atk: 17,
        atk_per_level: 2,
        base_defense: 14,
        defense_per_level: 2,
    },
    MonsterTemplate {
        name: "Gengar",
        base_hp: 32,
        hp_per_level: 4,
        base_atk: 24,
        atk_per_level: 3,
        base_defense: 10,
        defense_per_level: 1,
    },
];

pub fn find_template(name: &str) -> Option<&'static MonsterTemplate> {
    MONSTER_TEMPLATES
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
}

/// Build a fresh, fully healed monster of `species` at `level`.
pub fn build_monster(species: &str, level: i32) -> Option<Monster> {
    find_template(species).map(|t| t.at_level(level))
}
