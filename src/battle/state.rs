//! The turn-based battle itself, free of any ECS access.
//!
//! The player always acts first. Every action returns an `ActionOutcome`
//! so the driving systems can log, play sounds and request saves without
//! peeking into the battle's internals.

use bevy::log::warn;
use rand::Rng;

use crate::bag::Bag;
use crate::scene::BattleEntry;
use crate::shared::*;
use crate::world::WorldState;

/// Percent chance that a thrown ball catches a wild monster.
pub const CATCH_CHANCE: u32 = 10;
/// Seconds the enemy waits before acting.
pub const DEFAULT_ENEMY_TURN_DELAY: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    PlayerTurn,
    EnemyTurn,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Player,
    Enemy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Not this side's turn, or the battle is over.
    Ignored,
    Hit {
        attacker: Side,
        damage: i32,
        remaining_hp: i32,
    },
    NoCatchItem,
    CatchFailed,
    Caught(String),
    Fled,
}

impl ActionOutcome {
    /// Actions that changed persistent state mid-battle.
    pub fn requests_autosave(&self) -> bool {
        matches!(
            self,
            ActionOutcome::Hit { .. } | ActionOutcome::CatchFailed | ActionOutcome::Caught(_)
        )
    }
}

/// `max(1, atk - floor(defense / 2))`
pub fn compute_damage(atk: i32, defense: i32) -> i32 {
    atk.saturating_sub(defense.div_euclid(2)).max(1)
}

#[derive(Debug, Clone)]
pub struct Battle {
    pub phase: TurnPhase,
    pub result: Option<BattleResult>,
    pub is_wild: bool,
    pub source: EncounterSource,
    /// Roster slot of the player's monster. `None` fights with `stand_in`.
    pub player_slot: Option<usize>,
    pub stand_in: Monster,
    /// Working copy. Wild pool templates are never touched.
    pub enemy: Monster,
    pub turn_timer: f32,
    pub enemy_turn_delay: f32,
}

impl Battle {
    pub fn new(entry: BattleEntry) -> Self {
        Self {
            phase: TurnPhase::PlayerTurn,
            result: None,
            is_wild: entry.is_wild,
            source: entry.source,
            player_slot: entry.player_slot,
            stand_in: entry.player,
            enemy: entry.enemy,
            turn_timer: 0.0,
            enemy_turn_delay: DEFAULT_ENEMY_TURN_DELAY,
        }
    }

    pub fn with_enemy_turn_delay(mut self, delay: f32) -> Self {
        self.enemy_turn_delay = delay;
        self
    }

    /// The monster fighting for the player: the roster entry when there is
    /// one, the stand-in otherwise.
    pub fn player<'a>(&'a self, bag: &'a Bag) -> &'a Monster {
        self.player_slot
            .and_then(|slot| bag.monsters.get(slot))
            .unwrap_or(&self.stand_in)
    }

    pub fn player_mut<'a>(&'a mut self, bag: &'a mut Bag) -> &'a mut Monster {
        match self.player_slot.and_then(|slot| bag.monsters.get_mut(slot)) {
            Some(monster) => monster,
            None => &mut self.stand_in,
        }
    }

    pub fn is_over(&self) -> bool {
        self.phase == TurnPhase::Ended
    }

    fn end(&mut self, result: BattleResult) {
        self.phase = TurnPhase::Ended;
        self.result = Some(result);
    }

    pub fn player_attack(&mut self, bag: &mut Bag) -> ActionOutcome {
        if self.phase != TurnPhase::PlayerTurn {
            return ActionOutcome::Ignored;
        }
        let atk = self.player(bag).atk;
        let damage = compute_damage(atk, self.enemy.defense);
        let remaining_hp = self.enemy.take_damage(damage);

        if self.enemy.is_fainted() {
            self.end(BattleResult::Win);
        } else {
            self.phase = TurnPhase::EnemyTurn;
            self.turn_timer = 0.0;
        }
        ActionOutcome::Hit {
            attacker: Side::Player,
            damage,
            remaining_hp,
        }
    }

    /// Throw a ball with a fresh roll from `rng`.
    pub fn attempt_catch(&mut self, bag: &mut Bag, rng: &mut impl Rng) -> ActionOutcome {
        let roll = rng.gen_range(1..=100);
        self.resolve_catch(bag, roll)
    }

    /// Throw a ball. `roll` is in `1..=100` and catches at or under
    /// `CATCH_CHANCE`. A failed throw still uses the ball and the turn.
    pub fn resolve_catch(&mut self, bag: &mut Bag, roll: u32) -> ActionOutcome {
        if self.phase != TurnPhase::PlayerTurn || !self.is_wild {
            return ActionOutcome::Ignored;
        }
        if !bag.remove_item(CATCH_ITEM, 1) {
            return ActionOutcome::NoCatchItem;
        }

        if roll <= CATCH_CHANCE {
            let caught = self.enemy.clone();
            let name = caught.name.clone();
            bag.add_monster(caught);
            self.end(BattleResult::Win);
            ActionOutcome::Caught(name)
        } else {
            self.phase = TurnPhase::EnemyTurn;
            self.turn_timer = 0.0;
            ActionOutcome::CatchFailed
        }
    }

    pub fn run(&mut self) -> ActionOutcome {
        if self.phase != TurnPhase::PlayerTurn {
            return ActionOutcome::Ignored;
        }
        self.end(BattleResult::Run);
        ActionOutcome::Fled
    }

    /// Advance the enemy's delay. The enemy strikes once the accumulated
    /// time is strictly greater than the delay.
    pub fn tick(&mut self, dt: f32, bag: &mut Bag) -> ActionOutcome {
        if self.phase != TurnPhase::EnemyTurn {
            return ActionOutcome::Ignored;
        }
        self.turn_timer += dt;
        if self.turn_timer <= self.enemy_turn_delay {
            return ActionOutcome::Ignored;
        }
        self.turn_timer = 0.0;

        let atk = self.enemy.atk;
        let player = self.player_mut(bag);
        let damage = compute_damage(atk, player.defense);
        let remaining_hp = player.take_damage(damage);
        let fainted = player.is_fainted();

        if fainted {
            self.end(BattleResult::Lose);
        } else {
            self.phase = TurnPhase::PlayerTurn;
        }
        ActionOutcome::Hit {
            attacker: Side::Enemy,
            damage,
            remaining_hp,
        }
    }

    /// Leaving the battle. A trainer gets the working copy of its monster
    /// back so the damage sticks; wild templates were never borrowed.
    pub fn finish(&self, world: &mut WorldState) -> Option<BattleResult> {
        if let EncounterSource::Trainer { map, index } = self.source {
            match world.trainer_mut(map, index) {
                Some(trainer) => trainer.monster = Some(self.enemy.clone()),
                None => warn!("Trainer {} on {} no longer exists.", index, map.name()),
            }
        }
        self.result
    }

    pub fn turn_label(&self) -> String {
        match (self.phase, self.result) {
            (TurnPhase::PlayerTurn, _) => "Your turn".to_string(),
            (TurnPhase::EnemyTurn, _) => "Enemy's turn".to_string(),
            (TurnPhase::Ended, Some(result)) => format!("Battle over: {}", result.label()),
            (TurnPhase::Ended, None) => "Battle over".to_string(),
        }
    }
}
