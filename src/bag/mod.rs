//! The player's bag: the monster roster and the item list.
//!
//! The first roster entry is the active battler. Item names are matched
//! case-insensitively and the first match wins; duplicate names are not
//! prevented.

use bevy::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};

use crate::shared::*;

#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bag {
    #[serde(deserialize_with = "null_as_empty")]
    pub monsters: Vec<Monster>,
    #[serde(deserialize_with = "null_as_empty")]
    pub items: Vec<ItemStack>,
}

/// A `null` collection reads as an empty one.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Bag {
    pub fn new(monsters: Vec<Monster>, items: Vec<ItemStack>) -> Self {
        Self { monsters, items }
    }

    fn position_of(&self, item_name: &str) -> Option<usize> {
        let wanted = item_name.to_lowercase();
        self.items
            .iter()
            .position(|item| item.name.to_lowercase() == wanted)
    }

    pub fn get_item(&self, item_name: &str) -> Option<&ItemStack> {
        self.position_of(item_name).map(|i| &self.items[i])
    }

    pub fn has_item(&self, item_name: &str) -> bool {
        self.get_item(item_name).is_some_and(|item| item.count > 0)
    }

    /// Consume `count` of an item. The entry disappears when it reaches
    /// zero. Returns false and leaves the bag untouched if the item is
    /// missing or there are not enough of it.
    pub fn remove_item(&mut self, item_name: &str, count: u32) -> bool {
        let Some(index) = self.position_of(item_name) else {
            warn!(
                "Failed to remove {} x {}. Item not found.",
                count, item_name
            );
            return false;
        };

        let item = &mut self.items[index];
        if item.count < count {
            warn!(
                "Failed to remove {} x {}. Only {} left.",
                count, item_name, item.count
            );
            return false;
        }

        item.count -= count;
        let remaining = item.count;
        if remaining == 0 {
            self.items.remove(index);
        }
        info!("Removed {} x {}. Remaining: {}", count, item_name, remaining);
        true
    }

    /// Add to the first stack with a matching name, or start a new one.
    pub fn add_item(&mut self, item_name: &str, count: u32, sprite_path: &str) {
        if count == 0 {
            return;
        }
        match self.position_of(item_name) {
            Some(index) => self.items[index].count += count,
            None => self
                .items
                .push(ItemStack::new(item_name, count, sprite_path)),
        }
        info!("Added {} x {} to bag.", count, item_name);
    }

    pub fn add_monster(&mut self, monster: Monster) {
        info!("Monster {} added to bag.", monster.name);
        self.monsters.push(monster);
    }

    /// Roster index of the active battler, if the roster is not empty.
    pub fn active_slot(&self) -> Option<usize> {
        if self.monsters.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    pub fn active_monster(&self) -> Option<&Monster> {
        self.monsters.first()
    }

    pub fn heal_all(&mut self) {
        for monster in self.monsters.iter_mut() {
            monster.hp = monster.max_hp;
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "monsters": self.monsters,
            "items": self.items,
        })
    }

    /// Missing or `null` keys default to empty collections. Monster stats
    /// are clamped on the way in. A value that cannot be read at all
    /// yields an empty bag.
    pub fn from_value(value: serde_json::Value) -> Self {
        match serde_json::from_value(value) {
            Ok(bag) => bag,
            Err(e) => {
                warn!("Malformed bag data ({}), starting with an empty bag.", e);
                Self::default()
            }
        }
    }
}
