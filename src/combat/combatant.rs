//! Combatants and their inventories
//!
//! A combatant is created once at battle setup and never removed. HP only
//! moves through [`Combatant::apply_damage`] and [`Combatant::apply_heal`],
//! both of which keep it inside `[0, max_hp]`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::{CombatError, IllegalReason};
use super::items::ItemKind;
use super::stats::{RawStats, StatBounds, Stats};

/// One of the two sides in a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TeamId {
    A,
    B,
}

impl TeamId {
    /// The opposing team
    pub fn other(self) -> TeamId {
        match self {
            TeamId::A => TeamId::B,
            TeamId::B => TeamId::A,
        }
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamId::A => write!(f, "team A"),
            TeamId::B => write!(f, "team B"),
        }
    }
}

/// Consumable item counts, one independent counter per kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    counts: BTreeMap<ItemKind, u32>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper for setting a count
    pub fn with(mut self, kind: ItemKind, count: u32) -> Self {
        self.set(kind, count);
        self
    }

    pub fn set(&mut self, kind: ItemKind, count: u32) {
        if count == 0 {
            self.counts.remove(&kind);
        } else {
            self.counts.insert(kind, count);
        }
    }

    pub fn count(&self, kind: ItemKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn has(&self, kind: ItemKind) -> bool {
        self.count(kind) > 0
    }

    /// Spend one item, returning the remaining count, or `None` if none left
    pub fn take_one(&mut self, kind: ItemKind) -> Option<u32> {
        let current = self.count(kind);
        if current == 0 {
            return None;
        }
        self.set(kind, current - 1);
        Some(current - 1)
    }

    /// Iterate over kinds with a non-zero count
    pub fn iter(&self) -> impl Iterator<Item = (ItemKind, u32)> + '_ {
        self.counts.iter().map(|(k, v)| (*k, *v))
    }
}

/// Roster entry as supplied by the session layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantSpec {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub max_hp: Option<i32>,
    /// Starting HP (defaults to max, clamped into range)
    #[serde(default)]
    pub hp: Option<i32>,
    #[serde(default)]
    pub stats: RawStats,
    /// Starting items (defaults to the configured starting inventory)
    #[serde(default)]
    pub inventory: Option<Inventory>,
}

impl CombatantSpec {
    pub fn new(id: impl Into<String>, stats: RawStats) -> Self {
        Self {
            id: id.into(),
            name: None,
            max_hp: None,
            hp: None,
            stats,
            inventory: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_max_hp(mut self, max_hp: i32) -> Self {
        self.max_hp = Some(max_hp);
        self
    }

    pub fn with_hp(mut self, hp: i32) -> Self {
        self.hp = Some(hp);
        self
    }

    pub fn with_inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = Some(inventory);
        self
    }
}

/// A participant in a battle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: String,
    pub name: String,
    pub team: TeamId,
    hp: i32,
    max_hp: i32,
    pub stats: Stats,
    pub inventory: Inventory,
    /// Defending stance, set by `defend` and cleared when this combatant's
    /// next turn begins
    pub defending: bool,
}

impl Combatant {
    /// Build a combatant from a roster entry
    pub fn from_spec(
        spec: &CombatantSpec,
        team: TeamId,
        bounds: &StatBounds,
        default_max_hp: i32,
        starting_items: &Inventory,
    ) -> Result<Self, CombatError> {
        if spec.id.trim().is_empty() {
            return Err(CombatError::InvalidSetup(
                "combatant id must not be empty".to_string(),
            ));
        }

        let max_hp = spec.max_hp.unwrap_or(default_max_hp);
        if max_hp <= 0 {
            return Err(CombatError::InvalidSetup(format!(
                "{}: max_hp must be positive, got {}",
                spec.id, max_hp
            )));
        }

        Ok(Self {
            id: spec.id.clone(),
            name: spec.name.clone().unwrap_or_else(|| spec.id.clone()),
            team,
            hp: spec.hp.unwrap_or(max_hp).clamp(0, max_hp),
            max_hp,
            stats: bounds.normalize(&spec.stats),
            inventory: spec
                .inventory
                .clone()
                .unwrap_or_else(|| starting_items.clone()),
            defending: false,
        })
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Reduce HP, never below 0. Returns the new HP.
    pub fn apply_damage(&mut self, amount: i32) -> i32 {
        let amount = amount.max(0);
        self.hp = self.hp.saturating_sub(amount).clamp(0, self.max_hp);
        self.hp
    }

    /// Restore HP, never above max. Returns the new HP.
    ///
    /// A defeated combatant cannot be healed back through this path.
    pub fn apply_heal(&mut self, amount: i32) -> Result<i32, CombatError> {
        if !self.is_alive() {
            return Err(CombatError::IllegalAction(IllegalReason::TargetDefeated));
        }
        let amount = amount.max(0);
        self.hp = self.hp.saturating_add(amount).clamp(0, self.max_hp);
        Ok(self.hp)
    }

    /// Drop straight to 0 HP (forfeit/disconnect)
    pub fn knock_out(&mut self) {
        self.hp = 0;
        self.defending = false;
    }
}
