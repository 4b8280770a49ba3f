//! Battle configuration
//!
//! Every rule constant the engine uses lives here. Values are layered with
//! figment: built-in defaults, then an optional TOML file, then
//! `SKIRMISH_`-prefixed environment variables (`__` separates nested keys,
//! e.g. `SKIRMISH_STAT_BOUNDS__MAX=10`).

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::combat::{CombatError, CombatantSpec, EffectExpiry, Inventory, ItemKind, StatBounds};

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "SKIRMISH_";

/// Largest die the engine will roll
pub const MAX_DIE_SIDES: u32 = 1_000;

/// Largest attack score multiplier an item may apply
pub const MAX_SCORE_MULTIPLIER: i32 = 100;

/// Largest magnitude either stat bound may take
pub const MAX_STAT_MAGNITUDE: i32 = 1_000;

/// What an attack without an explicit target does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetFallback {
    /// Reject the action; the turn stays pending
    #[default]
    Require,
    /// Aim at the first living enemy in roster order
    FirstLivingEnemy,
}

/// Lowest damage a landed hit can deal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageFloor {
    /// Target not defending
    pub normal: i32,
    /// Target in the defending stance
    pub defending: i32,
}

impl Default for DamageFloor {
    fn default() -> Self {
        Self {
            normal: 1,
            defending: 0,
        }
    }
}

/// Rules for a single battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Canonical stat range (default 1..=5, midpoint 3)
    pub stat_bounds: StatBounds,
    /// Max HP for roster entries that don't set one
    pub default_max_hp: i32,
    /// Inventory for roster entries that don't set one
    pub starting_items: Inventory,
    /// Sides on the attack, evasion and critical dice
    pub die_sides: u32,
    /// Critical when crit roll >= crit_base - luck / crit_luck_divisor
    pub crit_base: i32,
    pub crit_luck_divisor: i32,
    pub damage_floor: DamageFloor,
    /// Defense bonus pushed by the `defend` action
    pub defend_bonus: i32,
    /// Evasion bonus pushed by the `dodge` action
    pub dodge_bonus: i32,
    pub heal_amount: i32,
    pub attack_boost_chance: f64,
    /// Attack score multiplier for a successful attack boost item
    pub attack_boost_multiplier: i32,
    pub defense_boost_chance: f64,
    pub defense_boost_amount: i32,
    /// Full rounds before the battle is decided by survivors
    pub max_rounds: u32,
    pub effect_expiry: EffectExpiry,
    pub target_fallback: TargetFallback,
    /// Hold the battle in `Waiting` until every combatant is marked ready
    pub require_ready: bool,
    /// Records kept in the rolling battle log
    pub log_capacity: usize,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            stat_bounds: StatBounds::default(),
            default_max_hp: 100,
            starting_items: Inventory::new()
                .with(ItemKind::Heal, 1)
                .with(ItemKind::AttackBoost, 1)
                .with(ItemKind::DefenseBoost, 1),
            die_sides: 20,
            crit_base: 20,
            crit_luck_divisor: 2,
            damage_floor: DamageFloor::default(),
            defend_bonus: 2,
            dodge_bonus: 5,
            heal_amount: 10,
            attack_boost_chance: 0.10,
            attack_boost_multiplier: 2,
            defense_boost_chance: 0.10,
            defense_boost_amount: 2,
            max_rounds: 30,
            effect_expiry: EffectExpiry::UntilConsumed,
            target_fallback: TargetFallback::Require,
            require_ready: false,
            log_capacity: 256,
        }
    }
}

impl BattleConfig {
    /// Figment with defaults, an optional TOML file and env overrides
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(BattleConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load configuration from all layers
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        Self::figment(path).extract()
    }

    /// Critical threshold for a given luck stat
    pub fn crit_threshold(&self, luck: i32) -> i32 {
        self.crit_base
            .saturating_sub(luck.div_euclid(self.crit_luck_divisor.max(1)))
    }

    /// Reject rule combinations the engine cannot honour
    pub fn validate(&self) -> Result<(), CombatError> {
        let invalid = |msg: String| Err(CombatError::InvalidSetup(msg));

        let bounds = self.stat_bounds;
        if !bounds.is_valid()
            || bounds.min < -MAX_STAT_MAGNITUDE
            || bounds.max > MAX_STAT_MAGNITUDE
        {
            return invalid(format!("invalid stat bounds {:?}", bounds));
        }
        if self.default_max_hp <= 0 {
            return invalid("default_max_hp must be positive".to_string());
        }
        if !(1..=MAX_DIE_SIDES).contains(&self.die_sides) {
            return invalid(format!("die_sides must be within 1..={}", MAX_DIE_SIDES));
        }
        if self.crit_luck_divisor <= 0 {
            return invalid("crit_luck_divisor must be positive".to_string());
        }
        for (name, p) in [
            ("attack_boost_chance", self.attack_boost_chance),
            ("defense_boost_chance", self.defense_boost_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return invalid(format!("{} must be within [0, 1], got {}", name, p));
            }
        }
        if !(1..=MAX_SCORE_MULTIPLIER).contains(&self.attack_boost_multiplier) {
            return invalid(format!(
                "attack_boost_multiplier must be within 1..={}",
                MAX_SCORE_MULTIPLIER
            ));
        }
        if self.damage_floor.normal < 0 || self.damage_floor.defending < 0 {
            return invalid("damage floors must not be negative".to_string());
        }
        if self.heal_amount < 0 {
            return invalid("heal_amount must not be negative".to_string());
        }
        if self.log_capacity == 0 {
            return invalid("log_capacity must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Two team rosters read from a TOML file
///
/// ```toml
/// [[team_a]]
/// id = "knight"
/// stats = { attack = 4, defense = 4 }
///
/// [[team_b]]
/// id = "orc"
/// max_hp = 120
/// inventory = { heal = 2 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterFile {
    pub team_a: Vec<CombatantSpec>,
    pub team_b: Vec<CombatantSpec>,
}

impl RosterFile {
    pub fn load(path: &Path) -> Result<Self, figment::Error> {
        Figment::from(Toml::file(path)).extract()
    }
}
