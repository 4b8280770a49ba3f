//! Combatant base stats and their canonical bounds

use serde::{Deserialize, Serialize};

/// Stat values as submitted by a roster, before clamping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStats {
    pub attack: Option<i64>,
    pub defense: Option<i64>,
    pub agility: Option<i64>,
    pub luck: Option<i64>,
}

/// Normalized stats, each within the configured [`StatBounds`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub attack: i32,
    pub defense: i32,
    pub agility: i32,
    pub luck: i32,
}

/// Inclusive bounds for every base stat
///
/// The canonical range is 1..=5 with a midpoint default of 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatBounds {
    pub min: i32,
    pub max: i32,
    /// Value used when a stat is missing from the roster
    pub default: i32,
}

impl Default for StatBounds {
    fn default() -> Self {
        Self {
            min: 1,
            max: 5,
            default: 3,
        }
    }
}

impl StatBounds {
    /// Clamp a single raw value, substituting the default when absent
    pub fn clamp(&self, raw: Option<i64>) -> i32 {
        let value = raw.unwrap_or(self.default as i64);
        value.clamp(self.min as i64, self.max as i64) as i32
    }

    /// Normalize a full set of raw stats
    pub fn normalize(&self, raw: &RawStats) -> Stats {
        Stats {
            attack: self.clamp(raw.attack),
            defense: self.clamp(raw.defense),
            agility: self.clamp(raw.agility),
            luck: self.clamp(raw.luck),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max && (self.min..=self.max).contains(&self.default)
    }
}

impl RawStats {
    pub fn new(attack: i64, defense: i64, agility: i64, luck: i64) -> Self {
        Self {
            attack: Some(attack),
            defense: Some(defense),
            agility: Some(agility),
            luck: Some(luck),
        }
    }
}
