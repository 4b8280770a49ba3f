//! Attack resolution
//!
//! One attack is resolved as:
//!
//! ```text
//! attack_score  = (attack + d20) * score_multiplier
//! evasion_score = agility + d20 + evasion_bonus
//! evasion_score >= attack_score  => miss, 0 damage
//! critical      = second d20 >= crit_base - luck / crit_luck_divisor
//! raw           = attack_score - (defense + defense_bonus)
//! damage        = max(floor, floor(raw * (100 + bonus_pct) / 100 * (crit ? 2 : 1)))
//! ```
//!
//! The floor is 1 against a normal target and 0 against one holding the
//! defending stance. Scores saturate at the `i32` range rather than wrap.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::dice::Dice;
use super::effects::EffectLedger;
use super::error::{CombatError, IllegalReason};
use super::roster::Roster;
use crate::config::BattleConfig;

/// Full audit trail of one attack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackReport {
    pub attacker: String,
    pub defender: String,
    /// The attack d20
    pub attack_roll: u32,
    /// 1 for a plain attack, higher for a boosted one
    pub score_multiplier: i32,
    pub attack_score: i32,
    /// The evasion d20
    pub evasion_roll: u32,
    pub evasion_bonus: i32,
    pub evasion_score: i32,
    pub hit: bool,
    /// Second d20, only rolled on a hit
    pub crit_roll: Option<u32>,
    pub crit_threshold: i32,
    pub critical: bool,
    /// Defender's defense plus any consumed bonus
    pub defense_value: i32,
    /// Attacker's consumed damage bonus in percent
    pub damage_bonus_pct: i32,
    /// Attack score minus defense value, before multipliers
    pub raw_damage: i32,
    /// Whether the defender held the defending stance
    pub defending: bool,
    pub damage: i32,
    pub hp_before: i32,
    pub hp_after: i32,
    /// Consumed-effect notes from both sides
    pub notes: Vec<String>,
}

impl AttackReport {
    pub fn defeated(&self) -> bool {
        self.hit && self.hp_after == 0 && self.hp_before > 0
    }

    /// One-line summary for the battle log
    pub fn summary(&self, attacker_name: &str, defender_name: &str) -> String {
        let mut line = if !self.hit {
            format!(
                "{} attacks {} but misses ({} vs evasion {})",
                attacker_name, defender_name, self.attack_score, self.evasion_score
            )
        } else if self.critical {
            format!(
                "{} lands a critical hit on {} for {} damage ({} -> {})",
                attacker_name, defender_name, self.damage, self.hp_before, self.hp_after
            )
        } else {
            format!(
                "{} hits {} for {} damage ({} -> {})",
                attacker_name, defender_name, self.damage, self.hp_before, self.hp_after
            )
        };
        if !self.notes.is_empty() {
            line.push_str(&format!(" [{}]", self.notes.join("; ")));
        }
        if self.defeated() {
            line.push_str(&format!("; {} is defeated", defender_name));
        }
        line
    }
}

/// Final damage for a landed hit
///
/// Returns `(raw, damage)` where raw is the pre-multiplier difference.
pub fn compute_damage(
    attack_score: i32,
    defense_value: i32,
    bonus_pct: i32,
    critical: bool,
    floor: i32,
) -> (i32, i32) {
    let raw = attack_score.saturating_sub(defense_value);
    let scale = 100 + bonus_pct.max(-100) as i64;
    let crit = if critical { 2 } else { 1 };
    let scaled = (raw as i64)
        .saturating_mul(scale)
        .saturating_mul(crit)
        .div_euclid(100);
    let damage = scaled.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
    (raw, damage.max(floor))
}

fn roll_value(roll: u32) -> i32 {
    i32::try_from(roll).unwrap_or(i32::MAX)
}

/// Resolve one attack and apply its damage
///
/// The caller has already checked that both combatants are alive and on
/// opposite teams. Attacker-side effects and the defender's evasion are
/// spent by every attack; the defender's defense bonus only by one that lands.
pub fn resolve(
    attacker_id: &str,
    defender_id: &str,
    roster: &mut Roster,
    ledger: &mut EffectLedger,
    dice: &mut dyn Dice,
    config: &BattleConfig,
    score_multiplier: i32,
) -> Result<AttackReport, CombatError> {
    let attacker_stats = roster
        .get(attacker_id)
        .map(|c| c.stats)
        .ok_or(IllegalReason::UnknownCombatant)?;
    let defender = roster
        .get_mut(defender_id)
        .ok_or(IllegalReason::UnknownCombatant)?;

    let attack_mod = ledger.consume_on_attack_by(attacker_id);
    let evade_mod = ledger.consume_evasion_of(defender_id);
    let mut notes = attack_mod.notes;
    notes.extend(evade_mod.notes);

    let score_multiplier = score_multiplier.max(1);
    let attack_roll = dice.roll_d(config.die_sides);
    let attack_score = attacker_stats
        .attack
        .saturating_add(roll_value(attack_roll))
        .saturating_mul(score_multiplier);

    let evasion_roll = dice.roll_d(config.die_sides);
    let evasion_score = defender
        .stats
        .agility
        .saturating_add(roll_value(evasion_roll))
        .saturating_add(evade_mod.evasion_bonus);

    let crit_threshold = config.crit_threshold(attacker_stats.luck);
    let defending = defender.defending;
    let hp_before = defender.hp();

    let mut report = AttackReport {
        attacker: attacker_id.to_string(),
        defender: defender_id.to_string(),
        attack_roll,
        score_multiplier,
        attack_score,
        evasion_roll,
        evasion_bonus: evade_mod.evasion_bonus,
        evasion_score,
        hit: false,
        crit_roll: None,
        crit_threshold,
        critical: false,
        defense_value: defender.stats.defense,
        damage_bonus_pct: attack_mod.bonus_pct,
        raw_damage: 0,
        defending,
        damage: 0,
        hp_before,
        hp_after: hp_before,
        notes,
    };

    if evasion_score >= attack_score {
        debug!(
            "{} misses {}: attack {} (roll {}) vs evasion {} (roll {})",
            attacker_id, defender_id, attack_score, attack_roll, evasion_score, evasion_roll
        );
        return Ok(report);
    }

    let crit_roll = dice.roll_d(config.die_sides);
    let critical = roll_value(crit_roll) >= crit_threshold;

    let guard_mod = ledger.consume_on_hit_of(defender_id);
    let defense_value = defender
        .stats
        .defense
        .saturating_add(guard_mod.defense_bonus);
    report.notes.extend(guard_mod.notes);

    let floor = if defending {
        config.damage_floor.defending
    } else {
        config.damage_floor.normal
    };
    let (raw, damage) = compute_damage(
        attack_score,
        defense_value,
        attack_mod.bonus_pct,
        critical,
        floor,
    );

    report.hit = true;
    report.crit_roll = Some(crit_roll);
    report.critical = critical;
    report.defense_value = defense_value;
    report.raw_damage = raw;
    report.damage = damage;
    report.hp_after = defender.apply_damage(damage);

    debug!(
        "{} hits {}: attack {} vs defense {}, crit roll {} (need {}), {} damage",
        attacker_id, defender_id, attack_score, defense_value, crit_roll, crit_threshold, damage
    );

    Ok(report)
}
