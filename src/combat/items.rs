//! Consumable items
//!
//! Using an item always spends it: the count drops by one as soon as the
//! use is known to be legal, before any success roll, and a failed use is
//! never refunded.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::attack::{self, AttackReport};
use super::dice::Dice;
use super::effects::{EffectKind, EffectLedger};
use super::error::{CombatError, IllegalReason};
use super::roster::Roster;
use crate::config::BattleConfig;

/// Kinds of consumable item
///
/// Serialized in snake_case. Deserialization goes through [`FromStr`], so
/// rosters, configs and action envelopes accept the same aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum ItemKind {
    /// Restores a fixed amount of HP to the user or an ally
    Heal,
    /// Chance of an immediate boosted attack
    AttackBoost,
    /// Chance of a defense bonus on the user's next incoming hit
    DefenseBoost,
}

impl FromStr for ItemKind {
    type Err = CombatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "heal" | "potion" => Ok(ItemKind::Heal),
            "attack_boost" | "attackboost" => Ok(ItemKind::AttackBoost),
            "defense_boost" | "defenseboost" => Ok(ItemKind::DefenseBoost),
            _ => Err(CombatError::UnknownItem(s.to_string())),
        }
    }
}

impl TryFrom<String> for ItemKind {
    type Error = CombatError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ItemKind::Heal => "heal",
            ItemKind::AttackBoost => "attack_boost",
            ItemKind::DefenseBoost => "defense_boost",
        };
        write!(f, "{}", s)
    }
}

/// What an item use did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemOutcome {
    Healed {
        amount: i32,
        hp_before: i32,
        hp_after: i32,
    },
    /// Heal aimed at a combatant already at 0 HP
    TargetDefeated,
    /// Attack boost succeeded and resolved an attack
    BoostedAttack(AttackReport),
    /// Defense boost succeeded and queued a defense bonus
    DefenseRaised { bonus: i32 },
    /// Success roll failed; nothing but the item was spent
    Fizzled,
}

/// Audit record for one item use
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReport {
    pub actor: String,
    pub kind: ItemKind,
    pub target: String,
    /// Count left after this use
    pub remaining: u32,
    /// Result of the success roll, for items that roll one
    pub success_roll: Option<bool>,
    pub outcome: ItemOutcome,
}

impl ItemReport {
    pub fn succeeded(&self) -> bool {
        !matches!(
            self.outcome,
            ItemOutcome::TargetDefeated | ItemOutcome::Fizzled
        )
    }

    pub fn summary(&self, actor_name: &str, target_name: &str) -> String {
        match &self.outcome {
            ItemOutcome::Healed {
                amount,
                hp_before,
                hp_after,
            } => format!(
                "{} uses heal on {}: +{} HP ({} -> {})",
                actor_name, target_name, amount, hp_before, hp_after
            ),
            ItemOutcome::TargetDefeated => format!(
                "{} uses heal on {}: cannot heal defeated target",
                actor_name, target_name
            ),
            ItemOutcome::BoostedAttack(report) => format!(
                "{} uses attack_boost: {}",
                actor_name,
                report.summary(actor_name, target_name)
            ),
            ItemOutcome::DefenseRaised { bonus } => format!(
                "{} uses defense_boost: +{} defense on the next hit",
                actor_name, bonus
            ),
            ItemOutcome::Fizzled => format!("{} uses {} but it fails", actor_name, self.kind),
        }
    }
}

/// Use one item
///
/// Validation happens before anything is spent: an unowned item or an
/// illegal target rejects the action with no mutation.
pub fn use_item(
    actor_id: &str,
    kind: ItemKind,
    target: Option<&str>,
    roster: &mut Roster,
    ledger: &mut EffectLedger,
    dice: &mut dyn Dice,
    config: &BattleConfig,
) -> Result<ItemReport, CombatError> {
    let actor = roster
        .get(actor_id)
        .ok_or(IllegalReason::UnknownCombatant)?;
    let team = actor.team;

    if !actor.inventory.has(kind) {
        return Err(CombatError::InsufficientResource {
            actor: actor_id.to_string(),
            item: kind,
        });
    }

    let target_id = match kind {
        ItemKind::Heal => {
            let id = target.unwrap_or(actor_id);
            let target = roster.get(id).ok_or(IllegalReason::UnknownCombatant)?;
            if target.team != team {
                return Err(IllegalReason::TargetNotAlly.into());
            }
            id.to_string()
        }
        ItemKind::AttackBoost => roster.enemy_target(team, target, config.target_fallback)?,
        ItemKind::DefenseBoost => actor_id.to_string(),
    };

    let remaining = roster
        .get_mut(actor_id)
        .and_then(|c| c.inventory.take_one(kind))
        .ok_or_else(|| CombatError::InsufficientResource {
            actor: actor_id.to_string(),
            item: kind,
        })?;

    debug!("{} uses {} on {} ({} left)", actor_id, kind, target_id, remaining);

    let (success_roll, outcome) = match kind {
        ItemKind::Heal => {
            let target = roster
                .get_mut(&target_id)
                .ok_or(IllegalReason::UnknownCombatant)?;
            let hp_before = target.hp();
            let outcome = match target.apply_heal(config.heal_amount) {
                Ok(hp_after) => ItemOutcome::Healed {
                    amount: hp_after - hp_before,
                    hp_before,
                    hp_after,
                },
                Err(_) => ItemOutcome::TargetDefeated,
            };
            (None, outcome)
        }
        ItemKind::AttackBoost => {
            let success = dice.chance(config.attack_boost_chance);
            let outcome = if success {
                let report = attack::resolve(
                    actor_id,
                    &target_id,
                    roster,
                    ledger,
                    dice,
                    config,
                    config.attack_boost_multiplier,
                )?;
                ItemOutcome::BoostedAttack(report)
            } else {
                ItemOutcome::Fizzled
            };
            (Some(success), outcome)
        }
        ItemKind::DefenseBoost => {
            let success = dice.chance(config.defense_boost_chance);
            let outcome = if success {
                ledger.add(
                    actor_id,
                    EffectKind::DefenseBonus,
                    config.defense_boost_amount,
                    1,
                    "defense_boost",
                );
                ItemOutcome::DefenseRaised {
                    bonus: config.defense_boost_amount,
                }
            } else {
                ItemOutcome::Fizzled
            };
            (Some(success), outcome)
        }
    };

    Ok(ItemReport {
        actor: actor_id.to_string(),
        kind,
        target: target_id,
        remaining,
        success_roll,
        outcome,
    })
}
