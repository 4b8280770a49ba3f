//! Action dispatch
//!
//! Maps one submitted action to the resolvers. The dispatcher does not know
//! about turns; `Battle` checks whose turn it is before calling in here.

use serde::{Deserialize, Serialize};

use super::attack::{self, AttackReport};
use super::dice::Dice;
use super::effects::{EffectKind, EffectLedger};
use super::error::{CombatError, IllegalReason};
use super::items::{self, ItemKind, ItemReport};
use super::roster::Roster;
use crate::config::BattleConfig;

/// A combatant's choice for its turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Attack {
        #[serde(default)]
        target: Option<String>,
    },
    Defend,
    Dodge,
    Item {
        kind: ItemKind,
        #[serde(default)]
        target: Option<String>,
    },
    Pass,
}

impl Action {
    pub fn attack(target: impl Into<String>) -> Self {
        Action::Attack {
            target: Some(target.into()),
        }
    }

    pub fn item(kind: ItemKind, target: Option<&str>) -> Self {
        Action::Item {
            kind,
            target: target.map(str::to_string),
        }
    }

    /// Parse a JSON action envelope
    ///
    /// An unrecognised item kind is reported as `UnknownItem`, any other
    /// shape problem as `MalformedAction`.
    pub fn from_json(json: &str) -> Result<Self, CombatError> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| CombatError::MalformedAction(e.to_string()))?;
        if value.get("type").and_then(|t| t.as_str()) == Some("item") {
            if let Some(kind) = value.get("kind").and_then(|k| k.as_str()) {
                kind.parse::<ItemKind>()?;
            }
        }
        serde_json::from_value(value).map_err(|e| CombatError::MalformedAction(e.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Attack { .. } => "attack",
            Action::Defend => "defend",
            Action::Dodge => "dodge",
            Action::Item { .. } => "item",
            Action::Pass => "pass",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Attack {
                target: Some(target),
            } => write!(f, "attack {}", target),
            Action::Item {
                kind,
                target: Some(target),
            } => write!(f, "item {} on {}", kind, target),
            Action::Item { kind, target: None } => write!(f, "item {}", kind),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// What an accepted action did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Resolution {
    Attack(AttackReport),
    Defend { defense_bonus: i32 },
    Dodge { evasion_bonus: i32 },
    Item(ItemReport),
    Pass,
}

impl Resolution {
    /// Log line for this resolution, using display names from the roster
    pub fn describe(&self, actor_id: &str, roster: &Roster) -> String {
        let name = |id: &str| {
            roster
                .get(id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| id.to_string())
        };
        let actor = name(actor_id);

        match self {
            Resolution::Attack(report) => report.summary(&actor, &name(&report.defender)),
            Resolution::Defend { defense_bonus } => {
                format!("{} defends (+{} defense on the next hit)", actor, defense_bonus)
            }
            Resolution::Dodge { evasion_bonus } => {
                format!("{} prepares to dodge (+{} evasion)", actor, evasion_bonus)
            }
            Resolution::Item(report) => report.summary(&actor, &name(&report.target)),
            Resolution::Pass => format!("{} passes", actor),
        }
    }
}

/// HP change of one combatant during an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HpDelta {
    pub id: String,
    pub before: i32,
    pub after: i32,
}

/// Result of dispatching one action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispatched {
    pub resolution: Resolution,
    pub hp_deltas: Vec<HpDelta>,
    /// Always true for an accepted action
    pub turn_ended: bool,
}

/// Mutable battle state an action works on
pub struct ActionContext<'a> {
    pub roster: &'a mut Roster,
    pub ledger: &'a mut EffectLedger,
    pub dice: &'a mut dyn Dice,
    pub config: &'a BattleConfig,
}

/// Resolve one action for `actor_id`
///
/// On `Err` nothing has been mutated.
pub fn dispatch(
    ctx: &mut ActionContext<'_>,
    actor_id: &str,
    action: &Action,
) -> Result<Dispatched, CombatError> {
    let actor = ctx
        .roster
        .get(actor_id)
        .ok_or(IllegalReason::UnknownCombatant)?;
    if !actor.is_alive() {
        return Err(IllegalReason::ActorDefeated.into());
    }
    let team = actor.team;
    let before = ctx.roster.hp_by_id();

    let resolution = match action {
        Action::Attack { target } => {
            let target =
                ctx.roster
                    .enemy_target(team, target.as_deref(), ctx.config.target_fallback)?;
            let report = attack::resolve(
                actor_id,
                &target,
                ctx.roster,
                ctx.ledger,
                ctx.dice,
                ctx.config,
                1,
            )?;
            Resolution::Attack(report)
        }
        Action::Defend => {
            if let Some(actor) = ctx.roster.get_mut(actor_id) {
                actor.defending = true;
            }
            ctx.ledger.add(
                actor_id,
                EffectKind::DefenseBonus,
                ctx.config.defend_bonus,
                1,
                "defend",
            );
            Resolution::Defend {
                defense_bonus: ctx.config.defend_bonus,
            }
        }
        Action::Dodge => {
            ctx.ledger.add(
                actor_id,
                EffectKind::EvasionBonus,
                ctx.config.dodge_bonus,
                1,
                "dodge",
            );
            Resolution::Dodge {
                evasion_bonus: ctx.config.dodge_bonus,
            }
        }
        Action::Item { kind, target } => Resolution::Item(items::use_item(
            actor_id,
            *kind,
            target.as_deref(),
            ctx.roster,
            ctx.ledger,
            ctx.dice,
            ctx.config,
        )?),
        Action::Pass => Resolution::Pass,
    };

    let hp_deltas = before
        .into_iter()
        .zip(ctx.roster.hp_by_id())
        .filter(|((_, before), (_, after))| before != after)
        .map(|((id, before), (_, after))| HpDelta { id, before, after })
        .collect();

    Ok(Dispatched {
        resolution,
        hp_deltas,
        turn_ended: true,
    })
}
