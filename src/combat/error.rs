//! Combat errors
//!
//! Every rejected call leaves the battle untouched and the turn pending.

use thiserror::Error;

use super::items::ItemKind;

/// Why an action was refused as illegal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalReason {
    /// Battle is still waiting for its readiness gate
    NotStarted,
    /// Submitting combatant is not the pending actor
    NotYourTurn,
    /// Submitting combatant has 0 HP
    ActorDefeated,
    /// Id does not name anyone in the roster
    UnknownCombatant,
    /// Target has 0 HP
    TargetDefeated,
    /// Attack or attack item aimed at an ally
    TargetNotEnemy,
    /// Heal aimed at an enemy
    TargetNotAlly,
    /// Attack without a target while fallback is disabled
    MissingTarget,
}

impl std::fmt::Display for IllegalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IllegalReason::NotStarted => "battle has not started",
            IllegalReason::NotYourTurn => "not this combatant's turn",
            IllegalReason::ActorDefeated => "actor is defeated",
            IllegalReason::UnknownCombatant => "no such combatant",
            IllegalReason::TargetDefeated => "target is defeated",
            IllegalReason::TargetNotEnemy => "target is not an enemy",
            IllegalReason::TargetNotAlly => "target is not an ally",
            IllegalReason::MissingTarget => "no target supplied",
        };
        write!(f, "{}", s)
    }
}

/// Errors returned by the combat engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error("illegal action: {0}")]
    IllegalAction(IllegalReason),

    #[error("{actor} has no {item} left")]
    InsufficientResource { actor: String, item: ItemKind },

    #[error("unknown item kind: {0}")]
    UnknownItem(String),

    #[error("malformed action: {0}")]
    MalformedAction(String),

    #[error("battle has already ended")]
    AlreadyEnded,

    #[error("invalid battle setup: {0}")]
    InvalidSetup(String),

    #[error("unknown battle: {0}")]
    UnknownBattle(String),
}

impl CombatError {
    /// Whether the caller may resubmit a different action for the same turn
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CombatError::IllegalAction(_)
                | CombatError::InsufficientResource { .. }
                | CombatError::UnknownItem(_)
                | CombatError::MalformedAction(_)
        )
    }
}

impl From<IllegalReason> for CombatError {
    fn from(reason: IllegalReason) -> Self {
        CombatError::IllegalAction(reason)
    }
}
