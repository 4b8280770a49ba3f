//! Combat engine
//!
//! Synchronous, turn-based resolution for two-team battles:
//! - Dice behind a trait so battles can be seeded or scripted
//! - Stat normalization and HP bookkeeping
//! - Transient effects that modify a later action
//! - Single-use items
//! - Attack resolution (hit, critical, damage)
//! - Turn order, round limit and end detection
//!
//! Nothing here does I/O or holds global state; see [`crate::session`] for
//! the shared registry of running battles.

mod action;
mod attack;
mod battle;
mod combatant;
mod dice;
mod effects;
mod error;
mod items;
mod log;
mod roster;
mod stats;
mod turn;

pub use action::{dispatch, Action, ActionContext, Dispatched, HpDelta, Resolution};
pub use attack::{compute_damage, resolve, AttackReport};
pub use battle::{ActionOutcome, Battle, BattleStatus, ForfeitTarget};
pub use combatant::{Combatant, CombatantSpec, Inventory, TeamId};
pub use dice::{Dice, ScriptedDice, SeededDice, ThreadDice};
pub use effects::{
    AttackModifier, Effect, EffectExpiry, EffectKind, EffectLedger, HitModifier,
};
pub use error::{CombatError, IllegalReason};
pub use items::{use_item, ItemKind, ItemOutcome, ItemReport};
pub use log::{BattleLog, LogEvent, LogRecord};
pub use roster::Roster;
pub use stats::{RawStats, StatBounds, Stats};
pub use turn::{check_end, BattleResult, EndReason, TurnOrder};
