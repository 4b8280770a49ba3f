//! skirmish - turn-based two-team combat engine
//!
//! The [`combat`] engine resolves actions synchronously against an injected
//! source of dice; [`session`] keeps many battles running side by side.

pub mod combat;
pub mod config;
pub mod session;

pub use config::{BattleConfig, RosterFile};
pub use session::BattleManager;
