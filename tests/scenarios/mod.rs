//! Scenario tests for the combat engine
//!
//! Whole-battle play tests covering:
//! - Combat: hit, miss, critical and defensive stances
//! - Items: consumption, failed rolls, defeated targets
//! - Turns: order, elimination, round limit, timeouts
//! - Forfeit: disconnects and idempotent results
//! - Sessions: concurrent battles through the registry
//! - Properties: HP bounds under random play

pub mod combat;
pub mod items;
pub mod properties;
