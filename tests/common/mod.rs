//! Common test fixtures for battle scenarios

#![allow(dead_code)]

use skirmish::combat::{
    Action, ActionOutcome, Battle, CombatError, CombatantSpec, Inventory, LogEvent, RawStats,
    ScriptedDice,
};
use skirmish::BattleConfig;

/// Roster entry with explicit stats and no items
pub fn fighter(id: &str, attack: i64, defense: i64, agility: i64, luck: i64) -> CombatantSpec {
    CombatantSpec::new(id, RawStats::new(attack, defense, agility, luck))
        .with_inventory(Inventory::new())
}

/// Roster entry with midpoint stats, no items and the given HP
pub fn dummy(id: &str, hp: i32) -> CombatantSpec {
    CombatantSpec::new(id, RawStats::default())
        .with_hp(hp)
        .with_inventory(Inventory::new())
}

pub fn battle(team_a: Vec<CombatantSpec>, team_b: Vec<CombatantSpec>) -> Battle {
    battle_with(team_a, team_b, BattleConfig::default())
}

pub fn battle_with(
    team_a: Vec<CombatantSpec>,
    team_b: Vec<CombatantSpec>,
    config: BattleConfig,
) -> Battle {
    Battle::create("test-battle", &team_a, &team_b, config).expect("valid battle")
}

/// Dice that replays the given d20 results in order
pub fn rolls(values: impl IntoIterator<Item = u32>) -> ScriptedDice {
    ScriptedDice::new().with_rolls(values)
}

pub fn hp(battle: &Battle, id: &str) -> i32 {
    battle.roster().get(id).expect("combatant exists").hp()
}

pub fn pending(battle: &Battle) -> Option<String> {
    battle.pending_actor().map(|c| c.id.clone())
}

/// Submit with scripted dice, panicking on rejection
pub fn act(battle: &mut Battle, dice: &mut ScriptedDice, actor: &str, action: Action) -> ActionOutcome {
    battle
        .submit_action(dice, actor, action)
        .unwrap_or_else(|e| panic!("{} rejected: {}", actor, e))
}

/// Try a submission with an empty script
pub fn try_act(battle: &mut Battle, actor: &str, action: Action) -> Result<ActionOutcome, CombatError> {
    battle.submit_action(&mut ScriptedDice::new(), actor, action)
}

/// Messages of every action record in the log
pub fn action_messages(battle: &Battle) -> Vec<String> {
    battle
        .log()
        .iter()
        .filter(|r| matches!(r.event, LogEvent::Action { .. }))
        .map(|r| r.message.clone())
        .collect()
}
