//! Simple action policy for unattended combatants
//!
//! Used by the simulator to drive both sides of a battle.

use crate::combat::{Action, Battle, Combatant, ItemKind};

/// Heal below this share of max HP (percent)
const HEAL_BELOW_PCT: i32 = 35;
/// Try a defense boost below this share of max HP (percent)
const BRACE_BELOW_PCT: i32 = 60;

fn hp_pct(c: &Combatant) -> i32 {
    c.hp() * 100 / c.max_hp().max(1)
}

/// Pick an action for the pending actor, if any
///
/// Heals when badly hurt, braces with a defense boost when hurt, otherwise
/// attacks the living enemy with the least HP (first in roster order on a
/// tie). A weakest enemy that an attack boost could finish earns the boost.
pub fn choose_action(battle: &Battle) -> Option<(String, Action)> {
    let actor = battle.pending_actor()?;
    let roster = battle.roster();
    let pct = hp_pct(actor);

    if pct < HEAL_BELOW_PCT && actor.inventory.has(ItemKind::Heal) {
        return Some((actor.id.clone(), Action::item(ItemKind::Heal, None)));
    }
    if pct < BRACE_BELOW_PCT && actor.inventory.has(ItemKind::DefenseBoost) {
        return Some((actor.id.clone(), Action::item(ItemKind::DefenseBoost, None)));
    }

    let Some(target) = roster
        .team(actor.team.other())
        .iter()
        .filter(|c| c.is_alive())
        .min_by_key(|c| c.hp())
    else {
        return Some((actor.id.clone(), Action::Pass));
    };

    let action = if actor.inventory.has(ItemKind::AttackBoost) && hp_pct(target) >= 50 {
        Action::item(ItemKind::AttackBoost, Some(&target.id))
    } else {
        Action::attack(target.id.clone())
    };
    Some((actor.id.clone(), action))
}
