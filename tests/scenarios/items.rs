//! Item scenario tests
//!
//! Tests that items are always spent, and what each one does

use crate::common::{act, battle, dummy, fighter, hp, try_act};
use skirmish::combat::{
    Action, CombatError, Inventory, ItemKind, ItemOutcome, LogEvent, Resolution, ScriptedDice,
};

fn item_count(battle: &skirmish::combat::Battle, id: &str, kind: ItemKind) -> u32 {
    battle.roster().get(id).unwrap().inventory.count(kind)
}

/// Test: heal on a defeated ally is spent and logged, HP stays 0
#[test]
fn test_heal_on_defeated_ally() {
    let medic = fighter("medic", 3, 3, 3, 3).with_inventory(Inventory::new().with(ItemKind::Heal, 1));
    let mut battle = battle(vec![medic, dummy("fallen", 0)], vec![fighter("orc", 3, 3, 3, 3)]);
    let mut dice = ScriptedDice::new();

    let out = act(
        &mut battle,
        &mut dice,
        "medic",
        Action::item(ItemKind::Heal, Some("fallen")),
    );

    assert_eq!(item_count(&battle, "medic", ItemKind::Heal), 0);
    assert_eq!(hp(&battle, "fallen"), 0);
    assert!(out.records[0].message.contains("cannot heal defeated target"));
    match &out.records[0].event {
        LogEvent::Action {
            resolution: Resolution::Item(report),
            ..
        } => assert_eq!(report.outcome, ItemOutcome::TargetDefeated),
        other => panic!("unexpected event {:?}", other),
    }
    assert!(out.turn_ended);
}

/// Test: heal is capped at max HP and counts down to a hard stop
#[test]
fn test_heal_decrements_then_rejects() {
    let medic = fighter("medic", 3, 3, 3, 3)
        .with_hp(95)
        .with_inventory(Inventory::new().with(ItemKind::Heal, 1));
    let mut battle = battle(vec![medic], vec![fighter("orc", 3, 3, 3, 3)]);
    let mut dice = ScriptedDice::new();

    let out = act(&mut battle, &mut dice, "medic", Action::item(ItemKind::Heal, None));
    assert_eq!(out.hp_deltas[0].after, 100);
    assert_eq!(item_count(&battle, "medic", ItemKind::Heal), 0);

    act(&mut battle, &mut dice, "orc", Action::Pass);

    let logged = battle.log().len();
    let err = try_act(&mut battle, "medic", Action::item(ItemKind::Heal, None)).unwrap_err();
    assert_eq!(
        err,
        CombatError::InsufficientResource {
            actor: "medic".to_string(),
            item: ItemKind::Heal
        }
    );
    // Rejected: same turn, nothing logged
    assert_eq!(battle.pending_actor().unwrap().id, "medic");
    assert_eq!(battle.log().len(), logged);
}

/// Test: failed boosts still cost the item
#[test]
fn test_failed_boosts_are_spent() {
    let hero = fighter("hero", 5, 3, 3, 4).with_inventory(
        Inventory::new()
            .with(ItemKind::AttackBoost, 1)
            .with(ItemKind::DefenseBoost, 1),
    );
    let mut battle = battle(vec![hero], vec![fighter("orc", 3, 2, 3, 3)]);
    let mut dice = ScriptedDice::new().with_chances([false, false]);

    act(
        &mut battle,
        &mut dice,
        "hero",
        Action::item(ItemKind::AttackBoost, Some("orc")),
    );
    act(&mut battle, &mut dice, "orc", Action::Pass);
    act(&mut battle, &mut dice, "hero", Action::item(ItemKind::DefenseBoost, None));

    assert_eq!(item_count(&battle, "hero", ItemKind::AttackBoost), 0);
    assert_eq!(item_count(&battle, "hero", ItemKind::DefenseBoost), 0);
    assert_eq!(hp(&battle, "orc"), 100);
    assert!(battle.ledger().is_empty());
    assert!(battle.log().iter().all(|r| !r.message.is_empty()));
}

/// Test: successful attack boost resolves a doubled attack in the same step
#[test]
fn test_attack_boost_success() {
    let hero = fighter("hero", 5, 3, 3, 4)
        .with_inventory(Inventory::new().with(ItemKind::AttackBoost, 1));
    let mut battle = battle(vec![hero], vec![fighter("orc", 3, 2, 3, 3)]);
    // (5 + 15) * 2 = 40 vs 3 + 4; crit 19
    let mut dice = ScriptedDice::new().with_chances([true]).with_rolls([15, 4, 19]);

    let out = act(
        &mut battle,
        &mut dice,
        "hero",
        Action::item(ItemKind::AttackBoost, Some("orc")),
    );

    // (40 - 2) * 2
    assert_eq!(hp(&battle, "orc"), 100 - 76);
    assert_eq!(out.hp_deltas.len(), 1);
}

/// Test: successful defense boost protects the next hit
#[test]
fn test_defense_boost_success() {
    let tank = fighter("tank", 3, 3, 3, 3)
        .with_inventory(Inventory::new().with(ItemKind::DefenseBoost, 1));
    let mut battle = battle(vec![tank], vec![fighter("orc", 5, 2, 3, 1)]);
    // orc: 5 + 15 = 20 vs 3 + 4; defense 3 + 2
    let mut dice = ScriptedDice::new().with_chances([true]).with_rolls([15, 4, 1]);

    act(&mut battle, &mut dice, "tank", Action::item(ItemKind::DefenseBoost, None));
    act(&mut battle, &mut dice, "orc", Action::attack("tank"));

    assert_eq!(hp(&battle, "tank"), 100 - 15);
}

/// Test: healing an enemy is illegal and costs nothing
#[test]
fn test_heal_enemy_rejected() {
    let medic = fighter("medic", 3, 3, 3, 3).with_inventory(Inventory::new().with(ItemKind::Heal, 2));
    let mut battle = battle(vec![medic], vec![dummy("orc", 50)]);

    assert!(try_act(&mut battle, "medic", Action::item(ItemKind::Heal, Some("orc"))).is_err());
    assert_eq!(item_count(&battle, "medic", ItemKind::Heal), 2);
    assert_eq!(hp(&battle, "orc"), 50);
}
