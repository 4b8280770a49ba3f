//! Combat scenario tests
//!
//! Tests hit, miss, critical hits, the defend/dodge stances and effect expiry

use crate::common::{act, battle, battle_with, fighter, hp, rolls};
use skirmish::combat::{
    Action, Battle, CombatError, EffectExpiry, EffectKind, LogEvent, Resolution,
};
use skirmish::BattleConfig;

fn attack_report(outcome: &skirmish::combat::ActionOutcome) -> skirmish::combat::AttackReport {
    match &outcome.records[0].event {
        LogEvent::Action {
            resolution: Resolution::Attack(report),
            ..
        } => report.clone(),
        other => panic!("expected an attack record, got {:?}", other),
    }
}

/// Test: attack 5 + 15 vs agility 3 + 4, crit 19 at luck 4, defense 2
#[test]
fn test_reference_critical_hit() {
    let mut battle = battle(
        vec![fighter("hero", 5, 3, 3, 4)],
        vec![fighter("orc", 3, 2, 3, 3)],
    );
    let mut dice = rolls([15, 4, 19]);

    let out = act(&mut battle, &mut dice, "hero", Action::attack("orc"));
    let report = attack_report(&out);

    assert!(report.hit);
    assert!(report.critical);
    assert_eq!(report.damage, 36);
    assert_eq!(hp(&battle, "orc"), 64);
    assert_eq!(out.hp_deltas.len(), 1);
    assert_eq!(out.hp_deltas[0].after, 64);
    assert_eq!(out.next_actor.as_deref(), Some("orc"));
}

/// Test: equal scores miss, and the crit die is never rolled
#[test]
fn test_tie_is_a_miss() {
    let mut battle = battle(
        vec![fighter("hero", 3, 3, 3, 3)],
        vec![fighter("orc", 3, 3, 3, 3)],
    );
    let mut dice = rolls([10, 10, 20]);

    let out = act(&mut battle, &mut dice, "hero", Action::attack("orc"));
    let report = attack_report(&out);

    assert!(!report.hit);
    assert_eq!(report.damage, 0);
    assert_eq!(report.crit_roll, None);
    assert_eq!(dice.remaining_rolls(), 1);
    assert!(out.hp_deltas.is_empty());
    assert_eq!(hp(&battle, "orc"), 100);
}

/// Test: defend adds +2 defense to the next hit only
#[test]
fn test_defend_softens_next_hit() {
    let mut battle = battle(
        vec![fighter("hero", 5, 3, 3, 4)],
        vec![fighter("orc", 3, 2, 3, 3)],
    );
    let mut dice = rolls([15, 4, 1, 15, 4, 1]);

    act(&mut battle, &mut dice, "hero", Action::Pass);
    act(&mut battle, &mut dice, "orc", Action::Defend);

    let out = act(&mut battle, &mut dice, "hero", Action::attack("orc"));
    let report = attack_report(&out);
    assert_eq!(report.defense_value, 4);
    assert_eq!(report.damage, 16);
    assert!(out.records[0].message.contains("defend: +2 defense"));

    // Bonus spent; the orc's stance drops when its own turn begins
    act(&mut battle, &mut dice, "orc", Action::Pass);
    let out = act(&mut battle, &mut dice, "hero", Action::attack("orc"));
    assert_eq!(attack_report(&out).damage, 18);
    assert_eq!(hp(&battle, "orc"), 100 - 16 - 18);
}

/// Test: dodge's +5 evasion turns a hit into a miss
#[test]
fn test_dodge_turns_hit_into_miss() {
    let mut battle = battle(
        vec![fighter("hero", 5, 3, 3, 4)],
        vec![fighter("orc", 3, 2, 3, 3)],
    );
    // 5 + 12 = 17 vs 3 + 9 + 5 = 17
    let mut dice = rolls([12, 9]);

    act(&mut battle, &mut dice, "hero", Action::Pass);
    act(&mut battle, &mut dice, "orc", Action::Dodge);
    let out = act(&mut battle, &mut dice, "hero", Action::attack("orc"));

    let report = attack_report(&out);
    assert!(!report.hit);
    assert_eq!(report.evasion_bonus, 5);
    assert!(!battle.ledger().has("orc", EffectKind::EvasionBonus));
}

/// Test: a defending target can take 0 damage
#[test]
fn test_defending_floor_is_zero() {
    let mut battle = battle(
        vec![fighter("weakling", 1, 3, 3, 1)],
        vec![fighter("wall", 3, 5, 1, 3)],
    );
    // 1 + 5 = 6 vs 1 + 1 = 2 -> hit; defense 5 + 2 = 7
    let mut dice = rolls([5, 1, 1]);

    act(&mut battle, &mut dice, "weakling", Action::Pass);
    act(&mut battle, &mut dice, "wall", Action::Defend);
    let out = act(&mut battle, &mut dice, "weakling", Action::attack("wall"));

    let report = attack_report(&out);
    assert!(report.hit);
    assert!(report.defending);
    assert_eq!(report.damage, 0);
    assert_eq!(hp(&battle, "wall"), 100);
}

/// Test: granted attack multiplier applies once, crit doubles after it
#[test]
fn test_granted_attack_multiplier() {
    let mut battle = battle(
        vec![fighter("hero", 5, 3, 3, 4)],
        vec![fighter("orc", 3, 2, 3, 3)],
    );
    battle
        .grant_effect("hero", EffectKind::AttackMultiplier, 50, 1, "war cry")
        .unwrap();
    let mut dice = rolls([15, 4, 19]);

    let out = act(&mut battle, &mut dice, "hero", Action::attack("orc"));
    let report = attack_report(&out);

    // 18 * 1.5 * 2
    assert_eq!(report.damage, 54);
    assert_eq!(report.notes, vec!["war cry: +50% damage".to_string()]);
    assert!(battle.ledger().is_empty());
}

/// Test: a defend bonus outlives a miss and softens the next landed hit
#[test]
fn test_defend_bonus_kept_through_miss() {
    let mut battle = battle(
        vec![fighter("hero", 5, 3, 3, 4)],
        vec![fighter("orc", 3, 2, 3, 3)],
    );
    // 5 + 1 = 6 vs 3 + 10 = 13, then 5 + 15 = 20 vs 3 + 4 = 7
    let mut dice = rolls([1, 10, 15, 4, 1]);

    act(&mut battle, &mut dice, "hero", Action::Pass);
    act(&mut battle, &mut dice, "orc", Action::Defend);
    let out = act(&mut battle, &mut dice, "hero", Action::attack("orc"));
    assert!(!attack_report(&out).hit);
    assert!(battle.ledger().has("orc", EffectKind::DefenseBonus));

    act(&mut battle, &mut dice, "orc", Action::Pass);
    let out = act(&mut battle, &mut dice, "hero", Action::attack("orc"));
    let report = attack_report(&out);
    assert_eq!(report.defense_value, 4);
    assert_eq!(report.damage, 16);
    assert!(battle.ledger().is_empty());
}

/// Test: extreme granted magnitudes saturate instead of overflowing
#[test]
fn test_extreme_effects_saturate() {
    let mut battle = battle(
        vec![fighter("hero", 5, 3, 3, 4)],
        vec![fighter("orc", 3, 2, 3, 3)],
    );
    battle
        .grant_effect("orc", EffectKind::EvasionBonus, i32::MAX, 1, "blur")
        .unwrap();
    let mut dice = rolls([20, 1, 20, 1, 1]);

    let out = act(&mut battle, &mut dice, "hero", Action::attack("orc"));
    let report = attack_report(&out);
    assert!(!report.hit);
    assert_eq!(report.evasion_score, i32::MAX);
    assert_eq!(hp(&battle, "orc"), 100);

    act(&mut battle, &mut dice, "orc", Action::Pass);
    for source in ["rage", "fury"] {
        battle
            .grant_effect("hero", EffectKind::AttackMultiplier, i32::MAX, 1, source)
            .unwrap();
    }
    let out = act(&mut battle, &mut dice, "hero", Action::attack("orc"));
    let report = attack_report(&out);
    assert!(report.hit);
    assert_eq!(report.damage_bonus_pct, i32::MAX);
    assert_eq!(report.damage, i32::MAX);
    assert_eq!(hp(&battle, "orc"), 0);
    assert!(battle.is_ended());
}

/// Test: rules that could overflow a score are refused at creation
#[test]
fn test_oversized_boost_multiplier_rejected() {
    let config = BattleConfig {
        attack_boost_multiplier: i32::MAX,
        ..Default::default()
    };
    let result = Battle::create(
        "oversized",
        &[fighter("hero", 5, 3, 3, 4)],
        &[fighter("orc", 3, 2, 3, 3)],
        config,
    );
    assert!(matches!(result, Err(CombatError::InvalidSetup(_))));
}

fn expiring_duel(turns: u32) -> Battle {
    battle_with(
        vec![fighter("hero", 5, 3, 3, 4)],
        vec![fighter("orc", 3, 2, 3, 3)],
        BattleConfig {
            effect_expiry: EffectExpiry::AfterOwnerTurns(turns),
            ..Default::default()
        },
    )
}

/// Test: an unused defend bonus lapses after the owner's own turns
#[test]
fn test_defend_bonus_expires_after_owner_turns() {
    let mut battle = expiring_duel(2);
    let mut dice = rolls([15, 4, 1]);

    act(&mut battle, &mut dice, "hero", Action::Pass);
    act(&mut battle, &mut dice, "orc", Action::Defend);
    act(&mut battle, &mut dice, "hero", Action::Pass);
    // First owner turn started: one turn left
    assert!(battle.ledger().has("orc", EffectKind::DefenseBonus));

    act(&mut battle, &mut dice, "orc", Action::Pass);
    act(&mut battle, &mut dice, "hero", Action::Pass);
    // Second owner turn started: lapsed unused
    assert!(!battle.ledger().has("orc", EffectKind::DefenseBonus));

    act(&mut battle, &mut dice, "orc", Action::Pass);
    let out = act(&mut battle, &mut dice, "hero", Action::attack("orc"));
    let report = attack_report(&out);
    assert_eq!(report.defense_value, 2);
    assert_eq!(report.damage, 18);
}

/// Test: a hit before expiry still gets the bonus
#[test]
fn test_defend_bonus_applies_before_expiry() {
    let mut battle = expiring_duel(2);
    let mut dice = rolls([15, 4, 1]);

    act(&mut battle, &mut dice, "hero", Action::Pass);
    act(&mut battle, &mut dice, "orc", Action::Defend);
    act(&mut battle, &mut dice, "hero", Action::Pass);
    act(&mut battle, &mut dice, "orc", Action::Pass);

    let out = act(&mut battle, &mut dice, "hero", Action::attack("orc"));
    let report = attack_report(&out);
    assert_eq!(report.defense_value, 4);
    assert_eq!(report.damage, 16);
    assert!(battle.ledger().is_empty());
    assert_eq!(hp(&battle, "orc"), 84);
}
