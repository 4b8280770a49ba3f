//! Property tests
//!
//! Random rosters, dice and action choices must never push HP outside
//! `[0, max_hp]` or spend items that are not there.

use proptest::prelude::*;
use skirmish::combat::{
    Action, Battle, CombatantSpec, Inventory, ItemKind, RawStats, SeededDice,
};
use skirmish::BattleConfig;

fn spec_strategy(id: String) -> impl Strategy<Value = CombatantSpec> {
    (
        -3i64..9,
        -3i64..9,
        -3i64..9,
        -3i64..9,
        1i32..150,
        0u32..3,
        0u32..3,
    )
        .prop_map(move |(atk, def, agi, luck, hp, heals, boosts)| {
            CombatantSpec::new(id.clone(), RawStats::new(atk, def, agi, luck))
                .with_max_hp(hp)
                .with_inventory(
                    Inventory::new()
                        .with(ItemKind::Heal, heals)
                        .with(ItemKind::AttackBoost, boosts)
                        .with(ItemKind::DefenseBoost, boosts),
                )
        })
}

fn choose(battle: &Battle, pick: u8) -> Option<(String, Action)> {
    let actor = battle.pending_actor()?;
    let enemy = battle
        .roster()
        .team(actor.team.other())
        .iter()
        .find(|c| c.is_alive())
        .map(|c| c.id.clone());
    let action = match pick % 6 {
        0 => Action::Attack { target: enemy },
        1 => Action::Defend,
        2 => Action::Dodge,
        3 => Action::item(ItemKind::Heal, None),
        4 => Action::Item {
            kind: ItemKind::AttackBoost,
            target: enemy,
        },
        _ => Action::item(ItemKind::DefenseBoost, None),
    };
    Some((actor.id.clone(), action))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_hp_and_items_stay_in_bounds(
        a1 in spec_strategy("a1".to_string()),
        a2 in spec_strategy("a2".to_string()),
        b1 in spec_strategy("b1".to_string()),
        seed in any::<u64>(),
        picks in proptest::collection::vec(any::<u8>(), 1..200),
    ) {
        let config = BattleConfig {
            attack_boost_chance: 0.5,
            defense_boost_chance: 0.5,
            ..Default::default()
        };
        let mut battle = Battle::create("prop", &[a1, a2], &[b1], config).unwrap();
        let mut dice = SeededDice::new(seed);

        for pick in picks {
            let Some((actor, action)) = choose(&battle, pick) else { break };
            let kind = match &action {
                Action::Item { kind, .. } => Some(*kind),
                _ => None,
            };
            let before = battle.roster().get(&actor).unwrap().inventory.clone();

            let accepted = battle.submit_action(&mut dice, &actor, action).is_ok();

            for c in battle.roster().iter() {
                prop_assert!(c.hp() >= 0 && c.hp() <= c.max_hp(), "{} hp {}", c.id, c.hp());
            }
            if let Some(kind) = kind {
                let after = battle.roster().get(&actor).unwrap().inventory.count(kind);
                if accepted {
                    prop_assert_eq!(after + 1, before.count(kind));
                } else {
                    prop_assert_eq!(after, before.count(kind));
                }
            }
            if !accepted {
                // A rejected action never consumes the turn
                prop_assert_eq!(
                    battle.pending_actor().map(|c| c.id.clone()),
                    Some(actor.clone())
                );
                prop_assert!(battle.submit_action(&mut dice, &actor, Action::Pass).is_ok());
            }
            if battle.is_ended() {
                break;
            }
        }
    }
}
