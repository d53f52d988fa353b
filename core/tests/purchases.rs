//! Purchase command tests.
//!
//! Tests cover: compounding unit prices, atomic spending, unlock guards,
//! bonus purchases and their idempotent rejection.

use hive_core::{
    evolution::BonusFlag,
    purchase::{self, PurchaseOutcome},
    resource::ResourceKind,
    snapshot::GameState,
    unit::{unit_cost, UnitKind},
};

fn rich_state() -> GameState {
    let mut state = GameState::new(0);
    state.resources.biomass = 1_000_000.0;
    state.resources.energy = 1_000_000.0;
    state.resources.knowledge = 1_000_000.0;
    state.resources.territory = 1_000_000.0;
    state
}

#[test]
fn nth_unit_cost_is_floored_compound_price() {
    for kind in UnitKind::ALL {
        for owned in 0..40u32 {
            let cost = unit_cost(kind, owned);
            for (resource, base) in kind.profile().base_cost {
                let expected = (*base as f64 * 1.15f64.powi(owned as i32)).floor() as u64;
                assert_eq!(cost.amount(*resource), expected, "{kind:?} #{owned} {resource:?}");
            }
        }
    }
}

#[test]
fn purchase_debits_and_increments() {
    let mut state = GameState::new(0);
    let outcome = purchase::purchase_unit(&mut state, UnitKind::Worker);
    assert_eq!(outcome, PurchaseOutcome::Purchased);
    assert_eq!(state.units.workers, 1);
    assert_eq!(state.resources.biomass, 40.0);
    assert_eq!(state.resources.energy, 20.0);

    // Second worker: floor(11.5) biomass, floor(5.75) energy.
    purchase::purchase_unit(&mut state, UnitKind::Worker);
    assert_eq!(state.resources.biomass, 29.0);
    assert_eq!(state.resources.energy, 15.0);
}

#[test]
fn unaffordable_in_one_channel_changes_nothing() {
    let mut state = GameState::new(0);
    state.resources.biomass = 1_000.0;
    state.resources.energy = 1_000.0;
    state.resources.knowledge = 4.0; // soldier needs 5
    let before = state;

    let outcome = purchase::purchase_unit(&mut state, UnitKind::Soldier);
    assert_eq!(outcome, PurchaseOutcome::InsufficientResources);
    assert!(!outcome.succeeded());
    assert_eq!(state, before);
}

#[test]
fn ledger_purchase_does_not_check_unlocks() {
    let mut state = rich_state();
    assert!(!purchase::is_unit_unlocked(&state, UnitKind::Specialist));
    assert!(purchase::purchase_unit(&mut state, UnitKind::Specialist).succeeded());
    assert_eq!(state.units.specialists, 1);
}

#[test]
fn unit_unlock_chain() {
    let mut state = rich_state();
    assert!(purchase::is_unit_unlocked(&state, UnitKind::Worker));
    assert!(!purchase::is_unit_unlocked(&state, UnitKind::Scout));

    state.units.workers = 5;
    assert!(purchase::is_unit_unlocked(&state, UnitKind::Scout));
    assert!(!purchase::is_unit_unlocked(&state, UnitKind::Soldier));

    state.units.scouts = 3;
    assert!(purchase::is_unit_unlocked(&state, UnitKind::Soldier));
    state.units.soldiers = 2;
    assert!(purchase::is_unit_unlocked(&state, UnitKind::Specialist));
}

#[test]
fn bonus_purchase_spends_points_not_resources() {
    let mut state = GameState::new(0);
    state.evolution.points = 120.0;
    let resources = state.resources;

    let outcome = purchase::purchase_bonus(&mut state, BonusFlag::EnhancedMetabolism);
    assert_eq!(outcome, PurchaseOutcome::Purchased);
    assert!(state.evolution.bonuses.enhanced_metabolism);
    assert!((state.evolution.points - 20.0).abs() < 1e-12);
    assert_eq!(state.resources, resources);
}

#[test]
fn bonus_rejections() {
    let mut state = GameState::new(0);
    state.evolution.points = 99.0;
    assert_eq!(
        purchase::purchase_bonus(&mut state, BonusFlag::EnhancedMetabolism),
        PurchaseOutcome::InsufficientResources
    );
    assert_eq!(state.evolution.points, 99.0);

    state.evolution.points = 10_000.0;
    assert_eq!(
        purchase::purchase_bonus(&mut state, BonusFlag::RapidGrowth),
        PurchaseOutcome::Locked
    );
    assert_eq!(
        purchase::purchase_bonus(&mut state, BonusFlag::KnowledgeSynthesis),
        PurchaseOutcome::Locked
    );

    purchase::purchase_bonus(&mut state, BonusFlag::EnhancedMetabolism);
    let points = state.evolution.points;
    assert_eq!(
        purchase::purchase_bonus(&mut state, BonusFlag::EnhancedMetabolism),
        PurchaseOutcome::AlreadyOwned
    );
    assert_eq!(state.evolution.points, points);
}

#[test]
fn hive_unity_needs_every_other_bonus() {
    let mut state = rich_state();
    state.evolution.points = 100_000.0;
    state.units.workers = 10;
    state.units.scouts = 5;

    for flag in [
        BonusFlag::EnhancedMetabolism,
        BonusFlag::RapidGrowth,
        BonusFlag::KnowledgeSynthesis,
    ] {
        assert!(purchase::purchase_bonus(&mut state, flag).succeeded(), "{flag:?}");
    }
    assert_eq!(
        purchase::purchase_bonus(&mut state, BonusFlag::HiveUnity),
        PurchaseOutcome::Locked
    );
    assert!(purchase::purchase_bonus(&mut state, BonusFlag::TerritorialDominance).succeeded());
    assert!(purchase::purchase_bonus(&mut state, BonusFlag::HiveUnity).succeeded());
    assert!((state.evolution.points - (100_000.0 - 1_200.0)).abs() < 1e-9);
}

#[test]
fn next_cost_follows_owned_count() {
    let mut state = rich_state();
    let first = purchase::next_unit_cost(&state, UnitKind::Scout);
    purchase::purchase_unit(&mut state, UnitKind::Scout);
    let second = purchase::next_unit_cost(&state, UnitKind::Scout);
    assert!(second.amount(ResourceKind::Biomass) > first.amount(ResourceKind::Biomass));
}
