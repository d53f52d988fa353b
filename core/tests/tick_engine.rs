//! Live tick tests.
//!
//! Tests cover: per-unit production, bonus multipliers (hiveUnity
//! included), net-negative channels under upkeep, logarithmic evolution accrual,
//! speed scaling and playtime.

use hive_core::{
    config::GameConfig,
    evolution::BonusFlag,
    snapshot::GameState,
    tick::{evolution_rate, production_rates, TickEngine},
};

const EPS: f64 = 1e-9;

fn engine() -> TickEngine {
    TickEngine::new(&GameConfig::default_test())
}

fn empty_state() -> GameState {
    let mut state = GameState::new(0);
    state.resources.biomass = 0.0;
    state.resources.energy = 0.0;
    state
}

#[test]
fn ten_workers_for_one_second() {
    let mut state = empty_state();
    state.units.workers = 10;

    let report = engine().live_tick(&mut state, 1_000, 1.0);

    assert!((state.resources.biomass - 20.0).abs() < EPS, "biomass: {}", state.resources.biomass);
    assert!((state.resources.energy - 10.0).abs() < EPS, "energy: {}", state.resources.energy);
    assert_eq!(state.resources.knowledge, 0.0);
    assert_eq!(state.resources.territory, 0.0);

    let expected = 11f64.ln() * 0.1;
    assert!((state.evolution.points - expected).abs() < EPS);
    assert!((report.evolution_gain - 0.2398).abs() < 1e-4);
}

#[test]
fn elapsed_and_speed_scale_linearly() {
    let mut a = empty_state();
    let mut b = empty_state();
    a.units.scouts = 4;
    b.units.scouts = 4;

    engine().live_tick(&mut a, 3_000, 1.0);
    engine().live_tick(&mut b, 1_000, 3.0);

    assert!((a.resources.territory - 12.0).abs() < EPS);
    assert!((a.resources.territory - b.resources.territory).abs() < EPS);
    assert!((a.resources.knowledge - b.resources.knowledge).abs() < EPS);
    assert!((a.evolution.points - b.evolution.points).abs() < EPS);
}

#[test]
fn zero_elapsed_changes_nothing_but_is_fine() {
    let mut state = GameState::new(0);
    state.units.workers = 3;
    let before = state;

    engine().live_tick(&mut state, 0, 1.0);

    assert_eq!(state.resources, before.resources);
    assert_eq!(state.evolution.points, before.evolution.points);
}

#[test]
fn no_units_means_no_evolution_points() {
    let mut state = GameState::new(0);
    engine().live_tick(&mut state, 60_000, 1.0);
    assert_eq!(state.evolution.points, 0.0);
    assert_eq!(evolution_rate(0, 0.1), 0.0);
}

#[test]
fn upkeep_never_drives_resources_negative() {
    let mut state = GameState::new(0);
    state.units.specialists = 3;
    state.resources.energy = 5.0;

    for elapsed in [1u64, 1_000, 60_000, 86_400_000, u32::MAX as u64] {
        engine().live_tick(&mut state, elapsed, 1.0);
        for kind in hive_core::resource::ResourceKind::ALL {
            assert!(state.resources.get(kind) >= 0.0, "{kind:?} went negative after {elapsed}ms");
        }
    }
    assert_eq!(state.resources.energy, 5.0);
    assert!(state.resources.knowledge > 0.0);
}

#[test]
fn net_negative_channel_is_left_unchanged() {
    let mut state = GameState::new(0);
    state.units.specialists = 3;
    state.resources.energy = 100.0;

    let report = engine().live_tick(&mut state, 10_000, 1.0);

    assert_eq!(state.resources.energy, 100.0);
    assert_eq!(report.applied.energy, 0.0);
    assert!((state.resources.knowledge - 60.0).abs() < EPS);
}

#[test]
fn workers_offset_specialist_upkeep() {
    let mut state = empty_state();
    state.units.workers = 2;
    state.units.specialists = 1;

    engine().live_tick(&mut state, 1_000, 1.0);

    // 2 × 1 energy from workers, minus 1 upkeep.
    assert!((state.resources.energy - 1.0).abs() < EPS);
}

#[test]
fn invalid_speed_falls_back_to_default() {
    let mut a = empty_state();
    let mut b = empty_state();
    a.units.workers = 1;
    b.units.workers = 1;

    engine().live_tick(&mut a, 1_000, 1.0);
    engine().live_tick(&mut b, 1_000, f64::NAN);
    assert_eq!(a.resources, b.resources);

    let mut c = empty_state();
    c.units.workers = 1;
    engine().live_tick(&mut c, 1_000, -5.0);
    assert_eq!(a.resources, c.resources);
}

#[test]
fn category_bonuses_apply_per_resource() {
    let mut state = empty_state();
    state.units.workers = 2;
    state.units.scouts = 2;
    state.evolution.bonuses.set(BonusFlag::EnhancedMetabolism);
    state.evolution.bonuses.set(BonusFlag::KnowledgeSynthesis);
    state.evolution.bonuses.set(BonusFlag::TerritorialDominance);

    let rates = production_rates(&state.units, &state.evolution.bonuses);
    assert!((rates.biomass - 2.0 * 2.0 * 1.25).abs() < EPS);
    assert!((rates.energy - 1.0 * 2.0 * 1.25).abs() < EPS);
    assert!((rates.knowledge - 0.5 * 2.0 * 1.5).abs() < EPS);
    assert!((rates.territory - 1.0 * 2.0 * 1.3).abs() < EPS);
}

#[test]
fn hive_unity_scales_other_bonuses_by_ten_percent() {
    let mut state = empty_state();
    state.units.workers = 1;
    state.units.scouts = 1;
    for flag in BonusFlag::ALL {
        state.evolution.bonuses.set(flag);
    }

    let rates = production_rates(&state.units, &state.evolution.bonuses);
    assert!((rates.biomass - 2.0 * 1.275).abs() < EPS, "biomass rate {}", rates.biomass);
    assert!((rates.knowledge - 0.5 * 1.55).abs() < EPS, "knowledge rate {}", rates.knowledge);
    assert!((rates.territory - 1.0 * 1.33).abs() < EPS, "territory rate {}", rates.territory);
}

#[test]
fn evolution_accrual_is_increasing_and_concave() {
    let rate = |n: u64| evolution_rate(n, 0.1);
    for n in 1..200u64 {
        assert!(rate(n + 1) > rate(n), "not increasing at {n}");
        // Second difference strictly negative.
        assert!(
            rate(n + 1) - rate(n) < rate(n) - rate(n.saturating_sub(1)),
            "not concave at {n}"
        );
        assert!(rate(2 * n) < 2.0 * rate(n), "doubling units doubled the rate at {n}");
    }
}

#[test]
fn playtime_accumulates_elapsed() {
    let mut state = GameState::new(0);
    engine().live_tick(&mut state, 1_000, 2.0);
    engine().live_tick(&mut state, 500, 1.0);
    assert_eq!(state.settings.total_playtime_ms, 1_500);
}
