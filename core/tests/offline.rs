//! Offline catch-up tests.
//!
//! Tests cover: the 5-minute reload threshold, the 24-hour ceiling, the
//! 50% efficiency factor, the single welcome-back notification and the
//! once-per-process guard on the simulation context.

use hive_core::{
    clock::ManualTimeSource,
    config::GameConfig,
    engine::Simulation,
    event::SimEvent,
    notification::NotificationKind,
    snapshot::GameState,
    store::MemoryKv,
    tick::TickEngine,
    types::{MS_PER_HOUR, MS_PER_MINUTE},
};

const NOW: i64 = 1_700_000_000_000;

fn engine() -> TickEngine {
    TickEngine::new(&GameConfig::default_test())
}

fn state_saved_ago(ago_ms: u64, workers: u32) -> GameState {
    let mut state = GameState::new(NOW - ago_ms as i64);
    state.resources.biomass = 0.0;
    state.resources.energy = 0.0;
    state.units.workers = workers;
    state
}

#[test]
fn ten_hours_away_with_five_workers() {
    let mut state = state_saved_ago(10 * MS_PER_HOUR, 5);

    let report = engine().offline_tick(&mut state, NOW).expect("gap is over threshold");

    assert_eq!(report.credited_ms, 10 * MS_PER_HOUR);
    assert!((report.hours - 10.0).abs() < 1e-12);
    assert!((state.resources.biomass - 180_000.0).abs() < 1e-6, "biomass {}", state.resources.biomass);
    assert!((state.resources.energy - 90_000.0).abs() < 1e-6, "energy {}", state.resources.energy);
    assert_eq!(report.notification.title, "Welcome Back!");
    assert_eq!(report.notification.kind, NotificationKind::Success);
    assert!(report.notification.message.contains("10h"));
    assert_eq!(report.notification.display_duration_ms, 8_000);
}

#[test]
fn gap_at_or_under_five_minutes_is_a_noop() {
    for ago in [0, 1_000, 5 * MS_PER_MINUTE] {
        let mut state = state_saved_ago(ago, 50);
        let before = state;
        assert!(engine().offline_tick(&mut state, NOW).is_none(), "gap {ago}ms should be ignored");
        assert_eq!(state, before);
    }
}

#[test]
fn just_over_five_minutes_credits() {
    let mut state = state_saved_ago(5 * MS_PER_MINUTE + 1, 1);
    assert!(engine().offline_tick(&mut state, NOW).is_some());
    assert!(state.resources.biomass > 0.0);
}

#[test]
fn gap_is_capped_at_twenty_four_hours() {
    let mut day = state_saved_ago(24 * MS_PER_HOUR, 3);
    let mut week = state_saved_ago(7 * 24 * MS_PER_HOUR, 3);

    let day_report = engine().offline_tick(&mut day, NOW).unwrap();
    let week_report = engine().offline_tick(&mut week, NOW).unwrap();

    assert_eq!(week_report.credited_ms, 24 * MS_PER_HOUR);
    assert_eq!(day_report.credited_ms, week_report.credited_ms);
    assert_eq!(day.resources, week.resources);
    assert!((week.resources.biomass - 2.0 * 3.0 * 3_600.0 * 24.0 * 0.5).abs() < 1e-6);
}

#[test]
fn future_last_saved_is_ignored() {
    let mut state = GameState::new(NOW + MS_PER_HOUR as i64);
    state.units.workers = 10;
    let before = state;
    assert!(engine().offline_tick(&mut state, NOW).is_none());
    assert_eq!(state, before);
}

#[test]
fn offline_does_not_accrue_evolution_or_playtime() {
    let mut state = state_saved_ago(2 * MS_PER_HOUR, 20);
    engine().offline_tick(&mut state, NOW).unwrap();
    assert_eq!(state.evolution.points, 0.0);
    assert_eq!(state.settings.total_playtime_ms, 0);
}

#[test]
fn offline_upkeep_leaves_energy_untouched() {
    let mut state = state_saved_ago(2 * MS_PER_HOUR, 0);
    state.units.specialists = 4;
    state.resources.energy = 30.0;

    let report = engine().offline_tick(&mut state, NOW).unwrap();

    assert_eq!(state.resources.energy, 30.0);
    assert_eq!(report.applied.energy, 0.0);
    // 2 knowledge × 4 × 3600 × 2h × 0.5
    assert!((state.resources.knowledge - 28_800.0).abs() < 1e-6);
}

// ── Through the simulation context ─────────────────────────────────

fn simulation_with_session(state: &GameState, clock: &ManualTimeSource) -> Simulation<MemoryKv> {
    let config = GameConfig::default_test();
    let mut kv = MemoryKv::new(config.saves.storage_capacity_bytes);
    hive_core::store::KvStore::set(
        &mut kv,
        hive_core::save::SESSION_KEY,
        &serde_json::to_string(state).unwrap(),
    )
    .unwrap();
    Simulation::new(config, kv, Box::new(clock.clone()))
}

fn welcome_notifications(events: &[SimEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, SimEvent::Notified { notification } if notification.title == "Welcome Back!"))
        .count()
}

#[test]
fn boot_applies_catch_up_once_and_stamps_save_time() {
    let clock = ManualTimeSource::new(NOW);
    let saved = state_saved_ago(10 * MS_PER_HOUR, 5);
    let mut sim = simulation_with_session(&saved, &clock);

    let report = sim.boot();
    assert!(report.is_some());
    assert!((sim.state().resources.biomass - 180_000.0).abs() < 1e-6);
    assert_eq!(sim.state().settings.last_saved_ms, NOW);

    let events = sim.drain_events();
    assert_eq!(welcome_notifications(&events), 1);

    // A second catch-up in the same process is refused.
    clock.advance(10 * MS_PER_HOUR);
    assert!(sim.catch_up().is_none());
    assert!((sim.state().resources.biomass - 180_000.0).abs() < 1e-6);
    assert_eq!(welcome_notifications(&sim.drain_events()), 0);
}

#[test]
fn boot_stamps_save_time_even_without_credit() {
    let clock = ManualTimeSource::new(NOW);
    let saved = state_saved_ago(MS_PER_MINUTE, 5);
    let mut sim = simulation_with_session(&saved, &clock);

    assert!(sim.boot().is_none());
    assert_eq!(sim.state().settings.last_saved_ms, NOW);
    assert_eq!(sim.state().resources, saved.resources);
    assert_eq!(welcome_notifications(&sim.drain_events()), 0);

    let stored = sim.saves().load_session().unwrap().expect("session stored");
    assert_eq!(stored.settings.last_saved_ms, NOW);
}

#[test]
fn rebooting_on_the_stamped_session_is_idempotent() {
    let clock = ManualTimeSource::new(NOW);
    let saved = state_saved_ago(3 * MS_PER_HOUR, 4);
    let mut first = simulation_with_session(&saved, &clock);
    first.boot();
    let after_first = *first.state();

    // Same wall-clock instant, new process, same storage contents.
    let second_kv_state = first.saves().load_session().unwrap().unwrap();
    let mut second = simulation_with_session(&second_kv_state, &clock);
    assert!(second.boot().is_none());
    assert_eq!(second.state().resources, after_first.resources);
}
