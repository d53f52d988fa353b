//! Tick Engine: applies elapsed time to the ledgers.
//!
//! RULES:
//!   - Each call applies its effects exactly once.
//!   - Neither entry point can fail; bad input is clamped, not rejected.
//!   - Only positive net deltas are credited; offline gaps are capped.
//!
//! Live ticks cover wall-clock time while the session is running.
//! Offline catch-up covers the gap since the last save, once per process
//! start, at reduced efficiency.

use crate::{
    config::{GameConfig, OfflineConfig},
    evolution::{BonusFlags, BonusMultipliers},
    notification::{Notification, NotificationKind},
    resource::ResourceKind,
    snapshot::GameState,
    types::{DurationMs, TimestampMs, MS_PER_HOUR, MS_PER_SECOND},
    unit::{UnitKind, UnitRoster},
};
use serde::{Deserialize, Serialize};

const SECONDS_PER_HOUR: f64 = 3_600.0;

/// Signed amounts per resource: per-second rates or applied deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceAmounts {
    pub biomass:   f64,
    pub energy:    f64,
    pub knowledge: f64,
    pub territory: f64,
}

impl ResourceAmounts {
    pub fn get(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Biomass   => self.biomass,
            ResourceKind::Energy    => self.energy,
            ResourceKind::Knowledge => self.knowledge,
            ResourceKind::Territory => self.territory,
        }
    }

    fn add(&mut self, kind: ResourceKind, amount: f64) {
        match kind {
            ResourceKind::Biomass   => self.biomass += amount,
            ResourceKind::Energy    => self.energy += amount,
            ResourceKind::Knowledge => self.knowledge += amount,
            ResourceKind::Territory => self.territory += amount,
        }
    }

    fn scaled(&self, factor: f64) -> Self {
        Self {
            biomass:   self.biomass * factor,
            energy:    self.energy * factor,
            knowledge: self.knowledge * factor,
            territory: self.territory * factor,
        }
    }

    pub fn any_positive(&self) -> bool {
        ResourceKind::ALL.iter().any(|k| self.get(*k) > 0.0)
    }
}

/// Net per-second production of the whole roster, bonuses included.
pub fn production_rates(units: &UnitRoster, bonuses: &BonusFlags) -> ResourceAmounts {
    let multipliers = BonusMultipliers::from_flags(bonuses);
    let mut rates = ResourceAmounts::default();
    for kind in UnitKind::ALL {
        let count = units.count(kind);
        if count == 0 {
            continue;
        }
        for (resource, rate) in kind.profile().production {
            rates.add(
                *resource,
                rate * f64::from(count) * multipliers.for_resource(*resource),
            );
        }
    }
    rates
}

/// Evolution points per second: `ln(total + 1) × coefficient`,
/// zero with no units.
pub fn evolution_rate(total_units: u64, coefficient: f64) -> f64 {
    if total_units == 0 {
        return 0.0;
    }
    (total_units as f64 + 1.0).ln() * coefficient
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub elapsed_ms:      DurationMs,
    /// Deltas actually credited; net-negative channels show zero.
    pub applied:         ResourceAmounts,
    pub evolution_gain:  f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OfflineReport {
    pub gap_ms:       i64,
    /// Gap after the ceiling was applied.
    pub credited_ms:  DurationMs,
    pub hours:        f64,
    pub applied:      ResourceAmounts,
    pub notification: Notification,
}

#[derive(Debug, Clone)]
pub struct TickEngine {
    evolution_coefficient: f64,
    offline:               OfflineConfig,
    welcome_back_ms:       DurationMs,
}

impl TickEngine {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            evolution_coefficient: config.tick.evolution_rate,
            offline:               config.offline.clone(),
            welcome_back_ms:       config.notifications.welcome_back_ms,
        }
    }

    /// Advance live play by `elapsed_ms` at `speed`.
    pub fn live_tick(&self, state: &mut GameState, elapsed_ms: DurationMs, speed: f64) -> TickReport {
        let speed = crate::clock::sanitize_speed(speed);
        let factor = elapsed_ms as f64 / MS_PER_SECOND * speed;

        let rates = production_rates(&state.units, &state.evolution.bonuses);
        let applied = apply(state, &rates.scaled(factor));

        let evolution_gain =
            evolution_rate(state.units.total(), self.evolution_coefficient) * factor;
        state.evolution.add_points(evolution_gain);
        state.settings.add_playtime(elapsed_ms);

        log::debug!(
            "live tick: elapsed={elapsed_ms}ms speed={speed} biomass={:+.3} energy={:+.3} \
             knowledge={:+.3} territory={:+.3} evo={:+.4}",
            applied.biomass, applied.energy, applied.knowledge, applied.territory, evolution_gain
        );

        TickReport { elapsed_ms, applied, evolution_gain }
    }

    /// Credit time away since `last_saved_ms`. `None` when the gap is at
    /// or under the reload threshold; nothing is touched in that case.
    /// The caller stamps the save time afterwards either way.
    pub fn offline_tick(&self, state: &mut GameState, now_ms: TimestampMs) -> Option<OfflineReport> {
        let gap_ms = now_ms.saturating_sub(state.settings.last_saved_ms);
        let min_gap = i64::try_from(self.offline.min_gap_ms).unwrap_or(i64::MAX);
        if gap_ms <= min_gap {
            log::debug!("offline catch-up skipped: gap {gap_ms}ms under threshold");
            return None;
        }

        let credited_ms = u64::try_from(gap_ms)
            .unwrap_or(0)
            .min(self.offline.max_gap_ms);
        let hours = credited_ms as f64 / MS_PER_HOUR as f64;

        let rates = production_rates(&state.units, &state.evolution.bonuses);
        let gained = rates.scaled(SECONDS_PER_HOUR * hours * self.offline.efficiency);
        let applied = apply(state, &gained);

        let notification = Notification::new(
            NotificationKind::Success,
            "Welcome Back!",
            format!("You were away for {}h and gained resources!", hours.round()),
            now_ms,
            self.welcome_back_ms,
        );

        log::info!(
            "offline catch-up: gap={gap_ms}ms credited={credited_ms}ms hours={hours:.2} \
             biomass={:+.1} energy={:+.1} knowledge={:+.1} territory={:+.1}",
            applied.biomass, applied.energy, applied.knowledge, applied.territory
        );

        Some(OfflineReport { gap_ms, credited_ms, hours, applied, notification })
    }
}

/// Credit each resource whose net delta is positive. A channel whose
/// upkeep outweighs its production is left as it is.
fn apply(state: &mut GameState, deltas: &ResourceAmounts) -> ResourceAmounts {
    let mut applied = ResourceAmounts::default();
    for kind in ResourceKind::ALL {
        let delta = deltas.get(kind);
        if delta > 0.0 {
            applied.add(kind, state.resources.add(kind, delta));
        }
    }
    applied
}
