//! Unit Roster: owned unit counts and the static unit catalog.

use crate::{
    resource::{Cost, ResourceKind},
    unlock::UnlockRule,
};
use serde::{Deserialize, Serialize};

/// Compounding price growth per unit already owned.
pub const COST_GROWTH: f64 = 1.15;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Worker,
    Scout,
    Soldier,
    Specialist,
}

impl UnitKind {
    pub const ALL: [UnitKind; 4] = [
        UnitKind::Worker,
        UnitKind::Scout,
        UnitKind::Soldier,
        UnitKind::Specialist,
    ];

    /// Key used in the persisted roster.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Worker     => "workers",
            Self::Scout      => "scouts",
            Self::Soldier    => "soldiers",
            Self::Specialist => "specialists",
        }
    }

    pub fn profile(&self) -> UnitProfile {
        use ResourceKind::*;
        match self {
            Self::Worker => UnitProfile {
                label:      "Workers",
                base_cost:  &[(Biomass, 10), (Energy, 5)],
                production: &[(Biomass, 2.0), (Energy, 1.0)],
            },
            Self::Scout => UnitProfile {
                label:      "Scouts",
                base_cost:  &[(Biomass, 15), (Energy, 10)],
                production: &[(Territory, 1.0), (Knowledge, 0.5)],
            },
            Self::Soldier => UnitProfile {
                label:      "Soldiers",
                base_cost:  &[(Biomass, 25), (Energy, 15), (Knowledge, 5)],
                production: &[(Territory, 0.5)],
            },
            Self::Specialist => UnitProfile {
                label:      "Specialists",
                base_cost:  &[(Biomass, 40), (Energy, 20), (Knowledge, 10)],
                // Negative energy is upkeep.
                production: &[(Knowledge, 2.0), (Energy, -1.0)],
            },
        }
    }

    pub fn unlock_rule(&self) -> UnlockRule {
        match self {
            Self::Worker     => UnlockRule::Always,
            Self::Scout      => UnlockRule::UnitsAtLeast { unit: Self::Worker, count: 5 },
            Self::Soldier    => UnlockRule::UnitsAtLeast { unit: Self::Scout, count: 3 },
            Self::Specialist => UnlockRule::UnitsAtLeast { unit: Self::Soldier, count: 2 },
        }
    }
}

/// Static per-kind data. Rates are per unit, per second.
#[derive(Debug, Clone, Copy)]
pub struct UnitProfile {
    pub label:      &'static str,
    pub base_cost:  &'static [(ResourceKind, u64)],
    pub production: &'static [(ResourceKind, f64)],
}

impl UnitProfile {
    pub fn rate(&self, kind: ResourceKind) -> f64 {
        self.production
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, rate)| *rate)
            .sum()
    }
}

/// Price of the next unit of `kind` when `owned` are already held:
/// `floor(base × 1.15^owned)` per channel.
pub fn unit_cost(kind: UnitKind, owned: u32) -> Cost {
    let multiplier = COST_GROWTH.powi(owned.min(i32::MAX as u32) as i32);
    let entries = kind
        .profile()
        .base_cost
        .iter()
        .map(|(resource, base)| {
            let scaled = (*base as f64 * multiplier).floor();
            // Saturating float-to-int cast keeps absurd counts bounded.
            (*resource, scaled as u64)
        })
        .collect();
    Cost::new(entries)
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnitRoster {
    pub workers:     u32,
    pub scouts:      u32,
    pub soldiers:    u32,
    pub specialists: u32,
}

impl UnitRoster {
    pub fn count(&self, kind: UnitKind) -> u32 {
        match kind {
            UnitKind::Worker     => self.workers,
            UnitKind::Scout      => self.scouts,
            UnitKind::Soldier    => self.soldiers,
            UnitKind::Specialist => self.specialists,
        }
    }

    pub fn increment(&mut self, kind: UnitKind) {
        let slot = match kind {
            UnitKind::Worker     => &mut self.workers,
            UnitKind::Scout      => &mut self.scouts,
            UnitKind::Soldier    => &mut self.soldiers,
            UnitKind::Specialist => &mut self.specialists,
        };
        *slot = slot.saturating_add(1);
    }

    pub fn total(&self) -> u64 {
        UnitKind::ALL.iter().map(|k| u64::from(self.count(*k))).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_unit_costs_base() {
        let cost = unit_cost(UnitKind::Worker, 0);
        assert_eq!(cost.amount(ResourceKind::Biomass), 10);
        assert_eq!(cost.amount(ResourceKind::Energy), 5);
        assert_eq!(cost.amount(ResourceKind::Knowledge), 0);
    }

    #[test]
    fn cost_compounds_and_rounds_down() {
        // 10 × 1.15^3 = 15.20875, 5 × 1.15^3 = 7.604375
        let cost = unit_cost(UnitKind::Worker, 3);
        assert_eq!(cost.amount(ResourceKind::Biomass), 15);
        assert_eq!(cost.amount(ResourceKind::Energy), 7);
    }

    #[test]
    fn specialist_has_energy_upkeep() {
        let profile = UnitKind::Specialist.profile();
        assert_eq!(profile.rate(ResourceKind::Energy), -1.0);
        assert_eq!(profile.rate(ResourceKind::Knowledge), 2.0);
    }
}
