//! Resource Ledger: current amounts of the four resource kinds.
//!
//! RULE: no entry ever falls below zero.
//! Additions are floored at zero; spends are all-or-nothing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Biomass,
    Energy,
    Knowledge,
    Territory,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Biomass,
        ResourceKind::Energy,
        ResourceKind::Knowledge,
        ResourceKind::Territory,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Biomass   => "biomass",
            Self::Energy    => "energy",
            Self::Knowledge => "knowledge",
            Self::Territory => "territory",
        }
    }
}

/// An integer price across one or more resource channels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cost {
    entries: Vec<(ResourceKind, u64)>,
}

impl Cost {
    pub fn new(entries: Vec<(ResourceKind, u64)>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[(ResourceKind, u64)] {
        &self.entries
    }

    /// Amount required in `kind`, zero when the channel is not listed.
    pub fn amount(&self, kind: ResourceKind) -> u64 {
        self.entries
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, amount)| *amount)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ResourceLedger {
    pub biomass:   f64,
    pub energy:    f64,
    pub knowledge: f64,
    pub territory: f64,
}

impl Default for ResourceLedger {
    fn default() -> Self {
        Self {
            biomass:   50.0,
            energy:    25.0,
            knowledge: 0.0,
            territory: 0.0,
        }
    }
}

impl ResourceLedger {
    pub fn empty() -> Self {
        Self { biomass: 0.0, energy: 0.0, knowledge: 0.0, territory: 0.0 }
    }

    pub fn get(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Biomass   => self.biomass,
            ResourceKind::Energy    => self.energy,
            ResourceKind::Knowledge => self.knowledge,
            ResourceKind::Territory => self.territory,
        }
    }

    fn slot_mut(&mut self, kind: ResourceKind) -> &mut f64 {
        match kind {
            ResourceKind::Biomass   => &mut self.biomass,
            ResourceKind::Energy    => &mut self.energy,
            ResourceKind::Knowledge => &mut self.knowledge,
            ResourceKind::Territory => &mut self.territory,
        }
    }

    /// Apply a signed delta, flooring the result at zero.
    /// Returns the amount actually applied.
    pub fn add(&mut self, kind: ResourceKind, amount: f64) -> f64 {
        if !amount.is_finite() || amount == 0.0 {
            return 0.0;
        }
        let slot = self.slot_mut(kind);
        let previous = *slot;
        *slot = (previous + amount).max(0.0);
        *slot - previous
    }

    pub fn can_afford(&self, cost: &Cost) -> bool {
        ResourceKind::ALL
            .iter()
            .all(|kind| self.get(*kind) >= cost.amount(*kind) as f64)
    }

    /// Debit every channel of `cost`, or nothing at all.
    pub fn spend(&mut self, cost: &Cost) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        for kind in ResourceKind::ALL {
            let amount = cost.amount(kind) as f64;
            if amount > 0.0 {
                let slot = self.slot_mut(kind);
                *slot = (*slot - amount).max(0.0);
            }
        }
        true
    }

    /// True when every entry is finite and non-negative.
    /// Stored records are checked with this before they are accepted.
    pub fn is_valid(&self) -> bool {
        ResourceKind::ALL
            .iter()
            .all(|kind| { let v = self.get(*kind); v.is_finite() && v >= 0.0 })
    }
}
