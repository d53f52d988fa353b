//! Evolution Ledger: accrued points and permanent bonus flags.
//!
//! Points only grow through accrual; the one debit is a bonus purchase.
//! Flags only ever move false → true.

use crate::{
    resource::ResourceKind,
    unit::UnitKind,
    unlock::UnlockRule,
};
use serde::{Deserialize, Serialize};

/// Extra effectiveness hiveUnity grants every other active bonus.
pub const HIVE_UNITY_SCALE: f64 = 1.1;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum BonusFlag {
    EnhancedMetabolism,
    RapidGrowth,
    KnowledgeSynthesis,
    TerritorialDominance,
    HiveUnity,
}

/// Production categories a bonus can scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductionCategory {
    /// Biomass and energy.
    General,
    Knowledge,
    Territory,
}

impl ProductionCategory {
    pub fn of(resource: ResourceKind) -> Self {
        match resource {
            ResourceKind::Biomass | ResourceKind::Energy => Self::General,
            ResourceKind::Knowledge => Self::Knowledge,
            ResourceKind::Territory => Self::Territory,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BonusEffect {
    Production { category: ProductionCategory, multiplier: f64 },
    /// Scales the other active bonuses.
    Amplify { scale: f64 },
    /// Prerequisite only; no effect on production.
    None,
}

#[derive(Debug, Clone)]
pub struct BonusDef {
    pub flag:        BonusFlag,
    pub label:       &'static str,
    pub description: &'static str,
    pub cost:        u64,
    pub effect:      BonusEffect,
    pub unlock:      UnlockRule,
}

impl BonusFlag {
    pub const ALL: [BonusFlag; 5] = [
        BonusFlag::EnhancedMetabolism,
        BonusFlag::RapidGrowth,
        BonusFlag::KnowledgeSynthesis,
        BonusFlag::TerritorialDominance,
        BonusFlag::HiveUnity,
    ];

    /// Key used in the persisted bonus map.
    pub fn key(&self) -> &'static str {
        match self {
            Self::EnhancedMetabolism   => "enhancedMetabolism",
            Self::RapidGrowth          => "rapidGrowth",
            Self::KnowledgeSynthesis   => "knowledgeSynthesis",
            Self::TerritorialDominance => "territorialDominance",
            Self::HiveUnity            => "hiveUnity",
        }
    }

    pub fn def(&self) -> BonusDef {
        match self {
            Self::EnhancedMetabolism => BonusDef {
                flag:        *self,
                label:       "Enhanced Metabolism",
                description: "+25% resource production from all units",
                cost:        100,
                effect:      BonusEffect::Production {
                    category:   ProductionCategory::General,
                    multiplier: 1.25,
                },
                unlock:      UnlockRule::Always,
            },
            Self::RapidGrowth => BonusDef {
                flag:        *self,
                label:       "Rapid Growth",
                description: "-20% unit production time",
                cost:        150,
                effect:      BonusEffect::None,
                unlock:      UnlockRule::BonusOwned { bonus: Self::EnhancedMetabolism },
            },
            Self::KnowledgeSynthesis => BonusDef {
                flag:        *self,
                label:       "Knowledge Synthesis",
                description: "+50% knowledge generation",
                cost:        200,
                effect:      BonusEffect::Production {
                    category:   ProductionCategory::Knowledge,
                    multiplier: 1.5,
                },
                unlock:      UnlockRule::UnitsAtLeast { unit: UnitKind::Worker, count: 10 },
            },
            Self::TerritorialDominance => BonusDef {
                flag:        *self,
                label:       "Territorial Dominance",
                description: "+30% territory expansion rate",
                cost:        250,
                effect:      BonusEffect::Production {
                    category:   ProductionCategory::Territory,
                    multiplier: 1.3,
                },
                unlock:      UnlockRule::UnitsAtLeast { unit: UnitKind::Scout, count: 5 },
            },
            Self::HiveUnity => BonusDef {
                flag:        *self,
                label:       "Hive Unity",
                description: "All bonuses receive +10% effectiveness",
                cost:        500,
                effect:      BonusEffect::Amplify { scale: HIVE_UNITY_SCALE },
                unlock:      UnlockRule::AllOf {
                    rules: [
                        Self::EnhancedMetabolism,
                        Self::RapidGrowth,
                        Self::KnowledgeSynthesis,
                        Self::TerritorialDominance,
                    ]
                    .into_iter()
                    .map(|bonus| UnlockRule::BonusOwned { bonus })
                    .collect(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BonusFlags {
    pub enhanced_metabolism:   bool,
    pub rapid_growth:          bool,
    pub knowledge_synthesis:   bool,
    pub territorial_dominance: bool,
    pub hive_unity:            bool,
}

impl BonusFlags {
    pub fn has(&self, flag: BonusFlag) -> bool {
        match flag {
            BonusFlag::EnhancedMetabolism   => self.enhanced_metabolism,
            BonusFlag::RapidGrowth          => self.rapid_growth,
            BonusFlag::KnowledgeSynthesis   => self.knowledge_synthesis,
            BonusFlag::TerritorialDominance => self.territorial_dominance,
            BonusFlag::HiveUnity            => self.hive_unity,
        }
    }

    /// One-way: there is no way to clear a flag.
    pub fn set(&mut self, flag: BonusFlag) {
        let slot = match flag {
            BonusFlag::EnhancedMetabolism   => &mut self.enhanced_metabolism,
            BonusFlag::RapidGrowth          => &mut self.rapid_growth,
            BonusFlag::KnowledgeSynthesis   => &mut self.knowledge_synthesis,
            BonusFlag::TerritorialDominance => &mut self.territorial_dominance,
            BonusFlag::HiveUnity            => &mut self.hive_unity,
        };
        *slot = true;
    }

    pub fn owned(&self) -> impl Iterator<Item = BonusFlag> + '_ {
        BonusFlag::ALL.into_iter().filter(|f| self.has(*f))
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct EvolutionLedger {
    pub points:  f64,
    pub bonuses: BonusFlags,
}

impl EvolutionLedger {
    /// Accrue points. Negative or non-finite amounts are ignored so the
    /// balance stays monotonic outside of purchases.
    pub fn add_points(&mut self, amount: f64) {
        if amount.is_finite() && amount > 0.0 {
            self.points += amount;
        }
    }

    /// Debit points and set the flag. The caller has already checked the
    /// unlock rule and ownership.
    pub(crate) fn buy(&mut self, flag: BonusFlag, cost: u64) -> bool {
        let cost = cost as f64;
        if self.bonuses.has(flag) || self.points < cost {
            return false;
        }
        self.points -= cost;
        self.bonuses.set(flag);
        true
    }

    /// Evolution level shown in save metadata.
    pub fn level(&self) -> u64 {
        (self.points.max(0.0) / 100.0).floor() as u64 + 1
    }
}

/// Per-category production multipliers derived from the owned flags.
///
/// Category bonuses are independent of each other (never compounded).
/// hiveUnity widens each active bonus: `1 + (bonus − 1) × 1.1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BonusMultipliers {
    pub general:   f64,
    pub knowledge: f64,
    pub territory: f64,
}

impl Default for BonusMultipliers {
    fn default() -> Self {
        Self { general: 1.0, knowledge: 1.0, territory: 1.0 }
    }
}

impl BonusMultipliers {
    pub fn from_flags(flags: &BonusFlags) -> Self {
        let amplify = flags
            .owned()
            .filter_map(|f| match f.def().effect {
                BonusEffect::Amplify { scale } => Some(scale),
                _ => None,
            })
            .fold(1.0, |acc, scale| acc * scale);

        let mut out = Self::default();
        for flag in flags.owned() {
            if let BonusEffect::Production { category, multiplier } = flag.def().effect {
                let effective = 1.0 + (multiplier - 1.0) * amplify;
                match category {
                    ProductionCategory::General   => out.general = effective,
                    ProductionCategory::Knowledge => out.knowledge = effective,
                    ProductionCategory::Territory => out.territory = effective,
                }
            }
        }
        out
    }

    pub fn for_resource(&self, resource: ResourceKind) -> f64 {
        match ProductionCategory::of(resource) {
            ProductionCategory::General   => self.general,
            ProductionCategory::Knowledge => self.knowledge,
            ProductionCategory::Territory => self.territory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn no_flags_means_unit_multipliers() {
        assert_eq!(BonusMultipliers::from_flags(&BonusFlags::default()), BonusMultipliers::default());
    }

    #[test]
    fn category_bonuses_are_independent() {
        let mut flags = BonusFlags::default();
        flags.set(BonusFlag::EnhancedMetabolism);
        flags.set(BonusFlag::KnowledgeSynthesis);
        let m = BonusMultipliers::from_flags(&flags);
        assert!(close(m.general, 1.25));
        assert!(close(m.knowledge, 1.5));
        assert!(close(m.territory, 1.0));
        assert!(close(m.for_resource(ResourceKind::Energy), 1.25));
    }

    #[test]
    fn hive_unity_widens_active_bonuses() {
        let mut flags = BonusFlags::default();
        for f in BonusFlag::ALL {
            flags.set(f);
        }
        let m = BonusMultipliers::from_flags(&flags);
        assert!(close(m.general, 1.275));
        assert!(close(m.knowledge, 1.55));
        assert!(close(m.territory, 1.33));
    }

    #[test]
    fn hive_unity_alone_changes_nothing() {
        let mut flags = BonusFlags::default();
        flags.set(BonusFlag::HiveUnity);
        assert_eq!(BonusMultipliers::from_flags(&flags), BonusMultipliers::default());
    }

    #[test]
    fn points_never_decrease_through_accrual() {
        let mut ledger = EvolutionLedger::default();
        ledger.add_points(2.5);
        ledger.add_points(-1.0);
        ledger.add_points(f64::NAN);
        assert_eq!(ledger.points, 2.5);
    }
}
