//! Unlock predicates for units and evolution bonuses.
//!
//! Every rule is a tagged variant evaluated against a read-only
//! `Progress` view. Callers never branch on rule text.

use crate::{
    evolution::{BonusFlag, BonusFlags},
    unit::{UnitKind, UnitRoster},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum UnlockRule {
    Always,
    UnitsAtLeast { unit: UnitKind, count: u32 },
    BonusOwned { bonus: BonusFlag },
    AllOf { rules: Vec<UnlockRule> },
}

/// The slice of state unlock rules may look at.
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    pub units:   &'a UnitRoster,
    pub bonuses: &'a BonusFlags,
}

impl UnlockRule {
    pub fn is_met(&self, progress: &Progress<'_>) -> bool {
        match self {
            Self::Always => true,
            Self::UnitsAtLeast { unit, count } => progress.units.count(*unit) >= *count,
            Self::BonusOwned { bonus } => progress.bonuses.has(*bonus),
            Self::AllOf { rules } => rules.iter().all(|r| r.is_met(progress)),
        }
    }

    /// Short human-readable requirement, for UI tooltips and logs.
    pub fn describe(&self) -> String {
        match self {
            Self::Always => "always available".to_string(),
            Self::UnitsAtLeast { unit, count } => format!("{} >= {count}", unit.key()),
            Self::BonusOwned { bonus } => format!("requires {}", bonus.key()),
            Self::AllOf { rules } => rules
                .iter()
                .map(UnlockRule::describe)
                .collect::<Vec<_>>()
                .join(" and "),
        }
    }
}
