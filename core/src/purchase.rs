//! Purchase commands: the only subtractive mutations of the ledgers.
//!
//! Outcomes are values, not errors: a rejected purchase changes nothing
//! and the caller decides how to present it.

use crate::{
    evolution::BonusFlag,
    resource::Cost,
    snapshot::GameState,
    unit::{unit_cost, UnitKind},
    unlock::Progress,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOutcome {
    Purchased,
    InsufficientResources,
    Locked,
    AlreadyOwned,
}

impl PurchaseOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Purchased)
    }
}

pub fn progress(state: &GameState) -> Progress<'_> {
    Progress { units: &state.units, bonuses: &state.evolution.bonuses }
}

pub fn is_unit_unlocked(state: &GameState, kind: UnitKind) -> bool {
    kind.unlock_rule().is_met(&progress(state))
}

pub fn is_bonus_unlocked(state: &GameState, flag: BonusFlag) -> bool {
    flag.def().unlock.is_met(&progress(state))
}

/// Price of the next unit of `kind` for this state.
pub fn next_unit_cost(state: &GameState, kind: UnitKind) -> Cost {
    unit_cost(kind, state.units.count(kind))
}

/// Pay for and add one unit. Unlock rules are the caller's guard and are
/// not checked here.
pub fn purchase_unit(state: &mut GameState, kind: UnitKind) -> PurchaseOutcome {
    let cost = next_unit_cost(state, kind);
    if !state.resources.spend(&cost) {
        log::debug!("purchase {} rejected: cannot afford {:?}", kind.key(), cost.entries());
        return PurchaseOutcome::InsufficientResources;
    }
    state.units.increment(kind);
    log::debug!("purchased {} (now {})", kind.key(), state.units.count(kind));
    PurchaseOutcome::Purchased
}

/// Spend evolution points on a bonus. Rejections are idempotent.
pub fn purchase_bonus(state: &mut GameState, flag: BonusFlag) -> PurchaseOutcome {
    if state.evolution.bonuses.has(flag) {
        return PurchaseOutcome::AlreadyOwned;
    }
    if !is_bonus_unlocked(state, flag) {
        return PurchaseOutcome::Locked;
    }
    let def = flag.def();
    if !state.evolution.buy(flag, def.cost) {
        log::debug!(
            "bonus {} rejected: {:.2} points < {}",
            flag.key(), state.evolution.points, def.cost
        );
        return PurchaseOutcome::InsufficientResources;
    }
    log::info!("bonus {} unlocked for {} points", flag.key(), def.cost);
    PurchaseOutcome::Purchased
}
