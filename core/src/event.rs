//! Events pushed to the presentation layer.
//!
//! RULE: the presentation layer only ever reads.
//! It receives these events and the read-only state view; every
//! mutation goes through a `PlayerCommand`.

use crate::{
    clock::RunState,
    evolution::{BonusFlag, EvolutionLedger},
    notification::Notification,
    record::SlotSummary,
    resource::ResourceLedger,
    tick::ResourceAmounts,
    types::{DurationMs, SlotId},
    unit::{UnitKind, UnitRoster},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── State ──────────────────────────────────────
    StateChanged {
        resources: ResourceLedger,
        units:     UnitRoster,
        evolution: EvolutionLedger,
    },
    RunStateChanged {
        state: RunState,
    },
    SpeedChanged {
        multiplier: f64,
    },

    // ── Ticks ──────────────────────────────────────
    LiveTickApplied {
        elapsed_ms: DurationMs,
        applied:    ResourceAmounts,
        evolution_gain: f64,
    },
    OfflineProgressApplied {
        credited_ms: DurationMs,
        hours:       f64,
        applied:     ResourceAmounts,
    },

    // ── Purchases ──────────────────────────────────
    UnitPurchased {
        unit:  UnitKind,
        count: u32,
    },
    BonusPurchased {
        bonus: BonusFlag,
    },

    // ── Saves ──────────────────────────────────────
    SaveCreated {
        slot: SlotSummary,
    },
    SaveLoaded {
        id: SlotId,
    },
    SaveRenamed {
        slot: SlotSummary,
    },
    SaveDeleted {
        id: SlotId,
    },
    SaveImported {
        slot: SlotSummary,
    },
    GameReset,

    // ── Notifications ──────────────────────────────
    Notified {
        notification: Notification,
    },
}

impl SimEvent {
    /// Stable name for logging and IPC.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::StateChanged { .. }           => "state_changed",
            Self::RunStateChanged { .. }        => "run_state_changed",
            Self::SpeedChanged { .. }           => "speed_changed",
            Self::LiveTickApplied { .. }        => "live_tick_applied",
            Self::OfflineProgressApplied { .. } => "offline_progress_applied",
            Self::UnitPurchased { .. }          => "unit_purchased",
            Self::BonusPurchased { .. }         => "bonus_purchased",
            Self::SaveCreated { .. }            => "save_created",
            Self::SaveLoaded { .. }             => "save_loaded",
            Self::SaveRenamed { .. }            => "save_renamed",
            Self::SaveDeleted { .. }            => "save_deleted",
            Self::SaveImported { .. }           => "save_imported",
            Self::GameReset                     => "game_reset",
            Self::Notified { .. }               => "notified",
        }
    }
}
