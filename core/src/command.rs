use crate::{
    evolution::BonusFlag,
    purchase::PurchaseOutcome,
    record::SlotSummary,
    types::SlotId,
    unit::UnitKind,
};
use serde::{Deserialize, Serialize};

/// All commands the presentation layer may issue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Run control ───────────────────────────────
    Start,
    Pause,
    Reset,
    SetSpeed { multiplier: f64 },

    // ── Purchases ─────────────────────────────────
    PurchaseUnit { unit: UnitKind },
    PurchaseBonus { bonus: BonusFlag },

    // ── Saves ─────────────────────────────────────
    Save {
        #[serde(default)]
        name: Option<String>,
    },
    QuickSave,
    Load { id: SlotId },
    Delete { id: SlotId },
    Rename { id: SlotId, name: String },
    Export { id: SlotId },
    Import {
        token: String,
        #[serde(default)]
        name: Option<String>,
    },
}

impl PlayerCommand {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Start              => "start",
            Self::Pause              => "pause",
            Self::Reset              => "reset",
            Self::SetSpeed { .. }    => "set_speed",
            Self::PurchaseUnit { .. }  => "purchase_unit",
            Self::PurchaseBonus { .. } => "purchase_bonus",
            Self::Save { .. }        => "save",
            Self::QuickSave          => "quick_save",
            Self::Load { .. }        => "load",
            Self::Delete { .. }      => "delete",
            Self::Rename { .. }      => "rename",
            Self::Export { .. }      => "export",
            Self::Import { .. }      => "import",
        }
    }
}

/// What a dispatched command produced. Persistence failures arrive here
/// as `Failed`; they are never raised past the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandOutcome {
    Done,
    Purchase { outcome: PurchaseOutcome },
    Slot { slot: SlotSummary },
    Token { token: String },
    Rejected { reason: String },
    Failed { reason: String },
}

impl CommandOutcome {
    pub fn is_ok(&self) -> bool {
        match self {
            Self::Done | Self::Slot { .. } | Self::Token { .. } => true,
            Self::Purchase { outcome } => outcome.succeeded(),
            Self::Rejected { .. } | Self::Failed { .. } => false,
        }
    }
}
