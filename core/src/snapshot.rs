//! Game state snapshot: the full persisted simulation state.
//!
//! A snapshot captures everything needed to resume a session:
//! resources, units, evolution and settings. Run state (running or
//! stopped) is not part of it.

use crate::{
    clock::GameSettings,
    evolution::EvolutionLedger,
    resource::ResourceLedger,
    types::TimestampMs,
    unit::UnitRoster,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GameState {
    pub resources: ResourceLedger,
    pub units:     UnitRoster,
    pub evolution: EvolutionLedger,
    pub settings:  GameSettings,
}

impl GameState {
    /// Fresh first-run state.
    pub fn new(now: TimestampMs) -> Self {
        Self {
            resources: ResourceLedger::default(),
            units:     UnitRoster::default(),
            evolution: EvolutionLedger::default(),
            settings:  GameSettings::new(now),
        }
    }

    /// Shape checks serde cannot express on its own.
    pub fn validate(&self) -> Result<(), String> {
        if !self.resources.is_valid() {
            return Err("resource amounts must be finite and non-negative".into());
        }
        if !self.evolution.points.is_finite() || self.evolution.points < 0.0 {
            return Err("evolution points must be finite and non-negative".into());
        }
        if !self.settings.game_speed.is_finite() || self.settings.game_speed <= 0.0 {
            return Err("game speed must be positive".into());
        }
        Ok(())
    }
}
