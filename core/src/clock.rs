//! Simulation clock: persisted settings, run state and wall-clock source.

use crate::types::{DurationMs, TimestampMs};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;

pub const DEFAULT_GAME_SPEED: f64 = 1.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub game_speed:     f64,
    #[serde(rename = "lastSaved")]
    pub last_saved_ms:  TimestampMs,
    #[serde(rename = "totalPlaytime")]
    pub total_playtime_ms: DurationMs,
}

impl GameSettings {
    pub fn new(now: TimestampMs) -> Self {
        Self {
            game_speed:        DEFAULT_GAME_SPEED,
            last_saved_ms:     now,
            total_playtime_ms: 0,
        }
    }

    /// Speed to apply this tick. Anything not strictly positive falls
    /// back to the default.
    pub fn effective_speed(&self) -> f64 {
        sanitize_speed(self.game_speed)
    }

    pub fn add_playtime(&mut self, elapsed: DurationMs) {
        self.total_playtime_ms = self.total_playtime_ms.saturating_add(elapsed);
    }

    pub fn stamp_saved(&mut self, now: TimestampMs) {
        self.last_saved_ms = now;
    }
}

pub fn sanitize_speed(speed: f64) -> f64 {
    if speed.is_finite() && speed > 0.0 { speed } else { DEFAULT_GAME_SPEED }
}

/// Whether live ticks are being applied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Stopped,
    Running,
}

/// Wall-clock source. The engine never reads the system clock directly.
pub trait TimeSource {
    fn now_ms(&self) -> TimestampMs;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> TimestampMs {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A settable clock for tests and fast-forward runs.
/// Clones share the same underlying time.
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    now: Rc<Cell<TimestampMs>>,
}

impl ManualTimeSource {
    pub fn new(start: TimestampMs) -> Self {
        Self { now: Rc::new(Cell::new(start)) }
    }

    pub fn set(&self, now: TimestampMs) {
        self.now.set(now);
    }

    pub fn advance(&self, by: DurationMs) {
        let by = TimestampMs::try_from(by).unwrap_or(TimestampMs::MAX);
        self.now.set(self.now.get().saturating_add(by));
    }
}

impl TimeSource for ManualTimeSource {
    fn now_ms(&self) -> TimestampMs {
        self.now.get()
    }
}
