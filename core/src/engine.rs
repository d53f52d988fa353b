//! The simulation context. Single owner of all mutable game state.
//!
//! ORDER OF OPERATIONS (fixed):
//!   1. `boot()` once per process: reconcile storage, resume the session,
//!      apply offline catch-up, stamp and store the session, start.
//!   2. `advance()` on every scheduler beat while running: live tick,
//!      notification sweep, periodic session autosave.
//!   3. Commands arrive between beats and are applied synchronously.
//!
//! RULES:
//!   - Nothing outside this type mutates the ledgers.
//!   - The presentation layer reads `state()` and drained events only.
//!   - Persistence failures stop at `dispatch()` as `CommandOutcome::Failed`.

use crate::{
    clock::{RunState, TimeSource},
    command::{CommandOutcome, PlayerCommand},
    config::GameConfig,
    error::SimResult,
    event::SimEvent,
    evolution::BonusFlag,
    notification::{Notification, NotificationKind, NotificationQueue},
    purchase::{self, PurchaseOutcome},
    record::SlotSummary,
    resource::Cost,
    save::{ReconcileReport, SaveManager},
    snapshot::GameState,
    store::KvStore,
    tick::{self, OfflineReport, ResourceAmounts, TickEngine, TickReport},
    types::{DurationMs, TimestampMs},
    unit::UnitKind,
};

pub struct Simulation<S: KvStore> {
    config:        GameConfig,
    state:         GameState,
    run_state:     RunState,
    tick_engine:   TickEngine,
    saves:         SaveManager<S>,
    notifications: NotificationQueue,
    outbox:        Vec<SimEvent>,
    time:          Box<dyn TimeSource>,
    last_beat_ms:  Option<TimestampMs>,
    last_autosave_ms: TimestampMs,
    caught_up:     bool,
}

impl<S: KvStore> Simulation<S> {
    pub fn new(config: GameConfig, store: S, time: Box<dyn TimeSource>) -> Self {
        let now = time.now_ms();
        Self {
            tick_engine:   TickEngine::new(&config),
            saves:         SaveManager::new(store, config.saves.max_slots),
            state:         GameState::new(now),
            run_state:     RunState::Stopped,
            notifications: NotificationQueue::default(),
            outbox:        Vec::new(),
            last_beat_ms:  None,
            last_autosave_ms: now,
            caught_up:     false,
            config,
            time,
        }
    }

    // ── Lifecycle ──────────────────────────────────────────────

    /// Process start: resume the stored session (or start fresh), credit
    /// time away, then start live ticking.
    pub fn boot(&mut self) -> Option<OfflineReport> {
        match self.saves.reconcile() {
            Ok(report) if report != ReconcileReport::default() => {
                log::warn!("storage repaired on boot: {report:?}");
            }
            Ok(_) => {}
            Err(e) => log::error!("storage reconcile failed: {e}"),
        }

        match self.saves.load_session() {
            Ok(Some(state)) => {
                log::info!(
                    "resuming session: {} units, {:.1} evolution points",
                    state.units.total(), state.evolution.points
                );
                self.state = state;
            }
            Ok(None) => log::info!("no stored session, starting fresh"),
            Err(e) => {
                log::error!("stored session unusable, starting fresh: {e}");
                self.notify(
                    NotificationKind::Error,
                    "Save Data Problem",
                    "Your last session could not be read. A new hive was started.",
                    self.config.notifications.default_duration_ms,
                );
            }
        }

        let report = self.catch_up();
        self.start();
        self.emit_state();
        report
    }

    /// Offline catch-up. Runs at most once per `Simulation`; later calls
    /// are ignored. The session is stamped and stored afterwards whether
    /// or not anything was credited.
    pub fn catch_up(&mut self) -> Option<OfflineReport> {
        if self.caught_up {
            log::warn!("offline catch-up already applied this process, ignoring");
            return None;
        }
        self.caught_up = true;

        let now = self.time.now_ms();
        let report = self.tick_engine.offline_tick(&mut self.state, now);
        if let Some(r) = &report {
            self.outbox.push(SimEvent::OfflineProgressApplied {
                credited_ms: r.credited_ms,
                hours:       r.hours,
                applied:     r.applied,
            });
            self.push_notification(r.notification.clone());
            self.emit_state();
        }
        self.persist_session(now);
        report
    }

    pub fn start(&mut self) -> bool {
        if self.run_state == RunState::Running {
            return false;
        }
        self.run_state = RunState::Running;
        self.last_beat_ms = Some(self.time.now_ms());
        self.outbox.push(SimEvent::RunStateChanged { state: RunState::Running });
        log::info!("simulation started");
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.run_state == RunState::Stopped {
            return false;
        }
        self.run_state = RunState::Stopped;
        self.last_beat_ms = None;
        self.outbox.push(SimEvent::RunStateChanged { state: RunState::Stopped });
        log::info!("simulation paused");
        true
    }

    /// Back to first-run values, stopped.
    pub fn reset(&mut self) {
        let now = self.time.now_ms();
        self.pause();
        self.state = GameState::new(now);
        self.notifications.clear();
        self.outbox.push(SimEvent::GameReset);
        self.persist_session(now);
        self.emit_state();
        log::info!("simulation reset");
    }

    pub fn set_speed(&mut self, multiplier: f64) -> bool {
        if !(multiplier.is_finite() && multiplier > 0.0) {
            log::warn!("rejected game speed {multiplier}");
            return false;
        }
        self.state.settings.game_speed = multiplier;
        self.outbox.push(SimEvent::SpeedChanged { multiplier });
        let now = self.time.now_ms();
        self.persist_session(now);
        true
    }

    // ── Ticking ────────────────────────────────────────────────

    /// Apply `elapsed_ms` of live play. Ignored while stopped.
    pub fn tick(&mut self, elapsed_ms: DurationMs) -> Option<TickReport> {
        if self.run_state != RunState::Running {
            return None;
        }
        let speed = self.state.settings.effective_speed();
        let report = self.tick_engine.live_tick(&mut self.state, elapsed_ms, speed);
        self.outbox.push(SimEvent::LiveTickApplied {
            elapsed_ms,
            applied:        report.applied,
            evolution_gain: report.evolution_gain,
        });
        self.emit_state();
        Some(report)
    }

    /// Scheduler beat: tick by the wall-clock time since the previous
    /// beat, sweep notifications, autosave when due.
    pub fn advance(&mut self) -> Option<TickReport> {
        let now = self.time.now_ms();
        self.notifications.sweep(now);

        if self.run_state != RunState::Running {
            return None;
        }
        let previous = self.last_beat_ms.replace(now).unwrap_or(now);
        let elapsed = DurationMs::try_from(now.saturating_sub(previous)).unwrap_or(0);
        let report = self.tick(elapsed);

        let autosave_due = now.saturating_sub(self.last_autosave_ms)
            >= i64::try_from(self.config.tick.autosave_interval_ms).unwrap_or(i64::MAX);
        if autosave_due {
            self.persist_session(now);
        }
        report
    }

    // ── Purchases ──────────────────────────────────────────────

    pub fn purchase_unit(&mut self, kind: UnitKind) -> PurchaseOutcome {
        if !purchase::is_unit_unlocked(&self.state, kind) {
            log::debug!("purchase {} rejected: locked", kind.key());
            return PurchaseOutcome::Locked;
        }
        let outcome = purchase::purchase_unit(&mut self.state, kind);
        if outcome.succeeded() {
            self.outbox.push(SimEvent::UnitPurchased {
                unit:  kind,
                count: self.state.units.count(kind),
            });
            self.emit_state();
        }
        outcome
    }

    pub fn purchase_bonus(&mut self, flag: BonusFlag) -> PurchaseOutcome {
        let outcome = purchase::purchase_bonus(&mut self.state, flag);
        if outcome.succeeded() {
            let def = flag.def();
            self.outbox.push(SimEvent::BonusPurchased { bonus: flag });
            self.notify(
                NotificationKind::Success,
                "Evolution Unlocked!",
                &format!("{}: {}", def.label, def.description),
                self.config.notifications.evolution_unlocked_ms,
            );
            self.emit_state();
        }
        outcome
    }

    // ── Saves ──────────────────────────────────────────────────

    pub fn save(&mut self, name: Option<&str>) -> SimResult<SlotSummary> {
        let now = self.time.now_ms();
        let mut snapshot = self.state;
        snapshot.settings.stamp_saved(now);
        let slot = self.saves.save(&snapshot, name, now)?;
        self.state.settings.stamp_saved(now);
        self.persist_session(now);
        self.outbox.push(SimEvent::SaveCreated { slot: slot.clone() });
        Ok(slot)
    }

    pub fn quick_save(&mut self) -> SimResult<SlotSummary> {
        let now = self.time.now_ms();
        let mut snapshot = self.state;
        snapshot.settings.stamp_saved(now);
        let slot = self.saves.quick_save(&snapshot, now)?;
        self.state.settings.stamp_saved(now);
        self.persist_session(now);
        self.outbox.push(SimEvent::SaveCreated { slot: slot.clone() });
        Ok(slot)
    }

    /// Replace the live state with a slot's snapshot. On failure the
    /// live state is untouched.
    pub fn load(&mut self, id: &str) -> SimResult<()> {
        let loaded = self.saves.load(id)?;
        let now = self.time.now_ms();
        self.state = loaded;
        if self.run_state == RunState::Running {
            self.last_beat_ms = Some(now);
        }
        self.persist_session(now);
        self.outbox.push(SimEvent::SaveLoaded { id: id.to_string() });
        self.emit_state();
        Ok(())
    }

    pub fn delete(&mut self, id: &str) -> SimResult<()> {
        self.saves.delete(id)?;
        self.outbox.push(SimEvent::SaveDeleted { id: id.to_string() });
        Ok(())
    }

    pub fn rename(&mut self, id: &str, name: &str) -> SimResult<SlotSummary> {
        let slot = self.saves.rename(id, name)?;
        self.outbox.push(SimEvent::SaveRenamed { slot: slot.clone() });
        Ok(slot)
    }

    pub fn export(&self, id: &str) -> SimResult<String> {
        self.saves.export(id)
    }

    pub fn import(&mut self, token: &str, name: Option<&str>) -> SimResult<SlotSummary> {
        let slot = self.saves.import(token, name, self.time.now_ms())?;
        self.outbox.push(SimEvent::SaveImported { slot: slot.clone() });
        Ok(slot)
    }

    pub fn list_slots(&self) -> SimResult<Vec<SlotSummary>> {
        self.saves.list_slots()
    }

    // ── Command dispatch ───────────────────────────────────────

    pub fn dispatch(&mut self, command: PlayerCommand) -> CommandOutcome {
        let name = command.type_name();
        log::debug!("command {name}");
        let result: SimResult<CommandOutcome> = match command {
            PlayerCommand::Start => {
                self.start();
                Ok(CommandOutcome::Done)
            }
            PlayerCommand::Pause => {
                self.pause();
                Ok(CommandOutcome::Done)
            }
            PlayerCommand::Reset => {
                self.reset();
                Ok(CommandOutcome::Done)
            }
            PlayerCommand::SetSpeed { multiplier } => Ok(if self.set_speed(multiplier) {
                CommandOutcome::Done
            } else {
                CommandOutcome::Rejected {
                    reason: format!("speed must be a positive number, got {multiplier}"),
                }
            }),
            PlayerCommand::PurchaseUnit { unit } => Ok(CommandOutcome::Purchase {
                outcome: self.purchase_unit(unit),
            }),
            PlayerCommand::PurchaseBonus { bonus } => Ok(CommandOutcome::Purchase {
                outcome: self.purchase_bonus(bonus),
            }),
            PlayerCommand::Save { name } => self
                .save(name.as_deref())
                .map(|slot| CommandOutcome::Slot { slot }),
            PlayerCommand::QuickSave => self.quick_save().map(|slot| CommandOutcome::Slot { slot }),
            PlayerCommand::Load { id } => self.load(&id).map(|()| CommandOutcome::Done),
            PlayerCommand::Delete { id } => self.delete(&id).map(|()| CommandOutcome::Done),
            PlayerCommand::Rename { id, name } => self
                .rename(&id, &name)
                .map(|slot| CommandOutcome::Slot { slot }),
            PlayerCommand::Export { id } => self.export(&id).map(|token| CommandOutcome::Token { token }),
            PlayerCommand::Import { token, name } => self
                .import(&token, name.as_deref())
                .map(|slot| CommandOutcome::Slot { slot }),
        };

        result.unwrap_or_else(|e| {
            log::error!("command {name} failed: {e}");
            self.notify(
                NotificationKind::Error,
                "Save System",
                &e.to_string(),
                self.config.notifications.default_duration_ms,
            );
            CommandOutcome::Failed { reason: e.to_string() }
        })
    }

    // ── Read side ──────────────────────────────────────────────

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn saves(&self) -> &SaveManager<S> {
        &self.saves
    }

    pub fn notifications(&self) -> &[Notification] {
        self.notifications.active()
    }

    pub fn dismiss_notification(&mut self, id: &str) -> bool {
        self.notifications.dismiss(id)
    }

    /// Take everything emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn unit_cost(&self, kind: UnitKind) -> Cost {
        purchase::next_unit_cost(&self.state, kind)
    }

    pub fn is_unit_unlocked(&self, kind: UnitKind) -> bool {
        purchase::is_unit_unlocked(&self.state, kind)
    }

    pub fn is_bonus_unlocked(&self, flag: BonusFlag) -> bool {
        purchase::is_bonus_unlocked(&self.state, flag)
    }

    /// Current net production per second, speed not applied.
    pub fn production_rates(&self) -> ResourceAmounts {
        tick::production_rates(&self.state.units, &self.state.evolution.bonuses)
    }

    pub fn evolution_rate(&self) -> f64 {
        tick::evolution_rate(self.state.units.total(), self.config.tick.evolution_rate)
    }

    // ── Internals ──────────────────────────────────────────────

    fn persist_session(&mut self, now: TimestampMs) {
        self.state.settings.stamp_saved(now);
        self.last_autosave_ms = now;
        if let Err(e) = self.saves.store_session(&self.state) {
            log::error!("session autosave failed: {e}");
        }
    }

    fn emit_state(&mut self) {
        self.outbox.push(SimEvent::StateChanged {
            resources: self.state.resources,
            units:     self.state.units,
            evolution: self.state.evolution,
        });
    }

    fn notify(&mut self, kind: NotificationKind, title: &str, message: &str, duration: DurationMs) {
        let n = Notification::new(kind, title, message, self.time.now_ms(), duration);
        self.push_notification(n);
    }

    fn push_notification(&mut self, notification: Notification) {
        self.outbox.push(SimEvent::Notified { notification: notification.clone() });
        self.notifications.push(notification);
    }
}
