//! hive-runner: headless runner for the hive idle simulation.
//!
//! Usage:
//!   hive-runner --ticks 600 --db hive.db
//!   hive-runner --ticks 60 --realtime --interval-ms 1000
//!   hive-runner --db hive.db --ipc-mode

use anyhow::Result;
use hive_core::{
    clock::{ManualTimeSource, RunState, SystemTimeSource, TimeSource},
    command::{CommandOutcome, PlayerCommand},
    config::GameConfig,
    engine::Simulation,
    evolution::BonusFlags,
    notification::Notification,
    record::SlotSummary,
    resource::{ResourceKind, ResourceLedger},
    store::{KvStore, MemoryKv, SqliteKv},
    tick::ResourceAmounts,
    unit::{UnitKind, UnitRoster},
};
use std::env;
use std::io::{self, BufRead, Write};
use std::time::Duration;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Tick { count: u64 },
    Command { command: PlayerCommand },
    Quit,
}

#[derive(serde::Serialize)]
struct UnitView {
    unit:     UnitKind,
    owned:    u32,
    unlocked: bool,
    cost:     Vec<(ResourceKind, u64)>,
}

#[derive(serde::Serialize)]
struct UiState {
    run_state:         RunState,
    game_speed:        f64,
    total_playtime_ms: u64,
    resources:         ResourceLedger,
    rates:             ResourceAmounts,
    units:             UnitRoster,
    unit_shop:         Vec<UnitView>,
    evolution_points:  f64,
    evolution_rate:    f64,
    bonuses:           BonusFlags,
    notifications:     Vec<Notification>,
    slots:             Vec<SlotSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_outcome:      Option<CommandOutcome>,
}

/// How the runner spaces beats: sleeping on the wall clock, or stepping a
/// manual clock forward.
struct Cadence {
    interval: u64,
    manual:   Option<ManualTimeSource>,
}

impl Cadence {
    fn wait(&self) {
        match &self.manual {
            Some(clock) => clock.advance(self.interval),
            None => std::thread::sleep(Duration::from_millis(self.interval)),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ticks = parse_arg(&args, "--ticks", 60u64);
    let realtime = args.iter().any(|a| a == "--realtime");
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = string_arg(&args, "--db");
    let config = match string_arg(&args, "--config") {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let interval = parse_arg(&args, "--interval-ms", config.tick.interval_ms);

    if !ipc_mode {
        println!("Hive Mind: hive-runner");
        println!("  ticks:     {ticks}");
        println!("  interval:  {interval}ms");
        println!("  realtime:  {realtime}");
        println!("  db:        {}", db.unwrap_or("(memory)"));
        println!();
    }

    let (time, manual): (Box<dyn TimeSource>, Option<ManualTimeSource>) = if realtime {
        (Box::new(SystemTimeSource), None)
    } else {
        let clock = ManualTimeSource::new(SystemTimeSource.now_ms());
        (Box::new(clock.clone()), Some(clock))
    };
    let cadence = Cadence { interval, manual };
    let capacity = config.saves.storage_capacity_bytes;

    match db {
        Some(path) => run(Simulation::new(config, SqliteKv::open(path, capacity)?, time), &cadence, ticks, ipc_mode),
        None => run(Simulation::new(config, MemoryKv::new(capacity), time), &cadence, ticks, ipc_mode),
    }
}

fn run<S: KvStore>(mut sim: Simulation<S>, cadence: &Cadence, ticks: u64, ipc_mode: bool) -> Result<()> {
    if let Some(report) = sim.boot() {
        log::info!("offline catch-up credited {:.2}h", report.hours);
    }
    if ipc_mode {
        run_ipc_loop(&mut sim, cadence)
    } else {
        run_beats(&mut sim, cadence, ticks);
        // Leave a slot behind so a file-backed run can be inspected.
        if let CommandOutcome::Failed { reason } = sim.dispatch(PlayerCommand::QuickSave) {
            log::warn!("final quick save failed: {reason}");
        }
        print_summary(&sim, ticks)
    }
}

fn run_beats<S: KvStore>(sim: &mut Simulation<S>, cadence: &Cadence, count: u64) {
    for _ in 0..count {
        cadence.wait();
        sim.advance();
    }
    sim.drain_events();
}

fn run_ipc_loop<S: KvStore>(sim: &mut Simulation<S>, cadence: &Cadence) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        let outcome = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => None,
            IpcCommand::Tick { count } => {
                run_beats(sim, cadence, count);
                None
            }
            IpcCommand::Command { command } => {
                let outcome = sim.dispatch(command);
                sim.drain_events();
                Some(outcome)
            }
        };
        let state = build_ui_state(sim, outcome)?;
        writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn build_ui_state<S: KvStore>(sim: &Simulation<S>, last_outcome: Option<CommandOutcome>) -> Result<UiState> {
    let state = sim.state();
    let unit_shop = UnitKind::ALL
        .into_iter()
        .map(|unit| UnitView {
            unit,
            owned:    state.units.count(unit),
            unlocked: sim.is_unit_unlocked(unit),
            cost:     sim.unit_cost(unit).entries().to_vec(),
        })
        .collect();

    Ok(UiState {
        run_state:         sim.run_state(),
        game_speed:        state.settings.game_speed,
        total_playtime_ms: state.settings.total_playtime_ms,
        resources:         state.resources,
        rates:             sim.production_rates(),
        units:             state.units,
        unit_shop,
        evolution_points:  state.evolution.points,
        evolution_rate:    sim.evolution_rate(),
        bonuses:           state.evolution.bonuses,
        notifications:     sim.notifications().to_vec(),
        slots:             sim.list_slots()?,
        last_outcome,
    })
}

fn print_summary<S: KvStore>(sim: &Simulation<S>, ticks: u64) -> Result<()> {
    let state = sim.state();
    let usage = sim.saves().storage_usage()?;

    println!("=== RUN SUMMARY ===");
    println!("  beats run:      {ticks}");
    println!("  playtime:       {:.1}s", state.settings.total_playtime_ms as f64 / 1000.0);
    for kind in ResourceKind::ALL {
        println!("  {:<15} {:.1}", format!("{}:", kind.name()), state.resources.get(kind));
    }
    for unit in UnitKind::ALL {
        println!("  {:<15} {}", format!("{}:", unit.key()), state.units.count(unit));
    }
    println!("  evolution:      {:.2} pts (level {})", state.evolution.points, state.evolution.level());
    let owned: Vec<_> = state.evolution.bonuses.owned().map(|b| b.key()).collect();
    println!("  bonuses:        {}", if owned.is_empty() { "(none)".to_string() } else { owned.join(", ") });

    println!();
    println!("=== SAVE SLOTS ===");
    let slots = sim.list_slots()?;
    if slots.is_empty() {
        println!("  (No saves yet)");
    } else {
        for slot in &slots {
            println!("  {} | {} | v{}", slot.id, slot.name, slot.format_version);
        }
    }
    println!("  storage:        {} / {} bytes ({:.1}%)", usage.used, usage.available, usage.percentage);
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
