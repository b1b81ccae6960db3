//! Ellipse Racer headless runner
//!
//! Runs races back to back with the autopilot driving, restarting through an
//! explicit loop that rebuilds the race state.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};

use ellipse_racer::consts::SIM_DT;
use ellipse_racer::input::InputState;
use ellipse_racer::sim::{RaceEvent, RaceMode, RacePhase, RaceState, TickOutcome, tick};
use ellipse_racer::{RaceError, RaceStats, Tuning};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliMode {
    Circuit,
    Lanes,
}

impl From<CliMode> for RaceMode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Circuit => RaceMode::Circuit,
            CliMode::Lanes => RaceMode::Lanes,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Top-down racing on elliptical and lane tracks", long_about = None)]
struct Args {
    #[arg(long, value_enum, default_value_t = CliMode::Circuit)]
    mode: CliMode,

    /// Seed of the first race; each restart uses the next one
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Number of races to run
    #[arg(long, default_value_t = 1)]
    races: u32,

    /// Give up on a race after this many ticks
    #[arg(long, default_value_t = 20_000)]
    max_ticks: u64,

    /// JSON file overriding the default tuning
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// JSON stats ledger updated after every race
    #[arg(long)]
    stats: Option<PathBuf>,

    /// Pace ticks to wall-clock time
    #[arg(long)]
    realtime: bool,

    /// Print the final race snapshot as JSON
    #[arg(long)]
    snapshot: bool,
}

fn run(args: &Args) -> Result<(), RaceError> {
    let tuning = match &args.tuning {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    let mode = RaceMode::from(args.mode);
    let mut stats = args.stats.as_deref().map(RaceStats::load).unwrap_or_default();

    let mut seed = args.seed;
    let mut state = RaceState::new(mode, tuning.clone(), seed)?;
    let mut input = InputState::new(state.players().count());
    input.autopilot = true;
    let mut finished = 0;
    let frame = Duration::from_secs_f32(SIM_DT);

    loop {
        let frame_start = Instant::now();
        let mut tick_input = input.next_tick(&tuning);
        match state.phase {
            RacePhase::AwaitingRestart(_) if finished < args.races => tick_input.restart = true,
            RacePhase::AwaitingRestart(_) => tick_input.quit = true,
            RacePhase::Racing if state.time_ticks >= args.max_ticks => {
                log::warn!("Race {} hit the {} tick cap", finished + 1, args.max_ticks);
                tick_input.quit = true;
            }
            _ => {}
        }

        match tick(&mut state, &tick_input, SIM_DT) {
            TickOutcome::Continue => {}
            TickOutcome::Restart => {
                seed = seed.wrapping_add(1);
                state = RaceState::new(mode, tuning.clone(), seed)?;
                continue;
            }
            TickOutcome::Quit => break,
        }

        for event in state.drain_events() {
            let RaceEvent::RaceEnded(record) = event else {
                continue;
            };
            finished += 1;
            let best = stats.record(&record);
            println!(
                "race {:>3}  seed {:<6} {:>7.2}s  laps {}  {:?}{}",
                finished,
                seed,
                record.elapsed_time,
                record.lap_count,
                record.outcome,
                if best { "  (best time)" } else { "" }
            );
            if let Some(path) = &args.stats {
                save_stats(&stats, path);
            }
        }

        if args.realtime {
            if let Some(rest) = frame.checked_sub(frame_start.elapsed()) {
                thread::sleep(rest);
            }
        }
    }

    if args.snapshot {
        match serde_json::to_string_pretty(&state.snapshot()) {
            Ok(json) => println!("{json}"),
            Err(err) => log::error!("Unable to serialize snapshot: {err}"),
        }
    }
    println!(
        "{} races, {} wins, {} losses, best time {}",
        stats.races,
        stats.victories,
        stats.defeats,
        stats
            .best_time
            .map_or_else(|| "-".to_string(), |t| format!("{t:.2}s"))
    );
    Ok(())
}

/// Persistence failures never stop the runner
fn save_stats(stats: &RaceStats, path: &Path) {
    if let Err(err) = stats.save(path) {
        log::warn!("{err}");
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    log::info!("Ellipse Racer starting: {:?}", args);

    if let Err(err) = run(&args) {
        log::error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
