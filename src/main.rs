//! RPS Arena headless runner
//!
//! Usage: `rps-arena [config.json]`
//!
//! Runs one round at the fixed timestep until a single kind remains (or the
//! tick limit is hit) and prints the result as JSON.

use rps_arena::SimConfig;
use rps_arena::consts::SIM_DT;
use rps_arena::sim::{Kind, ScoreBoard, SimulationState, scoreboard, tick};
use serde::Serialize;

/// Ten simulated minutes
const MAX_HEADLESS_TICKS: u64 = 10 * 60 * 120;
/// Progress log interval (five simulated seconds)
const LOG_EVERY_TICKS: u64 = 5 * 120;

#[derive(Debug, Serialize)]
struct RoundReport {
    seed: u64,
    entities: usize,
    ticks: u64,
    collisions: u64,
    morphs: u64,
    scoreboard: ScoreBoard,
    winner: Option<Kind>,
}

fn run() -> rps_arena::Result<RoundReport> {
    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::for_per_type(10),
    };
    let mut state = SimulationState::new(config)?;

    let (mut collisions, mut morphs) = (0u64, 0u64);
    while state.winner().is_none() && state.time_ticks < MAX_HEADLESS_TICKS {
        let stats = tick(&mut state, SIM_DT);
        collisions += u64::from(stats.collisions);
        morphs += u64::from(stats.morphs);
        if state.time_ticks % LOG_EVERY_TICKS == 0 {
            log::info!("t={:.1}s {}", state.time_ticks as f32 * SIM_DT, state.scoreboard);
        }
    }

    if state.winner().is_none() {
        log::warn!("No winner after {} ticks", state.time_ticks);
    }

    Ok(RoundReport {
        seed: state.seed,
        entities: state.entities.len(),
        ticks: state.time_ticks,
        collisions,
        morphs,
        scoreboard: scoreboard(&state),
        winner: state.winner(),
    })
}

fn main() {
    env_logger::init();
    log::info!("RPS Arena (headless) starting...");

    match run().and_then(|report| Ok(serde_json::to_string_pretty(&report)?)) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
