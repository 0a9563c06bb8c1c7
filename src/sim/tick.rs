//! Simulation tick and the control surface used by the presentation layer
//!
//! One tick runs, strictly in order: motion integration, grid rebuild,
//! collision detection, pair resolution (ascending pair key), containment,
//! then scoring and win detection.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{ResponseParams, detect_collisions, resolve_pair};
use super::kind::Kind;
use super::motion;
use super::score::ScoreBoard;
use super::state::SimulationState;
use crate::config::SimConfig;
use crate::error::Result;

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickStats {
    /// Overlapping pairs resolved
    pub collisions: u32,
    /// Entities that changed kind
    pub morphs: u32,
    /// Per-axis wall reflections
    pub wall_bounces: u32,
}

/// Read-only view of one entity for rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: u32,
    pub position: Vec2,
    pub kind: Kind,
    pub radius: f32,
}

/// Commands the presentation layer may send between ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Pause,
    Resume,
    TogglePause,
    /// New round, optionally resized. Keeps the win tally.
    Reset {
        entity_count: Option<usize>,
        radius: Option<f32>,
    },
    /// New round and a cleared win tally
    Restart {
        entity_count: Option<usize>,
        radius: Option<f32>,
    },
}

/// Build a simulation with `entity_count` entities of radius `radius`.
///
/// Other tuning comes from `SimConfig::default()`.
pub fn initialize(
    entity_count: usize,
    radius: f32,
    arena_size: (f32, f32),
    seed: Option<u64>,
) -> Result<SimulationState> {
    SimulationState::new(SimConfig {
        entity_count,
        radius,
        arena_width: arena_size.0,
        arena_height: arena_size.1,
        seed,
        ..SimConfig::default()
    })
}

/// Advance the simulation by `dt` seconds.
///
/// Paused states are left untouched. A finished simulation keeps advancing if
/// asked; stopping is the caller's call.
pub fn tick(state: &mut SimulationState, dt: f32) -> TickStats {
    if state.is_paused() {
        return TickStats::default();
    }
    if !dt.is_finite() || dt < 0.0 {
        log::warn!("Ignoring tick with dt={}", dt);
        return TickStats::default();
    }

    state.time_ticks += 1;
    let mut stats = TickStats {
        wall_bounces: motion::integrate(&mut state.entities, state.arena, dt),
        ..Default::default()
    };

    state.grid.rebuild(&state.entities);
    detect_collisions(&state.entities, &state.grid, &mut state.pairs);

    let params = ResponseParams {
        separation_bias: state.config.separation_bias,
        min_speed: state.config.min_speed,
    };
    for &pair in &state.pairs {
        stats.collisions += 1;
        if let Some(morph) = resolve_pair(&mut state.entities, pair, &params, &mut state.rng) {
            log::trace!("{} -> {} (entity {})", morph.from, morph.to, morph.id);
            stats.morphs += 1;
        }
    }

    // Separation may have pushed entities past a wall
    if !state.pairs.is_empty() {
        for e in state.entities.iter_mut() {
            stats.wall_bounces += motion::contain(e, state.arena);
        }
    }

    state.scoreboard = ScoreBoard::from_entities(&state.entities);
    if let Some(winner) = state.scoreboard.winner() {
        if !state.round_credited {
            state.round_credited = true;
            state.wins.add_win(winner);
            log::info!("{} wins after {} ticks", winner, state.time_ticks);
        }
    }

    stats
}

/// Entity views in id order
pub fn snapshot(state: &SimulationState) -> Vec<EntityView> {
    state
        .entities
        .iter()
        .map(|e| EntityView {
            id: e.id,
            position: e.pos,
            kind: e.kind,
            radius: e.radius,
        })
        .collect()
}

/// Per-kind counts as of the last tick
pub fn scoreboard(state: &SimulationState) -> ScoreBoard {
    state.scoreboard
}

/// The winning kind once all entities share one
pub fn is_finished(state: &SimulationState) -> Option<Kind> {
    state.winner()
}

/// Regenerate the population. On error the state is unchanged.
pub fn reset(
    state: &mut SimulationState,
    entity_count: Option<usize>,
    radius: Option<f32>,
) -> Result<()> {
    state.reset(entity_count, radius)
}

/// Apply a control command
pub fn apply(state: &mut SimulationState, command: Command) -> Result<()> {
    match command {
        Command::Pause => state.pause(),
        Command::Resume => state.resume(),
        Command::TogglePause => state.toggle_pause(),
        Command::Reset {
            entity_count,
            radius,
        } => state.reset(entity_count, radius)?,
        Command::Restart {
            entity_count,
            radius,
        } => {
            state.reset(entity_count, radius)?;
            state.wins.reset();
        }
    }
    Ok(())
}
