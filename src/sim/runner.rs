//! Fixed-step driver for a variable frame clock
//!
//! The presentation layer reports how much real time passed since the last
//! frame; the runner converts that into whole `SIM_DT` ticks.

use super::state::SimulationState;
use super::tick::{TickStats, tick};
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

#[derive(Debug, Clone)]
pub struct FixedStepRunner {
    accumulator: f32,
    /// Stop requesting ticks once a single kind remains
    pub halt_on_finish: bool,
}

impl Default for FixedStepRunner {
    fn default() -> Self {
        Self {
            accumulator: 0.0,
            halt_on_finish: true,
        }
    }
}

impl FixedStepRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the ticks owed for a frame of `frame_dt` seconds.
    ///
    /// Long frames are clamped and at most `MAX_SUBSTEPS` ticks run per call,
    /// so a stall never snowballs into an ever longer catch-up.
    pub fn advance(&mut self, state: &mut SimulationState, frame_dt: f32) -> FrameReport {
        let mut report = FrameReport::default();
        if state.is_paused() || (self.halt_on_finish && state.winner().is_some()) {
            self.accumulator = 0.0;
            return report;
        }

        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);
        while self.accumulator >= SIM_DT && report.ticks < MAX_SUBSTEPS {
            let stats = tick(state, SIM_DT);
            self.accumulator -= SIM_DT;
            report.ticks += 1;
            report.stats.collisions += stats.collisions;
            report.stats.morphs += stats.morphs;
            report.stats.wall_bounces += stats.wall_bounces;

            if self.halt_on_finish && state.winner().is_some() {
                self.accumulator = 0.0;
                break;
            }
        }
        if report.ticks == MAX_SUBSTEPS {
            // Drop the backlog the substep cap could not consume
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        report
    }

    /// Leftover time not yet consumed by a tick
    pub fn pending(&self) -> f32 {
        self.accumulator
    }
}

/// Ticks run during one frame and their summed statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub ticks: u32,
    pub stats: TickStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tick::initialize;

    #[test]
    fn test_accumulates_partial_frames() {
        let mut state = initialize(9, 10.0, (400.0, 300.0), Some(1)).unwrap();
        let mut runner = FixedStepRunner::new();

        assert_eq!(runner.advance(&mut state, SIM_DT * 0.6).ticks, 0);
        assert_eq!(runner.advance(&mut state, SIM_DT * 0.6).ticks, 1);
        assert!(runner.pending() < SIM_DT);
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_long_frame_capped() {
        let mut state = initialize(9, 10.0, (400.0, 300.0), Some(1)).unwrap();
        let mut runner = FixedStepRunner::new();
        let report = runner.advance(&mut state, 5.0);
        assert_eq!(report.ticks, MAX_SUBSTEPS);
    }

    #[test]
    fn test_slow_frames_do_not_build_backlog() {
        let mut state = initialize(9, 10.0, (400.0, 300.0), Some(1)).unwrap();
        let mut runner = FixedStepRunner {
            halt_on_finish: false,
            ..Default::default()
        };
        for _ in 0..100 {
            assert_eq!(runner.advance(&mut state, MAX_FRAME_DT).ticks, MAX_SUBSTEPS);
            assert!(runner.pending() <= SIM_DT);
        }
        assert_eq!(state.time_ticks, 100 * u64::from(MAX_SUBSTEPS));
    }

    #[test]
    fn test_paused_runs_nothing() {
        let mut state = initialize(9, 10.0, (400.0, 300.0), Some(1)).unwrap();
        state.pause();
        let mut runner = FixedStepRunner::new();
        assert_eq!(runner.advance(&mut state, 0.05).ticks, 0);
        assert_eq!(runner.pending(), 0.0);
    }

    #[test]
    fn test_halts_once_finished() {
        // A single entity is already a winner
        let mut state = initialize(1, 10.0, (400.0, 300.0), Some(1)).unwrap();
        let mut runner = FixedStepRunner::new();
        assert_eq!(runner.advance(&mut state, 0.05).ticks, 0);

        runner.halt_on_finish = false;
        assert!(runner.advance(&mut state, 0.05).ticks > 0);
    }
}
