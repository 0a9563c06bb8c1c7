//! RPS Arena - Rock/Paper/Scissors physics simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, broad/narrow phase, morphs, scoring)
//! - `config`: Data-driven simulation parameters
//! - `error`: Configuration errors

pub mod config;
pub mod error;
pub mod sim;

pub use config::SimConfig;
pub use error::{Result, SimError};

/// Simulation constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz, matches the original frame cap)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the runner will try to catch up on (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Default arena (the original's 1000x700 window minus panel and margins)
    pub const ARENA_WIDTH: f32 = 700.0;
    pub const ARENA_HEIGHT: f32 = 620.0;

    /// Initial speed range (px/s)
    pub const SPEED_MIN: f32 = 120.0;
    pub const SPEED_MAX: f32 = 220.0;
    /// Post-collision speed floor so entities never stall
    pub const MIN_SPEED: f32 = 60.0;
    /// Separation overshoot to prevent re-sticking
    pub const SEPARATION_BIAS: f32 = 1.02;
    /// Broad-phase cell size as a multiple of entity diameter
    pub const CELL_SIZE_FACTOR: f32 = 1.2;

    /// Random placement attempts per entity before overlap is accepted
    pub const MAX_PLACEMENT_ATTEMPTS: u32 = 32;
    /// Gap kept between spawned entities and the arena walls
    pub const SPAWN_PADDING: f32 = 6.0;

    /// Collision radius as a fraction of the icon side
    pub const ICON_RADIUS_FACTOR: f32 = 0.45;
}
