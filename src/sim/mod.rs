//! Deterministic simulation module
//!
//! All arena logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod kind;
pub mod motion;
pub mod runner;
pub mod score;
pub mod spatial;
pub mod state;
pub mod tick;

pub use collision::{CollisionPair, Morph, ResponseParams, detect_collisions, resolve_pair};
pub use kind::{Kind, encounter};
pub use runner::{FixedStepRunner, FrameReport};
pub use score::{ScoreBoard, WinTally};
pub use spatial::SpatialGrid;
pub use state::{Arena, Entity, EntityStore, SimPhase, SimulationState};
pub use tick::{
    Command, EntityView, TickStats, apply, initialize, is_finished, reset, scoreboard, snapshot,
    tick,
};
