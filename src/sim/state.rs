//! Simulation state and the entity store
//!
//! `SimulationState` is an explicit value owned by the caller. Every operation
//! takes it by reference, so independent simulations can run side by side.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::CollisionPair;
use super::kind::Kind;
use super::score::{ScoreBoard, WinTally};
use super::spatial::SpatialGrid;
use crate::config::SimConfig;
use crate::consts::*;
use crate::error::{Result, SimError};

/// A simulated circular body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Equal to the entity's index in the store
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Constant for the entity's life
    pub radius: f32,
    pub kind: Kind,
}

impl Entity {
    /// New entity; the id is assigned when it enters a store
    pub fn new(kind: Kind, pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            id: 0,
            pos,
            vel,
            radius,
            kind,
        }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// True when the two circles strictly overlap
    #[inline]
    pub fn overlaps(&self, other: &Entity) -> bool {
        let reach = self.radius + other.radius;
        self.pos.distance_squared(other.pos) < reach * reach
    }
}

/// The bounded region `[0, width] x [0, height]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// True when the whole circle lies inside the arena
    pub fn contains_circle(&self, pos: Vec2, radius: f32) -> bool {
        pos.x - radius >= 0.0
            && pos.y - radius >= 0.0
            && pos.x + radius <= self.width
            && pos.y + radius <= self.height
    }

    /// True when the point lies inside the arena
    pub fn contains_point(&self, pos: Vec2) -> bool {
        (0.0..=self.width).contains(&pos.x) && (0.0..=self.height).contains(&pos.y)
    }

    /// Uniform random center for a circle, keeping `padding` clear of the walls
    /// when there is room for it
    pub fn random_center(&self, radius: f32, padding: f32, rng: &mut impl Rng) -> Vec2 {
        let inset = |extent: f32| {
            if extent >= 2.0 * (radius + padding) {
                radius + padding
            } else {
                radius
            }
        };
        let (ix, iy) = (inset(self.width), inset(self.height));
        Vec2::new(
            rng.random_range(ix..=self.width - ix),
            rng.random_range(iy..=self.height - iy),
        )
    }
}

/// Authoritative storage for every entity, indexed by id
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    entities: Vec<Entity>,
}

impl EntityStore {
    /// Populate `config.entity_count` entities with random placement.
    ///
    /// Kinds are dealt round-robin so counts differ by at most one. Each entity
    /// gets a bounded number of placement attempts; if all collide with an
    /// already placed entity the last candidate is kept and the resolver
    /// separates the pair over the next few ticks.
    pub fn create(config: &SimConfig, rng: &mut Pcg32) -> Self {
        let arena = Arena::new(config.arena_width, config.arena_height);
        let radius = config.radius;
        let mut entities: Vec<Entity> = Vec::with_capacity(config.entity_count);
        let mut forced = 0u32;

        for i in 0..config.entity_count {
            let kind = Kind::ALL[i % Kind::ALL.len()];

            let mut pos = arena.random_center(radius, SPAWN_PADDING, rng);
            let mut attempts = 1;
            while entities
                .iter()
                .any(|e| e.pos.distance_squared(pos) < (e.radius + radius).powi(2))
            {
                if attempts >= MAX_PLACEMENT_ATTEMPTS {
                    forced += 1;
                    break;
                }
                pos = arena.random_center(radius, SPAWN_PADDING, rng);
                attempts += 1;
            }

            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let speed = rng.random_range(config.speed_min..=config.speed_max);
            let vel = Vec2::from_angle(angle) * speed;

            entities.push(Entity {
                id: i as u32,
                pos,
                vel,
                radius,
                kind,
            });
        }

        if forced > 0 {
            log::debug!(
                "{} of {} entities placed overlapping after {} attempts",
                forced,
                config.entity_count,
                MAX_PLACEMENT_ATTEMPTS
            );
        }

        Self { entities }
    }

    /// Store holding exactly `entities`, ids reassigned to their index
    pub fn from_entities(mut entities: Vec<Entity>) -> Self {
        for (i, e) in entities.iter_mut().enumerate() {
            e.id = i as u32;
        }
        Self { entities }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Entity> {
        self.entities.get(id as usize)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Entity> {
        self.entities.get_mut(id as usize)
    }

    /// Mutable access to two distinct entities at once
    pub fn pair_mut(&mut self, a: u32, b: u32) -> Option<(&mut Entity, &mut Entity)> {
        let (a, b) = (a as usize, b as usize);
        if a == b || a.max(b) >= self.entities.len() {
            return None;
        }
        if a < b {
            let (lo, hi) = self.entities.split_at_mut(b);
            Some((&mut lo[a], &mut hi[0]))
        } else {
            let (lo, hi) = self.entities.split_at_mut(a);
            Some((&mut hi[0], &mut lo[b]))
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Entity> {
        self.entities.iter_mut()
    }

    pub fn as_slice(&self) -> &[Entity] {
        &self.entities
    }

    /// Largest radius in the store (0 when empty)
    pub fn max_radius(&self) -> f32 {
        self.entities.iter().map(|e| e.radius).fold(0.0, f32::max)
    }
}

impl<'a> IntoIterator for &'a EntityStore {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}

/// Whether ticks are currently being applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    Running,
    /// `tick` is a no-op until resumed
    Paused,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Configuration the current round was built from
    pub config: SimConfig,
    /// Seed actually used (drawn when the config has none)
    pub seed: u64,
    pub arena: Arena,
    pub entities: EntityStore,
    pub phase: SimPhase,
    /// Ticks advanced since the last reset
    pub time_ticks: u64,
    /// Per-kind counts as of the last tick
    pub scoreboard: ScoreBoard,
    /// Rounds won per kind across resets
    pub wins: WinTally,
    /// Whether the current round's winner has been credited
    pub(crate) round_credited: bool,
    pub(crate) rng: Pcg32,
    pub(crate) grid: SpatialGrid,
    /// Scratch buffer reused across ticks
    pub(crate) pairs: Vec<CollisionPair>,
}

impl SimulationState {
    /// Validate `config` and build a fresh round
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = Pcg32::seed_from_u64(seed);
        let entities = EntityStore::create(&config, &mut rng);
        Ok(Self::assemble(config, seed, rng, entities))
    }

    /// Build a state around caller-placed entities.
    ///
    /// `config.entity_count` and `config.radius` are ignored; each entity keeps
    /// its own radius. Entities must have a positive radius and fit inside the
    /// arena.
    pub fn from_entities(config: SimConfig, entities: Vec<Entity>) -> Result<Self> {
        if entities.is_empty() {
            return Err(SimError::invalid("entity list is empty"));
        }
        let max_radius = entities.iter().map(|e| e.radius).fold(0.0, f32::max);
        let config = SimConfig {
            entity_count: entities.len(),
            radius: max_radius,
            ..config
        };
        config.validate()?;

        let arena = Arena::new(config.arena_width, config.arena_height);
        for (i, e) in entities.iter().enumerate() {
            if !e.radius.is_finite() || e.radius <= 0.0 {
                return Err(SimError::invalid(format!("entity {i} has radius {}", e.radius)));
            }
            if !e.pos.is_finite() || !e.vel.is_finite() || !arena.contains_circle(e.pos, e.radius) {
                return Err(SimError::invalid(format!(
                    "entity {i} at {} does not fit in the arena",
                    e.pos
                )));
            }
        }

        let seed = config.seed.unwrap_or_else(rand::random);
        let rng = Pcg32::seed_from_u64(seed);
        Ok(Self::assemble(config, seed, rng, EntityStore::from_entities(entities)))
    }

    fn assemble(config: SimConfig, seed: u64, rng: Pcg32, entities: EntityStore) -> Self {
        let arena = Arena::new(config.arena_width, config.arena_height);
        let cell_size = config
            .effective_cell_size()
            .max(2.0 * entities.max_radius());
        let grid = SpatialGrid::new(arena, cell_size);
        let scoreboard = ScoreBoard::from_entities(entities.iter());
        log::info!(
            "Round ready: {} entities (r={}, arena={}x{}, seed={}) {}",
            entities.len(),
            config.radius,
            arena.width,
            arena.height,
            seed,
            scoreboard
        );
        let pairs = Vec::with_capacity(entities.len());
        Self {
            config,
            seed,
            arena,
            entities,
            phase: SimPhase::Running,
            time_ticks: 0,
            scoreboard,
            wins: WinTally::default(),
            round_credited: false,
            rng,
            grid,
            pairs,
        }
    }

    /// Discard all entities and regenerate, optionally with a new count/radius.
    ///
    /// On error the state is left untouched. The win tally survives; the RNG
    /// continues from its current position so successive rounds differ.
    pub fn reset(&mut self, entity_count: Option<usize>, radius: Option<f32>) -> Result<()> {
        let config = SimConfig {
            entity_count: entity_count.unwrap_or(self.config.entity_count),
            radius: radius.unwrap_or(self.config.radius),
            ..self.config.clone()
        };
        config.validate()?;

        let entities = EntityStore::create(&config, &mut self.rng);
        let rng = self.rng.clone();
        let wins = self.wins.clone();
        let seed = self.seed;
        *self = Self::assemble(config, seed, rng, entities);
        self.wins = wins;
        Ok(())
    }

    pub fn is_paused(&self) -> bool {
        self.phase == SimPhase::Paused
    }

    pub fn pause(&mut self) {
        self.phase = SimPhase::Paused;
    }

    pub fn resume(&mut self) {
        self.phase = SimPhase::Running;
    }

    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            SimPhase::Running => SimPhase::Paused,
            SimPhase::Paused => SimPhase::Running,
        };
    }

    /// Surviving kind once every entity shares it
    pub fn winner(&self) -> Option<Kind> {
        self.scoreboard.winner()
    }

    /// Collision pairs found on the last tick, in resolution order
    pub fn last_pairs(&self) -> &[CollisionPair] {
        &self.pairs
    }

    /// Broad-phase grid as of the last rebuild
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }
}
