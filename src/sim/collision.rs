//! Circle-circle collision detection and response
//!
//! Detection runs the uniform-grid broad phase, confirms true overlap, and
//! emits each overlapping pair once under its `(low id, high id)` key.
//! Resolution walks the pairs in ascending key order, so an entity touched by
//! several pairs in one tick sees the updates of earlier pairs (including a
//! morph) before later ones are applied.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::kind::{Kind, encounter};
use super::spatial::SpatialGrid;
use super::state::{Entity, EntityStore};

/// Two entities whose circles overlap this tick. Always `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollisionPair {
    pub a: u32,
    pub b: u32,
}

impl CollisionPair {
    /// Pair key with the ids in ascending order
    pub fn new(x: u32, y: u32) -> Self {
        Self {
            a: x.min(y),
            b: x.max(y),
        }
    }
}

/// Fill `out` with every overlapping pair, sorted by key, without duplicates.
///
/// `grid` must have been rebuilt for the current positions.
pub fn detect_collisions(entities: &EntityStore, grid: &SpatialGrid, out: &mut Vec<CollisionPair>) {
    out.clear();
    for a in entities {
        for id in grid.neighbors(a.id) {
            if id <= a.id {
                continue;
            }
            let Some(b) = entities.get(id) else {
                continue;
            };
            if a.overlaps(b) {
                out.push(CollisionPair::new(a.id, b.id));
            }
        }
    }
    out.sort_unstable();
    out.dedup();
}

/// Collision response tuning
#[derive(Debug, Clone, Copy)]
pub struct ResponseParams {
    /// Separation overshoot (>= 1)
    pub separation_bias: f32,
    /// Speed floor applied after a bounce, 0 disables
    pub min_speed: f32,
}

impl Default for ResponseParams {
    fn default() -> Self {
        Self {
            separation_bias: crate::consts::SEPARATION_BIAS,
            min_speed: 0.0,
        }
    }
}

/// A type change caused by one collision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Morph {
    pub id: u32,
    pub from: Kind,
    pub to: Kind,
}

/// Separate, bounce and apply the morph rule to one pair.
///
/// Uses the entities' current state, so earlier pairs in the same tick are
/// already reflected. Returns the morph if the pair's kinds differed.
pub fn resolve_pair(
    entities: &mut EntityStore,
    pair: CollisionPair,
    params: &ResponseParams,
    rng: &mut impl Rng,
) -> Option<Morph> {
    let (a, b) = entities.pair_mut(pair.a, pair.b)?;

    let delta = b.pos - a.pos;
    let dist = delta.length();
    let reach = a.radius + b.radius;
    // Coincident centers: any normal will do, keep it deterministic
    let normal = if dist > f32::EPSILON { delta / dist } else { Vec2::X };

    separate(a, b, normal, reach - dist, params.separation_bias);
    exchange_normal_velocity(a, b, normal);

    if params.min_speed > 0.0 {
        enforce_min_speed(a, params.min_speed, rng);
        enforce_min_speed(b, params.min_speed, rng);
    }

    apply_morph(a, b)
}

/// Push the pair apart along `normal` by the penetration depth.
///
/// Masses are equal, so each side moves half the distance.
fn separate(a: &mut Entity, b: &mut Entity, normal: Vec2, penetration: f32, bias: f32) {
    if penetration <= 0.0 {
        return;
    }
    let push = normal * (0.5 * penetration * bias);
    a.pos -= push;
    b.pos += push;
}

/// Equal-mass elastic collision: swap the normal components, keep tangential.
///
/// Skipped when the pair is already separating along the normal.
fn exchange_normal_velocity(a: &mut Entity, b: &mut Entity, normal: Vec2) {
    let va_n = a.vel.dot(normal);
    let vb_n = b.vel.dot(normal);
    if vb_n - va_n >= 0.0 {
        return;
    }
    a.vel += (vb_n - va_n) * normal;
    b.vel += (va_n - vb_n) * normal;
}

/// Rescale a slow entity up to `min_speed`; a resting one gets a random heading
fn enforce_min_speed(e: &mut Entity, min_speed: f32, rng: &mut impl Rng) {
    let speed = e.vel.length();
    if speed >= min_speed {
        return;
    }
    e.vel = if speed < 1e-6 {
        Vec2::from_angle(rng.random_range(0.0..std::f32::consts::TAU)) * min_speed
    } else {
        e.vel * (min_speed / speed)
    };
}

/// Convert the loser to the winner's kind. Same kinds leave both untouched.
fn apply_morph(a: &mut Entity, b: &mut Entity) -> Option<Morph> {
    let winner = encounter(a.kind, b.kind)?;
    let loser = if a.kind == winner { b } else { a };
    let morph = Morph {
        id: loser.id,
        from: loser.kind,
        to: winner,
    };
    loser.kind = winner;
    Some(morph)
}
