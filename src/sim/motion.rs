//! Motion integration and wall bounces

use glam::Vec2;

use super::state::{Arena, Entity, EntityStore};

/// Advance every entity by `vel * dt`, then bounce off the walls.
///
/// Returns the number of wall bounces.
pub fn integrate(entities: &mut EntityStore, arena: Arena, dt: f32) -> u32 {
    let mut bounces = 0;
    for e in entities.iter_mut() {
        e.pos += e.vel * dt;
        bounces += contain(e, arena);
    }
    bounces
}

/// Keep `e` inside the arena.
///
/// Each axis is handled independently, so a corner hit flips both components.
/// A component is only flipped while it still points out of the arena, which
/// keeps an entity that was clamped (but already heading back in) from
/// reversing on every frame. Flipping a sign preserves speed.
pub fn contain(e: &mut Entity, arena: Arena) -> u32 {
    let (x, vx) = bounce_axis(e.pos.x, e.vel.x, e.radius, arena.width);
    let (y, vy) = bounce_axis(e.pos.y, e.vel.y, e.radius, arena.height);
    let bounced = u32::from(vx != e.vel.x) + u32::from(vy != e.vel.y);
    e.pos = Vec2::new(x, y);
    e.vel = Vec2::new(vx, vy);
    bounced
}

/// Clamp one coordinate to `[r, extent - r]` and reflect an outward velocity
#[inline]
fn bounce_axis(pos: f32, vel: f32, r: f32, extent: f32) -> (f32, f32) {
    let (lo, hi) = (r, extent - r);
    if pos <= lo {
        (lo, vel.abs())
    } else if pos >= hi {
        (hi, -vel.abs())
    } else {
        (pos, vel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::kind::Kind;
    use proptest::prelude::*;

    fn single(pos: Vec2, vel: Vec2) -> EntityStore {
        EntityStore::from_entities(vec![Entity::new(Kind::Rock, pos, vel, 10.0)])
    }

    #[test]
    fn test_free_motion() {
        let mut store = single(Vec2::new(100.0, 100.0), Vec2::new(60.0, -30.0));
        let bounces = integrate(&mut store, Arena::new(400.0, 300.0), 0.5);
        assert_eq!(bounces, 0);
        let e = store.get(0).unwrap();
        assert_eq!(e.pos, Vec2::new(130.0, 85.0));
    }

    #[test]
    fn test_right_wall_bounce() {
        let mut store = single(Vec2::new(385.0, 100.0), Vec2::new(100.0, 0.0));
        let bounces = integrate(&mut store, Arena::new(400.0, 300.0), 0.1);
        assert_eq!(bounces, 1);
        let e = store.get(0).unwrap();
        assert_eq!(e.pos.x, 390.0);
        assert_eq!(e.vel, Vec2::new(-100.0, 0.0));
    }

    #[test]
    fn test_corner_bounce_flips_both_axes() {
        let mut store = single(Vec2::new(12.0, 12.0), Vec2::new(-50.0, -80.0));
        let bounces = integrate(&mut store, Arena::new(400.0, 300.0), 0.1);
        assert_eq!(bounces, 2);
        let e = store.get(0).unwrap();
        assert_eq!(e.pos, Vec2::new(10.0, 10.0));
        assert_eq!(e.vel, Vec2::new(50.0, 80.0));
    }

    #[test]
    fn test_inbound_entity_on_wall_not_flipped() {
        // Already heading back in: no second flip
        let mut e = Entity::new(Kind::Rock, Vec2::new(10.0, 50.0), Vec2::new(40.0, 0.0), 10.0);
        assert_eq!(contain(&mut e, Arena::new(100.0, 100.0)), 0);
        assert_eq!(e.vel, Vec2::new(40.0, 0.0));
    }

    #[test]
    fn test_resting_entity_stays_put() {
        let mut store = single(Vec2::new(50.0, 60.0), Vec2::ZERO);
        for _ in 0..1000 {
            integrate(&mut store, Arena::new(400.0, 300.0), 1.0 / 120.0);
        }
        assert_eq!(store.get(0).unwrap().pos, Vec2::new(50.0, 60.0));
    }

    proptest! {
        #[test]
        fn prop_stays_in_bounds_and_keeps_speed(
            x in 0.0f32..400.0,
            y in 0.0f32..300.0,
            vx in -2000.0f32..2000.0,
            vy in -2000.0f32..2000.0,
            steps in 1usize..200,
        ) {
            let arena = Arena::new(400.0, 300.0);
            let mut store = single(Vec2::new(x, y), Vec2::new(vx, vy));
            // Start from a legal position
            if let Some(e) = store.get_mut(0) {
                contain(e, arena);
            }
            let speed = store.get(0).unwrap().speed();
            for _ in 0..steps {
                integrate(&mut store, arena, 1.0 / 120.0);
                let e = store.get(0).unwrap();
                prop_assert!(arena.contains_circle(e.pos, e.radius));
                prop_assert!((e.speed() - speed).abs() <= speed * 1e-5 + 1e-3);
            }
        }
    }
}
