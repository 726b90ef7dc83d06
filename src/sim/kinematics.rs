//! Per-tick motion: Euler integration, drag, gravity and wall bounces
//!
//! Units are pixels and ticks. Reflection flips the velocity component only;
//! position is never clamped back inside the field.

use super::registry::Registry;
use super::state::{Entity, Field};
use crate::consts::{DRAG, GRAVITY};

/// How an entity moves between ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// Drag then gravity after integration (bullets)
    Ballistic,
    /// Constant velocity (targets)
    Linear,
}

/// Which velocity components were flipped by a wall
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bounce {
    pub x: bool,
    pub y: bool,
}

/// Flip velocity components of an entity touching or beyond a wall
pub fn reflect(entity: &mut Entity, field: Field) -> Bounce {
    let r = entity.radius;
    let mut bounce = Bounce::default();

    if entity.pos.x < r || entity.pos.x > field.width - r {
        entity.vel.x = -entity.vel.x;
        bounce.x = true;
    }
    if entity.pos.y < r || entity.pos.y > field.height - r {
        entity.vel.y = -entity.vel.y;
        bounce.y = true;
    }

    bounce
}

/// Advance a single entity by one tick
pub fn advance(entity: &mut Entity, motion: Motion, field: Field) -> Bounce {
    entity.pos += entity.vel;

    if motion == Motion::Ballistic {
        entity.vel *= DRAG;
        entity.vel.y += GRAVITY;
    }

    reflect(entity, field)
}

/// Advance every live entity of a collection
pub fn advance_all(registry: &mut Registry, motion: Motion, field: Field) {
    registry.for_each_alive(|_, entity| {
        advance(entity, motion, field);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;

    const FIELD: Field = Field {
        width: 640.0,
        height: 600.0,
    };

    #[test]
    fn test_ballistic_step_order() {
        let mut e = Entity::new(Vec2::new(100.0, 100.0), Vec2::new(2.0, -1.0), 5.0);
        advance(&mut e, Motion::Ballistic, FIELD);
        assert_eq!(e.pos, Vec2::new(102.0, 99.0));
        assert!((e.vel.x - 2.0 * DRAG).abs() < 1e-6);
        // Gravity lands after drag
        assert!((e.vel.y - (-1.0 * DRAG + GRAVITY)).abs() < 1e-6);
    }

    #[test]
    fn test_linear_keeps_velocity() {
        let mut e = Entity::new(Vec2::new(100.0, 100.0), Vec2::new(3.0, 4.0), 5.0);
        advance(&mut e, Motion::Linear, FIELD);
        assert_eq!(e.pos, Vec2::new(103.0, 104.0));
        assert_eq!(e.vel, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_target_bounces_off_left_wall() {
        let mut e = Entity::new(Vec2::new(5.0, 300.0), Vec2::new(-1.0, 0.0), 10.0);
        let bounce = advance(&mut e, Motion::Linear, FIELD);
        assert!(e.pos.x < e.radius);
        assert_eq!(e.vel.x, 1.0);
        assert_eq!(bounce, Bounce { x: true, y: false });
    }

    #[test]
    fn test_bounce_does_not_clamp_position() {
        let mut e = Entity::new(Vec2::new(636.0, 300.0), Vec2::new(3.0, 0.0), 10.0);
        advance(&mut e, Motion::Linear, FIELD);
        assert_eq!(e.pos.x, 639.0);
        assert_eq!(e.vel.x, -3.0);
    }

    #[test]
    fn test_floor_and_ceiling_reflect_y() {
        let mut e = Entity::new(Vec2::new(300.0, 595.0), Vec2::new(0.0, 2.0), 10.0);
        advance(&mut e, Motion::Linear, FIELD);
        assert_eq!(e.vel.y, -2.0);

        let mut e = Entity::new(Vec2::new(300.0, 2.0), Vec2::new(0.0, -1.0), 4.0);
        advance(&mut e, Motion::Linear, FIELD);
        assert_eq!(e.vel.y, 1.0);
    }

    #[test]
    fn test_exactly_at_radius_does_not_flip() {
        let mut e = Entity::new(Vec2::new(10.0, 300.0), Vec2::ZERO, 10.0);
        let bounce = reflect(&mut e, FIELD);
        assert_eq!(bounce, Bounce::default());
    }

    #[test]
    fn test_advance_all_skips_dead() {
        let mut reg = Registry::new();
        let a = reg.spawn(Entity::new(Vec2::new(100.0, 100.0), Vec2::new(1.0, 0.0), 5.0));
        let b = reg.spawn(Entity::new(Vec2::new(200.0, 100.0), Vec2::new(1.0, 0.0), 5.0));
        reg.destroy(b);
        advance_all(&mut reg, Motion::Linear, FIELD);
        assert_eq!(reg.get(a).unwrap().pos.x, 101.0);
        assert_eq!(reg.get(b).unwrap().pos.x, 200.0);
    }

    proptest! {
        #[test]
        fn prop_motion_keeps_radius_and_score(
            x in 0.0f32..640.0,
            y in 0.0f32..600.0,
            vx in -10.0f32..10.0,
            vy in -10.0f32..10.0,
            r in 1.0f32..30.0,
            score in 0u32..100,
            ballistic in any::<bool>(),
        ) {
            let motion = if ballistic { Motion::Ballistic } else { Motion::Linear };
            let mut e = Entity::new(Vec2::new(x, y), Vec2::new(vx, vy), r).with_score(score);
            for _ in 0..20 {
                advance(&mut e, motion, FIELD);
            }
            prop_assert_eq!(e.radius, r);
            prop_assert_eq!(e.score_value, score);
            prop_assert!(e.alive);
        }

        #[test]
        fn prop_reflection_flips_at_most_once_per_tick(
            x in -20.0f32..660.0,
            vx in -10.0f32..10.0,
            r in 1.0f32..30.0,
        ) {
            let mut e = Entity::new(Vec2::new(x, 300.0), Vec2::new(vx, 0.0), r);
            let before = e.vel.x;
            let bounce = reflect(&mut e, FIELD);
            if bounce.x {
                prop_assert_eq!(e.vel.x, -before);
            } else {
                prop_assert_eq!(e.vel.x, before);
            }
        }
    }
}
