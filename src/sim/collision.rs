//! Bullet/target collision detection and resolution
//!
//! Every live bullet is tested against every live target. The first overlapping
//! target in traversal order wins; both entities die at once, so a bullet can
//! score at most once and a hit target is invisible to the bullets after it.

use glam::Vec2;

use super::registry::{EntityId, Registry};

/// A resolved bullet/target hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub bullet: EntityId,
    pub target: EntityId,
    /// Target's score value
    pub points: u32,
}

/// Strict circle/circle overlap test (touching circles do not collide)
#[inline]
pub fn circles_overlap(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> bool {
    let reach = a_radius + b_radius;
    a_pos.distance_squared(b_pos) < reach * reach
}

/// Resolve all bullet/target hits for this tick
///
/// Both entities of each hit are destroyed before the next bullet is scanned.
pub fn resolve_collisions(bullets: &mut Registry, targets: &mut Registry) -> Vec<Hit> {
    let mut hits = Vec::new();

    for (bullet_id, bullet) in bullets.iter_alive() {
        let found = targets
            .iter_alive()
            .find(|(_, target)| circles_overlap(bullet.pos, bullet.radius, target.pos, target.radius))
            .map(|(target_id, target)| (target_id, target.score_value));

        if let Some((target_id, points)) = found {
            targets.destroy(target_id);
            hits.push(Hit {
                bullet: bullet_id,
                target: target_id,
                points,
            });
        }
    }

    for hit in &hits {
        bullets.destroy(hit.bullet);
    }

    hits
}
