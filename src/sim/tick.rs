//! Fixed timestep simulation tick
//!
//! One call advances the world by exactly one tick. Input is applied between
//! ticks through the `GameState` handlers; `now` only feeds the cannon charge.

use std::time::Instant;

use super::collision::resolve_collisions;
use super::kinematics::{Motion, advance_all};
use super::state::{GameEvent, GamePhase, GameState};

/// Advance the game state by one tick
pub fn tick(state: &mut GameState, now: Instant) {
    if !state.is_running() {
        return;
    }

    state.time_ticks += 1;
    let field = state.field;

    advance_all(&mut state.bullets, Motion::Ballistic, field);

    for hit in resolve_collisions(&mut state.bullets, &mut state.targets) {
        state.score += u64::from(hit.points);
        state.events.push(GameEvent::TargetHit {
            bullet: hit.bullet,
            target: hit.target,
            points: hit.points,
        });
    }

    advance_all(&mut state.targets, Motion::Linear, field);

    let cleared = state.targets.alive_count() == 0;

    state.cannon.update(now);

    state.bullets.compact();
    state.targets.compact();

    if cleared {
        state.finish(GamePhase::Cleared);
    }
}
