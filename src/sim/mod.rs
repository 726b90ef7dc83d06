//! Simulation module
//!
//! All gameplay logic lives here:
//! - Fixed ticks only, positions in pixels, velocities in pixels/tick
//! - Seeded RNG only
//! - Stable traversal order (by registry slot)
//! - No rendering or platform dependencies

pub mod cannon;
pub mod collision;
pub mod kinematics;
pub mod registry;
pub mod state;
pub mod tick;

pub use cannon::{Cannon, ChargeMode};
pub use collision::{Hit, circles_overlap, resolve_collisions};
pub use kinematics::{Bounce, Motion, advance, advance_all, reflect};
pub use registry::{EntityId, Registry};
pub use state::{
    Entity, EntityKind, Field, GameEvent, GamePhase, GameState, RenderHandle, Shape,
};
pub use tick::tick;
