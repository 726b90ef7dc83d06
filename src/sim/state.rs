//! Game state and core simulation types
//!
//! Everything a tick reads or writes lives in [`GameState`]. Input handlers
//! (`on_press`, `on_release`, `on_pointer_move`, `stop`) mutate it between
//! ticks; nothing here touches the render surface.

use std::time::Instant;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::cannon::Cannon;
use super::registry::{EntityId, Registry};
use crate::consts::*;
use crate::{Color, PALETTE};

/// Opaque id of an object living on the render surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderHandle(pub u32);

/// Renderable outline of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Shape {
    #[default]
    Circle,
    Rect,
}

/// Which collection an entity belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Bullet,
    Target,
}

/// A bullet or a target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Points credited when this entity is hit (targets only in practice)
    pub score_value: u32,
    /// Logical deletion flag; dead entities are skipped everywhere
    pub alive: bool,
    pub shape: Shape,
    pub color: Color,
    /// Surface object mirroring this entity, assigned by the render sync pass
    #[serde(skip)]
    pub render: Option<RenderHandle>,
}

impl Entity {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        debug_assert!(radius > 0.0, "entity radius must be positive");
        Self {
            pos,
            vel,
            radius,
            score_value: 0,
            alive: true,
            shape: Shape::Circle,
            color: PALETTE[0],
            render: None,
        }
    }

    pub fn with_score(mut self, score_value: u32) -> Self {
        self.score_value = score_value;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }
}

/// Rectangular playing field anchored at the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub width: f32,
    pub height: f32,
}

impl Default for Field {
    fn default() -> Self {
        Self {
            width: FIELD_WIDTH,
            height: FIELD_HEIGHT,
        }
    }
}

impl Field {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether a point lies on the field (edges included)
    pub fn contains(&self, p: Vec2) -> bool {
        p.is_finite() && p.x >= 0.0 && p.y >= 0.0 && p.x <= self.width && p.y <= self.height
    }
}

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ticking
    Running,
    /// Every target destroyed
    Cleared,
    /// Host asked to stop
    Stopped,
}

/// Things that happened during a tick or an input dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BulletFired { id: EntityId, speed: f32 },
    TargetHit { bullet: EntityId, target: EntityId, points: u32 },
    SessionOver { phase: GamePhase, score: u64 },
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub field: Field,
    pub cannon: Cannon,
    pub bullets: Registry,
    pub targets: Registry,
    /// Never decreases
    pub score: u64,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events since the last drain
    pub events: Vec<GameEvent>,
    rng: Pcg32,
}

impl GameState {
    /// Create an empty state; the cannon sits at `cannon_origin`
    pub fn new(field: Field, cannon_origin: Vec2, seed: u64) -> Self {
        Self {
            field,
            cannon: Cannon::new(cannon_origin),
            bullets: Registry::new(),
            targets: Registry::new(),
            score: 0,
            phase: GamePhase::Running,
            time_ticks: 0,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn registry_mut(&mut self, kind: EntityKind) -> &mut Registry {
        match kind {
            EntityKind::Bullet => &mut self.bullets,
            EntityKind::Target => &mut self.targets,
        }
    }

    /// Add a new alive entity to one of the collections
    pub fn spawn(&mut self, kind: EntityKind, entity: Entity) -> EntityId {
        self.registry_mut(kind).spawn(entity)
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn live_targets(&self) -> usize {
        self.targets.alive_count()
    }

    /// Random integer in `[a, b)`; `a` when the range is empty
    pub fn randint(&mut self, a: i32, b: i32) -> i32 {
        if b <= a {
            return a;
        }
        self.rng.random_range(a..b)
    }

    pub fn random_color(&mut self) -> Color {
        PALETTE[self.randint(0, PALETTE.len() as i32) as usize]
    }

    /// Spawn a target somewhere inside the field with a random drift
    pub fn spawn_random_target(&mut self) -> EntityId {
        let r = self.randint(MIN_RADIUS, MAX_RADIUS);
        let x = self.randint(r, self.field.width as i32 - r);
        let y = self.randint(r, self.field.height as i32 - r);
        let vx = 0.1 * self.randint(-100, 100) as f32;
        let vy = 0.1 * self.randint(-100, 100) as f32;
        let color = self.random_color();

        let target = Entity::new(Vec2::new(x as f32, y as f32), Vec2::new(vx, vy), r as f32)
            .with_shape(Shape::Rect)
            .with_color(color)
            .with_score(1);
        self.spawn(EntityKind::Target, target)
    }

    /// Pointer pressed on the field: start charging
    pub fn on_press(&mut self, pos: Vec2, now: Instant) {
        if !self.is_running() || !self.field.contains(pos) {
            return;
        }
        self.cannon.press(now);
    }

    /// Pointer released: fire with whatever charge the last tick computed
    pub fn on_release(&mut self) -> Option<EntityId> {
        if !self.is_running() {
            return None;
        }
        let vel = self.cannon.release()?;
        Some(self.fire(vel))
    }

    pub fn on_pointer_move(&mut self, pos: Vec2) {
        self.cannon.aim(pos);
    }

    /// Spawn a bullet at the cannon mouth origin with the given velocity
    pub fn fire(&mut self, vel: Vec2) -> EntityId {
        let r = self.randint(MIN_RADIUS, MAX_RADIUS);
        let color = self.random_color();
        let bullet = Entity::new(self.cannon.origin, vel, r as f32).with_color(color);
        let id = self.spawn(EntityKind::Bullet, bullet);
        self.events.push(GameEvent::BulletFired {
            id,
            speed: vel.length(),
        });
        id
    }

    /// End the session on the host's request
    pub fn stop(&mut self) {
        self.finish(GamePhase::Stopped);
    }

    pub(crate) fn finish(&mut self, phase: GamePhase) {
        if !self.is_running() {
            return;
        }
        self.phase = phase;
        self.cannon.reset();
        self.events.push(GameEvent::SessionOver {
            phase,
            score: self.score,
        });
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
