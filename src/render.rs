//! Render surface seam
//!
//! The simulation never talks to the surface directly. After every tick the
//! [`RenderSync`] pass mirrors the state onto a [`RenderSurface`]: destroyed
//! entities are removed first, new entities get a renderable, and every live
//! entity plus the cannon gets its transform refreshed before the repaint.

use std::collections::HashMap;

use glam::Vec2;

use crate::Color;
use crate::consts::{BARREL_WIDTH, BASE_LEN};
use crate::sim::GameState;
pub use crate::sim::{RenderHandle, Shape};

/// Translation, then rotation (radians), then scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
        }
    }
}

impl Transform {
    pub fn from_translation(translation: Vec2) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }
}

/// Drawing backend the session pushes into
pub trait RenderSurface {
    /// Create a renderable; `size` is the radius pair for circles, width/height for rects
    fn create_renderable(&mut self, shape: Shape, size: Vec2, color: Color) -> RenderHandle;
    fn set_transform(&mut self, handle: RenderHandle, transform: Transform);
    fn remove_renderable(&mut self, handle: RenderHandle);
    /// Ask for the frame to be redrawn
    fn repaint(&mut self) {}
}

/// Mirrors a `GameState` onto a surface
#[derive(Debug)]
pub struct RenderSync {
    cannon: RenderHandle,
}

impl RenderSync {
    /// Create the cannon barrel on the surface
    pub fn attach<S: RenderSurface>(state: &GameState, surface: &mut S) -> Self {
        let cannon = surface.create_renderable(
            Shape::Rect,
            Vec2::new(BASE_LEN, BARREL_WIDTH),
            state.cannon.color(),
        );
        let sync = Self { cannon };
        sync.place_cannon(state, surface);
        sync
    }

    pub fn cannon_handle(&self) -> RenderHandle {
        self.cannon
    }

    /// Push the current state to the surface without repainting
    pub fn sync<S: RenderSurface>(&self, state: &mut GameState, surface: &mut S) {
        for registry in [&mut state.bullets, &mut state.targets] {
            for handle in registry.take_detached() {
                surface.remove_renderable(handle);
            }

            for entity in registry.iter_unrendered_mut() {
                let size = match entity.shape {
                    Shape::Circle => Vec2::splat(entity.radius),
                    Shape::Rect => Vec2::splat(entity.radius * 2.0),
                };
                entity.render = Some(surface.create_renderable(entity.shape, size, entity.color));
            }

            for (_, entity) in registry.iter_alive() {
                if let Some(handle) = entity.render {
                    surface.set_transform(handle, Transform::from_translation(entity.pos));
                }
            }
        }

        self.place_cannon(state, surface);
    }

    /// Sync then request a repaint
    pub fn frame<S: RenderSurface>(&self, state: &mut GameState, surface: &mut S) {
        self.sync(state, surface);
        surface.repaint();
    }

    fn place_cannon<S: RenderSurface>(&self, state: &GameState, surface: &mut S) {
        let cannon = &state.cannon;
        surface.set_transform(
            self.cannon,
            Transform {
                translation: cannon.origin,
                rotation: cannon.rotation,
                scale: Vec2::new(cannon.barrel_len() / BASE_LEN, 1.0),
            },
        );
    }
}

/// A renderable as seen by [`RecordingSurface`]
#[derive(Debug, Clone, PartialEq)]
pub struct Renderable {
    pub shape: Shape,
    pub size: Vec2,
    pub color: Color,
    pub transform: Transform,
}

/// Headless surface that keeps the scene in memory
#[derive(Debug, Default)]
pub struct RecordingSurface {
    items: HashMap<RenderHandle, Renderable>,
    next_handle: u32,
    repaints: u64,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: RenderHandle) -> Option<&Renderable> {
        self.items.get(&handle)
    }

    pub fn contains(&self, handle: RenderHandle) -> bool {
        self.items.contains_key(&handle)
    }

    /// Number of renderables currently on the surface
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn repaints(&self) -> u64 {
        self.repaints
    }
}

impl RenderSurface for RecordingSurface {
    fn create_renderable(&mut self, shape: Shape, size: Vec2, color: Color) -> RenderHandle {
        let handle = RenderHandle(self.next_handle);
        self.next_handle += 1;
        log::trace!("create {:?} {:?} size={} color={}", handle, shape, size, color.to_hex());
        self.items.insert(
            handle,
            Renderable {
                shape,
                size,
                color,
                transform: Transform::default(),
            },
        );
        handle
    }

    fn set_transform(&mut self, handle: RenderHandle, transform: Transform) {
        match self.items.get_mut(&handle) {
            Some(item) => item.transform = transform,
            None => log::warn!("set_transform on unknown renderable {:?}", handle),
        }
    }

    fn remove_renderable(&mut self, handle: RenderHandle) {
        log::trace!("remove {:?}", handle);
        if self.items.remove(&handle).is_none() {
            log::warn!("remove of unknown renderable {:?}", handle);
        }
    }

    fn repaint(&mut self) {
        self.repaints += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::{Entity, EntityKind, Field, tick};
    use std::time::{Duration, Instant};

    fn setup() -> (GameState, RecordingSurface, RenderSync) {
        let state = GameState::new(Field::default(), Vec2::new(CANNON_X, 300.0), 3);
        let mut surface = RecordingSurface::new();
        let sync = RenderSync::attach(&state, &mut surface);
        (state, surface, sync)
    }

    #[test]
    fn test_attach_creates_cannon() {
        let (state, surface, sync) = setup();
        let cannon = surface.get(sync.cannon_handle()).unwrap();
        assert_eq!(cannon.shape, Shape::Rect);
        assert_eq!(cannon.size, Vec2::new(BASE_LEN, BARREL_WIDTH));
        assert_eq!(cannon.color, Color::BLACK);
        assert_eq!(cannon.transform.translation, state.cannon.origin);
        assert_eq!(cannon.transform.scale, Vec2::ONE);
    }

    #[test]
    fn test_new_entities_get_renderables() {
        let (mut state, mut surface, sync) = setup();
        let id = state.spawn(
            EntityKind::Target,
            Entity::new(Vec2::new(120.0, 80.0), Vec2::ZERO, 7.0).with_shape(Shape::Rect),
        );
        sync.frame(&mut state, &mut surface);

        let handle = state.targets.get(id).unwrap().render.unwrap();
        let item = surface.get(handle).unwrap();
        assert_eq!(item.shape, Shape::Rect);
        assert_eq!(item.size, Vec2::splat(14.0));
        assert_eq!(item.transform.translation, Vec2::new(120.0, 80.0));
        assert_eq!(surface.repaints(), 1);
        assert_eq!(surface.len(), 2);
    }

    #[test]
    fn test_hit_entities_leave_surface_same_tick() {
        let (mut state, mut surface, sync) = setup();
        let t = state.spawn(
            EntityKind::Target,
            Entity::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 10.0).with_score(1),
        );
        let b = state.spawn(
            EntityKind::Bullet,
            Entity::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 5.0),
        );
        sync.frame(&mut state, &mut surface);
        let th = state.targets.get(t).unwrap().render.unwrap();
        let bh = state.bullets.get(b).unwrap().render.unwrap();

        tick(&mut state, Instant::now());
        sync.frame(&mut state, &mut surface);

        assert!(!surface.contains(th));
        assert!(!surface.contains(bh));
        assert_eq!(surface.len(), 1);
    }

    #[test]
    fn test_cannon_scales_with_charge() {
        let (mut state, mut surface, sync) = setup();
        state.spawn(
            EntityKind::Target,
            Entity::new(Vec2::new(600.0, 50.0), Vec2::ZERO, 10.0),
        );
        let t0 = Instant::now();
        state.on_pointer_move(state.cannon.origin + Vec2::new(0.0, 10.0));
        state.on_press(Vec2::new(300.0, 300.0), t0);
        tick(&mut state, t0 + Duration::from_millis(5000));
        sync.frame(&mut state, &mut surface);

        let cannon = surface.get(sync.cannon_handle()).unwrap();
        let expected = (BASE_LEN + MAX_LEN_DELTA) / BASE_LEN;
        assert!((cannon.transform.scale.x - expected).abs() < 1e-5);
        assert!((cannon.transform.rotation - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }
}
