//! Entity collections
//!
//! Each collection is a slot arena with generation-checked handles. Removal is
//! mark-then-compact: `destroy` flags an entity dead and queues its render
//! handle for detachment right away, `compact` reclaims slots once the tick's
//! traversals are done. A stale [`EntityId`] never resolves to a newer entity.

use serde::{Deserialize, Serialize};

use super::state::{Entity, RenderHandle};

/// Handle to an entity inside one [`Registry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    /// Spawn sequence number, used by `pop_latest`
    seq: u64,
    entity: Option<Entity>,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    next_seq: u64,
    /// Render handles of destroyed entities, waiting for the render sync pass
    detached: Vec<RenderHandle>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new entity (forced alive) and return its handle
    ///
    /// # Panics
    ///
    /// If the entity's radius is not a positive finite number.
    pub fn spawn(&mut self, mut entity: Entity) -> EntityId {
        assert!(
            entity.radius.is_finite() && entity.radius > 0.0,
            "entity radius must be positive, got {}",
            entity.radius
        );
        entity.alive = true;
        let seq = self.next_seq;
        self.next_seq += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.seq = seq;
            slot.entity = Some(entity);
            return EntityId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            seq,
            entity: Some(entity),
        });
        EntityId {
            index,
            generation: 0,
        }
    }

    /// Mark an entity dead and queue its render object for removal
    ///
    /// Returns false if the id is stale or the entity was already dead.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.get_mut(id) else {
            return false;
        };
        let was_alive = entity.alive;
        entity.alive = false;
        if let Some(handle) = entity.render.take() {
            self.detached.push(handle);
        }
        was_alive
    }

    /// Destroy the most recently spawned live entity
    pub fn pop_latest(&mut self) -> Option<EntityId> {
        let id = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.entity.as_ref().is_some_and(|e| e.alive))
            .max_by_key(|(_, s)| s.seq)
            .map(|(i, s)| EntityId {
                index: i as u32,
                generation: s.generation,
            })?;
        self.destroy(id);
        Some(id)
    }

    /// Look up an entity (alive or not yet compacted)
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.entity.as_ref())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.entity.as_mut())
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.get(id).is_some_and(|e| e.alive)
    }

    /// Live entities in slot order
    pub fn iter_alive(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.entity.as_ref().filter(|e| e.alive).map(|e| {
                (
                    EntityId {
                        index: i as u32,
                        generation: s.generation,
                    },
                    e,
                )
            })
        })
    }

    pub fn iter_alive_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut Entity)> {
        self.slots.iter_mut().enumerate().filter_map(|(i, s)| {
            let generation = s.generation;
            s.entity.as_mut().filter(|e| e.alive).map(|e| {
                (
                    EntityId {
                        index: i as u32,
                        generation,
                    },
                    e,
                )
            })
        })
    }

    /// Visit every live entity; entities killed by `f` mid-pass are skipped
    pub fn for_each_alive(&mut self, mut f: impl FnMut(EntityId, &mut Entity)) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if let Some(entity) = slot.entity.as_mut().filter(|e| e.alive) {
                let id = EntityId {
                    index: i as u32,
                    generation: slot.generation,
                };
                f(id, entity);
            }
        }
    }

    pub fn alive_count(&self) -> usize {
        self.iter_alive().count()
    }

    /// Release slots of dead entities; returns how many were reclaimed
    pub fn compact(&mut self) -> usize {
        let mut reclaimed = 0;
        for (i, slot) in self.slots.iter_mut().enumerate() {
            let Some(entity) = slot.entity.as_mut() else {
                continue;
            };
            if entity.alive {
                continue;
            }
            if let Some(handle) = entity.render.take() {
                self.detached.push(handle);
            }
            slot.entity = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(i as u32);
            reclaimed += 1;
        }
        reclaimed
    }

    /// Hand queued render handles to the caller
    pub fn take_detached(&mut self) -> Vec<RenderHandle> {
        std::mem::take(&mut self.detached)
    }

    /// Entities whose render object has not been created yet
    pub(crate) fn iter_unrendered_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.iter_alive_mut()
            .map(|(_, e)| e)
            .filter(|e| e.render.is_none())
    }
}
