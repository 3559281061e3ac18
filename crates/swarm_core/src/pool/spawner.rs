//! Pool-backed entity spawner
//!
//! High-level API for short-lived entities (projectiles, particles, pickups).
//! Entities are built once per pooled instance by a [`SpawnTemplate`] and
//! recycled: `spawn` resets one in place and registers it with the
//! [`EntityManager`], `despawn` unregisters it without disposing and hands it
//! back to the pool. A recycled entity keeps its id.
//!
//! ```text
//! gameplay → EntitySpawner::spawn → ObjectPool::acquire + reset → EntityManager::add
//! gameplay → EntitySpawner::despawn → EntityManager::remove → ObjectPool::release
//! ```

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use super::object_pool::{ObjectPool, PoolHandle, PoolStats};
use crate::config::PoolSizing;
use crate::ecs::{Entity, EntityId, EntityManager, EntityRef};
use crate::foundation::collections::ScratchList;

/// Errors that can occur during spawning
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpawnError {
    /// Pool is at capacity; skip the spawn
    #[error("spawner '{spawner}' exhausted: {active}/{max} instances active")]
    PoolExhausted {
        /// Spawner name
        spawner: String,
        /// Current active instance count
        active: usize,
        /// Maximum pool capacity
        max: usize,
    },

    /// No spawner registered under this name
    #[error("no spawner named '{0}'")]
    UnknownSpawner(String),

    /// The spawner exists but uses a different template type
    #[error("spawner '{0}' uses a different template")]
    TypeMismatch(String),
}

/// Describes how a kind of pooled entity is built and re-initialized
pub trait SpawnTemplate: 'static {
    /// Arguments handed to each spawn
    type Params: 'static;

    /// Spawner name used for registry lookups and logs
    fn name(&self) -> &str;

    /// Attach components and tags. Runs once per pooled instance, and again
    /// only if that instance was disposed through `EntityManager::destroy`.
    fn build(&self, entity: &mut Entity);

    /// Re-initialize the existing components for a new spawn
    fn reset(&self, entity: &mut Entity, params: &Self::Params);
}

/// Spawner counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnerStats {
    /// Spawner name
    pub name: String,
    /// Entities currently spawned
    pub active: usize,
    /// Pooled entities ready for reuse
    pub free: usize,
    /// Pool capacity
    pub max: usize,
    /// Successful spawns
    pub spawned: u64,
    /// Despawns, manual or reclaimed
    pub despawned: u64,
    /// Spawns refused because the pool was exhausted
    pub failed: u64,
    /// Underlying pool counters
    pub pool: PoolStats,
}

/// Spawner recycling entities built from a template
pub struct EntitySpawner<T: SpawnTemplate> {
    name: String,
    template: Rc<T>,
    pool: ObjectPool<EntityRef, T::Params>,
    handles: HashMap<EntityId, PoolHandle>,
    reclaim_scratch: ScratchList<EntityRef>,
    spawned: u64,
    despawned: u64,
    failed: u64,
}

impl<T: SpawnTemplate> EntitySpawner<T> {
    /// Create a spawner and pre-build `initial_size` inactive entities
    pub fn new(template: T, initial_size: usize, max_size: usize) -> Self {
        let name = template.name().to_owned();
        let template = Rc::new(template);

        let build_template = Rc::clone(&template);
        let reset_template = Rc::clone(&template);
        let pool = ObjectPool::with_reset(
            move || {
                let mut entity = Entity::new();
                build_template.build(&mut entity);
                entity.set_active(false);
                entity.into_ref()
            },
            move |entity: &mut EntityRef, params: T::Params| {
                let mut entity = entity.borrow_mut();
                if entity.is_disposed() {
                    // Destroyed instead of despawned
                    log::debug!("Rebuilding disposed pooled entity {}", entity.id());
                    entity.revive();
                    reset_template.build(&mut entity);
                }
                reset_template.reset(&mut entity, &params);
            },
            initial_size,
            max_size,
        );

        log::info!("Created spawner '{}' ({}/{} pre-built)", name, pool.total_count(), max_size);
        Self {
            name,
            template,
            pool,
            handles: HashMap::new(),
            reclaim_scratch: ScratchList::new(),
            spawned: 0,
            despawned: 0,
            failed: 0,
        }
    }

    /// Create a spawner sized from configuration
    pub fn from_sizing(template: T, sizing: &PoolSizing) -> Self {
        Self::new(template, sizing.initial_size, sizing.max_size)
    }

    /// Spawner name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The template entities are built from
    pub fn template(&self) -> &T {
        &self.template
    }

    /// Take a pooled entity, reset it with `params`, activate and register it.
    ///
    /// Fails with [`SpawnError::PoolExhausted`] when every instance is in use;
    /// callers skip the spawn.
    pub fn spawn(&mut self, entities: &mut EntityManager, params: T::Params) -> Result<EntityRef, SpawnError> {
        let (handle, entity) = match self.pool.acquire_mut() {
            Some((handle, entity)) => (handle, Rc::clone(entity)),
            None => {
                self.failed += 1;
                return Err(SpawnError::PoolExhausted {
                    spawner: self.name.clone(),
                    active: self.pool.active_count(),
                    max: self.pool.max_size(),
                });
            }
        };

        self.pool.reset(handle, params);
        let id = {
            let mut borrowed = entity.borrow_mut();
            borrowed.set_active(true);
            borrowed.id()
        };
        self.handles.insert(id, handle);
        entities.add(&entity);
        self.spawned += 1;
        log::trace!("Spawner '{}' spawned entity {}", self.name, id);
        Ok(entity)
    }

    /// Whether this entity is one of this spawner's active instances
    pub fn owns(&self, entity: &EntityRef) -> bool {
        let id = entity.borrow().id();
        self.handles.get(&id).is_some_and(|&handle| {
            self.pool
                .get(handle)
                .is_some_and(|pooled| Rc::ptr_eq(pooled, entity))
        })
    }

    /// Unregister an active instance, deactivate it and return it to the pool.
    ///
    /// Returns false for entities this spawner did not hand out or already got back.
    pub fn despawn(&mut self, entities: &mut EntityManager, entity: &EntityRef) -> bool {
        if !self.owns(entity) {
            return false;
        }
        let id = entity.borrow().id();
        let Some(handle) = self.handles.remove(&id) else {
            return false;
        };

        entities.remove(entity);
        entity.borrow_mut().set_active(false);
        self.pool.release(handle);
        self.despawned += 1;
        log::trace!("Spawner '{}' despawned entity {}", self.name, id);
        true
    }

    /// Despawn every active instance that was marked inactive. Returns the count.
    pub fn reclaim_inactive(&mut self, entities: &mut EntityManager) -> usize {
        let mut scratch = std::mem::take(&mut self.reclaim_scratch);
        for entity in self.pool.active_objects() {
            if !entity.borrow().is_active() {
                scratch.push(Rc::clone(entity));
            }
        }

        let mut reclaimed = 0;
        for entity in scratch.drain() {
            if self.despawn(entities, &entity) {
                reclaimed += 1;
            }
        }
        self.reclaim_scratch = scratch;
        reclaimed
    }

    /// Despawn every active instance. Returns the count.
    pub fn despawn_all(&mut self, entities: &mut EntityManager) -> usize {
        for entity in self.pool.active_objects() {
            entities.remove(entity);
            entity.borrow_mut().set_active(false);
        }
        self.handles.clear();
        let count = self.pool.release_all();
        self.despawned += count as u64;
        if count > 0 {
            log::debug!("Spawner '{}' despawned all {} instances", self.name, count);
        }
        count
    }

    /// Despawn everything, drop the pooled entities and pre-build fresh ones.
    ///
    /// Used after the entity id counter was reset so pooled ids do not
    /// collide with newly created entities.
    pub fn rebuild(&mut self, entities: &mut EntityManager) {
        self.despawn_all(entities);
        self.pool.clear();
        let initial = self.pool.initial_size();
        self.pool.prewarm(initial);
        log::debug!("Spawner '{}' rebuilt with {} instances", self.name, initial);
    }

    /// Snapshot of the active instances
    pub fn active_entities(&self) -> Vec<EntityRef> {
        self.pool.active_objects().cloned().collect()
    }

    /// Number of active instances
    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    /// Counters
    pub fn stats(&self) -> SpawnerStats {
        SpawnerStats {
            name: self.name.clone(),
            active: self.pool.active_count(),
            free: self.pool.free_count(),
            max: self.pool.max_size(),
            spawned: self.spawned,
            despawned: self.despawned,
            failed: self.failed,
            pool: self.pool.stats(),
        }
    }
}

impl<T: SpawnTemplate> fmt::Debug for EntitySpawner<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntitySpawner")
            .field("name", &self.name)
            .field("pool", &self.pool)
            .finish()
    }
}
