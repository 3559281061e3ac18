//! Spawner registry
//!
//! Named, type-erased spawners shared through the [`World`](crate::ecs::World)
//! instead of module-level globals. Whole-registry operations (reclaim,
//! despawn, rebuild) visit spawners in name order.
//!
//! # Usage
//!
//! ```text
//! world.spawners.register(EntitySpawner::new(BulletTemplate, 32, 256))?;
//! world.spawners.spawn::<BulletTemplate>("bullets", &mut world.entities, params)?;
//! world.spawners.reclaim_all(&mut world.entities);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use super::spawner::{EntitySpawner, SpawnError, SpawnTemplate, SpawnerStats};
use crate::ecs::{AsAny, EntityManager, EntityRef};

/// Errors from registry management
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A spawner with this name is already registered
    #[error("spawner '{0}' is already registered")]
    Duplicate(String),
}

/// Operations the registry performs without knowing the template type
pub trait ManagedSpawner: AsAny {
    /// Spawner name
    fn name(&self) -> &str;

    /// Whether this entity is one of the spawner's active instances
    fn owns(&self, entity: &EntityRef) -> bool;

    /// Return an active instance to its pool
    fn despawn(&mut self, entities: &mut EntityManager, entity: &EntityRef) -> bool;

    /// Despawn active instances marked inactive
    fn reclaim_inactive(&mut self, entities: &mut EntityManager) -> usize;

    /// Despawn every active instance
    fn despawn_all(&mut self, entities: &mut EntityManager) -> usize;

    /// Drop pooled instances and pre-build fresh ones
    fn rebuild(&mut self, entities: &mut EntityManager);

    /// Counters
    fn stats(&self) -> SpawnerStats;
}

impl<T: SpawnTemplate> ManagedSpawner for EntitySpawner<T> {
    fn name(&self) -> &str {
        EntitySpawner::name(self)
    }

    fn owns(&self, entity: &EntityRef) -> bool {
        EntitySpawner::owns(self, entity)
    }

    fn despawn(&mut self, entities: &mut EntityManager, entity: &EntityRef) -> bool {
        EntitySpawner::despawn(self, entities, entity)
    }

    fn reclaim_inactive(&mut self, entities: &mut EntityManager) -> usize {
        EntitySpawner::reclaim_inactive(self, entities)
    }

    fn despawn_all(&mut self, entities: &mut EntityManager) -> usize {
        EntitySpawner::despawn_all(self, entities)
    }

    fn rebuild(&mut self, entities: &mut EntityManager) {
        EntitySpawner::rebuild(self, entities);
    }

    fn stats(&self) -> SpawnerStats {
        EntitySpawner::stats(self)
    }
}

/// Registry of spawners by name
#[derive(Default)]
pub struct SpawnerRegistry {
    spawners: BTreeMap<String, Box<dyn ManagedSpawner>>,
}

impl SpawnerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a spawner under its own name
    pub fn register<S: ManagedSpawner>(&mut self, spawner: S) -> Result<(), RegistryError> {
        let name = spawner.name().to_owned();
        if self.spawners.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        log::debug!("Registered spawner '{}'", name);
        self.spawners.insert(name, Box::new(spawner));
        Ok(())
    }

    /// Unregister a spawner, despawning its active instances first
    pub fn remove(&mut self, name: &str, entities: &mut EntityManager) -> bool {
        match self.spawners.remove(name) {
            Some(mut spawner) => {
                spawner.despawn_all(entities);
                true
            }
            None => false,
        }
    }

    /// Whether a spawner with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.spawners.contains_key(name)
    }

    /// Number of registered spawners
    pub fn len(&self) -> usize {
        self.spawners.len()
    }

    /// Whether no spawner is registered
    pub fn is_empty(&self) -> bool {
        self.spawners.is_empty()
    }

    /// Registered names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.spawners.keys().map(String::as_str)
    }

    /// Typed access to a spawner
    pub fn get<T: SpawnTemplate>(&self, name: &str) -> Option<&EntitySpawner<T>> {
        self.spawners
            .get(name)
            .and_then(|spawner| (**spawner).as_any().downcast_ref::<EntitySpawner<T>>())
    }

    /// Typed mutable access to a spawner
    pub fn get_mut<T: SpawnTemplate>(&mut self, name: &str) -> Option<&mut EntitySpawner<T>> {
        self.spawners
            .get_mut(name)
            .and_then(|spawner| (**spawner).as_any_mut().downcast_mut::<EntitySpawner<T>>())
    }

    /// Spawn through the named spawner
    pub fn spawn<T: SpawnTemplate>(
        &mut self,
        name: &str,
        entities: &mut EntityManager,
        params: T::Params,
    ) -> Result<EntityRef, SpawnError> {
        let spawner = self
            .spawners
            .get_mut(name)
            .ok_or_else(|| SpawnError::UnknownSpawner(name.to_owned()))?;
        let spawner = (**spawner)
            .as_any_mut()
            .downcast_mut::<EntitySpawner<T>>()
            .ok_or_else(|| SpawnError::TypeMismatch(name.to_owned()))?;
        spawner.spawn(entities, params)
    }

    /// Return an entity to whichever spawner handed it out
    pub fn despawn(&mut self, entities: &mut EntityManager, entity: &EntityRef) -> bool {
        self.spawners
            .values_mut()
            .find(|spawner| spawner.owns(entity))
            .is_some_and(|spawner| spawner.despawn(entities, entity))
    }

    /// Reclaim inactive instances in every spawner. Returns the total.
    pub fn reclaim_all(&mut self, entities: &mut EntityManager) -> usize {
        self.spawners
            .values_mut()
            .map(|spawner| spawner.reclaim_inactive(entities))
            .sum()
    }

    /// Despawn every active instance of every spawner. Returns the total.
    pub fn despawn_all(&mut self, entities: &mut EntityManager) -> usize {
        self.spawners
            .values_mut()
            .map(|spawner| spawner.despawn_all(entities))
            .sum()
    }

    /// Rebuild every spawner's pool
    pub fn rebuild_all(&mut self, entities: &mut EntityManager) {
        for spawner in self.spawners.values_mut() {
            spawner.rebuild(entities);
        }
    }

    /// Counters of every spawner, in name order
    pub fn stats(&self) -> Vec<SpawnerStats> {
        self.spawners.values().map(|spawner| spawner.stats()).collect()
    }
}

impl fmt::Debug for SpawnerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnerRegistry")
            .field("spawners", &self.spawners.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Entity;

    struct Spark;

    impl SpawnTemplate for Spark {
        type Params = ();

        fn name(&self) -> &str {
            "sparks"
        }

        fn build(&self, entity: &mut Entity) {
            entity.add_tag("spark");
        }

        fn reset(&self, _entity: &mut Entity, _params: &()) {}
    }

    struct Debris;

    impl SpawnTemplate for Debris {
        type Params = u32;

        fn name(&self) -> &str {
            "debris"
        }

        fn build(&self, entity: &mut Entity) {
            entity.add_tag("debris");
        }

        fn reset(&self, _entity: &mut Entity, _params: &u32) {}
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut registry = SpawnerRegistry::new();
        registry.register(EntitySpawner::new(Spark, 1, 2)).expect("first");
        assert_eq!(
            registry.register(EntitySpawner::new(Spark, 1, 2)),
            Err(RegistryError::Duplicate("sparks".into()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_typed_spawn_and_errors() {
        let mut entities = EntityManager::new();
        let mut registry = SpawnerRegistry::new();
        registry.register(EntitySpawner::new(Spark, 1, 2)).expect("register");
        registry.register(EntitySpawner::new(Debris, 0, 2)).expect("register");

        let spark = registry.spawn::<Spark>("sparks", &mut entities, ()).expect("spawn");
        assert!(spark.borrow().has_tag("spark"));
        assert!(registry.get::<Spark>("sparks").is_some());
        assert!(registry.get::<Debris>("sparks").is_none());

        assert_eq!(
            registry.spawn::<Spark>("missing", &mut entities, ()).unwrap_err(),
            SpawnError::UnknownSpawner("missing".into())
        );
        assert_eq!(
            registry.spawn::<Spark>("debris", &mut entities, ()).unwrap_err(),
            SpawnError::TypeMismatch("debris".into())
        );
    }

    #[test]
    fn test_bulk_operations() {
        let mut entities = EntityManager::new();
        let mut registry = SpawnerRegistry::new();
        registry.register(EntitySpawner::new(Spark, 2, 2)).expect("register");
        registry.register(EntitySpawner::new(Debris, 2, 2)).expect("register");

        let spark = registry.spawn::<Spark>("sparks", &mut entities, ()).expect("spawn");
        registry.spawn::<Debris>("debris", &mut entities, 3).expect("spawn");
        registry.spawn::<Debris>("debris", &mut entities, 4).expect("spawn");

        spark.borrow_mut().set_active(false);
        assert_eq!(registry.reclaim_all(&mut entities), 1);
        assert_eq!(registry.despawn_all(&mut entities), 2);
        assert!(entities.is_empty());

        let stats = registry.stats();
        assert_eq!(stats.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(), vec!["debris", "sparks"]);
        assert!(stats.iter().all(|s| s.active == 0));
    }

    #[test]
    fn test_despawn_finds_owner() {
        let mut entities = EntityManager::new();
        let mut registry = SpawnerRegistry::new();
        registry.register(EntitySpawner::new(Spark, 1, 1)).expect("register");

        let spark = registry.spawn::<Spark>("sparks", &mut entities, ()).expect("spawn");
        let stranger = entities.create();

        assert!(registry.despawn(&mut entities, &spark));
        assert!(!registry.despawn(&mut entities, &stranger));
        assert!(entities.contains(&stranger));
    }
}
