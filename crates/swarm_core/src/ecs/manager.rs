//! Entity manager
//!
//! Authoritative registry of live entities with a secondary tag index.
//!
//! Every query returns a snapshot (`Vec<EntityRef>`), never a live view.
//! Entities in a snapshot may become inactive before they are processed, so
//! systems re-check [`Entity::is_active`].
//!
//! The tag index is updated only when an entity is registered
//! (`create`/`add`) or unregistered (`destroy`/`remove`), from the entity's
//! tag set at that moment. Tags changed on a registered entity are not
//! reflected until it is registered again.

use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use super::{ComponentQuery, Entity, EntityId, EntityRef};

/// Observer hook for entity lifecycle notifications.
///
/// Observers are called while the manager holds a shared borrow of the
/// entity; they must not try to borrow it mutably.
pub trait EntityObserver {
    /// An entity was registered through `create`, `create_with` or `add`
    fn on_entity_created(&mut self, _entity: &Entity) {}

    /// An entity was destroyed (already disposed when this runs)
    fn on_entity_destroyed(&mut self, _entity: &Entity) {}
}

/// Registry of all live entities
#[derive(Default)]
pub struct EntityManager {
    entities: BTreeMap<EntityId, EntityRef>,
    tag_index: HashMap<String, BTreeMap<EntityId, EntityRef>>,
    observers: Vec<Box<dyn EntityObserver>>,
}

impl EntityManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a lifecycle observer
    pub fn add_observer(&mut self, observer: Box<dyn EntityObserver>) {
        self.observers.push(observer);
    }

    /// Create and register an empty entity with a fresh id
    pub fn create(&mut self) -> EntityRef {
        self.create_with(|_| {})
    }

    /// Create an entity, let `build` attach components and tags, then register it.
    ///
    /// Tags added inside `build` are indexed.
    pub fn create_with<F>(&mut self, build: F) -> EntityRef
    where
        F: FnOnce(&mut Entity),
    {
        let mut entity = Entity::new();
        build(&mut entity);
        let entity = entity.into_ref();
        self.register(&entity);
        entity
    }

    /// Register a pre-built entity (for example one taken from a pool)
    pub fn add(&mut self, entity: &EntityRef) {
        self.register(entity);
    }

    fn register(&mut self, entity: &EntityRef) {
        let borrowed = entity.borrow();
        let id = borrowed.id();

        if let Some(previous) = self.entities.insert(id, Rc::clone(entity)) {
            if !Rc::ptr_eq(&previous, entity) {
                log::warn!("Entity id {} registered twice, replacing the earlier instance", id);
            }
        }

        for tag in borrowed.tags() {
            self.tag_index
                .entry(tag.to_owned())
                .or_default()
                .insert(id, Rc::clone(entity));
        }

        log::trace!("Registered entity {} ({} tags)", id, borrowed.tags().count());
        for observer in &mut self.observers {
            observer.on_entity_created(&borrowed);
        }
    }

    /// Drop the entity from the tag index (by its current tags) and the primary map
    fn unregister(&mut self, entity: &EntityRef) -> bool {
        let borrowed = entity.borrow();
        let id = borrowed.id();

        for tag in borrowed.tags() {
            if let Some(members) = self.tag_index.get_mut(tag) {
                if members.get(&id).is_some_and(|member| Rc::ptr_eq(member, entity)) {
                    members.remove(&id);
                }
                if members.is_empty() {
                    self.tag_index.remove(tag);
                }
            }
        }

        match self.entities.get(&id) {
            Some(registered) if Rc::ptr_eq(registered, entity) => {
                self.entities.remove(&id);
                true
            }
            _ => false,
        }
    }

    /// Unregister and dispose an entity.
    ///
    /// The entity is disposed even if it was not registered, but observers
    /// are only notified when it was. Returns whether it was registered.
    pub fn destroy(&mut self, entity: &EntityRef) -> bool {
        let was_registered = self.unregister(entity);
        entity.borrow_mut().dispose();

        let borrowed = entity.borrow();
        if !was_registered {
            log::trace!("Disposed unregistered entity {}", borrowed.id());
            return false;
        }

        log::trace!("Destroyed entity {}", borrowed.id());
        for observer in &mut self.observers {
            observer.on_entity_destroyed(&borrowed);
        }
        true
    }

    /// Unregister an entity without disposing it.
    ///
    /// Used for pooled entities going back to their pool: components stay
    /// attached for the next reset. No destroyed notification is sent.
    pub fn remove(&mut self, entity: &EntityRef) -> bool {
        let removed = self.unregister(entity);
        if removed {
            log::trace!("Removed entity {} for reuse", entity.borrow().id());
        }
        removed
    }

    /// Look up an entity by id
    pub fn get_by_id(&self, id: EntityId) -> Option<EntityRef> {
        self.entities.get(&id).cloned()
    }

    /// Whether this exact entity is registered
    pub fn contains(&self, entity: &EntityRef) -> bool {
        let id = entity.borrow().id();
        self.entities
            .get(&id)
            .is_some_and(|registered| Rc::ptr_eq(registered, entity))
    }

    /// Snapshot of every registered entity, active or not
    pub fn get_all(&self) -> Vec<EntityRef> {
        self.entities.values().cloned().collect()
    }

    /// Snapshot of the entities indexed under `tag`
    pub fn get_by_tag(&self, tag: &str) -> Vec<EntityRef> {
        self.tag_index
            .get(tag)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Snapshot of the active entities carrying every kind in `Q`
    pub fn get_with_components<Q: ComponentQuery>(&self) -> Vec<EntityRef> {
        let mut snapshot = Vec::new();
        self.query_into::<Q>(&mut snapshot);
        snapshot
    }

    /// Snapshot of the active entities carrying every listed component kind
    pub fn get_with_component_types(&self, type_ids: &[TypeId]) -> Vec<EntityRef> {
        self.entities
            .values()
            .filter(|entity| {
                let entity = entity.borrow();
                entity.is_active() && entity.has_all_component_types(type_ids)
            })
            .cloned()
            .collect()
    }

    /// Fill `out` with the snapshot `get_with_components::<Q>()` would return.
    ///
    /// `out` is cleared first. Systems keep the buffer between ticks so a
    /// steady-state query does not allocate.
    pub fn query_into<Q: ComponentQuery>(&self, out: &mut Vec<EntityRef>) {
        out.clear();
        out.extend(
            self.entities
                .values()
                .filter(|entity| {
                    let entity = entity.borrow();
                    entity.is_active() && Q::matches(&entity)
                })
                .cloned(),
        );
    }

    /// Number of registered entities
    pub fn count(&self) -> usize {
        self.entities.len()
    }

    /// Number of entities indexed under `tag`
    pub fn count_by_tag(&self, tag: &str) -> usize {
        self.tag_index.get(tag).map_or(0, BTreeMap::len)
    }

    /// Whether no entity is registered
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Dispose every registered entity and empty both indices.
    ///
    /// No destroyed notifications are sent.
    pub fn clear(&mut self) {
        let count = self.entities.len();
        for entity in self.entities.values() {
            entity.borrow_mut().dispose();
        }
        self.entities.clear();
        self.tag_index.clear();
        log::debug!("Cleared {} entities", count);
    }
}

impl fmt::Debug for EntityManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityManager")
            .field("entities", &self.entities.len())
            .field("tags", &self.tag_index.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Debug, Default)]
    struct Position {
        entity: Option<EntityId>,
    }
    crate::impl_component!(Position);

    #[derive(Debug, Default)]
    struct Speed {
        entity: Option<EntityId>,
    }
    crate::impl_component!(Speed);

    fn moving(entity: &mut Entity) {
        entity.add_component(Position::default()).add_component(Speed::default());
    }

    #[test]
    fn test_create_registers_and_indexes_tags() {
        let mut manager = EntityManager::new();
        let entity = manager.create_with(|e| {
            e.add_tag("enemy");
        });

        assert_eq!(manager.count(), 1);
        assert_eq!(manager.count_by_tag("enemy"), 1);
        let id = entity.borrow().id();
        assert!(manager.get_by_id(id).is_some_and(|found| Rc::ptr_eq(&found, &entity)));
    }

    #[test]
    fn test_tag_index_consistent_at_add_and_destroy() {
        let mut manager = EntityManager::new();
        let entity = Entity::new().into_ref();
        entity.borrow_mut().add_tag("enemy");

        manager.add(&entity);
        let enemies = manager.get_by_tag("enemy");
        assert!(enemies.iter().any(|e| Rc::ptr_eq(e, &entity)));

        assert!(manager.destroy(&entity));
        assert!(manager.get_by_tag("enemy").is_empty());
        assert_eq!(manager.count(), 0);
        assert!(!entity.borrow().is_active());
    }

    #[test]
    fn test_tag_index_is_stale_after_direct_tag_mutation() {
        let mut manager = EntityManager::new();
        let entity = manager.create();

        // Tags added after registration are not indexed
        entity.borrow_mut().add_tag("late");
        assert_eq!(manager.count_by_tag("late"), 0);

        // Tags removed after registration stay indexed, even past destroy
        let tagged = manager.create_with(|e| {
            e.add_tag("enemy");
        });
        tagged.borrow_mut().remove_tag("enemy");
        assert_eq!(manager.count_by_tag("enemy"), 1);
        manager.destroy(&tagged);
        assert_eq!(manager.count_by_tag("enemy"), 1);
    }

    #[test]
    fn test_queries_return_active_entities_only() {
        let mut manager = EntityManager::new();
        let a = manager.create_with(moving);
        let b = manager.create_with(moving);
        let c = manager.create_with(|e| {
            e.add_component(Position::default());
        });
        b.borrow_mut().set_active(false);

        let found = manager.get_with_components::<(Position, Speed)>();
        assert_eq!(found.len(), 1);
        assert!(Rc::ptr_eq(&found[0], &a));

        let positioned = manager.get_with_components::<(Position,)>();
        assert_eq!(positioned.len(), 2);
        assert!(positioned.iter().any(|e| Rc::ptr_eq(e, &c)));

        let by_type = manager.get_with_component_types(&[TypeId::of::<Speed>()]);
        assert_eq!(by_type.len(), 1);
    }

    #[test]
    fn test_snapshots_are_independent() {
        let mut manager = EntityManager::new();
        let a = manager.create_with(moving);
        manager.create_with(moving);

        let snapshot = manager.get_with_components::<(Position, Speed)>();
        assert_eq!(snapshot.len(), 2);

        a.borrow_mut().set_active(false);
        manager.create_with(moving);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(manager.get_with_components::<(Position, Speed)>().len(), 2);
    }

    #[test]
    fn test_remove_keeps_components() {
        let mut manager = EntityManager::new();
        let entity = manager.create_with(moving);

        assert!(manager.remove(&entity));
        assert!(!manager.contains(&entity));
        assert!(entity.borrow().has_component::<Position>());
        assert!(entity.borrow().is_active());

        // Second removal is a no-op
        assert!(!manager.remove(&entity));
    }

    #[test]
    fn test_query_into_reuses_buffer() {
        let mut manager = EntityManager::new();
        manager.create_with(moving);
        let mut buffer = Vec::with_capacity(16);
        buffer.push(manager.create());

        manager.query_into::<(Speed,)>(&mut buffer);
        assert_eq!(buffer.len(), 1);
        assert!(buffer.capacity() >= 16);
    }

    #[test]
    fn test_clear_disposes_everything() {
        let mut manager = EntityManager::new();
        let entity = manager.create_with(|e| {
            moving(e);
            e.add_tag("enemy");
        });

        manager.clear();
        assert!(manager.is_empty());
        assert_eq!(manager.count_by_tag("enemy"), 0);
        assert_eq!(entity.borrow().component_count(), 0);
    }

    #[derive(Default)]
    struct Log {
        created: Vec<EntityId>,
        destroyed: Vec<EntityId>,
    }

    struct Recorder(Rc<RefCell<Log>>);

    impl EntityObserver for Recorder {
        fn on_entity_created(&mut self, entity: &Entity) {
            self.0.borrow_mut().created.push(entity.id());
        }

        fn on_entity_destroyed(&mut self, entity: &Entity) {
            self.0.borrow_mut().destroyed.push(entity.id());
        }
    }

    #[test]
    fn test_observers_see_create_and_destroy() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut manager = EntityManager::new();
        manager.add_observer(Box::new(Recorder(Rc::clone(&log))));

        let a = manager.create();
        let b = Entity::new().into_ref();
        manager.add(&b);
        manager.remove(&b);
        manager.destroy(&a);

        let log = log.borrow();
        assert_eq!(log.created, vec![a.borrow().id(), b.borrow().id()]);
        assert_eq!(log.destroyed, vec![a.borrow().id()]);
    }

    #[test]
    fn test_destroy_notifies_once() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut manager = EntityManager::new();
        manager.add_observer(Box::new(Recorder(Rc::clone(&log))));

        let entity = manager.create_with(moving);
        assert!(manager.destroy(&entity));
        assert!(!manager.destroy(&entity));

        let stray = Entity::new().into_ref();
        stray.borrow_mut().add_component(Position::default());
        assert!(!manager.destroy(&stray));
        // Still disposed, just not announced
        assert_eq!(stray.borrow().component_count(), 0);

        assert_eq!(log.borrow().destroyed, vec![entity.borrow().id()]);
    }
}
