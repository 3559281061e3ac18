//! Entity implementation
//!
//! An entity is an identity plus the components and tags it owns. Entities are
//! shared between the manager, the tag index, pools and query snapshots through
//! [`EntityRef`] handles; all access happens on the frame-loop thread.

use std::any::{type_name, TypeId};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::rc::Rc;

use super::Component;

thread_local! {
    static NEXT_ENTITY_ID: Cell<u64> = Cell::new(0);
}

/// Entity identifier
///
/// Ids come from a monotonic counter and are never reused until the counter
/// is reset with [`Entity::reset_id_counter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Wrap a raw id value
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw id value
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shared handle to an entity
pub type EntityRef = Rc<RefCell<Entity>>;

/// Container owning at most one component per kind, a set of tags and an active flag
pub struct Entity {
    id: EntityId,
    active: bool,
    disposed: bool,
    components: HashMap<TypeId, Box<dyn Component>>,
    tags: BTreeSet<String>,
}

impl Entity {
    /// Create an empty, active entity with a fresh id
    pub fn new() -> Self {
        Self {
            id: Self::allocate_id(),
            active: true,
            disposed: false,
            components: HashMap::new(),
            tags: BTreeSet::new(),
        }
    }

    /// Wrap this entity in a shared handle
    pub fn into_ref(self) -> EntityRef {
        Rc::new(RefCell::new(self))
    }

    fn allocate_id() -> EntityId {
        NEXT_ENTITY_ID.with(|next| {
            let id = next.get();
            match id.checked_add(1) {
                Some(following) => next.set(following),
                None => log::error!("Entity id space exhausted, id {} will repeat", id),
            }
            EntityId(id)
        })
    }

    /// Restart id allocation at 0 (game restart)
    ///
    /// Entities created before the reset keep their ids, so callers must clear
    /// the manager and rebuild pools before creating new entities.
    pub fn reset_id_counter() {
        NEXT_ENTITY_ID.with(|next| next.set(0));
        log::debug!("Entity id counter reset");
    }

    /// The id the next created entity will receive
    pub fn peek_next_id() -> EntityId {
        NEXT_ENTITY_ID.with(|next| EntityId(next.get()))
    }

    /// Get the entity ID
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Whether the entity is logically alive
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Flip the active flag
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Attach a component, replacing any existing component of the same kind.
    ///
    /// The replaced instance is dropped without `dispose` being called. Use
    /// [`Entity::replace_component`] to get it back and dispose it yourself.
    pub fn add_component<C: Component>(&mut self, mut component: C) -> &mut Self {
        component.set_entity(Some(self.id));
        if self.components.insert(TypeId::of::<C>(), Box::new(component)).is_some() {
            log::trace!("Entity {} replaced its {} without disposing it", self.id, type_name::<C>());
        }
        self
    }

    /// Attach a component and return the instance it replaced, detached but not disposed
    pub fn replace_component<C: Component>(&mut self, mut component: C) -> Option<C> {
        component.set_entity(Some(self.id));
        let previous = self.components.insert(TypeId::of::<C>(), Box::new(component))?;
        let mut previous = previous.into_any().downcast::<C>().ok()?;
        previous.set_entity(None);
        Some(*previous)
    }

    /// Get a component by kind
    pub fn get_component<C: Component>(&self) -> Option<&C> {
        self.components
            .get(&TypeId::of::<C>())
            .and_then(|component| (**component).as_any().downcast_ref::<C>())
    }

    /// Get a mutable component by kind
    pub fn get_component_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.components
            .get_mut(&TypeId::of::<C>())
            .and_then(|component| (**component).as_any_mut().downcast_mut::<C>())
    }

    /// Whether a component of this kind is attached
    pub fn has_component<C: Component>(&self) -> bool {
        self.components.contains_key(&TypeId::of::<C>())
    }

    /// Whether every listed component kind is attached
    pub fn has_all_component_types(&self, type_ids: &[TypeId]) -> bool {
        type_ids.iter().all(|type_id| self.components.contains_key(type_id))
    }

    /// Detach and dispose a component. Returns false when none was attached.
    pub fn remove_component<C: Component>(&mut self) -> bool {
        match self.components.remove(&TypeId::of::<C>()) {
            Some(mut component) => {
                component.set_entity(None);
                component.dispose();
                true
            }
            None => false,
        }
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Add a tag. Only this entity's own tag set changes; a manager that
    /// already registered the entity does not see it.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> &mut Self {
        self.tags.insert(tag.into());
        self
    }

    /// Remove a tag. Returns false when the tag was not present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    /// Check if entity has a specific tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Iterate over the entity's tags in sorted order
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Dispose every component, drop all tags and mark the entity inactive.
    ///
    /// Disposing an already-empty entity is a no-op.
    pub fn dispose(&mut self) {
        for (_, mut component) in self.components.drain() {
            component.dispose();
            component.set_entity(None);
        }
        self.tags.clear();
        self.active = false;
        self.disposed = true;
    }

    /// Whether [`Entity::dispose`] ran since the entity was created or last revived
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Clear the disposed mark so the entity can be rebuilt in place.
    ///
    /// Pools call this before attaching fresh components to an instance that
    /// was destroyed instead of despawned.
    pub fn revive(&mut self) {
        self.disposed = false;
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("active", &self.active)
            .field("disposed", &self.disposed)
            .field("components", &self.components.len())
            .field("tags", &self.tags)
            .finish()
    }
}
