//! Component trait and type-erasure helpers

use std::any::Any;

use super::EntityId;

/// Type-erasure helper implemented for every `'static` type.
///
/// Lets the entity keep components as `Box<dyn Component>` and still hand out
/// `&C` / `&mut C` by downcasting on the component's `TypeId`.
pub trait AsAny: Any {
    /// Borrow as `&dyn Any`
    fn as_any(&self) -> &dyn Any;
    /// Borrow as `&mut dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Convert a boxed value into `Box<dyn Any>`
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A unit of per-entity state.
///
/// A component is owned by at most one entity at a time. It carries a
/// non-owning back-reference to that entity in the form of its [`EntityId`];
/// the id is resolved through the `EntityManager` when needed. The entity (or
/// a pool reusing the component) sets and clears the back-reference, a
/// component never assigns it to itself.
///
/// Components with a plain `entity: Option<EntityId>` field can use
/// [`impl_component!`](crate::impl_component) instead of writing the two
/// accessors by hand.
pub trait Component: AsAny {
    /// The entity currently owning this component
    fn entity(&self) -> Option<EntityId>;

    /// Set or clear the owning entity
    fn set_entity(&mut self, entity: Option<EntityId>);

    /// Release anything the component holds. Must not panic.
    ///
    /// Called when the component is removed from its entity or the entity is
    /// disposed. Pooled components are reset instead and never see this.
    fn dispose(&mut self) {
        self.set_entity(None);
    }
}

/// Implement [`Component`] for a struct with an `entity: Option<EntityId>` field.
///
/// ```
/// use swarm_core::ecs::EntityId;
///
/// #[derive(Debug, Default)]
/// struct Shield {
///     strength: f32,
///     entity: Option<EntityId>,
/// }
///
/// swarm_core::impl_component!(Shield);
/// ```
#[macro_export]
macro_rules! impl_component {
    ($ty:ty) => {
        impl $crate::ecs::Component for $ty {
            fn entity(&self) -> ::std::option::Option<$crate::ecs::EntityId> {
                self.entity
            }

            fn set_entity(&mut self, entity: ::std::option::Option<$crate::ecs::EntityId>) {
                self.entity = entity;
            }
        }
    };
}
