//! Query system for component access
//!
//! A query names the component kinds an entity must carry, as a tuple:
//! `(Transform,)`, `(Transform, Velocity)`, up to six kinds.

use std::any::TypeId;

use super::{Component, Entity};

/// A set of component kinds to match entities against
pub trait ComponentQuery {
    /// Whether the entity carries every kind in the set
    fn matches(entity: &Entity) -> bool;

    /// The `TypeId`s of the kinds in the set
    fn type_ids() -> Vec<TypeId>;
}

macro_rules! impl_component_query {
    ($($kind:ident),+) => {
        impl<$($kind: Component),+> ComponentQuery for ($($kind,)+) {
            fn matches(entity: &Entity) -> bool {
                $(entity.has_component::<$kind>())&&+
            }

            fn type_ids() -> Vec<TypeId> {
                vec![$(TypeId::of::<$kind>()),+]
            }
        }
    };
}

impl_component_query!(A);
impl_component_query!(A, B);
impl_component_query!(A, B, C);
impl_component_query!(A, B, C, D);
impl_component_query!(A, B, C, D, E);
impl_component_query!(A, B, C, D, E, F);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::EntityId;

    #[derive(Default)]
    struct Alpha {
        entity: Option<EntityId>,
    }
    crate::impl_component!(Alpha);

    #[derive(Default)]
    struct Beta {
        entity: Option<EntityId>,
    }
    crate::impl_component!(Beta);

    #[test]
    fn test_tuple_queries_match_all_kinds() {
        let mut entity = Entity::new();
        entity.add_component(Alpha::default());

        assert!(<(Alpha,)>::matches(&entity));
        assert!(!<(Alpha, Beta)>::matches(&entity));

        entity.add_component(Beta::default());
        assert!(<(Alpha, Beta)>::matches(&entity));
        assert_eq!(<(Alpha, Beta)>::type_ids(), vec![TypeId::of::<Alpha>(), TypeId::of::<Beta>()]);
    }
}
