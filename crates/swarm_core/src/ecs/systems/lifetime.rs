//! Lifetime system: expires entities whose `Lifetime` ran out.
//!
//! Expired entities are collected during the scan and handled after it, so
//! the snapshot being iterated is never mutated.

use std::rc::Rc;

use crate::ecs::components::{ExpireAction, Lifetime};
use crate::ecs::{EntityRef, System, SystemError, SystemSettings, World};
use crate::foundation::collections::ScratchList;

/// Advances lifetimes and expires entities
#[derive(Debug, Default)]
pub struct LifetimeSystem {
    snapshot: Vec<EntityRef>,
    expired: ScratchList<(EntityRef, ExpireAction)>,
}

impl LifetimeSystem {
    /// Default priority
    pub const PRIORITY: i32 = 900;

    /// Create the system
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for LifetimeSystem {
    fn name(&self) -> &str {
        "LifetimeSystem"
    }

    fn settings(&self) -> SystemSettings {
        SystemSettings::with_priority(Self::PRIORITY)
    }

    fn update(&mut self, world: &mut World, delta_time: f32) -> Result<(), SystemError> {
        world.entities.query_into::<(Lifetime,)>(&mut self.snapshot);

        for entity in &self.snapshot {
            let mut borrowed = entity.borrow_mut();
            if !borrowed.is_active() {
                continue;
            }
            if let Some(lifetime) = borrowed.get_component_mut::<Lifetime>() {
                if lifetime.advance(delta_time) {
                    self.expired.push((Rc::clone(entity), lifetime.on_expire));
                }
            }
        }
        self.snapshot.clear();

        for (entity, action) in self.expired.drain() {
            match action {
                ExpireAction::Deactivate => entity.borrow_mut().set_active(false),
                ExpireAction::Destroy => {
                    // Pooled entities go back to their spawner instead of being disposed
                    if !world.spawners.despawn(&mut world.entities, &entity) {
                        world.entities.destroy(&entity);
                    }
                }
            }
        }
        Ok(())
    }

    fn dispose(&mut self) {
        self.snapshot = Vec::new();
        self.expired.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_actions() {
        let mut world = World::new();
        let short = world.entities.create_with(|e| {
            e.add_component(Lifetime::new(1.0));
        });
        let pooled = world.entities.create_with(|e| {
            e.add_component(Lifetime::pooled(1.0));
        });
        let long = world.entities.create_with(|e| {
            e.add_component(Lifetime::new(10.0));
        });

        let mut system = LifetimeSystem::new();
        system.update(&mut world, 0.6).expect("update");
        assert_eq!(world.entities.count(), 3);

        system.update(&mut world, 0.6).expect("update");
        assert!(!world.entities.contains(&short));
        assert_eq!(short.borrow().component_count(), 0);

        // Deactivated, still registered, components kept
        assert!(world.entities.contains(&pooled));
        assert!(!pooled.borrow().is_active());
        assert!(pooled.borrow().has_component::<Lifetime>());

        assert!(long.borrow().is_active());
    }
}
