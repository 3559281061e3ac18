//! Movement system: integrates `Transform` by `Velocity`

use crate::ecs::components::{Transform, Velocity};
use crate::ecs::{EntityRef, System, SystemError, SystemSettings, World};

/// Moves every active entity that has both a transform and a velocity
#[derive(Debug, Default)]
pub struct MovementSystem {
    snapshot: Vec<EntityRef>,
}

impl MovementSystem {
    /// Default priority
    pub const PRIORITY: i32 = 100;

    /// Create the system
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for MovementSystem {
    fn name(&self) -> &str {
        "MovementSystem"
    }

    fn settings(&self) -> SystemSettings {
        SystemSettings::with_priority(Self::PRIORITY)
    }

    fn update(&mut self, world: &mut World, delta_time: f32) -> Result<(), SystemError> {
        world.entities.query_into::<(Transform, Velocity)>(&mut self.snapshot);

        for entity in &self.snapshot {
            let mut entity = entity.borrow_mut();
            if !entity.is_active() {
                continue;
            }
            let Some(velocity) = entity.get_component_mut::<Velocity>() else {
                continue;
            };
            velocity.integrate(delta_time);
            let displacement = velocity.displacement(delta_time);
            if let Some(transform) = entity.get_component_mut::<Transform>() {
                transform.translate(displacement);
            }
        }

        self.snapshot.clear();
        Ok(())
    }

    fn dispose(&mut self) {
        self.snapshot = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec2;
    use approx::assert_relative_eq;

    #[test]
    fn test_moves_active_entities_only() {
        let mut world = World::new();
        let moving = world.entities.create_with(|e| {
            e.add_component(Transform::default())
                .add_component(Velocity::new(Vec2::new(2.0, -4.0)));
        });
        let parked = world.entities.create_with(|e| {
            e.add_component(Transform::default())
                .add_component(Velocity::new(Vec2::new(2.0, -4.0)));
        });
        parked.borrow_mut().set_active(false);

        let mut system = MovementSystem::new();
        system.update(&mut world, 0.5).expect("update");

        let position = moving.borrow().get_component::<Transform>().map(|t| t.position);
        let position = position.expect("transform");
        assert_relative_eq!(position.x, 1.0);
        assert_relative_eq!(position.y, -2.0);
        assert_eq!(
            parked.borrow().get_component::<Transform>().map(|t| t.position),
            Some(Vec2::zeros())
        );
    }
}
