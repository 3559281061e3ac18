//! Draw system: one draw command per visible sprite

use crate::ecs::components::{Sprite, Transform};
use crate::ecs::{EntityRef, System, SystemError, SystemSettings, World};
use crate::render::{DrawCommand, DrawQueue};

/// Submits a [`DrawCommand`] for every active entity with a transform and a visible sprite
#[derive(Debug, Default)]
pub struct DrawSystem {
    snapshot: Vec<EntityRef>,
}

impl DrawSystem {
    /// Default priority
    pub const PRIORITY: i32 = 2000;

    /// Create the system
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for DrawSystem {
    fn name(&self) -> &str {
        "DrawSystem"
    }

    fn settings(&self) -> SystemSettings {
        SystemSettings::with_priority(Self::PRIORITY)
    }

    fn update(&mut self, _world: &mut World, _delta_time: f32) -> Result<(), SystemError> {
        Ok(())
    }

    fn render(&mut self, world: &World, queue: &mut DrawQueue) {
        world.entities.query_into::<(Transform, Sprite)>(&mut self.snapshot);

        for entity in &self.snapshot {
            let entity = entity.borrow();
            let (Some(transform), Some(sprite)) =
                (entity.get_component::<Transform>(), entity.get_component::<Sprite>())
            else {
                continue;
            };
            if !entity.is_active() || !sprite.visible {
                continue;
            }

            let command = DrawCommand::new(sprite.sprite_id, transform.position, transform.size)
                .for_entity(entity.id())
                .with_rotation(transform.rotation)
                .with_color(sprite.color)
                .with_depth(sprite.depth);
            queue.submit(sprite.layer, command);
        }
        self.snapshot.clear();
    }

    fn dispose(&mut self) {
        self.snapshot = Vec::new();
    }
}
