//! Returns inactive pooled entities to their spawners

use crate::ecs::{System, SystemError, SystemSettings, World};

/// Asks every registered spawner to despawn its inactive instances
#[derive(Debug, Default)]
pub struct SpawnerReclaimSystem;

impl SpawnerReclaimSystem {
    /// Default priority
    pub const PRIORITY: i32 = 1000;
}

impl System for SpawnerReclaimSystem {
    fn name(&self) -> &str {
        "SpawnerReclaimSystem"
    }

    fn settings(&self) -> SystemSettings {
        SystemSettings::with_priority(Self::PRIORITY)
    }

    fn update(&mut self, world: &mut World, _delta_time: f32) -> Result<(), SystemError> {
        let reclaimed = world.spawners.reclaim_all(&mut world.entities);
        if reclaimed > 0 {
            log::trace!("Reclaimed {} pooled entities", reclaimed);
        }
        Ok(())
    }
}
