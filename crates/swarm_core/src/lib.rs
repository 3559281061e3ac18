//! # Swarm Core
//!
//! Runtime substrate for real-time 2D action games with many short-lived
//! entities.
//!
//! ## Features
//!
//! - **Entities and components**: type-keyed components, tags, snapshot queries
//! - **Systems**: priority-ordered scheduling with pause awareness
//! - **Object pooling**: bounded pools and entity spawners that recycle ids
//! - **Events**: queued notifications with per-listener isolation
//! - **Configuration**: TOML/RON settings with defaults for every field
//!
//! ## Quick Start
//!
//! ```rust
//! use swarm_core::prelude::*;
//!
//! struct Spin;
//!
//! impl System for Spin {
//!     fn update(&mut self, world: &mut World, delta_time: f32) -> Result<(), SystemError> {
//!         for entity in world.entities.get_with_components::<(Transform,)>() {
//!             if let Some(transform) = entity.borrow_mut().get_component_mut::<Transform>() {
//!                 transform.rotation += delta_time;
//!             }
//!         }
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), RuntimeError> {
//!     let mut runtime = Runtime::with_config(CoreConfig::default())?;
//!     runtime.register_system(Box::new(MovementSystem::new()));
//!     runtime.register_system(Box::new(Spin));
//!
//!     runtime.world_mut().entities.create_with(|entity| {
//!         entity
//!             .add_component(Transform::default())
//!             .add_component(Velocity::new(Vec2::new(1.0, 0.0)))
//!             .add_tag("player");
//!     });
//!
//!     runtime.frame(1.0 / 60.0)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::must_use_candidate)]

pub mod config;
pub mod ecs;
pub mod events;
pub mod foundation;
pub mod pool;
pub mod render;

mod runtime;

pub use runtime::{Runtime, RuntimeError};

/// Common imports for gameplay code
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, CoreConfig, PoolSizing},
        ecs::{
            components::{ExpireAction, Health, Lifetime, Sprite, Transform, Velocity},
            systems::{DrawSystem, LifetimeSystem, MovementSystem, SpawnerReclaimSystem},
            Component, Entity, EntityId, EntityManager, EntityRef, System, SystemError, SystemId,
            SystemSettings, World,
        },
        events::{Event, EventArg, EventError, EventType},
        foundation::math::{Rect, Vec2},
        impl_component,
        pool::{EntitySpawner, ObjectPool, SpawnError, SpawnTemplate},
        render::{DrawCommand, DrawLayer, DrawQueue},
        Runtime, RuntimeError,
    };
}
