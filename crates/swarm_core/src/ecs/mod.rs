//! Entity-Component-System implementation
//!
//! Entities own their components and tags; the manager indexes entities;
//! systems run in priority order under the scheduler.

pub mod component;
pub mod components;
pub mod entity;
pub mod manager;
pub mod query;
pub mod scheduler;
pub mod system;
pub mod systems;
pub mod world;

pub use component::{AsAny, Component};
pub use entity::{Entity, EntityId, EntityRef};
pub use manager::{EntityManager, EntityObserver};
pub use query::ComponentQuery;
pub use scheduler::{SchedulerError, SystemId, SystemScheduler, SystemState};
pub use system::{System, SystemError, SystemSettings};
pub use world::World;
