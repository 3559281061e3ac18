//! Object pooling
//!
//! - [`ObjectPool`]: bounded free list / active set of reusable instances
//! - [`EntitySpawner`]: entities recycled through a pool and a template
//! - [`SpawnerRegistry`]: named spawners reachable from the world

pub mod object_pool;
pub mod registry;
pub mod spawner;

pub use object_pool::{ObjectPool, PoolHandle, PoolKey, PoolStats};
pub use registry::{ManagedSpawner, RegistryError, SpawnerRegistry};
pub use spawner::{EntitySpawner, SpawnError, SpawnTemplate, SpawnerStats};
