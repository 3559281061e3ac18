//! ECS Systems module
//!
//! Built-in systems and their default priorities:
//!
//! | system                  | priority |
//! |-------------------------|----------|
//! | [`MovementSystem`]      | 100      |
//! | [`LifetimeSystem`]      | 900      |
//! | [`SpawnerReclaimSystem`]| 1000     |
//! | [`DrawSystem`]          | 2000     |

pub mod draw;
pub mod lifetime;
pub mod movement;
pub mod reclaim;

pub use draw::DrawSystem;
pub use lifetime::LifetimeSystem;
pub use movement::MovementSystem;
pub use reclaim::SpawnerReclaimSystem;
