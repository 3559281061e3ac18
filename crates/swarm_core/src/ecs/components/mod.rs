//! ECS Components module
//!
//! Built-in component kinds shared by the core systems. Gameplay crates add
//! their own kinds with [`impl_component!`](crate::impl_component).

pub mod health;
pub mod lifetime;
pub mod sprite;
pub mod transform;
pub mod velocity;

pub use health::Health;
pub use lifetime::{ExpireAction, Lifetime};
pub use sprite::Sprite;
pub use transform::Transform;
pub use velocity::Velocity;
