//! Demo-specific components

use swarm_core::ecs::EntityId;

/// Damage dealt on contact
#[derive(Debug, Clone, PartialEq)]
pub struct Damage {
    /// Hit points removed per hit
    pub amount: f32,
    entity: Option<EntityId>,
}

swarm_core::impl_component!(Damage);

impl Damage {
    pub fn new(amount: f32) -> Self {
        Self { amount, entity: None }
    }
}

/// Enemy bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    /// Points awarded when destroyed
    pub points: u32,
    entity: Option<EntityId>,
}

swarm_core::impl_component!(Enemy);

impl Enemy {
    pub fn new(points: u32) -> Self {
        Self { points, entity: None }
    }
}
