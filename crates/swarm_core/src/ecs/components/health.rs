//! Health component

use crate::ecs::EntityId;

/// Hit points of a damageable entity
#[derive(Debug, Clone, PartialEq)]
pub struct Health {
    /// Current hit points, never below 0 or above `max`
    pub current: f32,
    /// Maximum hit points
    pub max: f32,
    entity: Option<EntityId>,
}

crate::impl_component!(Health);

impl Health {
    /// Full health with the given maximum
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self {
            current: max,
            max,
            entity: None,
        }
    }

    /// Subtract damage. Returns true when this hit was lethal.
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        let was_alive = !self.is_dead();
        self.current = (self.current - amount.max(0.0)).max(0.0);
        was_alive && self.is_dead()
    }

    /// Restore hit points up to `max`
    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount.max(0.0)).min(self.max);
    }

    /// Whether hit points reached zero
    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    /// Back to full health (pooled reuse)
    pub fn reset(&mut self, max: f32) {
        self.max = max.max(0.0);
        self.current = self.max;
    }
}
