//! Lifetime Component
//!
//! Tracks how long an entity has lived so the lifetime system can expire it.

use crate::ecs::EntityId;

/// What happens to an entity whose lifetime ran out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpireAction {
    /// Dispose and unregister the entity
    #[default]
    Destroy,
    /// Mark the entity inactive; its spawner reclaims it
    Deactivate,
}

/// Lifetime component for entities that should disappear after a duration
#[derive(Debug, Clone, PartialEq)]
pub struct Lifetime {
    /// Seconds lived so far
    pub elapsed: f32,
    /// How long the entity should live (in seconds, <= 0 means forever)
    pub duration: f32,
    /// Expiry behavior
    pub on_expire: ExpireAction,
    entity: Option<EntityId>,
}

crate::impl_component!(Lifetime);

impl Lifetime {
    /// Destroy after `duration` seconds
    pub fn new(duration: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration,
            on_expire: ExpireAction::Destroy,
            entity: None,
        }
    }

    /// Deactivate after `duration` seconds (pooled entities)
    pub fn pooled(duration: f32) -> Self {
        Self {
            on_expire: ExpireAction::Deactivate,
            ..Self::new(duration)
        }
    }

    /// Restart the clock with a new duration
    pub fn restart(&mut self, duration: f32) {
        self.elapsed = 0.0;
        self.duration = duration;
    }

    /// Advance the clock. Returns true once the lifetime has expired.
    pub fn advance(&mut self, delta_time: f32) -> bool {
        self.elapsed += delta_time.max(0.0);
        self.is_expired()
    }

    /// Check if this entity's lifetime has expired
    pub fn is_expired(&self) -> bool {
        if self.duration <= 0.0 {
            false // Infinite lifetime
        } else {
            self.elapsed >= self.duration
        }
    }

    /// Get remaining lifetime in seconds
    pub fn remaining(&self) -> f32 {
        if self.duration <= 0.0 {
            f32::INFINITY
        } else {
            (self.duration - self.elapsed).max(0.0)
        }
    }
}
