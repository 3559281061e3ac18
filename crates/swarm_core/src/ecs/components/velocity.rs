//! Velocity component for entities that move in the 2D plane

use crate::ecs::EntityId;
use crate::foundation::math::Vec2;

/// Linear motion of an entity
#[derive(Debug, Clone, PartialEq)]
pub struct Velocity {
    /// Units per second
    pub linear: Vec2,

    /// Maximum speed limit (0 = no limit)
    pub max_speed: f32,

    /// Damping factor per second (0 = no damping, 1 = stops within a second)
    pub damping: f32,

    /// Whether movement is enabled
    pub enabled: bool,

    entity: Option<EntityId>,
}

crate::impl_component!(Velocity);

impl Default for Velocity {
    fn default() -> Self {
        Self::new(Vec2::zeros())
    }
}

impl Velocity {
    /// Create with an initial velocity and no limits
    pub fn new(linear: Vec2) -> Self {
        Self {
            linear,
            max_speed: 0.0,
            damping: 0.0,
            enabled: true,
            entity: None,
        }
    }

    /// Set maximum speed (builder)
    #[must_use]
    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = max_speed.max(0.0);
        self
    }

    /// Set damping (builder)
    #[must_use]
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping.clamp(0.0, 1.0);
        self
    }

    /// Apply speed limit and damping for one step
    pub fn integrate(&mut self, delta_time: f32) {
        if !self.enabled {
            return;
        }

        if self.max_speed > 0.0 {
            let speed = self.linear.magnitude();
            if speed > self.max_speed {
                self.linear = self.linear.normalize() * self.max_speed;
            }
        }

        if self.damping > 0.0 {
            self.linear *= (1.0 - self.damping * delta_time).max(0.0);
        }
    }

    /// Position change for this step
    pub fn displacement(&self, delta_time: f32) -> Vec2 {
        if self.enabled {
            self.linear * delta_time
        } else {
            Vec2::zeros()
        }
    }

    /// Stop all movement
    pub fn stop(&mut self) {
        self.linear = Vec2::zeros();
    }
}
