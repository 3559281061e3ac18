//! Transform component
//!
//! Pure data: world-space position (center), size and rotation of an entity.

use crate::ecs::EntityId;
use crate::foundation::math::{Rect, Vec2};

/// World-space placement of an entity
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Center position
    pub position: Vec2,
    /// Full width and height
    pub size: Vec2,
    /// Rotation in radians
    pub rotation: f32,
    entity: Option<EntityId>,
}

crate::impl_component!(Transform);

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec2::zeros(), Vec2::new(1.0, 1.0))
    }
}

impl Transform {
    /// Create from position and size
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            rotation: 0.0,
            entity: None,
        }
    }

    /// Create from position only, unit size
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Axis-aligned bounds, ignoring rotation
    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.position, self.size)
    }

    /// Move by an offset
    pub fn translate(&mut self, offset: Vec2) {
        self.position += offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bounds_are_centered() {
        let transform = Transform::new(Vec2::new(10.0, 20.0), Vec2::new(4.0, 2.0));
        let bounds = transform.bounds();

        assert_relative_eq!(bounds.min.x, 8.0);
        assert_relative_eq!(bounds.max.y, 21.0);
        assert!(bounds.contains(Vec2::new(10.0, 20.0)));
    }

    #[test]
    fn test_translate() {
        let mut transform = Transform::from_position(Vec2::new(1.0, 1.0));
        transform.translate(Vec2::new(2.0, -1.0));
        assert_eq!(transform.position, Vec2::new(3.0, 0.0));
    }
}
