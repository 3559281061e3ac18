//! Sprite component: what the draw system submits for an entity

use crate::ecs::EntityId;
use crate::render::DrawLayer;

/// Visual representation of an entity
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    /// Sprite sheet or image key
    pub sprite_id: u32,
    /// RGBA tint
    pub color: [f32; 4],
    /// Layer the sprite is drawn on
    pub layer: DrawLayer,
    /// Sort key within the layer (lower draws first)
    pub depth: f32,
    /// Whether the sprite is drawn at all
    pub visible: bool,
    entity: Option<EntityId>,
}

crate::impl_component!(Sprite);

impl Sprite {
    /// Opaque white sprite on the world layer
    pub fn new(sprite_id: u32) -> Self {
        Self {
            sprite_id,
            color: [1.0; 4],
            layer: DrawLayer::World,
            depth: 0.0,
            visible: true,
            entity: None,
        }
    }

    /// Set tint (builder)
    #[must_use]
    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    /// Set layer and depth (builder)
    #[must_use]
    pub fn on_layer(mut self, layer: DrawLayer, depth: f32) -> Self {
        self.layer = layer;
        self.depth = depth;
        self
    }
}
