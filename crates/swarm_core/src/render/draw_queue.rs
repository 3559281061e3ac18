//! Draw queue filled during the render phase

use serde::{Deserialize, Serialize};

use crate::ecs::EntityId;
use crate::foundation::math::Vec2;

/// Draw layers, executed in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DrawLayer {
    /// Gameplay entities
    #[default]
    World,
    /// Particles and other transient effects drawn over the world
    Effects,
    /// Overlay drawn last, in submission order
    Ui,
}

/// A single sprite draw
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    /// Entity the command was generated for, if any
    pub entity: Option<EntityId>,
    /// Sprite sheet or image key
    pub sprite_id: u32,
    /// Center position in world space
    pub position: Vec2,
    /// Full width and height
    pub size: Vec2,
    /// Rotation in radians
    pub rotation: f32,
    /// RGBA tint
    pub color: [f32; 4],
    /// Sort key within its layer
    pub depth: f32,
}

impl DrawCommand {
    /// Untinted, unrotated draw at depth 0
    pub fn new(sprite_id: u32, position: Vec2, size: Vec2) -> Self {
        Self {
            entity: None,
            sprite_id,
            position,
            size,
            rotation: 0.0,
            color: [1.0; 4],
            depth: 0.0,
        }
    }

    /// Attach the owning entity (builder)
    #[must_use]
    pub fn for_entity(mut self, entity: EntityId) -> Self {
        self.entity = Some(entity);
        self
    }

    /// Set rotation (builder)
    #[must_use]
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set tint (builder)
    #[must_use]
    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    /// Set sort depth (builder)
    #[must_use]
    pub fn with_depth(mut self, depth: f32) -> Self {
        self.depth = depth;
        self
    }
}

/// Per-frame list of draw commands grouped by layer
#[derive(Debug, Default)]
pub struct DrawQueue {
    world: Vec<DrawCommand>,
    effects: Vec<DrawCommand>,
    ui: Vec<DrawCommand>,
}

impl DrawQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every command, keeping allocations for the next frame
    pub fn clear(&mut self) {
        self.world.clear();
        self.effects.clear();
        self.ui.clear();
    }

    /// Queue a command on a layer
    pub fn submit(&mut self, layer: DrawLayer, command: DrawCommand) {
        match layer {
            DrawLayer::World => self.world.push(command),
            DrawLayer::Effects => self.effects.push(command),
            DrawLayer::Ui => self.ui.push(command),
        }
    }

    /// Sort world and effect layers by ascending depth.
    ///
    /// The sort is stable, so equal depths keep submission order. UI stays in
    /// submission order.
    pub fn sort(&mut self) {
        self.world.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        self.effects.sort_by(|a, b| a.depth.total_cmp(&b.depth));
    }

    /// Visit commands layer by layer in draw order
    pub fn execute<F>(&self, mut draw: F)
    where
        F: FnMut(DrawLayer, &DrawCommand),
    {
        for command in &self.world {
            draw(DrawLayer::World, command);
        }
        for command in &self.effects {
            draw(DrawLayer::Effects, command);
        }
        for command in &self.ui {
            draw(DrawLayer::Ui, command);
        }
    }

    /// Commands queued on one layer
    pub fn layer(&self, layer: DrawLayer) -> &[DrawCommand] {
        match layer {
            DrawLayer::World => &self.world,
            DrawLayer::Effects => &self.effects,
            DrawLayer::Ui => &self.ui,
        }
    }

    /// Total number of queued commands
    pub fn len(&self) -> usize {
        self.world.len() + self.effects.len() + self.ui.len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
