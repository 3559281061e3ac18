//! System trait
//!
//! Systems carry per-frame behavior. The [`SystemScheduler`](super::SystemScheduler)
//! owns them, decides their order and drives their lifecycle.

use std::any::type_name;

use thiserror::Error;

use super::World;
use crate::pool::SpawnError;
use crate::render::DrawQueue;

/// Errors a system can report from `initialize` or `update`.
///
/// A system error is fatal to the frame: the scheduler stops and hands it to
/// the frame driver.
#[derive(Debug, Error)]
pub enum SystemError {
    /// Generic failure with a description
    #[error("{0}")]
    Failed(String),

    /// A spawn the system could not tolerate failing
    #[error(transparent)]
    Spawn(#[from] SpawnError),
}

/// Scheduling settings a system starts with.
///
/// The scheduler copies them at registration and owns them from then on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemSettings {
    /// Ascending execution order; ties run in registration order
    pub priority: i32,
    /// Disabled systems are skipped by `update` and `render`
    pub enabled: bool,
    /// Keep receiving `update` while the world is paused
    pub updates_during_pause: bool,
}

impl SystemSettings {
    /// Default settings with the given priority
    pub const fn with_priority(priority: i32) -> Self {
        Self {
            priority,
            enabled: true,
            updates_during_pause: false,
        }
    }

    /// Start disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Keep updating while paused
    #[must_use]
    pub const fn during_pause(mut self) -> Self {
        self.updates_during_pause = true;
        self
    }
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self::with_priority(0)
    }
}

/// Per-frame behavior operating on a [`World`]
pub trait System {
    /// Name used in logs and errors
    fn name(&self) -> &str {
        type_name::<Self>()
    }

    /// Initial scheduling settings
    fn settings(&self) -> SystemSettings {
        SystemSettings::default()
    }

    /// Called exactly once before the first `update`
    fn initialize(&mut self, _world: &mut World) -> Result<(), SystemError> {
        Ok(())
    }

    /// Advance by `delta_time` seconds.
    ///
    /// Entities from a query snapshot may turn inactive during the pass;
    /// re-check activity and defer membership changes until after iterating.
    fn update(&mut self, world: &mut World, delta_time: f32) -> Result<(), SystemError>;

    /// Draw-phase hook
    fn render(&mut self, _world: &World, _queue: &mut DrawQueue) {}

    /// Release held references. Must not fail.
    fn dispose(&mut self) {}
}
