//! System scheduling
//!
//! Deterministic, single-threaded execution order: ascending priority, ties
//! broken by registration order. The order is recomputed only when
//! registration or priorities change.

use std::fmt;

use thiserror::Error;

use super::{System, SystemError, SystemSettings, World};
use crate::render::DrawQueue;

/// Unique identifier for registered systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SystemId(pub u64);

/// Lifecycle of a registered system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemState {
    /// Registered, `initialize` not yet called
    Uninitialized,
    /// `initialize` succeeded
    Initialized,
    /// `dispose` was called
    Disposed,
}

/// Fatal scheduler errors, each naming the failing system
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A system failed to initialize
    #[error("system '{name}' failed to initialize: {source}")]
    Initialize {
        /// System name
        name: String,
        /// Underlying error
        #[source]
        source: SystemError,
    },

    /// A system failed during update
    #[error("system '{name}' failed during update: {source}")]
    Update {
        /// System name
        name: String,
        /// Underlying error
        #[source]
        source: SystemError,
    },
}

struct SystemEntry {
    id: SystemId,
    name: String,
    settings: SystemSettings,
    state: SystemState,
    system: Box<dyn System>,
}

impl SystemEntry {
    fn initialize(&mut self, world: &mut World) -> Result<(), SchedulerError> {
        if self.state != SystemState::Uninitialized {
            return Ok(());
        }
        self.system
            .initialize(world)
            .map_err(|source| SchedulerError::Initialize {
                name: self.name.clone(),
                source,
            })?;
        self.state = SystemState::Initialized;
        log::debug!("Initialized system '{}'", self.name);
        Ok(())
    }
}

/// Owns registered systems and runs them in order each frame
#[derive(Default)]
pub struct SystemScheduler {
    entries: Vec<SystemEntry>,
    next_id: u64,
    order_dirty: bool,
}

impl SystemScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a system, taking its initial settings from `System::settings`
    pub fn register(&mut self, system: Box<dyn System>) -> SystemId {
        let id = SystemId(self.next_id);
        self.next_id += 1;

        let settings = system.settings();
        let name = system.name().to_owned();
        log::debug!(
            "Registered system '{}' (priority {}, enabled {}, during pause {})",
            name,
            settings.priority,
            settings.enabled,
            settings.updates_during_pause
        );

        self.entries.push(SystemEntry {
            id,
            name,
            settings,
            state: SystemState::Uninitialized,
            system,
        });
        self.order_dirty = true;
        id
    }

    /// Dispose and drop a system. Returns false for an unknown id.
    pub fn remove(&mut self, id: SystemId) -> bool {
        let Some(index) = self.entries.iter().position(|entry| entry.id == id) else {
            return false;
        };
        let mut entry = self.entries.remove(index);
        if entry.state != SystemState::Disposed {
            entry.system.dispose();
        }
        log::debug!("Removed system '{}'", entry.name);
        true
    }

    fn entry_mut(&mut self, id: SystemId) -> Option<&mut SystemEntry> {
        self.entries.iter_mut().find(|entry| entry.id == id)
    }

    /// Enable or disable a system
    pub fn set_enabled(&mut self, id: SystemId, enabled: bool) -> bool {
        self.entry_mut(id).map_or(false, |entry| {
            entry.settings.enabled = enabled;
            true
        })
    }

    /// Change a system's priority; takes effect on the next update
    pub fn set_priority(&mut self, id: SystemId, priority: i32) -> bool {
        let changed = self.entry_mut(id).map_or(false, |entry| {
            entry.settings.priority = priority;
            true
        });
        self.order_dirty |= changed;
        changed
    }

    /// Change whether a system updates while the world is paused
    pub fn set_updates_during_pause(&mut self, id: SystemId, during_pause: bool) -> bool {
        self.entry_mut(id).map_or(false, |entry| {
            entry.settings.updates_during_pause = during_pause;
            true
        })
    }

    /// Current settings of a system
    pub fn settings(&self, id: SystemId) -> Option<SystemSettings> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.settings)
    }

    /// Lifecycle state of a system
    pub fn state(&self, id: SystemId) -> Option<SystemState> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.state)
    }

    /// Number of registered systems
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no system is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sort_if_dirty(&mut self) {
        if self.order_dirty {
            // Ids grow with registration, so they break priority ties stably
            self.entries
                .sort_by_key(|entry| (entry.settings.priority, entry.id));
            self.order_dirty = false;
        }
    }

    /// System names in execution order
    pub fn execution_order(&mut self) -> Vec<&str> {
        self.sort_if_dirty();
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    /// Initialize every system that has not been initialized yet
    pub fn initialize_all(&mut self, world: &mut World) -> Result<(), SchedulerError> {
        self.sort_if_dirty();
        for entry in &mut self.entries {
            entry.initialize(world)?;
        }
        Ok(())
    }

    /// Run one update pass.
    ///
    /// Disabled and disposed systems are skipped. While the world is paused
    /// only systems flagged `updates_during_pause` run; the flag is checked
    /// for each system, so a system that resumes the world lets the later
    /// ones run in the same pass. The first error stops the pass.
    pub fn update(&mut self, world: &mut World, delta_time: f32) -> Result<(), SchedulerError> {
        self.sort_if_dirty();
        for entry in &mut self.entries {
            if !entry.settings.enabled || entry.state == SystemState::Disposed {
                continue;
            }
            if world.is_paused() && !entry.settings.updates_during_pause {
                continue;
            }

            entry.initialize(world)?;
            entry
                .system
                .update(world, delta_time)
                .map_err(|source| {
                    log::error!("System '{}' failed: {}", entry.name, source);
                    SchedulerError::Update {
                        name: entry.name.clone(),
                        source,
                    }
                })?;
        }
        Ok(())
    }

    /// Run the draw phase on enabled, initialized systems in execution order
    pub fn render(&mut self, world: &World, queue: &mut DrawQueue) {
        self.sort_if_dirty();
        for entry in &mut self.entries {
            if entry.settings.enabled && entry.state == SystemState::Initialized {
                entry.system.render(world, queue);
            }
        }
    }

    /// Dispose every system once. Systems stay registered but no longer run.
    pub fn dispose_all(&mut self) {
        for entry in &mut self.entries {
            if entry.state != SystemState::Disposed {
                entry.system.dispose();
                entry.state = SystemState::Disposed;
                log::debug!("Disposed system '{}'", entry.name);
            }
        }
    }
}

impl fmt::Debug for SystemScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemScheduler")
            .field("systems", &self.entries.len())
            .field("order_dirty", &self.order_dirty)
            .finish()
    }
}
