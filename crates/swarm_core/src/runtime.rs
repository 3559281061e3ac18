//! Frame driver
//!
//! [`Runtime`] owns the world, the scheduler, the frame timer and the draw
//! queue, and runs one frame at a time:
//!
//! ```text
//! time accounting → scheduler.update → event dispatch → scheduler.render → draw queue sort
//! ```

use thiserror::Error;

use crate::config::{Config, ConfigError, CoreConfig};
use crate::ecs::{Entity, SchedulerError, System, SystemId, SystemScheduler, World};
use crate::events::{Event, EventArg, EventType};
use crate::foundation::time::{FrameTime, FrameTimer};
use crate::pool::{EntitySpawner, RegistryError, SpawnTemplate};
use crate::render::DrawQueue;

/// Runtime-level errors
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// A system failed; the frame was aborted
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Configuration could not be loaded or is invalid
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Spawner registration failed
    #[error("Spawner error: {0}")]
    Registry(#[from] RegistryError),
}

/// Owns all runtime state and drives frames
pub struct Runtime {
    world: World,
    scheduler: SystemScheduler,
    timer: FrameTimer,
    draw_queue: DrawQueue,
    config: CoreConfig,
}

impl Runtime {
    /// Create a runtime from configuration
    pub fn new(config: CoreConfig) -> Self {
        log::info!(
            "Creating runtime (target {} fps, max frame delta {}s)",
            config.frame.target_fps,
            config.frame.max_frame_delta
        );
        Self {
            world: World::new(),
            scheduler: SystemScheduler::new(),
            timer: FrameTimer::new(config.frame.max_frame_delta),
            draw_queue: DrawQueue::new(),
            config,
        }
    }

    /// Validate the configuration, then create a runtime from it
    pub fn with_config(config: CoreConfig) -> Result<Self, RuntimeError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// The world systems operate on
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the world
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The system scheduler
    pub fn scheduler(&self) -> &SystemScheduler {
        &self.scheduler
    }

    /// Mutable access to the scheduler (enable/disable, priorities)
    pub fn scheduler_mut(&mut self) -> &mut SystemScheduler {
        &mut self.scheduler
    }

    /// Commands produced by the last render phase
    pub fn draw_queue(&self) -> &DrawQueue {
        &self.draw_queue
    }

    /// Active configuration
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Timing of the last frame
    pub fn time(&self) -> FrameTime {
        self.timer.current()
    }

    /// Register a system with the scheduler
    pub fn register_system(&mut self, system: Box<dyn System>) -> SystemId {
        self.scheduler.register(system)
    }

    /// Register a spawner sized by the `pools` configuration for its name
    pub fn register_spawner<T: SpawnTemplate>(&mut self, template: T) -> Result<(), RuntimeError> {
        let sizing = self.config.pools.sizing_for(template.name());
        self.world.spawners.register(EntitySpawner::from_sizing(template, &sizing))?;
        Ok(())
    }

    /// Initialize every registered system now instead of on first update
    pub fn initialize(&mut self) -> Result<(), RuntimeError> {
        self.scheduler.initialize_all(&mut self.world)?;
        Ok(())
    }

    /// Run one frame covering `delta` seconds (clamped to `max_frame_delta`).
    ///
    /// A system error aborts the frame: a `SystemFault` event is delivered and
    /// the error returned, the render phase does not run.
    pub fn frame(&mut self, delta: f32) -> Result<FrameTime, RuntimeError> {
        let time = self.timer.advance(delta);
        self.world.set_time(time);

        if let Err(error) = self.scheduler.update(&mut self.world, time.delta) {
            log::error!("Frame {} aborted: {}", time.frame, error);
            self.world.send_event(
                Event::new(EventType::SystemFault, f64::from(time.elapsed))
                    .with_arg("error", EventArg::Text(error.to_string())),
            );
            self.world.dispatch_events();
            return Err(error.into());
        }

        self.world.dispatch_events();

        self.draw_queue.clear();
        self.scheduler.render(&self.world, &mut self.draw_queue);
        self.draw_queue.sort();
        Ok(time)
    }

    /// Run one frame measured against the wall clock
    pub fn tick(&mut self) -> Result<FrameTime, RuntimeError> {
        let delta = self.timer.measure();
        self.frame(delta)
    }

    /// Pause simulation
    pub fn pause(&mut self) {
        self.world.pause();
    }

    /// Resume simulation
    pub fn resume(&mut self) {
        self.world.resume();
    }

    /// Whether simulation is paused
    pub fn is_paused(&self) -> bool {
        self.world.is_paused()
    }

    /// Start a fresh game.
    ///
    /// Returns every pooled entity to its pool, disposes all other entities,
    /// resets the entity id counter to 0 and rebuilds the pools so their
    /// entities take fresh ids. Systems stay registered and initialized.
    pub fn restart(&mut self) {
        let despawned = self.world.spawners.despawn_all(&mut self.world.entities);
        let cleared = self.world.entities.count();
        self.world.entities.clear();

        Entity::reset_id_counter();
        self.world.spawners.rebuild_all(&mut self.world.entities);

        self.timer.reset();
        self.world.set_time(self.timer.current());
        self.world.resume();
        self.world.events_mut().clear();
        self.draw_queue.clear();
        log::info!("Restarted: {} pooled and {} other entities released", despawned, cleared);
    }

    /// Dispose systems and release every entity
    pub fn shutdown(&mut self) {
        self.scheduler.dispose_all();
        self.world.spawners.despawn_all(&mut self.world.entities);
        self.world.entities.clear();
        self.world.events_mut().clear();
        self.draw_queue.clear();
        log::info!("Runtime shut down after {} frames", self.timer.frame_count());
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(CoreConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{SystemError, SystemSettings};
    use approx::assert_relative_eq;

    struct Failing;

    impl System for Failing {
        fn update(&mut self, _world: &mut World, _delta_time: f32) -> Result<(), SystemError> {
            Err(SystemError::Failed("out of ammo".into()))
        }
    }

    struct Counter(u32);

    impl System for Counter {
        fn settings(&self) -> SystemSettings {
            SystemSettings::with_priority(-1)
        }

        fn update(&mut self, _world: &mut World, _delta_time: f32) -> Result<(), SystemError> {
            self.0 += 1;
            Ok(())
        }
    }

    #[test]
    fn test_frame_clamps_delta() {
        let mut runtime = Runtime::default();
        let time = runtime.frame(5.0).expect("frame");
        assert_relative_eq!(time.delta, 0.25);
        assert_eq!(time.frame, 1);
        assert_relative_eq!(runtime.world().time().elapsed, 0.25);
    }

    #[test]
    fn test_system_error_aborts_frame() {
        let mut runtime = Runtime::default();
        runtime.register_system(Box::new(Counter(0)));
        runtime.register_system(Box::new(Failing));

        let error = runtime.frame(0.016).unwrap_err();
        assert!(matches!(error, RuntimeError::Scheduler(SchedulerError::Update { .. })));
        assert!(runtime.draw_queue().is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = CoreConfig::default();
        config.frame.max_frame_delta = 0.0;
        assert!(matches!(Runtime::with_config(config), Err(RuntimeError::Config(_))));
    }
}
