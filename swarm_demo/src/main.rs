//! Headless swarm demo
//!
//! Runs a turret-versus-waves scenario for a fixed number of frames, restarts
//! it, and runs it again, logging pool statistics along the way.
//!
//! ```text
//! swarm_demo [config.toml|config.ron] [frames]
//! ```

mod components;
mod error;
mod systems;
mod templates;

use std::cell::Cell;
use std::rc::Rc;

use swarm_core::foundation::logging;
use swarm_core::prelude::*;

use crate::error::DemoError;
use crate::systems::{CombatSystem, TurretSystem, WaveSystem, ENEMY_KILLED};
use crate::templates::{EnemyTemplate, ProjectileTemplate};

const DEFAULT_FRAMES: u64 = 600;
const SEED: u64 = 0x5eed;

fn main() -> Result<(), DemoError> {
    let mut args = std::env::args().skip(1);
    let config = load_config(args.next().as_deref())?;
    let frames = args.next().map(|arg| arg.parse::<u64>()).transpose()?.unwrap_or(DEFAULT_FRAMES);

    log::info!("Starting swarm demo ({} frames per session)", frames);

    let result = run(config, frames);
    match &result {
        Ok(()) => log::info!("Swarm demo completed successfully"),
        Err(e) => log::error!("Swarm demo failed: {}", e),
    }
    result
}

/// Load the configuration and install the logger at its level.
///
/// The logger cannot exist before the level is known, so the source is
/// logged once it does.
fn load_config(path: Option<&str>) -> Result<CoreConfig, DemoError> {
    let Some(path) = path else {
        let config = CoreConfig::default();
        logging::init_with_filter(&config.logging.level);
        log::info!("Using default configuration");
        return Ok(config);
    };

    match CoreConfig::load_from_file(path) {
        Ok(config) => {
            logging::init_with_filter(&config.logging.level);
            log::info!("Using configuration from {}", path);
            Ok(config)
        }
        Err(e) => {
            logging::init();
            log::error!("Could not load configuration from {}: {}", path, e);
            Err(e.into())
        }
    }
}

fn run(config: CoreConfig, frames: u64) -> Result<(), DemoError> {
    let arena = Rect::from_center_size(Vec2::zeros(), Vec2::new(800.0, 600.0));
    let turret = Vec2::new(0.0, arena.min.y + 20.0);

    let mut runtime = Runtime::with_config(config)?;
    runtime.register_spawner(ProjectileTemplate)?;
    runtime.register_spawner(EnemyTemplate)?;

    runtime.register_system(Box::new(WaveSystem::new(arena, 0.4, SEED)));
    runtime.register_system(Box::new(TurretSystem::new(turret, 0.15, SEED + 1)));
    runtime.register_system(Box::new(MovementSystem::new()));
    runtime.register_system(Box::new(CombatSystem::new()));
    runtime.register_system(Box::new(LifetimeSystem::new()));
    runtime.register_system(Box::new(SpawnerReclaimSystem));
    runtime.register_system(Box::new(DrawSystem::new()));
    runtime.initialize()?;
    log::info!("Execution order: {:?}", runtime.scheduler_mut().execution_order());

    let score = Rc::new(Cell::new(0_usize));
    let kills = Rc::new(Cell::new(0_usize));
    {
        let (score, kills) = (Rc::clone(&score), Rc::clone(&kills));
        runtime.world().events_mut().subscribe(
            ENEMY_KILLED,
            Box::new(move |event: &Event| -> Result<(), EventError> {
                if let Some(EventArg::Count(points)) = event.get_arg("points") {
                    score.set(score.get() + points);
                }
                kills.set(kills.get() + 1);
                Ok(())
            }),
        );
    }
    runtime.world().events_mut().subscribe(
        EventType::SpawnExhausted,
        Box::new(|event: &Event| -> Result<(), EventError> {
            log::debug!("Pool exhausted: {:?}", event.get_arg("spawner"));
            Ok(())
        }),
    );

    for session in 1..=2 {
        run_session(&mut runtime, frames)?;
        log::info!(
            "Session {}: {} kills, score {}, {} entities alive, {} draw commands",
            session,
            kills.get(),
            score.get(),
            runtime.world().entities.count(),
            runtime.draw_queue().len()
        );
        log_pool_stats(&runtime);

        runtime.restart();
        score.set(0);
        kills.set(0);
    }

    runtime.shutdown();
    Ok(())
}

fn run_session(runtime: &mut Runtime, frames: u64) -> Result<(), DemoError> {
    let delta = runtime.config().frame.fixed_delta();
    for frame in 0..frames {
        // Exercise pause handling halfway through
        if frame == frames / 2 {
            runtime.pause();
            runtime.frame(delta)?;
            runtime.resume();
        }
        runtime.frame(delta)?;
    }
    Ok(())
}

fn log_pool_stats(runtime: &Runtime) {
    for stats in runtime.world().spawners.stats() {
        log::info!(
            "  {:<12} active {:>3}  free {:>3}  max {:>3}  spawned {:>5}  despawned {:>5}  refused {:>4}  peak {:>3}",
            stats.name,
            stats.active,
            stats.free,
            stats.max,
            stats.spawned,
            stats.despawned,
            stats.failed,
            stats.pool.peak_active
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_installs_logger() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml");
        let config = load_config(Some(path)).expect("demo config loads");

        assert_ne!(log::max_level(), log::LevelFilter::Off);
        let projectiles = config.pools.sizing_for("projectiles");
        assert_eq!((projectiles.initial_size, projectiles.max_size), (32, 64));
        let enemies = config.pools.sizing_for("enemies");
        assert_eq!((enemies.initial_size, enemies.max_size), (8, 24));
    }
}
