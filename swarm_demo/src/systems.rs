//! Gameplay systems driving the demo

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use swarm_core::prelude::*;

use crate::components::{Damage, Enemy};
use crate::templates::{EnemyParams, EnemyTemplate, ProjectileParams, ProjectileTemplate, ENEMIES, PROJECTILES};

/// Event sent when an enemy dies, with `points` and `position` args
pub const ENEMY_KILLED: EventType = EventType::Custom("enemy_killed");

/// Spawns enemies along the top edge of the arena at a fixed interval
pub struct WaveSystem {
    arena: Rect,
    interval: f32,
    timer: f32,
    rng: StdRng,
}

impl WaveSystem {
    pub const PRIORITY: i32 = 10;

    pub fn new(arena: Rect, interval: f32, seed: u64) -> Self {
        Self {
            arena,
            interval: interval.max(f32::EPSILON),
            timer: 0.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl System for WaveSystem {
    fn name(&self) -> &str {
        "WaveSystem"
    }

    fn settings(&self) -> SystemSettings {
        SystemSettings::with_priority(Self::PRIORITY)
    }

    fn update(&mut self, world: &mut World, delta_time: f32) -> Result<(), SystemError> {
        self.timer += delta_time;
        while self.timer >= self.interval {
            self.timer -= self.interval;

            let params = EnemyParams {
                position: Vec2::new(self.rng.gen_range(self.arena.min.x..self.arena.max.x), self.arena.max.y),
                velocity: Vec2::new(self.rng.gen_range(-20.0..20.0), -self.rng.gen_range(40.0..90.0)),
                health: f32::from(self.rng.gen_range(1_u8..=3)),
                points: self.rng.gen_range(10..=30),
            };
            match world.spawn::<EnemyTemplate>(ENEMIES, params) {
                Ok(_) => {}
                // Full wave on screen; try again next interval
                Err(SpawnError::PoolExhausted { .. }) => break,
                Err(error) => return Err(error.into()),
            }
        }
        Ok(())
    }
}

/// Fixed turret firing at the closest enemy
pub struct TurretSystem {
    position: Vec2,
    fire_interval: f32,
    cooldown: f32,
    spread: f32,
    rng: StdRng,
}

impl TurretSystem {
    pub const PRIORITY: i32 = 20;

    pub fn new(position: Vec2, fire_interval: f32, seed: u64) -> Self {
        Self {
            position,
            fire_interval,
            cooldown: 0.0,
            spread: 0.05,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn closest_enemy(&self, world: &World) -> Option<Vec2> {
        world
            .entities
            .get_by_tag("enemy")
            .iter()
            .filter_map(|enemy| {
                let enemy = enemy.borrow();
                if !enemy.is_active() {
                    return None;
                }
                enemy.get_component::<Transform>().map(|t| t.position)
            })
            .min_by(|a, b| (*a - self.position).norm_squared().total_cmp(&(*b - self.position).norm_squared()))
    }
}

impl System for TurretSystem {
    fn name(&self) -> &str {
        "TurretSystem"
    }

    fn settings(&self) -> SystemSettings {
        SystemSettings::with_priority(Self::PRIORITY)
    }

    fn update(&mut self, world: &mut World, delta_time: f32) -> Result<(), SystemError> {
        self.cooldown -= delta_time;
        if self.cooldown > 0.0 {
            return Ok(());
        }
        let Some(target) = self.closest_enemy(world) else {
            return Ok(());
        };

        let aim = target - self.position;
        let angle = aim.y.atan2(aim.x) + self.rng.gen_range(-self.spread..=self.spread);
        let params = ProjectileParams {
            origin: self.position,
            direction: Vec2::new(angle.cos(), angle.sin()),
            speed: 420.0,
            damage: 1.0,
        };

        match world.spawn::<ProjectileTemplate>(PROJECTILES, params) {
            Ok(_) => self.cooldown = self.fire_interval,
            Err(SpawnError::PoolExhausted { .. }) => log::debug!("Turret out of projectiles"),
            Err(error) => return Err(error.into()),
        }
        Ok(())
    }
}

/// Resolves projectile hits against enemies.
///
/// Spent projectiles and dead enemies are only deactivated here; the reclaim
/// system returns them to their pools at the end of the frame.
#[derive(Default)]
pub struct CombatSystem {
    projectiles: Vec<EntityRef>,
    enemies: Vec<EntityRef>,
}

impl CombatSystem {
    pub const PRIORITY: i32 = 200;

    pub fn new() -> Self {
        Self::default()
    }
}

impl System for CombatSystem {
    fn name(&self) -> &str {
        "CombatSystem"
    }

    fn settings(&self) -> SystemSettings {
        SystemSettings::with_priority(Self::PRIORITY)
    }

    fn update(&mut self, world: &mut World, _delta_time: f32) -> Result<(), SystemError> {
        world.entities.query_into::<(Transform, Damage)>(&mut self.projectiles);
        world.entities.query_into::<(Transform, Health, Enemy)>(&mut self.enemies);

        for projectile in &self.projectiles {
            let mut projectile = projectile.borrow_mut();
            if !projectile.is_active() {
                continue;
            }
            let (Some(bounds), Some(damage)) = (
                projectile.get_component::<Transform>().map(Transform::bounds),
                projectile.get_component::<Damage>().map(|d| d.amount),
            ) else {
                continue;
            };

            let hit = self.enemies.iter().find(|enemy| {
                let enemy = enemy.borrow();
                enemy.is_active()
                    && enemy
                        .get_component::<Transform>()
                        .is_some_and(|t| t.bounds().intersects(&bounds))
            });
            let Some(enemy) = hit else {
                continue;
            };

            projectile.set_active(false);
            let mut enemy = enemy.borrow_mut();
            let lethal = enemy
                .get_component_mut::<Health>()
                .is_some_and(|health| health.apply_damage(damage));
            if !lethal {
                continue;
            }

            enemy.set_active(false);
            let points = enemy.get_component::<Enemy>().map_or(0, |e| e.points);
            let position = enemy.get_component::<Transform>().map_or_else(Vec2::zeros, |t| t.position);
            world.send_event(
                Event::new(ENEMY_KILLED, f64::from(world.time().elapsed))
                    .with_arg("points", EventArg::Count(points as usize))
                    .with_arg("position", EventArg::Position(position.x, position.y)),
            );
        }

        self.projectiles.clear();
        self.enemies.clear();
        Ok(())
    }

    fn dispose(&mut self) {
        self.projectiles = Vec::new();
        self.enemies = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_pools() -> World {
        let mut world = World::new();
        world
            .spawners
            .register(EntitySpawner::new(ProjectileTemplate, 2, 2))
            .expect("register");
        world
            .spawners
            .register(EntitySpawner::new(EnemyTemplate, 2, 2))
            .expect("register");
        world
    }

    fn enemy_at(world: &mut World, position: Vec2, health: f32) -> EntityRef {
        world
            .spawn::<EnemyTemplate>(
                ENEMIES,
                EnemyParams {
                    position,
                    velocity: Vec2::zeros(),
                    health,
                    points: 25,
                },
            )
            .expect("spawn enemy")
    }

    #[test]
    fn test_lethal_hit_deactivates_both_and_reports_kill() {
        let mut world = world_with_pools();
        let enemy = enemy_at(&mut world, Vec2::new(0.0, 50.0), 1.0);
        let shot = world
            .spawn::<ProjectileTemplate>(
                PROJECTILES,
                ProjectileParams {
                    origin: Vec2::new(0.0, 50.0),
                    direction: Vec2::new(0.0, 1.0),
                    speed: 0.0,
                    damage: 1.0,
                },
            )
            .expect("spawn shot");
        world.dispatch_events();

        let points = std::rc::Rc::new(std::cell::Cell::new(0));
        let sink = std::rc::Rc::clone(&points);
        world.events_mut().subscribe(
            ENEMY_KILLED,
            Box::new(move |event: &Event| -> Result<(), EventError> {
                sink.set(event.get_arg("points").map_or(0, |arg| match arg {
                    EventArg::Count(points) => *points,
                    _ => 0,
                }));
                Ok(())
            }),
        );

        CombatSystem::new().update(&mut world, 0.016).expect("update");
        world.dispatch_events();

        assert!(!shot.borrow().is_active());
        assert!(!enemy.borrow().is_active());
        assert_eq!(points.get(), 25);
    }

    #[test]
    fn test_misses_leave_everything_active() {
        let mut world = world_with_pools();
        let enemy = enemy_at(&mut world, Vec2::new(100.0, 100.0), 1.0);
        let shot = world
            .spawn::<ProjectileTemplate>(
                PROJECTILES,
                ProjectileParams {
                    origin: Vec2::new(-100.0, -100.0),
                    direction: Vec2::new(0.0, 1.0),
                    speed: 0.0,
                    damage: 1.0,
                },
            )
            .expect("spawn shot");

        CombatSystem::new().update(&mut world, 0.016).expect("update");
        assert!(shot.borrow().is_active());
        assert!(enemy.borrow().is_active());
    }

    #[test]
    fn test_wave_stops_at_pool_capacity() {
        let mut world = world_with_pools();
        let arena = Rect::from_center_size(Vec2::zeros(), Vec2::new(800.0, 600.0));
        let mut waves = WaveSystem::new(arena, 0.1, 7);

        waves.update(&mut world, 1.0).expect("update");
        assert_eq!(world.entities.count_by_tag("enemy"), 2);
    }

    #[test]
    fn test_turret_waits_for_targets_and_cooldown() {
        let mut world = world_with_pools();
        let mut turret = TurretSystem::new(Vec2::new(0.0, -280.0), 0.5, 3);

        turret.update(&mut world, 0.016).expect("update");
        assert_eq!(world.entities.count_by_tag("projectile"), 0);

        enemy_at(&mut world, Vec2::new(0.0, 200.0), 1.0);
        turret.update(&mut world, 0.016).expect("update");
        turret.update(&mut world, 0.016).expect("update");
        assert_eq!(world.entities.count_by_tag("projectile"), 1);
    }
}
