//! Pooled entity templates

use swarm_core::prelude::*;

use crate::components::{Damage, Enemy};

pub const PROJECTILES: &str = "projectiles";
pub const ENEMIES: &str = "enemies";

const PROJECTILE_LIFETIME: f32 = 1.5;
const ENEMY_LIFETIME: f32 = 10.0;

/// Arguments for one projectile
#[derive(Debug, Clone, Copy)]
pub struct ProjectileParams {
    pub origin: Vec2,
    pub direction: Vec2,
    pub speed: f32,
    pub damage: f32,
}

/// Fast, short-lived shots
#[derive(Debug, Default)]
pub struct ProjectileTemplate;

impl SpawnTemplate for ProjectileTemplate {
    type Params = ProjectileParams;

    fn name(&self) -> &str {
        PROJECTILES
    }

    fn build(&self, entity: &mut Entity) {
        entity
            .add_component(Transform::new(Vec2::zeros(), Vec2::new(4.0, 12.0)))
            .add_component(Velocity::default())
            .add_component(Lifetime::pooled(PROJECTILE_LIFETIME))
            .add_component(Damage::new(0.0))
            .add_component(Sprite::new(1).on_layer(DrawLayer::Effects, 0.0))
            .add_tag("projectile");
    }

    fn reset(&self, entity: &mut Entity, params: &ProjectileParams) {
        let direction = params.direction.try_normalize(f32::EPSILON).unwrap_or_else(|| Vec2::new(0.0, 1.0));
        if let Some(transform) = entity.get_component_mut::<Transform>() {
            transform.position = params.origin;
            transform.rotation = direction.x.atan2(direction.y);
        }
        if let Some(velocity) = entity.get_component_mut::<Velocity>() {
            velocity.linear = direction * params.speed;
        }
        if let Some(lifetime) = entity.get_component_mut::<Lifetime>() {
            lifetime.restart(PROJECTILE_LIFETIME);
        }
        if let Some(damage) = entity.get_component_mut::<Damage>() {
            damage.amount = params.damage;
        }
    }
}

/// Arguments for one enemy
#[derive(Debug, Clone, Copy)]
pub struct EnemyParams {
    pub position: Vec2,
    pub velocity: Vec2,
    pub health: f32,
    pub points: u32,
}

/// Drifting targets
#[derive(Debug, Default)]
pub struct EnemyTemplate;

impl SpawnTemplate for EnemyTemplate {
    type Params = EnemyParams;

    fn name(&self) -> &str {
        ENEMIES
    }

    fn build(&self, entity: &mut Entity) {
        entity
            .add_component(Transform::new(Vec2::zeros(), Vec2::new(24.0, 24.0)))
            .add_component(Velocity::default().with_max_speed(200.0))
            .add_component(Health::new(1.0))
            .add_component(Lifetime::pooled(ENEMY_LIFETIME))
            .add_component(Enemy::new(0))
            .add_component(Sprite::new(2).with_color([1.0, 0.3, 0.3, 1.0]))
            .add_tag("enemy");
    }

    fn reset(&self, entity: &mut Entity, params: &EnemyParams) {
        if let Some(transform) = entity.get_component_mut::<Transform>() {
            transform.position = params.position;
            transform.rotation = 0.0;
        }
        if let Some(velocity) = entity.get_component_mut::<Velocity>() {
            velocity.linear = params.velocity;
        }
        if let Some(health) = entity.get_component_mut::<Health>() {
            health.reset(params.health);
        }
        if let Some(lifetime) = entity.get_component_mut::<Lifetime>() {
            lifetime.restart(ENEMY_LIFETIME);
        }
        if let Some(enemy) = entity.get_component_mut::<Enemy>() {
            enemy.points = params.points;
        }
    }
}
