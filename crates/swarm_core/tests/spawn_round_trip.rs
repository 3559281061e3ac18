//! Spawn / despawn round trip through a pool-backed spawner

use std::rc::Rc;

use swarm_core::prelude::*;

struct Projectile;

struct ProjectileParams {
    x: f32,
    y: f32,
    speed: f32,
}

impl SpawnTemplate for Projectile {
    type Params = ProjectileParams;

    fn name(&self) -> &str {
        "projectiles"
    }

    fn build(&self, entity: &mut Entity) {
        entity
            .add_component(Transform::new(Vec2::zeros(), Vec2::new(2.0, 6.0)))
            .add_component(Velocity::default())
            .add_component(Lifetime::pooled(2.0))
            .add_tag("projectile");
    }

    fn reset(&self, entity: &mut Entity, params: &ProjectileParams) {
        if let Some(transform) = entity.get_component_mut::<Transform>() {
            transform.position = Vec2::new(params.x, params.y);
        }
        if let Some(velocity) = entity.get_component_mut::<Velocity>() {
            velocity.linear = Vec2::new(0.0, -params.speed);
        }
        if let Some(lifetime) = entity.get_component_mut::<Lifetime>() {
            lifetime.restart(2.0);
        }
    }
}

#[test]
fn spawned_entity_is_registered_and_reused_with_same_id() {
    let mut entities = EntityManager::new();
    let mut spawner = EntitySpawner::new(Projectile, 4, 8);

    let entity = spawner
        .spawn(&mut entities, ProjectileParams { x: 10.0, y: 20.0, speed: 300.0 })
        .expect("spawn");
    let id = entity.borrow().id();

    assert!(entities.get_by_id(id).is_some_and(|found| Rc::ptr_eq(&found, &entity)));
    assert_eq!(
        entity.borrow().get_component::<Transform>().map(|t| t.position),
        Some(Vec2::new(10.0, 20.0))
    );

    assert!(spawner.despawn(&mut entities, &entity));
    assert!(entities.get_all().iter().all(|e| !Rc::ptr_eq(e, &entity)));
    assert!(spawner.active_entities().is_empty());

    let reused = spawner
        .spawn(&mut entities, ProjectileParams { x: 1.0, y: 2.0, speed: 100.0 })
        .expect("spawn");
    assert_eq!(reused.borrow().id(), id);
    assert_eq!(
        reused.borrow().get_component::<Velocity>().map(|v| v.linear),
        Some(Vec2::new(0.0, -100.0))
    );
}

#[test]
fn pool_capacity_limits_spawns_without_disturbing_state() {
    let mut entities = EntityManager::new();
    let mut spawner = EntitySpawner::new(Projectile, 2, 3);
    let params = || ProjectileParams { x: 0.0, y: 0.0, speed: 1.0 };

    for _ in 0..3 {
        spawner.spawn(&mut entities, params()).expect("within capacity");
    }
    let error = spawner.spawn(&mut entities, params()).unwrap_err();

    assert!(matches!(error, SpawnError::PoolExhausted { active: 3, max: 3, .. }));
    assert_eq!(entities.count_by_tag("projectile"), 3);
    assert_eq!(spawner.stats().pool.constructed, 3);
}

#[test]
fn tag_queries_follow_spawn_and_despawn() {
    let mut entities = EntityManager::new();
    let mut spawner = EntitySpawner::new(Projectile, 2, 2);

    let a = spawner
        .spawn(&mut entities, ProjectileParams { x: 0.0, y: 0.0, speed: 1.0 })
        .expect("spawn");
    let b = spawner
        .spawn(&mut entities, ProjectileParams { x: 0.0, y: 0.0, speed: 1.0 })
        .expect("spawn");
    assert_eq!(entities.get_by_tag("projectile").len(), 2);

    spawner.despawn(&mut entities, &a);
    let remaining = entities.get_by_tag("projectile");
    assert_eq!(remaining.len(), 1);
    assert!(Rc::ptr_eq(&remaining[0], &b));
}
