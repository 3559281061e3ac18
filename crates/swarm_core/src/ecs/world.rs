//! ECS World
//!
//! Explicit context handed to every system: the entity manager, the spawner
//! registry, the shared event system, the pause flag and the current frame
//! time.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use super::{EntityManager, EntityRef};
use crate::events::{DispatchReport, Event, EventArg, EventForwarder, EventSystem, EventType};
use crate::foundation::time::FrameTime;
use crate::pool::{SpawnError, SpawnTemplate, SpawnerRegistry};

/// World containing all runtime state systems operate on
pub struct World {
    /// Registered entities
    pub entities: EntityManager,
    /// Pool-backed spawners by name
    pub spawners: SpawnerRegistry,
    events: Rc<RefCell<EventSystem>>,
    paused: bool,
    time: FrameTime,
}

impl World {
    /// Create an empty world with lifecycle events forwarded to its event system
    pub fn new() -> Self {
        let events = Rc::new(RefCell::new(EventSystem::new()));
        let mut entities = EntityManager::new();
        entities.add_observer(Box::new(EventForwarder::new(Rc::clone(&events))));

        Self {
            entities,
            spawners: SpawnerRegistry::new(),
            events,
            paused: false,
            time: FrameTime::default(),
        }
    }

    /// Whether simulation is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause simulation. Only systems flagged to update during pause keep running.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            self.send_event(Event::new(EventType::GamePaused, f64::from(self.time.elapsed)));
            log::info!("World paused");
        }
    }

    /// Resume simulation
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.send_event(Event::new(EventType::GameResumed, f64::from(self.time.elapsed)));
            log::info!("World resumed");
        }
    }

    /// Timing of the frame being processed
    pub fn time(&self) -> FrameTime {
        self.time
    }

    /// Record the current frame timing and advance the event clock
    pub fn set_time(&mut self, time: FrameTime) {
        self.time = time;
        self.events.borrow_mut().update_time(f64::from(time.elapsed));
    }

    /// Borrow the event system
    pub fn events(&self) -> Ref<'_, EventSystem> {
        self.events.borrow()
    }

    /// Mutably borrow the event system (subscribe, post, clear)
    pub fn events_mut(&self) -> RefMut<'_, EventSystem> {
        self.events.borrow_mut()
    }

    /// Queue an event for the end-of-frame dispatch
    pub fn send_event(&self, event: Event) {
        self.events.borrow_mut().send(event);
    }

    /// Deliver every pending event
    pub fn dispatch_events(&self) -> DispatchReport {
        self.events.borrow_mut().dispatch()
    }

    /// Spawn through a registered spawner.
    ///
    /// Exhaustion queues a `SpawnExhausted` event before the error is returned.
    pub fn spawn<T: SpawnTemplate>(&mut self, spawner: &str, params: T::Params) -> Result<EntityRef, SpawnError> {
        let result = self.spawners.spawn::<T>(spawner, &mut self.entities, params);
        if let Err(SpawnError::PoolExhausted { active, .. }) = &result {
            self.send_event(
                Event::new(EventType::SpawnExhausted, f64::from(self.time.elapsed))
                    .with_arg("spawner", EventArg::Tag(spawner.to_owned()))
                    .with_arg("count", EventArg::Count(*active)),
            );
        }
        result
    }

    /// Return a pooled entity to the spawner that handed it out
    pub fn despawn(&mut self, entity: &EntityRef) -> bool {
        self.spawners.despawn(&mut self.entities, entity)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventError;

    #[test]
    fn test_entity_lifecycle_reaches_listeners() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new();
        for event_type in [EventType::EntityCreated, EventType::EntityDestroyed] {
            let seen = Rc::clone(&seen);
            world.events_mut().subscribe(
                event_type,
                Box::new(move |event: &Event| -> Result<(), EventError> {
                    seen.borrow_mut().push((event.event_type, event.get_entity()));
                    Ok(())
                }),
            );
        }

        let entity = world.entities.create();
        let id = entity.borrow().id();
        world.entities.destroy(&entity);
        assert!(seen.borrow().is_empty());

        world.dispatch_events();
        assert_eq!(
            *seen.borrow(),
            vec![
                (EventType::EntityCreated, Some(id)),
                (EventType::EntityDestroyed, Some(id)),
            ]
        );
    }

    struct Mine;

    impl SpawnTemplate for Mine {
        type Params = ();

        fn name(&self) -> &str {
            "mines"
        }

        fn build(&self, entity: &mut crate::ecs::Entity) {
            entity.add_tag("mine");
        }

        fn reset(&self, _entity: &mut crate::ecs::Entity, _params: &()) {}
    }

    #[test]
    fn test_spawn_exhaustion_queues_event() {
        let mut world = World::new();
        world
            .spawners
            .register(crate::pool::EntitySpawner::new(Mine, 1, 1))
            .expect("register");

        let mine = world.spawn::<Mine>("mines", ()).expect("spawn");
        world.dispatch_events();
        assert!(world.spawn::<Mine>("mines", ()).is_err());

        let exhausted = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&exhausted);
        world.events_mut().subscribe(
            EventType::SpawnExhausted,
            Box::new(move |event: &Event| -> Result<(), EventError> {
                sink.borrow_mut().push(event.get_text("spawner").map(str::to_owned));
                Ok(())
            }),
        );
        world.dispatch_events();
        assert_eq!(*exhausted.borrow(), vec![Some("mines".to_owned())]);

        assert!(world.despawn(&mine));
        assert!(world.spawn::<Mine>("mines", ()).is_ok());
    }

    #[test]
    fn test_pause_resume_emit_once() {
        let mut world = World::new();
        world.pause();
        world.pause();
        assert!(world.is_paused());
        world.resume();
        assert!(!world.is_paused());
        assert_eq!(world.events().pending(), 2);
    }
}
