//! Event system
//!
//! Key principles:
//! - Key-value arguments (no order dependency)
//! - Registration per event type (only interested listeners are notified)
//! - Queuing support (immediate + deferred delivery)
//! - Listener isolation: a listener that errors or panics is logged and
//!   skipped, delivery continues with the remaining listeners

use std::cell::RefCell;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use thiserror::Error;

use crate::ecs::{Entity, EntityId, EntityObserver};

/// Event type identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// An entity was registered with the manager
    EntityCreated,
    /// An entity was destroyed
    EntityDestroyed,
    /// A spawner could not hand out another instance
    SpawnExhausted,
    /// A system failed and the frame was aborted
    SystemFault,
    /// The world was paused
    GamePaused,
    /// The world was resumed
    GameResumed,
    /// Gameplay-defined event
    Custom(&'static str),
}

/// Variant for type-safe event arguments
#[derive(Debug, Clone, PartialEq)]
pub enum EventArg {
    /// Entity identifier
    EntityId(EntityId),
    /// Tag or name
    Tag(String),
    /// Counter value
    Count(usize),
    /// Position coordinates
    Position(f32, f32),
    /// Free-form text
    Text(String),
    /// Boolean flag
    Flag(bool),
}

/// Event with type ID and key-value arguments
#[derive(Debug, Clone)]
pub struct Event {
    /// Type of event
    pub event_type: EventType,
    /// Timestamp when event was created (seconds)
    pub timestamp: f64,
    args: HashMap<&'static str, EventArg>,
}

impl Event {
    /// Create a new event with the given type and timestamp
    pub fn new(event_type: EventType, timestamp: f64) -> Self {
        Self {
            event_type,
            timestamp,
            args: HashMap::new(),
        }
    }

    /// Add an argument to the event (builder pattern)
    #[must_use]
    pub fn with_arg(mut self, key: &'static str, value: EventArg) -> Self {
        self.args.insert(key, value);
        self
    }

    /// Get an argument by key
    pub fn get_arg(&self, key: &str) -> Option<&EventArg> {
        self.args.get(key)
    }

    /// Get the `entity` argument if present
    pub fn get_entity(&self) -> Option<EntityId> {
        match self.get_arg("entity") {
            Some(EventArg::EntityId(id)) => Some(*id),
            _ => None,
        }
    }

    /// Get the `count` argument if present
    pub fn get_count(&self) -> Option<usize> {
        match self.get_arg("count") {
            Some(EventArg::Count(count)) => Some(*count),
            _ => None,
        }
    }

    /// Get the `position` argument if present
    pub fn get_position(&self) -> Option<(f32, f32)> {
        match self.get_arg("position") {
            Some(EventArg::Position(x, y)) => Some((*x, *y)),
            _ => None,
        }
    }

    /// Get a text-like argument (`Tag` or `Text`) by key
    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.get_arg(key) {
            Some(EventArg::Tag(text) | EventArg::Text(text)) => Some(text),
            _ => None,
        }
    }
}

/// Listener failure
#[derive(Debug, Error)]
pub enum EventError {
    /// The listener refused or failed to handle the event
    #[error("listener rejected event: {0}")]
    Rejected(String),

    /// The listener panicked
    #[error("listener panicked: {0}")]
    Panicked(String),
}

/// Event listener
pub trait EventHandler {
    /// Handle an event
    fn on_event(&mut self, event: &Event) -> Result<(), EventError>;
}

impl<F> EventHandler for F
where
    F: FnMut(&Event) -> Result<(), EventError>,
{
    fn on_event(&mut self, event: &Event) -> Result<(), EventError> {
        self(event)
    }
}

/// Subscription handle returned by [`EventSystem::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Outcome of a dispatch pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Events delivered (each counted once, whatever the listener count)
    pub delivered: usize,
    /// Listener calls that returned an error or panicked
    pub failed: usize,
}

impl DispatchReport {
    fn merge(&mut self, other: Self) {
        self.delivered += other.delivered;
        self.failed += other.failed;
    }
}

/// Event system with registration and queuing
pub struct EventSystem {
    immediate_queue: Vec<Event>,
    deferred_queue: Vec<(f64, Event)>,
    listeners: HashMap<EventType, Vec<(ListenerId, Box<dyn EventHandler>)>>,
    next_listener: u64,
    current_time: f64,
}

impl EventSystem {
    /// Create a new empty event system
    pub fn new() -> Self {
        Self {
            immediate_queue: Vec::new(),
            deferred_queue: Vec::new(),
            listeners: HashMap::new(),
            next_listener: 0,
            current_time: 0.0,
        }
    }

    /// Update current time (seconds since start)
    pub fn update_time(&mut self, time: f64) {
        self.current_time = time;
    }

    /// Current time as last set by `update_time`
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Register a listener for a specific event type
    pub fn subscribe(&mut self, event_type: EventType, listener: Box<dyn EventHandler>) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.entry(event_type).or_default().push((id, listener));
        id
    }

    /// Remove a listener. Returns false when it was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let mut removed = false;
        self.listeners.retain(|_, listeners| {
            let before = listeners.len();
            listeners.retain(|(listener_id, _)| *listener_id != id);
            removed |= listeners.len() != before;
            !listeners.is_empty()
        });
        removed
    }

    /// Number of listeners registered for an event type
    pub fn listener_count(&self, event_type: EventType) -> usize {
        self.listeners.get(&event_type).map_or(0, Vec::len)
    }

    /// Queue an event for the next dispatch
    pub fn send(&mut self, event: Event) {
        self.immediate_queue.push(event);
    }

    /// Post event for deferred delivery at specified time
    pub fn post(&mut self, delivery_time: f64, event: Event) {
        self.deferred_queue.push((delivery_time, event));
    }

    /// Events waiting for dispatch (immediate + deferred)
    pub fn pending(&self) -> usize {
        self.immediate_queue.len() + self.deferred_queue.len()
    }

    /// Dispatch all pending events.
    ///
    /// Processes the immediate queue first, then deferred events that are due.
    pub fn dispatch(&mut self) -> DispatchReport {
        let mut report = DispatchReport::default();

        let immediate = std::mem::take(&mut self.immediate_queue);
        for event in &immediate {
            report.merge(self.deliver(event));
        }

        let now = self.current_time;
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.deferred_queue)
            .into_iter()
            .partition(|(delivery_time, _)| *delivery_time <= now);
        self.deferred_queue = waiting;
        for (_, event) in &due {
            report.merge(self.deliver(event));
        }

        if report.failed > 0 {
            log::warn!("{} listener call(s) failed during dispatch", report.failed);
        }
        report
    }

    /// Deliver an event right away, bypassing the queues
    pub fn emit(&mut self, event: &Event) -> DispatchReport {
        self.deliver(event)
    }

    fn deliver(&mut self, event: &Event) -> DispatchReport {
        let mut report = DispatchReport {
            delivered: 1,
            failed: 0,
        };
        let Some(listeners) = self.listeners.get_mut(&event.event_type) else {
            return report;
        };

        for (id, listener) in listeners.iter_mut() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener.on_event(event)))
                .unwrap_or_else(|payload| Err(EventError::Panicked(panic_message(payload.as_ref()))));
            if let Err(error) = outcome {
                report.failed += 1;
                log::error!("Listener {:?} failed on {:?}: {}", id, event.event_type, error);
            }
        }
        report
    }

    /// Clear all queued events (useful for state transitions)
    pub fn clear(&mut self) {
        self.immediate_queue.clear();
        self.deferred_queue.clear();
    }
}

impl Default for EventSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

/// Queues entity lifecycle notifications on a shared [`EventSystem`]
pub struct EventForwarder {
    events: Rc<RefCell<EventSystem>>,
}

impl EventForwarder {
    /// Forward into `events`
    pub fn new(events: Rc<RefCell<EventSystem>>) -> Self {
        Self { events }
    }

    fn forward(&self, event_type: EventType, entity: &Entity) {
        let Ok(mut events) = self.events.try_borrow_mut() else {
            log::warn!("Event system busy, dropping {:?} for entity {}", event_type, entity.id());
            return;
        };
        let event = Event::new(event_type, events.current_time())
            .with_arg("entity", EventArg::EntityId(entity.id()));
        events.send(event);
    }
}

impl EntityObserver for EventForwarder {
    fn on_entity_created(&mut self, entity: &Entity) {
        self.forward(EventType::EntityCreated, entity);
    }

    fn on_entity_destroyed(&mut self, entity: &Entity) {
        self.forward(EventType::EntityDestroyed, entity);
    }
}
