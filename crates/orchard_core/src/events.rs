//! Synchronous publish/subscribe for simulation events.
//!
//! Handlers run inside the call that caused the transition and only ever see
//! a shared reference to the event, so they cannot reach back into the
//! simulation.

use orchard_data::SimEvent;
use std::fmt;

/// Ordered list of event handlers.
pub struct Subscribers<E> {
    handlers: Vec<Box<dyn FnMut(&E)>>,
}

impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }
}

impl<E> fmt::Debug for Subscribers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl<E> Subscribers<E> {
    pub fn subscribe<F>(&mut self, handler: F)
    where
        F: FnMut(&E) + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    pub fn notify(&mut self, event: &E) {
        for handler in &mut self.handlers {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Domain event bus. Every published event is delivered to subscribers
/// immediately and also kept until the next [`EventBus::drain`].
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Subscribers<SimEvent>,
    pending: Vec<SimEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, handler: F)
    where
        F: FnMut(&SimEvent) + 'static,
    {
        self.subscribers.subscribe(handler);
    }

    pub fn publish(&mut self, event: SimEvent) {
        tracing::trace!(kind = event.kind(), subject = %event.subject(), "Event");
        self.subscribers.notify(&event);
        self.pending.push(event);
    }

    /// Takes the events published since the last drain.
    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[SimEvent] {
        &self.pending
    }
}
