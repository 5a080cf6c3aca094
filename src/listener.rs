//! Subscriber capability and the per-engine subscriber set.
//!
//! A [`ListenerSet`] is mutated by arbitrary caller threads and iterated by exactly
//! one engine thread. Dispatch clones the list under the lock and invokes the
//! callbacks with the lock released, so a callback may add or remove listeners
//! (including itself) without deadlocking, and a listener removed before a dispatch
//! begins never sees that dispatch.

use crate::event::{Event, EventKind};

use log::*;
use std::sync::{Arc, Mutex};

/// Receives the events of one or more engines.
///
/// Callbacks run synchronously on the engine's own thread, in registration order.
/// A callback that blocks stalls that engine until it returns.
pub trait Listener<T>: Send + Sync {
    fn on_success(&self, event: &Event<T>);

    fn on_failure(&self, event: &Event<T>) {
        if let Some(error) = event.error() {
            debug!("Unhandled failure from {}: {error}", event.source());
        }
    }

    fn on_closed(&self, event: &Event<T>) {
        debug!("{} closed", event.source());
    }
}

/// The subscribers of one engine.
pub struct ListenerSet<T> {
    listeners: Mutex<Vec<Arc<dyn Listener<T>>>>,
}

impl<T> Default for ListenerSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ListenerSet<T> {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Registers a listener. Takes effect from the next dispatch.
    pub fn add(&self, listener: Arc<dyn Listener<T>>) {
        self.listeners.lock().unwrap().push(listener);
    }

    /// Removes the first registration of `listener`, compared by identity.
    ///
    /// # Returns
    /// `true` if the listener was registered
    pub fn remove(&self, listener: &Arc<dyn Listener<T>>) -> bool {
        let mut listeners = self.listeners.lock().unwrap();
        match listeners.iter().position(|l| same_listener(l, listener)) {
            Some(index) => {
                listeners.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.lock().unwrap().is_empty()
    }

    /// Delivers `event` to every listener registered when the call began.
    pub fn dispatch(&self, event: &Event<T>) {
        let snapshot: Vec<Arc<dyn Listener<T>>> = self.listeners.lock().unwrap().clone();
        trace!(
            "Dispatching {} event from {} to {} listener(s)",
            event.kind(),
            event.source(),
            snapshot.len()
        );

        for listener in snapshot.iter() {
            match event.kind() {
                EventKind::Success => listener.on_success(event),
                EventKind::Failure => listener.on_failure(event),
                EventKind::Closed => listener.on_closed(event),
            }
        }
    }
}

// Compares data pointers only; vtable pointers of the same type may differ across codegen units.
fn same_listener<T>(a: &Arc<dyn Listener<T>>, b: &Arc<dyn Listener<T>>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
