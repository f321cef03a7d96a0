//! Outward event delivery: a single registered handler invoked synchronously
//! on every emitting transition.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use crate::types::WifiEvent;

/// Error type a handler may return; failures are logged, never propagated
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Receiver for control-plane events. Implementations must return quickly or
/// hand the work off themselves; the notifier calls them on the event's thread.
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: &WifiEvent) -> Result<(), HandlerError>;
}

impl<F> EventHandler for F
where
    F: Fn(&WifiEvent) -> Result<(), HandlerError> + Send + Sync,
{
    fn on_event(&self, event: &WifiEvent) -> Result<(), HandlerError> {
        self(event)
    }
}

/// Single-slot event dispatcher; a later `register` replaces the earlier handler
#[derive(Default)]
pub struct EventNotifier {
    slot: Mutex<Option<Arc<dyn EventHandler>>>,
}

impl EventNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a handler, displacing any previous one
    pub fn register(&self, handler: Arc<dyn EventHandler>) {
        *self.lock() = Some(handler);
    }

    /// Remove the current handler, if any
    pub fn clear(&self) {
        *self.lock() = None;
    }

    pub fn has_handler(&self) -> bool {
        self.lock().is_some()
    }

    /// Deliver an event to the registered handler. Handler errors are logged
    /// and swallowed so a misbehaving receiver cannot stall the state machine.
    pub fn notify(&self, event: &WifiEvent) {
        let handler = self.lock().clone();
        if let Some(handler) = handler {
            if let Err(err) = handler.on_event(event) {
                warn!(?event, %err, "event handler failed");
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Arc<dyn EventHandler>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for EventNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventNotifier")
            .field("has_handler", &self.has_handler())
            .finish()
    }
}
