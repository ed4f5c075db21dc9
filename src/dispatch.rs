use log::debug;

use crate::types::PresenceEvent;

/// Receiver of stable presence transitions.
///
/// Called synchronously, in order, while the tracker is locked. An observer
/// must not call back into the [`crate::PresenceTracker`] it is registered
/// with; doing so deadlocks.
pub trait PresenceObserver: Send {
    fn on_event(&mut self, event: PresenceEvent);
}

impl<F> PresenceObserver for F
where
    F: FnMut(PresenceEvent) + Send,
{
    fn on_event(&mut self, event: PresenceEvent) {
        self(event)
    }
}

/// Single-slot observer registration
#[derive(Default)]
pub struct EventDispatcher {
    observer: Option<Box<dyn PresenceObserver>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observer<O: PresenceObserver + 'static>(observer: O) -> Self {
        Self {
            observer: Some(Box::new(observer)),
        }
    }

    /// Install `observer`, replacing any previous one
    pub fn register<O: PresenceObserver + 'static>(&mut self, observer: O) {
        self.observer = Some(Box::new(observer));
    }

    pub fn has_observer(&self) -> bool {
        self.observer.is_some()
    }

    pub fn dispatch(&mut self, event: PresenceEvent) {
        match self.observer.as_mut() {
            Some(observer) => observer.on_event(event),
            None => debug!("No observer registered, dropping {:?}", event),
        }
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("has_observer", &self.has_observer())
            .finish()
    }
}
