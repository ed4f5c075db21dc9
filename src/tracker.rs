//! Shared presence context for edge sources and grace timers

use log::{debug, error};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

use crate::dispatch::{EventDispatcher, PresenceObserver};
use crate::presence::{PresenceDebouncer, PresenceState, TimerCommand, Transition};
use crate::timer::{GraceTimer, StartTimer};
use crate::types::TagId;

struct Shared {
    debouncer: PresenceDebouncer,
    dispatcher: EventDispatcher,
    timer: Option<GraceTimer>,
    start_timer: StartTimer,
}

impl Shared {
    fn apply(&mut self, transition: Transition, handle: &Weak<Mutex<Shared>>) {
        match transition.timer {
            TimerCommand::Keep => {}
            TimerCommand::Cancel => {
                if let Some(timer) = self.timer.take() {
                    timer.cancel();
                }
            }
            TimerCommand::Start { tag, epoch, grace } => {
                if let Some(timer) = self.timer.take() {
                    timer.cancel();
                }
                let handle_for_timer = handle.clone();
                let started = (self.start_timer)(
                    grace,
                    Box::new(move || {
                        if let Some(shared) = handle_for_timer.upgrade() {
                            let mut guard = lock(&shared);
                            let transition = guard.debouncer.grace_expired(tag, epoch);
                            guard.apply(transition, &Arc::downgrade(&shared));
                        }
                    }),
                );
                match started {
                    Ok(timer) => self.timer = Some(timer),
                    Err(e) => {
                        // Without a timer the leave can never be confirmed; confirm it now.
                        error!("Failed to start grace timer, confirming leave of {}: {:?}", tag, e);
                        let expired = self.debouncer.grace_expired(tag, epoch);
                        self.apply(expired, handle);
                    }
                }
            }
        }

        for event in transition.events {
            debug!("Dispatching {:?}", event);
            self.dispatcher.dispatch(event);
        }
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Debounced presence tracking shared between an edge source and its grace timer.
///
/// Cloning is cheap and every clone drives the same state. All inputs, including
/// timer expiry, are applied under one lock, so a timer firing can never
/// interleave with a concurrent edge.
#[derive(Clone)]
pub struct PresenceTracker {
    shared: Arc<Mutex<Shared>>,
}

impl PresenceTracker {
    /// Create a tracker holding leaves unconfirmed for `grace`
    pub fn new<O: PresenceObserver + 'static>(grace: Duration, observer: O) -> Self {
        Self::with_dispatcher(grace, EventDispatcher::with_observer(observer))
    }

    pub fn with_dispatcher(grace: Duration, dispatcher: EventDispatcher) -> Self {
        Self::with_timer(grace, dispatcher, GraceTimer::start)
    }

    pub(crate) fn with_timer(grace: Duration, dispatcher: EventDispatcher, start_timer: StartTimer) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                debouncer: PresenceDebouncer::new(grace),
                dispatcher,
                timer: None,
                start_timer,
            })),
        }
    }

    /// Replace the registered observer
    pub fn set_observer<O: PresenceObserver + 'static>(&self, observer: O) {
        lock(&self.shared).dispatcher.register(observer);
    }

    /// Feed a tag-entered edge
    pub fn raw_enter(&self, tag: TagId) {
        let mut guard = lock(&self.shared);
        let transition = guard.debouncer.raw_enter(tag);
        guard.apply(transition, &Arc::downgrade(&self.shared));
    }

    /// Feed a tag-left edge
    pub fn raw_leave(&self) {
        let mut guard = lock(&self.shared);
        let transition = guard.debouncer.raw_leave(Instant::now());
        guard.apply(transition, &Arc::downgrade(&self.shared));
    }

    pub fn state(&self) -> PresenceState {
        lock(&self.shared).debouncer.state()
    }

    /// Tag in range, or [`TagId::NO_TAG`] when none is.
    ///
    /// A tag whose leave is still inside the grace period is reported as present.
    pub fn current_tag(&self) -> TagId {
        lock(&self.shared)
            .debouncer
            .current_tag()
            .unwrap_or(TagId::NO_TAG)
    }

    /// Whether a grace timer is currently pending
    pub fn timer_pending(&self) -> bool {
        lock(&self.shared).timer.is_some()
    }
}

impl std::fmt::Debug for PresenceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceTracker")
            .field("state", &self.state())
            .finish()
    }
}
