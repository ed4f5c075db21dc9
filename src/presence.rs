//! Presence debouncing
//!
//! Raw tag-in-range edges flicker: a tag sitting at the edge of the field,
//! or a brief read glitch, drops the signal for a moment. [`PresenceDebouncer`]
//! holds a `RawLeave` unconfirmed for a grace period and only reports
//! `Leave` if no re-entry of the same tag arrives in that window.
//!
//! The debouncer is a plain state machine. It never sleeps or spawns; each
//! input returns a [`Transition`] telling the caller which events to emit
//! and what to do with the grace timer. [`crate::PresenceTracker`] wires it
//! to a real timer and an observer.

use log::debug;
use std::time::{Duration, Instant};

use crate::types::{PresenceEvent, TagId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceState {
    Absent,
    Present(TagId),
    /// Leave seen, waiting out the grace period until `deadline`
    Debouncing(TagId, Instant),
}

/// What the owner of the debouncer must do with its grace timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    /// Leave any running timer alone
    Keep,
    /// Replace any running timer with one that fires `GraceExpired(tag, epoch)` after `grace`
    Start { tag: TagId, epoch: u64, grace: Duration },
    /// Drop the running timer
    Cancel,
}

/// Result of feeding one input to the debouncer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Events to emit, in order
    pub events: Vec<PresenceEvent>,
    pub timer: TimerCommand,
}

impl Transition {
    fn none() -> Self {
        Self {
            events: Vec::new(),
            timer: TimerCommand::Keep,
        }
    }

    fn emit(events: Vec<PresenceEvent>, timer: TimerCommand) -> Self {
        Self { events, timer }
    }
}

#[derive(Debug)]
pub struct PresenceDebouncer {
    state: PresenceState,
    grace: Duration,
    /// Identifies the current (or most recent) debounce window
    epoch: u64,
}

impl PresenceDebouncer {
    pub fn new(grace: Duration) -> Self {
        Self {
            state: PresenceState::Absent,
            grace,
            epoch: 0,
        }
    }

    pub fn state(&self) -> PresenceState {
        self.state
    }

    pub fn grace_period(&self) -> Duration {
        self.grace
    }

    /// Tag considered in range, including one whose leave is still unconfirmed
    pub fn current_tag(&self) -> Option<TagId> {
        match self.state {
            PresenceState::Absent => None,
            PresenceState::Present(tag) | PresenceState::Debouncing(tag, _) => Some(tag),
        }
    }

    /// A tag was reported in range
    pub fn raw_enter(&mut self, tag: TagId) -> Transition {
        let previous = self.state;
        self.state = PresenceState::Present(tag);
        debug!("RawEnter({}) in {:?}", tag, previous);

        match previous {
            PresenceState::Absent => {
                Transition::emit(vec![PresenceEvent::Enter(tag)], TimerCommand::Keep)
            }
            PresenceState::Present(current) if current == tag => Transition::none(),
            PresenceState::Present(_) => {
                Transition::emit(vec![PresenceEvent::Enter(tag)], TimerCommand::Keep)
            }
            PresenceState::Debouncing(current, _) if current == tag => {
                Transition::emit(Vec::new(), TimerCommand::Cancel)
            }
            PresenceState::Debouncing(current, _) => Transition::emit(
                vec![PresenceEvent::Leave(current), PresenceEvent::Enter(tag)],
                TimerCommand::Cancel,
            ),
        }
    }

    /// The in-range signal dropped; starts the grace period
    pub fn raw_leave(&mut self, now: Instant) -> Transition {
        match self.state {
            PresenceState::Present(tag) => {
                self.epoch += 1;
                self.state = PresenceState::Debouncing(tag, now + self.grace);
                debug!("RawLeave({}): debouncing, epoch {}", tag, self.epoch);
                Transition::emit(
                    Vec::new(),
                    TimerCommand::Start {
                        tag,
                        epoch: self.epoch,
                        grace: self.grace,
                    },
                )
            }
            // Already waiting: the running timer keeps its deadline.
            PresenceState::Debouncing(..) => Transition::none(),
            PresenceState::Absent => Transition::none(),
        }
    }

    /// A grace timer fired. Only the timer of the live debounce window counts.
    pub fn grace_expired(&mut self, tag: TagId, epoch: u64) -> Transition {
        match self.state {
            PresenceState::Debouncing(current, _) if current == tag && epoch == self.epoch => {
                self.state = PresenceState::Absent;
                debug!("GraceExpired({}): tag left", tag);
                Transition::emit(vec![PresenceEvent::Leave(tag)], TimerCommand::Cancel)
            }
            _ => {
                debug!("Ignoring stale grace timer for {} (epoch {})", tag, epoch);
                Transition::none()
            }
        }
    }
}
