//! Cancellable one-shot timer backed by a thread

use log::debug;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// Starts a [`GraceTimer`]; [`GraceTimer::start`] outside of tests
pub(crate) type StartTimer = fn(Duration, Box<dyn FnOnce() + Send>) -> std::io::Result<GraceTimer>;

/// Handle to a pending callback. Dropping or cancelling it stops the callback
/// from running if it has not fired yet.
#[derive(Debug)]
pub(crate) struct GraceTimer {
    cancel_tx: mpsc::Sender<()>,
}

impl GraceTimer {
    /// Run `on_expire` on a new thread after `delay` unless cancelled first
    pub(crate) fn start(delay: Duration, on_expire: Box<dyn FnOnce() + Send>) -> std::io::Result<Self> {
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();

        thread::Builder::new()
            .name("grace-timer".into())
            .spawn(move || match cancel_rx.recv_timeout(delay) {
                Err(RecvTimeoutError::Timeout) => on_expire(),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => debug!("Grace timer cancelled"),
            })?;

        Ok(Self { cancel_tx })
    }

    pub(crate) fn cancel(self) {
        // The thread may already be past its wait; the send failing is fine.
        let _ = self.cancel_tx.send(());
    }
}
