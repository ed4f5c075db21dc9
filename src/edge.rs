//! Adapter between a reader's tag-in-range output and a [`PresenceTracker`]
//!
//! ID readers raise their tag-in-range pin when a tag enters the field and
//! send its frame at the same moment; the pin drops when the tag leaves.
//! Whatever owns the GPIO interrupt calls [`TagInRangeMonitor::on_edge`]
//! from its callback context.

use log::{debug, warn};
use std::sync::{Mutex, PoisonError};

use crate::reader::TagReader;
use crate::tracker::PresenceTracker;
use crate::transport::ByteSource;
use crate::types::ReaderError;

/// Level of the tag-in-range pin after an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinLevel {
    High,
    Low,
}

pub struct TagInRangeMonitor<T: ByteSource> {
    reader: Mutex<TagReader<T>>,
    tracker: PresenceTracker,
}

impl<T: ByteSource> TagInRangeMonitor<T> {
    pub fn new(reader: TagReader<T>, tracker: PresenceTracker) -> Self {
        Self {
            reader: Mutex::new(reader),
            tracker,
        }
    }

    pub fn tracker(&self) -> &PresenceTracker {
        &self.tracker
    }

    /// Handle one edge of the tag-in-range pin.
    ///
    /// On `High` a frame is read and fed to the tracker as an enter. A read that
    /// times out or fails leaves presence untouched; the error is returned so the
    /// caller can log or count it. On `Low` the tracker gets a leave and the
    /// reader input is flushed.
    pub fn on_edge(&self, level: PinLevel) -> Result<(), ReaderError> {
        let mut reader = self.reader.lock().unwrap_or_else(PoisonError::into_inner);

        match level {
            // The reader stays locked until the tracker has seen the edge, so a
            // falling edge cannot overtake the enter it follows.
            PinLevel::High => match reader.read_tag() {
                Ok(Some(tag)) => {
                    self.tracker.raw_enter(tag);
                    Ok(())
                }
                Ok(None) => {
                    debug!("Tag-in-range went high but no frame arrived");
                    Ok(())
                }
                Err(e) => {
                    warn!("Could not read tag on rising edge: {}", e);
                    Err(e)
                }
            },
            PinLevel::Low => {
                self.tracker.raw_leave();
                reader.clear_buffer()
            }
        }
    }

    /// Give back the reader
    pub fn into_reader(self) -> TagReader<T> {
        self.reader.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
