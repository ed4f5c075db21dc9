//! Frame decoder and debounced presence tracking for 125 kHz RFID readers
//! (ID-Innovations ID-3LA/12LA/20LA and RDM630-style readers).
//!
//! # Features
//!
//! - `uart-esp32` - UART transport for ESP32 using esp-idf-svc
//! - `serial` - Serial port transport for desktop using serialport crate
//!
//! # Example
//!
//! ```ignore
//! use rfid_tag_reader::{ReaderKind, ReaderProfile, SerialTransport, TagReader};
//! use std::time::Duration;
//!
//! let transport = SerialTransport::open("/dev/serial0")?;
//! let profile = ReaderProfile::new(ReaderKind::Id)
//!     .with_checksum(true)
//!     .with_read_timeout(Some(Duration::from_millis(50)));
//! let mut reader = TagReader::new(transport, profile);
//!
//! if let Some(tag) = reader.read_tag()? {
//!     println!("Found tag: {}", tag);
//! }
//! ```
//!
//! Presence tracking with a tag-in-range pin:
//!
//! ```ignore
//! use rfid_tag_reader::{PinLevel, PresenceTracker, TagInRangeMonitor};
//!
//! let tracker = PresenceTracker::new(Duration::from_secs(1), |event| println!("{:?}", event));
//! let monitor = TagInRangeMonitor::new(reader, tracker);
//! // from the GPIO interrupt callback:
//! monitor.on_edge(PinLevel::High)?;
//! ```

pub mod checksum;
mod dispatch;
mod edge;
mod presence;
mod reader;
mod timer;
mod tracker;
mod transport;
mod types;

#[cfg(feature = "uart-esp32")]
mod uart;

#[cfg(feature = "serial")]
mod serial;

// Re-exports
pub use dispatch::{EventDispatcher, PresenceObserver};
pub use edge::{PinLevel, TagInRangeMonitor};
pub use presence::{PresenceDebouncer, PresenceState, TimerCommand, Transition};
pub use reader::TagReader;
pub use tracker::PresenceTracker;
pub use transport::ByteSource;
pub use types::{PresenceEvent, ReaderError, ReaderKind, ReaderProfile, TagId};

#[cfg(feature = "uart-esp32")]
pub use uart::UartTransport;

#[cfg(feature = "serial")]
pub use serial::SerialTransport;
