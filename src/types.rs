//! Types for tag reading and presence tracking

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Identifier decoded from the 10 hex digit payload of a frame (40 bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagId(u64);

impl TagId {
    /// Sentinel meaning "no tag in range".
    ///
    /// A frame whose payload decodes to 0 is indistinguishable from this
    /// value wherever the sentinel is used (see [`crate::PresenceTracker::current_tag`]).
    pub const NO_TAG: TagId = TagId(0);

    /// Largest value a 10 hex digit payload can carry
    pub const MAX_VALUE: u64 = 0xFF_FFFF_FFFF;

    /// Values above 40 bits are masked off
    pub const fn new(value: u64) -> Self {
        TagId(value & Self::MAX_VALUE)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    pub const fn is_no_tag(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for TagId {
    fn from(value: u64) -> Self {
        TagId::new(value)
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reader family, which fixes the frame layout
///
/// - `Id` (ID-Innovations ID-3LA/ID-12LA/ID-20LA): `STX | 10 hex | 2 hex checksum | CR LF ETX`, 16 bytes.
///   These readers have a tag-in-range pin and report a tag once per entry.
/// - `Rdm` (RDM630 and similar): `STX | 10 hex | 2 hex checksum | ETX`, 14 bytes.
///   These repeat the tag at 1-2 Hz while it stays in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderKind {
    Id,
    Rdm,
}

impl ReaderKind {
    /// Total frame length including the start marker
    pub const fn frame_length(self) -> usize {
        match self {
            ReaderKind::Id => 16,
            ReaderKind::Rdm => 14,
        }
    }

    /// Bytes following the checksum field
    pub const fn trailer_length(self) -> usize {
        self.frame_length() - 1 - FRAME_PAYLOAD_LEN - FRAME_CHECKSUM_LEN
    }

    /// Whether the reader exposes a tag-in-range output usable as an edge source
    pub const fn has_tag_in_range_pin(self) -> bool {
        matches!(self, ReaderKind::Id)
    }
}

/// Number of ASCII hex characters in the payload field
pub(crate) const FRAME_PAYLOAD_LEN: usize = 10;
/// Number of ASCII hex characters in the checksum field
pub(crate) const FRAME_CHECKSUM_LEN: usize = 2;

/// Immutable decoder configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderProfile {
    pub kind: ReaderKind,
    /// Verify the XOR checksum of every frame
    pub checksum_enabled: bool,
    /// Timeout for the first byte of a frame; `None` blocks until a byte arrives
    pub read_timeout: Option<Duration>,
    /// Time allowed for the rest of a frame once the start marker was seen
    pub intra_frame_timeout: Duration,
}

impl ReaderProfile {
    /// At 9600 baud the 15 remaining bytes take about 16 ms
    pub const DEFAULT_INTRA_FRAME_TIMEOUT: Duration = Duration::from_millis(25);

    /// Profile with checksum disabled and a blocking first-byte read
    pub const fn new(kind: ReaderKind) -> Self {
        Self {
            kind,
            checksum_enabled: false,
            read_timeout: None,
            intra_frame_timeout: Self::DEFAULT_INTRA_FRAME_TIMEOUT,
        }
    }

    pub const fn with_checksum(mut self, enabled: bool) -> Self {
        self.checksum_enabled = enabled;
        self
    }

    pub const fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub const fn with_intra_frame_timeout(mut self, timeout: Duration) -> Self {
        self.intra_frame_timeout = timeout;
        self
    }

    pub const fn frame_length(&self) -> usize {
        self.kind.frame_length()
    }
}

/// Stable presence transition delivered to the observer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceEvent {
    Enter(TagId),
    Leave(TagId),
}

impl PresenceEvent {
    pub fn tag(&self) -> TagId {
        match *self {
            PresenceEvent::Enter(tag) | PresenceEvent::Leave(tag) => tag,
        }
    }
}

/// Errors that can occur while reading a tag
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReaderError {
    /// Transport layer error (UART, serial, etc.)
    #[error("transport error: {0}")]
    Transport(String),
    /// First byte was not the STX start marker
    #[error("first byte of frame was 0x{0:02X}, expected STX 0x02")]
    BadStartByte(u8),
    /// Start marker seen but the rest of the frame did not arrive in time
    #[error("incomplete frame: expected {expected} bytes after STX, got {received}")]
    IncompleteFrame { expected: usize, received: usize },
    /// Payload field was not 10 hex digits
    #[error("payload is not hexadecimal: {0:?}")]
    MalformedPayload(String),
    /// XOR of the payload bytes does not match the checksum field
    #[error("checksum mismatch: frame carries {expected:?}, payload XORs to {computed:02X}")]
    ChecksumMismatch { expected: String, computed: u8 },
}

impl ReaderError {
    /// Frame errors are recoverable: the next read resumes at the next start marker
    pub fn is_frame_error(&self) -> bool {
        !matches!(self, ReaderError::Transport(_))
    }
}
