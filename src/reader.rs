use log::{debug, error, warn};
use std::time::{Duration, Instant};

use crate::checksum;
use crate::transport::ByteSource;
use crate::types::{ReaderError, ReaderProfile, TagId, FRAME_CHECKSUM_LEN, FRAME_PAYLOAD_LEN};

// Protocol constants
const STX: u8 = 0x02;
const MAX_FRAME_LENGTH: usize = 16;

/// Decoder for the fixed-length ASCII frames sent by ID and RDM readers
pub struct TagReader<T: ByteSource> {
    transport: T,
    profile: ReaderProfile,
}

impl<T: ByteSource> TagReader<T> {
    /// Create a new tag reader with the given transport and profile
    pub fn new(transport: T, profile: ReaderProfile) -> Self {
        Self { transport, profile }
    }

    pub fn profile(&self) -> &ReaderProfile {
        &self.profile
    }

    /// Give back the underlying transport
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Discard everything buffered by the transport.
    ///
    /// Useful when a tag leaves range: anything still buffered describes
    /// the past, not what is in front of the reader now.
    pub fn clear_buffer(&mut self) -> Result<(), ReaderError> {
        debug!("Clearing input buffer");
        self.transport.clear_input().map_err(transport_error)
    }

    /// Read one frame from the reader
    ///
    /// # Returns
    /// * `Ok(Some(tag))` - a complete, valid frame was decoded
    /// * `Ok(None)` - no byte arrived within the profile's `read_timeout`
    /// * `Err(_)` - the frame was rejected; the input buffer has been flushed
    ///   and the next call resumes at the next start marker
    pub fn read_tag(&mut self) -> Result<Option<TagId>, ReaderError> {
        self.read_tag_within(self.profile.read_timeout)
    }

    /// Read tags for a specified duration with a callback
    ///
    /// Frame errors are logged and skipped; transport errors abort the scan.
    /// The first-byte wait never extends past the end of `duration`, so this
    /// returns on time even with a blocking profile.
    ///
    /// # Returns
    /// Number of tags decoded
    pub fn scan_for<F>(&mut self, duration: Duration, mut callback: F) -> Result<usize, ReaderError>
    where
        F: FnMut(TagId),
    {
        let deadline = Instant::now() + duration;
        let mut tag_count = 0;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            let timeout = match self.profile.read_timeout {
                Some(timeout) => timeout.min(remaining),
                None => remaining,
            };

            match self.read_tag_within(Some(timeout)) {
                Ok(Some(tag)) => {
                    callback(tag);
                    tag_count += 1;
                }
                Ok(None) => {}
                Err(e) if e.is_frame_error() => warn!("Skipping frame: {}", e),
                Err(e) => return Err(e),
            }
        }

        Ok(tag_count)
    }

    /// Read tags for a specified duration
    ///
    /// # Returns
    /// Every tag decoded, in order, including repeats
    pub fn scan(&mut self, duration: Duration) -> Result<Vec<TagId>, ReaderError> {
        let mut tags = Vec::new();
        self.scan_for(duration, |tag| tags.push(tag))?;
        Ok(tags)
    }

    fn read_tag_within(&mut self, timeout: Option<Duration>) -> Result<Option<TagId>, ReaderError> {
        let first = match self.transport.read_byte(timeout) {
            Ok(byte) => byte,
            Err(e) => return Err(self.transport_failure(e)),
        };

        match first {
            None => return Ok(None),
            Some(STX) => {}
            Some(byte) => return Err(self.reject(ReaderError::BadStartByte(byte))),
        }

        let expected = self.profile.frame_length() - 1;
        let mut buffer = [0u8; MAX_FRAME_LENGTH - 1];
        let body = &mut buffer[..expected];

        let received = match self.transport.read_fill(body, self.profile.intra_frame_timeout) {
            Ok(n) => n,
            Err(e) => return Err(self.transport_failure(e)),
        };
        debug!("Received frame body ({} bytes): {:02X?}", received, &body[..received]);

        if received < expected {
            return Err(self.reject(ReaderError::IncompleteFrame { expected, received }));
        }

        let body = &buffer[..expected];
        Self::parse_frame(body, self.profile.checksum_enabled)
            .map(Some)
            .map_err(|e| self.reject(e))
    }

    /// Decode the bytes following STX. Trailing terminator bytes are not inspected.
    pub(crate) fn parse_frame(body: &[u8], checksum_enabled: bool) -> Result<TagId, ReaderError> {
        let checksum_end = FRAME_PAYLOAD_LEN + FRAME_CHECKSUM_LEN;
        if body.len() < checksum_end {
            return Err(ReaderError::IncompleteFrame {
                expected: checksum_end,
                received: body.len(),
            });
        }

        let payload = &body[..FRAME_PAYLOAD_LEN];
        let check = &body[FRAME_PAYLOAD_LEN..checksum_end];

        let value = checksum::parse_hex(payload).ok_or_else(|| {
            ReaderError::MalformedPayload(String::from_utf8_lossy(payload).into_owned())
        })?;

        if checksum_enabled && !checksum::verify(payload, check) {
            return Err(ReaderError::ChecksumMismatch {
                expected: String::from_utf8_lossy(check).into_owned(),
                computed: checksum::compute(payload).unwrap_or_default(),
            });
        }

        Ok(TagId::new(value))
    }

    /// Flush input and hand back `err`
    fn reject(&mut self, err: ReaderError) -> ReaderError {
        debug!("Rejecting frame, flushing input: {}", err);
        if let Err(e) = self.transport.clear_input() {
            error!("Failed to flush input after rejected frame: {:?}", e);
        }
        err
    }

    fn transport_failure(&mut self, e: T::Error) -> ReaderError {
        error!("Read error: {:?}", e);
        if let Err(flush) = self.transport.clear_input() {
            error!("Failed to flush input after read error: {:?}", flush);
        }
        transport_error(e)
    }
}

fn transport_error<E: std::fmt::Debug>(e: E) -> ReaderError {
    ReaderError::Transport(format!("{:?}", e))
}
