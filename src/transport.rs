use std::time::{Duration, Instant};

/// Trait for byte-stream backends a tag reader is attached to.
/// Implement this trait for different transports (UART, serial port, etc.)
pub trait ByteSource {
    /// Error type for transport operations
    type Error: std::fmt::Debug;

    /// Read whatever is available into `buf`.
    ///
    /// Waits at most `timeout` for data to arrive; `None` waits indefinitely.
    /// Returns `Ok(0)` when the timeout elapsed without any data.
    fn read(&mut self, buf: &mut [u8], timeout: Option<Duration>) -> Result<usize, Self::Error>;

    /// Clear the input buffer
    fn clear_input(&mut self) -> Result<(), Self::Error>;

    /// Read a single byte, or `None` if the timeout elapsed first
    fn read_byte(&mut self, timeout: Option<Duration>) -> Result<Option<u8>, Self::Error> {
        let mut byte = [0u8; 1];
        match self.read(&mut byte, timeout)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    /// Fill `buf` from successive reads until it is full or `timeout` has
    /// elapsed in total. Returns the number of bytes read, which is short
    /// of `buf.len()` only on timeout.
    fn read_fill(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Self::Error> {
        let deadline = Instant::now() + timeout;
        let mut filled = 0;

        while filled < buf.len() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.read(&mut buf[filled..], Some(remaining))? {
                0 => break,
                n => filled += n,
            }
        }

        Ok(filled)
    }
}
