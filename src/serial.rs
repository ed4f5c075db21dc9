//! Serial port transport for desktop and Raspberry Pi using serialport crate

use crate::transport::ByteSource;
use std::io::ErrorKind;
use std::time::Duration;

/// Poll slice used while waiting indefinitely for the first byte
const BLOCKING_POLL: Duration = Duration::from_secs(1);

pub struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialTransport {
    /// Baud rate used by ID-Innovations and RDM readers
    pub const DEFAULT_BAUD_RATE: u32 = 9600;

    pub fn new(port_name: &str, baud_rate: u32) -> Result<Self, serialport::Error> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(BLOCKING_POLL)
            .open()?;
        port.clear(serialport::ClearBuffer::Input)?;

        Ok(Self { port })
    }

    /// Open `port_name` at the readers' fixed 9600 baud
    pub fn open(port_name: &str) -> Result<Self, serialport::Error> {
        Self::new(port_name, Self::DEFAULT_BAUD_RATE)
    }

    fn read_once(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, std::io::Error> {
        self.port.set_timeout(timeout).map_err(std::io::Error::other)?;
        match std::io::Read::read(&mut self.port, buf) {
            Err(e) if e.kind() == ErrorKind::TimedOut => Ok(0),
            other => other,
        }
    }
}

impl ByteSource for SerialTransport {
    type Error = std::io::Error;

    fn read(&mut self, buf: &mut [u8], timeout: Option<Duration>) -> Result<usize, Self::Error> {
        match timeout {
            Some(timeout) => self.read_once(buf, timeout),
            None => loop {
                match self.read_once(buf, BLOCKING_POLL)? {
                    0 => continue,
                    n => return Ok(n),
                }
            },
        }
    }

    fn clear_input(&mut self) -> Result<(), Self::Error> {
        self.port
            .clear(serialport::ClearBuffer::Input)
            .map_err(std::io::Error::other)
    }
}
