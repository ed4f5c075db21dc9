//! UART transport for ESP32 using esp-idf-svc

use crate::transport::ByteSource;
use esp_idf_svc::hal::delay::{TickType, BLOCK};
use esp_idf_svc::hal::gpio::{self, InputPin, OutputPin};
use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::hal::uart::{self, UartDriver};
use std::time::Duration;

pub struct UartTransport<'a> {
    uart: UartDriver<'a>,
}

impl<'a> UartTransport<'a> {
    /// The reader only transmits, so TX may be any unused output pin.
    pub fn new(
        uart: impl Peripheral<P = impl uart::Uart> + 'a,
        tx: impl Peripheral<P = impl OutputPin> + 'a,
        rx: impl Peripheral<P = impl InputPin> + 'a,
        baud_rate: u32,
    ) -> Result<Self, esp_idf_svc::sys::EspError> {
        let config = uart::config::Config::default().baudrate(baud_rate.into());
        let uart = UartDriver::new(
            uart,
            tx,
            rx,
            Option::<gpio::Gpio0>::None,
            Option::<gpio::Gpio0>::None,
            &config,
        )?;
        uart.clear_rx()?;

        Ok(Self { uart })
    }
}

impl ByteSource for UartTransport<'_> {
    type Error = esp_idf_svc::sys::EspError;

    fn read(&mut self, buf: &mut [u8], timeout: Option<Duration>) -> Result<usize, Self::Error> {
        let ticks = match timeout {
            Some(timeout) => TickType::from(timeout).ticks(),
            None => BLOCK,
        };
        self.uart.read(buf, ticks)
    }

    fn clear_input(&mut self) -> Result<(), Self::Error> {
        self.uart.clear_rx()
    }
}
