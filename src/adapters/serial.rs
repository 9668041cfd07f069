//! Serial device link (`serialport`).
//!
//! Opens the sensor's UART 8N1 with the configured read timeout. A read
//! that times out surfaces as [`LinkError::Timeout`] and the runner just
//! tries again.

use std::io::Read;
use std::time::Duration;

use log::info;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::app::ports::SerialLink;
use crate::config::SerialConfig;
use crate::error::LinkError;

pub struct SerialPortLink {
    port: Box<dyn SerialPort>,
}

impl SerialPortLink {
    pub fn open(config: &SerialConfig) -> Result<Self, serialport::Error> {
        let port = serialport::new(&config.port, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_millis(config.read_timeout_ms))
            .open()?;
        info!(
            "serial link open: {} @ {} baud, timeout {} ms",
            config.port, config.baud_rate, config.read_timeout_ms
        );
        Ok(Self { port })
    }
}

impl SerialLink for SerialPortLink {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        self.port.read(buf).map_err(|e| LinkError::from_io(&e))
    }
}
