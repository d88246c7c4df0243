use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio_serial::{ClearBuffer, SerialPort, SerialPortBuilderExt, SerialStream};
use tracing::info;

use super::{ByteSource, TransportError};

/// Serial-attached biosensor link.
///
/// The read timeout is applied here so that callers see the pyserial-style
/// contract: an expired read returns zero bytes rather than an error.
pub struct SerialSource {
    stream: SerialStream,
    device: String,
    read_timeout: Duration,
}

impl SerialSource {
    /// Open the device. Failure here is fatal to the process; there is no
    /// reconnect path for a measurement cycle that never started.
    pub fn open(device: &str, baud: u32, read_timeout: Duration) -> Result<Self, TransportError> {
        let stream = tokio_serial::new(device, baud)
            .open_native_async()
            .map_err(|source| TransportError::Open {
                device: device.to_string(),
                source,
            })?;

        info!(device, baud, "Serial device opened");

        Ok(Self {
            stream,
            device: device.to_string(),
            read_timeout,
        })
    }
}

#[async_trait]
impl ByteSource for SerialSource {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        match tokio::time::timeout(self.read_timeout, self.stream.read(buf)).await {
            Ok(Ok(0)) => Err(TransportError::Closed),
            Ok(Ok(n)) => Ok(n),
            Ok(Err(e)) => Err(TransportError::Read(e)),
            // Timeout: nothing arrived within the window.
            Err(_) => Ok(0),
        }
    }

    fn flush_input(&mut self) -> Result<(), TransportError> {
        self.stream
            .clear(ClearBuffer::Input)
            .map_err(|e| TransportError::Read(std::io::Error::other(e)))
    }

    fn close(&mut self) {
        // The handle is released on drop; this marks the intent in the log.
        info!(device = %self.device, "Serial device closed");
    }
}
