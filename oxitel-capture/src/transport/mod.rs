pub mod mock;
pub mod serial;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to open serial device {device}: {source}")]
    Open {
        device: String,
        #[source]
        source: tokio_serial::Error,
    },
    #[error("read failed: {0}")]
    Read(#[from] std::io::Error),
    #[error("byte stream closed")]
    Closed,
    #[error("no sync marker seen within {0:?}")]
    SyncTimeout(std::time::Duration),
    #[error("acquisition cancelled")]
    Cancelled,
}

/// Minimal byte-stream capability the acquisition core depends on.
///
/// The contract mirrors a serial port with a per-read timeout: `read` may
/// return fewer bytes than requested, and returns `Ok(0)` when the timeout
/// expired with nothing buffered. A closed stream surfaces as
/// [`TransportError::Closed`].
#[async_trait]
pub trait ByteSource: Send {
    /// Read up to `buf.len()` bytes. `Ok(0)` means the per-read timeout
    /// expired, not end of stream.
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Discard any input buffered since the last read.
    fn flush_input(&mut self) -> Result<(), TransportError>;

    /// Release the underlying device. Must be called on every exit path,
    /// including cancellation.
    fn close(&mut self);
}
