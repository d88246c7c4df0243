use std::time::{Duration, Instant};

use oxitel_core::VitalSample;
use oxitel_core::protocol::{
    FRAME_LEN, ParseResult, RawFrame, SYNC_MARKER, decode_vitals, decode_vitals_strict,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::transport::{ByteSource, TransportError};

/// Frame synchronization and decoding front end.
///
/// One call to [`FrameReader::next_frame`] yields the payload of one frame:
/// flush whatever is stale, hunt for the sync marker, then collect up to
/// [`FRAME_LEN`] payload bytes. A transport timeout during payload collection
/// truncates the frame rather than failing it; length policy belongs to the
/// decode step.
pub struct FrameReader {
    strict: bool,
    scan_timeout: Option<Duration>,
}

impl FrameReader {
    pub fn new(strict: bool, scan_timeout: Option<Duration>) -> Self {
        Self {
            strict,
            scan_timeout,
        }
    }

    /// Acquire the next frame payload from the source.
    ///
    /// Buffered input is discarded first so a slow consumer never decodes
    /// stale data. The marker scan re-arms on every expired read; it ends
    /// only on a marker, a closed stream, cancellation, or the configured
    /// scan timeout.
    pub async fn next_frame(
        &self,
        source: &mut dyn ByteSource,
        cancel: &CancellationToken,
    ) -> Result<RawFrame, TransportError> {
        source.flush_input()?;

        let scan_started = Instant::now();
        let mut byte = [0u8; 1];
        loop {
            if let Some(limit) = self.scan_timeout {
                if scan_started.elapsed() >= limit {
                    return Err(TransportError::SyncTimeout(limit));
                }
            }

            let n = tokio::select! {
                _ = cancel.cancelled() => return Err(TransportError::Cancelled),
                r = source.read(&mut byte) => r?,
            };

            if n == 1 && byte[0] == SYNC_MARKER {
                break;
            }
            // n == 0 is an expired read window; keep scanning.
        }

        debug!(
            scan_ms = scan_started.elapsed().as_millis() as u64,
            "Sync marker found"
        );

        let mut payload = vec![0u8; FRAME_LEN];
        let mut filled = 0;
        while filled < FRAME_LEN {
            let n = tokio::select! {
                _ = cancel.cancelled() => return Err(TransportError::Cancelled),
                r = source.read(&mut payload[filled..]) => r?,
            };
            if n == 0 {
                // Timed out mid-frame: hand back the short payload as-is.
                break;
            }
            filled += n;
        }
        payload.truncate(filled);

        Ok(RawFrame::new(payload))
    }

    /// Decode one frame payload according to the configured strictness.
    pub fn decode(&self, frame: &RawFrame) -> ParseResult<VitalSample> {
        if self.strict {
            decode_vitals_strict(frame.as_bytes())
        } else {
            decode_vitals(frame.as_bytes())
        }
    }
}
