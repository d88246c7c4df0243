use std::collections::VecDeque;

use async_trait::async_trait;
use oxitel_core::protocol::{FRAME_LEN, SYNC_MARKER};
use rand::Rng;
use tracing::info;

use super::{ByteSource, TransportError};

/// One scripted transport event.
#[derive(Debug, Clone)]
pub enum MockStep {
    /// Bytes available on the wire. A single read never crosses into the
    /// next step, so chunk boundaries model arrival timing.
    Bytes(Vec<u8>),
    /// A read window that expires with nothing buffered.
    Timeout,
}

/// Scripted byte source for tests and hardware-free runs.
///
/// Plays back a fixed sequence of [`MockStep`]s; an exhausted script behaves
/// like a closed stream. Bytes staged via [`MockSource::with_backlog`] sit in
/// front of the script until `flush_input` discards them, which is how the
/// clear-backlog policy of the frame reader is exercised.
pub struct MockSource {
    backlog: VecDeque<u8>,
    steps: VecDeque<MockStep>,
    flushes: usize,
}

impl MockSource {
    pub fn new(steps: Vec<MockStep>) -> Self {
        Self {
            backlog: VecDeque::new(),
            steps: steps.into(),
            flushes: 0,
        }
    }

    /// Script consisting of one contiguous run of bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::new(vec![MockStep::Bytes(bytes)])
    }

    /// Stage bytes that were "already in the buffer" before acquisition
    /// started. They are served before the script unless flushed.
    pub fn with_backlog(mut self, bytes: Vec<u8>) -> Self {
        self.backlog = bytes.into();
        self
    }

    /// Generate `frames` synthetic sensor frames with plausible vitals,
    /// each preceded by a little line noise.
    pub fn synthetic(frames: usize) -> Self {
        let mut rng = rand::rng();
        let mut steps = Vec::with_capacity(frames);

        for _ in 0..frames {
            let mut bytes = Vec::with_capacity(FRAME_LEN + 4);
            for _ in 0..rng.random_range(0..3usize) {
                // Noise never collides with the sync marker.
                bytes.push(rng.random_range(0x00..SYNC_MARKER));
            }
            bytes.push(SYNC_MARKER);
            bytes.extend_from_slice(&synthetic_payload(
                rng.random_range(55..110),
                rng.random_range(90..100),
            ));
            steps.push(MockStep::Bytes(bytes));
        }

        Self::new(steps)
    }

    /// Number of times `flush_input` ran.
    pub fn flush_count(&self) -> usize {
        self.flushes
    }
}

/// Build a full 10-byte payload carrying the given vitals, BCD-packed the
/// way the sensor sends them (tens digit in the high nibble).
pub fn synthetic_payload(heart_rate: u16, spo2: u16) -> [u8; FRAME_LEN] {
    let mut payload = [0u8; FRAME_LEN];
    payload[2] = bcd_pack((heart_rate / 100) as u8);
    payload[3] = bcd_pack((heart_rate % 100) as u8);
    payload[4] = bcd_pack((spo2 / 100) as u8);
    payload[5] = bcd_pack((spo2 % 100) as u8);
    payload
}

fn bcd_pack(value: u8) -> u8 {
    debug_assert!(value < 100);
    ((value / 10) << 4) | (value % 10)
}

#[async_trait]
impl ByteSource for MockSource {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        if buf.is_empty() {
            return Ok(0);
        }

        if !self.backlog.is_empty() {
            let n = buf.len().min(self.backlog.len());
            for slot in buf.iter_mut().take(n) {
                *slot = self.backlog.pop_front().expect("backlog length checked");
            }
            return Ok(n);
        }

        loop {
            match self.steps.front_mut() {
                None => return Err(TransportError::Closed),
                Some(MockStep::Timeout) => {
                    self.steps.pop_front();
                    return Ok(0);
                }
                Some(MockStep::Bytes(bytes)) if bytes.is_empty() => {
                    self.steps.pop_front();
                }
                Some(MockStep::Bytes(bytes)) => {
                    let n = buf.len().min(bytes.len());
                    for slot in buf.iter_mut().take(n) {
                        *slot = bytes.remove(0);
                    }
                    return Ok(n);
                }
            }
        }
    }

    fn flush_input(&mut self) -> Result<(), TransportError> {
        self.backlog.clear();
        self.flushes += 1;
        Ok(())
    }

    fn close(&mut self) {
        info!("Mock source closed");
    }
}
