mod error;
mod frame;

pub use error::{FrameError, ParseResult};
pub use frame::{RawFrame, bcd_byte, decode_vitals, decode_vitals_strict};

// frame structure on the wire : sync marker(1) + payload(10), no checksum

/// Byte that delimits the start of every frame. Consumed during the scan,
/// never part of the payload.
pub const SYNC_MARKER: u8 = 0xFA;
/// Full payload length following the sync marker.
pub const FRAME_LEN: usize = 10;
/// Minimum payload length needed to reach both vital fields.
pub const MIN_DECODE_LEN: usize = 6;
/// Offset of the two heart-rate bytes within the payload.
pub const HEART_RATE_OFFSET: usize = 2;
/// Offset of the two SpO2 bytes within the payload.
pub const SPO2_OFFSET: usize = 4;
