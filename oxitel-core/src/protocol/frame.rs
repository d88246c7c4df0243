use super::error::{FrameError, ParseResult};
use super::{FRAME_LEN, HEART_RATE_OFFSET, MIN_DECODE_LEN, SPO2_OFFSET};
use crate::VitalSample;

/// The payload captured after one sync marker.
///
/// Holds at most [`FRAME_LEN`] bytes but may hold fewer when the transport
/// timed out mid-frame. Length is checked by [`decode_vitals`], not here:
/// the acquisition side hands back whatever it obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    bytes: Box<[u8]>,
}

impl RawFrame {
    pub fn new(bytes: Vec<u8>) -> Self {
        debug_assert!(bytes.len() <= FRAME_LEN);
        Self {
            bytes: bytes.into_boxed_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsRef<[u8]> for RawFrame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// BCD nibble expansion: high nibble is the tens digit, low nibble the ones.
///
/// Nibbles A–F are not rejected here and contribute 10–15 to the result,
/// matching the sensor's observed wire behavior. Strict decoding rejects
/// them via [`decode_vitals_strict`].
pub fn bcd_byte(n: u8) -> u16 {
    ((n >> 4) & 0xF) as u16 * 10 + (n & 0xF) as u16
}

/// Decode heart rate and SpO2 from a frame payload.
///
/// Pure and deterministic: the same bytes always yield the same sample.
pub fn decode_vitals(payload: &[u8]) -> ParseResult<VitalSample> {
    decode_inner(payload, false)
}

/// Like [`decode_vitals`], but fails with [`FrameError::InvalidDigit`] when
/// any nibble of the four vital bytes lies outside 0–9.
pub fn decode_vitals_strict(payload: &[u8]) -> ParseResult<VitalSample> {
    decode_inner(payload, true)
}

fn decode_inner(payload: &[u8], strict: bool) -> ParseResult<VitalSample> {
    if payload.len() < MIN_DECODE_LEN {
        return Err(FrameError::TooShort {
            needed: MIN_DECODE_LEN,
            available: payload.len(),
        });
    }

    if strict {
        for offset in HEART_RATE_OFFSET..MIN_DECODE_LEN {
            let byte = payload[offset];
            for nibble in [(byte >> 4) & 0xF, byte & 0xF] {
                if nibble > 9 {
                    return Err(FrameError::InvalidDigit { offset, nibble });
                }
            }
        }
    }

    let heart_rate =
        bcd_byte(payload[HEART_RATE_OFFSET]) * 100 + bcd_byte(payload[HEART_RATE_OFFSET + 1]);
    let spo2 = bcd_byte(payload[SPO2_OFFSET]) * 100 + bcd_byte(payload[SPO2_OFFSET + 1]);

    Ok(VitalSample { heart_rate, spo2 })
}
