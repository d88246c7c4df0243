use std::fmt;

pub type ParseResult<T> = Result<T, FrameError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Payload too short to reach both vital fields.
    TooShort { needed: usize, available: usize },
    /// A nibble outside 0–9 was found while decoding in strict mode.
    InvalidDigit { offset: usize, nibble: u8 },
}

impl std::error::Error for FrameError {}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::TooShort { needed, available } => {
                write!(f, "payload too short: need {needed} bytes, got {available}")
            }
            FrameError::InvalidDigit { offset, nibble } => {
                write!(f, "non-decimal nibble {nibble:#x} at payload offset {offset}")
            }
        }
    }
}
