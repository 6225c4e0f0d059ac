//! Manchester-II biphase encoding of single bits.
//!
//! A logical `1` is high for the first half-bit then low for the second;
//! a logical `0` is the exact inverse. The decoder accepts precisely the
//! encoder's output, so round-trip fidelity holds by construction.
use crate::core::LineState;
use crate::error::FramingError;

/// Encode one bit as its two half-bit chips.
pub const fn encode_bit(bit: bool) -> [LineState; 2] {
    if bit {
        [LineState::High, LineState::Low]
    } else {
        [LineState::Low, LineState::High]
    }
}

/// Decode one bit from samples of its two halves.
///
/// Anything other than a clean mid-bit transition — an idle sample, or
/// two halves at the same level — is a framing error; the caller drops
/// the word and resynchronizes at the next sync search.
pub const fn decode_bit(first: LineState, second: LineState) -> Result<bool, FramingError> {
    match (first, second) {
        (LineState::High, LineState::Low) => Ok(true),
        (LineState::Low, LineState::High) => Ok(false),
        _ => Err(FramingError::MissingMidBitTransition),
    }
}
