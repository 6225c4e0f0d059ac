//! Whole-word framing: sync field, 16 Manchester-encoded payload bits
//! (MSB first), and one odd-parity bit, as a flat array of half-bit
//! chips.
//!
//! Frame layout in chips (one chip = T/2 on the wire):
//!
//! ```text
//! index:  0..3      3..6      6..38                38..40
//!         sync 1st  sync 2nd  16 bits × 2 chips    parity × 2 chips
//! ```
use crate::core::{LineState, SyncKind, Word, FRAME_CHIPS, SYNC_CHIPS, WORD_BITS};
use crate::error::FramingError;
use crate::infra::codec::manchester;
use crate::infra::codec::sync_field;

/// Chips per sync half-window.
const SYNC_HALF_CHIPS: usize = SYNC_CHIPS / 2;

/// Odd parity over the 16 payload bits: the bit that makes the total
/// count of ones (payload + parity) odd.
pub const fn parity_bit(value: u16) -> bool {
    value.count_ones() % 2 == 0
}

/// Lay a word out as its full 40-chip wire image.
pub fn encode_frame(word: &Word) -> [LineState; FRAME_CHIPS] {
    let mut chips = [LineState::Idle; FRAME_CHIPS];

    let halves = sync_field::sync_halves(word.kind());
    for i in 0..SYNC_HALF_CHIPS {
        chips[i] = halves[0];
        chips[SYNC_HALF_CHIPS + i] = halves[1];
    }

    let value = word.value();
    for bit_index in 0..WORD_BITS {
        let bit = (value >> (WORD_BITS - 1 - bit_index)) & 1 == 1;
        let pair = manchester::encode_bit(bit);
        chips[SYNC_CHIPS + 2 * bit_index] = pair[0];
        chips[SYNC_CHIPS + 2 * bit_index + 1] = pair[1];
    }

    let pair = manchester::encode_bit(parity_bit(value));
    chips[FRAME_CHIPS - 2] = pair[0];
    chips[FRAME_CHIPS - 1] = pair[1];

    chips
}

/// Recover a word from a 40-chip wire image.
///
/// The exact inverse of [`encode_frame`]: classifies the sync window from
/// one sample per half, Manchester-decodes the 16 data bits and the
/// parity bit, then checks odd parity over the decoded payload.
pub fn decode_frame(chips: &[LineState; FRAME_CHIPS]) -> Result<Word, FramingError> {
    // One sample inside each 1.5-bit half-window.
    let kind = sync_field::classify_sync(chips[1], chips[SYNC_HALF_CHIPS + 1])?;

    let mut value: u16 = 0;
    for bit_index in 0..WORD_BITS {
        let bit = manchester::decode_bit(
            chips[SYNC_CHIPS + 2 * bit_index],
            chips[SYNC_CHIPS + 2 * bit_index + 1],
        )?;
        value = (value << 1) | bit as u16;
    }

    let parity = manchester::decode_bit(chips[FRAME_CHIPS - 2], chips[FRAME_CHIPS - 1])?;
    if parity != parity_bit(value) {
        return Err(FramingError::ParityMismatch);
    }

    Ok(Word::from_u16(value, kind))
}
