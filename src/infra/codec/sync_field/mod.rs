//! Sync-field generation and classification.
//!
//! The sync field spans three bit times split into two half-windows of
//! 1.5 bit times each. It is deliberately invalid under Manchester rules
//! (no transition at any half-bit point), which is what makes it
//! detectable as a word boundary on a live bus.
use crate::core::{LineState, SyncKind};
use crate::error::FramingError;

/// The two half-windows of the sync field for `kind`.
///
/// Command sync leads high; data sync is its mirror image.
pub const fn sync_halves(kind: SyncKind) -> [LineState; 2] {
    match kind {
        SyncKind::Command => [LineState::High, LineState::Low],
        SyncKind::Data => [LineState::Low, LineState::High],
    }
}

/// Classify a candidate sync window from samples of its two halves.
///
/// Polarity is the only discriminator. A window that matches neither
/// kind is not an error condition on the bus — the scanner simply keeps
/// looking — but it is reported as [`FramingError::InvalidSync`] so the
/// caller can log the false trigger.
pub const fn classify_sync(
    first: LineState,
    second: LineState,
) -> Result<SyncKind, FramingError> {
    match (first, second) {
        (LineState::High, LineState::Low) => Ok(SyncKind::Command),
        (LineState::Low, LineState::High) => Ok(SyncKind::Data),
        _ => Err(FramingError::InvalidSync),
    }
}
