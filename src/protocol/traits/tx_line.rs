//! Minimal abstraction for the write side of a differential pair.
//! Allows the library to plug into various backends (bus simulator,
//! embedded transceiver driver, in-memory test double).
use core::future::Future;
use core::time::Duration;

use crate::core::LineState;

/// Contract to drive a differential output line.
///
/// Time lives behind this seam: `drive` holds the state for `hold` of
/// *bus* time, which a simulator backend may satisfy without any
/// wall-clock delay. The transmit loop performs no other waiting.
pub trait TxLine {
    type Error: core::fmt::Debug;

    /// Drive the pair to `state` and hold it for `hold`. Asynchronous to
    /// accommodate backends that block on a clock domain.
    fn drive<'a>(
        &'a mut self,
        state: LineState,
        hold: Duration,
    ) -> impl Future<Output = Result<(), Self::Error>> + 'a;

    /// Stop driving; the pair returns to idle immediately.
    fn release(&mut self) -> Result<(), Self::Error>;
}
