//! Error definitions shared across library modules.
//! Each type models a specific failure scenario (payload validation,
//! non-blocking queue access, bounded waits, receive-side framing).
use thiserror_no_std::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Errors surfaced by the Source write operations, synchronously and
/// before anything reaches the transmit queue.
pub enum WriteError {
    /// A word is exactly two bytes of payload; anything else is a framing
    /// error at the API boundary.
    #[error("payload must be exactly 2 bytes, got {len}")]
    InvalidPayload { len: usize },
    /// The bounded transmit queue has no free slot (non-blocking writes
    /// only; blocking writes suspend instead).
    #[error("transmit queue is full")]
    QueueFull,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Errors surfaced by the non-blocking read operations.
pub enum ReadError {
    /// Nothing was available to take. Recoverable; retry or use a
    /// blocking read.
    #[error("queue is empty")]
    QueueEmpty,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Errors surfaced by the bounded availability waits.
pub enum WaitError {
    /// The timeout elapsed with no entry available. A timeout of zero
    /// never produces this: it means "wait indefinitely".
    #[error("timed out waiting for a queue entry")]
    Timeout,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Receive-side decode failures.
///
/// These never cross the harness API: the receive loop recovers locally
/// by discarding the word and resuming its sync scan. They are public
/// because the pure codec functions in [`crate::infra`] return them.
pub enum FramingError {
    /// No transition was observed at the expected half-bit point; the
    /// sampled halves do not form a Manchester bit.
    #[error("missing mid-bit transition")]
    MissingMidBitTransition,
    /// The 3-bit window matched neither the command nor the data sync
    /// polarity.
    #[error("window is not a valid sync field")]
    InvalidSync,
    /// Recomputed odd parity disagrees with the received parity bit.
    #[error("parity check failed")]
    ParityMismatch,
}
