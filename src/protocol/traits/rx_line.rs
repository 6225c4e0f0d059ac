//! Minimal abstraction for the read side of a differential pair.
use core::future::Future;
use core::time::Duration;

use crate::core::LineState;

/// Contract to sample a differential input line at chosen points in bus
/// time.
///
/// The receiver owns a sampling position that only moves forward:
/// `advance` steps it, `edge` jumps it to the next state change, and
/// `sample` reads the pair at the current position, suspending until the
/// backend's clock domain has produced signal that far.
pub trait RxLine {
    type Error: core::fmt::Debug;

    /// Read the pair at the current sampling position.
    fn sample<'a>(&'a mut self) -> impl Future<Output = Result<LineState, Self::Error>> + 'a;

    /// Suspend until the pair changes state, returning the new state and
    /// leaving the sampling position at the transition.
    fn edge<'a>(&'a mut self) -> impl Future<Output = Result<LineState, Self::Error>> + 'a;

    /// Move the sampling position forward by `step`.
    fn advance<'a>(
        &'a mut self,
        step: Duration,
    ) -> impl Future<Output = Result<(), Self::Error>> + 'a;
}
