//! Asynchronous timer abstraction backing the bounded availability
//! waits (`wait_cmd`/`wait_data`).

use core::future::Future;
use core::time::Duration;

/// Timer trait abstraction; must remain thread-safe when applicable.
pub trait BitTimer {
    /// Asynchronously wait for `duration` to elapse.
    fn delay<'a>(&'a mut self, duration: Duration) -> impl Future<Output = ()> + 'a;
}
