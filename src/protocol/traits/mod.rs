//! Seams to the outside world. The core never owns a transport or a
//! clock: the differential pair and the timeout timer are opaque
//! capabilities provided by the integration (simulator backend, HAL,
//! test double).
pub mod bit_timer;
pub mod rx_line;
pub mod tx_line;
