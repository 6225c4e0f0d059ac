//! Transceiver loops of the 1553 physical layer: the transmit Source,
//! the receive Sink, and the trait seams to the signal backend.
pub mod sink;
pub mod source;
pub mod traits;
