//! `mil1553-phy` library: a software model of a MIL-STD-1553 bus
//! transceiver pair in a `no_std` environment. The crate exposes the
//! chip-level codec (Manchester-II, sync fields, word framing), the
//! Source/Sink queue machinery, and the trait seams to a signal backend.
#![no_std]
//==================================================================================
/// Core data types shared by the codec and the transceiver loops.
pub mod core;
/// Domain errors (payload validation, queue access, bounded waits,
/// receive-side framing).
pub mod error;
/// Pure chip-level encoding and decoding of MIL-STD-1553 words.
pub mod infra;
/// Transceiver loops: transmit Source, receive Sink, and the traits
/// binding them to a differential line and a timeout clock.
pub mod protocol;
//==================================================================================
