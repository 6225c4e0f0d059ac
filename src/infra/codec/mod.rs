//! Chip-level codec for MIL-STD-1553 words.
//!
//! A "chip" is the line state held for one half-bit period; every frame
//! quantizes to chips, so the codec works on fixed-size chip arrays and
//! leaves all timing to the transceiver loops.
pub mod framing;
pub mod manchester;
pub mod sync_field;
