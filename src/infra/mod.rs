//! Infrastructure modules: the pure, allocation-free chip-level codec.
pub mod codec;
