//! Bounds validation for cursor arithmetic and declared sizes
//!
//! Pure functions with no I/O. Everything the interpreter does to a cursor
//! goes through here so that overflow and underflow surface as `None`
//! instead of wrapping.

pub mod bounds;

pub use bounds::{checked_span, displace, to_usize};
