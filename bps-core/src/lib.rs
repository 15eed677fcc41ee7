#![cfg_attr(not(test), no_std)]

//! BPS Core - Binary Patch Format Definitions and Engine
//!
//! This crate provides the pure, I/O-free core of the BPS patch format:
//!
//! - [`varint`]: the format's biased variable-length integer codec
//! - [`Patch::parse`]: container validation and slicing
//! - [`Interpreter`]: the action stream state machine that rebuilds a target
//! - [`checksum`]: CRC32 (IEEE) helpers for the three integrity points
//!
//! Everything works on borrowed, memory-resident buffers. Enable the `alloc`
//! feature for `Vec`-returning helpers and [`PatchWriter`].

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod checksum;
pub mod error;
pub mod format;
pub mod interpreter;
pub mod patch;
pub mod traits;
pub mod validation;
pub mod varint;
#[cfg(feature = "alloc")]
pub mod writer;

pub use error::*;
pub use format::*;
pub use interpreter::{ApplyState, Cursors, Interpreter};
#[cfg(feature = "alloc")]
pub use interpreter::Applied;
pub use patch::{Patch, PatchLayout};
pub use traits::*;
pub use validation::*;
#[cfg(feature = "alloc")]
pub use writer::PatchWriter;
