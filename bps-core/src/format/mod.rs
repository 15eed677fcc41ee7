//! Binary format definitions for the BPS container
//!
//! This module contains the wire layout of a patch file and of the action
//! stream it carries. Parsing lives in [`crate::patch`], execution in
//! [`crate::interpreter`].

pub mod action;
pub mod constants;
pub mod header;

pub use action::{Action, ActionKind, ActionReader, ActionStats};
pub use header::{ChecksumTrailer, PatchHeader};
