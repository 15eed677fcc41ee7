//! BPS - Binary Patch Loading and Application
//!
//! This library applies BPS patches to files and buffers on top of the pure
//! engine in `bps-core`.
//!
//! ## Architecture
//!
//! The workspace is split into an engine and an I/O layer:
//!
//! - **bps-core**: format definitions, varint codec, container parser and
//!   action interpreter (no I/O, `no_std`)
//! - **bps**: file and mmap loading, configuration, JSON metadata, parallel
//!   batch application and logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bps::{ApplyConfig, PatchFile};
//!
//! fn example() -> bps::Result<()> {
//!     let patch = PatchFile::open("hack.bps")?;
//!     println!("{} -> {} bytes", patch.header().source_size, patch.header().target_size);
//!
//!     let output = bps::apply_file("hack.bps", "base.sfc", "hacked.sfc", &ApplyConfig::default())?;
//!     assert!(output.verified);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **mmap**: memory-map patch and source files instead of reading them
//! - **serde**: JSON metadata access and serializable patch summaries
//! - **cli**: dependencies for the `bps_cli` example

// Re-export the core engine
pub use bps_core::{
    // Format definitions
    Action, ActionKind, ActionStats, PatchHeader,
    // Engine
    Applied, ApplyState, ByteSource, Interpreter, Patch, PatchWriter,
    // Error handling
    BpsError, ErrorCategory, Field,
};

pub mod apply;
pub mod batch;
pub mod config;
pub mod error;
pub mod file;
pub mod info;
#[cfg(feature = "serde")]
pub mod metadata;
pub mod source;

pub use apply::{apply_bytes, apply_file, ApplyOutput};
pub use batch::apply_batch;
pub use config::{ApplyConfig, TargetCheck};
pub use error::{PatchError, Result};
pub use file::PatchFile;
pub use info::PatchInfo;
#[cfg(feature = "serde")]
pub use metadata::MetadataView;
pub use source::LoadedBytes;
