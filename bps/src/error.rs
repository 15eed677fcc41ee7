//! Error type for file-level BPS operations

use std::path::PathBuf;

use bps_core::BpsError;
use thiserror::Error;

/// Errors from loading, applying and writing patches
#[derive(Debug, Error)]
pub enum PatchError {
    /// Patch format or application failure from the core engine
    #[error(transparent)]
    Format(#[from] BpsError),

    /// Reading an input file failed
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing an output file failed
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The patch declares a target larger than the configured limit
    #[error("target of {size} bytes exceeds the configured limit of {limit} bytes")]
    TargetTooLarge { size: u64, limit: u64 },

    /// Metadata is not UTF-8
    #[error("patch metadata is not valid UTF-8")]
    MetadataEncoding,

    /// Metadata is not JSON
    #[cfg(feature = "serde")]
    #[error("patch metadata is not valid JSON: {0}")]
    MetadataJson(#[from] serde_json::Error),
}

impl PatchError {
    /// The core error, if this is one
    pub fn as_format(&self) -> Option<&BpsError> {
        match self {
            PatchError::Format(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for file-level BPS operations
pub type Result<T> = std::result::Result<T, PatchError>;
