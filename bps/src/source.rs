//! Byte sources backed by files
//!
//! Inputs are always materialized whole, either read into memory or
//! memory-mapped, and then handed to the core as one slice.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use bps_core::ByteSource;
#[cfg(feature = "mmap")]
use memmap2::{Mmap, MmapOptions};
use tracing::debug;

use crate::error::{PatchError, Result};

/// File content held in memory or mapped from disk
#[derive(Debug)]
pub enum LoadedBytes {
    /// Read into an owned buffer
    Owned(Vec<u8>),
    /// Memory-mapped, read-only
    #[cfg(feature = "mmap")]
    Mapped(Mmap),
}

impl LoadedBytes {
    /// Load a file, mapping it when `use_mmap` is set and the feature is on
    pub fn load<P: AsRef<Path>>(path: P, use_mmap: bool) -> Result<Self> {
        let path = path.as_ref();
        let read_error = |source| PatchError::Read {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).map_err(read_error)?;

        #[cfg(feature = "mmap")]
        if use_mmap {
            let len = file.metadata().map_err(read_error)?.len();
            // Zero-length files cannot be mapped on every platform
            if len > 0 {
                // SAFETY: the map is read-only and the file is only read for
                // the lifetime of the map; concurrent truncation by another
                // process is outside what this crate guards against.
                let mmap = unsafe { MmapOptions::new().map(&file) }.map_err(read_error)?;
                debug!(path = %path.display(), bytes = mmap.len(), "mapped input file");
                return Ok(LoadedBytes::Mapped(mmap));
            }
        }
        #[cfg(not(feature = "mmap"))]
        let _ = use_mmap;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(read_error)?;
        debug!(path = %path.display(), bytes = bytes.len(), "read input file");
        Ok(LoadedBytes::Owned(bytes))
    }

    pub fn is_mapped(&self) -> bool {
        match self {
            LoadedBytes::Owned(_) => false,
            #[cfg(feature = "mmap")]
            LoadedBytes::Mapped(_) => true,
        }
    }
}

impl ByteSource for LoadedBytes {
    fn as_bytes(&self) -> &[u8] {
        match self {
            LoadedBytes::Owned(bytes) => bytes.as_slice(),
            #[cfg(feature = "mmap")]
            LoadedBytes::Mapped(mmap) => &mmap[..],
        }
    }
}

impl From<Vec<u8>> for LoadedBytes {
    fn from(bytes: Vec<u8>) -> Self {
        LoadedBytes::Owned(bytes)
    }
}
