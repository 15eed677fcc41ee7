//! Patch files
//!
//! A `PatchFile` owns the raw bytes of a patch, validated once on open.
//! Parsing only borrows, so the validated layout is kept alongside the bytes
//! and rebound on demand.

use std::path::{Path, PathBuf};

use bps_core::{ByteSource, Patch, PatchHeader, PatchLayout};
use tracing::{debug, debug_span, warn};

use crate::apply::ApplyOutput;
use crate::config::ApplyConfig;
use crate::error::{PatchError, Result};
use crate::source::LoadedBytes;

/// A validated BPS patch and the bytes it lives in
#[derive(Debug)]
pub struct PatchFile {
    bytes: LoadedBytes,
    layout: PatchLayout,
    path: Option<PathBuf>,
}

impl PatchFile {
    /// Open and validate a patch file with default settings
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, &ApplyConfig::default())
    }

    /// Open and validate a patch file
    pub fn open_with<P: AsRef<Path>>(path: P, config: &ApplyConfig) -> Result<Self> {
        let path = path.as_ref();
        let bytes = LoadedBytes::load(path, config.use_mmap)?;
        let mut file = Self::from_loaded(bytes)?;
        file.path = Some(path.to_path_buf());
        Ok(file)
    }

    /// Validate a patch already in memory
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_loaded(LoadedBytes::Owned(bytes))
    }

    fn from_loaded(bytes: LoadedBytes) -> Result<Self> {
        let layout = Patch::parse(bytes.as_bytes())
            .inspect_err(|err| debug!(%err, "patch rejected"))?
            .layout();
        let header = layout.header();
        debug!(
            source_size = header.source_size,
            target_size = header.target_size,
            metadata_size = header.metadata_size,
            "patch validated"
        );
        Ok(Self {
            bytes,
            layout,
            path: None,
        })
    }

    /// The parsed patch, borrowing from this file
    pub fn patch(&self) -> Result<Patch<'_>> {
        Ok(self.layout.bind(self.bytes.as_bytes())?)
    }

    pub fn header(&self) -> &PatchHeader {
        self.layout.header()
    }

    /// Where the patch was loaded from, if it came from disk
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_mapped(&self) -> bool {
        self.bytes.is_mapped()
    }

    /// Apply the patch to `source`
    ///
    /// Refuses targets above `config.max_target_size`. With
    /// [`TargetCheck::Advisory`](crate::TargetCheck::Advisory) a target
    /// checksum mismatch is logged and the unverified target returned.
    pub fn apply(&self, source: &[u8], config: &ApplyConfig) -> Result<ApplyOutput> {
        let header = self.header();
        if header.target_size > config.max_target_size {
            return Err(PatchError::TargetTooLarge {
                size: header.target_size,
                limit: config.max_target_size,
            });
        }

        let span = debug_span!(
            "apply",
            source_size = header.source_size,
            target_size = header.target_size
        );
        let _guard = span.enter();

        let applied = self
            .patch()?
            .apply_advisory(source)
            .inspect_err(|err| warn!(%err, "patch application failed"))?;

        match applied.checksum_mismatch {
            None => {
                debug!("target verified");
                Ok(ApplyOutput {
                    target: applied.target,
                    verified: true,
                })
            }
            Some(err) if config.is_advisory() => {
                warn!(%err, "returning unverified target");
                Ok(ApplyOutput {
                    target: applied.target,
                    verified: false,
                })
            }
            Some(err) => {
                warn!(%err, "target rejected");
                Err(err.into())
            }
        }
    }
}

impl ByteSource for PatchFile {
    fn as_bytes(&self) -> &[u8] {
        self.bytes.as_bytes()
    }
}
