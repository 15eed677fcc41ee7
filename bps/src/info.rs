//! Patch summaries for inspection tools

use bps_core::{ActionStats, PatchHeader};
#[cfg(feature = "serde")]
use serde::Serialize;

use crate::error::Result;
use crate::file::PatchFile;

/// Everything a patch declares, plus a tally of its actions
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PatchInfo {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub header: PatchHeader,
    pub action_stream_size: usize,
    pub actions: ActionStats,
    /// Metadata as text, if it is UTF-8
    pub metadata: Option<String>,
}

impl PatchInfo {
    /// Summarize a patch, decoding its whole action stream
    pub fn collect(file: &PatchFile) -> Result<Self> {
        let patch = file.patch()?;
        Ok(Self {
            header: *patch.header(),
            action_stream_size: patch.action_stream().len(),
            actions: patch.action_stats()?,
            metadata: patch.metadata_str().map(str::to_owned),
        })
    }
}

impl std::fmt::Display for PatchInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header = &self.header;
        writeln!(f, "Source size:     {}", header.source_size)?;
        writeln!(f, "Target size:     {}", header.target_size)?;
        writeln!(f, "Metadata size:   {}", header.metadata_size)?;
        writeln!(f, "Source checksum: {:#010x}", header.source_checksum)?;
        writeln!(f, "Target checksum: {:#010x}", header.target_checksum)?;
        writeln!(f, "Patch checksum:  {:#010x}", header.patch_checksum)?;
        writeln!(f, "Action stream:   {} bytes", self.action_stream_size)?;
        writeln!(
            f,
            "Actions:         {} (SourceRead {}, TargetRead {}, SourceCopy {}, TargetCopy {})",
            self.actions.total(),
            self.actions.source_read,
            self.actions.target_read,
            self.actions.source_copy,
            self.actions.target_copy
        )?;
        if let Some(metadata) = &self.metadata {
            if !metadata.is_empty() {
                writeln!(f, "Metadata:        {metadata}")?;
            }
        }
        Ok(())
    }
}
