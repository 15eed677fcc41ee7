//! Applying patches between files

use std::fs;
use std::path::Path;

use bps_core::ByteSource;
use tracing::info;

use crate::config::ApplyConfig;
use crate::error::{PatchError, Result};
use crate::file::PatchFile;
use crate::source::LoadedBytes;

/// A rebuilt target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutput {
    pub target: Vec<u8>,
    /// False only in advisory mode after a target checksum mismatch
    pub verified: bool,
}

/// Apply an in-memory patch to an in-memory source
pub fn apply_bytes(patch: &[u8], source: &[u8], config: &ApplyConfig) -> Result<ApplyOutput> {
    PatchFile::from_bytes(patch.to_vec())?.apply(source, config)
}

/// Apply the patch at `patch_path` to the file at `source_path` and write the target
pub fn apply_file<P, S, O>(
    patch_path: P,
    source_path: S,
    output_path: O,
    config: &ApplyConfig,
) -> Result<ApplyOutput>
where
    P: AsRef<Path>,
    S: AsRef<Path>,
    O: AsRef<Path>,
{
    let patch = PatchFile::open_with(patch_path, config)?;
    let source = LoadedBytes::load(source_path, config.use_mmap)?;
    let output = patch.apply(source.as_bytes(), config)?;

    let output_path = output_path.as_ref();
    fs::write(output_path, &output.target).map_err(|source| PatchError::Write {
        path: output_path.to_path_buf(),
        source,
    })?;
    info!(
        path = %output_path.display(),
        bytes = output.target.len(),
        verified = output.verified,
        "wrote target"
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bps_core::PatchWriter;

    #[test]
    fn test_apply_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let source = b"the source file contents".to_vec();
        let target = b"the target file contents, the target".to_vec();

        let mut writer = PatchWriter::new().with_metadata("{}");
        writer
            .source_read(4)
            .unwrap()
            .target_read(b"target")
            .unwrap()
            .source_copy(10, 14)
            .unwrap()
            .target_read(b", ")
            .unwrap()
            .target_copy(0, 10)
            .unwrap();
        let patch = writer.finish(&source, &target);

        let patch_path = dir.path().join("change.bps");
        let source_path = dir.path().join("source.bin");
        let output_path = dir.path().join("target.bin");
        fs::write(&patch_path, &patch).unwrap();
        fs::write(&source_path, &source).unwrap();

        let output = apply_file(&patch_path, &source_path, &output_path, &ApplyConfig::default())
            .unwrap();
        assert!(output.verified);
        assert_eq!(output.target, target);
        assert_eq!(fs::read(&output_path).unwrap(), target);

        let in_memory = apply_bytes(&patch, &source, &ApplyConfig::default()).unwrap();
        assert_eq!(in_memory, output);
    }

    #[test]
    fn test_apply_file_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let patch_path = dir.path().join("change.bps");
        let mut writer = PatchWriter::new();
        writer.target_read(b"x").unwrap();
        fs::write(&patch_path, writer.finish(b"", b"x")).unwrap();

        let err = apply_file(
            &patch_path,
            dir.path().join("missing.bin"),
            dir.path().join("out.bin"),
            &ApplyConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PatchError::Read { .. }));
        assert!(!dir.path().join("out.bin").exists());
    }
}
