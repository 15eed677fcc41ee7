//! Container parsing
//!
//! [`Patch::parse`] validates a complete patch file held in memory and
//! borrows its metadata and action stream without copying. Checks run in a
//! fixed order:
//!
//! 1. magic (`HeaderInvalid`, nothing else is inspected)
//! 2. room for the checksum trailer
//! 3. CRC32 of everything but the last four bytes (`PatchChecksumMismatch`)
//! 4. the three size varints, then the metadata slice
//!
//! Integrity is checked before the size fields are decoded, so a corrupted
//! size reports as a checksum mismatch rather than as a decode failure.

use core::ops::Range;

use crate::checksum::verify_checksum;
use crate::error::{BpsError, Field, Result};
use crate::format::constants::{MAGIC, MAGIC_SIZE, PATCH_CHECKSUM_SIZE};
use crate::format::{ActionReader, ActionStats, ChecksumTrailer, PatchHeader};
use crate::traits::ByteSource;
use crate::validation::to_usize;
use crate::varint;

/// A validated patch borrowing from the raw patch bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Patch<'a> {
    header: PatchHeader,
    metadata_offset: usize,
    metadata: &'a [u8],
    actions: &'a [u8],
}

/// Where the parts of a validated patch live inside its file
///
/// Lets owners of the raw bytes rebuild a [`Patch`] without verifying the
/// checksum again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchLayout {
    header: PatchHeader,
    file_size: usize,
    metadata: Range<usize>,
    actions: Range<usize>,
}

impl<'a> Patch<'a> {
    /// Parse and verify a complete patch file
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        let body = bytes.strip_prefix(&MAGIC).ok_or(BpsError::HeaderInvalid)?;

        let Some(trailer_start) = body.len().checked_sub(ChecksumTrailer::SIZE) else {
            return Err(BpsError::TruncatedInput(Field::ChecksumTrailer));
        };
        let (mut body, trailer) = body.split_at(trailer_start);
        let trailer = ChecksumTrailer::from_bytes(trailer)?;

        let covered = &bytes[..bytes.len() - PATCH_CHECKSUM_SIZE];
        verify_checksum(covered, trailer.patch_checksum()).map_err(|actual| {
            BpsError::PatchChecksumMismatch {
                expected: trailer.patch_checksum(),
                actual,
            }
        })?;

        let source_size = varint::read(&mut body, Field::SourceSize)?;
        let target_size = varint::read(&mut body, Field::TargetSize)?;
        let metadata_size = varint::read(&mut body, Field::MetadataSize)?;

        let metadata_len = to_usize(metadata_size, Field::Metadata)?;
        if metadata_len > body.len() {
            return Err(BpsError::TruncatedInput(Field::Metadata));
        }
        let metadata_offset = MAGIC_SIZE + trailer_start - body.len();
        let (metadata, actions) = body.split_at(metadata_len);

        Ok(Self {
            header: PatchHeader {
                source_size,
                target_size,
                metadata_size,
                source_checksum: trailer.source_checksum(),
                target_checksum: trailer.target_checksum(),
                patch_checksum: trailer.patch_checksum(),
            },
            metadata_offset,
            metadata,
            actions,
        })
    }

    /// Parse the whole content of a byte source
    pub fn from_source<S: ByteSource + ?Sized>(source: &'a S) -> Result<Self> {
        Self::parse(source.as_bytes())
    }

    pub const fn header(&self) -> &PatchHeader {
        &self.header
    }

    pub const fn source_size(&self) -> u64 {
        self.header.source_size
    }

    pub const fn target_size(&self) -> u64 {
        self.header.target_size
    }

    pub const fn source_checksum(&self) -> u32 {
        self.header.source_checksum
    }

    pub const fn target_checksum(&self) -> u32 {
        self.header.target_checksum
    }

    pub const fn patch_checksum(&self) -> u32 {
        self.header.patch_checksum
    }

    /// Raw metadata bytes
    pub const fn metadata(&self) -> &'a [u8] {
        self.metadata
    }

    /// Metadata as text, `None` if it is not valid UTF-8
    pub fn metadata_str(&self) -> Option<&'a str> {
        core::str::from_utf8(self.metadata).ok()
    }

    /// The undecoded action stream
    pub const fn action_stream(&self) -> &'a [u8] {
        self.actions
    }

    /// Decode the action stream lazily
    pub const fn actions(&self) -> ActionReader<'a> {
        ActionReader::new(self.actions)
    }

    /// Count actions by kind
    pub fn action_stats(&self) -> Result<ActionStats> {
        ActionStats::collect(self.actions)
    }

    /// Positions of the metadata and action stream within the patch file
    pub fn layout(&self) -> PatchLayout {
        let actions_start = self.metadata_offset + self.metadata.len();
        let actions_end = actions_start + self.actions.len();
        PatchLayout {
            header: self.header,
            file_size: actions_end + ChecksumTrailer::SIZE,
            metadata: self.metadata_offset..actions_start,
            actions: actions_start..actions_end,
        }
    }
}

impl PatchLayout {
    pub const fn header(&self) -> &PatchHeader {
        &self.header
    }

    /// Rebuild the patch over the bytes this layout was taken from
    ///
    /// Only the file size is rechecked; the caller is responsible for
    /// handing back the same bytes.
    pub fn bind<'a>(&self, file: &'a [u8]) -> Result<Patch<'a>> {
        if file.len() != self.file_size {
            return Err(BpsError::PatchSizeMismatch {
                expected: self.file_size as u64,
                actual: file.len() as u64,
            });
        }
        Ok(Patch {
            header: self.header,
            metadata_offset: self.metadata.start,
            metadata: &file[self.metadata.clone()],
            actions: &file[self.actions.clone()],
        })
    }
}

impl core::fmt::Display for Patch<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "BPS patch: {} -> {} bytes, {} metadata bytes, {} action bytes",
            self.header.source_size,
            self.header.target_size,
            self.header.metadata_size,
            self.actions.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::compute_checksum;
    use crate::format::constants::MIN_PATCH_SIZE;

    /// Assemble a container by hand, independent of the writer
    fn container(sizes: [u64; 2], metadata: &[u8], actions: &[u8], checks: [u32; 2]) -> Vec<u8> {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(varint::encode(sizes[0]).as_slice());
        bytes.extend_from_slice(varint::encode(sizes[1]).as_slice());
        bytes.extend_from_slice(varint::encode(metadata.len() as u64).as_slice());
        bytes.extend_from_slice(metadata);
        bytes.extend_from_slice(actions);
        bytes.extend_from_slice(&checks[0].to_le_bytes());
        bytes.extend_from_slice(&checks[1].to_le_bytes());
        let patch_checksum = compute_checksum(&bytes);
        bytes.extend_from_slice(&patch_checksum.to_le_bytes());
        bytes
    }

    #[test]
    fn test_parse_fields() {
        let metadata = br#"{"created":"2021-09-18"}"#;
        let actions = [0x84u8, 0x85, b'x', b'y'];
        let bytes = container([45, 92], metadata, &actions, [0x0133070d, 0x76c91265]);

        let patch = Patch::parse(&bytes).unwrap();
        assert_eq!(patch.source_size(), 45);
        assert_eq!(patch.target_size(), 92);
        assert_eq!(patch.header().metadata_size, metadata.len() as u64);
        assert_eq!(patch.metadata(), metadata);
        assert_eq!(patch.metadata_str(), Some(r#"{"created":"2021-09-18"}"#));
        assert_eq!(patch.action_stream(), &actions);
        assert_eq!(patch.source_checksum(), 0x0133070d);
        assert_eq!(patch.target_checksum(), 0x76c91265);
        assert_eq!(
            patch.patch_checksum(),
            compute_checksum(&bytes[..bytes.len() - 4])
        );
    }

    #[test]
    fn test_minimal_patch() {
        let bytes = container([0, 0], b"", b"", [0, 0]);
        assert_eq!(bytes.len(), MIN_PATCH_SIZE);
        let patch = Patch::parse(&bytes).unwrap();
        assert!(patch.action_stream().is_empty());
        assert!(patch.metadata().is_empty());
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = container([1, 1], b"", b"", [0, 0]);
        bytes[3] = b'2';
        assert_eq!(Patch::parse(&bytes), Err(BpsError::HeaderInvalid));
        assert_eq!(Patch::parse(b"BPS"), Err(BpsError::HeaderInvalid));
        assert_eq!(Patch::parse(b""), Err(BpsError::HeaderInvalid));
        assert_eq!(Patch::parse(b"UPS1garbage"), Err(BpsError::HeaderInvalid));
    }

    #[test]
    fn test_too_short_for_trailer() {
        assert_eq!(
            Patch::parse(b"BPS1\x80\x80\x80"),
            Err(BpsError::TruncatedInput(Field::ChecksumTrailer))
        );
    }

    #[test]
    fn test_bit_flips_fail_checksum() {
        let bytes = container([3, 8], b"meta", &[0x80, 0x81, b'q', 0x87], [7, 9]);
        let checksum_start = bytes.len() - PATCH_CHECKSUM_SIZE;

        for index in MAGIC_SIZE..checksum_start {
            for bit in 0..8 {
                let mut corrupted = bytes.clone();
                corrupted[index] ^= 1 << bit;
                assert!(
                    matches!(
                        Patch::parse(&corrupted),
                        Err(BpsError::PatchChecksumMismatch { .. })
                    ),
                    "flip of bit {bit} at byte {index} went unnoticed"
                );
            }
        }
    }

    #[test]
    fn test_metadata_longer_than_file() {
        // Checksum is valid, but metadata size points past the action stream
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&[0x80, 0x80, 0x8A]);
        bytes.extend_from_slice(b"abc");
        bytes.extend_from_slice(&[0u8; 8]);
        let checksum = compute_checksum(&bytes);
        bytes.extend_from_slice(&checksum.to_le_bytes());

        assert_eq!(
            Patch::parse(&bytes),
            Err(BpsError::TruncatedInput(Field::Metadata))
        );
    }

    #[test]
    fn test_truncated_size_varint() {
        // Size fields run into the trailer without a terminator
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&[0x80, 0x00]);
        bytes.extend_from_slice(&[0u8; 8]);
        let checksum = compute_checksum(&bytes);
        bytes.extend_from_slice(&checksum.to_le_bytes());

        assert_eq!(
            Patch::parse(&bytes),
            Err(BpsError::TruncatedInput(Field::TargetSize))
        );
    }

    #[test]
    fn test_layout_bind() {
        let bytes = container([5, 6], b"m", &[0x80, 0x80], [1, 2]);
        let patch = Patch::parse(&bytes).unwrap();
        let layout = patch.layout();
        assert_eq!(layout.bind(&bytes), Ok(patch));

        let expected = bytes.len() as u64;
        assert_eq!(
            layout.bind(&bytes[..bytes.len() - 1]),
            Err(BpsError::PatchSizeMismatch {
                expected,
                actual: expected - 1,
            })
        );
        let mut longer = bytes.clone();
        longer.push(0);
        assert_eq!(
            layout.bind(&longer),
            Err(BpsError::PatchSizeMismatch {
                expected,
                actual: expected + 1,
            })
        );
    }

    #[test]
    fn test_overflowing_size_varint() {
        // Eleven groups is more than a u64 can hold; the checksum is valid
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&[0x7F; 10]);
        bytes.push(0x80);
        bytes.extend_from_slice(&[0x80, 0x80]);
        bytes.extend_from_slice(&[0u8; 8]);
        let checksum = compute_checksum(&bytes);
        bytes.extend_from_slice(&checksum.to_le_bytes());

        assert_eq!(
            Patch::parse(&bytes),
            Err(BpsError::VarIntOverflow(Field::SourceSize))
        );

        // Same overflow one field later is tagged with that field
        let mut bytes = MAGIC.to_vec();
        bytes.push(0x80);
        bytes.extend_from_slice(&[0x7F; 10]);
        bytes.push(0x80);
        bytes.push(0x80);
        bytes.extend_from_slice(&[0u8; 8]);
        let checksum = compute_checksum(&bytes);
        bytes.extend_from_slice(&checksum.to_le_bytes());

        assert_eq!(
            Patch::parse(&bytes),
            Err(BpsError::VarIntOverflow(Field::TargetSize))
        );
    }
}
