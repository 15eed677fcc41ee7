//! Fixed fields of a BPS patch
//!
//! The size fields are varints and live right after the magic; the three
//! checksums are a fixed 12-byte little-endian trailer at the end of the file.

use bytemuck::{Pod, Zeroable};

use super::constants::CHECKSUM_TRAILER_SIZE;
use crate::error::{BpsError, Field, Result};

/// Sizes and checksums declared by a patch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PatchHeader {
    /// Exact size of the source the patch applies to
    pub source_size: u64,
    /// Exact size of the target the patch produces
    pub target_size: u64,
    /// Number of metadata bytes
    pub metadata_size: u64,
    /// CRC32 of the source
    pub source_checksum: u32,
    /// CRC32 of the target
    pub target_checksum: u32,
    /// CRC32 of the whole patch minus this field
    pub patch_checksum: u32,
}

/// Trailing checksums as they appear on the wire
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct ChecksumTrailer {
    source: [u8; 4],
    target: [u8; 4],
    patch: [u8; 4],
}

impl ChecksumTrailer {
    /// Size of the trailer in bytes
    pub const SIZE: usize = CHECKSUM_TRAILER_SIZE;

    /// Build a trailer from checksum values
    pub const fn new(source: u32, target: u32, patch: u32) -> Self {
        Self {
            source: source.to_le_bytes(),
            target: target.to_le_bytes(),
            patch: patch.to_le_bytes(),
        }
    }

    /// Parse a trailer from exactly [`Self::SIZE`] bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::SIZE {
            return Err(BpsError::TruncatedInput(Field::ChecksumTrailer));
        }
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    /// Wire representation
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    pub const fn source_checksum(&self) -> u32 {
        u32::from_le_bytes(self.source)
    }

    pub const fn target_checksum(&self) -> u32 {
        u32::from_le_bytes(self.target)
    }

    pub const fn patch_checksum(&self) -> u32 {
        u32::from_le_bytes(self.patch)
    }
}
