//! Patch serialization from an explicit action list
//!
//! `PatchWriter` does not diff anything. It takes actions the caller has
//! already chosen, tracks the same cursors the interpreter does so copies
//! can be given as absolute offsets, and assembles a checksummed container.

use alloc::vec::Vec;

use crate::checksum::compute_checksum;
use crate::error::{BpsError, Result};
use crate::format::action::{encode_displacement, encode_header};
use crate::format::constants::MAGIC;
use crate::format::{ActionKind, ChecksumTrailer};
use crate::interpreter::Cursors;
use crate::varint;

/// Builds a BPS patch action by action
#[derive(Debug, Clone, Default)]
pub struct PatchWriter {
    metadata: Vec<u8>,
    actions: Vec<u8>,
    cursors: Cursors,
}

impl PatchWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the opaque metadata block
    pub fn with_metadata(mut self, metadata: impl AsRef<[u8]>) -> Self {
        self.metadata = metadata.as_ref().to_vec();
        self
    }

    /// Target bytes produced so far
    pub const fn output_len(&self) -> u64 {
        self.cursors.output
    }

    /// Copy `length` source bytes at the current output position
    pub fn source_read(&mut self, length: u64) -> Result<&mut Self> {
        self.push_header(ActionKind::SourceRead, length)?;
        self.cursors.output += length;
        Ok(self)
    }

    /// Emit literal target bytes
    pub fn target_read(&mut self, data: &[u8]) -> Result<&mut Self> {
        let length = data.len() as u64;
        self.push_header(ActionKind::TargetRead, length)?;
        self.actions.extend_from_slice(data);
        self.cursors.output += length;
        Ok(self)
    }

    /// Copy `length` source bytes starting at absolute `offset`
    pub fn source_copy(&mut self, offset: u64, length: u64) -> Result<&mut Self> {
        let from = self.cursors.source;
        self.push_copy(ActionKind::SourceCopy, from, offset, length)?;
        self.cursors.source = offset + length;
        Ok(self)
    }

    /// Copy `length` already produced target bytes starting at absolute `offset`
    ///
    /// The range may overlap the bytes this action writes.
    pub fn target_copy(&mut self, offset: u64, length: u64) -> Result<&mut Self> {
        let from = self.cursors.target;
        self.push_copy(ActionKind::TargetCopy, from, offset, length)?;
        self.cursors.target = offset + length;
        Ok(self)
    }

    /// Assemble the container for the given source and target
    pub fn finish(&self, source: &[u8], target: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(
            MAGIC.len()
                + 3 * varint::MAX_ENCODED_LEN
                + self.metadata.len()
                + self.actions.len()
                + ChecksumTrailer::SIZE,
        );
        bytes.extend_from_slice(&MAGIC);
        for size in [source.len(), target.len(), self.metadata.len()] {
            bytes.extend_from_slice(varint::encode(size as u64).as_slice());
        }
        bytes.extend_from_slice(&self.metadata);
        bytes.extend_from_slice(&self.actions);
        bytes.extend_from_slice(&compute_checksum(source).to_le_bytes());
        bytes.extend_from_slice(&compute_checksum(target).to_le_bytes());
        let patch_checksum = compute_checksum(&bytes);
        bytes.extend_from_slice(&patch_checksum.to_le_bytes());
        bytes
    }

    fn push_header(&mut self, kind: ActionKind, length: u64) -> Result<()> {
        let header = encode_header(kind, length).ok_or(BpsError::InvalidAction(kind))?;
        self.cursors
            .output
            .checked_add(length)
            .ok_or(BpsError::InvalidAction(kind))?;
        self.actions
            .extend_from_slice(varint::encode(header).as_slice());
        Ok(())
    }

    fn push_copy(&mut self, kind: ActionKind, from: u64, to: u64, length: u64) -> Result<()> {
        to.checked_add(length).ok_or(BpsError::InvalidAction(kind))?;
        let delta = i64::try_from(i128::from(to) - i128::from(from))
            .ok()
            .and_then(encode_displacement)
            .ok_or(BpsError::InvalidAction(kind))?;
        self.push_header(kind, length)?;
        self.actions
            .extend_from_slice(varint::encode(delta).as_slice());
        self.cursors.output += length;
        Ok(())
    }
}
