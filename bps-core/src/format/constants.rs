//! Format constants for the BPS container

/// Magic bytes at the start of every patch
pub const MAGIC: [u8; 4] = *b"BPS1";

/// Size of the magic in bytes
pub const MAGIC_SIZE: usize = MAGIC.len();

/// Size of the trailing source, target and patch checksums
pub const CHECKSUM_TRAILER_SIZE: usize = 12;

/// Size of the patch checksum field, the only bytes it does not cover
pub const PATCH_CHECKSUM_SIZE: usize = 4;

/// Smallest well-formed patch: magic, three one-byte varints, checksums
pub const MIN_PATCH_SIZE: usize = MAGIC_SIZE + 3 + CHECKSUM_TRAILER_SIZE;

/// Action header layout
pub mod action {
    /// Bits of the action header selecting the action kind
    pub const KIND_BITS: u32 = 2;

    /// Mask for the kind bits
    pub const KIND_MASK: u64 = (1 << KIND_BITS) - 1;

    /// Largest length an action header can carry
    pub const MAX_LENGTH: u64 = (u64::MAX >> KIND_BITS) + 1;

    /// Low bit of a copy displacement: set means move backwards
    pub const DISPLACEMENT_SIGN_BIT: u64 = 1;
}
