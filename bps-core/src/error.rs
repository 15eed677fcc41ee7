//! Error types for BPS operations

use crate::format::ActionKind;

/// Patch fields and decoding steps an error can point at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Magic bytes at the start of the file
    Magic,
    /// Source size varint
    SourceSize,
    /// Target size varint
    TargetSize,
    /// Metadata size varint
    MetadataSize,
    /// Metadata bytes
    Metadata,
    /// The trailing 12 bytes of checksums
    ChecksumTrailer,
    /// An action header varint in the action stream
    ActionHeader,
    /// The relative displacement varint of a copy action
    Displacement,
    /// Inline literal bytes of a target read action
    TargetReadPayload,
}

impl Field {
    /// Human readable field name
    pub const fn name(self) -> &'static str {
        match self {
            Field::Magic => "magic",
            Field::SourceSize => "source size",
            Field::TargetSize => "target size",
            Field::MetadataSize => "metadata size",
            Field::Metadata => "metadata",
            Field::ChecksumTrailer => "checksum trailer",
            Field::ActionHeader => "action header",
            Field::Displacement => "copy displacement",
            Field::TargetReadPayload => "target read payload",
        }
    }
}

impl core::fmt::Display for Field {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors that can occur while parsing or applying a BPS patch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BpsError {
    /// The input does not start with the `BPS1` magic
    HeaderInvalid,
    /// The input ended before a varint or fixed-width field was complete
    TruncatedInput(Field),
    /// A varint decodes to a value larger than `u64::MAX`
    VarIntOverflow(Field),
    /// A declared size does not fit in this platform's address space
    SizeOverflow(Field),
    /// The whole-patch CRC32 does not match the stored patch checksum
    PatchChecksumMismatch { expected: u32, actual: u32 },
    /// The supplied source is shorter than the patch's source size
    SourceSizeMismatch { expected: u64, actual: u64 },
    /// The supplied source does not hash to the patch's source checksum
    SourceChecksumMismatch { expected: u32, actual: u32 },
    /// The supplied target buffer does not have the patch's target size
    TargetSizeMismatch { expected: u64, actual: u64 },
    /// The target buffer could not be allocated
    TargetAllocation { size: u64 },
    /// Bytes handed back to a patch layout are not the size of the file it was taken from
    PatchSizeMismatch { expected: u64, actual: u64 },
    /// An action moved a cursor below zero or touched bytes outside a buffer
    CursorOutOfBounds(ActionKind),
    /// An action cannot be encoded (zero length or unrepresentable displacement)
    InvalidAction(ActionKind),
    /// The reconstructed target does not hash to the patch's target checksum
    TargetChecksumMismatch { expected: u32, actual: u32 },
}

/// Broad classification of a [`BpsError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The caller supplied the wrong file, buffer or arguments
    InvalidInput,
    /// The patch bytes are malformed, truncated or tampered with
    Corruption,
    /// The interpreter produced a target that failed its own checksum
    Internal,
}

impl BpsError {
    /// Classify the error
    pub const fn category(&self) -> ErrorCategory {
        match self {
            BpsError::SourceSizeMismatch { .. }
            | BpsError::SourceChecksumMismatch { .. }
            | BpsError::TargetSizeMismatch { .. }
            | BpsError::TargetAllocation { .. }
            | BpsError::PatchSizeMismatch { .. }
            | BpsError::InvalidAction(_) => ErrorCategory::InvalidInput,
            BpsError::HeaderInvalid
            | BpsError::TruncatedInput(_)
            | BpsError::VarIntOverflow(_)
            | BpsError::SizeOverflow(_)
            | BpsError::PatchChecksumMismatch { .. }
            | BpsError::CursorOutOfBounds(_) => ErrorCategory::Corruption,
            BpsError::TargetChecksumMismatch { .. } => ErrorCategory::Internal,
        }
    }
}

impl core::fmt::Display for BpsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BpsError::HeaderInvalid => write!(f, "Invalid BPS header: expected \"BPS1\" magic"),
            BpsError::TruncatedInput(field) => write!(f, "Truncated input while reading {field}"),
            BpsError::VarIntOverflow(field) => write!(f, "Varint overflow while reading {field}"),
            BpsError::SizeOverflow(field) => {
                write!(f, "{field} does not fit in the address space")
            }
            BpsError::PatchChecksumMismatch { expected, actual } => write!(
                f,
                "Patch checksum mismatch: expected {expected:#010x}, computed {actual:#010x}"
            ),
            BpsError::SourceSizeMismatch { expected, actual } => write!(
                f,
                "Source too short: patch expects {expected} bytes, got {actual}"
            ),
            BpsError::SourceChecksumMismatch { expected, actual } => write!(
                f,
                "Source checksum mismatch: expected {expected:#010x}, computed {actual:#010x}"
            ),
            BpsError::TargetSizeMismatch { expected, actual } => write!(
                f,
                "Target buffer size mismatch: patch produces {expected} bytes, buffer holds {actual}"
            ),
            BpsError::TargetAllocation { size } => {
                write!(f, "Cannot allocate a target of {size} bytes")
            }
            BpsError::PatchSizeMismatch { expected, actual } => write!(
                f,
                "Patch size mismatch: layout describes {expected} bytes, got {actual}"
            ),
            BpsError::CursorOutOfBounds(kind) => write!(f, "{kind} action out of bounds"),
            BpsError::InvalidAction(kind) => write!(f, "{kind} action cannot be encoded"),
            BpsError::TargetChecksumMismatch { expected, actual } => write!(
                f,
                "Target checksum mismatch: expected {expected:#010x}, computed {actual:#010x}"
            ),
        }
    }
}

impl core::error::Error for BpsError {}

/// Result type for BPS operations
pub type Result<T> = core::result::Result<T, BpsError>;
