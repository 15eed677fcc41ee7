//! BPS variable-length integer codec
//!
//! Each byte carries seven bits of the value, least significant group first.
//! The high bit marks the *final* byte. Between groups the encoder subtracts
//! one from the remaining value and the decoder adds the matching shift back,
//! so every byte sequence decodes to exactly one value and no value has two
//! encodings.

use crate::error::{BpsError, Field};

/// Longest possible encoding of a `u64`
pub const MAX_ENCODED_LEN: usize = 10;

const GROUP_MASK: u8 = 0x7f;
const FINAL_BIT: u8 = 0x80;

/// Varint decoding failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarIntError {
    /// Input ended before a byte with the final bit set
    Truncated,
    /// The encoded value does not fit in a `u64`
    Overflow,
}

impl VarIntError {
    /// Attach the field being decoded
    pub const fn at(self, field: Field) -> BpsError {
        match self {
            VarIntError::Truncated => BpsError::TruncatedInput(field),
            VarIntError::Overflow => BpsError::VarIntOverflow(field),
        }
    }
}

/// A varint encoded into a fixed stack buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedVarInt {
    bytes: [u8; MAX_ENCODED_LEN],
    len: u8,
}

impl EncodedVarInt {
    /// The encoded bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Number of encoded bytes
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl AsRef<[u8]> for EncodedVarInt {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

/// Encode a value
pub const fn encode(mut value: u64) -> EncodedVarInt {
    let mut bytes = [0u8; MAX_ENCODED_LEN];
    let mut len = 0;

    loop {
        let group = (value & GROUP_MASK as u64) as u8;
        value >>= 7;

        if value == 0 {
            bytes[len] = FINAL_BIT | group;
            len += 1;
            break;
        }

        bytes[len] = group;
        len += 1;
        value -= 1;
    }

    EncodedVarInt {
        bytes,
        len: len as u8,
    }
}

/// Encoded length of a value without materializing it
pub const fn encoded_len(value: u64) -> usize {
    encode(value).len()
}

/// Decode a value from the start of `bytes`
///
/// Returns the value and the number of bytes consumed.
pub fn decode(bytes: &[u8]) -> Result<(u64, usize), VarIntError> {
    let mut value: u64 = 0;
    let mut shift: u64 = 1;

    for (index, &byte) in bytes.iter().enumerate() {
        let group = u64::from(byte & GROUP_MASK);
        value = group
            .checked_mul(shift)
            .and_then(|weighted| value.checked_add(weighted))
            .ok_or(VarIntError::Overflow)?;

        if byte & FINAL_BIT != 0 {
            return Ok((value, index + 1));
        }

        shift = shift.checked_mul(128).ok_or(VarIntError::Overflow)?;
        value = value.checked_add(shift).ok_or(VarIntError::Overflow)?;
    }

    Err(VarIntError::Truncated)
}

/// Decode a value from the front of `input` and advance past it
pub fn read<'a>(input: &mut &'a [u8], field: Field) -> Result<u64, BpsError> {
    let bytes: &'a [u8] = input;
    let (value, consumed) = decode(bytes).map_err(|err| err.at(field))?;
    *input = &bytes[consumed..];
    Ok(value)
}
