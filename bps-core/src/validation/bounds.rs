//! Checked cursor and buffer arithmetic

use crate::error::{BpsError, Field, Result};
use core::ops::Range;

/// Convert a declared size to `usize`
pub fn to_usize(value: u64, field: Field) -> Result<usize> {
    usize::try_from(value).map_err(|_| BpsError::SizeOverflow(field))
}

/// Range `offset..offset + length` if it lies within a buffer of `buffer_len` bytes
pub fn checked_span(offset: u64, length: u64, buffer_len: usize) -> Option<Range<usize>> {
    let end = offset.checked_add(length)?;
    if end > buffer_len as u64 {
        return None;
    }
    // end <= buffer_len, so both fit in usize
    Some(offset as usize..end as usize)
}

/// Move a cursor by a signed delta, `None` on underflow or overflow
pub const fn displace(cursor: u64, delta: i64) -> Option<u64> {
    if delta < 0 {
        cursor.checked_sub(delta.unsigned_abs())
    } else {
        cursor.checked_add(delta as u64)
    }
}
