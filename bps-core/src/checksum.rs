//! CRC32 (IEEE) checksums used at the three integrity points of a patch

use crc32fast::Hasher;

/// Compute the CRC32 of `data`
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Check `data` against an expected CRC32, returning the computed value on mismatch
pub fn verify_checksum(data: &[u8], expected: u32) -> Result<(), u32> {
    let actual = compute_checksum(data);
    if actual == expected {
        Ok(())
    } else {
        Err(actual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        // Standard CRC-32/ISO-HDLC check value
        assert_eq!(compute_checksum(b"123456789"), 0xcbf43926);
        assert_eq!(compute_checksum(b""), 0);
    }

    #[test]
    fn test_single_bit_flip_changes_checksum() {
        let mut data = [0x00u8, 0x01, 0x02, 0x03, 0x04];
        let original = compute_checksum(&data);
        data[2] ^= 0x01;
        assert_ne!(original, compute_checksum(&data));
    }

    #[test]
    fn test_verify() {
        assert_eq!(verify_checksum(b"123456789", 0xcbf43926), Ok(()));
        assert_eq!(verify_checksum(b"123456789", 0), Err(0xcbf43926));
    }
}
