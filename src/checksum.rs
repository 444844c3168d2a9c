//! CRC-32 checksums for persisted records
//!
//! Reflected CRC-32 (polynomial `0xEDB88320`, initial value `0xFFFFFFFF`,
//! final complement), the same function zlib and PNG use. Computed over the
//! record payload only: kind tag, key field and value field, padding included.

use crc32fast::Hasher;

/// Compute the CRC-32 of `data`
pub fn crc32(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Check `data` against a stored checksum
pub fn verify(data: &[u8], expected: u32) -> bool {
    crc32(data) == expected
}
