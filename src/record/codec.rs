//! Record codec
//!
//! Fixed-size binary encoding of a single record slot.
//!
//! ## Slot Layout (128 bytes, little-endian)
//! ```text
//! ┌──────────┬─────┬─────┬─────┬──────────┬──────────┬──────────┬──────────┐
//! │ CRC (4)  │Del 1│Dty 1│Pad 2│ Kind (4) │ Key (32) │Value (64)│ Pad (20) │
//! └──────────┴─────┴─────┴─────┴──────────┴──────────┴──────────┴──────────┘
//!                               └────────── payload (100) ──────┘
//! ```
//!
//! The CRC covers the payload only. Keys and string values are NUL-terminated
//! and zero padded; a `Uint32` value occupies the first 4 bytes of the value
//! field followed by zeros.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::checksum;
use crate::error::{NvsError, Result};

use super::{Key, Record, TextValue, Value, ValueKind, KEY_FIELD_SIZE, VALUE_FIELD_SIZE};

/// Size of one persisted record slot
pub const RECORD_SIZE: usize = 128;

/// Byte offset of the payload inside a slot
pub const PAYLOAD_OFFSET: usize = 8;

/// Kind tag (4) + key field (32) + value field (64)
pub const PAYLOAD_SIZE: usize = 4 + KEY_FIELD_SIZE + VALUE_FIELD_SIZE;

const TAIL_PADDING: usize = RECORD_SIZE - PAYLOAD_OFFSET - PAYLOAD_SIZE;

// =============================================================================
// Encoding
// =============================================================================

/// Encode the checksummed payload of a key/value pair
pub fn encode_payload(key: &Key, value: &Value) -> Bytes {
    let mut buf = BytesMut::with_capacity(PAYLOAD_SIZE);

    buf.put_u32_le(value.kind().tag());
    put_fixed_str(&mut buf, key.as_str(), KEY_FIELD_SIZE);

    match value {
        Value::Uint32(v) => {
            buf.put_u32_le(*v);
            buf.put_bytes(0, VALUE_FIELD_SIZE - 4);
        }
        Value::Text(text) => put_fixed_str(&mut buf, text.as_str(), VALUE_FIELD_SIZE),
    }

    buf.freeze()
}

/// Append one full slot for `record` to `buf`, using its stored checksum
pub fn encode_record(record: &Record, buf: &mut BytesMut) {
    buf.reserve(RECORD_SIZE);
    buf.put_u32_le(record.checksum());
    buf.put_u8(record.is_deleted() as u8);
    buf.put_u8(record.is_dirty() as u8);
    buf.put_bytes(0, PAYLOAD_OFFSET - 6);
    buf.put_slice(&encode_payload(record.key(), record.value()));
    buf.put_bytes(0, TAIL_PADDING);
}

/// Write `s` into a zero-padded field of `width` bytes.
/// Bounded types guarantee `s.len() < width`, so a terminator always fits.
fn put_fixed_str(buf: &mut BytesMut, s: &str, width: usize) {
    buf.put_slice(s.as_bytes());
    buf.put_bytes(0, width - s.len());
}

// =============================================================================
// Decoding
// =============================================================================

/// A slot as read from disk, before checksum verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub checksum: u32,
    pub deleted: bool,
    pub dirty: bool,
    pub payload: [u8; PAYLOAD_SIZE],
}

impl RawRecord {
    /// Split a slot into metadata and payload
    pub fn parse(slot: &[u8]) -> Result<Self> {
        if slot.len() != RECORD_SIZE {
            return Err(NvsError::Corruption(format!(
                "slot is {} bytes, expected {}",
                slot.len(),
                RECORD_SIZE
            )));
        }

        let mut cursor = slot;
        let checksum = cursor.get_u32_le();
        let deleted = cursor.get_u8() != 0;
        let dirty = cursor.get_u8() != 0;
        cursor.advance(PAYLOAD_OFFSET - 6);

        let mut payload = [0u8; PAYLOAD_SIZE];
        cursor.copy_to_slice(&mut payload);

        Ok(Self {
            checksum,
            deleted,
            dirty,
            payload,
        })
    }

    /// True for an all-zero slot, the filler written after an odd record.
    /// Only the last slot of a file may legitimately look like this.
    pub fn is_erased(slot: &[u8]) -> bool {
        slot.iter().all(|&b| b == 0)
    }

    /// Recompute the payload checksum
    pub fn computed_checksum(&self) -> u32 {
        checksum::crc32(&self.payload)
    }

    pub fn checksum_matches(&self) -> bool {
        self.computed_checksum() == self.checksum
    }

    /// Decode the payload into a clean, live record carrying the stored checksum
    pub fn decode(&self) -> Result<Record> {
        let mut cursor = &self.payload[..];
        let tag = cursor.get_u32_le();
        let kind = ValueKind::from_tag(tag)
            .ok_or_else(|| NvsError::Corruption(format!("unknown value kind tag {}", tag)))?;

        let key_field = &cursor[..KEY_FIELD_SIZE];
        let value_field = &cursor[KEY_FIELD_SIZE..KEY_FIELD_SIZE + VALUE_FIELD_SIZE];

        let key = Key::new(read_fixed_str(key_field, "key")?)
            .map_err(|e| NvsError::Corruption(format!("bad key: {}", e)))?;

        let value = match kind {
            ValueKind::Uint32 => {
                let mut value_cursor = value_field;
                Value::Uint32(value_cursor.get_u32_le())
            }
            ValueKind::String => {
                let text = TextValue::new(read_fixed_str(value_field, "string value")?)
                    .map_err(|e| NvsError::Corruption(format!("bad string value: {}", e)))?;
                Value::Text(text)
            }
        };

        Ok(Record::new(key, value).with_checksum(self.checksum))
    }
}

/// Read a NUL-terminated UTF-8 string out of a fixed field
fn read_fixed_str<'a>(field: &'a [u8], what: &str) -> Result<&'a str> {
    let end = field
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| NvsError::Corruption(format!("{} field is not terminated", what)))?;

    std::str::from_utf8(&field[..end])
        .map_err(|e| NvsError::Corruption(format!("{} is not valid UTF-8: {}", what, e)))
}
