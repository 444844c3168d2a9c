//! Record Module
//!
//! The unit stored in the record table and persisted to the backing file.
//!
//! ## Responsibilities
//! - Bounded key and string value types, validated on construction
//! - Typed value variant whose kind never changes after creation
//! - Checksum, tombstone and dirty metadata
//! - Fixed-size binary encoding (see [`codec`])

pub mod codec;

use std::borrow::Borrow;
use std::fmt;

use crate::checksum;
use crate::error::{NvsError, Result};

pub use codec::{RawRecord, PAYLOAD_SIZE, RECORD_SIZE};

/// Size of the fixed key field, terminator included
pub const KEY_FIELD_SIZE: usize = 32;

/// Longest accepted key in bytes
pub const MAX_KEY_LEN: usize = KEY_FIELD_SIZE - 1;

/// Size of the fixed string value field, terminator included
pub const VALUE_FIELD_SIZE: usize = 64;

/// Longest accepted string value in bytes
pub const MAX_TEXT_LEN: usize = VALUE_FIELD_SIZE - 1;

// =============================================================================
// Key
// =============================================================================

/// A record key: non-empty, at most [`MAX_KEY_LEN`] bytes, no NUL bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    pub fn new(key: &str) -> Result<Self> {
        if key.is_empty() {
            return Err(NvsError::EmptyKey);
        }
        if key.len() > MAX_KEY_LEN {
            return Err(NvsError::KeyTooLong {
                len: key.len(),
                max: MAX_KEY_LEN,
            });
        }
        if key.as_bytes().contains(&0) {
            return Err(NvsError::InvalidKey(format!(
                "{:?} contains a NUL byte",
                key
            )));
        }
        Ok(Self(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Values
// =============================================================================

/// A string value: at most [`MAX_TEXT_LEN`] bytes, no NUL bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextValue(String);

impl TextValue {
    pub fn new(value: &str) -> Result<Self> {
        if value.len() > MAX_TEXT_LEN {
            return Err(NvsError::ValueTooLong {
                len: value.len(),
                max: MAX_TEXT_LEN,
            });
        }
        if value.as_bytes().contains(&0) {
            return Err(NvsError::InvalidValue(
                "string value contains a NUL byte".to_string(),
            ));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Type tag of a stored value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Uint32,
    String,
}

impl ValueKind {
    /// On-disk tag
    pub fn tag(self) -> u32 {
        match self {
            ValueKind::Uint32 => 0,
            ValueKind::String => 1,
        }
    }

    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0 => Some(ValueKind::Uint32),
            1 => Some(ValueKind::String),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Uint32 => f.write_str("UINT32"),
            ValueKind::String => f.write_str("STRING"),
        }
    }
}

/// A typed value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Uint32(u32),
    Text(TextValue),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Uint32(_) => ValueKind::Uint32,
            Value::Text(_) => ValueKind::String,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::Uint32(v) => Some(*v),
            Value::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextValue> {
        match self {
            Value::Text(t) => Some(t),
            Value::Uint32(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Uint32(v) => write!(f, "{}", v),
            Value::Text(t) => write!(f, "{:?}", t.as_str()),
        }
    }
}

// =============================================================================
// Record
// =============================================================================

/// A key/value entry with its metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    checksum: u32,
    deleted: bool,
    dirty: bool,
    key: Key,
    value: Value,
}

impl Record {
    /// Create a clean, live record with no checksum computed yet
    pub fn new(key: Key, value: Value) -> Self {
        Self {
            checksum: 0,
            deleted: false,
            dirty: false,
            key,
            value,
        }
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }

    /// Checksum stored at the last load or commit
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Modified since the last load
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// CRC-32 of the encoded payload
    pub fn compute_checksum(&self) -> u32 {
        checksum::crc32(&codec::encode_payload(&self.key, &self.value))
    }

    /// Recompute and store the checksum, returning it
    pub fn refresh_checksum(&mut self) -> u32 {
        self.checksum = self.compute_checksum();
        self.checksum
    }

    /// Replace the value; callers guarantee the kind is unchanged
    pub(crate) fn overwrite_value(&mut self, value: Value) {
        debug_assert_eq!(self.value.kind(), value.kind());
        self.value = value;
        self.dirty = true;
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn mark_deleted(&mut self) {
        self.deleted = true;
    }

    pub(crate) fn with_checksum(mut self, checksum: u32) -> Self {
        self.checksum = checksum;
        self
    }
}
