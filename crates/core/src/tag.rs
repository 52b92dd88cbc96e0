//! The tag tree block entities and items persist themselves into.
//!
//! A [`Compound`] is an ordered string-keyed map of [`Tag`] values. Getters are
//! lenient: a missing or mistyped key yields the type's default instead of an
//! error, so a partially corrupt save still loads. Integral getters accept any
//! integral tag and convert.
//!
//! [`encode`]/[`decode`] turn a compound into the byte form used for storage
//! and for syncing block entities to observers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Leading byte of every encoded payload.
pub const TAG_FORMAT_VERSION: u8 = 1;

/// A single node of the tag tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    /// Signed 8-bit integer (also used for booleans).
    Byte(i8),
    /// Signed 16-bit integer.
    Short(i16),
    /// Signed 32-bit integer.
    Int(i32),
    /// Signed 64-bit integer.
    Long(i64),
    /// UTF-8 string.
    String(String),
    /// Ordered list of tags.
    List(Vec<Tag>),
    /// Nested compound.
    Compound(Compound),
}

impl Tag {
    /// Integral value of this tag, if it is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Tag::Byte(v) => Some(i64::from(*v)),
            Tag::Short(v) => Some(i64::from(*v)),
            Tag::Int(v) => Some(i64::from(*v)),
            Tag::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Borrow the compound inside this tag, if it is one.
    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Tag::Compound(compound) => Some(compound),
            _ => None,
        }
    }
}

/// Ordered key/value node of the tag tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Compound {
    entries: BTreeMap<String, Tag>,
}

impl Compound {
    /// Create an empty compound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the compound has no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when `key` is present, whatever its type.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Raw access to a tag.
    pub fn get(&self, key: &str) -> Option<&Tag> {
        self.entries.get(key)
    }

    /// Insert or replace a tag, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, tag: Tag) -> Option<Tag> {
        self.entries.insert(key.into(), tag)
    }

    /// Remove a key, returning its tag.
    pub fn remove(&mut self, key: &str) -> Option<Tag> {
        self.entries.remove(key)
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tag)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Store a byte.
    pub fn put_byte(&mut self, key: impl Into<String>, value: i8) {
        self.insert(key, Tag::Byte(value));
    }

    /// Store a boolean as a byte (0 or 1).
    pub fn put_bool(&mut self, key: impl Into<String>, value: bool) {
        self.insert(key, Tag::Byte(i8::from(value)));
    }

    /// Store a 32-bit integer.
    pub fn put_int(&mut self, key: impl Into<String>, value: i32) {
        self.insert(key, Tag::Int(value));
    }

    /// Store a 64-bit integer.
    pub fn put_long(&mut self, key: impl Into<String>, value: i64) {
        self.insert(key, Tag::Long(value));
    }

    /// Store a string.
    pub fn put_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.insert(key, Tag::String(value.into()));
    }

    /// Store a list.
    pub fn put_list(&mut self, key: impl Into<String>, value: Vec<Tag>) {
        self.insert(key, Tag::List(value));
    }

    /// Store a nested compound.
    pub fn put_compound(&mut self, key: impl Into<String>, value: Compound) {
        self.insert(key, Tag::Compound(value));
    }

    /// Integral value as `i32`, saturating; 0 when absent or not integral.
    pub fn get_int(&self, key: &str) -> i32 {
        self.get_long(key)
            .clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }

    /// Integral value as `i64`; 0 when absent or not integral.
    pub fn get_long(&self, key: &str) -> i64 {
        self.get(key).and_then(Tag::as_i64).unwrap_or(0)
    }

    /// Non-negative integral value as `u32`; negative and absent values read as 0.
    pub fn get_u32(&self, key: &str) -> u32 {
        self.get_long(key).clamp(0, i64::from(u32::MAX)) as u32
    }

    /// Boolean stored as a non-zero integral; false when absent.
    pub fn get_bool(&self, key: &str) -> bool {
        self.get_long(key) != 0
    }

    /// String value; empty when absent or not a string.
    pub fn get_string(&self, key: &str) -> &str {
        match self.get(key) {
            Some(Tag::String(value)) => value,
            _ => "",
        }
    }

    /// List value; empty when absent or not a list.
    pub fn get_list(&self, key: &str) -> &[Tag] {
        match self.get(key) {
            Some(Tag::List(values)) => values,
            _ => &[],
        }
    }

    /// Nested compound, if present and of the right type.
    pub fn get_compound(&self, key: &str) -> Option<&Compound> {
        self.get(key).and_then(Tag::as_compound)
    }
}

/// Errors from the tag byte codec.
#[derive(Debug, Error)]
pub enum TagError {
    /// The payload had no bytes at all.
    #[error("tag payload is empty")]
    Empty,
    /// The payload was written by an incompatible codec.
    #[error("unsupported tag format version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version byte found in the payload.
        found: u8,
        /// Version this build writes.
        expected: u8,
    },
    /// The tree could not be serialized.
    #[error("failed to encode tag payload: {0}")]
    Encode(#[source] bincode::Error),
    /// The body was truncated or corrupt.
    #[error("failed to decode tag payload: {0}")]
    Decode(#[source] bincode::Error),
}

/// Encode a compound as a versioned byte payload.
pub fn encode(tag: &Compound) -> Result<Vec<u8>, TagError> {
    let body = bincode::serialize(tag).map_err(TagError::Encode)?;
    let mut bytes = Vec::with_capacity(body.len() + 1);
    bytes.push(TAG_FORMAT_VERSION);
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Decode a payload written by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<Compound, TagError> {
    let (&version, body) = bytes.split_first().ok_or(TagError::Empty)?;
    if version != TAG_FORMAT_VERSION {
        return Err(TagError::UnsupportedVersion {
            found: version,
            expected: TAG_FORMAT_VERSION,
        });
    }
    bincode::deserialize(body).map_err(TagError::Decode)
}
