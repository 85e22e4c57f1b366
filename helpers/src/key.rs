//! Record keys and dot-path segmentation.
//!
//! A record is addressed by [`Key`]s: positions in a sequence or names in a
//! mapping. Mapping keys that look like canonical non-negative integers are
//! treated as indices, so `"3"` and `3` address the same entry.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Separator between the segments of a path.
pub const PATH_SEPARATOR: char = '.';

/// A single key of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    /// Position in a sequence, or an integer-like mapping key
    Index(usize),
    /// Any other mapping key
    Name(String),
}

impl Key {
    /// Parse a raw key, recognizing canonical decimal integers as indices.
    pub fn parse(raw: &str) -> Self {
        match parse_index(raw) {
            Some(index) => Key::Index(index),
            None => Key::Name(raw.to_string()),
        }
    }

    /// The index, if this key is one.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Index(index) => Some(*index),
            Key::Name(_) => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(index) => write!(f, "{}", index),
            Key::Name(name) => f.write_str(name),
        }
    }
}

impl From<&str> for Key {
    fn from(raw: &str) -> Self {
        Key::parse(raw)
    }
}

impl From<String> for Key {
    fn from(raw: String) -> Self {
        match parse_index(&raw) {
            Some(index) => Key::Index(index),
            None => Key::Name(raw),
        }
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

/// Parse a canonical non-negative decimal integer (`"0"`, `"42"`; not `"042"`, `"+1"`, `"-1"`).
pub(crate) fn parse_index(raw: &str) -> Option<usize> {
    let bytes = raw.as_bytes();
    match bytes {
        [] => None,
        [b'0'] => Some(0),
        [b'0', ..] => None,
        _ if bytes.iter().all(u8::is_ascii_digit) => raw.parse().ok(),
        _ => None,
    }
}

/// Split a path into its segments.
///
/// Returns `None` for the root path (absent or empty).
pub(crate) fn segments(path: Option<&str>) -> Option<std::str::Split<'_, char>> {
    match path {
        None | Some("") => None,
        Some(path) => Some(path.split(PATH_SEPARATOR)),
    }
}

/// Borrowed, ordered entries of a container. Scalars have no entries.
pub(crate) fn entries(value: &Value) -> Box<dyn Iterator<Item = (Key, &Value)> + '_> {
    match value {
        Value::Object(map) => Box::new(map.iter().map(|(k, v)| (Key::parse(k), v))),
        Value::Array(items) => Box::new(items.iter().enumerate().map(|(i, v)| (Key::Index(i), v))),
        _ => Box::new(std::iter::empty()),
    }
}

/// Materialize entries taken from a sequence.
///
/// Entries keyed exactly `0..n` in order stay a sequence; any gap or reordering
/// turns the result into a mapping keyed by the surviving positions.
pub(crate) fn pack(entries: Vec<(Key, Value)>) -> Value {
    let packed = entries
        .iter()
        .enumerate()
        .all(|(position, (key, _))| key.as_index() == Some(position));

    if packed {
        Value::Array(entries.into_iter().map(|(_, v)| v).collect())
    } else {
        Value::Object(into_map(entries))
    }
}

/// Collect entries into a mapping, stringifying the keys.
pub(crate) fn into_map(entries: Vec<(Key, Value)>) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}
