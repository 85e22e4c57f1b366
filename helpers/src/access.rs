//! Dot-notation access to nested records.
//!
//! Paths are dot-delimited (`"user.address.city"`) and resolved one segment at
//! a time. A key that exists literally at the top level always wins over its
//! dotted interpretation, so `{"a.b": 1}` answers `"a.b"` directly.
//!
//! Lookups never fail: a missing path yields `None`, the caller's default or
//! `false`. Mutations ([`set`], [`forget`]) work in place on a `&mut Value`.

use crate::key::{parse_index, segments, PATH_SEPARATOR};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::{debug, trace};

/// Shape of a node, as far as keyed access is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Keyed by name (a JSON object)
    Mapping,
    /// Keyed by position (a JSON array)
    Sequence,
    /// Anything without children
    Scalar,
}

impl NodeKind {
    /// Classify a JSON value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => NodeKind::Mapping,
            Value::Array(_) => NodeKind::Sequence,
            _ => NodeKind::Scalar,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Mapping => write!(f, "mapping"),
            NodeKind::Sequence => write!(f, "sequence"),
            NodeKind::Scalar => write!(f, "scalar"),
        }
    }
}

/// Array-like keyed access.
///
/// Implemented for JSON values and containers. Other types can implement it to
/// take part in [`exists`], [`has`] and [`accessible`].
pub trait OffsetAccess {
    /// Shape of this node.
    fn kind(&self) -> NodeKind;

    /// Get the child stored under `key`, if any.
    fn offset_get(&self, key: &str) -> Option<&Value>;

    /// Number of direct children.
    fn offset_count(&self) -> usize;

    /// Check whether `key` is a direct child.
    fn offset_exists(&self, key: &str) -> bool {
        self.offset_get(key).is_some()
    }

    /// This node as a JSON value, which root-path lookups return.
    fn as_value(&self) -> Option<&Value> {
        None
    }
}

impl OffsetAccess for Value {
    fn kind(&self) -> NodeKind {
        NodeKind::of(self)
    }

    fn offset_get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.offset_get(key),
            Value::Array(items) => items.offset_get(key),
            _ => None,
        }
    }

    fn offset_count(&self) -> usize {
        match self {
            Value::Object(map) => map.len(),
            Value::Array(items) => items.len(),
            _ => 0,
        }
    }

    fn as_value(&self) -> Option<&Value> {
        Some(self)
    }
}

impl OffsetAccess for Map<String, Value> {
    fn kind(&self) -> NodeKind {
        NodeKind::Mapping
    }

    fn offset_get(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }

    fn offset_count(&self) -> usize {
        self.len()
    }
}

impl OffsetAccess for Vec<Value> {
    fn kind(&self) -> NodeKind {
        NodeKind::Sequence
    }

    fn offset_get(&self, key: &str) -> Option<&Value> {
        parse_index(key).and_then(|index| self.get(index))
    }

    fn offset_count(&self) -> usize {
        self.len()
    }
}

/// Check whether a value supports keyed access.
pub fn accessible<A: OffsetAccess + ?Sized>(value: &A) -> bool {
    value.kind() != NodeKind::Scalar
}

/// Check whether `key` is a literal member of `record` (no dot walking).
pub fn exists<A: OffsetAccess + ?Sized>(record: &A, key: &str) -> bool {
    record.offset_exists(key)
}

/// Resolve a path, returning `None` when any part of it is missing.
///
/// An absent or empty path resolves to the record itself, for records that
/// are JSON values. A scalar record resolves to nothing, even for the root
/// path.
pub fn lookup<'a, A>(record: &'a A, path: Option<&str>) -> Option<&'a Value>
where
    A: OffsetAccess + ?Sized,
{
    if !accessible(record) {
        return None;
    }

    match path {
        None | Some("") => record.as_value(),
        Some(path) => resolve(record, path),
    }
}

/// Resolve a path, falling back to `default` when any part of it is missing.
pub fn get<'a, A>(record: &'a A, path: Option<&str>, default: &'a Value) -> &'a Value
where
    A: OffsetAccess + ?Sized,
{
    lookup(record, path).unwrap_or(default)
}

/// Check that every key resolves, literally or through its dotted path.
///
/// Returns `false` for an empty or scalar record and for an empty key list.
pub fn has<A, I, S>(record: &A, keys: I) -> bool
where
    A: OffsetAccess + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if record.offset_count() == 0 {
        return false;
    }

    let mut checked = false;
    for key in keys {
        if resolve(record, key.as_ref()).is_none() {
            return false;
        }
        checked = true;
    }

    checked
}

/// Literal-first resolution of a non-root path against any accessible root.
fn resolve<'a, A: OffsetAccess + ?Sized>(root: &'a A, path: &str) -> Option<&'a Value> {
    if let Some(value) = root.offset_get(path) {
        return Some(value);
    }
    if !path.contains(PATH_SEPARATOR) {
        return None;
    }

    let mut parts = path.split(PATH_SEPARATOR);
    let mut current = root.offset_get(parts.next()?)?;
    for segment in parts {
        current = current.offset_get(segment)?;
    }
    Some(current)
}

/// Assign `value` at `path`, creating intermediate mappings as needed.
///
/// An absent or empty path replaces the whole record. Intermediate nodes that
/// are missing or not containers are replaced by empty mappings. Returns the
/// (root) record.
pub fn set<'a>(record: &'a mut Value, path: Option<&str>, value: Value) -> &'a mut Value {
    let Some(parts) = segments(path) else {
        *record = value;
        return record;
    };

    let mut parts: Vec<&str> = parts.collect();
    let last = parts.pop().unwrap_or_default();

    let mut current = &mut *record;
    for segment in parts {
        let next = slot(current, segment);
        if !accessible(&*next) {
            if !next.is_null() {
                debug!(segment, "overwriting non-container with empty mapping");
            }
            *next = Value::Object(Map::new());
        }
        current = next;
    }

    *slot(current, last) = value;
    record
}

/// Remove each key, literally from the top level or through its dotted path.
///
/// Keys whose parent cannot be resolved are skipped.
pub fn forget<I, S>(record: &mut Value, keys: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for key in keys {
        let key = key.as_ref();

        if record.offset_exists(key) {
            remove(record, key);
            continue;
        }

        let mut parts: Vec<&str> = key.split(PATH_SEPARATOR).collect();
        let last = parts.pop().unwrap_or_default();

        match parent_mut(record, &parts) {
            Some(parent) => {
                remove(parent, last);
            }
            None => trace!(key, "forget skipped unresolvable path"),
        }
    }
}

/// Walk `parts` mutably; every node along the way must be a container.
fn parent_mut<'a>(root: &'a mut Value, parts: &[&str]) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in parts {
        current = child_mut(current, segment).filter(|child| accessible(&**child))?;
    }
    Some(current)
}

fn child_mut<'a>(node: &'a mut Value, key: &str) -> Option<&'a mut Value> {
    match node {
        Value::Object(map) => map.get_mut(key),
        Value::Array(items) => parse_index(key).and_then(move |index| items.get_mut(index)),
        _ => None,
    }
}

/// Get the slot for `segment` in `node`, inserting `null` if it is missing.
///
/// Sequences accept an existing index or the next free one; any other key
/// turns the sequence into a mapping keyed by position first.
fn slot<'a>(node: &'a mut Value, segment: &str) -> &'a mut Value {
    let index = parse_index(segment)
        .filter(|&index| matches!(&*node, Value::Array(items) if index <= items.len()));

    if index.is_none() {
        ensure_mapping(node);
    }

    match node {
        Value::Array(items) => {
            let index = index.unwrap_or(items.len());
            if index == items.len() {
                items.push(Value::Null);
            }
            &mut items[index]
        }
        Value::Object(map) => map.entry(segment).or_insert(Value::Null),
        other => other,
    }
}

fn ensure_mapping(node: &mut Value) {
    *node = match node.take() {
        Value::Object(map) => Value::Object(map),
        Value::Array(items) => Value::Object(
            items
                .into_iter()
                .enumerate()
                .map(|(index, value)| (index.to_string(), value))
                .collect(),
        ),
        scalar => {
            if !scalar.is_null() {
                debug!("overwriting scalar root with empty mapping");
            }
            Value::Object(Map::new())
        }
    };
}

/// Remove a direct child, keeping the order of its siblings.
///
/// Removing anything but the last element of a sequence leaves a gap, so the
/// sequence becomes a mapping keyed by the surviving positions.
fn remove(node: &mut Value, key: &str) -> Option<Value> {
    if let Value::Array(items) = node {
        let index = parse_index(key).filter(|&index| index < items.len())?;
        if index + 1 == items.len() {
            return items.pop();
        }
        ensure_mapping(node);
    }

    node.as_object_mut().and_then(|map| map.shift_remove(key))
}
