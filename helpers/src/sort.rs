//! Multi-field stable sorting of records.
//!
//! A [`SortSpec`] lists fields in priority order, each with its own
//! [`Direction`]. The first field is the primary key and later fields only
//! break ties. Records that tie on every field keep their input order.
//!
//! Field values are ordered as follows:
//! 1. Missing fields first, then `null`, then booleans (`false < true`)
//! 2. Numbers and numeric strings, compared numerically
//! 3. Other strings, compared byte-wise
//! 4. Sequences, then mappings, compared by their compact JSON text
//!
//! A descending field reverses this order, so missing fields sort last.

use crate::access::lookup;
use crate::numeric::Numeric;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use tracing::trace;

/// Sort direction of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Smallest first (default)
    #[default]
    #[serde(rename = "asc", alias = "ascending")]
    Ascending,
    /// Largest first
    #[serde(rename = "desc", alias = "descending")]
    Descending,
}

impl Direction {
    /// Orient an ascending comparison result.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

/// Ordered field → direction pairs.
///
/// Serializes as a JSON object whose key order is the priority order:
/// `{"id": "asc", "age": "desc"}`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortSpec {
    fields: Vec<(String, Direction)>,
}

impl SortSpec {
    /// Create an empty spec (sorting with it keeps the input order).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, or change the direction of a field already listed
    /// without moving it.
    pub fn push(&mut self, field: impl Into<String>, direction: Direction) -> &mut Self {
        let field = field.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => *existing = direction,
            None => self.fields.push((field, direction)),
        }
        self
    }

    /// Builder-style method to add a field.
    pub fn by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.push(field, direction);
        self
    }

    /// Builder-style method to add an ascending field.
    pub fn asc(self, field: impl Into<String>) -> Self {
        self.by(field, Direction::Ascending)
    }

    /// Builder-style method to add a descending field.
    pub fn desc(self, field: impl Into<String>) -> Self {
        self.by(field, Direction::Descending)
    }

    /// Fields in priority order.
    pub fn fields(&self) -> &[(String, Direction)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Compare two records field by field.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        compare_keys(&self.fields, &self.keys(a), &self.keys(b))
    }

    fn keys<'a>(&self, record: &'a Value) -> Vec<SortKey<'a>> {
        self.fields
            .iter()
            .map(|(field, _)| SortKey::of(lookup(record, Some(field.as_str()))))
            .collect()
    }
}

impl<S: Into<String>> FromIterator<(S, Direction)> for SortSpec {
    fn from_iter<I: IntoIterator<Item = (S, Direction)>>(iter: I) -> Self {
        let mut spec = SortSpec::new();
        for (field, direction) in iter {
            spec.push(field, direction);
        }
        spec
    }
}

impl Serialize for SortSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, direction) in &self.fields {
            map.serialize_entry(field, direction)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SortSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SpecVisitor;

        impl<'de> Visitor<'de> for SpecVisitor {
            type Value = SortSpec;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to sort directions")
            }

            fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<SortSpec, M::Error> {
                let mut spec = SortSpec::new();
                while let Some((field, direction)) = access.next_entry::<String, Direction>()? {
                    spec.push(field, direction);
                }
                Ok(spec)
            }
        }

        deserializer.deserialize_map(SpecVisitor)
    }
}

/// Comparable view of one field of one record.
#[derive(Debug, Clone)]
enum SortKey<'a> {
    Missing,
    Null,
    Bool(bool),
    Number(Numeric),
    Text(&'a str),
    Sequence(String),
    Mapping(String),
}

impl<'a> SortKey<'a> {
    fn of(value: Option<&'a Value>) -> Self {
        let Some(value) = value else {
            return SortKey::Missing;
        };
        if let Some(number) = Numeric::from_value(value) {
            return SortKey::Number(number);
        }
        match value {
            Value::Null => SortKey::Null,
            Value::Bool(flag) => SortKey::Bool(*flag),
            Value::String(text) => SortKey::Text(text),
            Value::Array(_) => SortKey::Sequence(value.to_string()),
            Value::Object(_) => SortKey::Mapping(value.to_string()),
            // Numbers were handled above.
            Value::Number(_) => SortKey::Null,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Missing => 0,
            SortKey::Null => 1,
            SortKey::Bool(_) => 2,
            SortKey::Number(_) => 3,
            SortKey::Text(_) => 4,
            SortKey::Sequence(_) => 5,
            SortKey::Mapping(_) => 6,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Bool(a), SortKey::Bool(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.as_bytes().cmp(b.as_bytes()),
            (SortKey::Sequence(a), SortKey::Sequence(b))
            | (SortKey::Mapping(a), SortKey::Mapping(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

fn compare_keys(fields: &[(String, Direction)], a: &[SortKey<'_>], b: &[SortKey<'_>]) -> Ordering {
    fields
        .iter()
        .zip(a.iter().zip(b))
        .map(|((_, direction), (a, b))| direction.apply(a.compare(b)))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Return the records ordered by `spec`. The sort is stable.
pub fn sort_by_field(records: &[Value], spec: &SortSpec) -> Vec<Value> {
    trace!(records = records.len(), fields = spec.len(), "sorting records");

    let mut keyed: Vec<(Vec<SortKey<'_>>, &Value)> = records
        .iter()
        .map(|record| (spec.keys(record), record))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| compare_keys(&spec.fields, a, b));

    keyed.into_iter().map(|(_, record)| record.clone()).collect()
}
