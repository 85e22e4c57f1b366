//! Derived collections: filtering, projection, splitting and column sums.
//!
//! These helpers take a record (mapping or sequence) by reference and build a
//! new value. Entry order always follows the source record.

use crate::access::{lookup, NodeKind};
use crate::error::{Error, Result};
use crate::key::{entries, into_map, pack, Key};
use crate::numeric::Numeric;
use serde_json::Value;
use std::collections::HashSet;

fn container_kind(record: &Value) -> Result<NodeKind> {
    match NodeKind::of(record) {
        NodeKind::Scalar => Err(Error::NotAccessible {
            kind: NodeKind::Scalar,
        }),
        kind => Ok(kind),
    }
}

/// Rebuild a container of the given kind from a subset of its entries.
fn rebuild(kind: NodeKind, entries: Vec<(Key, Value)>) -> Value {
    match kind {
        NodeKind::Sequence => pack(entries),
        _ => Value::Object(into_map(entries)),
    }
}

/// Keep the entries for which `predicate(value, key)` holds.
///
/// Keys are preserved: filtering a sequence down to non-contiguous positions
/// yields a mapping keyed by those positions.
pub fn filter<F>(record: &Value, mut predicate: F) -> Result<Value>
where
    F: FnMut(&Value, &Key) -> bool,
{
    let kind = container_kind(record)?;
    let kept = entries(record)
        .filter(|(key, value)| predicate(*value, key))
        .map(|(key, value)| (key, value.clone()))
        .collect();

    Ok(rebuild(kind, kept))
}

/// Keep the entries whose key is listed in `keys`, in source order.
pub fn only<I, S>(record: &Value, keys: I) -> Result<Value>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let kind = container_kind(record)?;
    let wanted: HashSet<Key> = keys.into_iter().map(|key| Key::parse(key.as_ref())).collect();

    let kept = entries(record)
        .filter(|(key, _)| wanted.contains(key))
        .map(|(key, value)| (key, value.clone()))
        .collect();

    Ok(rebuild(kind, kept))
}

/// Split a record into its keys and its values.
pub fn divide(record: &Value) -> Result<(Vec<Key>, Vec<Value>)> {
    container_kind(record)?;
    Ok(entries(record)
        .map(|(key, value)| (key, value.clone()))
        .unzip())
}

/// Replace every value with `transform(value)`, keeping the keys.
pub fn each<F>(record: &Value, mut transform: F) -> Result<Value>
where
    F: FnMut(&Value) -> Value,
{
    match record {
        Value::Object(map) => Ok(Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), transform(value)))
                .collect(),
        )),
        Value::Array(items) => Ok(Value::Array(items.iter().map(transform).collect())),
        _ => Err(Error::NotAccessible {
            kind: NodeKind::Scalar,
        }),
    }
}

/// Sum `field` across a sequence of records.
///
/// The field is resolved like [`crate::get`]. Missing and non-numeric values
/// count as zero.
pub fn column_sum(records: &[Value], field: &str) -> Numeric {
    records
        .iter()
        .filter_map(|record| lookup(record, Some(field)))
        .filter_map(Numeric::from_value)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filter_mapping_by_value() {
        let record = json!({"a": 1, "b": 2, "c": 3});
        let odd = filter(&record, |value, _| value.as_i64().unwrap_or(0) % 2 == 1).unwrap();
        assert_eq!(odd, json!({"a": 1, "c": 3}));
    }

    #[test]
    fn filter_by_key() {
        let record = json!({"keep": 1, "drop": 2});
        let kept = filter(&record, |_, key| *key == Key::from("keep")).unwrap();
        assert_eq!(kept, json!({"keep": 1}));
    }

    #[test]
    fn filter_sequence_preserves_positions() {
        let record = json!([10, 20, 30, 40]);
        let prefix = filter(&record, |value, _| value.as_i64().unwrap_or(0) < 30).unwrap();
        assert_eq!(prefix, json!([10, 20]));

        let gapped = filter(&record, |value, _| value.as_i64().unwrap_or(0) > 20).unwrap();
        assert_eq!(gapped, json!({"2": 30, "3": 40}));
    }

    #[test]
    fn filter_scalar_is_rejected() {
        let result = filter(&json!(1), |_, _| true);
        assert!(matches!(result, Err(Error::NotAccessible { .. })));
    }

    #[test]
    fn only_follows_source_order() {
        let record = json!({"a": 1, "b": 2, "c": 3});
        assert_eq!(only(&record, ["c", "a"]).unwrap(), json!({"a": 1, "c": 3}));
        assert_eq!(only(&record, ["x"]).unwrap(), json!({}));
    }

    #[test]
    fn only_on_sequence() {
        let record = json!(["a", "b", "c"]);
        assert_eq!(only(&record, ["0", "1"]).unwrap(), json!(["a", "b"]));
        assert_eq!(only(&record, ["1"]).unwrap(), json!({"1": "b"}));
    }

    #[test]
    fn divide_mapping() {
        let (keys, values) = divide(&json!({"a": 1, "b": 2})).unwrap();
        assert_eq!(keys, vec![Key::from("a"), Key::from("b")]);
        assert_eq!(values, vec![json!(1), json!(2)]);
    }

    #[test]
    fn divide_sequence_and_empty() {
        let (keys, values) = divide(&json!(["x", "y"])).unwrap();
        assert_eq!(keys, vec![Key::Index(0), Key::Index(1)]);
        assert_eq!(values, vec![json!("x"), json!("y")]);

        let (keys, values) = divide(&json!({})).unwrap();
        assert!(keys.is_empty());
        assert!(values.is_empty());
    }

    #[test]
    fn each_keeps_keys() {
        let record = json!({"a": 1, "b": 2});
        let doubled = each(&record, |v| json!(v.as_i64().unwrap_or(0) * 2)).unwrap();
        assert_eq!(doubled, json!({"a": 2, "b": 4}));

        let names = each(&json!([{"name": "x"}, {"name": "y"}]), |v| v["name"].clone()).unwrap();
        assert_eq!(names, json!(["x", "y"]));
    }

    #[test]
    fn column_sum_integers() {
        let records = vec![json!({"v": 1}), json!({"v": 2}), json!({"v": 3})];
        assert_eq!(column_sum(&records, "v"), Numeric::Int(6));
    }

    #[test]
    fn column_sum_skips_missing_and_text() {
        let records = vec![
            json!({"v": 1}),
            json!({"w": 5}),
            json!({"v": "abc"}),
            json!({"v": "4"}),
            json!({"v": 0.5}),
            json!("scalar row"),
        ];
        assert_eq!(column_sum(&records, "v"), Numeric::Float(5.5));
    }

    #[test]
    fn column_sum_nested_field() {
        let records = vec![json!({"stats": {"hits": 2}}), json!({"stats": {"hits": 3}})];
        assert_eq!(column_sum(&records, "stats.hits"), Numeric::Int(5));
        assert_eq!(column_sum(&[], "v"), Numeric::Int(0));
    }
}
