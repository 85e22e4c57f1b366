//! URL query-string building.

use crate::access::NodeKind;
use crate::error::{Error, Result};
use crate::key::entries;
use serde_json::Value;

/// Build an `&`-joined query string from a record.
///
/// Keys and values are percent-encoded per RFC 3986. Nested containers
/// produce bracketed keys (`filter[tags][0]=a`, with the brackets encoded),
/// `null` values are skipped and booleans are written as `1`/`0`.
pub fn query(record: &Value) -> Result<String> {
    if NodeKind::of(record) == NodeKind::Scalar {
        return Err(Error::NotAccessible {
            kind: NodeKind::Scalar,
        });
    }

    let mut pairs = Vec::new();
    for (key, value) in entries(record) {
        append(&mut pairs, &encode(&key.to_string()), value);
    }
    Ok(pairs.join("&"))
}

fn append(pairs: &mut Vec<String>, name: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::Bool(flag) => pairs.push(format!("{}={}", name, u8::from(*flag))),
        Value::Number(number) => pairs.push(format!("{}={}", name, encode(&number.to_string()))),
        Value::String(text) => pairs.push(format!("{}={}", name, encode(text))),
        Value::Array(_) | Value::Object(_) => {
            for (key, child) in entries(value) {
                let nested = format!("{}%5B{}%5D", name, encode(&key.to_string()));
                append(pairs, &nested, child);
            }
        }
    }
}

/// Percent-encode everything except RFC 3986 unreserved characters.
fn encode(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_record() {
        let record = json!({"name": "Jane Doe", "age": 30, "ok": true, "no": false});
        assert_eq!(
            query(&record).unwrap(),
            "name=Jane%20Doe&age=30&ok=1&no=0"
        );
    }

    #[test]
    fn nested_record() {
        let record = json!({"filter": {"tags": ["a", "b"], "skip": null}, "page": 2});
        assert_eq!(
            query(&record).unwrap(),
            "filter%5Btags%5D%5B0%5D=a&filter%5Btags%5D%5B1%5D=b&page=2"
        );
    }

    #[test]
    fn reserved_characters_are_encoded() {
        let record = json!({"q": "a+b&c=d/é~"});
        assert_eq!(query(&record).unwrap(), "q=a%2Bb%26c%3Dd%2F%C3%A9~");
    }

    #[test]
    fn sequence_root_and_empty() {
        assert_eq!(query(&json!(["x", "y"])).unwrap(), "0=x&1=y");
        assert_eq!(query(&json!({})).unwrap(), "");
        assert_eq!(query(&json!({"empty": []})).unwrap(), "");
    }

    #[test]
    fn scalar_is_rejected() {
        assert!(matches!(
            query(&json!("text")),
            Err(Error::NotAccessible { .. })
        ));
    }
}
