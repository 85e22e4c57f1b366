//! JSON encoding and decoding with configurable output.
//!
//! Encoding defaults match the conventions of classic web backends: compact
//! output, non-ASCII characters escaped as `\uXXXX` and `/` escaped as `\/`.
//! Each of these can be switched off through [`EncodeOptions`].

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use serde_json::Value;
use std::io;
use tracing::debug;

/// Default maximum nesting depth accepted by the decoder.
pub const DEFAULT_MAX_DEPTH: usize = 512;

const PRETTY_INDENT: &[u8] = b"    ";

/// Output options for [`to_json`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EncodeOptions {
    /// Indent nested values by four spaces per level
    pub pretty: bool,
    /// Write non-ASCII characters as `\uXXXX` escapes
    pub escape_unicode: bool,
    /// Write `/` as `\/`
    pub escape_slashes: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            escape_unicode: true,
            escape_slashes: true,
        }
    }
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style method to enable pretty printing.
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Builder-style method to write non-ASCII characters as-is.
    pub fn unescaped_unicode(mut self) -> Self {
        self.escape_unicode = false;
        self
    }

    /// Builder-style method to write `/` as-is.
    pub fn unescaped_slashes(mut self) -> Self {
        self.escape_slashes = false;
        self
    }
}

/// Input options for [`from_json`] and [`from_json_as`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DecodeOptions {
    /// Deepest accepted nesting; a scalar has depth 1, `[1]` has depth 2
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DecodeOptions {
    /// Builder-style method to set the maximum depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Wraps a formatter and applies the optional string escapes.
struct EscapingFormatter<F> {
    inner: F,
    escape_unicode: bool,
    escape_slashes: bool,
}

impl<F> EscapingFormatter<F> {
    fn new(inner: F, options: &EncodeOptions) -> Self {
        Self {
            inner,
            escape_unicode: options.escape_unicode,
            escape_slashes: options.escape_slashes,
        }
    }
}

impl<F: Formatter> Formatter for EscapingFormatter<F> {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (offset, ch) in fragment.char_indices() {
            let slash = ch == '/' && self.escape_slashes;
            let wide = !ch.is_ascii() && self.escape_unicode;
            if !slash && !wide {
                continue;
            }

            writer.write_all(fragment[start..offset].as_bytes())?;
            if slash {
                writer.write_all(b"\\/")?;
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
            start = offset + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_object_key(writer, first)
    }

    fn end_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_key(writer)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }
}

fn encode_with<T, F>(value: &T, formatter: F) -> Result<String>
where
    T: Serialize + ?Sized,
    F: Formatter,
{
    let mut buffer = Vec::with_capacity(128);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| Error::Encode(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| Error::Encode(e.to_string()))
}

/// Serialize any value to JSON text.
pub fn to_json<T: Serialize + ?Sized>(value: &T, options: &EncodeOptions) -> Result<String> {
    if options.pretty {
        let inner = PrettyFormatter::with_indent(PRETTY_INDENT);
        encode_with(value, EscapingFormatter::new(inner, options))
    } else {
        encode_with(value, EscapingFormatter::new(CompactFormatter, options))
    }
}

/// Parse JSON text into a generic value.
///
/// Nesting is bounded by `options.max_depth` rather than by the parser's
/// built-in recursion limit, so the parser's stack use grows with
/// `max_depth`.
pub fn from_json(text: &str, options: &DecodeOptions) -> Result<Value> {
    // Bracket nesting never exceeds value depth, so this rejects over-deep
    // input before the parser recurses into it.
    if bracket_depth(text) > options.max_depth {
        return Err(Error::DepthExceeded {
            limit: options.max_depth,
        });
    }

    let mut deserializer = serde_json::Deserializer::from_str(text);
    deserializer.disable_recursion_limit();
    let value = Value::deserialize(&mut deserializer)
        .and_then(|value| deserializer.end().map(|()| value))
        .map_err(|e| {
            debug!(error = %e, "json decode failed");
            Error::Decode(e.to_string())
        })?;

    if depth(&value) > options.max_depth {
        return Err(Error::DepthExceeded {
            limit: options.max_depth,
        });
    }

    Ok(value)
}

/// Parse JSON text into a structured type.
pub fn from_json_as<T: DeserializeOwned>(text: &str, options: &DecodeOptions) -> Result<T> {
    let value = from_json(text, options)?;
    serde_json::from_value(value).map_err(|e| Error::Decode(e.to_string()))
}

/// Deepest `[`/`{` nesting in the raw text, ignoring brackets inside strings.
fn bracket_depth(text: &str) -> usize {
    let (mut level, mut deepest) = (0usize, 0usize);
    let (mut in_string, mut escaped) = (false, false);
    for byte in text.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'[' | b'{' => {
                level += 1;
                deepest = deepest.max(level);
            }
            b']' | b'}' => level = level.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

/// Nesting depth: scalars and empty containers are 1, containers add one
/// level to their deepest child.
fn depth(value: &Value) -> usize {
    let mut deepest = 0;
    let mut pending = vec![(value, 1usize)];
    while let Some((node, level)) = pending.pop() {
        deepest = deepest.max(level);
        match node {
            Value::Array(items) => pending.extend(items.iter().map(|item| (item, level + 1))),
            Value::Object(map) => pending.extend(map.values().map(|item| (item, level + 1))),
            _ => {}
        }
    }
    deepest
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_escapes_unicode_and_slashes() {
        let value = json!({"path": "a/b", "name": "café"});
        let text = to_json(&value, &EncodeOptions::default()).unwrap();
        assert_eq!(text, r#"{"path":"a\/b","name":"caf\u00e9"}"#);
    }

    #[test]
    fn surrogate_pairs_for_astral_characters() {
        let text = to_json(&json!("🎉"), &EncodeOptions::default()).unwrap();
        assert_eq!(text, r#""\ud83c\udf89""#);
    }

    #[test]
    fn unescaped_output() {
        let options = EncodeOptions::new().unescaped_unicode().unescaped_slashes();
        let text = to_json(&json!(["日本", "a/b"]), &options).unwrap();
        assert_eq!(text, r#"["日本","a/b"]"#);
    }

    #[test]
    fn escapes_keys_too() {
        let text = to_json(&json!({"ключ": 1}), &EncodeOptions::default()).unwrap();
        assert_eq!(text, r#"{"\u043a\u043b\u044e\u0447":1}"#);
    }

    #[test]
    fn control_characters_still_escaped() {
        let text = to_json(&json!("a\"b\n"), &EncodeOptions::default()).unwrap();
        assert_eq!(text, r#""a\"b\n""#);
    }

    #[test]
    fn pretty_uses_four_spaces() {
        let text = to_json(&json!({"a": [1, 2]}), &EncodeOptions::new().pretty()).unwrap();
        assert_eq!(text, "{\n    \"a\": [\n        1,\n        2\n    ]\n}");
    }

    #[test]
    fn decode_generic_value() {
        let value = from_json(r#"{"a": {"b": [1, 2]}}"#, &DecodeOptions::default()).unwrap();
        assert_eq!(value, json!({"a": {"b": [1, 2]}}));
    }

    #[test]
    fn decode_keeps_key_order() {
        let value = from_json(r#"{"z": 1, "a": 2}"#, &DecodeOptions::default()).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn decode_malformed_is_error() {
        let result = from_json("{not json", &DecodeOptions::default());
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn decode_depth_limit() {
        let options = DecodeOptions::default().with_max_depth(2);
        assert!(from_json("[1]", &options).is_ok());
        assert!(from_json("[]", &options).is_ok());
        assert_eq!(
            from_json("[[1]]", &options),
            Err(Error::DepthExceeded { limit: 2 })
        );
    }

    fn nested_arrays(levels: usize) -> String {
        format!("{}{}", "[".repeat(levels), "]".repeat(levels))
    }

    #[test]
    fn decode_beyond_parser_recursion_limit() {
        let value = from_json(&nested_arrays(200), &DecodeOptions::default()).unwrap();
        assert_eq!(depth(&value), 200);
        assert!(from_json(&nested_arrays(DEFAULT_MAX_DEPTH), &DecodeOptions::default()).is_ok());
    }

    #[test]
    fn decode_rejects_beyond_default_depth() {
        assert_eq!(
            from_json(&nested_arrays(DEFAULT_MAX_DEPTH + 1), &DecodeOptions::default()),
            Err(Error::DepthExceeded {
                limit: DEFAULT_MAX_DEPTH
            })
        );
        assert_eq!(
            from_json(&nested_arrays(100_000), &DecodeOptions::default()),
            Err(Error::DepthExceeded {
                limit: DEFAULT_MAX_DEPTH
            })
        );
    }

    #[test]
    fn brackets_inside_strings_are_not_nesting() {
        assert_eq!(bracket_depth(r#"["[[[\"{{", {"a": "]]"}]"#), 2);
        let options = DecodeOptions::default().with_max_depth(2);
        assert!(from_json(r#"["[[[[[["]"#, &options).is_ok());
    }

    #[test]
    fn decode_trailing_garbage_is_error() {
        let result = from_json("[1] [2]", &DecodeOptions::default());
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        name: String,
        age: u32,
    }

    #[test]
    fn decode_structured() {
        let user: User =
            from_json_as(r#"{"name": "Alice", "age": 30}"#, &DecodeOptions::default()).unwrap();
        assert_eq!(
            user,
            User {
                name: "Alice".into(),
                age: 30
            }
        );

        let result: Result<User> = from_json_as(r#"{"name": 5}"#, &DecodeOptions::default());
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: EncodeOptions = serde_json::from_str(r#"{"pretty": true}"#).unwrap();
        assert!(options.pretty);
        assert!(options.escape_unicode);

        let options: DecodeOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
    }
}
