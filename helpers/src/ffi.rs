//! FFI layer for calling the helpers from other languages.
//!
//! This module provides C-compatible functions. All data crosses the boundary
//! as JSON strings; records are passed in and the resulting value is passed
//! back, so no Rust-owned state outlives a call.
//!
//! # Memory Management
//!
//! - Strings returned by `arr_*` functions are allocated by Rust
//! - Caller must free them with `arr_string_free`
//! - `arr_version` returns a static string that must not be freed
//!
//! # Error Handling
//!
//! Functions return JSON with either:
//! - `{"ok": <result>}` on success
//! - `{"error": "<message>"}` on failure

use crate::error::{Error, Result};
use crate::{
    chunk, column_sum, divide, forget, from_json_as, get, has, only, query, set, shuffle,
    sort_by_field, to_json, DecodeOptions, EncodeOptions, SortSpec,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::ffi::{c_char, CStr, CString};

/// Result wrapper for FFI responses.
#[derive(serde::Serialize)]
#[serde(untagged)]
enum FfiResult<T: serde::Serialize> {
    Ok { ok: T },
    Err { error: String },
}

impl<T: serde::Serialize> FfiResult<T> {
    fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| format!(r#"{{"error":"serialization failed: {}"}}"#, e))
    }
}

impl<T: serde::Serialize> From<Result<T>> for FfiResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(ok) => FfiResult::Ok { ok },
            Err(e) => FfiResult::Err {
                error: e.to_string(),
            },
        }
    }
}

/// A single key or a list of keys.
#[derive(Deserialize)]
#[serde(untagged)]
enum Keys {
    One(String),
    Many(Vec<String>),
}

impl Keys {
    fn into_vec(self) -> Vec<String> {
        match self {
            Keys::One(key) => vec![key],
            Keys::Many(keys) => keys,
        }
    }
}

/// Convert a Rust string to a C string pointer.
/// Caller must free with `arr_string_free`.
fn to_c_string(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(cs) => cs.into_raw(),
        Err(_) => {
            // Interior NUL bytes cannot cross the boundary
            CString::from(c"{\"error\":\"string contained null bytes\"}").into_raw()
        }
    }
}

/// Run a call body and encode its outcome.
fn respond<T, F>(body: F) -> *mut c_char
where
    T: serde::Serialize,
    F: FnOnce() -> Result<T>,
{
    to_c_string(FfiResult::from(body()).to_json())
}

/// Read an optional C string. Null is `None`; invalid UTF-8 is an error.
unsafe fn optional_str(ptr: *const c_char, name: &str) -> Result<Option<String>> {
    if ptr.is_null() {
        return Ok(None);
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map(|s| Some(s.to_string()))
        .map_err(|_| Error::InvalidArgument(format!("{} is not valid UTF-8", name)))
}

/// Read a required C string.
unsafe fn required_str(ptr: *const c_char, name: &str) -> Result<String> {
    optional_str(ptr, name)?.ok_or_else(|| Error::InvalidArgument(format!("{} is null", name)))
}

/// Read a required C string holding JSON.
unsafe fn json_arg<T: DeserializeOwned>(ptr: *const c_char, name: &str) -> Result<T> {
    let text = required_str(ptr, name)?;
    from_json_as(&text, &DecodeOptions::default())
}

/// Free a string allocated by this library.
///
/// # Safety
/// - `s` must be a valid pointer from an `arr_*` function
/// - Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn arr_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

// ============================================================================
// Path Access
// ============================================================================

/// Get a value by dot path.
///
/// # Arguments
/// - `record_json`: JSON record
/// - `path`: dot path, or null for the whole record
/// - `default_json`: JSON default, or null for `null`
///
/// # Returns
/// JSON string: `{"ok": value}` or `{"error": "message"}`
///
/// # Safety
/// - All arguments must be valid null-terminated C strings or null
/// - Caller must free the returned string with `arr_string_free`
#[no_mangle]
pub unsafe extern "C" fn arr_get(
    record_json: *const c_char,
    path: *const c_char,
    default_json: *const c_char,
) -> *mut c_char {
    respond(|| {
        let record: Value = json_arg(record_json, "record")?;
        let path = optional_str(path, "path")?;
        let default: Value = match optional_str(default_json, "default")? {
            Some(text) => serde_json::from_str(&text)
                .map_err(|e| Error::InvalidArgument(format!("default: parse error: {}", e)))?,
            None => Value::Null,
        };
        Ok(get(&record, path.as_deref(), &default).clone())
    })
}

/// Set a value by dot path and return the updated record.
///
/// # Returns
/// JSON string: `{"ok": record}` or `{"error": "message"}`
///
/// # Safety
/// - `record_json` and `value_json` must be valid null-terminated C strings
/// - `path` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `arr_string_free`
#[no_mangle]
pub unsafe extern "C" fn arr_set(
    record_json: *const c_char,
    path: *const c_char,
    value_json: *const c_char,
) -> *mut c_char {
    respond(|| {
        let mut record: Value = json_arg(record_json, "record")?;
        let path = optional_str(path, "path")?;
        let value: Value = json_arg(value_json, "value")?;
        set(&mut record, path.as_deref(), value);
        Ok(record)
    })
}

/// Check that one or more dot paths exist.
///
/// # Arguments
/// - `keys_json`: a JSON string or an array of strings
///
/// # Returns
/// JSON string: `{"ok": true|false}` or `{"error": "message"}`
///
/// # Safety
/// - Both arguments must be valid null-terminated C strings
/// - Caller must free the returned string with `arr_string_free`
#[no_mangle]
pub unsafe extern "C" fn arr_has(
    record_json: *const c_char,
    keys_json: *const c_char,
) -> *mut c_char {
    respond(|| {
        let record: Value = json_arg(record_json, "record")?;
        let keys: Keys = json_arg(keys_json, "keys")?;
        Ok(has(&record, keys.into_vec()))
    })
}

/// Remove one or more dot paths and return the updated record.
///
/// # Safety
/// - Both arguments must be valid null-terminated C strings
/// - Caller must free the returned string with `arr_string_free`
#[no_mangle]
pub unsafe extern "C" fn arr_forget(
    record_json: *const c_char,
    keys_json: *const c_char,
) -> *mut c_char {
    respond(|| {
        let mut record: Value = json_arg(record_json, "record")?;
        let keys: Keys = json_arg(keys_json, "keys")?;
        forget(&mut record, keys.into_vec());
        Ok(record)
    })
}

// ============================================================================
// Derived Collections
// ============================================================================

/// Keep only the listed keys of a record.
///
/// # Safety
/// - Both arguments must be valid null-terminated C strings
/// - Caller must free the returned string with `arr_string_free`
#[no_mangle]
pub unsafe extern "C" fn arr_only(
    record_json: *const c_char,
    keys_json: *const c_char,
) -> *mut c_char {
    respond(|| {
        let record: Value = json_arg(record_json, "record")?;
        let keys: Keys = json_arg(keys_json, "keys")?;
        only(&record, keys.into_vec())
    })
}

/// Split a record into keys and values.
///
/// # Returns
/// JSON string: `{"ok": [[keys...], [values...]]}` or `{"error": "message"}`
///
/// # Safety
/// - `record_json` must be a valid null-terminated C string
/// - Caller must free the returned string with `arr_string_free`
#[no_mangle]
pub unsafe extern "C" fn arr_divide(record_json: *const c_char) -> *mut c_char {
    respond(|| {
        let record: Value = json_arg(record_json, "record")?;
        divide(&record)
    })
}

/// Sum a field across an array of records.
///
/// # Safety
/// - Both arguments must be valid null-terminated C strings
/// - Caller must free the returned string with `arr_string_free`
#[no_mangle]
pub unsafe extern "C" fn arr_column_sum(
    records_json: *const c_char,
    field: *const c_char,
) -> *mut c_char {
    respond(|| {
        let records: Vec<Value> = json_arg(records_json, "records")?;
        let field = required_str(field, "field")?;
        Ok(column_sum(&records, &field).to_value())
    })
}

/// Sort an array of records.
///
/// # Arguments
/// - `spec_json`: ordered object of field → `"asc"`/`"desc"`
///
/// # Safety
/// - Both arguments must be valid null-terminated C strings
/// - Caller must free the returned string with `arr_string_free`
#[no_mangle]
pub unsafe extern "C" fn arr_sort_by_field(
    records_json: *const c_char,
    spec_json: *const c_char,
) -> *mut c_char {
    respond(|| {
        let records: Vec<Value> = json_arg(records_json, "records")?;
        let spec: SortSpec = json_arg(spec_json, "spec")?;
        Ok(sort_by_field(&records, &spec))
    })
}

// ============================================================================
// Pass-through Utilities
// ============================================================================

/// Build a URL query string from a record.
///
/// # Safety
/// - `record_json` must be a valid null-terminated C string
/// - Caller must free the returned string with `arr_string_free`
#[no_mangle]
pub unsafe extern "C" fn arr_query(record_json: *const c_char) -> *mut c_char {
    respond(|| {
        let record: Value = json_arg(record_json, "record")?;
        query(&record)
    })
}

/// Split an array of records into groups of `size`.
///
/// # Safety
/// - `records_json` must be a valid null-terminated C string
/// - Caller must free the returned string with `arr_string_free`
#[no_mangle]
pub unsafe extern "C" fn arr_chunk(records_json: *const c_char, size: u32) -> *mut c_char {
    respond(|| {
        let records: Vec<Value> = json_arg(records_json, "records")?;
        let chunks: Vec<&[Value]> = chunk(&records, size as usize)?.collect();
        serde_json::to_value(chunks).map_err(|e| Error::Encode(e.to_string()))
    })
}

/// Shuffle a record's values.
///
/// # Arguments
/// - `seed`: non-negative for a reproducible order, negative for a random one
///
/// # Safety
/// - `record_json` must be a valid null-terminated C string
/// - Caller must free the returned string with `arr_string_free`
#[no_mangle]
pub unsafe extern "C" fn arr_shuffle(record_json: *const c_char, seed: i64) -> *mut c_char {
    respond(|| {
        let record: Value = json_arg(record_json, "record")?;
        let seed = u64::try_from(seed).ok();
        Ok(shuffle(&record, seed))
    })
}

/// Re-encode a JSON value with the given output options.
///
/// # Arguments
/// - `options_json`: `EncodeOptions` object, or null for the defaults
///
/// # Returns
/// JSON string: `{"ok": "<encoded text>"}` or `{"error": "message"}`
///
/// # Safety
/// - `value_json` must be a valid null-terminated C string
/// - `options_json` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `arr_string_free`
#[no_mangle]
pub unsafe extern "C" fn arr_to_json(
    value_json: *const c_char,
    options_json: *const c_char,
) -> *mut c_char {
    respond(|| {
        let value: Value = json_arg(value_json, "value")?;
        let options: EncodeOptions = match optional_str(options_json, "options")? {
            Some(text) => serde_json::from_str(&text)
                .map_err(|e| Error::InvalidArgument(format!("options: parse error: {}", e)))?,
            None => EncodeOptions::default(),
        };
        to_json(&value, &options)
    })
}

/// Get the library version.
///
/// # Returns
/// Static string pointer (do not free)
#[no_mangle]
pub extern "C" fn arr_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
