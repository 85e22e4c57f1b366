//! # Array Helpers
//!
//! Dot-notation access and collection utilities for `serde_json` values.
//!
//! This crate treats JSON objects and arrays as nested records that can be read
//! and written through dotted paths (`"user.address.city"`), filtered,
//! projected, sorted by several fields and encoded back to JSON or a URL query
//! string.
//!
//! ## Design Principles
//!
//! - **No IO**: Every helper is a pure function over values in memory
//! - **Lenient lookups**: A missing path yields a default or `false`, never an error
//! - **Order preserving**: Mapping entries keep their insertion order
//! - **Portable**: Usable natively or through the C ABI in [`ffi`]
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! A record is any [`serde_json::Value`]:
//! - Objects are *mappings*, keyed by name
//! - Arrays are *sequences*, keyed by position
//! - Everything else is a *scalar* and has no children
//!
//! Keys are represented by [`Key`]; canonical decimal strings such as `"0"`
//! address sequence positions.
//!
//! ### Paths
//!
//! [`get`], [`has`], [`set`] and [`forget`] resolve dotted paths one segment
//! at a time. A key that literally contains dots wins when it exists at the
//! top level. The [`OffsetAccess`] trait lets other types answer [`exists`]
//! and [`has`].
//!
//! ### Collections
//!
//! - [`filter`], [`only`], [`divide`], [`each`] - derive new records
//! - [`column_sum`] - add up a field across records
//! - [`sort_by_field`] - stable multi-field sort driven by a [`SortSpec`]
//! - [`chunk`] / [`chunk_with`] - lazy fixed-size groups
//! - [`shuffle`] - random (optionally seeded) permutation of values
//!
//! ## Quick Start
//!
//! ```rust
//! use array_helpers::{get, has, set, sort_by_field, to_json, EncodeOptions, SortSpec};
//! use serde_json::json;
//!
//! // 1. Read nested values
//! let mut user = json!({"name": "Alice", "address": {"city": "Paris"}});
//! assert_eq!(get(&user, Some("address.city"), &json!(null)), &json!("Paris"));
//! assert!(!has(&user, ["address.zip"]));
//!
//! // 2. Write nested values, creating intermediate mappings
//! set(&mut user, Some("address.zip"), json!("75001"));
//! assert!(has(&user, ["address.city", "address.zip"]));
//!
//! // 3. Sort records by several fields
//! let people = vec![
//!     json!({"id": 2, "age": 30}),
//!     json!({"id": 1, "age": 25}),
//! ];
//! let spec = SortSpec::new().asc("id").desc("age");
//! let sorted = sort_by_field(&people, &spec);
//! assert_eq!(sorted[0]["id"], 1);
//!
//! // 4. Encode with escaped slashes
//! let text = to_json(&json!({"url": "a/b"}), &EncodeOptions::default()).unwrap();
//! assert_eq!(text, r#"{"url":"a\/b"}"#);
//! ```
//!
//! ## FFI
//!
//! The [`ffi`] module provides C-compatible functions for use from other languages.
//! All data is exchanged as JSON strings.
//!
//! ## Logging
//!
//! Helpers emit `tracing` events at `debug` and `trace` level. No subscriber is
//! installed; the host application decides where they go.

pub mod access;
pub mod chunk;
pub mod collect;
pub mod error;
pub mod ffi;
pub mod json;
pub mod key;
pub mod numeric;
pub mod query;
pub mod shuffle;
pub mod sort;

// Re-export main types at crate root
pub use access::{accessible, exists, forget, get, has, lookup, set, NodeKind, OffsetAccess};
pub use chunk::{chunk, chunk_with, Chunks, MapChunks};
pub use collect::{column_sum, divide, each, filter, only};
pub use error::{Error, Result};
pub use json::{from_json, from_json_as, to_json, DecodeOptions, EncodeOptions, DEFAULT_MAX_DEPTH};
pub use key::{Key, PATH_SEPARATOR};
pub use numeric::Numeric;
pub use query::query;
pub use shuffle::{shuffle, shuffle_with};
pub use sort::{sort_by_field, Direction, SortSpec};
