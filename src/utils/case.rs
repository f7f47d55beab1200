//! Recursive key-casing transforms for JSON payloads
//!
//! The wire protocol uses underscored keys while the client surface uses
//! camel-cased ones. Both transforms walk the value tree uniformly: object
//! keys are converted, arrays are mapped element-wise, scalars pass through
//! unchanged. Applying a transform twice yields the same result as applying
//! it once.

use serde_json::{Map, Value};

/// Convert a single underscored key to camel case.
///
/// Only an underscore followed by a lowercase ASCII letter is collapsed;
/// anything else is kept verbatim, so already-camel keys are unchanged.
fn camel_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '_' {
            match chars.peek() {
                Some(next) if next.is_ascii_lowercase() => {
                    out.push(next.to_ascii_uppercase());
                    chars.next();
                }
                _ => out.push('_'),
            }
        } else {
            out.push(c);
        }
    }

    out
}

/// Convert a single camel-cased key to underscored form
fn snake_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);

    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

/// Recursively convert all object keys from underscored to camel case
pub fn camelize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut result = Map::with_capacity(map.len());
            for (key, inner) in map {
                result.insert(camel_key(&key), camelize_keys(inner));
            }
            Value::Object(result)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(camelize_keys).collect()),
        scalar => scalar,
    }
}

/// Recursively convert all object keys from camel case to underscored form
pub fn snakeize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut result = Map::with_capacity(map.len());
            for (key, inner) in map {
                result.insert(snake_key(&key), snakeize_keys(inner));
            }
            Value::Object(result)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(snakeize_keys).collect()),
        scalar => scalar,
    }
}
