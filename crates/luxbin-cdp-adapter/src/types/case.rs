/*
[INPUT]:  JSON values keyed in snake_case or camelCase
[OUTPUT]: The same values with every object key renamed
[POS]:    Data layer - field naming conversion between browser and CDP
[UPDATE]: When a naming convention with acronyms or digits needs special handling
*/

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::warn;

/// `payment_currency` -> `paymentCurrency`
pub fn to_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for ch in key.chars() {
        if ch == '_' && !out.is_empty() {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// `paymentCurrency` -> `payment_currency`
pub fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Recursively rename object keys to camelCase. Values are untouched.
pub fn camelize_keys(value: Value) -> Value {
    rename_keys(value, &to_camel_case)
}

/// Recursively rename object keys to snake_case. Values are untouched.
pub fn snakify_keys(value: Value) -> Value {
    rename_keys(value, &to_snake_case)
}

/// A key already in the target form keeps its name. Other keys that would
/// collide with it, or with each other, keep their original name so no
/// field is overwritten.
fn rename_keys(value: Value, rename: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => {
            let mut claims: HashMap<String, usize> = HashMap::with_capacity(map.len());
            for key in map.keys() {
                *claims.entry(rename(key)).or_default() += 1;
            }

            let mut out = Map::with_capacity(map.len());
            for (key, value) in map {
                let renamed = rename(&key);
                let name = if renamed == key || claims.get(&renamed) == Some(&1) {
                    renamed
                } else {
                    warn!(key = %key, renamed = %renamed, "renamed key collides; keeping original");
                    key
                };
                out.insert(name, rename_keys(value, rename));
            }
            Value::Object(out)
        }
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|item| rename_keys(item, rename)).collect())
        }
        other => other,
    }
}
