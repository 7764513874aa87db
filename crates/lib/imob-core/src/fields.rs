//! Field lookup across naming conventions.
//!
//! Backend records are loosely typed JSON objects. Depending on the route that
//! produced them, the same logical field may be emitted as `dueAt` or `due_at`.
//! Callers name the field once in `camelCase` and the helpers here also try the
//! derived `snake_case` form.

use serde_json::{Map, Value};

/// A backend record: string keys mapped to JSON values.
pub type Record = Map<String, Value>;

/// Converts a `camelCase` name into its `snake_case` form.
///
/// Every uppercase character becomes `_` followed by its lowercase form. A
/// leading underscore produced by an initial capital is dropped.
#[must_use]
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_uppercase() {
            out.push('_');
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    match out.strip_prefix('_') {
        Some(stripped) => stripped.to_string(),
        None => out,
    }
}

/// Returns the first present, non-null value among `names`.
///
/// Names are checked in the order given; for each name the verbatim key wins
/// over its `snake_case` alternate.
#[must_use]
pub fn resolve<'a>(record: &'a Record, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| {
        present(record, name).or_else(|| {
            let alternate = snake_case(name);
            if alternate == *name {
                None
            } else {
                present(record, &alternate)
            }
        })
    })
}

fn present<'a>(record: &'a Record, key: &str) -> Option<&'a Value> {
    record.get(key).filter(|value| !value.is_null())
}

/// Resolves a field and renders it as text.
///
/// Strings are returned verbatim, numbers and booleans are rendered. Empty
/// strings count as absent.
#[must_use]
pub fn text(record: &Record, names: &[&str]) -> Option<String> {
    let rendered = match resolve(record, names)? {
        Value::String(value) => value.clone(),
        Value::Number(value) => value.to_string(),
        Value::Bool(value) => value.to_string(),
        other => other.to_string(),
    };
    (!rendered.is_empty()).then_some(rendered)
}

/// Resolves a field as a number.
///
/// Accepts JSON numbers and numeric strings; decimal columns arrive from the
/// backend as strings such as `"350000.00"`.
#[must_use]
pub fn number(record: &Record, names: &[&str]) -> Option<f64> {
    let value = match resolve(record, names)? {
        Value::Number(value) => value.as_f64(),
        Value::String(value) => value.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|value| value.is_finite())
}

/// Returns `true` when the field resolves to a truthy value.
///
/// Zero, `false`, empty strings, empty collections and absent fields are not set.
#[must_use]
pub fn is_set(record: &Record, names: &[&str]) -> bool {
    match resolve(record, names) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(value)) => *value,
        Some(Value::Number(value)) => value.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(value)) => !value.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
    }
}
