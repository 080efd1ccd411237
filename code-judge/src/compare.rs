//! Verdict comparator.
//!
//! Equality is layered, each step more lenient than the last:
//!
//! 1. exact match after trimming both sides
//! 2. match after removing every whitespace character
//! 3. JSON canonicalization: lists are compared order-insensitively (inner
//!    lists sorted, top-level elements sorted by their serialized form),
//!    objects by sorted keys
//! 4. the whitespace-stripped decision from step 2
//!
//! Step 3 accepts list answers in any order. Whether that is wanted for
//! problems where order matters is an open policy question, so the behavior
//! is kept as-is.

use serde_json::Value;
use std::cmp::Ordering;

/// Decide whether `actual` output matches `expected`.
pub fn outputs_match(actual: &str, expected: &str) -> bool {
    let actual = actual.trim();
    let expected = expected.trim();
    if actual == expected {
        return true;
    }

    let stripped_equal = strip_whitespace(actual) == strip_whitespace(expected);
    if stripped_equal {
        return true;
    }

    if let Some(equal) = json_equal(actual, expected) {
        if equal {
            return true;
        }
    }

    stripped_equal
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// `None` when the two sides cannot be compared as JSON of the same shape.
fn json_equal(actual: &str, expected: &str) -> Option<bool> {
    let actual: Value = serde_json::from_str(actual).ok()?;
    let expected: Value = serde_json::from_str(expected).ok()?;

    match (actual, expected) {
        (Value::Array(a), Value::Array(e)) => Some(canonical_list(a) == canonical_list(e)),
        // serde_json::Map keeps keys sorted, so serialization is canonical
        (a @ Value::Object(_), e @ Value::Object(_)) => Some(a.to_string() == e.to_string()),
        _ => None,
    }
}

fn canonical_list(items: Vec<Value>) -> Vec<String> {
    let mut rendered: Vec<String> = items
        .into_iter()
        .map(|item| match item {
            Value::Array(mut inner) => {
                inner.sort_by(ascending);
                Value::Array(inner).to_string()
            }
            other => other.to_string(),
        })
        .collect();
    rendered.sort();
    rendered
}

fn ascending(a: &Value, b: &Value) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.to_string().cmp(&b.to_string()),
    }
}
