//! Input normalization.
//!
//! Whatever shape a caller supplies, the harness receives one line-oriented
//! string through the environment.

use serde_json::Value;

use crate::types::TestInput;

/// Convert a caller-supplied input into the canonical string fed to a harness.
///
/// Never fails: anything that does not decode cleanly is used as literal text.
pub fn normalize(raw: Option<&TestInput>) -> String {
    match raw {
        None => String::new(),
        Some(TestInput::List(items)) => join_lines(items),
        Some(TestInput::Text(text)) => normalize_text(text),
        Some(TestInput::Value(value)) => match value {
            Value::Array(items) => join_lines(items),
            other => render_scalar(other),
        },
    }
}

fn normalize_text(text: &str) -> String {
    let trimmed = text.trim();
    if !(trimmed.starts_with('[') || trimmed.starts_with('{')) {
        return text.to_string();
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(items)) => join_lines(&items),
        _ => text.to_string(),
    }
}

fn join_lines(items: &[Value]) -> String {
    items
        .iter()
        .map(render_scalar)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // Nested structures keep their compact JSON form
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
