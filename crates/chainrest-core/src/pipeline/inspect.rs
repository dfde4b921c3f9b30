use serde_json::Value;
use std::fmt::Write;

use crate::upstream::errors::{ResponseBody, UpstreamError};

/// Upper bound on a rendered failure, in characters.
pub const MAX_INSPECT_CHARS: usize = 2048;

/// Nesting levels rendered before collapsing to `[Object]` / `[Array]`.
pub const INSPECT_DEPTH: usize = 2;

/// Diagnostic rendering of a failure nothing else could classify.
///
/// Bounded in length and nesting depth; formatting cannot fail.
#[must_use]
pub fn inspect_failure(failure: &UpstreamError) -> String {
    let rendered = match failure {
        UpstreamError::Http { status, body: ResponseBody::Json(value) } => {
            format!("HTTP error: {status} {}", inspect_value(value, INSPECT_DEPTH))
        }
        other => other.to_string(),
    };
    truncate(rendered)
}

/// Renders `value` with nested containers below `depth` collapsed.
#[must_use]
pub fn inspect_value(value: &Value, depth: usize) -> String {
    let mut out = String::new();
    write_value(&mut out, value, depth);
    truncate(out)
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Object(_) if depth == 0 => out.push_str("[Object]"),
        Value::Array(_) if depth == 0 => out.push_str("[Array]"),
        Value::Object(map) => {
            if map.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{ ");
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "{key}: ");
                write_value(out, item, depth - 1);
                if out.len() > MAX_INSPECT_CHARS {
                    break;
                }
            }
            out.push_str(" }");
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item, depth - 1);
                if out.len() > MAX_INSPECT_CHARS {
                    break;
                }
            }
            out.push(']');
        }
        scalar => {
            let _ = write!(out, "{scalar}");
        }
    }
}

fn truncate(text: String) -> String {
    if text.chars().count() <= MAX_INSPECT_CHARS {
        return text;
    }
    let mut cut: String = text.chars().take(MAX_INSPECT_CHARS).collect();
    cut.push_str("...");
    cut
}
