//! Shared conversion helpers for the operator evaluators.

use crate::types::Value;

/// The unquoted textual form of a value, for concatenation and
/// string-typed comparison. `Display` wraps text-like kinds in quotes,
/// which is right for diagnostics but wrong here.
pub(crate) fn raw_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Char(c) => c.to_string(),
        Value::Chars(cs) => cs.iter().collect(),
        Value::Guid(g) => g.to_string(),
        other => other.to_string(),
    }
}
