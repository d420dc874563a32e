//! Three-valued logic over already-evaluated operands.
//!
//! The dominant operand wins before type checking: `And` with any False
//! side is False and `Or` with any True side is True, even when the other
//! side is Null or not a boolean at all. The evaluator relies on this to
//! short-circuit without typing the pruned branch.

use crate::error::{Error, Result};
use crate::types::Value;

pub(crate) fn and(left: &Value, right: &Value) -> Result<Value> {
    if matches!(left, Value::Boolean(false)) || matches!(right, Value::Boolean(false)) {
        return Ok(Value::Boolean(false));
    }
    match (left, right) {
        (Value::Boolean(true), Value::Boolean(true)) => Ok(Value::Boolean(true)),
        (Value::Null, Value::Boolean(true))
        | (Value::Boolean(true), Value::Null)
        | (Value::Null, Value::Null) => Ok(Value::Null),
        _ => Err(Error::TypeMismatch {
            op: "And",
            left: left.storage_type(),
            right: right.storage_type(),
        }),
    }
}

pub(crate) fn or(left: &Value, right: &Value) -> Result<Value> {
    if matches!(left, Value::Boolean(true)) || matches!(right, Value::Boolean(true)) {
        return Ok(Value::Boolean(true));
    }
    match (left, right) {
        (Value::Boolean(false), Value::Boolean(false)) => Ok(Value::Boolean(false)),
        (Value::Null, Value::Boolean(false))
        | (Value::Boolean(false), Value::Null)
        | (Value::Null, Value::Null) => Ok(Value::Null),
        _ => Err(Error::TypeMismatch {
            op: "Or",
            left: left.storage_type(),
            right: right.storage_type(),
        }),
    }
}

pub(crate) fn not(operand: &Value) -> Result<Value> {
    match operand {
        Value::Boolean(b) => Ok(Value::Boolean(!b)),
        Value::Null => Ok(Value::Null),
        other => Err(Error::EvalError(format!(
            "'Not' requires a boolean operand, found {:?}",
            other
        ))),
    }
}
