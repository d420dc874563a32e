//! Relational comparison, dispatched by the resolved comparison type.
//!
//! Any fault raised while converting operands for a type-directed
//! comparison is surfaced as `TypeMismatch` for the operator, never
//! propagated raw.

use super::helpers::raw_string;
use crate::error::{Error, Result};
use crate::operators::BinaryOp;
use crate::types::{StorageType, Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// String comparison behavior of the owning table. The default matches
/// case-folding culture comparison; `ordinal` bypasses folding entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringCompareOptions {
    pub case_sensitive: bool,
    pub ordinal: bool,
}

impl Default for StringCompareOptions {
    fn default() -> Self {
        StringCompareOptions {
            case_sensitive: false,
            ordinal: false,
        }
    }
}

pub(crate) fn compare(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    result_type: StorageType,
    options: &StringCompareOptions,
) -> Result<Value> {
    let ordering =
        compare_values(left, right, result_type, options).map_err(|_| Error::TypeMismatch {
            op: op.symbol(),
            left: left.storage_type(),
            right: right.storage_type(),
        })?;

    Ok(Value::Boolean(match op {
        BinaryOp::Equal => ordering == Ordering::Equal,
        BinaryOp::NotEqual => ordering != Ordering::Equal,
        BinaryOp::GreaterThan => ordering == Ordering::Greater,
        BinaryOp::LessThan => ordering == Ordering::Less,
        BinaryOp::GreaterOrEqual => ordering != Ordering::Less,
        BinaryOp::LessOrEqual => ordering != Ordering::Greater,
        other => {
            return Err(Error::Internal(format!(
                "comparison called with non-relational operator {:?}",
                other
            )));
        }
    }))
}

pub(crate) fn compare_values(
    left: &Value,
    right: &Value,
    result_type: StorageType,
    options: &StringCompareOptions,
) -> Result<Ordering> {
    use StorageType as S;

    let incomparable = || {
        Error::EvalError(format!(
            "cannot compare {:?} and {:?} as {}",
            left, right, result_type
        ))
    };

    match result_type.native_kind() {
        S::Boolean => match (left, right) {
            (Value::Boolean(a), Value::Boolean(b)) => Ok(a.cmp(b)),
            _ => Err(incomparable()),
        },

        S::String | S::Char | S::Chars => {
            let l = raw_string(left);
            let r = raw_string(right);
            if options.ordinal || options.case_sensitive {
                Ok(l.cmp(&r))
            } else {
                Ok(l.to_lowercase().cmp(&r.to_lowercase()))
            }
        }

        S::Guid => match (left, right) {
            (Value::Guid(a), Value::Guid(b)) => Ok(a.cmp(b)),
            _ => Err(incomparable()),
        },

        S::SByte | S::Byte | S::Int16 | S::UInt16 | S::Int32 | S::UInt32 | S::Int64
        | S::UInt64 | S::BigInteger => Ok(left.to_i128()?.cmp(&right.to_i128()?)),

        S::Single | S::Double => {
            // NaN takes its IEEE total-order position instead of failing a
            // well-typed comparison.
            Ok(left.to_f64()?.total_cmp(&right.to_f64()?))
        }

        S::Decimal => Ok(left.to_decimal()?.cmp(&right.to_decimal()?)),

        S::DateTime => match (left, right) {
            (Value::DateTime(a), Value::DateTime(b)) => Ok(a.cmp(b)),
            _ => Err(incomparable()),
        },
        S::DateTimeOffset => match (left, right) {
            (Value::DateTimeOffset(a), Value::DateTimeOffset(b)) => Ok(a.cmp(b)),
            _ => Err(incomparable()),
        },
        S::TimeSpan => match (left, right) {
            (Value::TimeSpan(a), Value::TimeSpan(b)) => Ok(a.cmp(b)),
            _ => Err(incomparable()),
        },
        S::Bytes => match (left, right) {
            (Value::Bytes(a), Value::Bytes(b)) => Ok(a.cmp(b)),
            _ => Err(incomparable()),
        },

        _ => Err(incomparable()),
    }
}
