//! Arithmetic evaluation, dispatched by the resolved result type.
//!
//! 32- and 64-bit integers run checked operations in their own width.
//! The short integer kinds widen to i64, operate, and narrow back, so a
//! result that fits the wide intermediate but not the column type raises
//! `Overflow` at the narrow step.

use super::helpers::raw_string;
use crate::error::{Error, Result};
use crate::operators::BinaryOp;
use crate::types::{StorageType, TimeSpan, Value};

macro_rules! int_arith {
    ($op:expr, $left:expr, $right:expr, $variant:ident, $ty:ty, $result_type:expr, $mismatch:expr) => {{
        let l = <$ty>::try_from($left.to_i128()?).map_err(|_| Error::Overflow($result_type))?;
        let r = <$ty>::try_from($right.to_i128()?).map_err(|_| Error::Overflow($result_type))?;
        let out = match $op {
            BinaryOp::Add => l.checked_add(r),
            BinaryOp::Subtract => l.checked_sub(r),
            BinaryOp::Multiply => l.checked_mul(r),
            BinaryOp::Divide => {
                if r == 0 {
                    return Err(Error::DivideByZero);
                }
                l.checked_div(r)
            }
            _ => return Err($mismatch),
        };
        out.map(Value::$variant).ok_or(Error::Overflow($result_type))
    }};
}

pub(crate) fn evaluate(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    result_type: StorageType,
) -> Result<Value> {
    use StorageType as S;

    let mismatch = || Error::TypeMismatch {
        op: op.symbol(),
        left: left.storage_type(),
        right: right.storage_type(),
    };

    match result_type.native_kind() {
        S::SByte | S::Byte | S::Int16 | S::UInt16 => {
            let l = left.to_i64()?;
            let r = right.to_i64()?;
            let wide = match op {
                BinaryOp::Add => l.checked_add(r),
                BinaryOp::Subtract => l.checked_sub(r),
                BinaryOp::Multiply => l.checked_mul(r),
                BinaryOp::Divide => {
                    if r == 0 {
                        return Err(Error::DivideByZero);
                    }
                    l.checked_div(r)
                }
                _ => return Err(mismatch()),
            }
            .ok_or(Error::Overflow(result_type))?;
            Value::narrow_i64_to(result_type, wide)
        }

        S::Int32 => int_arith!(op, left, right, Int32, i32, result_type, mismatch()),
        S::UInt32 => int_arith!(op, left, right, UInt32, u32, result_type, mismatch()),
        S::Int64 => int_arith!(op, left, right, Int64, i64, result_type, mismatch()),
        S::UInt64 => int_arith!(op, left, right, UInt64, u64, result_type, mismatch()),

        S::Single => {
            let l = left.to_f32()?;
            let r = right.to_f32()?;
            Ok(Value::Single(match op {
                BinaryOp::Add => l + r,
                BinaryOp::Subtract => l - r,
                BinaryOp::Multiply => l * r,
                BinaryOp::Divide => l / r,
                _ => return Err(mismatch()),
            }))
        }
        S::Double => {
            let l = left.to_f64()?;
            let r = right.to_f64()?;
            Ok(Value::Double(match op {
                BinaryOp::Add => l + r,
                BinaryOp::Subtract => l - r,
                BinaryOp::Multiply => l * r,
                BinaryOp::Divide => l / r,
                _ => return Err(mismatch()),
            }))
        }

        S::Decimal => {
            let l = left.to_decimal()?;
            let r = right.to_decimal()?;
            let out = match op {
                BinaryOp::Add => l.checked_add(r),
                BinaryOp::Subtract => l.checked_sub(r),
                BinaryOp::Multiply => l.checked_mul(r),
                BinaryOp::Divide => {
                    if r.is_zero() {
                        return Err(Error::DivideByZero);
                    }
                    l.checked_div(r)
                }
                _ => return Err(mismatch()),
            };
            out.map(Value::Decimal).ok_or(Error::Overflow(result_type))
        }

        S::BigInteger => {
            let l = left.to_i128()?;
            let r = right.to_i128()?;
            let out = match op {
                BinaryOp::Add => l.checked_add(r),
                BinaryOp::Subtract => l.checked_sub(r),
                BinaryOp::Multiply => l.checked_mul(r),
                BinaryOp::Divide => {
                    if r == 0 {
                        return Err(Error::DivideByZero);
                    }
                    l.checked_div(r)
                }
                _ => return Err(mismatch()),
            };
            out.map(Value::BigInteger)
                .ok_or(Error::Overflow(result_type))
        }

        S::String | S::Char | S::Chars => match op {
            BinaryOp::Add => {
                let mut s = raw_string(left);
                s.push_str(&raw_string(right));
                Ok(Value::String(s))
            }
            _ => Err(mismatch()),
        },

        S::DateTime => match (op, left, right) {
            (BinaryOp::Add, Value::DateTime(dt), Value::TimeSpan(ts))
            | (BinaryOp::Add, Value::TimeSpan(ts), Value::DateTime(dt)) => {
                Ok(Value::DateTime(*dt + ts.to_duration()))
            }
            (BinaryOp::Subtract, Value::DateTime(dt), Value::TimeSpan(ts)) => {
                Ok(Value::DateTime(*dt - ts.to_duration()))
            }
            (BinaryOp::Subtract, Value::DateTime(a), Value::DateTime(b)) => {
                Ok(Value::TimeSpan(TimeSpan::from_duration(*a - *b)))
            }
            _ => Err(mismatch()),
        },

        S::TimeSpan => match (op, left, right) {
            (BinaryOp::Add, Value::TimeSpan(a), Value::TimeSpan(b)) => a
                .microseconds
                .checked_add(b.microseconds)
                .map(|microseconds| Value::TimeSpan(TimeSpan { microseconds }))
                .ok_or(Error::Overflow(result_type)),
            (BinaryOp::Subtract, Value::TimeSpan(a), Value::TimeSpan(b)) => a
                .microseconds
                .checked_sub(b.microseconds)
                .map(|microseconds| Value::TimeSpan(TimeSpan { microseconds }))
                .ok_or(Error::Overflow(result_type)),
            _ => Err(mismatch()),
        },

        _ => Err(mismatch()),
    }
}

pub(crate) fn negate(value: &Value) -> Result<Value> {
    use StorageType as S;
    match value {
        Value::Null => Ok(Value::Null),
        Value::SByte(v) => v
            .checked_neg()
            .map(Value::SByte)
            .ok_or(Error::Overflow(S::SByte)),
        Value::Int16(v) => v
            .checked_neg()
            .map(Value::Int16)
            .ok_or(Error::Overflow(S::Int16)),
        Value::Int32(v) => v
            .checked_neg()
            .map(Value::Int32)
            .ok_or(Error::Overflow(S::Int32)),
        Value::Int64(v) => v
            .checked_neg()
            .map(Value::Int64)
            .ok_or(Error::Overflow(S::Int64)),
        // Negating an unsigned value lands in the next-wider signed kind.
        Value::Byte(v) => Ok(Value::Int16(-(*v as i16))),
        Value::UInt16(v) => Ok(Value::Int32(-(*v as i32))),
        Value::UInt32(v) => Ok(Value::Int64(-(*v as i64))),
        Value::UInt64(v) => i64::try_from(*v)
            .map(|v| Value::Int64(-v))
            .map_err(|_| Error::Overflow(S::Int64)),
        Value::Single(v) => Ok(Value::Single(-v)),
        Value::Double(v) => Ok(Value::Double(-v)),
        Value::Decimal(d) => Ok(Value::Decimal(-*d)),
        Value::BigInteger(v) => v
            .checked_neg()
            .map(Value::BigInteger)
            .ok_or(Error::Overflow(S::BigInteger)),
        Value::TimeSpan(ts) => ts
            .microseconds
            .checked_neg()
            .map(|microseconds| Value::TimeSpan(TimeSpan { microseconds }))
            .ok_or(Error::Overflow(S::TimeSpan)),
        other => Err(Error::EvalError(format!("cannot negate {:?}", other))),
    }
}
