//! Modulo evaluation.
//!
//! A UInt64 result computes directly in u64. Every other integer result
//! computes in a 64-bit signed intermediate and narrows back to the
//! resolved type, so an intermediate that does not fit the column type
//! raises `Overflow` even when both inputs would fit it.

use crate::error::{Error, Result};
use crate::types::{StorageType, Value};

pub(crate) fn evaluate(left: &Value, right: &Value, result_type: StorageType) -> Result<Value> {
    use StorageType as S;

    match result_type.native_kind() {
        S::UInt64 => {
            let r = right.to_u64()?;
            if r == 0 {
                return Err(Error::DivideByZero);
            }
            Ok(Value::UInt64(left.to_u64()? % r))
        }

        S::SByte | S::Byte | S::Int16 | S::UInt16 | S::Int32 | S::UInt32 | S::Int64 => {
            let r = right.to_i64()?;
            if r == 0 {
                return Err(Error::DivideByZero);
            }
            let wide = left
                .to_i64()?
                .checked_rem(r)
                .ok_or(Error::Overflow(S::Int64))?;
            Value::narrow_i64_to(result_type, wide)
        }

        S::Single => {
            let r = right.to_f32()?;
            Ok(Value::Single(left.to_f32()? % r))
        }
        S::Double => {
            let r = right.to_f64()?;
            Ok(Value::Double(left.to_f64()? % r))
        }

        S::Decimal => {
            let r = right.to_decimal()?;
            if r.is_zero() {
                return Err(Error::DivideByZero);
            }
            left.to_decimal()?
                .checked_rem(r)
                .map(Value::Decimal)
                .ok_or(Error::Overflow(result_type))
        }

        S::BigInteger => {
            let r = right.to_i128()?;
            if r == 0 {
                return Err(Error::DivideByZero);
            }
            left.to_i128()?
                .checked_rem(r)
                .map(Value::BigInteger)
                .ok_or(Error::Overflow(S::BigInteger))
        }

        _ => Err(Error::TypeMismatch {
            op: "%",
            left: left.storage_type(),
            right: right.storage_type(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_remainder() {
        assert_eq!(
            evaluate(&Value::Int32(7), &Value::Int32(3), StorageType::Int32),
            Ok(Value::Int32(1))
        );
        assert_eq!(
            evaluate(&Value::Int32(-7), &Value::Int32(3), StorageType::Int32),
            Ok(Value::Int32(-1))
        );
    }

    #[test]
    fn test_uint64_direct_path() {
        assert_eq!(
            evaluate(
                &Value::UInt64(u64::MAX),
                &Value::UInt64(10),
                StorageType::UInt64
            ),
            Ok(Value::UInt64(u64::MAX % 10))
        );
    }

    #[test]
    fn test_zero_divisor() {
        assert_eq!(
            evaluate(&Value::Int32(7), &Value::Int32(0), StorageType::Int32),
            Err(Error::DivideByZero)
        );
        assert_eq!(
            evaluate(&Value::UInt64(7), &Value::UInt64(0), StorageType::UInt64),
            Err(Error::DivideByZero)
        );
    }

    #[test]
    fn test_negative_remainder_cannot_narrow_unsigned() {
        // Both operands fit the resolved type, but the signed intermediate
        // remainder is negative and has no UInt16 representation.
        assert_eq!(
            evaluate(&Value::Int16(-5), &Value::UInt16(3), StorageType::UInt16),
            Err(Error::Overflow(StorageType::UInt16))
        );
    }

    #[test]
    fn test_remainder_fits_narrow_type() {
        // The remainder of two in-range Int16 values always fits Int16.
        assert_eq!(
            evaluate(
                &Value::Int16(i16::MIN),
                &Value::Int16(i16::MAX),
                StorageType::Int16
            ),
            Ok(Value::Int16(-1))
        );
    }
}
