//! Aggregate functions over a set of column values.
//!
//! Nulls never contribute: they are filtered before the fold. An empty
//! input yields Null for everything except Count, which yields zero.

use crate::error::{Error, Result};
use crate::types::{StorageType, Value};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateFunc {
    Sum,
    Avg,
    Min,
    Max,
    Count,
}

impl fmt::Display for AggregateFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub(crate) fn compute(func: AggregateFunc, values: &[Value]) -> Result<Value> {
    let present: Vec<&Value> = values.iter().filter(|v| !v.is_null()).collect();

    if func == AggregateFunc::Count {
        return Ok(Value::Int64(present.len() as i64));
    }
    if present.is_empty() {
        return Ok(Value::Null);
    }

    match func {
        AggregateFunc::Min => Ok((*present
            .iter()
            .min_by(|a, b| a.cmp(b))
            .ok_or_else(|| Error::Internal("min over empty set".to_string()))?)
        .clone()),
        AggregateFunc::Max => Ok((*present
            .iter()
            .max_by(|a, b| a.cmp(b))
            .ok_or_else(|| Error::Internal("max over empty set".to_string()))?)
        .clone()),
        AggregateFunc::Sum => sum(&present),
        AggregateFunc::Avg => {
            let total = sum(&present)?;
            divide_for_avg(total, present.len())
        }
        AggregateFunc::Count => Ok(Value::Int64(present.len() as i64)),
    }
}

/// Sum in the widest representation of the participating kind: floats in
/// f64, Decimal in Decimal, integers in i128 narrowed back to Int64.
fn sum(present: &[&Value]) -> Result<Value> {
    if present.iter().any(|v| v.storage_type().is_floating()) {
        let mut total = 0f64;
        for value in present {
            total += value.to_f64()?;
        }
        return Ok(Value::Double(total));
    }
    if present
        .iter()
        .any(|v| matches!(v, Value::Decimal(_)))
    {
        let mut total = Decimal::ZERO;
        for value in present {
            total = total
                .checked_add(value.to_decimal()?)
                .ok_or(Error::Overflow(StorageType::Decimal))?;
        }
        return Ok(Value::Decimal(total));
    }

    let mut total = 0i128;
    for value in present {
        total = total
            .checked_add(value.to_i128()?)
            .ok_or(Error::Overflow(StorageType::Int64))?;
    }
    if present.iter().any(|v| matches!(v, Value::BigInteger(_))) {
        return Ok(Value::BigInteger(total));
    }
    i64::try_from(total)
        .map(Value::Int64)
        .map_err(|_| Error::Overflow(StorageType::Int64))
}

fn divide_for_avg(total: Value, count: usize) -> Result<Value> {
    match total {
        Value::Double(total) => Ok(Value::Double(total / count as f64)),
        Value::Decimal(total) => total
            .checked_div(Decimal::from(count as u64))
            .map(Value::Decimal)
            .ok_or(Error::Overflow(StorageType::Decimal)),
        // Integer averages keep fractional precision.
        other => {
            let total = other.to_decimal()?;
            total
                .checked_div(Decimal::from(count as u64))
                .map(Value::Decimal)
                .ok_or(Error::Overflow(StorageType::Decimal))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nulls_are_skipped() {
        let values = vec![Value::Int32(1), Value::Null, Value::Int32(3)];
        assert_eq!(compute(AggregateFunc::Sum, &values), Ok(Value::Int64(4)));
        assert_eq!(compute(AggregateFunc::Count, &values), Ok(Value::Int64(2)));
        assert_eq!(compute(AggregateFunc::Min, &values), Ok(Value::Int32(1)));
        assert_eq!(compute(AggregateFunc::Max, &values), Ok(Value::Int32(3)));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(compute(AggregateFunc::Sum, &[]), Ok(Value::Null));
        assert_eq!(compute(AggregateFunc::Avg, &[]), Ok(Value::Null));
        assert_eq!(compute(AggregateFunc::Min, &[]), Ok(Value::Null));
        assert_eq!(compute(AggregateFunc::Count, &[]), Ok(Value::Int64(0)));
        assert_eq!(
            compute(AggregateFunc::Count, &[Value::Null, Value::Null]),
            Ok(Value::Int64(0))
        );
    }

    #[test]
    fn test_avg_keeps_precision() {
        let values = vec![Value::Int32(1), Value::Int32(2)];
        assert_eq!(
            compute(AggregateFunc::Avg, &values),
            Ok(Value::Decimal(Decimal::new(15, 1)))
        );
    }

    #[test]
    fn test_float_sum() {
        let values = vec![Value::Double(1.5), Value::Double(2.25)];
        assert_eq!(compute(AggregateFunc::Sum, &values), Ok(Value::Double(3.75)));
        assert_eq!(compute(AggregateFunc::Avg, &values), Ok(Value::Double(1.875)));
    }
}
