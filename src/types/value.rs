//! Runtime values
//!
//! One variant per physical representation plus a single explicit `Null`.
//! Null stands in for both the DB-null and the SQL-null of a nullable static
//! type; code asks `is_null()` instead of comparing against sentinels.

use crate::error::{Error, Result};
use crate::types::StorageType;
use chrono::{DateTime as ChronoDateTime, FixedOffset, NaiveDateTime};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A signed duration with microsecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeSpan {
    pub microseconds: i64,
}

impl TimeSpan {
    pub fn from_seconds(seconds: i64) -> Self {
        TimeSpan {
            microseconds: seconds * 1_000_000,
        }
    }

    pub fn to_duration(self) -> chrono::Duration {
        chrono::Duration::microseconds(self.microseconds)
    }

    pub fn from_duration(d: chrono::Duration) -> Self {
        TimeSpan {
            microseconds: d.num_microseconds().unwrap_or(i64::MAX),
        }
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.microseconds)
    }
}

/// A runtime value in a record slot or an expression tree.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Char(char),
    SByte(i8),
    Byte(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Single(f32),
    Double(f64),
    Decimal(Decimal),
    String(String),
    Guid(uuid::Uuid),
    DateTime(NaiveDateTime),
    DateTimeOffset(ChronoDateTime<FixedOffset>),
    TimeSpan(TimeSpan),
    Bytes(Vec<u8>),
    Chars(Vec<char>),
    BigInteger(i128),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The native storage kind of this value. `Null` reports `Object`,
    /// which deliberately has no precedence rank; callers propagate nulls
    /// before asking for a coercion result.
    pub fn storage_type(&self) -> StorageType {
        use StorageType as S;
        match self {
            Value::Null => S::Object,
            Value::Boolean(_) => S::Boolean,
            Value::Char(_) => S::Char,
            Value::SByte(_) => S::SByte,
            Value::Byte(_) => S::Byte,
            Value::Int16(_) => S::Int16,
            Value::UInt16(_) => S::UInt16,
            Value::Int32(_) => S::Int32,
            Value::UInt32(_) => S::UInt32,
            Value::Int64(_) => S::Int64,
            Value::UInt64(_) => S::UInt64,
            Value::Single(_) => S::Single,
            Value::Double(_) => S::Double,
            Value::Decimal(_) => S::Decimal,
            Value::String(_) => S::String,
            Value::Guid(_) => S::Guid,
            Value::DateTime(_) => S::DateTime,
            Value::DateTimeOffset(_) => S::DateTimeOffset,
            Value::TimeSpan(_) => S::TimeSpan,
            Value::Bytes(_) => S::Bytes,
            Value::Chars(_) => S::Chars,
            Value::BigInteger(_) => S::BigInteger,
        }
    }

    pub fn is_integer(&self) -> bool {
        self.storage_type().is_integer() || matches!(self, Value::BigInteger(_))
    }

    pub fn is_numeric(&self) -> bool {
        self.storage_type().is_numeric()
    }

    /// Widen any fixed-width integer to i128.
    pub fn to_i128(&self) -> Result<i128> {
        match self {
            Value::SByte(v) => Ok(*v as i128),
            Value::Byte(v) => Ok(*v as i128),
            Value::Int16(v) => Ok(*v as i128),
            Value::UInt16(v) => Ok(*v as i128),
            Value::Int32(v) => Ok(*v as i128),
            Value::UInt32(v) => Ok(*v as i128),
            Value::Int64(v) => Ok(*v as i128),
            Value::UInt64(v) => Ok(*v as i128),
            Value::BigInteger(v) => Ok(*v),
            other => Err(Error::EvalError(format!(
                "expected an integer, found {:?}",
                other
            ))),
        }
    }

    /// Widen to i64, failing with `Overflow` when the value does not fit.
    pub fn to_i64(&self) -> Result<i64> {
        let wide = self.to_i128()?;
        i64::try_from(wide).map_err(|_| Error::Overflow(StorageType::Int64))
    }

    /// Widen to u64, failing with `Overflow` for negatives or oversize.
    pub fn to_u64(&self) -> Result<u64> {
        let wide = self.to_i128()?;
        u64::try_from(wide).map_err(|_| Error::Overflow(StorageType::UInt64))
    }

    pub fn to_f32(&self) -> Result<f32> {
        match self {
            Value::Single(v) => Ok(*v),
            Value::Double(v) => Ok(*v as f32),
            Value::Decimal(d) => d
                .to_f32()
                .ok_or_else(|| Error::EvalError("decimal does not fit f32".into())),
            other => Ok(other.to_i128()? as f32),
        }
    }

    pub fn to_f64(&self) -> Result<f64> {
        match self {
            Value::Single(v) => Ok(*v as f64),
            Value::Double(v) => Ok(*v),
            Value::Decimal(d) => d
                .to_f64()
                .ok_or_else(|| Error::EvalError("decimal does not fit f64".into())),
            other => Ok(other.to_i128()? as f64),
        }
    }

    pub fn to_decimal(&self) -> Result<Decimal> {
        match self {
            Value::Decimal(d) => Ok(*d),
            Value::Single(v) => Decimal::from_f32(*v)
                .ok_or_else(|| Error::Overflow(StorageType::Decimal)),
            Value::Double(v) => Decimal::from_f64(*v)
                .ok_or_else(|| Error::Overflow(StorageType::Decimal)),
            other => {
                let wide = other.to_i128()?;
                Decimal::try_from(wide).map_err(|_| Error::Overflow(StorageType::Decimal))
            }
        }
    }

    /// Narrow an i64 intermediate into the given integer storage kind.
    /// A value that does not fit raises `Overflow` for that kind; the
    /// modulo evaluator relies on this (see the operator docs).
    pub fn narrow_i64_to(target: StorageType, wide: i64) -> Result<Value> {
        use StorageType as S;
        let overflow = || Error::Overflow(target);
        Ok(match target.native_kind() {
            S::SByte => Value::SByte(i8::try_from(wide).map_err(|_| overflow())?),
            S::Byte => Value::Byte(u8::try_from(wide).map_err(|_| overflow())?),
            S::Int16 => Value::Int16(i16::try_from(wide).map_err(|_| overflow())?),
            S::UInt16 => Value::UInt16(u16::try_from(wide).map_err(|_| overflow())?),
            S::Int32 => Value::Int32(i32::try_from(wide).map_err(|_| overflow())?),
            S::UInt32 => Value::UInt32(u32::try_from(wide).map_err(|_| overflow())?),
            S::Int64 => Value::Int64(wide),
            S::UInt64 => Value::UInt64(u64::try_from(wide).map_err(|_| overflow())?),
            other => {
                return Err(Error::Internal(format!(
                    "narrow target {} is not an integer kind",
                    other
                )));
            }
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "'{}'", c),
            Value::SByte(v) => write!(f, "{}", v),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::UInt16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::UInt32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::UInt64(v) => write!(f, "{}", v),
            Value::Single(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::String(s) => write!(f, "'{}'", s),
            Value::Guid(g) => write!(f, "'{}'", g),
            Value::DateTime(dt) => write!(f, "{}", dt),
            Value::DateTimeOffset(dt) => write!(f, "{}", dt),
            Value::TimeSpan(ts) => write!(f, "{}", ts),
            Value::Bytes(b) => write!(f, "x'{}'", hex::encode(b)),
            Value::Chars(cs) => write!(f, "'{}'", cs.iter().collect::<std::string::String>()),
            Value::BigInteger(v) => write!(f, "{}", v),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Boolean(b) => write!(f, "Boolean({})", b),
            Value::Char(c) => write!(f, "Char({})", c),
            Value::SByte(v) => write!(f, "SByte({})", v),
            Value::Byte(v) => write!(f, "Byte({})", v),
            Value::Int16(v) => write!(f, "Int16({})", v),
            Value::UInt16(v) => write!(f, "UInt16({})", v),
            Value::Int32(v) => write!(f, "Int32({})", v),
            Value::UInt32(v) => write!(f, "UInt32({})", v),
            Value::Int64(v) => write!(f, "Int64({})", v),
            Value::UInt64(v) => write!(f, "UInt64({})", v),
            Value::Single(v) => write!(f, "Single({})", v),
            Value::Double(v) => write!(f, "Double({})", v),
            Value::Decimal(d) => write!(f, "Decimal({})", d),
            Value::String(s) => write!(f, "String({})", s),
            Value::Guid(g) => write!(f, "Guid({})", g),
            Value::DateTime(dt) => write!(f, "DateTime({})", dt),
            Value::DateTimeOffset(dt) => write!(f, "DateTimeOffset({})", dt),
            Value::TimeSpan(ts) => write!(f, "TimeSpan({})", ts),
            Value::Bytes(b) => write!(f, "Bytes({})", hex::encode(b)),
            Value::Chars(cs) => {
                write!(f, "Chars({})", cs.iter().collect::<std::string::String>())
            }
            Value::BigInteger(v) => write!(f, "BigInteger({})", v),
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => 0u8.hash(state),
            Value::Boolean(b) => b.hash(state),
            Value::Char(c) => c.hash(state),
            Value::SByte(v) => v.hash(state),
            Value::Byte(v) => v.hash(state),
            Value::Int16(v) => v.hash(state),
            Value::UInt16(v) => v.hash(state),
            Value::Int32(v) => v.hash(state),
            Value::UInt32(v) => v.hash(state),
            Value::Int64(v) => v.hash(state),
            Value::UInt64(v) => v.hash(state),
            Value::Single(v) => v.to_bits().hash(state),
            Value::Double(v) => v.to_bits().hash(state),
            Value::Decimal(d) => d.hash(state),
            Value::String(s) => s.hash(state),
            Value::Guid(g) => g.hash(state),
            Value::DateTime(dt) => dt.hash(state),
            Value::DateTimeOffset(dt) => dt.hash(state),
            Value::TimeSpan(ts) => ts.hash(state),
            Value::Bytes(b) => b.hash(state),
            Value::Chars(cs) => cs.hash(state),
            Value::BigInteger(v) => v.hash(state),
        }
    }
}

impl Eq for Value {}

impl Ord for Value {
    /// Total order for index use: nulls sort first, numerics compare across
    /// kinds, everything else compares within its own kind.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;

        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,

            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Char(a), Value::Char(b)) => a.cmp(b),

            (a, b) if a.is_integer() && b.is_integer() => {
                match (a.to_i128(), b.to_i128()) {
                    (Ok(a), Ok(b)) => a.cmp(&b),
                    _ => Ordering::Equal,
                }
            }
            (a, b) if a.is_numeric() && b.is_numeric() => {
                match (a.to_decimal(), b.to_decimal()) {
                    (Ok(a), Ok(b)) => a.cmp(&b),
                    _ => Ordering::Equal,
                }
            }

            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Guid(a), Value::Guid(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (Value::DateTimeOffset(a), Value::DateTimeOffset(b)) => a.cmp(b),
            (Value::TimeSpan(a), Value::TimeSpan(b)) => a.cmp(b),
            (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
            (Value::Chars(a), Value::Chars(b)) => a.cmp(b),

            // Different kinds with no numeric bridge; equal keeps the order total.
            _ => Ordering::Equal,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
