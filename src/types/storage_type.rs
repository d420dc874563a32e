//! Storage type catalog
//!
//! Closed enumeration of the physical representations the engine coerces and
//! operates over, together with the total precedence order used to pick the
//! common type for a binary operation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical value representations. The `Sql*` members are the SQL-nullable
/// counterparts of the native kinds; nullability at runtime is carried by
/// `Value::Null`, while `Sql*` marks the static type as null-admitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageType {
    // Native kinds
    Boolean,
    Char,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Decimal,
    DateTime,
    DateTimeOffset,
    TimeSpan,
    String,
    Guid,
    Bytes,
    Chars,
    BigInteger,
    Uri,
    TypeRef,
    Object,
    // SQL-nullable kinds
    SqlBoolean,
    SqlByte,
    SqlInt16,
    SqlInt32,
    SqlInt64,
    SqlSingle,
    SqlDouble,
    SqlDecimal,
    SqlMoney,
    SqlDateTime,
    SqlString,
    SqlGuid,
    SqlBinary,
    SqlBytes,
    SqlChars,
    SqlXml,
}

/// Dense rank in the coercion precedence table. Higher wins when picking the
/// common type for two operands. Rank 11 is a reserved error slot with no
/// type behind it; the positions on either side matter for widening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Precedence(u8);

impl Precedence {
    /// The rank one step above this one. Each native unsigned integer rank
    /// sits just below a signed type; `SqlByte` is the one unsigned rank
    /// followed by another unsigned (`Byte`).
    pub fn widened(self) -> Precedence {
        Precedence(self.0 + 1)
    }
}

impl StorageType {
    /// Rank in the precedence table, or `None` for types that do not
    /// participate in binary coercion at all.
    pub fn precedence(self) -> Option<Precedence> {
        use StorageType::*;
        let rank = match self {
            SqlBinary => 1,
            SqlBytes => 2,
            Char => 3,
            SqlChars => 4,
            SqlXml => 5,
            String => 6,
            SqlString => 7,
            SqlGuid => 8,
            Boolean => 9,
            SqlBoolean => 10,
            // 11 is the error slot
            SByte => 12,
            SqlByte => 13,
            Byte => 14,
            Int16 => 15,
            SqlInt16 => 16,
            UInt16 => 17,
            Int32 => 18,
            SqlInt32 => 19,
            UInt32 => 20,
            Int64 => 21,
            SqlInt64 => 22,
            UInt64 => 23,
            SqlMoney => 24,
            Decimal => 25,
            SqlDecimal => 26,
            Single => 27,
            SqlSingle => 28,
            Double => 29,
            SqlDouble => 30,
            TimeSpan => 31,
            DateTime => 32,
            DateTimeOffset => 33,
            SqlDateTime => 34,
            Guid | Bytes | Chars | BigInteger | Uri | TypeRef | Object => return None,
        };
        Some(Precedence(rank))
    }

    /// Inverse of [`precedence`](Self::precedence). `None` for the error
    /// slot and out-of-table ranks.
    pub fn from_precedence(rank: Precedence) -> Option<StorageType> {
        use StorageType::*;
        Some(match rank.0 {
            1 => SqlBinary,
            2 => SqlBytes,
            3 => Char,
            4 => SqlChars,
            5 => SqlXml,
            6 => String,
            7 => SqlString,
            8 => SqlGuid,
            9 => Boolean,
            10 => SqlBoolean,
            12 => SByte,
            13 => SqlByte,
            14 => Byte,
            15 => Int16,
            16 => SqlInt16,
            17 => UInt16,
            18 => Int32,
            19 => SqlInt32,
            20 => UInt32,
            21 => Int64,
            22 => SqlInt64,
            23 => UInt64,
            24 => SqlMoney,
            25 => Decimal,
            26 => SqlDecimal,
            27 => Single,
            28 => SqlSingle,
            29 => Double,
            30 => SqlDouble,
            31 => TimeSpan,
            32 => DateTime,
            33 => DateTimeOffset,
            34 => SqlDateTime,
            _ => return None,
        })
    }

    /// Native (non-SQL) numeric kinds.
    pub fn is_numeric(self) -> bool {
        use StorageType::*;
        matches!(
            self,
            SByte
                | Byte
                | Int16
                | UInt16
                | Int32
                | UInt32
                | Int64
                | UInt64
                | Single
                | Double
                | Decimal
                | BigInteger
        )
    }

    /// Numeric including the SQL-nullable numeric kinds.
    pub fn is_numeric_sql(self) -> bool {
        use StorageType::*;
        self.is_numeric()
            || matches!(
                self,
                SqlByte
                    | SqlInt16
                    | SqlInt32
                    | SqlInt64
                    | SqlSingle
                    | SqlDouble
                    | SqlDecimal
                    | SqlMoney
            )
    }

    /// Native fixed-width integer kinds.
    pub fn is_integer(self) -> bool {
        use StorageType::*;
        matches!(
            self,
            SByte | Byte | Int16 | UInt16 | Int32 | UInt32 | Int64 | UInt64
        )
    }

    /// Integer including the SQL-nullable integer kinds.
    pub fn is_integer_sql(self) -> bool {
        use StorageType::*;
        self.is_integer() || matches!(self, SqlByte | SqlInt16 | SqlInt32 | SqlInt64)
    }

    pub fn is_signed(self) -> bool {
        use StorageType::*;
        matches!(self, SByte | Int16 | Int32 | Int64)
    }

    pub fn is_signed_sql(self) -> bool {
        use StorageType::*;
        self.is_signed() || matches!(self, SqlInt16 | SqlInt32 | SqlInt64)
    }

    pub fn is_unsigned(self) -> bool {
        use StorageType::*;
        matches!(self, Byte | UInt16 | UInt32 | UInt64)
    }

    pub fn is_unsigned_sql(self) -> bool {
        self.is_unsigned() || self == StorageType::SqlByte
    }

    pub fn is_floating(self) -> bool {
        use StorageType::*;
        matches!(self, Single | Double | SqlSingle | SqlDouble)
    }

    pub fn is_sql_type(self) -> bool {
        use StorageType::*;
        matches!(
            self,
            SqlBoolean
                | SqlByte
                | SqlInt16
                | SqlInt32
                | SqlInt64
                | SqlSingle
                | SqlDouble
                | SqlDecimal
                | SqlMoney
                | SqlDateTime
                | SqlString
                | SqlGuid
                | SqlBinary
                | SqlBytes
                | SqlChars
                | SqlXml
        )
    }

    /// One operand signed, the other unsigned, both integers.
    pub fn is_mixed_sign_pair(left: StorageType, right: StorageType) -> bool {
        (left.is_signed_sql() && right.is_unsigned_sql())
            || (left.is_unsigned_sql() && right.is_signed_sql())
    }

    /// The SQL-nullable counterpart, for results on the SQL coercion path.
    /// Kinds without a counterpart map to themselves.
    pub fn sql_variant(self) -> StorageType {
        use StorageType::*;
        match self {
            Boolean => SqlBoolean,
            Byte => SqlByte,
            Int16 => SqlInt16,
            Int32 => SqlInt32,
            Int64 => SqlInt64,
            Single => SqlSingle,
            Double => SqlDouble,
            Decimal => SqlDecimal,
            DateTime => SqlDateTime,
            String => SqlString,
            Guid => SqlGuid,
            Bytes => SqlBytes,
            Chars => SqlChars,
            other => other,
        }
    }

    /// The native kind behind a SQL-nullable type; used for evaluator
    /// dispatch, where runtime values are always native representations.
    pub fn native_kind(self) -> StorageType {
        use StorageType::*;
        match self {
            SqlBoolean => Boolean,
            SqlByte => Byte,
            SqlInt16 => Int16,
            SqlInt32 => Int32,
            SqlInt64 => Int64,
            SqlSingle => Single,
            SqlDouble => Double,
            SqlDecimal | SqlMoney => Decimal,
            SqlDateTime => DateTime,
            SqlString | SqlXml => String,
            SqlGuid => Guid,
            SqlBinary | SqlBytes => Bytes,
            SqlChars => Chars,
            other => other,
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_total_order() {
        use StorageType::*;
        // Exact descending order; ties matter.
        let descending = [
            SqlDateTime,
            DateTimeOffset,
            DateTime,
            TimeSpan,
            SqlDouble,
            Double,
            SqlSingle,
            Single,
            SqlDecimal,
            Decimal,
            SqlMoney,
            UInt64,
            SqlInt64,
            Int64,
            UInt32,
            SqlInt32,
            Int32,
            UInt16,
            SqlInt16,
            Int16,
            Byte,
            SqlByte,
            SByte,
            SqlBoolean,
            Boolean,
            SqlGuid,
            SqlString,
            String,
            SqlXml,
            SqlChars,
            Char,
            SqlBytes,
            SqlBinary,
        ];
        for pair in descending.windows(2) {
            assert!(
                pair[0].precedence().unwrap() > pair[1].precedence().unwrap(),
                "{} should outrank {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_precedence_round_trip() {
        use StorageType::*;
        for st in [SqlBinary, Int32, UInt64, SqlDateTime, Boolean, SqlMoney] {
            let rank = st.precedence().unwrap();
            assert_eq!(StorageType::from_precedence(rank), Some(st));
        }
    }

    #[test]
    fn test_out_of_table_types() {
        use StorageType::*;
        for st in [Guid, BigInteger, Uri, TypeRef, Object, Bytes, Chars] {
            assert_eq!(st.precedence(), None);
        }
    }

    #[test]
    fn test_widening_lands_on_signed() {
        use StorageType::*;
        // The entry above each native unsigned integer rank is a signed
        // type; SqlByte is the lone unsigned rank whose neighbor is not.
        for (unsigned, expect) in [(Byte, Int16), (UInt16, Int32), (UInt32, Int64)] {
            let widened = StorageType::from_precedence(unsigned.precedence().unwrap().widened());
            assert_eq!(widened, Some(expect));
        }
        assert_eq!(
            StorageType::from_precedence(SqlByte.precedence().unwrap().widened()),
            Some(Byte)
        );
    }

    #[test]
    fn test_classification() {
        use StorageType::*;
        assert!(UInt64.is_unsigned() && UInt64.is_integer() && UInt64.is_numeric());
        assert!(SqlInt32.is_integer_sql() && !SqlInt32.is_integer());
        assert!(SqlMoney.is_numeric_sql() && !SqlMoney.is_numeric());
        assert!(SqlByte.is_unsigned_sql() && !SqlByte.is_signed_sql());
        assert!(StorageType::is_mixed_sign_pair(Int32, UInt32));
        assert!(!StorageType::is_mixed_sign_pair(Int32, Int64));
    }
}
