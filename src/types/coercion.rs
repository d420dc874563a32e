//! Binary coercion resolver
//!
//! Given an operator and the static types of its two operands, picks the
//! common storage type the evaluator should run in. `Ok(None)` means no
//! valid common type exists and the caller raises `TypeMismatch`.
//!
//! Rule order matters and is fixed: Guid screening, table membership,
//! logical gate, DateTimeOffset gate, string concatenation, precedence
//! candidate, numeric gate, integer-division promotion, mixed-sign
//! widening, SQL adjustments.

use crate::error::{Error, Result};
use crate::operators::BinaryOp;
use crate::types::StorageType;

pub fn binary_result_type(
    op: BinaryOp,
    left: StorageType,
    right: StorageType,
    left_const: bool,
    right_const: bool,
) -> Result<Option<StorageType>> {
    use StorageType as S;

    // Guid carries no precedence rank, so its relational pairings are
    // screened before the table-membership check would reject them.
    if op.is_relational() {
        match (left, right) {
            (S::Guid, S::Guid) => return Ok(Some(S::Guid)),
            (S::Guid, S::String) | (S::String, S::Guid) => return Ok(Some(S::String)),
            _ => {}
        }
    }

    let (left_rank, right_rank) = match (left.precedence(), right.precedence()) {
        (Some(l), Some(r)) => (l, r),
        _ => return Ok(None),
    };

    let sql_path = left.is_sql_type() || right.is_sql_type();

    if op.is_logical() {
        let boolish = |t: S| matches!(t, S::Boolean | S::SqlBoolean);
        if !boolish(left) || !boolish(right) {
            return Ok(None);
        }
        return Ok(Some(if sql_path { S::SqlBoolean } else { S::Boolean }));
    }

    // DateTimeOffset only ever compares against itself.
    if left == S::DateTimeOffset || right == S::DateTimeOffset {
        if left == right && op.is_relational() {
            return Ok(Some(S::DateTimeOffset));
        }
        return Ok(None);
    }

    // Concatenation wins over numeric precedence.
    if op == BinaryOp::Add
        && (matches!(left, S::String | S::SqlString) || matches!(right, S::String | S::SqlString))
    {
        return Ok(Some(if sql_path { S::SqlString } else { S::String }));
    }

    let mut candidate = if left_rank >= right_rank { left } else { right };

    if op.is_arithmetic()
        && !matches!(candidate, S::String | S::SqlString | S::Char | S::SqlChars)
    {
        let numeric = if sql_path {
            left.is_numeric_sql() && right.is_numeric_sql()
        } else {
            left.is_numeric() && right.is_numeric()
        };
        if !numeric {
            // A TimeSpan may shift a SqlDateTime on the SQL path.
            if sql_path
                && matches!(op, BinaryOp::Add | BinaryOp::Subtract)
                && ((left == S::TimeSpan && right == S::SqlDateTime)
                    || (left == S::SqlDateTime && right == S::TimeSpan))
            {
                return Ok(Some(S::SqlDateTime));
            }
            return Ok(None);
        }
    }

    // Integer division is disallowed by design; promote to floating.
    if op == BinaryOp::Divide && candidate.is_integer_sql() {
        candidate = S::Double;
    }

    if StorageType::is_mixed_sign_pair(left, right) && candidate.is_integer_sql() {
        if left_const != right_const {
            // A lone literal adopts the other operand's type.
            candidate = if left_const { right } else { left };
        } else if candidate.is_unsigned_sql() {
            if candidate == S::UInt64 {
                return Err(Error::AmbiguousBinaryOperation {
                    op: op.symbol(),
                    left,
                    right,
                });
            }
            // One step above a native unsigned rank is a signed type. A
            // SqlByte candidate steps to Byte and the SQL adjustment below
            // folds it back to SqlByte.
            candidate = candidate
                .precedence()
                .and_then(|p| StorageType::from_precedence(p.widened()))
                .ok_or_else(|| {
                    Error::Internal(format!("no rank above {} to widen into", candidate))
                })?;
        }
    }

    if sql_path {
        match candidate {
            // SqlMoney survives only when an operand really was SqlMoney.
            S::SqlMoney if left != S::SqlMoney && right != S::SqlMoney => {
                candidate = S::SqlDecimal;
            }
            S::SqlBinary | S::SqlBytes | S::SqlGuid => {
                if left != right {
                    return Ok(None);
                }
            }
            _ => {}
        }
        candidate = candidate.sql_variant();
    }

    Ok(Some(candidate))
}
