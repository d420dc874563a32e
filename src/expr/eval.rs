//! Expression evaluation.
//!
//! Binary operands resolve their common type from the runtime kinds of
//! the evaluated values, so a folded literal participates with its
//! folded kind. `And`/`Or` short-circuit on a dominant left operand
//! before the right side is evaluated at all.

use super::{aggregate, ColumnRef, Expr, RelationRef};
use crate::error::{Error, Result};
use crate::operators::{self, BinaryOp, StringCompareOptions};
use crate::rows::RowVersion;
use crate::table::{RowId, TableId, TableSet};
use crate::types::{coercion, StorageType, Value};

/// Where an expression is being evaluated: which row of which table, and
/// which version of that row to read.
#[derive(Clone, Copy)]
pub struct EvalContext<'a> {
    pub set: &'a TableSet,
    pub table: TableId,
    pub row: RowId,
    pub version: RowVersion,
}

impl Expr {
    pub fn eval(&self, ctx: &EvalContext<'_>) -> Result<Value> {
        self.eval_with(Some(ctx))
    }

    /// Evaluate a closed expression with no row behind it; used by
    /// constant folding.
    pub(crate) fn eval_const(&self) -> Result<Value> {
        self.eval_with(None)
    }

    fn eval_with(&self, ctx: Option<&EvalContext<'_>>) -> Result<Value> {
        match self {
            Expr::Const(value) => Ok(value.clone()),

            Expr::Column(ColumnRef::Bound { table, column, name }) => {
                let ctx = ctx.ok_or_else(|| {
                    Error::EvalError(format!("column [{}] needs a row context", name))
                })?;
                ctx.set.table(*table)?.value(ctx.row, *column, ctx.version)
            }
            Expr::Column(ColumnRef::Named(name)) => Err(Error::EvalError(format!(
                "unbound column reference [{}]",
                name
            ))),

            Expr::Unary(op, operand) => {
                let value = operand.eval_with(ctx)?;
                operators::evaluate_unary(*op, &value)
            }

            Expr::Binary(op, left, right) if op.is_logical() => {
                let left_value = left.eval_with(ctx)?;
                match op {
                    BinaryOp::And if left_value == Value::Boolean(false) => {
                        return Ok(Value::Boolean(false));
                    }
                    BinaryOp::Or if left_value == Value::Boolean(true) => {
                        return Ok(Value::Boolean(true));
                    }
                    _ => {}
                }
                let right_value = right.eval_with(ctx)?;
                operators::evaluate_binary(
                    *op,
                    &left_value,
                    &right_value,
                    StorageType::Boolean,
                    &compare_options(ctx),
                )
            }

            Expr::Binary(op, left, right) => {
                let left_value = left.eval_with(ctx)?;
                let right_value = right.eval_with(ctx)?;
                if left_value.is_null() || right_value.is_null() {
                    // Is / Is Not still answer over a null operand.
                    if matches!(op, BinaryOp::Is | BinaryOp::IsNot) {
                        return operators::evaluate_binary(
                            *op,
                            &left_value,
                            &right_value,
                            StorageType::Object,
                            &compare_options(ctx),
                        );
                    }
                    return Ok(Value::Null);
                }
                let result_type = resolve(*op, &left_value, left, &right_value, right)?;
                operators::evaluate_binary(
                    *op,
                    &left_value,
                    &right_value,
                    result_type,
                    &compare_options(ctx),
                )
            }

            Expr::In(left, candidates) => {
                let left_value = left.eval_with(ctx)?;
                if left_value.is_null() {
                    return Ok(Value::Null);
                }
                for candidate in candidates {
                    let value = candidate.eval_with(ctx)?;
                    if value.is_null() {
                        continue;
                    }
                    // Each candidate resolves its own comparison type.
                    let result_type =
                        resolve(BinaryOp::Equal, &left_value, left, &value, candidate)?;
                    let matched = operators::evaluate_binary(
                        BinaryOp::Equal,
                        &left_value,
                        &value,
                        result_type,
                        &compare_options(ctx),
                    )?;
                    if matched == Value::Boolean(true) {
                        return Ok(Value::Boolean(true));
                    }
                }
                Ok(Value::Boolean(false))
            }

            Expr::Aggregate {
                func,
                relation,
                column,
            } => {
                let ctx = ctx.ok_or_else(|| {
                    Error::EvalError("aggregate needs a table context".to_string())
                })?;
                let (table, column_id, name) = match column {
                    ColumnRef::Bound { table, column, name } => (*table, *column, name),
                    ColumnRef::Named(name) => {
                        return Err(Error::EvalError(format!(
                            "unbound column reference [{}]",
                            name
                        )));
                    }
                };

                let rows: Vec<RowId> = match relation {
                    Some(RelationRef::Bound { relation, .. }) => {
                        ctx.set
                            .child_rows(*relation, ctx.table, ctx.row, ctx.version)?
                    }
                    Some(RelationRef::Named(name)) => {
                        return Err(Error::RelationNotFound(name.clone()));
                    }
                    None => ctx.set.table(table)?.live_rows().collect(),
                };

                let source = ctx.set.table(table)?;
                let mut values = Vec::with_capacity(rows.len());
                for row in rows {
                    match source.value(row, column_id, RowVersion::Default) {
                        Ok(value) => values.push(value),
                        Err(Error::VersionNotFound(_)) => {}
                        Err(other) => return Err(other),
                    }
                }
                aggregate::compute(*func, &values).map_err(|e| match e {
                    Error::Overflow(t) => Error::Overflow(t),
                    other => Error::EvalError(format!("{}({}): {}", func, name, other)),
                })
            }
        }
    }
}

fn compare_options(ctx: Option<&EvalContext<'_>>) -> StringCompareOptions {
    match ctx {
        Some(ctx) => ctx
            .set
            .table(ctx.table)
            .map(|t| *t.string_compare())
            .unwrap_or_default(),
        None => StringCompareOptions::default(),
    }
}

/// Pick the common type for two evaluated operands, surfacing an empty
/// resolution as the operator's `TypeMismatch`.
fn resolve(
    op: BinaryOp,
    left_value: &Value,
    left: &Expr,
    right_value: &Value,
    right: &Expr,
) -> Result<StorageType> {
    coercion::binary_result_type(
        op,
        left_value.storage_type(),
        right_value.storage_type(),
        left.is_constant(),
        right.is_constant(),
    )?
    .ok_or_else(|| Error::TypeMismatch {
        op: op.symbol(),
        left: left_value.storage_type(),
        right: right_value.storage_type(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_const_arithmetic() {
        let e = Expr::binary(
            BinaryOp::Add,
            Expr::value(Value::Int32(5)),
            Expr::value(Value::Int32(3)),
        );
        assert_eq!(e.eval_const(), Ok(Value::Int32(8)));
    }

    #[test]
    fn test_division_promotes() {
        let e = Expr::binary(
            BinaryOp::Divide,
            Expr::value(Value::Int32(7)),
            Expr::value(Value::Int32(2)),
        );
        assert_eq!(e.eval_const(), Ok(Value::Double(3.5)));
    }

    #[test]
    fn test_short_circuit_skips_ill_typed_right() {
        // The right side would fail type resolution if evaluated into And.
        let e = Expr::binary(
            BinaryOp::And,
            Expr::value(Value::Boolean(false)),
            Expr::value(Value::Int32(7)),
        );
        assert_eq!(e.eval_const(), Ok(Value::Boolean(false)));

        let e = Expr::binary(
            BinaryOp::Or,
            Expr::value(Value::Boolean(true)),
            Expr::value(Value::String("x".into())),
        );
        assert_eq!(e.eval_const(), Ok(Value::Boolean(true)));
    }

    #[test]
    fn test_null_comparison_is_null() {
        let e = Expr::binary(
            BinaryOp::Equal,
            Expr::value(Value::Null),
            Expr::value(Value::Int32(5)),
        );
        assert_eq!(e.eval_const(), Ok(Value::Null));
    }

    #[test]
    fn test_in_semantics() {
        let member = |left: Value, list: Vec<Value>| {
            Expr::in_list(
                Expr::value(left),
                list.into_iter().map(Expr::value).collect(),
            )
            .eval_const()
        };

        assert_eq!(
            member(Value::Int32(2), vec![Value::Int32(1), Value::Int32(2)]),
            Ok(Value::Boolean(true))
        );
        // A null left never touches the list.
        assert_eq!(member(Value::Null, vec![Value::Int32(1)]), Ok(Value::Null));
        // Null candidates are skipped, not matched.
        assert_eq!(
            member(Value::Int32(3), vec![Value::Null, Value::Int32(3)]),
            Ok(Value::Boolean(true))
        );
        assert_eq!(
            member(Value::Int32(3), vec![Value::Null]),
            Ok(Value::Boolean(false))
        );
        // Empty list is False for a non-null left.
        assert_eq!(member(Value::Int32(3), vec![]), Ok(Value::Boolean(false)));
        // Cross-kind candidates resolve their own comparison type.
        assert_eq!(
            member(Value::Int32(3), vec![Value::Int64(3)]),
            Ok(Value::Boolean(true))
        );
    }

    #[test]
    fn test_unbound_column_is_an_error() {
        let e = Expr::column("a");
        assert!(matches!(e.eval_const(), Err(Error::EvalError(_))));
    }
}
