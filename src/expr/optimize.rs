//! Expression optimization.
//!
//! Runs before binding: constant subtrees fold bottom-up, so the
//! constant-ness flags the coercion resolver sees later reflect the
//! folded tree. `x Is [Not] Null` rewrites into its unary form here; any
//! other right-hand side of `Is` is a syntax error.

use super::Expr;
use crate::error::{Error, Result};
use crate::operators::{BinaryOp, UnaryOp};
use crate::types::Value;

impl Expr {
    pub fn optimize(self) -> Result<Expr> {
        let expr = match self {
            Expr::Unary(op, operand) => Expr::Unary(op, Box::new(operand.optimize()?)),

            Expr::Binary(op, left, right) => {
                let left = left.optimize()?;
                let right = right.optimize()?;
                match op {
                    BinaryOp::Is | BinaryOp::IsNot => match right {
                        Expr::Const(Value::Null) => {
                            let unary = if op == BinaryOp::Is {
                                UnaryOp::IsNull
                            } else {
                                UnaryOp::IsNotNull
                            };
                            Expr::Unary(unary, Box::new(left))
                        }
                        _ => {
                            return Err(Error::InvalidSyntax(format!(
                                "'{}' must be followed by Null",
                                op.symbol()
                            )));
                        }
                    },
                    _ => Expr::Binary(op, Box::new(left), Box::new(right)),
                }
            }

            Expr::In(left, candidates) => Expr::In(
                Box::new(left.optimize()?),
                candidates
                    .into_iter()
                    .map(Expr::optimize)
                    .collect::<Result<Vec<_>>>()?,
            ),

            other => other,
        };

        if expr.is_constant() && !matches!(expr, Expr::Const(_)) {
            return Ok(Expr::Const(expr.eval_const()?));
        }
        Ok(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_folding() {
        let e = Expr::binary(
            BinaryOp::Multiply,
            Expr::binary(
                BinaryOp::Add,
                Expr::value(Value::Int32(2)),
                Expr::value(Value::Int32(3)),
            ),
            Expr::value(Value::Int32(4)),
        );
        assert_eq!(e.optimize(), Ok(Expr::Const(Value::Int32(20))));
    }

    #[test]
    fn test_folding_stops_at_columns() {
        let e = Expr::binary(
            BinaryOp::Add,
            Expr::column("a"),
            Expr::binary(
                BinaryOp::Add,
                Expr::value(Value::Int32(1)),
                Expr::value(Value::Int32(2)),
            ),
        );
        // The constant subtree folds; the column survives.
        assert_eq!(
            e.optimize(),
            Ok(Expr::binary(
                BinaryOp::Add,
                Expr::column("a"),
                Expr::value(Value::Int32(3)),
            ))
        );
    }

    #[test]
    fn test_is_null_rewrite() {
        let e = Expr::binary(BinaryOp::Is, Expr::column("a"), Expr::value(Value::Null));
        assert_eq!(
            e.optimize(),
            Ok(Expr::unary(UnaryOp::IsNull, Expr::column("a")))
        );

        let e = Expr::binary(BinaryOp::IsNot, Expr::column("a"), Expr::value(Value::Null));
        assert_eq!(
            e.optimize(),
            Ok(Expr::unary(UnaryOp::IsNotNull, Expr::column("a")))
        );
    }

    #[test]
    fn test_is_with_non_null_right_is_syntax_error() {
        let e = Expr::binary(
            BinaryOp::Is,
            Expr::column("a"),
            Expr::value(Value::Int32(0)),
        );
        assert!(matches!(e.optimize(), Err(Error::InvalidSyntax(_))));
    }

    #[test]
    fn test_folding_surfaces_constant_errors() {
        let e = Expr::binary(
            BinaryOp::Add,
            Expr::value(Value::Int32(i32::MAX)),
            Expr::value(Value::Int32(1)),
        );
        assert_eq!(e.optimize(), Err(Error::Overflow(crate::types::StorageType::Int32)));
    }
}
