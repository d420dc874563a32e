//! Operator kinds and the binary/unary evaluator entry points.
//!
//! Both operator sets are closed enums; every variant has an evaluation
//! arm, so "unsupported operator" is not a representable fault.

mod arithmetic;
pub(crate) mod comparison;
mod helpers;
mod logic;
mod modulo;

pub use comparison::StringCompareOptions;

use crate::error::{Error, Result};
use crate::types::{StorageType, Value};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    In,
    Equal,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    NotEqual,
    Is,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    And,
    Or,
    IsNot,
}

impl BinaryOp {
    /// Stable numeric code, kept for diagnostics and serialized trees.
    pub fn code(self) -> u8 {
        match self {
            BinaryOp::In => 5,
            BinaryOp::Equal => 7,
            BinaryOp::GreaterThan => 8,
            BinaryOp::LessThan => 9,
            BinaryOp::GreaterOrEqual => 10,
            BinaryOp::LessOrEqual => 11,
            BinaryOp::NotEqual => 12,
            BinaryOp::Is => 13,
            BinaryOp::Add => 15,
            BinaryOp::Subtract => 16,
            BinaryOp::Multiply => 17,
            BinaryOp::Divide => 18,
            BinaryOp::Modulo => 20,
            BinaryOp::And => 26,
            BinaryOp::Or => 27,
            BinaryOp::IsNot => 39,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::In => "In",
            BinaryOp::Equal => "=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::LessThan => "<",
            BinaryOp::GreaterOrEqual => ">=",
            BinaryOp::LessOrEqual => "<=",
            BinaryOp::NotEqual => "<>",
            BinaryOp::Is => "Is",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::And => "And",
            BinaryOp::Or => "Or",
            BinaryOp::IsNot => "Is Not",
        }
    }

    /// Binding strength for display and parse, tighter binds higher.
    pub fn priority(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::In
            | BinaryOp::Equal
            | BinaryOp::GreaterThan
            | BinaryOp::LessThan
            | BinaryOp::GreaterOrEqual
            | BinaryOp::LessOrEqual
            | BinaryOp::NotEqual
            | BinaryOp::Is
            | BinaryOp::IsNot => 3,
            BinaryOp::Add | BinaryOp::Subtract => 4,
            BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo => 5,
        }
    }

    pub fn is_relational(self) -> bool {
        matches!(
            self,
            BinaryOp::In
                | BinaryOp::Equal
                | BinaryOp::GreaterThan
                | BinaryOp::LessThan
                | BinaryOp::GreaterOrEqual
                | BinaryOp::LessOrEqual
                | BinaryOp::NotEqual
                | BinaryOp::Is
                | BinaryOp::IsNot
        )
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add
                | BinaryOp::Subtract
                | BinaryOp::Multiply
                | BinaryOp::Divide
                | BinaryOp::Modulo
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Negate,
    IsNull,
    IsNotNull,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "Not",
            UnaryOp::Negate => "-",
            UnaryOp::IsNull => "Is Null",
            UnaryOp::IsNotNull => "Is Not Null",
        }
    }
}

/// Evaluate a binary operator over two already-evaluated operands, in the
/// storage type the coercion resolver picked for the pair.
///
/// Null propagation happens here for arithmetic and comparison; the logical
/// operators run their own three-valued tables because `And` and `Or` must
/// absorb a null alongside a dominant operand.
pub fn evaluate_binary(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    result_type: StorageType,
    options: &StringCompareOptions,
) -> Result<Value> {
    match op {
        BinaryOp::And => logic::and(left, right),
        BinaryOp::Or => logic::or(left, right),

        // A bare `In` without its parenthesized list never reaches the
        // evaluator through a well-formed tree.
        BinaryOp::In => Err(Error::InWithoutParentheses),

        BinaryOp::Is => match right {
            Value::Null => Ok(Value::Boolean(left.is_null())),
            _ => Err(Error::InvalidSyntax(
                "'Is' must be followed by Null".to_string(),
            )),
        },
        BinaryOp::IsNot => match right {
            Value::Null => Ok(Value::Boolean(!left.is_null())),
            _ => Err(Error::InvalidSyntax(
                "'Is Not' must be followed by Null".to_string(),
            )),
        },

        BinaryOp::Equal
        | BinaryOp::NotEqual
        | BinaryOp::GreaterThan
        | BinaryOp::LessThan
        | BinaryOp::GreaterOrEqual
        | BinaryOp::LessOrEqual => {
            if left.is_null() || right.is_null() {
                return Ok(Value::Null);
            }
            comparison::compare(op, left, right, result_type, options)
        }

        BinaryOp::Modulo => {
            if left.is_null() || right.is_null() {
                return Ok(Value::Null);
            }
            modulo::evaluate(left, right, result_type)
        }

        BinaryOp::Add | BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Divide => {
            if left.is_null() || right.is_null() {
                return Ok(Value::Null);
            }
            arithmetic::evaluate(op, left, right, result_type)
        }
    }
}

/// Evaluate a unary operator. `IsNull`/`IsNotNull` are the rewritten forms
/// of `x Is [Not] Null` and never propagate null.
pub fn evaluate_unary(op: UnaryOp, operand: &Value) -> Result<Value> {
    match op {
        UnaryOp::Not => logic::not(operand),
        UnaryOp::IsNull => Ok(Value::Boolean(operand.is_null())),
        UnaryOp::IsNotNull => Ok(Value::Boolean(!operand.is_null())),
        UnaryOp::Negate => arithmetic::negate(operand),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(op: BinaryOp, l: Value, r: Value, rt: StorageType) -> Result<Value> {
        evaluate_binary(op, &l, &r, rt, &StringCompareOptions::default())
    }

    #[test]
    fn test_null_propagation() {
        for op in [
            BinaryOp::Add,
            BinaryOp::Subtract,
            BinaryOp::Multiply,
            BinaryOp::Divide,
            BinaryOp::Modulo,
            BinaryOp::Equal,
            BinaryOp::LessThan,
            BinaryOp::NotEqual,
        ] {
            assert_eq!(
                eval(op, Value::Null, Value::Int32(5), StorageType::Int32),
                Ok(Value::Null),
                "{:?} should propagate null",
                op
            );
            assert_eq!(
                eval(op, Value::Int32(5), Value::Null, StorageType::Int32),
                Ok(Value::Null)
            );
        }
    }

    #[test]
    fn test_is_null_forms() {
        assert_eq!(
            eval(BinaryOp::Is, Value::Null, Value::Null, StorageType::Object),
            Ok(Value::Boolean(true))
        );
        assert_eq!(
            eval(BinaryOp::IsNot, Value::Int32(1), Value::Null, StorageType::Object),
            Ok(Value::Boolean(true))
        );
        assert!(matches!(
            eval(BinaryOp::Is, Value::Int32(1), Value::Int32(1), StorageType::Int32),
            Err(Error::InvalidSyntax(_))
        ));
    }

    #[test]
    fn test_bare_in_rejected() {
        assert_eq!(
            eval(BinaryOp::In, Value::Int32(1), Value::Int32(1), StorageType::Int32),
            Err(Error::InWithoutParentheses)
        );
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(BinaryOp::In.code(), 5);
        assert_eq!(BinaryOp::Equal.code(), 7);
        assert_eq!(BinaryOp::Modulo.code(), 20);
        assert_eq!(BinaryOp::IsNot.code(), 39);
    }
}
