//! Error types for the table core

use crate::rows::RowVersion;
use crate::types::StorageType;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Type errors
    #[error("Cannot perform '{op}' on {left} and {right}")]
    TypeMismatch {
        op: &'static str,
        left: StorageType,
        right: StorageType,
    },

    #[error("Operator '{op}' is ambiguous on {left} and {right}; cast one operand explicitly")]
    AmbiguousBinaryOperation {
        op: &'static str,
        left: StorageType,
        right: StorageType,
    },

    #[error("Value overflows {0}")]
    Overflow(StorageType),

    #[error("Division by zero")]
    DivideByZero,

    // Expression errors
    #[error("Syntax error: {0}")]
    InvalidSyntax(String),

    #[error("The IN operator requires a parenthesized list of values")]
    InWithoutParentheses,

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Relation not found: {0}")]
    RelationNotFound(String),

    #[error("Circular dependency in expression for column: {0}")]
    ExpressionCircular(String),

    #[error("Expression evaluation failed: {0}")]
    EvalError(String),

    // Row errors
    #[error("Row has no {0} version")]
    VersionNotFound(RowVersion),

    #[error("Row {0} does not exist or is detached")]
    RowNotFound(usize),

    #[error("Cannot modify read-only column: {0}")]
    ReadOnly(String),

    // System errors
    #[error("Internal error: {0}")]
    Internal(String),
}
