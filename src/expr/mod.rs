//! Computed-column expression trees.
//!
//! Trees are built programmatically, bound against a table set (name
//! resolution plus dependency registration), optimized (constant folding
//! and `Is [Not] Null` rewriting), and then evaluated against a chosen
//! row version.

pub mod aggregate;
mod bind;
mod eval;
mod optimize;

pub use aggregate::AggregateFunc;
pub use eval::EvalContext;

use crate::operators::{BinaryOp, UnaryOp};
use crate::table::{ColumnId, RelationId, TableId};
use crate::types::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnRef {
    /// Unresolved name, as written.
    Named(String),
    /// Resolved slot after `bind`.
    Bound {
        table: TableId,
        column: ColumnId,
        name: String,
    },
}

impl ColumnRef {
    pub fn name(&self) -> &str {
        match self {
            ColumnRef::Named(name) => name,
            ColumnRef::Bound { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RelationRef {
    Named(String),
    Bound { relation: RelationId, name: String },
}

impl RelationRef {
    pub fn name(&self) -> &str {
        match self {
            RelationRef::Named(name) => name,
            RelationRef::Bound { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(Value),
    Column(ColumnRef),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// Membership test against an explicit parenthesized list.
    In(Box<Expr>, Vec<Expr>),
    /// Aggregate over related child rows, or over the whole table when
    /// no relation is named.
    Aggregate {
        func: AggregateFunc,
        relation: Option<RelationRef>,
        column: ColumnRef,
    },
}

impl Expr {
    pub fn value(value: Value) -> Expr {
        Expr::Const(value)
    }

    pub fn column(name: impl Into<String>) -> Expr {
        Expr::Column(ColumnRef::Named(name.into()))
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
        Expr::Unary(op, Box::new(operand))
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary(op, Box::new(left), Box::new(right))
    }

    pub fn in_list(left: Expr, candidates: Vec<Expr>) -> Expr {
        Expr::In(Box::new(left), candidates)
    }

    pub fn aggregate(
        func: AggregateFunc,
        relation: Option<&str>,
        column: impl Into<String>,
    ) -> Expr {
        Expr::Aggregate {
            func,
            relation: relation.map(|r| RelationRef::Named(r.to_string())),
            column: ColumnRef::Named(column.into()),
        }
    }

    /// True when the subtree evaluates to the same value on every row.
    pub fn is_constant(&self) -> bool {
        match self {
            Expr::Const(_) => true,
            Expr::Column(_) | Expr::Aggregate { .. } => false,
            Expr::Unary(_, operand) => operand.is_constant(),
            Expr::Binary(_, left, right) => left.is_constant() && right.is_constant(),
            Expr::In(left, candidates) => {
                left.is_constant() && candidates.iter().all(Expr::is_constant)
            }
        }
    }

    /// True when the subtree evaluates to the same value for every row of
    /// one table; a whole-table aggregate qualifies, a row-local column
    /// reference does not.
    pub fn is_table_constant(&self) -> bool {
        match self {
            Expr::Const(_) => true,
            Expr::Column(_) => false,
            Expr::Aggregate { relation, .. } => relation.is_none(),
            Expr::Unary(_, operand) => operand.is_table_constant(),
            Expr::Binary(_, left, right) => {
                left.is_table_constant() && right.is_table_constant()
            }
            Expr::In(left, candidates) => {
                left.is_table_constant() && candidates.iter().all(Expr::is_table_constant)
            }
        }
    }

    pub fn has_aggregate(&self) -> bool {
        match self {
            Expr::Const(_) | Expr::Column(_) => false,
            Expr::Aggregate { .. } => true,
            Expr::Unary(_, operand) => operand.has_aggregate(),
            Expr::Binary(_, left, right) => left.has_aggregate() || right.has_aggregate(),
            Expr::In(left, candidates) => {
                left.has_aggregate() || candidates.iter().any(Expr::has_aggregate)
            }
        }
    }

    /// An aggregate scoped through a relation, as opposed to a
    /// whole-table one.
    pub fn has_local_aggregate(&self) -> bool {
        match self {
            Expr::Const(_) | Expr::Column(_) => false,
            Expr::Aggregate { relation, .. } => relation.is_some(),
            Expr::Unary(_, operand) => operand.has_local_aggregate(),
            Expr::Binary(_, left, right) => {
                left.has_local_aggregate() || right.has_local_aggregate()
            }
            Expr::In(left, candidates) => {
                left.has_local_aggregate() || candidates.iter().any(Expr::has_local_aggregate)
            }
        }
    }

    /// Whether any bound column reference in the subtree resolves to the
    /// given slot.
    pub fn depends_on(&self, table: TableId, column: ColumnId) -> bool {
        match self {
            Expr::Const(_) => false,
            Expr::Column(r) | Expr::Aggregate { column: r, .. } => matches!(
                r,
                ColumnRef::Bound { table: t, column: c, .. } if *t == table && *c == column
            ),
            Expr::Unary(_, operand) => operand.depends_on(table, column),
            Expr::Binary(_, left, right) => {
                left.depends_on(table, column) || right.depends_on(table, column)
            }
            Expr::In(left, candidates) => {
                left.depends_on(table, column)
                    || candidates.iter().any(|c| c.depends_on(table, column))
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(value) => write!(f, "{}", value),
            Expr::Column(r) => write!(f, "[{}]", r.name()),
            Expr::Unary(op, operand) => match op {
                UnaryOp::Not | UnaryOp::Negate => write!(f, "{}({})", op.symbol(), operand),
                UnaryOp::IsNull | UnaryOp::IsNotNull => {
                    write!(f, "({} {})", operand, op.symbol())
                }
            },
            Expr::Binary(op, left, right) => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expr::In(left, candidates) => {
                write!(f, "({} In (", left)?;
                for (i, candidate) in candidates.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", candidate)?;
                }
                write!(f, "))")
            }
            Expr::Aggregate {
                func,
                relation,
                column,
            } => match relation {
                Some(rel) => write!(f, "{}({}.{})", func, rel.name(), column.name()),
                None => write!(f, "{}({})", func, column.name()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constness() {
        let c = Expr::binary(
            BinaryOp::Add,
            Expr::value(Value::Int32(1)),
            Expr::value(Value::Int32(2)),
        );
        assert!(c.is_constant());
        assert!(c.is_table_constant());

        let col = Expr::binary(BinaryOp::Add, Expr::column("a"), Expr::value(Value::Int32(2)));
        assert!(!col.is_constant());
        assert!(!col.is_table_constant());

        let agg = Expr::aggregate(AggregateFunc::Sum, None, "a");
        assert!(!agg.is_constant());
        assert!(agg.is_table_constant());
        assert!(agg.has_aggregate());
        assert!(!agg.has_local_aggregate());

        let local = Expr::aggregate(AggregateFunc::Sum, Some("rel"), "a");
        assert!(local.has_local_aggregate());
        assert!(!local.is_table_constant());
    }

    #[test]
    fn test_display() {
        let e = Expr::binary(
            BinaryOp::GreaterThan,
            Expr::binary(BinaryOp::Add, Expr::column("a"), Expr::value(Value::Int32(1))),
            Expr::value(Value::Int32(10)),
        );
        assert_eq!(e.to_string(), "(([a] + 1) > 10)");

        let agg = Expr::aggregate(AggregateFunc::Sum, Some("OrderItems"), "Amount");
        assert_eq!(agg.to_string(), "Sum(OrderItems.Amount)");
    }
}
