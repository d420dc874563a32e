//! In-memory relational table core.
//!
//! Typed columns over a closed storage-type catalog, versioned rows
//! (Original / Current / Proposed records with derived state), and
//! computed-column expressions kept consistent by a dependency-driven
//! recalculation engine. Expressions coerce operand types through a
//! total precedence order, evaluate with three-valued logic, and may
//! aggregate over parent/child relations.
//!
//! ```
//! use tablecore::{Column, StorageType, Table, TableSet, Value};
//! use tablecore::{BinaryOp, Expr};
//!
//! # fn main() -> tablecore::Result<()> {
//! let mut set = TableSet::new();
//! let mut items = Table::new("items");
//! items.add_column(Column::new("price", StorageType::Int32));
//! let total = items.add_column(Column::new("with_tax", StorageType::Int32));
//! let items = set.add_table(items)?;
//!
//! set.set_computed_column(
//!     items,
//!     "with_tax",
//!     Expr::binary(BinaryOp::Multiply, Expr::column("price"), Expr::value(Value::Int32(2))),
//! )?;
//! let row = set.insert(items, vec![Value::Int32(21)])?;
//! assert_eq!(
//!     set.value(items, row, total, tablecore::RowVersion::Default)?,
//!     Value::Int32(42)
//! );
//! # Ok(())
//! # }
//! ```

mod error;
mod expr;
mod operators;
mod recalc;
mod rows;
mod table;
mod types;

pub use error::{Error, Result};
pub use expr::{AggregateFunc, ColumnRef, EvalContext, Expr, RelationRef};
pub use operators::{BinaryOp, StringCompareOptions, UnaryOp};
pub use recalc::{ColumnKey, DependencyGraph};
pub use rows::{ColumnData, Record, Row, RowState, RowVersion};
pub use table::{
    ChangeEvent, Column, ColumnId, Relation, RelationId, RowId, Table, TableId, TableSet,
};
pub use types::{coercion::binary_result_type, Precedence, StorageType, TimeSpan, Value};
