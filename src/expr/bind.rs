//! Name resolution.
//!
//! Binding rewrites `Named` references into `Bound` slots against one
//! table of a table set. An aggregate's column resolves in the child
//! table of its relation; everything else resolves in the owning table.

use super::{ColumnRef, Expr, RelationRef};
use crate::error::{Error, Result};
use crate::recalc::ColumnKey;
use crate::table::{TableId, TableSet};
use std::collections::HashSet;

impl Expr {
    pub fn bind(&mut self, set: &TableSet, table: TableId) -> Result<()> {
        match self {
            Expr::Const(_) => Ok(()),

            Expr::Column(r) => bind_column(r, set, table),

            Expr::Unary(_, operand) => operand.bind(set, table),

            Expr::Binary(_, left, right) => {
                left.bind(set, table)?;
                right.bind(set, table)
            }

            Expr::In(left, candidates) => {
                left.bind(set, table)?;
                for candidate in candidates {
                    candidate.bind(set, table)?;
                }
                Ok(())
            }

            Expr::Aggregate {
                relation, column, ..
            } => {
                let column_table = match relation {
                    Some(r) => {
                        let id = match r {
                            RelationRef::Named(name) => {
                                let (id, rel) = set.relation_by_name(name)?;
                                if rel.parent_table() != table {
                                    return Err(Error::EvalError(format!(
                                        "relation '{}' does not have this table as its parent",
                                        name
                                    )));
                                }
                                let name = name.clone();
                                *r = RelationRef::Bound { relation: id, name };
                                id
                            }
                            RelationRef::Bound { relation, .. } => *relation,
                        };
                        set.relation(id)?.child_table()
                    }
                    None => table,
                };
                bind_column(column, set, column_table)
            }
        }
    }

    /// The bound column slots this expression reads; the dependency graph
    /// registers one edge per entry. An aggregate over a relation also
    /// reads the relation's key columns on both sides, so reassigning a
    /// child row re-triggers the aggregate.
    pub(crate) fn collect_precedents(
        &self,
        set: &TableSet,
        out: &mut HashSet<ColumnKey>,
    ) -> Result<()> {
        match self {
            Expr::Const(_) => {}
            Expr::Column(r) => collect_column(r, out),
            Expr::Aggregate {
                relation, column, ..
            } => {
                collect_column(column, out);
                if let Some(RelationRef::Bound { relation, .. }) = relation {
                    let rel = set.relation(*relation)?;
                    for column in rel.parent_columns() {
                        out.insert(ColumnKey {
                            table: rel.parent_table(),
                            column: *column,
                        });
                    }
                    for column in rel.child_columns() {
                        out.insert(ColumnKey {
                            table: rel.child_table(),
                            column: *column,
                        });
                    }
                }
            }
            Expr::Unary(_, operand) => operand.collect_precedents(set, out)?,
            Expr::Binary(_, left, right) => {
                left.collect_precedents(set, out)?;
                right.collect_precedents(set, out)?;
            }
            Expr::In(left, candidates) => {
                left.collect_precedents(set, out)?;
                for candidate in candidates {
                    candidate.collect_precedents(set, out)?;
                }
            }
        }
        Ok(())
    }
}

fn collect_column(r: &ColumnRef, out: &mut HashSet<ColumnKey>) {
    if let ColumnRef::Bound { table, column, .. } = r {
        out.insert(ColumnKey {
            table: *table,
            column: *column,
        });
    }
}

fn bind_column(r: &mut ColumnRef, set: &TableSet, table: TableId) -> Result<()> {
    if let ColumnRef::Named(name) = r {
        let column = set.table(table)?.column_id(name)?;
        *r = ColumnRef::Bound {
            table,
            column,
            name: name.clone(),
        };
    }
    Ok(())
}
