//! The table set: tables, relations between them, and the recalculation
//! engine that keeps computed columns consistent after every mutation.

use super::{ChangeEvent, Column, ColumnId, RelationId, RowId, Table, TableId};
use crate::error::{Error, Result};
use crate::expr::{EvalContext, Expr};
use crate::operators::comparison::compare_values;
use crate::recalc::{ColumnKey, DependencyGraph};
use crate::rows::{Row, RowState, RowVersion};
use crate::types::Value;
use std::cmp::Ordering;
use std::collections::HashSet;

/// A parent/child relation over matching key columns. Child rows are
/// found by scanning; ordered indexes are an external concern.
#[derive(Debug, Clone)]
pub struct Relation {
    name: String,
    parent_table: TableId,
    parent_columns: Vec<ColumnId>,
    child_table: TableId,
    child_columns: Vec<ColumnId>,
}

impl Relation {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent_table(&self) -> TableId {
        self.parent_table
    }

    pub fn child_table(&self) -> TableId {
        self.child_table
    }

    pub fn parent_columns(&self) -> &[ColumnId] {
        &self.parent_columns
    }

    pub fn child_columns(&self) -> &[ColumnId] {
        &self.child_columns
    }
}

#[derive(Debug, Default)]
pub struct TableSet {
    tables: Vec<Table>,
    relations: Vec<Relation>,
    graph: DependencyGraph,
}

impl TableSet {
    pub fn new() -> TableSet {
        TableSet::default()
    }

    pub fn add_table(&mut self, table: Table) -> Result<TableId> {
        if self.tables.iter().any(|t| t.name() == table.name()) {
            return Err(Error::EvalError(format!(
                "a table named '{}' already exists",
                table.name()
            )));
        }
        self.tables.push(table);
        Ok(TableId(self.tables.len() - 1))
    }

    pub fn table_id(&self, name: &str) -> Result<TableId> {
        self.tables
            .iter()
            .position(|t| t.name() == name)
            .map(TableId)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    pub fn table(&self, id: TableId) -> Result<&Table> {
        self.tables
            .get(id.0)
            .ok_or_else(|| Error::Internal(format!("no table with id {}", id.0)))
    }

    pub(crate) fn table_mut(&mut self, id: TableId) -> Result<&mut Table> {
        self.tables
            .get_mut(id.0)
            .ok_or_else(|| Error::Internal(format!("no table with id {}", id.0)))
    }

    pub fn add_relation(
        &mut self,
        name: impl Into<String>,
        parent: (TableId, &[&str]),
        child: (TableId, &[&str]),
    ) -> Result<RelationId> {
        let name = name.into();
        let parent_columns: Vec<ColumnId> = parent
            .1
            .iter()
            .map(|c| self.table(parent.0)?.column_id(c))
            .collect::<Result<_>>()?;
        let child_columns: Vec<ColumnId> = child
            .1
            .iter()
            .map(|c| self.table(child.0)?.column_id(c))
            .collect::<Result<_>>()?;

        if parent_columns.is_empty() || parent_columns.len() != child_columns.len() {
            return Err(Error::EvalError(format!(
                "relation '{}' needs matching parent and child key columns",
                name
            )));
        }
        for (p, c) in parent_columns.iter().zip(&child_columns) {
            let parent_kind = self.table(parent.0)?.column(*p)?.storage_type();
            let child_kind = self.table(child.0)?.column(*c)?.storage_type();
            if parent_kind.native_kind() != child_kind.native_kind() {
                return Err(Error::EvalError(format!(
                    "relation '{}' key types differ: {} vs {}",
                    name, parent_kind, child_kind
                )));
            }
        }

        self.relations.push(Relation {
            name,
            parent_table: parent.0,
            parent_columns,
            child_table: child.0,
            child_columns,
        });
        Ok(RelationId(self.relations.len() - 1))
    }

    pub fn relation(&self, id: RelationId) -> Result<&Relation> {
        self.relations
            .get(id.0)
            .ok_or_else(|| Error::Internal(format!("no relation with id {}", id.0)))
    }

    pub fn relation_by_name(&self, name: &str) -> Result<(RelationId, &Relation)> {
        self.relations
            .iter()
            .position(|r| r.name == name)
            .map(|i| (RelationId(i), &self.relations[i]))
            .ok_or_else(|| Error::RelationNotFound(name.to_string()))
    }

    /// Child rows whose key columns match the parent row's key, read at
    /// the Default version. Deleted children drop out with their missing
    /// version. Null keys match null keys.
    pub fn child_rows(
        &self,
        relation: RelationId,
        parent_table: TableId,
        parent_row: RowId,
        parent_version: RowVersion,
    ) -> Result<Vec<RowId>> {
        let rel = self.relation(relation)?.clone();
        if rel.parent_table != parent_table {
            return Err(Error::EvalError(format!(
                "relation '{}' does not start at this table",
                rel.name
            )));
        }

        let parent = self.table(rel.parent_table)?;
        let key: Vec<Value> = rel
            .parent_columns
            .iter()
            .map(|c| parent.value(parent_row, *c, parent_version))
            .collect::<Result<_>>()?;

        let child = self.table(rel.child_table)?;
        let mut matches = Vec::new();
        'rows: for row in child.live_rows() {
            for (column, expected) in rel.child_columns.iter().zip(&key) {
                let value = match child.value(row, *column, RowVersion::Default) {
                    Ok(value) => value,
                    Err(Error::VersionNotFound(_)) => continue 'rows,
                    Err(other) => return Err(other),
                };
                let equal = match (value.is_null(), expected.is_null()) {
                    (true, true) => true,
                    (true, false) | (false, true) => false,
                    (false, false) => {
                        let kind = child.column(*column)?.storage_type();
                        compare_values(&value, expected, kind, child.string_compare())?
                            == Ordering::Equal
                    }
                };
                if !equal {
                    continue 'rows;
                }
            }
            matches.push(row);
        }
        Ok(matches)
    }

    pub fn value(
        &self,
        table: TableId,
        row: RowId,
        column: ColumnId,
        version: RowVersion,
    ) -> Result<Value> {
        self.table(table)?.value(row, column, version)
    }

    pub fn row_state(&self, table: TableId, row: RowId) -> Result<RowState> {
        Ok(self.table(table)?.state(row))
    }

    pub fn take_changes(&mut self, table: TableId) -> Result<Vec<ChangeEvent>> {
        Ok(self.table_mut(table)?.take_changes())
    }

    // ---- mutations -------------------------------------------------------

    /// Insert a row from positional values. Missing positions take the
    /// column default; computed columns start Null and are filled by the
    /// recalculation that follows.
    pub fn insert(&mut self, table: TableId, values: Vec<Value>) -> Result<RowId> {
        let row = {
            let t = self.table_mut(table)?;
            if values.len() > t.columns().len() {
                return Err(Error::EvalError(format!(
                    "{} values for {} columns",
                    values.len(),
                    t.columns().len()
                )));
            }
            let record = t.allocate_record();
            for index in 0..t.columns().len() {
                let column = &t.columns()[index];
                let value = if column.is_computed() {
                    Value::Null
                } else {
                    match values.get(index) {
                        Some(v) if !v.is_null() => {
                            check_kind(column, v)?;
                            v.clone()
                        }
                        _ => column.default_value().clone(),
                    }
                };
                t.write(record, ColumnId(index), value);
            }
            let row = t.push_row(Row {
                current: Some(record),
                ..Row::default()
            });
            t.push_change(ChangeEvent::RowInserted { row });
            row
        };
        log::debug!("insert row {} into table {}", row.0, table.0);
        let changed = self.all_keys(table);
        self.recalculate(table, Some(row), &changed)?;
        Ok(row)
    }

    /// Set a value and record a user-visible change event.
    pub fn set_value(
        &mut self,
        table: TableId,
        row: RowId,
        column: ColumnId,
        value: Value,
    ) -> Result<()> {
        let old = self.apply_value(table, row, column, value.clone())?;
        self.table_mut(table)?.push_change(ChangeEvent::ValueChanged {
            row,
            column,
            old,
            new: value,
        });
        self.recalculate(table, Some(row), &[ColumnKey { table, column }])
    }

    /// Set a value without a change event. Recalculation still runs; the
    /// silence is about the event log only.
    pub fn set_value_silent(
        &mut self,
        table: TableId,
        row: RowId,
        column: ColumnId,
        value: Value,
    ) -> Result<()> {
        self.apply_value(table, row, column, value)?;
        self.recalculate(table, Some(row), &[ColumnKey { table, column }])
    }

    fn apply_value(
        &mut self,
        table: TableId,
        row: RowId,
        column: ColumnId,
        value: Value,
    ) -> Result<Value> {
        let t = self.table_mut(table)?;
        let col = t.column(column)?;
        if col.is_read_only() {
            return Err(Error::ReadOnly(col.name().to_string()));
        }
        check_kind(col, &value)?;
        let record = t.editable_record(row)?;
        let old = t.value(row, column, RowVersion::Default)?;
        t.write(record, column, value);
        log::debug!(
            "set table {} row {} column {} (record {:?})",
            table.0,
            row.0,
            column.0,
            record
        );
        Ok(old)
    }

    /// Open an edit: proposed becomes a copy of current. Re-entering an
    /// open edit is a no-op.
    pub fn begin_edit(&mut self, table: TableId, row: RowId) -> Result<()> {
        let t = self.table_mut(table)?;
        let current = {
            let r = t.row(row)?;
            if r.proposed.is_some() {
                return Ok(());
            }
            r.record_for_version(RowVersion::Current)?
        };
        let proposed = t.copy_record(current);
        t.row_mut(row)?.proposed = Some(proposed);
        Ok(())
    }

    /// Close an edit: proposed becomes current, state recomputes from the
    /// handles.
    pub fn end_edit(&mut self, table: TableId, row: RowId) -> Result<()> {
        let had_edit = {
            let t = self.table_mut(table)?;
            let r = t.row_mut(row)?;
            match r.proposed.take() {
                Some(proposed) => {
                    r.current = Some(proposed);
                    true
                }
                None => false,
            }
        };
        if had_edit {
            self.table_mut(table)?
                .push_change(ChangeEvent::RowChanged { row });
            let changed = self.all_keys(table);
            self.recalculate(table, Some(row), &changed)?;
        }
        Ok(())
    }

    /// Discard an open edit; current and original are untouched.
    pub fn cancel_edit(&mut self, table: TableId, row: RowId) -> Result<()> {
        let t = self.table_mut(table)?;
        t.row_mut(row)?.proposed = None;
        Ok(())
    }

    /// Delete a row. An Added row detaches outright; anything else keeps
    /// its original record and reports Deleted.
    pub fn delete(&mut self, table: TableId, row: RowId) -> Result<()> {
        {
            let t = self.table_mut(table)?;
            let state = t.row(row)?.state();
            if state == RowState::Added {
                t.vacate(row);
            } else {
                let r = t.row_mut(row)?;
                r.current = None;
                r.proposed = None;
            }
            t.push_change(ChangeEvent::RowDeleted { row });
        }
        log::debug!("delete row {} from table {}", row.0, table.0);
        let changed = self.all_keys(table);
        self.recalculate(table, None, &changed)
    }

    /// Commit: every surviving row's original becomes its current record;
    /// Deleted rows drop out.
    pub fn accept_changes(&mut self, table: TableId) -> Result<()> {
        {
            let t = self.table_mut(table)?;
            for id in t.live_rows().collect::<Vec<_>>() {
                let current = {
                    let r = t.row_mut(id)?;
                    if let Some(proposed) = r.proposed.take() {
                        r.current = Some(proposed);
                    }
                    r.current
                };
                match current {
                    Some(record) => t.row_mut(id)?.original = Some(record),
                    None => t.vacate(id),
                }
            }
        }
        log::debug!("accept changes on table {}", table.0);
        let changed = self.all_keys(table);
        self.recalculate(table, None, &changed)
    }

    /// Roll back: every surviving row's current becomes its original
    /// record again; Added rows drop out.
    pub fn reject_changes(&mut self, table: TableId) -> Result<()> {
        {
            let t = self.table_mut(table)?;
            for id in t.live_rows().collect::<Vec<_>>() {
                let original = {
                    let r = t.row_mut(id)?;
                    r.proposed = None;
                    r.original
                };
                match original {
                    Some(record) => t.row_mut(id)?.current = Some(record),
                    None => t.vacate(id),
                }
            }
        }
        log::debug!("reject changes on table {}", table.0);
        let changed = self.all_keys(table);
        self.recalculate(table, None, &changed)
    }

    pub fn clear(&mut self, table: TableId) -> Result<()> {
        {
            let t = self.table_mut(table)?;
            for row in t.live_rows().collect::<Vec<_>>() {
                t.push_change(ChangeEvent::RowDeleted { row });
            }
            t.clear_rows();
        }
        let changed = self.all_keys(table);
        self.recalculate(table, None, &changed)
    }

    /// Bulk load. Loaded rows arrive Unchanged (original == current), as
    /// if they had already been committed; recalculation runs once at the
    /// end of the batch.
    pub fn load_rows(
        &mut self,
        table: TableId,
        rows: impl IntoIterator<Item = Vec<Value>>,
    ) -> Result<Vec<RowId>> {
        let mut loaded = Vec::new();
        {
            let t = self.table_mut(table)?;
            for values in rows {
                if values.len() > t.columns().len() {
                    return Err(Error::EvalError(format!(
                        "{} values for {} columns",
                        values.len(),
                        t.columns().len()
                    )));
                }
                let record = t.allocate_record();
                for index in 0..t.columns().len() {
                    let column = &t.columns()[index];
                    let value = if column.is_computed() {
                        Value::Null
                    } else {
                        match values.get(index) {
                            Some(v) if !v.is_null() => {
                                check_kind(column, v)?;
                                v.clone()
                            }
                            _ => column.default_value().clone(),
                        }
                    };
                    t.write(record, ColumnId(index), value);
                }
                let row = t.push_row(Row {
                    original: Some(record),
                    current: Some(record),
                    proposed: None,
                });
                t.push_change(ChangeEvent::RowInserted { row });
                loaded.push(row);
            }
        }
        log::debug!("loaded {} rows into table {}", loaded.len(), table.0);
        let changed = self.all_keys(table);
        self.recalculate(table, None, &changed)?;
        Ok(loaded)
    }

    /// Install a computed expression on a column: optimize, bind, refuse
    /// cycles, register dependencies, then compute it (and everything
    /// downstream) for all existing rows.
    pub fn set_computed_column(
        &mut self,
        table: TableId,
        column_name: &str,
        expr: Expr,
    ) -> Result<()> {
        let column = self.table(table)?.column_id(column_name)?;
        let mut expr = expr.optimize()?;
        expr.bind(self, table)?;

        let mut precedents = HashSet::new();
        expr.collect_precedents(self, &mut precedents)?;

        let key = ColumnKey { table, column };
        if self.graph.would_create_cycle(key, &precedents) {
            return Err(Error::ExpressionCircular(column_name.to_string()));
        }
        self.graph.register(key, precedents);
        self.table_mut(table)?.set_expression(column, expr);
        log::debug!(
            "computed column '{}' installed on table {}",
            column_name,
            table.0
        );

        self.recalculate(table, None, &[key])
    }

    // ---- recalculation ---------------------------------------------------

    fn all_keys(&self, table: TableId) -> Vec<ColumnKey> {
        match self.table(table) {
            Ok(t) => (0..t.columns().len())
                .map(|i| ColumnKey {
                    table,
                    column: ColumnId(i),
                })
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Re-evaluate every computed column downstream of `changed`, in
    /// dependency order. A column whose expression aggregates recomputes
    /// on every row of its table; a plain expression recomputes only the
    /// trigger row when the trigger is row-scoped. Writes go straight to
    /// the record, bypassing the change log.
    fn recalculate(
        &mut self,
        trigger_table: TableId,
        trigger_row: Option<RowId>,
        changed: &[ColumnKey],
    ) -> Result<()> {
        let order = self.graph.recalc_order(changed);
        for key in order {
            let expr = match self.table(key.table)?.column(key.column)?.expression() {
                Some(expr) => expr.clone(),
                None => continue,
            };

            let row_scoped = !expr.has_aggregate()
                && key.table == trigger_table
                && trigger_row.is_some();
            let targets: Vec<RowId> = if row_scoped {
                trigger_row.into_iter().collect()
            } else {
                self.table(key.table)?.live_rows().collect()
            };
            let targets: Vec<RowId> = {
                let t = self.table(key.table)?;
                targets
                    .into_iter()
                    .filter(|row| {
                        t.row(*row)
                            .map(|r| r.has_version(RowVersion::Default))
                            .unwrap_or(false)
                    })
                    .collect()
            };

            let updates: Vec<(RowId, Value)> = if expr.is_table_constant() {
                // One evaluation, broadcast to every row.
                match targets.first() {
                    Some(first) => {
                        let ctx = EvalContext {
                            set: self,
                            table: key.table,
                            row: *first,
                            version: RowVersion::Default,
                        };
                        let value = expr.eval(&ctx)?;
                        targets.iter().map(|row| (*row, value.clone())).collect()
                    }
                    None => Vec::new(),
                }
            } else {
                let mut updates = Vec::with_capacity(targets.len());
                for row in targets {
                    let ctx = EvalContext {
                        set: self,
                        table: key.table,
                        row,
                        version: RowVersion::Default,
                    };
                    updates.push((row, expr.eval(&ctx)?));
                }
                updates
            };

            log::debug!(
                "recalculated column {} of table {} for {} row(s)",
                key.column.0,
                key.table.0,
                updates.len()
            );
            let t = self.table_mut(key.table)?;
            for (row, value) in updates {
                let record = t.row(row)?.record_for_version(RowVersion::Default)?;
                t.write(record, key.column, value);
            }
        }
        Ok(())
    }
}

fn check_kind(column: &Column, value: &Value) -> Result<()> {
    if value.is_null() {
        return Ok(());
    }
    if value.storage_type().native_kind() == column.storage_type().native_kind() {
        return Ok(());
    }
    Err(Error::EvalError(format!(
        "cannot store {:?} into column '{}' of type {}",
        value,
        column.name(),
        column.storage_type()
    )))
}
