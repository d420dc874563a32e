//! Tables: typed columns over a record arena, with versioned rows and a
//! drainable change log. Mutation entry points live on [`TableSet`] so
//! recalculation can reach across relations.

pub mod set;

pub use set::{Relation, TableSet};

use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::operators::StringCompareOptions;
use crate::rows::{ColumnData, Record, Row, RowState, RowVersion};
use crate::types::{StorageType, Value};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelationId(pub(crate) usize);

/// Column definition. A computed column is read-only; the expression is
/// installed through [`TableSet::set_computed_column`] so dependencies
/// can be registered against the whole set.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    storage_type: StorageType,
    expression: Option<Expr>,
    read_only: bool,
    default: Value,
}

impl Column {
    pub fn new(name: impl Into<String>, storage_type: StorageType) -> Column {
        Column {
            name: name.into(),
            storage_type,
            expression: None,
            read_only: false,
            default: Value::Null,
        }
    }

    pub fn read_only(mut self) -> Column {
        self.read_only = true;
        self
    }

    pub fn with_default(mut self, default: Value) -> Column {
        self.default = default;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only || self.expression.is_some()
    }

    pub fn is_computed(&self) -> bool {
        self.expression.is_some()
    }

    pub fn expression(&self) -> Option<&Expr> {
        self.expression.as_ref()
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }
}

/// User-visible change events, drained with [`Table::take_changes`].
/// Writes performed by recalculation never appear here.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    RowInserted {
        row: RowId,
    },
    ValueChanged {
        row: RowId,
        column: ColumnId,
        old: Value,
        new: Value,
    },
    RowChanged {
        row: RowId,
    },
    RowDeleted {
        row: RowId,
    },
}

#[derive(Debug)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    data: Vec<ColumnData>,
    rows: Vec<Option<Row>>,
    next_record: usize,
    string_compare: StringCompareOptions,
    changes: Vec<ChangeEvent>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Table {
        Table {
            name: name.into(),
            columns: Vec::new(),
            data: Vec::new(),
            rows: Vec::new(),
            next_record: 0,
            string_compare: StringCompareOptions::default(),
            changes: Vec::new(),
        }
    }

    pub fn with_string_compare(mut self, options: StringCompareOptions) -> Table {
        self.string_compare = options;
        self
    }

    pub fn add_column(&mut self, column: Column) -> ColumnId {
        self.data.push(ColumnData::new(column.storage_type));
        self.columns.push(column);
        ColumnId(self.columns.len() - 1)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, id: ColumnId) -> Result<&Column> {
        self.columns
            .get(id.0)
            .ok_or_else(|| Error::ColumnNotFound(format!("#{}", id.0)))
    }

    pub fn column_id(&self, name: &str) -> Result<ColumnId> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .map(ColumnId)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    pub fn string_compare(&self) -> &StringCompareOptions {
        &self.string_compare
    }

    pub fn row(&self, id: RowId) -> Result<&Row> {
        self.rows
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(Error::RowNotFound(id.0))
    }

    pub fn state(&self, id: RowId) -> RowState {
        match self.rows.get(id.0) {
            Some(Some(row)) => row.state(),
            _ => RowState::Detached,
        }
    }

    /// Row ids whose slot is still occupied, in insertion order. Deleted
    /// rows are included; version resolution filters them where needed.
    pub fn live_rows(&self) -> impl Iterator<Item = RowId> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| RowId(i))
    }

    pub fn row_count(&self) -> usize {
        self.rows.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn value(&self, row: RowId, column: ColumnId, version: RowVersion) -> Result<Value> {
        let record = self.row(row)?.record_for_version(version)?;
        let data = self
            .data
            .get(column.0)
            .ok_or_else(|| Error::ColumnNotFound(format!("#{}", column.0)))?;
        Ok(data.get(record).clone())
    }

    pub fn take_changes(&mut self) -> Vec<ChangeEvent> {
        std::mem::take(&mut self.changes)
    }

    pub(crate) fn push_change(&mut self, event: ChangeEvent) {
        self.changes.push(event);
    }

    pub(crate) fn set_expression(&mut self, column: ColumnId, expr: Expr) {
        self.columns[column.0].expression = Some(expr);
    }

    pub(crate) fn allocate_record(&mut self) -> Record {
        let record = Record(self.next_record);
        self.next_record += 1;
        for data in &mut self.data {
            data.ensure(record);
        }
        record
    }

    pub(crate) fn copy_record(&mut self, from: Record) -> Record {
        let to = self.allocate_record();
        for data in &mut self.data {
            let value = data.get(from).clone();
            data.set(to, value);
        }
        to
    }

    pub(crate) fn write(&mut self, record: Record, column: ColumnId, value: Value) {
        self.data[column.0].set(record, value);
    }

    pub(crate) fn row_mut(&mut self, id: RowId) -> Result<&mut Row> {
        self.rows
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(Error::RowNotFound(id.0))
    }

    pub(crate) fn push_row(&mut self, row: Row) -> RowId {
        self.rows.push(Some(row));
        RowId(self.rows.len() - 1)
    }

    pub(crate) fn vacate(&mut self, id: RowId) {
        if let Some(slot) = self.rows.get_mut(id.0) {
            *slot = None;
        }
    }

    pub(crate) fn clear_rows(&mut self) {
        self.rows.clear();
    }

    /// The record writes should land in: the proposed record inside an
    /// open edit, otherwise the current record, detaching an unchanged
    /// row from its original record first (copy on first write).
    pub(crate) fn editable_record(&mut self, id: RowId) -> Result<Record> {
        let row = self.row(id)?.clone();
        if let Some(proposed) = row.proposed {
            return Ok(proposed);
        }
        match (row.original, row.current) {
            (_, None) => Err(Error::VersionNotFound(RowVersion::Current)),
            (Some(original), Some(current)) if original == current => {
                let fresh = self.copy_record(current);
                self.row_mut(id)?.current = Some(fresh);
                Ok(fresh)
            }
            (_, Some(current)) => Ok(current),
        }
    }
}
