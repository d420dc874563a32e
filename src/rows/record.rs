//! Column-major record storage.
//!
//! A `Record` is an index into every column's slot vector. Records are
//! allocated and never reused; a row that stops referencing a record
//! simply abandons the slot.

use crate::error::Result;
use crate::operators::comparison::compare_values;
use crate::operators::StringCompareOptions;
use crate::types::{StorageType, Value};
use std::cmp::Ordering;

/// Handle to one stored version of a row's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Record(pub(crate) usize);

/// One column's slots, indexed by record.
#[derive(Debug, Clone)]
pub struct ColumnData {
    storage_type: StorageType,
    values: Vec<Value>,
}

impl ColumnData {
    pub fn new(storage_type: StorageType) -> Self {
        ColumnData {
            storage_type,
            values: Vec::new(),
        }
    }

    pub fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    /// Grow the slot vector so `record` is addressable.
    pub(crate) fn ensure(&mut self, record: Record) {
        if self.values.len() <= record.0 {
            self.values.resize(record.0 + 1, Value::Null);
        }
    }

    pub fn get(&self, record: Record) -> &Value {
        self.values.get(record.0).unwrap_or(&Value::Null)
    }

    pub fn set(&mut self, record: Record, value: Value) {
        self.ensure(record);
        self.values[record.0] = value;
    }

    pub fn is_null(&self, record: Record) -> bool {
        self.get(record).is_null()
    }

    /// Compare two records of this column in the column's own type.
    /// Nulls sort first, as in the total order on `Value`.
    pub fn compare(
        &self,
        left: Record,
        right: Record,
        options: &StringCompareOptions,
    ) -> Result<Ordering> {
        self.compare_value_to(left, self.get(right), options)
    }

    pub fn compare_value_to(
        &self,
        record: Record,
        value: &Value,
        options: &StringCompareOptions,
    ) -> Result<Ordering> {
        let stored = self.get(record);
        match (stored.is_null(), value.is_null()) {
            (true, true) => Ok(Ordering::Equal),
            (true, false) => Ok(Ordering::Less),
            (false, true) => Ok(Ordering::Greater),
            (false, false) => compare_values(stored, value, self.storage_type, options),
        }
    }
}
