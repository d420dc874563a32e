//! Shared helpers for the integration tests.

use tablecore::{Column, ColumnId, StorageType, Table, TableId, TableSet, Value};

#[allow(dead_code)]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Fluent table construction for tests.
pub struct TableBuilder {
    table: Table,
}

#[allow(dead_code)]
impl TableBuilder {
    pub fn new(name: &str) -> Self {
        TableBuilder {
            table: Table::new(name),
        }
    }

    pub fn column(mut self, name: &str, storage_type: StorageType) -> Self {
        self.table.add_column(Column::new(name, storage_type));
        self
    }

    pub fn column_with_default(
        mut self,
        name: &str,
        storage_type: StorageType,
        default: Value,
    ) -> Self {
        self.table
            .add_column(Column::new(name, storage_type).with_default(default));
        self
    }

    pub fn build(self, set: &mut TableSet) -> TableId {
        set.add_table(self.table).unwrap()
    }
}

#[allow(dead_code)]
pub fn col(set: &TableSet, table: TableId, name: &str) -> ColumnId {
    set.table(table).unwrap().column_id(name).unwrap()
}
