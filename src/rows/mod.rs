//! Record storage and the versioned row model.

pub mod record;
pub mod row;

pub use record::{ColumnData, Record};
pub use row::{Row, RowState, RowVersion};
