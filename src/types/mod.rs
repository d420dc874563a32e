//! Type system: storage kinds, runtime values, and binary coercion.

pub mod coercion;
pub mod storage_type;
pub mod value;

pub use storage_type::{Precedence, StorageType};
pub use value::{TimeSpan, Value};
