// Core infrastructure modules
pub mod core;

// Convenience re-exports for embedding applications
pub use crate::core::db::connection::{ConnectSettings, DataAccessor, Source};
pub use crate::core::db::driver::{Cursor, Driver, DriverError, ResultKey, Row, Value};
pub use crate::core::db::registry::Registry;
pub use crate::core::{DataError, Result};

/// Process-wide registry entry points, available with the `odbc` feature.
#[cfg(feature = "odbc")]
pub use crate::core::db::registry::{active, get};
