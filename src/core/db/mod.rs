//! Database Module
//!
//! The data-access layer is split into focused submodules:
//! - **Driver Seam** (`driver.rs`): traits and value types at the native
//!   connectivity boundary
//! - **ODBC Binding** (`odbc.rs`): production driver over an ODBC driver
//!   manager, behind the `odbc` cargo feature
//! - **Connection Management** (`connection.rs`): accessor lifecycle, raw
//!   statement execution, teardown
//! - **Registry** (`registry.rs`): per-DSN de-duplication of live accessors
//! - **Query Shaping** (`query.rs`): the fetch/delete/insert/update surface
//!
//! All operations use the shared [`crate::core::DataError`] taxonomy.

pub mod connection;
pub mod driver;
#[cfg(feature = "odbc")]
pub mod odbc;
pub mod query;
pub mod registry;
