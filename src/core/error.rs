//! Error Module
//!
//! Defines the error taxonomy shared by every operation of the data-access
//! layer. Each variant carries a human-readable message and maps to a stable
//! numeric category code so embedding applications can branch on the failure
//! class without string matching.
use thiserror::Error;

/// Failure categories raised by the data-access layer.
///
/// `ConnectionExists` and `NoConfiguration` are never produced by this crate
/// itself; they are reserved for an embedding configuration-lookup layer that
/// resolves logical database names before handing a DSN to [`crate::Registry`].
#[derive(Error, Debug)]
pub enum DataError {
    /// Unclassified failure; the default when no specific category applies.
    #[error("Unknown error: {0}")]
    Unknown(String),

    /// Reserved: a connection for the named database is already active.
    #[error("A connection to {0} is already active")]
    ConnectionExists(String),

    /// Opening the native connection failed; carries the driver's error text.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Reserved: no settings are known for the named database.
    #[error("No configuration for {0}")]
    NoConfiguration(String),

    /// A settings structure was supplied without a DSN.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Native execution of a statement failed; carries the driver's error
    /// text and the offending query.
    #[error("Bad query: {0}")]
    BadQuery(String),
}

impl DataError {
    /// Stable numeric code for the failure category.
    pub fn code(&self) -> u8 {
        match self {
            DataError::Unknown(_) => 0,
            DataError::ConnectionExists(_) => 1,
            DataError::Connection(_) => 2,
            DataError::NoConfiguration(_) => 3,
            DataError::InvalidKey(_) => 4,
            DataError::BadQuery(_) => 5,
        }
    }
}

/// Type alias for Result to use DataError as the error type.
pub type Result<T> = std::result::Result<T, DataError>;
