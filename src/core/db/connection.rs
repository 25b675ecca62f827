//! Connection Management Module
//!
//! Owns the lifecycle of one native database handle: settings resolution,
//! opening through a driver opener, raw statement execution with error
//! wrapping, and best-effort teardown.

use crate::core::db::driver::{Driver, DriverError, Row};
use crate::core::{DataError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use tracing::debug;

/// Connection settings for one database file.
///
/// The `dsn` is the path to the database file and is required; the remaining
/// fields are passed through to the native driver when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectSettings {
    pub dsn: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl ConnectSettings {
    /// Settings consisting of only a DSN.
    pub fn for_dsn(dsn: impl Into<String>) -> Self {
        ConnectSettings {
            dsn: Some(dsn.into()),
            ..ConnectSettings::default()
        }
    }

    /// Comma-joined rendering of the populated fields, used in diagnostics.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(dsn) = &self.dsn {
            parts.push(format!("dsn={}", dsn));
        }
        if let Some(user) = &self.user {
            parts.push(format!("user={}", user));
        }
        if let Some(password) = &self.password {
            parts.push(format!("password={}", password));
        }
        parts.join(",")
    }
}

/// Identifier accepted by the registry: either a bare DSN string or a full
/// settings structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Name(String),
    Settings(ConnectSettings),
}

impl Source {
    /// Resolves to the registry key and the settings to connect with.
    ///
    /// A settings structure without a DSN cannot be keyed and fails with
    /// `InvalidKey`, carrying a rendering of the structure's contents.
    pub(crate) fn resolve(self) -> Result<(String, ConnectSettings)> {
        match self {
            Source::Name(name) => {
                let settings = ConnectSettings::for_dsn(name.clone());
                Ok((name, settings))
            }
            Source::Settings(settings) => match settings.dsn.clone() {
                Some(dsn) => Ok((dsn, settings)),
                None => Err(DataError::InvalidKey(settings.describe())),
            },
        }
    }
}

impl From<&str> for Source {
    fn from(name: &str) -> Self {
        Source::Name(name.to_string())
    }
}

impl From<String> for Source {
    fn from(name: String) -> Self {
        Source::Name(name)
    }
}

impl From<ConnectSettings> for Source {
    fn from(settings: ConnectSettings) -> Self {
        Source::Settings(settings)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Name(name) => f.write_str(name),
            Source::Settings(settings) => f.write_str(&settings.describe()),
        }
    }
}

/// Opens a native driver connection for the given settings.
pub type DriverOpener =
    dyn Fn(&ConnectSettings) -> std::result::Result<Box<dyn Driver>, DriverError> + Send + Sync;

/// A live accessor for one database file.
///
/// Owns the native handle exclusively; obtained through
/// [`crate::Registry::get`], which guarantees at most one live accessor per
/// DSN. Driver access is serialized through an internal lock, so a shared
/// `Arc<DataAccessor>` is safe to use from multiple threads.
pub struct DataAccessor {
    name: String,
    driver: Mutex<Option<Box<dyn Driver>>>,
}

impl DataAccessor {
    /// Opens the native connection. Construction is crate-private so that all
    /// public construction goes through the registry.
    pub(crate) fn open(
        name: impl Into<String>,
        settings: &ConnectSettings,
        opener: &DriverOpener,
    ) -> Result<Self> {
        let name = name.into();
        let driver = opener(settings).map_err(|e| DataError::Connection(e.to_string()))?;
        debug!("Opened connection to {}", name);
        Ok(DataAccessor {
            name,
            driver: Mutex::new(Some(driver)),
        })
    }

    /// Accessor over a pre-built driver, bypassing the opener.
    #[cfg(test)]
    pub(crate) fn with_driver(name: impl Into<String>, driver: Box<dyn Driver>) -> Self {
        DataAccessor {
            name: name.into(),
            driver: Mutex::new(Some(driver)),
        }
    }

    /// The DSN this accessor was opened for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the native handle is still held.
    pub fn is_open(&self) -> bool {
        self.driver
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Executes a statement verbatim and materializes the full result set.
    ///
    /// Callers are responsible for injection safety; the statement is handed
    /// to the driver without parsing or escaping. Native failures come back
    /// as `BadQuery` with the offending statement embedded.
    pub(crate) fn run(&self, statement: &str) -> Result<Vec<Row>> {
        let mut guard = self
            .driver
            .lock()
            .map_err(|_| DataError::Unknown("connection state lock poisoned".to_string()))?;
        let driver = guard
            .as_mut()
            .ok_or_else(|| DataError::Connection(format!("no open connection for {}", self.name)))?;

        debug!("Executing statement against {}", self.name);
        let cursor = driver
            .execute(statement)
            .map_err(|e| bad_query(e, statement))?;

        let mut rows = Vec::new();
        if let Some(mut cursor) = cursor {
            while let Some(row) = cursor.next_row().map_err(|e| bad_query(e, statement))? {
                rows.push(row);
            }
        }
        Ok(rows)
    }

    /// Releases the native handle.
    ///
    /// Best-effort and idempotent: release failures are logged and swallowed,
    /// and the handle slot is cleared regardless of outcome, so a second call
    /// (explicit or from `Drop`) is a no-op.
    pub fn close(&self) {
        let Ok(mut guard) = self.driver.lock() else {
            return;
        };
        if let Some(mut driver) = guard.take() {
            if let Err(e) = driver.close() {
                debug!("Failed to close connection to {}: {}", self.name, e);
            }
        }
    }
}

impl Drop for DataAccessor {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for DataAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataAccessor")
            .field("name", &self.name)
            .field("open", &self.is_open())
            .finish()
    }
}

fn bad_query(error: DriverError, statement: &str) -> DataError {
    DataError::BadQuery(format!("{}, query => {}", error, statement))
}
