//! Registry Module
//!
//! De-duplicating cache of live accessors, keyed by DSN. Entries are created
//! lazily on first request and kept for the lifetime of the registry; there
//! is no eviction, expiry, or upper bound. The registry is the only public
//! construction path for [`DataAccessor`].

use crate::core::db::connection::{ConnectSettings, DataAccessor, DriverOpener, Source};
use crate::core::db::driver::{Driver, DriverError};
use crate::core::{DataError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Maps each DSN to its single live accessor.
pub struct Registry {
    opener: Box<DriverOpener>,
    entries: Mutex<HashMap<String, Arc<DataAccessor>>>,
}

impl Registry {
    /// Registry backed by the ODBC driver manager.
    #[cfg(feature = "odbc")]
    pub fn new() -> Self {
        Registry::with_opener(|settings: &ConnectSettings| {
            crate::core::db::odbc::OdbcDriver::open(settings)
                .map(|driver| Box::new(driver) as Box<dyn Driver>)
        })
    }

    /// Registry backed by a custom driver opener.
    pub fn with_opener<F>(opener: F) -> Self
    where
        F: Fn(&ConnectSettings) -> std::result::Result<Box<dyn Driver>, DriverError>
            + Send
            + Sync
            + 'static,
    {
        Registry {
            opener: Box::new(opener),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the live accessor for the given identifier, opening one on
    /// first request.
    ///
    /// For a fixed identifier, every caller observes the same instance. The
    /// entry lock is held across the native open, so two concurrent first
    /// requests for one DSN cannot both open a handle. A failed open inserts
    /// nothing; a later call retries.
    pub fn get(&self, source: impl Into<Source>) -> Result<Arc<DataAccessor>> {
        let (key, settings) = source.into().resolve()?;

        let mut entries = self
            .entries
            .lock()
            .map_err(|_| DataError::Unknown("registry lock poisoned".to_string()))?;
        if let Some(existing) = entries.get(&key) {
            return Ok(Arc::clone(existing));
        }

        debug!("No live connection for {}, opening one", key);
        let accessor = Arc::new(DataAccessor::open(key.clone(), &settings, &*self.opener)?);
        entries.insert(key, Arc::clone(&accessor));
        Ok(accessor)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(feature = "odbc")]
impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

/// Process-wide registry backed by the ODBC driver manager.
#[cfg(feature = "odbc")]
pub fn active() -> &'static Registry {
    use once_cell::sync::Lazy;
    static ACTIVE: Lazy<Registry> = Lazy::new(Registry::new);
    &ACTIVE
}

/// Resolves an identifier against the process-wide registry.
#[cfg(feature = "odbc")]
pub fn get(source: impl Into<Source>) -> Result<Arc<DataAccessor>> {
    active().get(source)
}
