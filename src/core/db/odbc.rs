//! ODBC Binding Module
//!
//! Production [`Driver`] implementation over the platform's ODBC driver
//! manager via `odbc-api`, fixed to the Microsoft Access driver descriptor.
//! ODBC is a blocking C API; every call here blocks the calling thread until
//! the driver returns.

use crate::core::db::connection::ConnectSettings;
use crate::core::db::driver::{Cursor, Driver, DriverError, Row, Value};
use odbc_api::{ConnectionOptions, Cursor as OdbcApiCursor, ResultSetMetadata};
use std::sync::Arc;

/// Driver descriptor for the legacy Access file formats.
pub const ACCESS_DRIVER: &str = "Microsoft Access Driver (*.mdb, *.accdb)";

/// A live ODBC connection to one Access database file.
pub struct OdbcDriver {
    conn: Option<odbc_api::Connection<'static>>,
}

impl OdbcDriver {
    /// Opens a connection through the process-wide ODBC environment.
    pub fn open(settings: &ConnectSettings) -> Result<Self, DriverError> {
        let env = odbc_api::environment().map_err(to_driver_error)?;
        let conn = env
            .connect_with_connection_string(
                &connection_string(settings),
                ConnectionOptions::default(),
            )
            .map_err(to_driver_error)?;
        Ok(OdbcDriver { conn: Some(conn) })
    }
}

impl Driver for OdbcDriver {
    fn execute(&mut self, statement: &str) -> Result<Option<Box<dyn Cursor + '_>>, DriverError> {
        let conn = self
            .conn
            .as_ref()
            .ok_or_else(|| DriverError("connection is closed".to_string()))?;
        match conn.execute(statement, ()).map_err(to_driver_error)? {
            Some(mut cursor) => {
                let columns = column_names(&mut cursor);
                Ok(Some(Box::new(OdbcCursor {
                    columns,
                    inner: cursor,
                })))
            }
            None => Ok(None),
        }
    }

    fn close(&mut self) -> Result<(), DriverError> {
        // Dropping the connection hands it back to the driver manager.
        self.conn = None;
        Ok(())
    }
}

/// Builds the Access connection string for the given settings.
pub fn connection_string(settings: &ConnectSettings) -> String {
    let mut parts = vec![format!("DRIVER={{{}}}", ACCESS_DRIVER)];
    if let Some(dsn) = &settings.dsn {
        parts.push(format!("DBQ={}", dsn));
    }
    if let Some(user) = &settings.user {
        parts.push(format!("UID={}", user));
    }
    if let Some(password) = &settings.password {
        parts.push(format!("PWD={}", password));
    }
    parts.join(";")
}

fn to_driver_error(error: odbc_api::Error) -> DriverError {
    DriverError(error.to_string())
}

fn column_names<C: ResultSetMetadata>(cursor: &mut C) -> Arc<[String]> {
    let count = cursor.num_result_cols().unwrap_or(0);
    (1..=count)
        .map(|index| {
            let mut description = odbc_api::ColumnDescription::default();
            let _ = cursor.describe_col(index as u16, &mut description);
            String::from_utf8(description.name).unwrap_or_else(|_| format!("col{}", index - 1))
        })
        .collect::<Vec<_>>()
        .into()
}

struct OdbcCursor<C> {
    columns: Arc<[String]>,
    inner: C,
}

impl<C> Cursor for OdbcCursor<C>
where
    C: OdbcApiCursor,
{
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Row>, DriverError> {
        let Some(mut cursor_row) = self.inner.next_row().map_err(to_driver_error)? else {
            return Ok(None);
        };
        let mut values = Vec::with_capacity(self.columns.len());
        for index in 0..self.columns.len() {
            let mut buffer = Vec::new();
            // Column indices are 1-based in ODBC.
            match cursor_row.get_text((index + 1) as u16, &mut buffer) {
                Ok(true) => {
                    values.push(Value::Text(String::from_utf8_lossy(&buffer).into_owned()))
                }
                Ok(false) => values.push(Value::Null),
                Err(e) => return Err(to_driver_error(e)),
            }
        }
        Ok(Some(Row::new(Arc::clone(&self.columns), values)))
    }
}
