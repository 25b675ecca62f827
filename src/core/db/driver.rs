//! Driver Seam Module
//!
//! Defines the narrow boundary between the data accessor and the native
//! database-connectivity layer: a [`Driver`] that executes raw statements and
//! a [`Cursor`] that walks result rows sequentially. The production
//! implementation binds to an ODBC driver manager (see the `odbc` module);
//! tests substitute an in-memory driver behind the same traits.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Error reported by a native driver, carrying the driver's own message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct DriverError(pub String);

/// A single column value as returned by the native layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Double(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Renders the value as a map key, the way a loosely typed array key
    /// would be coerced: numerics print verbatim, text prints as-is.
    pub fn to_key_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Int(i) => i.to_string(),
            Value::Double(d) => d.to_string(),
            Value::Text(s) => s.clone(),
            Value::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_key_string())
    }
}

/// Key of an entry in a shaped result container.
///
/// Mirrors mixed array keys: rows keyed by an explicit column carry that
/// column's value rendered as text, rows without one fall back to their
/// position in the result set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResultKey {
    Position(usize),
    Text(String),
}

impl fmt::Display for ResultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultKey::Position(i) => write!(f, "{}", i),
            ResultKey::Text(s) => f.write_str(s),
        }
    }
}

impl From<usize> for ResultKey {
    fn from(index: usize) -> Self {
        ResultKey::Position(index)
    }
}

impl From<&str> for ResultKey {
    fn from(key: &str) -> Self {
        ResultKey::Text(key.to_string())
    }
}

/// One record of a result set, addressable by column name and by position.
///
/// The column header is shared across all rows of one result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Row { columns, values }
    }

    /// Column names of the result set this row belongs to.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Looks up a value by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.values.get(index)
    }

    /// Looks up a value by position.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Sequential walk over the rows of one executed statement.
pub trait Cursor {
    /// Column names of the result set, in positional order.
    fn columns(&self) -> &[String];

    /// Fetches the next row, or `None` once the cursor is exhausted.
    fn next_row(&mut self) -> Result<Option<Row>, DriverError>;
}

/// A live native connection to one database file.
///
/// The accessor calls exactly three operations on it: execute a raw
/// statement, walk the returned cursor, and close the handle. Statements
/// without a result set (e.g. DELETE) yield no cursor.
pub trait Driver: Send {
    fn execute(&mut self, statement: &str) -> Result<Option<Box<dyn Cursor + '_>>, DriverError>;

    fn close(&mut self) -> Result<(), DriverError>;
}
