//! Query Shaping Module
//!
//! The public query surface of [`DataAccessor`]: five fetch operations that
//! differ only in how the materialized result set is reshaped, a delete
//! helper, and generated insert/update statements. A blank statement is a
//! no-op for every operation and returns that operation's empty container
//! without touching the native layer.

use crate::core::db::connection::DataAccessor;
use crate::core::db::driver::{ResultKey, Row, Value};
use crate::core::{DataError, Result};
use indexmap::IndexMap;

impl DataAccessor {
    /// Fetches a key/value list.
    ///
    /// The value is taken from `column` (falling back to the first column
    /// when `column` is absent from a row or its value is NULL) and the key
    /// from `key` (falling back to the row's position). Later rows with the
    /// same key overwrite the value while keeping the original position.
    pub fn fetch_list(
        &self,
        query: &str,
        column: Option<&str>,
        key: Option<&str>,
    ) -> Result<IndexMap<ResultKey, Value>> {
        let mut results = IndexMap::new();
        if is_blank(query) {
            return Ok(results);
        }
        for (position, row) in self.run(query)?.into_iter().enumerate() {
            let entry_key = row_key(&row, key, position);
            let value = match column.and_then(|c| row.get(c)).filter(|v| !v.is_null()) {
                Some(v) => v.clone(),
                None => row.get_index(0).cloned().unwrap_or(Value::Null),
            };
            results.insert(entry_key, value);
        }
        Ok(results)
    }

    /// Fetches full rows grouped by the value of the `key` column.
    ///
    /// Rows whose key column is absent or NULL land in their own
    /// positionally keyed group.
    pub fn fetch_assoc(
        &self,
        query: &str,
        key: Option<&str>,
    ) -> Result<IndexMap<ResultKey, Vec<Row>>> {
        let mut results: IndexMap<ResultKey, Vec<Row>> = IndexMap::new();
        if is_blank(query) {
            return Ok(results);
        }
        for row in self.run(query)? {
            let entry_key = row_key(&row, key, results.len());
            results.entry(entry_key).or_insert_with(Vec::new).push(row);
        }
        Ok(results)
    }

    /// Fetches all rows as a positionally ordered array.
    pub fn fetch_array(&self, query: &str) -> Result<Vec<Row>> {
        if is_blank(query) {
            return Ok(Vec::new());
        }
        self.run(query)
    }

    /// Fetches the first column of the first row, or `None` when the result
    /// set is empty.
    pub fn fetch_val(&self, query: &str) -> Result<Option<Value>> {
        if is_blank(query) {
            return Ok(None);
        }
        Ok(self
            .run(query)?
            .into_iter()
            .next()
            .and_then(|row| row.into_values().into_iter().next()))
    }

    /// Fetches the first row, or `None` when the result set is empty.
    pub fn fetch_first(&self, query: &str) -> Result<Option<Row>> {
        if is_blank(query) {
            return Ok(None);
        }
        Ok(self.run(query)?.into_iter().next())
    }

    /// Executes a delete statement. Returns `false` for a blank statement,
    /// `true` on completion. No row-count feedback.
    pub fn delete(&self, query: &str) -> Result<bool> {
        if is_blank(query) {
            return Ok(false);
        }
        self.run(query)?;
        Ok(true)
    }

    /// Inserts one record built from a column/value mapping.
    ///
    /// Identifiers are bracket-quoted and values rendered as SQL literals.
    /// An empty mapping is a no-op and returns `false`.
    pub fn insert(&self, table: &str, values: &[(&str, Value)]) -> Result<bool> {
        if values.is_empty() {
            return Ok(false);
        }
        let columns = values
            .iter()
            .map(|&(column, _)| quote_ident(column))
            .collect::<Vec<_>>()
            .join(", ");
        let literals = values
            .iter()
            .map(|&(column, ref value)| literal(column, value))
            .collect::<Result<Vec<_>>>()?
            .join(", ");
        let statement = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table),
            columns,
            literals
        );
        self.run(&statement)?;
        Ok(true)
    }

    /// Updates records matching `condition` with a column/value mapping.
    ///
    /// `condition` is raw SQL placed after `WHERE`; a blank condition
    /// updates every row. An empty mapping is a no-op and returns `false`.
    pub fn update(&self, table: &str, values: &[(&str, Value)], condition: &str) -> Result<bool> {
        if values.is_empty() {
            return Ok(false);
        }
        let assignments = values
            .iter()
            .map(|&(column, ref value)| {
                Ok(format!(
                    "{} = {}",
                    quote_ident(column),
                    literal(column, value)?
                ))
            })
            .collect::<Result<Vec<_>>>()?
            .join(", ");
        let mut statement = format!("UPDATE {} SET {}", quote_ident(table), assignments);
        if !is_blank(condition) {
            statement.push_str(" WHERE ");
            statement.push_str(condition.trim());
        }
        self.run(&statement)?;
        Ok(true)
    }
}

fn is_blank(query: &str) -> bool {
    query.trim().is_empty()
}

fn row_key(row: &Row, key: Option<&str>, position: usize) -> ResultKey {
    match key.and_then(|k| row.get(k)).filter(|v| !v.is_null()) {
        Some(value) => ResultKey::Text(value.to_key_string()),
        None => ResultKey::Position(position),
    }
}

/// Jet-style bracket quoting; closing brackets inside the name are doubled.
fn quote_ident(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

fn literal(column: &str, value: &Value) -> Result<String> {
    Ok(match value {
        Value::Null => "NULL".to_string(),
        Value::Int(i) => i.to_string(),
        Value::Double(d) => d.to_string(),
        Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Bytes(_) => {
            return Err(DataError::BadQuery(format!(
                "binary value for column {} cannot be rendered as a literal",
                column
            )))
        }
    })
}
