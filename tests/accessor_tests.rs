//! End-to-end tests for the public accessor surface: registry resolution,
//! result shaping, statement generation, and the error taxonomy, exercised
//! through a scripted in-memory driver behind the public `Driver` seam.

use mdb_access::{
    ConnectSettings, Cursor, DataError, Driver, DriverError, Registry, ResultKey, Row, Value,
};
use std::sync::{Arc, Mutex};

/// Scripted driver serving one fixed result set for every statement.
struct ScriptedDriver {
    columns: Arc<[String]>,
    rows: Vec<Vec<Value>>,
    executed: Arc<Mutex<Vec<String>>>,
}

struct ScriptedCursor {
    columns: Arc<[String]>,
    rows: std::vec::IntoIter<Vec<Value>>,
}

impl Driver for ScriptedDriver {
    fn execute(&mut self, statement: &str) -> Result<Option<Box<dyn Cursor + '_>>, DriverError> {
        self.executed.lock().unwrap().push(statement.to_string());
        Ok(Some(Box::new(ScriptedCursor {
            columns: Arc::clone(&self.columns),
            rows: self.rows.clone().into_iter(),
        })))
    }

    fn close(&mut self) -> Result<(), DriverError> {
        Ok(())
    }
}

impl Cursor for ScriptedCursor {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Row>, DriverError> {
        Ok(self
            .rows
            .next()
            .map(|values| Row::new(Arc::clone(&self.columns), values)))
    }
}

/// Registry whose every accessor serves the given rows; also returns the
/// shared statement log.
fn scripted_registry(
    columns: &[&str],
    rows: Vec<Vec<Value>>,
) -> (Registry, Arc<Mutex<Vec<String>>>) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let columns: Arc<[String]> = Arc::from(
        columns.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
    );
    let executed = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&executed);
    let registry = Registry::with_opener(move |_settings| {
        Ok(Box::new(ScriptedDriver {
            columns: Arc::clone(&columns),
            rows: rows.clone(),
            executed: Arc::clone(&log),
        }) as Box<dyn Driver>)
    });
    (registry, executed)
}

fn people_rows() -> Vec<Vec<Value>> {
    vec![
        vec![Value::Text("a".to_string()), Value::Int(1)],
        vec![Value::Text("b".to_string()), Value::Int(2)],
    ]
}

#[test]
fn registry_deduplicates_accessors_per_dsn() {
    let (registry, _) = scripted_registry(&[], Vec::new());

    let first = registry.get("orders.mdb").unwrap();
    let again = registry.get("orders.mdb").unwrap();
    let other = registry.get("archive.mdb").unwrap();

    assert!(Arc::ptr_eq(&first, &again));
    assert!(!Arc::ptr_eq(&first, &other));
    assert_eq!(registry.len(), 2);
}

#[test]
fn dsn_file_path_becomes_the_accessor_name() {
    let (registry, _) = scripted_registry(&[], Vec::new());

    let file = tempfile::NamedTempFile::new().unwrap();
    let dsn = file.path().to_string_lossy().into_owned();

    let accessor = registry.get(dsn.as_str()).unwrap();
    assert_eq!(accessor.name(), dsn);
}

#[test]
fn settings_without_dsn_are_rejected_with_their_contents() {
    let (registry, _) = scripted_registry(&[], Vec::new());

    let settings = ConnectSettings {
        dsn: None,
        user: Some("admin".to_string()),
        password: Some("secret".to_string()),
    };
    let err = registry.get(settings).unwrap_err();

    assert_eq!(err.code(), 4);
    let message = err.to_string();
    assert!(message.starts_with("Invalid key:"));
    assert!(message.contains("user=admin"));
    assert!(message.contains("password=secret"));
}

#[test]
fn settings_deserialize_from_embedding_config() {
    let settings: ConnectSettings = serde_json::from_str(
        r#"{"dsn": "orders.mdb", "user": "admin", "password": null}"#,
    )
    .unwrap();

    assert_eq!(settings.dsn.as_deref(), Some("orders.mdb"));

    let (registry, _) = scripted_registry(&[], Vec::new());
    let accessor = registry.get(settings).unwrap();
    assert_eq!(accessor.name(), "orders.mdb");
}

#[test]
fn fetch_list_shapes_key_value_pairs() {
    let (registry, _) = scripted_registry(&["name", "id"], people_rows());
    let accessor = registry.get("people.mdb").unwrap();

    let list = accessor
        .fetch_list("SELECT name, id FROM people", Some("id"), Some("name"))
        .unwrap();
    assert_eq!(list.get(&ResultKey::from("a")), Some(&Value::Int(1)));
    assert_eq!(list.get(&ResultKey::from("b")), Some(&Value::Int(2)));

    let defaulted = accessor
        .fetch_list("SELECT name, id FROM people", None, None)
        .unwrap();
    assert_eq!(
        defaulted.get(&ResultKey::from(0)),
        Some(&Value::Text("a".to_string()))
    );
}

#[test]
fn fetch_assoc_groups_full_rows() {
    let rows = vec![
        vec![Value::Int(1), Value::Text("first".to_string())],
        vec![Value::Int(1), Value::Text("second".to_string())],
    ];
    let (registry, _) = scripted_registry(&["id", "label"], rows);
    let accessor = registry.get("grouped.mdb").unwrap();

    let groups = accessor
        .fetch_assoc("SELECT id, label FROM t", Some("id"))
        .unwrap();

    let ones = groups.get(&ResultKey::from("1")).unwrap();
    assert_eq!(ones.len(), 2);
    assert_eq!(ones[0].get("label"), Some(&Value::Text("first".to_string())));
    assert_eq!(
        ones[1].get("label"),
        Some(&Value::Text("second".to_string()))
    );
}

#[test]
fn fetch_val_unwraps_the_scalar() {
    let (registry, _) = scripted_registry(&["count"], vec![vec![Value::Int(12)]]);
    let accessor = registry.get("counts.mdb").unwrap();

    assert_eq!(
        accessor.fetch_val("SELECT COUNT(*) FROM t").unwrap(),
        Some(Value::Int(12))
    );
}

#[test]
fn blank_statements_never_reach_the_driver() {
    let (registry, executed) = scripted_registry(&["id"], vec![vec![Value::Int(1)]]);
    let accessor = registry.get("quiet.mdb").unwrap();

    assert!(accessor.fetch_list("", None, None).unwrap().is_empty());
    assert!(accessor.fetch_assoc("", None).unwrap().is_empty());
    assert!(accessor.fetch_array("  ").unwrap().is_empty());
    assert_eq!(accessor.fetch_val("").unwrap(), None);
    assert_eq!(accessor.fetch_first("").unwrap(), None);
    assert!(!accessor.delete("").unwrap());

    assert!(executed.lock().unwrap().is_empty());
}

#[test]
fn write_helpers_generate_and_execute_statements() {
    let (registry, executed) = scripted_registry(&[], Vec::new());
    let accessor = registry.get("writes.mdb").unwrap();

    accessor
        .insert("people", &[("name", Value::Text("a".to_string()))])
        .unwrap();
    accessor
        .update("people", &[("name", Value::Text("b".to_string()))], "id = 1")
        .unwrap();
    accessor.delete("DELETE FROM people WHERE id = 1").unwrap();

    assert_eq!(
        executed.lock().unwrap().as_slice(),
        [
            "INSERT INTO [people] ([name]) VALUES ('a')",
            "UPDATE [people] SET [name] = 'b' WHERE id = 1",
            "DELETE FROM people WHERE id = 1",
        ]
    );
}

#[test]
fn failing_driver_surfaces_bad_query_with_statement_text() {
    struct FailingDriver;
    impl Driver for FailingDriver {
        fn execute(
            &mut self,
            _statement: &str,
        ) -> Result<Option<Box<dyn Cursor + '_>>, DriverError> {
            Err(DriverError("[ODBC] syntax error".to_string()))
        }
        fn close(&mut self) -> Result<(), DriverError> {
            Ok(())
        }
    }

    let registry = Registry::with_opener(|_| Ok(Box::new(FailingDriver) as Box<dyn Driver>));
    let accessor = registry.get("broken.mdb").unwrap();

    let err = accessor.fetch_array("SELECT * FORM t").unwrap_err();
    match &err {
        DataError::BadQuery(message) => {
            assert!(message.contains("[ODBC] syntax error"));
            assert!(message.contains("SELECT * FORM t"));
        }
        other => panic!("Expected BadQuery, got {:?}", other),
    }
}

#[test]
fn closing_an_accessor_is_idempotent_and_observable() {
    let (registry, _) = scripted_registry(&["id"], vec![vec![Value::Int(1)]]);
    let accessor = registry.get("closable.mdb").unwrap();

    assert!(accessor.is_open());
    accessor.close();
    accessor.close();
    assert!(!accessor.is_open());

    let err = accessor.fetch_array("SELECT id FROM t").unwrap_err();
    assert_eq!(err.code(), 2);
}
