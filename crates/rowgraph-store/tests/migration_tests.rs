// Integration tests for template-driven migration

mod common;

use common::{migrated_store, MessageEvent, Sender, Unnamed};
use rowgraph_core::{ExErrorKind, Fields, FromFields, Model, Record, Result, Value};
use rowgraph_store::Store;

#[derive(Debug, Default)]
struct ProfileV1 {
    id: Option<i64>,
    a: i64,
    b: String,
}

impl Model for ProfileV1 {
    fn table_name(&self) -> &str {
        "profiles"
    }
    fn id(&self) -> Option<i64> {
        self.id
    }
    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
    fn to_record(&self) -> Record {
        Record::new("profiles")
            .with_id(self.id)
            .field("a", self.a)
            .field("b", self.b.as_str())
    }
}

#[derive(Debug, Default)]
struct ProfileV2 {
    id: Option<i64>,
    b: String,
    c: f64,
}

impl Model for ProfileV2 {
    fn table_name(&self) -> &str {
        "profiles"
    }
    fn id(&self) -> Option<i64> {
        self.id
    }
    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
    fn to_record(&self) -> Record {
        Record::new("profiles")
            .with_id(self.id)
            .field("b", self.b.as_str())
            .field("c", self.c)
    }
}

impl FromFields for ProfileV2 {
    fn from_fields(mut fields: Fields) -> Result<Self> {
        Ok(Self {
            id: fields.id(),
            b: fields.take("b")?,
            c: fields.take("c")?,
        })
    }
}

fn column_names(store: &Store, table: &str) -> Vec<String> {
    store
        .columns(table)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect()
}

#[test]
fn test_migration_is_idempotent() {
    // Given: A store migrated once
    let store = migrated_store();
    let before = column_names(&store, "message_events");

    // When: The same templates are migrated again
    let reports = store
        .auto_migrate(&[&Sender::default(), &MessageEvent::default()])
        .unwrap();

    // Then: Nothing changed
    assert!(reports.iter().all(|r| r.is_noop()));
    assert_eq!(column_names(&store, "message_events"), before);
}

#[test]
fn test_columns_carry_storage_prefixes() {
    let store = migrated_store();
    let mut columns = column_names(&store, "message_events");
    columns.sort();

    assert_eq!(
        columns,
        vec![
            "FOREIGN_KEY_sender",
            "PICKLE_BYTES_tags",
            "id",
            "is_group",
            "message_id",
            "raw",
        ]
    );
}

#[test]
fn test_schema_evolution_adds_and_drops() {
    // Given: A table migrated from {a, b} with one row
    let store = Store::open_in_memory().unwrap();
    store.auto_migrate(&[&ProfileV1::default()]).unwrap();
    store
        .save(&mut ProfileV1 {
            id: None,
            a: 1,
            b: "kept".to_string(),
        })
        .unwrap();

    // When: The template becomes {b, c}
    let reports = store.auto_migrate(&[&ProfileV2::default()]).unwrap();

    // Then: c was added, a was dropped
    assert_eq!(reports[0].added, vec!["c".to_string()]);
    assert_eq!(reports[0].dropped, vec!["a".to_string()]);
    assert_eq!(column_names(&store, "profiles"), vec!["id", "b", "c"]);

    // And: The existing row keeps b and reads c as the type default
    let loaded: ProfileV2 = store.where_one("", []).unwrap().unwrap();
    assert_eq!(loaded.b, "kept");
    assert_eq!(loaded.c, 0.0);
    assert_eq!(loaded.id, Some(1));
}

#[test]
fn test_added_reference_column_reads_as_absent() {
    // Given: A sender-less event table with a row in it
    let store = Store::open_in_memory().unwrap();
    store.auto_migrate(&[&Sender::default()]).unwrap();
    let bare = Record::new("message_events").field("raw", "");
    store.auto_migrate(&[&bare]).unwrap();
    store
        .save(&mut Record::new("message_events").field("raw", "old"))
        .unwrap();

    // When: The full template adds the reference and blob columns
    store.auto_migrate(&[&MessageEvent::default()]).unwrap();

    // Then: The old row decodes with defaults for the new fields
    let loaded: MessageEvent = store.where_one("", []).unwrap().unwrap();
    assert_eq!(loaded.raw, "old");
    assert_eq!(loaded.sender, Sender::default());
    assert!(loaded.tags.is_empty());

    let rows = store.fetch_rows("message_events", "", []).unwrap();
    assert_eq!(rows[0].get("sender"), Some(&Value::Null));
}

#[test]
fn test_template_without_table_is_schema_error() {
    let store = Store::open_in_memory().unwrap();

    let err = store.auto_migrate(&[&Unnamed::default()]).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Schema);
    assert_eq!(err.code(), "ERR_SCHEMA");
    assert!(store.tables().unwrap().is_empty());
}
