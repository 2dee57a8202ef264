//! Model instances and their runtime shape

use crate::errors::Result;
use crate::model::fields::Fields;
use crate::model::value::Value;
use std::collections::BTreeMap;

/// Runtime shape of one model instance
///
/// `fields` never contains the identity; it travels separately in `id`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub table: String,
    pub id: Option<i64>,
    pub fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            id: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_id(mut self, id: Option<i64>) -> Self {
        self.id = id;
        self
    }

    /// Add a field; an `id` field is routed to the identity instead
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        if rowgraph_core_types::layout::is_id_column(&name) {
            self.id = value.as_i64();
        } else {
            self.fields.insert(name, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub(crate) fn to_json(&self) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        object.insert("id".to_string(), self.id.into());
        for (name, value) in &self.fields {
            object.insert(name.clone(), value.to_json());
        }
        serde_json::Value::Object(object)
    }
}

/// A persistable application record
///
/// Object safe so heterogeneous instances can be saved and migrated
/// together. A default-constructed instance acts as the model's template.
pub trait Model {
    /// Backing table; an empty name makes the model unpersistable
    fn table_name(&self) -> &str;

    /// Store-assigned identity, `None` until first save
    fn id(&self) -> Option<i64>;

    /// Receive the identity assigned by a save
    fn set_id(&mut self, id: i64);

    /// Snapshot of the instance's fields as values
    fn to_record(&self) -> Record;
}

/// Construct a model from a decoded row mapping
pub trait FromFields: Sized {
    fn from_fields(fields: Fields) -> Result<Self>;
}

/// Models that can be both written and read back by type
pub trait Persistable: Model + FromFields + Default {}

impl<T: Model + FromFields + Default> Persistable for T {}

/// Dynamic records are models of whatever table they name
impl Model for Record {
    fn table_name(&self) -> &str {
        &self.table
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn to_record(&self) -> Record {
        self.clone()
    }
}
