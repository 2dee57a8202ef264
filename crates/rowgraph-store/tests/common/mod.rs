//! Shared fixtures: a small bridge-like model set

use rowgraph_core::{Fields, FromFields, Model, Record, Result, Value};
use rowgraph_store::Store;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sender {
    pub id: Option<i64>,
    pub user_id: i64,
    pub nickname: String,
}

impl Model for Sender {
    fn table_name(&self) -> &str {
        "senders"
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn to_record(&self) -> Record {
        Record::new("senders")
            .with_id(self.id)
            .field("user_id", self.user_id)
            .field("nickname", self.nickname.as_str())
    }
}

impl FromFields for Sender {
    fn from_fields(mut fields: Fields) -> Result<Self> {
        Ok(Self {
            id: fields.id(),
            user_id: fields.take_or_default("user_id")?,
            nickname: fields.take_or_default("nickname")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageEvent {
    pub id: Option<i64>,
    pub message_id: i64,
    pub raw: String,
    pub is_group: bool,
    pub sender: Sender,
    pub tags: Vec<String>,
}

impl Model for MessageEvent {
    fn table_name(&self) -> &str {
        "message_events"
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn to_record(&self) -> Record {
        Record::new("message_events")
            .with_id(self.id)
            .field("message_id", self.message_id)
            .field("raw", self.raw.as_str())
            .field("is_group", self.is_group)
            .field("sender", Value::model(&self.sender))
            .field("tags", Value::list(self.tags.iter().cloned()))
    }
}

impl FromFields for MessageEvent {
    fn from_fields(mut fields: Fields) -> Result<Self> {
        Ok(Self {
            id: fields.id(),
            message_id: fields.take_or_default("message_id")?,
            raw: fields.take_or_default("raw")?,
            is_group: fields.take_or_default("is_group")?,
            sender: fields.take_model("sender")?.unwrap_or_default(),
            tags: fields.take_or_default("tags")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    pub id: Option<i64>,
    pub title: String,
    pub members: Vec<Sender>,
}

impl Model for Conversation {
    fn table_name(&self) -> &str {
        "conversations"
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn to_record(&self) -> Record {
        Record::new("conversations")
            .with_id(self.id)
            .field("title", self.title.as_str())
            .field("members", Value::models(&self.members))
    }
}

impl FromFields for Conversation {
    fn from_fields(mut fields: Fields) -> Result<Self> {
        Ok(Self {
            id: fields.id(),
            title: fields.take_or_default("title")?,
            members: fields.take_models("members")?,
        })
    }
}

/// Scalar-only model covering every scalar storage type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserInformation {
    pub id: Option<i64>,
    pub user_id: i64,
    pub nickname: String,
    pub level: i32,
    pub rating: f64,
    pub banned: bool,
    pub avatar: Vec<u8>,
}

impl Model for UserInformation {
    fn table_name(&self) -> &str {
        "user_information"
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn to_record(&self) -> Record {
        Record::new("user_information")
            .with_id(self.id)
            .field("user_id", self.user_id)
            .field("nickname", self.nickname.as_str())
            .field("level", self.level)
            .field("rating", self.rating)
            .field("banned", self.banned)
            .field("avatar", self.avatar.clone())
    }
}

impl FromFields for UserInformation {
    fn from_fields(mut fields: Fields) -> Result<Self> {
        Ok(Self {
            id: fields.id(),
            user_id: fields.take_or_default("user_id")?,
            nickname: fields.take_or_default("nickname")?,
            level: fields.take_or_default("level")?,
            rating: fields.take_or_default("rating")?,
            banned: fields.take_or_default("banned")?,
            avatar: fields.take_or_default("avatar")?,
        })
    }
}

/// Model that forgot to declare its table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Unnamed {
    pub id: Option<i64>,
}

impl Model for Unnamed {
    fn table_name(&self) -> &str {
        ""
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn to_record(&self) -> Record {
        Record::new("").with_id(self.id)
    }
}

impl FromFields for Unnamed {
    fn from_fields(fields: Fields) -> Result<Self> {
        Ok(Self { id: fields.id() })
    }
}

/// In-memory store with every fixture model migrated
#[allow(dead_code)]
pub fn migrated_store() -> Store {
    let store = Store::open_in_memory().expect("Failed to open in-memory store");
    store
        .auto_migrate(&[
            &Sender::default(),
            &MessageEvent::default(),
            &Conversation::default(),
            &UserInformation::default(),
        ])
        .expect("Failed to migrate fixtures");
    store
}

#[allow(dead_code)]
pub fn sender(user_id: i64, nickname: &str) -> Sender {
    Sender {
        id: None,
        user_id,
        nickname: nickname.to_string(),
    }
}

#[allow(dead_code)]
pub fn count_rows(store: &Store, table: &str) -> i64 {
    store
        .connection()
        .query_row(&format!("SELECT COUNT(*) FROM \"{}\"", table), [], |row| {
            row.get(0)
        })
        .expect("Failed to count rows")
}
