//! Opaque container blobs
//!
//! A blob is the self-describing serialized form of one container value.
//! Elements are already encoded: scalars as-is, nested models as reference
//! tokens, nested containers as nested blobs. The byte format is JSON with
//! explicit tags so that a reader can tell a token from text that merely
//! looks like one.

use crate::errors::{serialization_error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Serialized container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum Blob {
    List(Vec<Element>),
    Set(Vec<Element>),
    Map(BTreeMap<String, Element>),
}

/// One encoded container element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v", rename_all = "snake_case")]
pub enum Element {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Bool(bool),
    Bytes(#[serde(with = "base64_bytes")] Vec<u8>),
    /// Reference token text
    Ref(String),
    /// Nested blob bytes
    Blob(#[serde(with = "base64_bytes")] Vec<u8>),
}

impl Blob {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| serialization_error("blob_encode", e))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| serialization_error("blob_decode", e))
    }

    /// Every element, in container order (map elements by key)
    pub fn elements(&self) -> Box<dyn Iterator<Item = &Element> + '_> {
        match self {
            Blob::List(items) | Blob::Set(items) => Box::new(items.iter()),
            Blob::Map(map) => Box::new(map.values()),
        }
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}
