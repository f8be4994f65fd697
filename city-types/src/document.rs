//! Document-store shapes.
//!
//! A collection is a list of schemaless documents, each identified by a
//! store-assigned id. A [`Snapshot`] is the complete, ordered content of a
//! collection at one point in time.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key-value body of a stored document.
pub type Fields = Map<String, Value>;

/// Complete, ordered set of documents delivered to a listener.
pub type Snapshot = Vec<Document>;

/// A stored document: identity plus fields.
///
/// The id is document identity, never one of the fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Store-assigned identity.
    pub id: String,
    /// Document body.
    pub fields: Fields,
}

impl Document {
    /// Create a document from an id and its fields.
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Read a string field.
    ///
    /// Returns `None` when the field is missing or holds a non-string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}
