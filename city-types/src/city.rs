//! The City record.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::document::{Document, Fields};

/// Field key holding the city name.
pub const FIELD_NAME: &str = "name";

/// Field key holding the province.
pub const FIELD_PROVINCE: &str = "province";

/// A city record.
///
/// `id` is absent until the store has persisted the record. It is document
/// identity and is never part of the persisted fields, which is why serde
/// skips it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    #[serde(skip)]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    province: String,
}

impl City {
    /// Create a record that has not been persisted yet.
    pub fn new(name: impl Into<String>, province: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            province: province.into(),
        }
    }

    /// Create a fully identified record.
    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        province: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            province: province.into(),
        }
    }

    /// Rebuild a record from a stored document.
    ///
    /// Missing or non-string fields become empty strings.
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: Some(doc.id.clone()),
            name: doc.get_str(FIELD_NAME).unwrap_or_default().to_string(),
            province: doc.get_str(FIELD_PROVINCE).unwrap_or_default().to_string(),
        }
    }

    /// The persisted form: `name` and `province` only.
    pub fn to_persistable(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(FIELD_NAME.to_string(), Value::String(self.name.clone()));
        fields.insert(
            FIELD_PROVINCE.to_string(),
            Value::String(self.province.clone()),
        );
        fields
    }

    /// The raw id, which may be empty.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The id if it can address a stored document (present and non-empty).
    pub fn document_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Set or clear the id.
    pub fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    /// City name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the city name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Province name.
    pub fn province(&self) -> &str {
        &self.province
    }

    /// Set the province name.
    pub fn set_province(&mut self, province: impl Into<String>) {
        self.province = province.into();
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.province)
    }
}
