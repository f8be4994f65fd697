//! Intent planning.
//!
//! Turns a user intent into the store write it requires, or refuses it.
//! Update and delete need a record whose id is present and non-empty;
//! an absent record is a no-op rather than an error.

use city_types::{City, Fields};
use thiserror::Error;

use crate::notice::{Notice, Op};

/// Reasons an intent is refused before reaching the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    /// The record has no usable document id.
    #[error("cannot {op}: missing document id")]
    MissingId {
        /// The refused write.
        op: Op,
    },
}

impl From<IntentError> for Notice {
    fn from(err: IntentError) -> Self {
        match err {
            IntentError::MissingId { op } => Notice::MissingId { op },
        }
    }
}

/// A write to issue against the collection.
#[derive(Debug, Clone, PartialEq)]
pub enum WritePlan {
    /// Create a new document; the store assigns its id.
    Add {
        /// Document body.
        fields: Fields,
    },
    /// Overwrite every field of an existing document.
    Set {
        /// Target document.
        id: String,
        /// New document body.
        fields: Fields,
    },
    /// Remove an existing document.
    Delete {
        /// Target document.
        id: String,
    },
}

impl WritePlan {
    /// The kind of write.
    pub fn op(&self) -> Op {
        match self {
            WritePlan::Add { .. } => Op::Add,
            WritePlan::Set { .. } => Op::Update,
            WritePlan::Delete { .. } => Op::Delete,
        }
    }
}

/// Plan an add. `None` means nothing to do.
pub fn plan_add(city: Option<&City>) -> Option<WritePlan> {
    city.map(|c| WritePlan::Add {
        fields: c.to_persistable(),
    })
}

/// Plan an update, editing the record in place first.
///
/// The new values are applied even when the id check then refuses the write.
pub fn plan_update(
    city: Option<&mut City>,
    name: &str,
    province: &str,
) -> Result<Option<WritePlan>, IntentError> {
    let Some(city) = city else {
        return Ok(None);
    };

    city.set_name(name);
    city.set_province(province);

    let id = city
        .document_id()
        .ok_or(IntentError::MissingId { op: Op::Update })?;

    Ok(Some(WritePlan::Set {
        id: id.to_string(),
        fields: city.to_persistable(),
    }))
}

/// Plan a delete.
pub fn plan_delete(city: &City) -> Result<WritePlan, IntentError> {
    let id = city
        .document_id()
        .ok_or(IntentError::MissingId { op: Op::Delete })?;
    Ok(WritePlan::Delete { id: id.to_string() })
}
