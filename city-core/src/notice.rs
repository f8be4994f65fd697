//! User-visible notices.
//!
//! Every completed operation, successful or not, ends in exactly one
//! [`Notice`]. The `Display` text is what the front-end shows.

use std::fmt;

/// The kind of write an intent asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Create a new document.
    Add,
    /// Overwrite an existing document.
    Update,
    /// Remove an existing document.
    Delete,
}

impl Op {
    /// Capitalized label used at the start of a notice.
    pub fn label(self) -> &'static str {
        match self {
            Op::Add => "Add",
            Op::Update => "Update",
            Op::Delete => "Delete",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Op::Add => "add",
            Op::Update => "update",
            Op::Delete => "delete",
        };
        f.write_str(verb)
    }
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A document was created.
    Added {
        /// Id the store assigned.
        id: String,
    },
    /// A document was overwritten.
    Updated {
        /// Id of the overwritten document.
        id: String,
    },
    /// A document was removed.
    Deleted {
        /// Id of the removed document.
        id: String,
    },
    /// The store rejected a write.
    WriteFailed {
        /// The write that failed.
        op: Op,
        /// Reason reported by the store.
        reason: String,
    },
    /// An update or delete was attempted on a record without a usable id.
    MissingId {
        /// The refused write.
        op: Op,
    },
    /// The subscription delivered an error instead of a snapshot.
    SubscriptionFailed {
        /// Reason reported by the store.
        reason: String,
    },
}

impl Notice {
    /// Whether this notice reports a failure.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Notice::WriteFailed { .. } | Notice::MissingId { .. } | Notice::SubscriptionFailed { .. }
        )
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Added { .. } => f.write_str("Added"),
            Notice::Updated { .. } => f.write_str("Updated"),
            Notice::Deleted { .. } => f.write_str("Deleted"),
            Notice::WriteFailed { op, reason } => write!(f, "{} failed: {}", op.label(), reason),
            Notice::MissingId { op } => write!(f, "Cannot {}: missing document id", op),
            Notice::SubscriptionFailed { reason } => write!(f, "Store error: {}", reason),
        }
    }
}
