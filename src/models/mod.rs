//! The domain models of the productivity app.

mod goal;
mod todo;
mod transaction;

use std::fmt::Display;

use serde::{Deserialize, Serialize};

pub use goal::{Goal, GoalCategory, GoalDraft, GoalProgressEntry, GoalStatus, GoalTask};
pub use todo::TodoItem;
pub use transaction::{Transaction, TransactionDraft, TransactionKind};

/// Alias for the type used for database primary keys.
pub type DatabaseID = i64;

/// The opaque identifier of the user that owns a record.
///
/// Issued by the identity collaborator and treated as an immutable string for
/// the duration of a session. Every persistence call is parameterized by the
/// authenticated `UserId`; it is never derived from record contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Wrap the identifier issued by the identity service.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
