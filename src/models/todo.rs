//! The to-do list model.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::models::{DatabaseID, UserId};

/// One entry in a scope-keyed to-do list.
///
/// To-do lists are partitioned by the storage key of a resolved reporting
/// window (see [Window::storage_key](crate::scope::Window::storage_key)), so
/// the daily list for 2024-03-01 is a different list from the one for
/// 2024-03-02, and the weekly list rolls over every Sunday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoItem {
    /// The ID of the item.
    pub id: DatabaseID,
    /// The user that owns this item.
    pub owner_id: UserId,
    /// The window storage key the item belongs to, e.g.
    /// `todo_daily_2024-03-01`.
    pub storage_key: String,
    /// What needs doing.
    pub text: String,
    /// Whether the user has ticked this item off.
    pub completed: bool,
    /// When the item was created.
    pub created_at: OffsetDateTime,
}
