//! Defines the to-do list store trait.

use time::OffsetDateTime;

use crate::{
    Error,
    models::{DatabaseID, TodoItem, UserId},
};

/// Handles scope-keyed to-do lists.
///
/// Items are partitioned by the storage key of a resolved reporting window
/// (see [Window::storage_key](crate::scope::Window::storage_key)); each key
/// is an independent list.
pub trait TodoStore {
    /// Append an item to the list identified by `storage_key`.
    fn add(
        &mut self,
        owner: &UserId,
        storage_key: &str,
        text: &str,
        now: OffsetDateTime,
    ) -> Result<TodoItem, Error>;

    /// Retrieve the list identified by `storage_key`, oldest first.
    fn get_for_key(&self, owner: &UserId, storage_key: &str) -> Result<Vec<TodoItem>, Error>;

    /// Tick an item on or off.
    fn set_completed(
        &mut self,
        owner: &UserId,
        item_id: DatabaseID,
        completed: bool,
    ) -> Result<(), Error>;

    /// Delete one item.
    fn delete(&mut self, owner: &UserId, item_id: DatabaseID) -> Result<(), Error>;

    /// Delete every item in the list identified by `storage_key`.
    fn clear(&mut self, owner: &UserId, storage_key: &str) -> Result<(), Error>;
}
