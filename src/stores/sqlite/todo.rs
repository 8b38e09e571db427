//! Implements a SQLite backed to-do list store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, params};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{DatabaseID, TodoItem, UserId},
    stores::{
        TodoStore,
        sqlite::{decode_datetime, encode_datetime},
    },
};

/// Stores scope-keyed to-do lists in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteTodoStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTodoStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

const COLUMNS: &str = "id, owner_id, storage_key, text, completed, created_at";

impl TodoStore for SQLiteTodoStore {
    /// Append an item to the list identified by `storage_key`.
    ///
    /// # Errors
    /// Returns an [Error::Persistence] if there is an SQL error.
    fn add(
        &mut self,
        owner: &UserId,
        storage_key: &str,
        text: &str,
        now: time::OffsetDateTime,
    ) -> Result<TodoItem, Error> {
        let item = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "INSERT INTO todo_item (owner_id, storage_key, text, completed, created_at)
                 VALUES (?1, ?2, ?3, 0, ?4)
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                params![owner.as_str(), storage_key, text.trim(), encode_datetime(now)?],
                Self::map_row,
            )?;

        Ok(item)
    }

    /// Retrieve the list identified by `storage_key`, oldest first.
    ///
    /// # Errors
    /// Returns an [Error::Persistence] if there is an SQL error.
    fn get_for_key(&self, owner: &UserId, storage_key: &str) -> Result<Vec<TodoItem>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {COLUMNS} FROM todo_item \
                 WHERE owner_id = ?1 AND storage_key = ?2 \
                 ORDER BY id ASC"
            ))?
            .query_map(params![owner.as_str(), storage_key], Self::map_row)?
            .map(|maybe_item| maybe_item.map_err(Error::from))
            .collect()
    }

    /// Tick an item on or off.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if `item_id` does not refer to an item
    /// owned by `owner`, or an [Error::Persistence] on any other SQL error.
    fn set_completed(
        &mut self,
        owner: &UserId,
        item_id: DatabaseID,
        completed: bool,
    ) -> Result<(), Error> {
        let rows_updated = self.connection.lock().unwrap().execute(
            "UPDATE todo_item SET completed = ?1 WHERE id = ?2 AND owner_id = ?3",
            params![completed, item_id, owner.as_str()],
        )?;

        if rows_updated == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    /// Delete one item.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if `item_id` does not refer to an item
    /// owned by `owner`, or an [Error::Persistence] on any other SQL error.
    fn delete(&mut self, owner: &UserId, item_id: DatabaseID) -> Result<(), Error> {
        let rows_deleted = self.connection.lock().unwrap().execute(
            "DELETE FROM todo_item WHERE id = ?1 AND owner_id = ?2",
            params![item_id, owner.as_str()],
        )?;

        if rows_deleted == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    /// Delete every item in the list identified by `storage_key`.
    ///
    /// Clearing an already empty list is not an error.
    ///
    /// # Errors
    /// Returns an [Error::Persistence] if there is an SQL error.
    fn clear(&mut self, owner: &UserId, storage_key: &str) -> Result<(), Error> {
        self.connection.lock().unwrap().execute(
            "DELETE FROM todo_item WHERE owner_id = ?1 AND storage_key = ?2",
            params![owner.as_str(), storage_key],
        )?;

        Ok(())
    }
}

impl CreateTable for SQLiteTodoStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS todo_item (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    owner_id TEXT NOT NULL,
                    storage_key TEXT NOT NULL,
                    text TEXT NOT NULL,
                    completed INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL
                    )",
            (),
        )?;

        connection.execute(
            "CREATE INDEX IF NOT EXISTS todo_item_owner_key
             ON todo_item (owner_id, storage_key)",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteTodoStore {
    type ReturnType = TodoItem;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        Ok(TodoItem {
            id: row.get(offset)?,
            owner_id: UserId::new(row.get::<_, String>(offset + 1)?),
            storage_key: row.get(offset + 2)?,
            text: row.get(offset + 3)?,
            completed: row.get(offset + 4)?,
            created_at: decode_datetime(offset + 5, row.get(offset + 5)?)?,
        })
    }
}
