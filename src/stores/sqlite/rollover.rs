//! Implements a SQLite backed rollover marker store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, params};

use crate::{
    Error,
    db::CreateTable,
    models::UserId,
    stores::RolloverStore,
};

/// Stores rollover markers in a SQLite database.
///
/// The `(owner_id, cycle_key)` pair is covered by a unique constraint, so
/// [try_claim](RolloverStore::try_claim) is a single atomic conditional
/// insert rather than a separate check and write.
#[derive(Debug, Clone)]
pub struct SQLiteRolloverStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteRolloverStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl RolloverStore for SQLiteRolloverStore {
    /// Atomically record that the cycle has been rolled over.
    ///
    /// # Errors
    /// Returns an [Error::Persistence] if there is an SQL error.
    fn try_claim(&mut self, owner: &UserId, cycle_key: &str) -> Result<bool, Error> {
        let rows_inserted = self.connection.lock().unwrap().execute(
            "INSERT OR IGNORE INTO month_reset (owner_id, cycle_key) VALUES (?1, ?2)",
            params![owner.as_str(), cycle_key],
        )?;

        Ok(rows_inserted > 0)
    }

    /// Whether a marker exists for the cycle.
    ///
    /// # Errors
    /// Returns an [Error::Persistence] if there is an SQL error.
    fn is_claimed(&self, owner: &UserId, cycle_key: &str) -> Result<bool, Error> {
        let claimed = self.connection.lock().unwrap().query_row(
            "SELECT EXISTS (SELECT 1 FROM month_reset WHERE owner_id = ?1 AND cycle_key = ?2)",
            params![owner.as_str(), cycle_key],
            |row| row.get(0),
        )?;

        Ok(claimed)
    }
}

impl CreateTable for SQLiteRolloverStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS month_reset (
                    owner_id TEXT NOT NULL,
                    cycle_key TEXT NOT NULL,
                    UNIQUE (owner_id, cycle_key)
                    )",
            (),
        )?;

        Ok(())
    }
}
