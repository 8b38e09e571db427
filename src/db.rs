/*! This module defines and implements traits for interacting with the application's database. */

use rusqlite::{Connection, Error, Row};

use crate::stores::sqlite::{
    SQLiteGoalStore, SQLiteGoalTaskStore, SQLiteRolloverStore, SQLiteTodoStore,
    SQLiteTransactionStore,
};

/// A trait for adding an object schema to a database.
pub trait CreateTable {
    /// Create a table for the model.
    ///
    /// # Errors
    /// Returns an error if there is an SQL error.
    fn create_table(connection: &Connection) -> Result<(), Error>;
}

/// A trait for mapping a `rusqlite::Row` from a SQLite database to a
/// concrete rust type.
pub trait MapRow {
    /// The type that the implementation maps rows to.
    type ReturnType;

    /// Convert a table row into `ReturnType`.
    ///
    /// # Errors
    /// Returns an error if a row value cannot be converted.
    fn map_row(row: &Row) -> Result<Self::ReturnType, Error> {
        Self::map_row_with_offset(row, 0)
    }

    /// Convert a table row into `ReturnType`, reading columns starting from
    /// `offset`.
    ///
    /// # Errors
    /// Returns an error if a row value cannot be converted.
    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, Error>;
}

/// Create the tables for all domain models.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    SQLiteTransactionStore::create_table(connection)?;
    SQLiteRolloverStore::create_table(connection)?;
    SQLiteGoalStore::create_table(connection)?;
    SQLiteGoalTaskStore::create_table(connection)?;
    SQLiteTodoStore::create_table(connection)?;

    Ok(())
}
