//! Implements SQLite backed goal and goal task stores.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::{
    Error,
    db::{CreateTable, MapRow},
    goal::next_order_index,
    models::{DatabaseID, Goal, GoalDraft, GoalProgressEntry, GoalStatus, GoalTask, UserId},
    stores::{
        GoalStore, GoalTaskStore,
        sqlite::{decode_datetime, decode_text, encode_datetime},
    },
};

/// Stores goals and their progress history in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteGoalStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteGoalStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn map_progress_row(row: &Row) -> Result<GoalProgressEntry, rusqlite::Error> {
        Ok(GoalProgressEntry {
            id: row.get(0)?,
            goal_id: row.get(1)?,
            date: row.get(2)?,
            value: decode_text(3, row.get(3)?)?,
            note: row.get(4)?,
            created_at: decode_datetime(5, row.get(5)?)?,
        })
    }
}

const GOAL_COLUMNS: &str = "id, owner_id, title, description, category, target_value, \
     current_value, unit, deadline, status, created_at, updated_at";

impl GoalStore for SQLiteGoalStore {
    /// Create a new goal in the database.
    ///
    /// # Errors
    /// Returns an [Error::Persistence] if there is an SQL error.
    fn create(
        &mut self,
        owner: &UserId,
        draft: GoalDraft,
        now: OffsetDateTime,
    ) -> Result<Goal, Error> {
        let timestamp = encode_datetime(now)?;

        let goal = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "INSERT INTO goal \
                 (owner_id, title, description, category, target_value, unit, deadline, \
                  current_value, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, '0', ?8, ?9, ?9)
                 RETURNING {GOAL_COLUMNS}"
            ))?
            .query_row(
                params![
                    owner.as_str(),
                    draft.title,
                    draft.description,
                    draft.category.to_string(),
                    draft.target_value.map(|value| value.to_string()),
                    draft.unit,
                    draft.deadline,
                    GoalStatus::Active.to_string(),
                    timestamp,
                ],
                Self::map_row,
            )?;

        Ok(goal)
    }

    /// Retrieve one of `owner`'s goals by its `id`.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if `id` does not refer to a goal owned
    /// by `owner`, or an [Error::Persistence] on any other SQL error.
    fn get(&self, owner: &UserId, id: DatabaseID) -> Result<Goal, Error> {
        let goal = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {GOAL_COLUMNS} FROM goal WHERE id = ?1 AND owner_id = ?2"
            ))?
            .query_row(params![id, owner.as_str()], Self::map_row)?;

        Ok(goal)
    }

    /// Retrieve `owner`'s goals, newest first.
    ///
    /// # Errors
    /// Returns an [Error::Persistence] if there is an SQL error.
    fn get_all(&self, owner: &UserId, status: Option<GoalStatus>) -> Result<Vec<Goal>, Error> {
        let connection = self.connection.lock().unwrap();

        match status {
            Some(status) => connection
                .prepare(&format!(
                    "SELECT {GOAL_COLUMNS} FROM goal \
                     WHERE owner_id = ?1 AND status = ?2 \
                     ORDER BY created_at DESC, id DESC"
                ))?
                .query_map(params![owner.as_str(), status.to_string()], Self::map_row)?
                .map(|maybe_goal| maybe_goal.map_err(Error::from))
                .collect(),
            None => connection
                .prepare(&format!(
                    "SELECT {GOAL_COLUMNS} FROM goal WHERE owner_id = ?1 \
                     ORDER BY created_at DESC, id DESC"
                ))?
                .query_map(params![owner.as_str()], Self::map_row)?
                .map(|maybe_goal| maybe_goal.map_err(Error::from))
                .collect(),
        }
    }

    /// Replace the user-editable fields of a goal.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if `id` does not refer to a goal owned
    /// by `owner`, or an [Error::Persistence] on any other SQL error.
    fn update_details(
        &mut self,
        owner: &UserId,
        id: DatabaseID,
        draft: GoalDraft,
        now: OffsetDateTime,
    ) -> Result<(), Error> {
        let rows_updated = self.connection.lock().unwrap().execute(
            "UPDATE goal SET title = ?1, description = ?2, category = ?3, target_value = ?4, \
             unit = ?5, deadline = ?6, updated_at = ?7
             WHERE id = ?8 AND owner_id = ?9",
            params![
                draft.title,
                draft.description,
                draft.category.to_string(),
                draft.target_value.map(|value| value.to_string()),
                draft.unit,
                draft.deadline,
                encode_datetime(now)?,
                id,
                owner.as_str(),
            ],
        )?;

        if rows_updated == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    /// Move a goal to `status`.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if `id` does not refer to a goal owned
    /// by `owner`, or an [Error::Persistence] on any other SQL error.
    fn set_status(
        &mut self,
        owner: &UserId,
        id: DatabaseID,
        status: GoalStatus,
        now: OffsetDateTime,
    ) -> Result<(), Error> {
        let rows_updated = self.connection.lock().unwrap().execute(
            "UPDATE goal SET status = ?1, updated_at = ?2 WHERE id = ?3 AND owner_id = ?4",
            params![status.to_string(), encode_datetime(now)?, id, owner.as_str()],
        )?;

        if rows_updated == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    /// Update a goal's current value, keeping a history entry when a note
    /// was attached.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if `id` does not refer to a goal owned
    /// by `owner`, or an [Error::Persistence] on any other SQL error.
    fn record_progress(
        &mut self,
        owner: &UserId,
        id: DatabaseID,
        value: Decimal,
        note: Option<&str>,
        now: OffsetDateTime,
    ) -> Result<(), Error> {
        let connection = self.connection.lock().unwrap();

        let rows_updated = connection.execute(
            "UPDATE goal SET current_value = ?1, updated_at = ?2 \
             WHERE id = ?3 AND owner_id = ?4",
            params![
                value.to_string(),
                encode_datetime(now)?,
                id,
                owner.as_str()
            ],
        )?;

        if rows_updated == 0 {
            return Err(Error::NotFound);
        }

        if let Some(note) = note.filter(|note| !note.trim().is_empty()) {
            connection.execute(
                "INSERT INTO goal_progress (goal_id, date, value, note, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    id,
                    now.date(),
                    value.to_string(),
                    note.trim(),
                    encode_datetime(now)?,
                ],
            )?;
        }

        Ok(())
    }

    /// Retrieve a goal's recorded progress history, oldest first.
    ///
    /// # Errors
    /// Returns an [Error::Persistence] if there is an SQL error.
    fn progress_history(
        &self,
        owner: &UserId,
        goal_id: DatabaseID,
    ) -> Result<Vec<GoalProgressEntry>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT p.id, p.goal_id, p.date, p.value, p.note, p.created_at
                 FROM goal_progress p
                 JOIN goal g ON g.id = p.goal_id
                 WHERE p.goal_id = ?1 AND g.owner_id = ?2
                 ORDER BY p.date ASC, p.id ASC",
            )?
            .query_map(params![goal_id, owner.as_str()], Self::map_progress_row)?
            .map(|maybe_entry| maybe_entry.map_err(Error::from))
            .collect()
    }

    /// Delete a goal along with its tasks and progress history.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if `id` does not refer to a goal owned
    /// by `owner`, or an [Error::Persistence] on any other SQL error.
    fn delete(&mut self, owner: &UserId, id: DatabaseID) -> Result<(), Error> {
        let rows_deleted = self.connection.lock().unwrap().execute(
            "DELETE FROM goal WHERE id = ?1 AND owner_id = ?2",
            params![id, owner.as_str()],
        )?;

        if rows_deleted == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}

impl CreateTable for SQLiteGoalStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS goal (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    owner_id TEXT NOT NULL,
                    title TEXT NOT NULL,
                    description TEXT,
                    category TEXT NOT NULL,
                    target_value TEXT,
                    current_value TEXT NOT NULL DEFAULT '0',
                    unit TEXT,
                    deadline TEXT,
                    status TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                    )",
            (),
        )?;

        connection.execute(
            "CREATE TABLE IF NOT EXISTS goal_progress (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    goal_id INTEGER NOT NULL,
                    date TEXT NOT NULL,
                    value TEXT NOT NULL,
                    note TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    FOREIGN KEY (goal_id) REFERENCES goal (id) ON DELETE CASCADE
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteGoalStore {
    type ReturnType = Goal;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        Ok(Goal {
            id: row.get(offset)?,
            owner_id: UserId::new(row.get::<_, String>(offset + 1)?),
            title: row.get(offset + 2)?,
            description: row.get(offset + 3)?,
            category: decode_text(offset + 4, row.get(offset + 4)?)?,
            target_value: row
                .get::<_, Option<String>>(offset + 5)?
                .map(|value| decode_text(offset + 5, value))
                .transpose()?,
            current_value: decode_text(offset + 6, row.get(offset + 6)?)?,
            unit: row.get(offset + 7)?,
            deadline: row.get(offset + 8)?,
            status: decode_text(offset + 9, row.get(offset + 9)?)?,
            created_at: decode_datetime(offset + 10, row.get(offset + 10)?)?,
            updated_at: decode_datetime(offset + 11, row.get(offset + 11)?)?,
        })
    }
}

/// Stores the breakdown tasks of goals in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteGoalTaskStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteGoalTaskStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn owns_goal(
        connection: &Connection,
        owner: &UserId,
        goal_id: DatabaseID,
    ) -> Result<bool, rusqlite::Error> {
        connection.query_row(
            "SELECT EXISTS (SELECT 1 FROM goal WHERE id = ?1 AND owner_id = ?2)",
            params![goal_id, owner.as_str()],
            |row| row.get(0),
        )
    }
}

impl GoalTaskStore for SQLiteGoalTaskStore {
    /// Add a task to the end of a goal's breakdown.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if `goal_id` does not refer to a goal
    /// owned by `owner`, or an [Error::Persistence] on any other SQL error.
    fn add(&mut self, owner: &UserId, goal_id: DatabaseID, task: &str) -> Result<GoalTask, Error> {
        let existing = self.get_for_goal(owner, goal_id)?;
        let order_index = next_order_index(&existing);

        let connection = self.connection.lock().unwrap();

        if !Self::owns_goal(&connection, owner, goal_id)? {
            return Err(Error::NotFound);
        }

        let task = connection
            .prepare(
                "INSERT INTO goal_task (goal_id, task, completed, order_index)
                 VALUES (?1, ?2, 0, ?3)
                 RETURNING id, goal_id, task, completed, order_index",
            )?
            .query_row(params![goal_id, task.trim(), order_index], Self::map_row)?;

        Ok(task)
    }

    /// Retrieve a goal's tasks in display order.
    ///
    /// An empty vector is returned for goals with no tasks and for goals the
    /// user does not own.
    ///
    /// # Errors
    /// Returns an [Error::Persistence] if there is an SQL error.
    fn get_for_goal(&self, owner: &UserId, goal_id: DatabaseID) -> Result<Vec<GoalTask>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT t.id, t.goal_id, t.task, t.completed, t.order_index
                 FROM goal_task t
                 JOIN goal g ON g.id = t.goal_id
                 WHERE t.goal_id = ?1 AND g.owner_id = ?2
                 ORDER BY t.order_index ASC, t.id ASC",
            )?
            .query_map(params![goal_id, owner.as_str()], Self::map_row)?
            .map(|maybe_task| maybe_task.map_err(Error::from))
            .collect()
    }

    /// Tick a task on or off.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if `task_id` does not refer to a task on
    /// one of `owner`'s goals, or an [Error::Persistence] on any other SQL
    /// error.
    fn set_completed(
        &mut self,
        owner: &UserId,
        task_id: DatabaseID,
        completed: bool,
    ) -> Result<(), Error> {
        let rows_updated = self.connection.lock().unwrap().execute(
            "UPDATE goal_task SET completed = ?1
             WHERE id = ?2
               AND goal_id IN (SELECT id FROM goal WHERE owner_id = ?3)",
            params![completed, task_id, owner.as_str()],
        )?;

        if rows_updated == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    /// Delete a task.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if `task_id` does not refer to a task on
    /// one of `owner`'s goals, or an [Error::Persistence] on any other SQL
    /// error.
    fn delete(&mut self, owner: &UserId, task_id: DatabaseID) -> Result<(), Error> {
        let rows_deleted = self.connection.lock().unwrap().execute(
            "DELETE FROM goal_task
             WHERE id = ?1
               AND goal_id IN (SELECT id FROM goal WHERE owner_id = ?2)",
            params![task_id, owner.as_str()],
        )?;

        if rows_deleted == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}

impl CreateTable for SQLiteGoalTaskStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS goal_task (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    goal_id INTEGER NOT NULL,
                    task TEXT NOT NULL,
                    completed INTEGER NOT NULL DEFAULT 0,
                    order_index INTEGER NOT NULL,
                    FOREIGN KEY (goal_id) REFERENCES goal (id) ON DELETE CASCADE
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteGoalTaskStore {
    type ReturnType = GoalTask;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        Ok(GoalTask {
            id: row.get(offset)?,
            goal_id: row.get(offset + 1)?,
            task: row.get(offset + 2)?,
            completed: row.get(offset + 3)?,
            order_index: row.get(offset + 4)?,
        })
    }
}
