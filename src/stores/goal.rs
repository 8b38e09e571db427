//! Defines the goal and goal task store traits.

use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::{
    Error,
    models::{DatabaseID, Goal, GoalDraft, GoalProgressEntry, GoalStatus, GoalTask, UserId},
};

/// Handles the creation and retrieval of goals and their progress history.
pub trait GoalStore {
    /// Create a new goal for `owner` with status
    /// [Active](crate::models::GoalStatus::Active) and a zero current value.
    fn create(&mut self, owner: &UserId, draft: GoalDraft, now: OffsetDateTime)
    -> Result<Goal, Error>;

    /// Retrieve one of `owner`'s goals by id.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if `id` does not refer to a goal owned by
    /// `owner`.
    fn get(&self, owner: &UserId, id: DatabaseID) -> Result<Goal, Error>;

    /// Retrieve `owner`'s goals, optionally narrowed to one status, newest
    /// first.
    fn get_all(&self, owner: &UserId, status: Option<GoalStatus>) -> Result<Vec<Goal>, Error>;

    /// Replace the user-editable fields of a goal.
    fn update_details(
        &mut self,
        owner: &UserId,
        id: DatabaseID,
        draft: GoalDraft,
        now: OffsetDateTime,
    ) -> Result<(), Error>;

    /// Move a goal to `status`.
    ///
    /// Any status is reachable from any other; this is an explicit user
    /// action, not a state machine transition.
    fn set_status(
        &mut self,
        owner: &UserId,
        id: DatabaseID,
        status: GoalStatus,
        now: OffsetDateTime,
    ) -> Result<(), Error>;

    /// Update a goal's `current_value`, appending a [GoalProgressEntry] when
    /// the user attached a note.
    fn record_progress(
        &mut self,
        owner: &UserId,
        id: DatabaseID,
        value: Decimal,
        note: Option<&str>,
        now: OffsetDateTime,
    ) -> Result<(), Error>;

    /// Retrieve the recorded progress history of a goal, oldest first.
    fn progress_history(
        &self,
        owner: &UserId,
        goal_id: DatabaseID,
    ) -> Result<Vec<GoalProgressEntry>, Error>;

    /// Delete a goal. Its tasks and progress history go with it.
    fn delete(&mut self, owner: &UserId, id: DatabaseID) -> Result<(), Error>;
}

/// Handles the breakdown tasks attached to goals.
///
/// Task operations are still scoped by owner: a task is only visible or
/// mutable through a goal that `owner` owns.
pub trait GoalTaskStore {
    /// Add a task to the end of a goal's breakdown.
    fn add(&mut self, owner: &UserId, goal_id: DatabaseID, task: &str) -> Result<GoalTask, Error>;

    /// Retrieve a goal's tasks in display order (ascending `order_index`,
    /// ties by insertion order).
    fn get_for_goal(&self, owner: &UserId, goal_id: DatabaseID) -> Result<Vec<GoalTask>, Error>;

    /// Tick a task on or off.
    fn set_completed(
        &mut self,
        owner: &UserId,
        task_id: DatabaseID,
        completed: bool,
    ) -> Result<(), Error>;

    /// Delete a task.
    fn delete(&mut self, owner: &UserId, task_id: DatabaseID) -> Result<(), Error>;
}
