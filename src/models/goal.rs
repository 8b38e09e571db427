//! Models for goal planning: the goal itself, its breakdown tasks, and the
//! recorded history of numeric progress updates.

use std::{fmt::Display, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    models::{DatabaseID, UserId},
};

/// The life area a goal belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalCategory {
    /// Physical and mental health.
    Health,
    /// Money and savings.
    Finance,
    /// Work and professional growth.
    Career,
    /// Learning and study.
    Education,
    /// Everything else.
    Personal,
}

impl Display for GoalCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GoalCategory::Health => "health",
            GoalCategory::Finance => "finance",
            GoalCategory::Career => "career",
            GoalCategory::Education => "education",
            GoalCategory::Personal => "personal",
        };

        write!(f, "{name}")
    }
}

impl FromStr for GoalCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "health" => Ok(GoalCategory::Health),
            "finance" => Ok(GoalCategory::Finance),
            "career" => Ok(GoalCategory::Career),
            "education" => Ok(GoalCategory::Education),
            "personal" => Ok(GoalCategory::Personal),
            other => Err(Error::InvalidGoalCategory(other.to_owned())),
        }
    }
}

/// Where a goal currently sits.
///
/// This is a plain 3-state field, not a state machine: explicit user action
/// can move a goal from any state to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    /// Being worked on.
    Active,
    /// Marked done by the user.
    Completed,
    /// Put away without being deleted.
    Archived,
}

impl Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GoalStatus::Active => "active",
            GoalStatus::Completed => "completed",
            GoalStatus::Archived => "archived",
        };

        write!(f, "{name}")
    }
}

impl FromStr for GoalStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(GoalStatus::Active),
            "completed" => Ok(GoalStatus::Completed),
            "archived" => Ok(GoalStatus::Archived),
            other => Err(Error::InvalidGoalStatus(other.to_owned())),
        }
    }
}

/// A long-running objective with an optional numeric target and a breakdown
/// into sub-tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// The ID of the goal.
    pub id: DatabaseID,
    /// The user that owns this goal.
    pub owner_id: UserId,
    /// A short name for the goal.
    pub title: String,
    /// An optional longer description.
    pub description: Option<String>,
    /// The life area the goal belongs to.
    pub category: GoalCategory,
    /// The numeric target, if the goal has one (e.g. 10_000_000 for a
    /// savings goal).
    pub target_value: Option<Decimal>,
    /// The current numeric value. Defaults to zero.
    pub current_value: Decimal,
    /// The unit of the numeric values, e.g. "IDR" or "km".
    pub unit: Option<String>,
    /// The date the user wants the goal done by.
    pub deadline: Option<Date>,
    /// Where the goal currently sits.
    pub status: GoalStatus,
    /// When the goal was created.
    pub created_at: OffsetDateTime,
    /// When the goal was last changed.
    pub updated_at: OffsetDateTime,
}

/// The user-editable fields of a [Goal], used for both creation and edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalDraft {
    /// A short name for the goal.
    pub title: String,
    /// An optional longer description.
    pub description: Option<String>,
    /// The life area the goal belongs to.
    pub category: GoalCategory,
    /// The numeric target, if the goal has one.
    pub target_value: Option<Decimal>,
    /// The unit of the numeric values.
    pub unit: Option<String>,
    /// The date the user wants the goal done by.
    pub deadline: Option<Date>,
}

/// One step in a goal's breakdown.
///
/// `order_index` defines display order only. Values need not be contiguous;
/// ties are broken by insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalTask {
    /// The ID of the task.
    pub id: DatabaseID,
    /// The goal this task belongs to.
    pub goal_id: DatabaseID,
    /// What needs doing.
    pub task: String,
    /// Whether the user has ticked this task off.
    pub completed: bool,
    /// Relative position among the goal's tasks.
    pub order_index: i64,
}

/// A dated record of a numeric progress update, kept when the user attaches
/// a note to the update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgressEntry {
    /// The ID of the entry.
    pub id: DatabaseID,
    /// The goal this entry belongs to.
    pub goal_id: DatabaseID,
    /// The reporting-timezone date of the update.
    pub date: Date,
    /// The goal's `current_value` as of this update.
    pub value: Decimal,
    /// The user's note.
    pub note: String,
    /// When the entry was recorded.
    pub created_at: OffsetDateTime,
}
