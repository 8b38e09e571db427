//! Progress computation for goals and to-do lists.
//!
//! Task-completion progress and numeric target progress are independent
//! measures and are never conflated: a goal with no tasks has 0% task
//! progress no matter how far along its numeric target is, and vice versa.

use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::models::{Goal, GoalProgressEntry, GoalTask, TodoItem};

/// Completion progress over a list of checkable items.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskProgress {
    /// How many items are ticked off.
    pub completed: usize,
    /// How many items there are.
    pub total: usize,
    /// `100 * completed / total`, or 0 for an empty list.
    pub percent: f64,
}

impl TaskProgress {
    fn of(completed: usize, total: usize) -> Self {
        let percent = if total > 0 {
            100.0 * completed as f64 / total as f64
        } else {
            0.0
        };

        Self {
            completed,
            total,
            percent,
        }
    }
}

/// Completion progress over a goal's breakdown tasks.
pub fn task_progress(tasks: &[GoalTask]) -> TaskProgress {
    let completed = tasks.iter().filter(|task| task.completed).count();

    TaskProgress::of(completed, tasks.len())
}

/// Completion progress over one scope-keyed to-do list.
pub fn todo_progress(items: &[TodoItem]) -> TaskProgress {
    let completed = items.iter().filter(|item| item.completed).count();

    TaskProgress::of(completed, items.len())
}

/// Progress toward a goal's numeric target, as a percentage.
///
/// Returns `None` when the goal has no target or a zero target. The result
/// is not clamped: a value above 100 signals over-achievement, and clamping
/// for progress bars is the display layer's concern.
pub fn target_progress(goal: &Goal) -> Option<f64> {
    let target = goal.target_value.filter(|target| !target.is_zero())?;

    let percent = Decimal::ONE_HUNDRED * goal.current_value / target;

    Some(percent.to_f64().unwrap_or(0.0))
}

/// Order tasks for display: ascending `order_index`, ties broken by
/// insertion order (ascending id).
pub fn ordered_tasks(mut tasks: Vec<GoalTask>) -> Vec<GoalTask> {
    tasks.sort_by_key(|task| (task.order_index, task.id));

    tasks
}

/// The `order_index` to assign to a goal's next task: one past the largest
/// index in use, or 0 for the first task.
pub fn next_order_index(tasks: &[GoalTask]) -> i64 {
    tasks
        .iter()
        .map(|task| task.order_index)
        .max()
        .map_or(0, |max| max + 1)
}

/// Whole days from `today` until the goal's deadline.
///
/// Negative when the deadline has passed, zero on the deadline itself, and
/// `None` when the goal has no deadline.
pub fn days_remaining(goal: &Goal, today: Date) -> Option<i64> {
    goal.deadline
        .map(|deadline| (deadline - today).whole_days())
}

/// The chartable history of a goal's numeric progress: date-ascending
/// `(date, value)` points, ties broken by recording order.
pub fn progress_series(entries: &[GoalProgressEntry]) -> Vec<(Date, Decimal)> {
    let mut entries: Vec<&GoalProgressEntry> = entries.iter().collect();
    entries.sort_by_key(|entry| (entry.date, entry.id));

    entries
        .into_iter()
        .map(|entry| (entry.date, entry.value))
        .collect()
}

#[cfg(test)]
mod goal_tests {
    use rust_decimal::Decimal;
    use time::macros::{date, datetime};

    use crate::models::{
        Goal, GoalCategory, GoalProgressEntry, GoalStatus, GoalTask, TodoItem, UserId,
    };

    use super::{
        days_remaining, next_order_index, ordered_tasks, progress_series, target_progress,
        task_progress, todo_progress,
    };

    fn goal(target_value: Option<Decimal>, current_value: Decimal) -> Goal {
        Goal {
            id: 1,
            owner_id: UserId::new("user-1"),
            title: "Emergency fund".to_owned(),
            description: None,
            category: GoalCategory::Finance,
            target_value,
            current_value,
            unit: Some("IDR".to_owned()),
            deadline: None,
            status: GoalStatus::Active,
            created_at: datetime!(2024-01-01 08:00 +7),
            updated_at: datetime!(2024-01-01 08:00 +7),
        }
    }

    fn task(id: i64, completed: bool, order_index: i64) -> GoalTask {
        GoalTask {
            id,
            goal_id: 1,
            task: format!("step {id}"),
            completed,
            order_index,
        }
    }

    #[test]
    fn task_progress_of_an_empty_list_is_all_zero() {
        let got = task_progress(&[]);

        assert_eq!(got.completed, 0);
        assert_eq!(got.total, 0);
        assert_eq!(got.percent, 0.0);
    }

    #[test]
    fn task_progress_of_all_completed_tasks_is_one_hundred_percent() {
        let tasks = vec![task(1, true, 0), task(2, true, 1), task(3, true, 2)];

        let got = task_progress(&tasks);

        assert_eq!(got.completed, 3);
        assert_eq!(got.total, 3);
        assert_eq!(got.percent, 100.0);
    }

    #[test]
    fn task_progress_counts_only_completed_tasks() {
        let tasks = vec![task(1, true, 0), task(2, false, 1), task(3, false, 2)];

        let got = task_progress(&tasks);

        assert_eq!(got.completed, 1);
        assert_eq!(got.total, 3);
        assert!((got.percent - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn todo_progress_matches_task_progress_semantics() {
        let items = vec![
            TodoItem {
                id: 1,
                owner_id: UserId::new("user-1"),
                storage_key: "todo_daily_2024-03-01".to_owned(),
                text: "water the plants".to_owned(),
                completed: true,
                created_at: datetime!(2024-03-01 08:00 +7),
            },
            TodoItem {
                id: 2,
                owner_id: UserId::new("user-1"),
                storage_key: "todo_daily_2024-03-01".to_owned(),
                text: "file taxes".to_owned(),
                completed: false,
                created_at: datetime!(2024-03-01 08:05 +7),
            },
        ];

        let got = todo_progress(&items);

        assert_eq!(got.completed, 1);
        assert_eq!(got.total, 2);
        assert_eq!(got.percent, 50.0);
    }

    #[test]
    fn target_progress_is_none_without_a_target() {
        assert_eq!(target_progress(&goal(None, Decimal::from(50))), None);
        assert_eq!(
            target_progress(&goal(Some(Decimal::ZERO), Decimal::from(50))),
            None
        );
    }

    #[test]
    fn target_progress_is_a_plain_ratio() {
        let got = target_progress(&goal(Some(Decimal::from(200)), Decimal::from(50)));

        assert_eq!(got, Some(25.0));
    }

    #[test]
    fn target_progress_can_exceed_one_hundred() {
        let got = target_progress(&goal(Some(Decimal::from(100)), Decimal::from(150)));

        assert_eq!(got, Some(150.0));
    }

    #[test]
    fn tasks_order_by_index_then_insertion() {
        let tasks = vec![task(4, false, 2), task(2, false, 0), task(3, false, 2)];

        let got = ordered_tasks(tasks);

        let ids: Vec<i64> = got.iter().map(|task| task.id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
    }

    #[test]
    fn next_order_index_continues_past_the_largest() {
        assert_eq!(next_order_index(&[]), 0);
        assert_eq!(next_order_index(&[task(1, false, 0), task(2, false, 7)]), 8);
    }

    #[test]
    fn days_remaining_is_signed() {
        let mut with_deadline = goal(None, Decimal::ZERO);
        with_deadline.deadline = Some(date!(2024-03-10));

        assert_eq!(days_remaining(&with_deadline, date!(2024-03-03)), Some(7));
        assert_eq!(days_remaining(&with_deadline, date!(2024-03-10)), Some(0));
        assert_eq!(days_remaining(&with_deadline, date!(2024-03-12)), Some(-2));
        assert_eq!(days_remaining(&goal(None, Decimal::ZERO), date!(2024-03-03)), None);
    }

    #[test]
    fn progress_series_is_date_ascending() {
        let entry = |id, date, value: i64| GoalProgressEntry {
            id,
            goal_id: 1,
            date,
            value: Decimal::from(value),
            note: "checkpoint".to_owned(),
            created_at: datetime!(2024-03-01 08:00 +7),
        };
        let entries = vec![
            entry(3, date!(2024-03-20), 80),
            entry(1, date!(2024-03-05), 20),
            entry(2, date!(2024-03-05), 40),
        ];

        let got = progress_series(&entries);

        assert_eq!(
            got,
            vec![
                (date!(2024-03-05), Decimal::from(20)),
                (date!(2024-03-05), Decimal::from(40)),
                (date!(2024-03-20), Decimal::from(80)),
            ]
        );
    }
}
