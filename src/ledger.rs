//! Aggregation of transactions into display-ready summaries.
//!
//! This module contains everything related to reporting over the ledger:
//! - Scoped totals and the time-bucketed series behind the finance chart
//! - The all-time global balance
//! - The salary-cycle rollover rule that zeroes the global balance once per
//!   cycle
//!
//! The aggregation functions are pure: they operate on a consistent snapshot
//! of records fetched by the caller and never perform I/O themselves. The one
//! exception is [run_rollover], which orchestrates the at-most-once rollover
//! sequence against the persistence traits.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, UtcOffset};

use crate::{
    Error,
    models::{Transaction, TransactionDraft, TransactionKind, UserId},
    scope::{Scope, Window},
    stores::{RolloverStore, TransactionStore},
};

/// The sentinel category meaning "do not filter by category".
pub const CATEGORY_ALL: &str = "all";

/// The category assigned to transactions synthesized by the rollover rule.
pub const ROLLOVER_CATEGORY: &str = "auto-reset";

/// One slot of a time-bucketed series: an hour, a weekday, or a day of the
/// month, with the income and expense recorded in that slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// The display label of the slot, e.g. "14:00", "Mon", or "15".
    pub label: String,
    /// Total income recorded in the slot.
    pub income: Decimal,
    /// Total expense recorded in the slot.
    pub expense: Decimal,
}

impl Bucket {
    fn empty(label: String) -> Self {
        Self {
            label,
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
        }
    }

    fn add(&mut self, record: &Transaction) {
        match record.kind {
            TransactionKind::Income => self.income += record.amount,
            TransactionKind::Expense => self.expense += record.amount,
        }
    }
}

/// The summary of one reporting window, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    /// Sum of all income amounts in the window.
    pub total_income: Decimal,
    /// Sum of all expense amounts in the window.
    pub total_expense: Decimal,
    /// `total_income - total_expense`. Scoped to the window; not to be
    /// confused with [global_balance].
    pub balance: Decimal,
    /// The chartable series: one bucket per hour with records for daily
    /// windows, always 7 buckets for weekly windows, always
    /// days-in-month buckets for monthly windows.
    pub series: Vec<Bucket>,
}

/// Reduce `records` to the summary of `window`.
///
/// Records are filtered to those whose `occurred_at` falls inside the window
/// (by reporting-timezone calendar date) and, if `category_filter` is set
/// and not the sentinel [CATEGORY_ALL], to the matching category. The
/// aggregator always returns a summary; an empty record set produces zeroed
/// totals and an empty or zero-filled series.
pub fn aggregate(
    records: &[Transaction],
    window: &Window,
    reporting_offset: UtcOffset,
    category_filter: Option<&str>,
) -> LedgerSummary {
    let category_filter = category_filter.filter(|category| *category != CATEGORY_ALL);

    let in_window: Vec<&Transaction> = records
        .iter()
        .filter(|record| window.contains(record.occurred_at, reporting_offset))
        .filter(|record| category_filter.is_none_or(|category| record.category == category))
        .collect();

    let total_income: Decimal = in_window
        .iter()
        .filter(|record| record.kind == TransactionKind::Income)
        .map(|record| record.amount)
        .sum();
    let total_expense: Decimal = in_window
        .iter()
        .filter(|record| record.kind == TransactionKind::Expense)
        .map(|record| record.amount)
        .sum();

    LedgerSummary {
        total_income,
        total_expense,
        balance: total_income - total_expense,
        series: bucket_series(&in_window, window, reporting_offset),
    }
}

fn bucket_series(
    records: &[&Transaction],
    window: &Window,
    reporting_offset: UtcOffset,
) -> Vec<Bucket> {
    match window.scope {
        Scope::Daily => {
            // One bucket per distinct hour with records, ascending.
            let mut by_hour = std::collections::BTreeMap::new();

            for record in records {
                let hour = record.occurred_at.to_offset(reporting_offset).hour();
                by_hour
                    .entry(hour)
                    .or_insert_with(|| Bucket::empty(format!("{hour:02}:00")))
                    .add(record);
            }

            by_hour.into_values().collect()
        }
        Scope::Weekly => {
            // Always 7 buckets, Sunday through Saturday, zero-filled.
            let mut buckets: Vec<Bucket> = (0..7)
                .map(|day| {
                    let date = window.start + time::Duration::days(day);
                    let weekday = date.weekday().to_string();
                    Bucket::empty(weekday[..3].to_owned())
                })
                .collect();

            for record in records {
                let date = record.occurred_at.to_offset(reporting_offset).date();
                let index = date.weekday().number_days_from_sunday() as usize;
                buckets[index].add(record);
            }

            buckets
        }
        Scope::Monthly => {
            // Always one bucket per day of the month, zero-filled.
            let mut buckets: Vec<Bucket> = (1..=window.days())
                .map(|day| Bucket::empty(day.to_string()))
                .collect();

            for record in records {
                let date = record.occurred_at.to_offset(reporting_offset).date();
                let index = date.day() as usize - 1;
                buckets[index].add(record);
            }

            buckets
        }
    }
}

/// The all-time balance over every record of the user, regardless of window.
///
/// Used for display and as the input to the rollover rule. This is a
/// separate computation from the scoped balance in [LedgerSummary].
pub fn global_balance(records: &[Transaction]) -> Decimal {
    records.iter().map(Transaction::signed_amount).sum()
}

/// The category choices offered by the filter dropdown: [CATEGORY_ALL]
/// followed by the distinct categories of `records` in first-seen order.
pub fn category_list(records: &[Transaction]) -> Vec<String> {
    let mut categories = vec![CATEGORY_ALL.to_owned()];

    for record in records {
        if record.category.is_empty() {
            continue;
        }

        if !categories.contains(&record.category) {
            categories.push(record.category.clone());
        }
    }

    categories
}

// ============================================================================
// ROLLOVER RULE
// ============================================================================

/// The key identifying one instance of the rollover cycle.
///
/// The stored format is the year joined to the zero-based month shifted by
/// the rollover day, e.g. `2024-30` for March 2024 with a day-28 rollover.
pub fn cycle_key(reference: Date, rollover_day: u8) -> String {
    let month_index = reference.month() as u16 - 1;

    format!("{}-{}", reference.year(), month_index + rollover_day as u16)
}

/// What the rollover rule decided for one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct RolloverPlan {
    /// The cycle the rollover belongs to.
    pub cycle_key: String,
    /// The balancing transaction to insert, or `None` when the global
    /// balance is already zero (the cycle is still marked as done).
    pub draft: Option<TransactionDraft>,
}

/// Evaluate the rollover rule for `now` without touching persistence.
///
/// Returns `None` when `now` is not the rollover day. Otherwise the plan
/// holds the cycle key to mark and, when the global balance over `records`
/// is nonzero, one balancing transaction dated `now`: an expense when the
/// balance is positive, an income when it is negative, with
/// `amount = |balance|` and category [ROLLOVER_CATEGORY].
///
/// Callers that apply a plan with a plain check-then-insert must treat the
/// marker check as best-effort: two concurrent sessions can both observe an
/// unmarked cycle and insert duplicate rollovers. [run_rollover] avoids the
/// race by claiming the cycle through [RolloverStore::try_claim] before
/// writing anything.
pub fn plan_rollover(
    records: &[Transaction],
    rollover_day: u8,
    now: OffsetDateTime,
) -> Option<RolloverPlan> {
    if now.date().day() != rollover_day {
        return None;
    }

    let cycle_key = cycle_key(now.date(), rollover_day);
    let balance = global_balance(records);

    let draft = if balance.is_zero() {
        None
    } else {
        let kind = if balance > Decimal::ZERO {
            TransactionKind::Expense
        } else {
            TransactionKind::Income
        };

        Some(TransactionDraft {
            scope: Scope::Monthly,
            kind,
            amount: balance.abs(),
            category: ROLLOVER_CATEGORY.to_owned(),
            note: Some(format!("Automatic balance reset on day {rollover_day}")),
            occurred_at: now,
        })
    };

    Some(RolloverPlan { cycle_key, draft })
}

/// Run the at-most-once rollover sequence for `owner`.
///
/// On the rollover day, claims the current cycle key through
/// [RolloverStore::try_claim] and, if this call won the claim, inserts the
/// balancing transaction computed from the user's full ledger. Returns the
/// inserted transaction, or `None` when nothing was done (off-day, cycle
/// already claimed, or zero balance).
///
/// The claim is written before the transaction, so a crash between the two
/// skips that cycle's reset rather than ever applying it twice.
///
/// # Errors
/// Propagates [Error::Persistence] from the underlying stores unchanged.
pub fn run_rollover<T, R>(
    transactions: &mut T,
    rollovers: &mut R,
    owner: &UserId,
    rollover_day: u8,
    now: OffsetDateTime,
) -> Result<Option<Transaction>, Error>
where
    T: TransactionStore,
    R: RolloverStore,
{
    if now.date().day() != rollover_day {
        return Ok(None);
    }

    let key = cycle_key(now.date(), rollover_day);

    if !rollovers.try_claim(owner, &key)? {
        tracing::debug!("rollover cycle {key} already claimed for user {owner}");
        return Ok(None);
    }

    let records = transactions.get_all(owner)?;
    let Some(plan) = plan_rollover(&records, rollover_day, now) else {
        return Ok(None);
    };

    match plan.draft {
        Some(draft) => {
            tracing::info!(
                "applying balance rollover of {} for user {owner} in cycle {key}",
                draft.amount
            );

            transactions.create(owner, draft).map(Some)
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod ledger_tests {
    use rust_decimal::Decimal;
    use time::macros::{date, datetime, offset};
    use time::{OffsetDateTime, UtcOffset};

    use crate::{
        models::{Transaction, TransactionKind, UserId},
        scope::{Scope, Window},
    };

    use super::{
        Bucket, CATEGORY_ALL, ROLLOVER_CATEGORY, aggregate, category_list, cycle_key,
        global_balance, plan_rollover,
    };

    const JAKARTA: UtcOffset = offset!(+7);

    fn record(
        id: i64,
        kind: TransactionKind,
        amount: i64,
        category: &str,
        occurred_at: OffsetDateTime,
    ) -> Transaction {
        Transaction {
            id,
            owner_id: UserId::new("user-1"),
            scope: Scope::Monthly,
            kind,
            amount: Decimal::from(amount),
            category: category.to_owned(),
            note: None,
            occurred_at,
        }
    }

    fn march_records() -> Vec<Transaction> {
        vec![
            record(
                1,
                TransactionKind::Income,
                1_000,
                "salary",
                datetime!(2024-03-01 09:00 +7),
            ),
            record(
                2,
                TransactionKind::Expense,
                400,
                "food",
                datetime!(2024-03-02 12:30 +7),
            ),
            record(
                3,
                TransactionKind::Expense,
                100,
                "transport",
                datetime!(2024-03-15 18:00 +7),
            ),
        ]
    }

    #[test]
    fn monthly_summary_matches_the_march_example() {
        let window = Window::monthly(date!(2024-03-10), 0);

        let summary = aggregate(&march_records(), &window, JAKARTA, None);

        assert_eq!(summary.total_income, Decimal::from(1_000));
        assert_eq!(summary.total_expense, Decimal::from(500));
        assert_eq!(summary.balance, Decimal::from(500));
        assert_eq!(summary.series.len(), 31);
        assert_eq!(summary.series[1].expense, Decimal::from(400));
        assert_eq!(summary.series[14].expense, Decimal::from(100));
        assert_eq!(summary.series[0].income, Decimal::from(1_000));
        assert_eq!(summary.series[2].income, Decimal::ZERO);
        assert_eq!(summary.series[2].expense, Decimal::ZERO);
    }

    #[test]
    fn records_outside_the_window_are_ignored() {
        let window = Window::monthly(date!(2024-04-10), 0);

        let summary = aggregate(&march_records(), &window, JAKARTA, None);

        assert_eq!(summary.total_income, Decimal::ZERO);
        assert_eq!(summary.total_expense, Decimal::ZERO);
        assert_eq!(summary.balance, Decimal::ZERO);
        assert_eq!(summary.series.len(), 30);
    }

    #[test]
    fn balance_is_exactly_income_minus_expense() {
        let records = vec![
            record(
                1,
                TransactionKind::Income,
                0,
                "misc",
                datetime!(2024-03-01 09:00 +7),
            ),
            Transaction {
                amount: "0.1".parse().unwrap(),
                ..record(
                    2,
                    TransactionKind::Income,
                    0,
                    "misc",
                    datetime!(2024-03-01 10:00 +7),
                )
            },
            Transaction {
                amount: "0.2".parse().unwrap(),
                ..record(
                    3,
                    TransactionKind::Expense,
                    0,
                    "misc",
                    datetime!(2024-03-01 11:00 +7),
                )
            },
        ];
        let window = Window::monthly(date!(2024-03-10), 0);

        let summary = aggregate(&records, &window, JAKARTA, None);

        assert_eq!(summary.total_income, "0.1".parse().unwrap());
        assert_eq!(summary.total_expense, "0.2".parse().unwrap());
        assert_eq!(summary.balance, "-0.1".parse::<Decimal>().unwrap());
        assert_eq!(
            summary.balance,
            summary.total_income - summary.total_expense
        );
    }

    #[test]
    fn weekly_series_always_has_seven_buckets() {
        // The week of 2024-03-03: only one record, on the Friday.
        let records = vec![record(
            1,
            TransactionKind::Expense,
            250,
            "food",
            datetime!(2024-03-08 19:00 +7),
        )];
        let window = Window::weekly(date!(2024-03-06), 0);

        let summary = aggregate(&records, &window, JAKARTA, None);

        assert_eq!(summary.series.len(), 7);
        assert_eq!(summary.series[0].label, "Sun");
        assert_eq!(summary.series[6].label, "Sat");
        assert_eq!(summary.series[5].expense, Decimal::from(250));

        let empty: Vec<&Bucket> = summary
            .series
            .iter()
            .filter(|bucket| bucket.income.is_zero() && bucket.expense.is_zero())
            .collect();
        assert_eq!(empty.len(), 6);
    }

    #[test]
    fn daily_series_has_one_bucket_per_distinct_hour_ascending() {
        let records = vec![
            record(
                1,
                TransactionKind::Expense,
                50,
                "food",
                datetime!(2024-03-01 21:15 +7),
            ),
            record(
                2,
                TransactionKind::Income,
                500,
                "salary",
                datetime!(2024-03-01 08:00 +7),
            ),
            record(
                3,
                TransactionKind::Expense,
                30,
                "food",
                datetime!(2024-03-01 08:45 +7),
            ),
        ];
        let window = Window::daily(date!(2024-03-01));

        let summary = aggregate(&records, &window, JAKARTA, None);

        assert_eq!(summary.series.len(), 2);
        assert_eq!(summary.series[0].label, "08:00");
        assert_eq!(summary.series[0].income, Decimal::from(500));
        assert_eq!(summary.series[0].expense, Decimal::from(30));
        assert_eq!(summary.series[1].label, "21:00");
        assert_eq!(summary.series[1].expense, Decimal::from(50));
    }

    #[test]
    fn category_filter_narrows_totals_and_series() {
        let window = Window::monthly(date!(2024-03-10), 0);

        let summary = aggregate(&march_records(), &window, JAKARTA, Some("food"));

        assert_eq!(summary.total_income, Decimal::ZERO);
        assert_eq!(summary.total_expense, Decimal::from(400));
        assert_eq!(summary.series[1].expense, Decimal::from(400));
        assert_eq!(summary.series[14].expense, Decimal::ZERO);
    }

    #[test]
    fn the_all_sentinel_disables_the_category_filter() {
        let window = Window::monthly(date!(2024-03-10), 0);

        let unfiltered = aggregate(&march_records(), &window, JAKARTA, None);
        let sentinel = aggregate(&march_records(), &window, JAKARTA, Some(CATEGORY_ALL));

        assert_eq!(unfiltered, sentinel);
    }

    #[test]
    fn global_balance_ignores_windows() {
        let mut records = march_records();
        records.push(record(
            4,
            TransactionKind::Income,
            2_000,
            "salary",
            datetime!(2023-11-28 09:00 +7),
        ));

        assert_eq!(global_balance(&records), Decimal::from(2_500));
    }

    #[test]
    fn category_list_starts_with_the_sentinel() {
        let got = category_list(&march_records());

        assert_eq!(got, vec!["all", "salary", "food", "transport"]);
    }

    #[test]
    fn cycle_keys_embed_the_adjusted_month() {
        assert_eq!(cycle_key(date!(2024-03-28), 28), "2024-30");
        assert_eq!(cycle_key(date!(2024-01-28), 28), "2024-28");
        assert_eq!(cycle_key(date!(2024-12-28), 28), "2024-39");
    }

    #[test]
    fn no_rollover_off_the_rollover_day() {
        let plan = plan_rollover(&march_records(), 28, datetime!(2024-03-27 09:00 +7));

        assert_eq!(plan, None);
    }

    #[test]
    fn rollover_with_zero_balance_marks_the_cycle_without_a_transaction() {
        let records = vec![
            record(
                1,
                TransactionKind::Income,
                700,
                "salary",
                datetime!(2024-03-01 09:00 +7),
            ),
            record(
                2,
                TransactionKind::Expense,
                700,
                "food",
                datetime!(2024-03-02 12:00 +7),
            ),
        ];

        let plan = plan_rollover(&records, 28, datetime!(2024-03-28 09:00 +7)).unwrap();

        assert_eq!(plan.cycle_key, "2024-30");
        assert_eq!(plan.draft, None);
    }

    #[test]
    fn positive_balance_plans_a_balancing_expense() {
        let records = vec![record(
            1,
            TransactionKind::Income,
            150_000,
            "salary",
            datetime!(2024-03-01 09:00 +7),
        )];

        let plan = plan_rollover(&records, 28, datetime!(2024-03-28 09:00 +7)).unwrap();
        let draft = plan.draft.unwrap();

        assert_eq!(draft.kind, TransactionKind::Expense);
        assert_eq!(draft.amount, Decimal::from(150_000));
        assert_eq!(draft.category, ROLLOVER_CATEGORY);
    }

    #[test]
    fn negative_balance_plans_a_balancing_income() {
        let records = vec![record(
            1,
            TransactionKind::Expense,
            40_000,
            "rent",
            datetime!(2024-03-01 09:00 +7),
        )];

        let plan = plan_rollover(&records, 28, datetime!(2024-03-28 09:00 +7)).unwrap();
        let draft = plan.draft.unwrap();

        assert_eq!(draft.kind, TransactionKind::Income);
        assert_eq!(draft.amount, Decimal::from(40_000));
    }
}
