//! Resolution of reporting scopes into canonical date windows.
//!
//! A scope (`daily`, `weekly`, `monthly`) plus an offset resolves to a
//! [Window]: the inclusive date range the ledger and to-do views report
//! over, together with a display label. All resolution happens on dates
//! already expressed in the reporting timezone (see [crate::timezone]); the
//! resolver itself never reads the clock.

use std::{fmt::Display, ops::RangeInclusive, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month, OffsetDateTime, UtcOffset, macros::time};

use crate::Error;

/// The granularity of a reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// One calendar day.
    Daily,
    /// A Sunday-to-Saturday week.
    Weekly,
    /// A calendar month.
    Monthly,
}

impl Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Daily => write!(f, "daily"),
            Scope::Weekly => write!(f, "weekly"),
            Scope::Monthly => write!(f, "monthly"),
        }
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Scope::Daily),
            "weekly" => Ok(Scope::Weekly),
            "monthly" => Ok(Scope::Monthly),
            other => Err(Error::InvalidScope(other.to_owned())),
        }
    }
}

/// How far to move a window from the reference date.
///
/// Daily navigation is intentionally asymmetric with the other two scopes:
/// the UI supplies an absolute calendar date rather than a relative count,
/// so the daily variant carries a [Date]. Weekly and monthly offsets are
/// relative counts where 0 is the current period, negative is the past, and
/// positive is the future. A variant that does not apply to the scope being
/// resolved is ignored in favor of the current period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOffset {
    /// The current period.
    None,
    /// An explicit calendar date (daily only).
    Date(Date),
    /// A count of weeks relative to the current week (weekly only).
    Weeks(i64),
    /// A count of months relative to the current month (monthly only).
    Months(i64),
}

/// A resolved reporting window: an inclusive date range in the reporting
/// timezone plus a human-readable anchor label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    /// The scope this window was resolved for.
    pub scope: Scope,
    /// The first date of the window.
    pub start: Date,
    /// The last date of the window.
    pub end: Date,
    /// A display label for the window, e.g. "March 2024".
    pub label: String,
}

/// Resolve a scope kind given as a string, e.g. from a route or CLI argument.
///
/// See [Window::resolve] for the resolution rules.
///
/// # Errors
/// Returns [Error::InvalidScope] if `kind` is not one of `daily`, `weekly`,
/// or `monthly`. There are no other error conditions.
pub fn resolve_window(
    kind: &str,
    offset: WindowOffset,
    reference_date: Date,
) -> Result<Window, Error> {
    let scope = kind.parse::<Scope>()?;

    Ok(Window::resolve(scope, offset, reference_date))
}

impl Window {
    /// Resolve the canonical window for `scope`.
    ///
    /// - `daily`: the window is the single date selected by a
    ///   [WindowOffset::Date] offset, or `reference_date` itself.
    /// - `weekly`: the Sunday-to-Saturday week containing `reference_date`,
    ///   shifted by [WindowOffset::Weeks] whole weeks.
    /// - `monthly`: the calendar month containing `reference_date`, shifted
    ///   by [WindowOffset::Months] whole months. Variable month lengths and
    ///   leap years are handled.
    pub fn resolve(scope: Scope, offset: WindowOffset, reference_date: Date) -> Self {
        match scope {
            Scope::Daily => {
                let date = match offset {
                    WindowOffset::Date(date) => date,
                    _ => reference_date,
                };

                Self::daily(date)
            }
            Scope::Weekly => {
                let weeks = match offset {
                    WindowOffset::Weeks(weeks) => weeks,
                    _ => 0,
                };

                Self::weekly(reference_date, weeks)
            }
            Scope::Monthly => {
                let months = match offset {
                    WindowOffset::Months(months) => months,
                    _ => 0,
                };

                Self::monthly(reference_date, months)
            }
        }
    }

    /// The window covering the single calendar day `date`.
    pub fn daily(date: Date) -> Self {
        Self {
            scope: Scope::Daily,
            start: date,
            end: date,
            label: format!(
                "{}, {} {} {}",
                date.weekday(),
                date.day(),
                date.month(),
                date.year()
            ),
        }
    }

    /// The Sunday-to-Saturday week containing `reference_date`, shifted by
    /// `offset` whole weeks.
    pub fn weekly(reference_date: Date, offset: i64) -> Self {
        let days_from_sunday = reference_date.weekday().number_days_from_sunday();
        let start =
            reference_date - Duration::days(days_from_sunday as i64) + Duration::weeks(offset);
        let end = start + Duration::days(6);

        let start_month = start.month().to_string();
        let end_month = end.month().to_string();
        let label = format!(
            "{} {} - {} {} {}",
            start.day(),
            &start_month[..3],
            end.day(),
            &end_month[..3],
            end.year()
        );

        Self {
            scope: Scope::Weekly,
            start,
            end,
            label,
        }
    }

    /// The calendar month containing `reference_date`, shifted by `offset`
    /// whole months.
    pub fn monthly(reference_date: Date, offset: i64) -> Self {
        let (year, month) = shift_month(reference_date, offset);
        let last_day = month.length(year);

        let start = Date::from_calendar_date(year, month, 1)
            .expect("the first day of a month is always a valid date");
        let end = Date::from_calendar_date(year, month, last_day)
            .expect("the last day of a month is always a valid date");

        Self {
            scope: Scope::Monthly,
            start,
            end,
            label: format!("{month} {year}"),
        }
    }

    /// Whether the instant `at` falls inside this window.
    ///
    /// Containment is decided on the calendar date of `at` in the reporting
    /// timezone, which makes the bounds equivalent to
    /// `[start 00:00:00, end 23:59:59]` inclusive.
    pub fn contains(&self, at: OffsetDateTime, reporting_offset: UtcOffset) -> bool {
        let date = at.to_offset(reporting_offset).date();

        self.start <= date && date <= self.end
    }

    /// The number of dates in the window.
    pub fn days(&self) -> i64 {
        (self.end - self.start).whole_days() + 1
    }

    /// The window as instants: `[start 00:00:00, end 23:59:59]` in the
    /// reporting timezone, for range queries against the persistence layer.
    pub fn bounds(&self, reporting_offset: UtcOffset) -> RangeInclusive<OffsetDateTime> {
        let start = self.start.midnight().assume_offset(reporting_offset);
        let end = self
            .end
            .with_time(time!(23:59:59))
            .assume_offset(reporting_offset);

        start..=end
    }

    /// A stable key identifying this window, used to partition scope-keyed
    /// data such as to-do lists.
    ///
    /// Daily and weekly keys embed the window's start date
    /// (`todo_daily_2024-03-01`, `todo_weekly_2024-02-25`); monthly keys
    /// embed the year and month (`todo_monthly_2024_03`).
    pub fn storage_key(&self, prefix: &str) -> String {
        match self.scope {
            Scope::Daily => format!("{prefix}_daily_{}", self.start),
            Scope::Weekly => format!("{prefix}_weekly_{}", self.start),
            Scope::Monthly => format!(
                "{prefix}_monthly_{}_{:02}",
                self.start.year(),
                self.start.month() as u8
            ),
        }
    }
}

/// Move `reference` by `offset` whole months, returning the target year and
/// month.
fn shift_month(reference: Date, offset: i64) -> (i32, Month) {
    let months_since_epoch =
        reference.year() as i64 * 12 + (reference.month() as u8 as i64 - 1) + offset;
    let year = months_since_epoch.div_euclid(12) as i32;
    let month = Month::January.nth_next(months_since_epoch.rem_euclid(12) as u8);

    (year, month)
}

#[cfg(test)]
mod scope_tests {
    use time::macros::{date, datetime};
    use time::{Duration, UtcOffset, Weekday};

    use crate::Error;

    use super::{Scope, Window, WindowOffset, resolve_window};

    #[test]
    fn unrecognized_scope_kind_is_rejected() {
        let got = resolve_window("yearly", WindowOffset::None, date!(2024-03-06));

        assert_eq!(got, Err(Error::InvalidScope("yearly".to_owned())));
    }

    #[test]
    fn daily_window_is_the_reference_date() {
        let window = resolve_window("daily", WindowOffset::None, date!(2024-03-06)).unwrap();

        assert_eq!(window.start, date!(2024-03-06));
        assert_eq!(window.end, date!(2024-03-06));
        assert_eq!(window.label, "Wednesday, 6 March 2024");
    }

    #[test]
    fn daily_offset_is_an_absolute_date() {
        // Daily navigation supplies a picked calendar date, not a count.
        let window = Window::resolve(
            Scope::Daily,
            WindowOffset::Date(date!(2023-12-25)),
            date!(2024-03-06),
        );

        assert_eq!(window.start, date!(2023-12-25));
        assert_eq!(window.end, date!(2023-12-25));
    }

    #[test]
    fn weekly_window_starts_on_sunday_and_spans_seven_days() {
        // 2024-03-06 is a Wednesday.
        let window = Window::weekly(date!(2024-03-06), 0);

        assert_eq!(window.start, date!(2024-03-03));
        assert_eq!(window.start.weekday(), Weekday::Sunday);
        assert_eq!(window.end, date!(2024-03-09));
        assert_eq!(window.days(), 7);
    }

    #[test]
    fn weekly_offset_minus_one_is_the_previous_sunday() {
        let this_week = Window::weekly(date!(2024-03-06), 0);
        let last_week = Window::weekly(date!(2024-03-06), -1);

        assert_eq!(last_week.start, this_week.start - Duration::weeks(1));
        assert_eq!(last_week.start, date!(2024-02-25));
        assert_eq!(last_week.days(), 7);
    }

    #[test]
    fn weekly_window_on_a_sunday_starts_that_day() {
        let window = Window::weekly(date!(2024-03-03), 0);

        assert_eq!(window.start, date!(2024-03-03));
    }

    #[test]
    fn monthly_window_covers_the_whole_month() {
        let window = Window::monthly(date!(2024-03-15), 0);

        assert_eq!(window.start, date!(2024-03-01));
        assert_eq!(window.end, date!(2024-03-31));
        assert_eq!(window.days(), 31);
        assert_eq!(window.label, "March 2024");
    }

    #[test]
    fn monthly_window_handles_leap_february() {
        let leap = Window::monthly(date!(2024-02-10), 0);
        let common = Window::monthly(date!(2023-02-10), 0);

        assert_eq!(leap.end, date!(2024-02-29));
        assert_eq!(common.end, date!(2023-02-28));
    }

    #[test]
    fn monthly_offset_crosses_year_boundaries() {
        let previous = Window::monthly(date!(2024-01-15), -1);
        let next = Window::monthly(date!(2024-12-15), 1);

        assert_eq!(previous.start, date!(2023-12-01));
        assert_eq!(previous.end, date!(2023-12-31));
        assert_eq!(next.start, date!(2025-01-01));
        assert_eq!(next.end, date!(2025-01-31));
    }

    #[test]
    fn windows_always_start_before_they_end() {
        for offset in [-25, -1, 0, 1, 25] {
            let weekly = Window::weekly(date!(2024-03-06), offset);
            let monthly = Window::monthly(date!(2024-03-06), offset);

            assert!(weekly.start <= weekly.end);
            assert!(monthly.start <= monthly.end);
            assert_eq!(weekly.days(), 7);
        }
    }

    #[test]
    fn containment_uses_the_reporting_timezone() {
        let window = Window::daily(date!(2024-03-01));
        let jakarta = UtcOffset::from_hms(7, 0, 0).unwrap();

        // 20:00 UTC on Feb 29 is already March 1 in Jakarta.
        assert!(window.contains(datetime!(2024-02-29 20:00 UTC), jakarta));
        // Midday UTC on March 1 still is.
        assert!(window.contains(datetime!(2024-03-01 12:00 UTC), jakarta));
        // 17:00 UTC on March 1 is March 2 in Jakarta.
        assert!(!window.contains(datetime!(2024-03-01 17:00 UTC), jakarta));
    }

    #[test]
    fn bounds_cover_the_whole_last_day() {
        let window = Window::daily(date!(2024-03-01));
        let jakarta = UtcOffset::from_hms(7, 0, 0).unwrap();

        let bounds = window.bounds(jakarta);

        assert_eq!(*bounds.start(), datetime!(2024-03-01 00:00:00 +7));
        assert_eq!(*bounds.end(), datetime!(2024-03-01 23:59:59 +7));
    }

    #[test]
    fn storage_keys_identify_the_window() {
        let daily = Window::daily(date!(2024-03-01));
        let weekly = Window::weekly(date!(2024-03-06), 0);
        let monthly = Window::monthly(date!(2024-03-15), 0);

        assert_eq!(daily.storage_key("todo"), "todo_daily_2024-03-01");
        assert_eq!(weekly.storage_key("todo"), "todo_weekly_2024-03-03");
        assert_eq!(monthly.storage_key("todo"), "todo_monthly_2024_03");
    }

    #[test]
    fn weekly_label_shows_the_range() {
        let window = Window::weekly(date!(2024-03-06), -1);

        assert_eq!(window.label, "25 Feb - 2 Mar 2024");
    }
}
