//! Conversion of wall-clock time into the fixed reporting timezone.
//!
//! Every consumer of the aggregators obtains "now" and "today" from here so
//! that all three tabs agree on where the day boundary falls. Nothing else in
//! the crate reads the system clock.

use time::{Date, OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// Look up the UTC offset of `canonical_timezone` at the instant `at`.
///
/// # Errors
/// Returns [Error::InvalidTimezone] if the name is not a canonical timezone.
pub fn reporting_offset(
    canonical_timezone: &str,
    at: OffsetDateTime,
) -> Result<UtcOffset, Error> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&at).to_utc())
        .ok_or_else(|| Error::InvalidTimezone(canonical_timezone.to_owned()))
}

/// The current instant, expressed in the reporting timezone.
///
/// # Errors
/// Returns [Error::InvalidTimezone] if the name is not a canonical timezone.
pub fn now_in(canonical_timezone: &str) -> Result<OffsetDateTime, Error> {
    let now = OffsetDateTime::now_utc();
    let offset = reporting_offset(canonical_timezone, now)?;

    Ok(now.to_offset(offset))
}

/// The current calendar date in the reporting timezone.
///
/// # Errors
/// Returns [Error::InvalidTimezone] if the name is not a canonical timezone.
pub fn today_in(canonical_timezone: &str) -> Result<Date, Error> {
    now_in(canonical_timezone).map(|now| now.date())
}
