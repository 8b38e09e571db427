//! Application configuration.
//!
//! All date-boundary math in the crate happens in a single fixed reporting
//! timezone so that the ledger, to-do, and goal views agree on "today". The
//! timezone and the rollover day both live here rather than at call sites.

use std::env;

/// The day of the month on which the running balance is zeroed.
pub const DEFAULT_ROLLOVER_DAY: u8 = 28;

/// The canonical name of the reporting timezone.
pub const DEFAULT_REPORTING_TIMEZONE: &str = "Asia/Jakarta";

/// Settings shared by every consumer of the aggregation core.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// The reporting timezone as a canonical timezone name, e.g.
    /// "Asia/Jakarta". Wall-clock "now" is converted into this timezone
    /// before any date-boundary computation.
    pub reporting_timezone: String,

    /// The day of the month on which the salary-cycle rollover runs.
    pub rollover_day: u8,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            reporting_timezone: DEFAULT_REPORTING_TIMEZONE.to_owned(),
            rollover_day: DEFAULT_ROLLOVER_DAY,
        }
    }
}

impl AppConfig {
    /// Build a config from the environment, falling back to the defaults.
    ///
    /// Recognized variables are `PRODUKTIV_TIMEZONE` (a canonical timezone
    /// name) and `PRODUKTIV_ROLLOVER_DAY` (1-28). Values that do not parse
    /// are ignored in favor of the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(timezone) = env::var("PRODUKTIV_TIMEZONE")
            && !timezone.is_empty()
        {
            config.reporting_timezone = timezone;
        }

        if let Ok(day) = env::var("PRODUKTIV_ROLLOVER_DAY")
            && let Ok(day) = day.parse::<u8>()
            && (1..=28).contains(&day)
        {
            config.rollover_day = day;
        }

        config
    }
}
