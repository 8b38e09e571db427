//! Produktiv is the core of a personal productivity app: a time-scoped
//! ledger for income and expenses, scope-keyed to-do lists, and goal
//! planning with task breakdowns.
//!
//! The library owns the reporting rules: which records belong to "today",
//! "this week", or "this month", how balances and progress percentages are
//! derived, and how the monthly balance rollover is applied exactly once per
//! cycle. Screens, routing, and authentication live in the surrounding
//! application; this crate only consumes an opaque user ID and a persistence
//! layer expressed as the traits in [stores].

#![warn(missing_docs)]

use rust_decimal::Decimal;

pub mod config;
pub mod db;
pub mod goal;
pub mod ledger;
pub mod models;
pub mod scope;
pub mod stores;
pub mod timezone;

pub use config::AppConfig;
pub use db::initialize as initialize_db;
pub use ledger::{LedgerSummary, aggregate, run_rollover};
pub use scope::{Scope, Window, WindowOffset, resolve_window};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A scope kind string did not name one of the supported reporting
    /// scopes (`daily`, `weekly`, `monthly`).
    ///
    /// This error is fatal to the call that produced it; there is nothing to
    /// retry.
    #[error("unrecognized scope kind \"{0}\"")]
    InvalidScope(String),

    /// A transaction kind string was neither `income` nor `expense`.
    #[error("unrecognized transaction kind \"{0}\"")]
    InvalidKind(String),

    /// A goal category string did not name one of the supported categories.
    #[error("unrecognized goal category \"{0}\"")]
    InvalidGoalCategory(String),

    /// A goal status string did not name one of the supported statuses.
    #[error("unrecognized goal status \"{0}\"")]
    InvalidGoalStatus(String),

    /// A transaction was given a negative amount.
    ///
    /// Amounts are always non-negative; whether a transaction adds to or
    /// subtracts from a balance is decided solely by its kind.
    #[error("transaction amounts must not be negative, got {0}")]
    InvalidAmount(Decimal),

    /// An error occurred while resolving a canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// A date string could not be parsed.
    #[error("could not parse date \"{0}\", expected YYYY-MM-DD")]
    InvalidDate(String),

    /// The requested record was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An error occurred while serializing a struct as JSON.
    #[error("could not serialize as JSON: {0}")]
    Serialization(String),

    /// A failure in the persistence collaborator.
    ///
    /// Surfaced to the caller unchanged; the core performs no retries.
    #[error("persistence operation failed: {0}")]
    Persistence(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::Persistence(error)
            }
        }
    }
}
