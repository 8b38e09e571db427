//! SQLite backed implementations of the store traits.

mod goal;
mod rollover;
mod todo;
mod transaction;

pub use goal::{SQLiteGoalStore, SQLiteGoalTaskStore};
pub use rollover::SQLiteRolloverStore;
pub use todo::SQLiteTodoStore;
pub use transaction::SQLiteTransactionStore;

use std::str::FromStr;

use rusqlite::types::Type;
use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};

/// Encode an instant as a UTC RFC 3339 string with whole-second precision.
///
/// Normalizing to UTC keeps the column values in one fixed-width format, so
/// SQLite's lexicographic TEXT comparison agrees with chronological order.
pub(crate) fn encode_datetime(at: OffsetDateTime) -> Result<String, rusqlite::Error> {
    let utc = at.to_offset(UtcOffset::UTC);
    let utc = utc.replace_nanosecond(0).unwrap_or(utc);

    utc.format(&Rfc3339)
        .map_err(|error| rusqlite::Error::ToSqlConversionFailure(Box::new(error)))
}

/// Decode a column written by [encode_datetime].
pub(crate) fn decode_datetime(
    index: usize,
    value: String,
) -> Result<OffsetDateTime, rusqlite::Error> {
    OffsetDateTime::parse(&value, &Rfc3339).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error))
    })
}

/// Decode a TEXT column through its `FromStr` implementation.
pub(crate) fn decode_text<T>(index: usize, value: String) -> Result<T, rusqlite::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error))
    })
}
