//! Defines the transaction store trait.

use std::ops::RangeInclusive;

use time::OffsetDateTime;

use crate::{
    Error,
    models::{DatabaseID, Transaction, TransactionDraft, UserId},
    scope::Scope,
};

/// Handles the creation, retrieval, and deletion of transactions.
pub trait TransactionStore {
    /// Create a new transaction for `owner` from a validated draft.
    fn create(&mut self, owner: &UserId, draft: TransactionDraft) -> Result<Transaction, Error>;

    /// Retrieve every transaction of `owner`, in storage order.
    ///
    /// This is the snapshot behind the global balance and the rollover rule.
    fn get_all(&self, owner: &UserId) -> Result<Vec<Transaction>, Error>;

    /// Retrieve `owner`'s transactions in the way defined by `query`.
    fn get_query(&self, owner: &UserId, query: TransactionQuery)
    -> Result<Vec<Transaction>, Error>;

    /// Delete one of `owner`'s transactions.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if `id` does not refer to a transaction
    /// owned by `owner`.
    fn delete(&mut self, owner: &UserId, id: DatabaseID) -> Result<(), Error>;
}

/// Defines how transactions should be fetched from
/// [TransactionStore::get_query].
#[derive(Debug, Default)]
pub struct TransactionQuery {
    /// Include only transactions recorded under this scope.
    pub scope: Option<Scope>,
    /// Include only transactions with this exact category.
    pub category: Option<String>,
    /// Include only transactions that occurred within this range
    /// (inclusive).
    pub occurred_range: Option<RangeInclusive<OffsetDateTime>>,
    /// Orders transactions by `occurred_at` in the order `sort_date`. None
    /// returns transactions in the order they are stored.
    pub sort_date: Option<SortOrder>,
    /// Selects up to the first N (`limit`) transactions.
    pub limit: Option<u64>,
}

/// The order to sort transactions in a [TransactionQuery].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    Descending,
}
