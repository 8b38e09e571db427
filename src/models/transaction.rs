//! This file defines the type `Transaction`, the core type of the ledger
//! part of the application.

use std::{fmt::Display, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, models::DatabaseID, models::UserId, scope::Scope};

/// Whether a transaction adds money to the balance or removes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionKind {
    /// Apply the sign this kind contributes to a balance.
    ///
    /// Income counts positively, expense negatively. Amounts themselves are
    /// always non-negative.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            TransactionKind::Income => amount,
            TransactionKind::Expense => -amount,
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "income"),
            TransactionKind::Expense => write!(f, "expense"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(Error::InvalidKind(other.to_owned())),
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or
/// earned.
///
/// Transactions are immutable once created; the only mutation the app
/// performs on them is deletion. To create a new one, build a
/// [TransactionDraft] and pass it to the transaction store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: DatabaseID,
    /// The user that owns this transaction.
    pub owner_id: UserId,
    /// The reporting tab the transaction was recorded under.
    pub scope: Scope,
    /// Whether this is income or an expense.
    pub kind: TransactionKind,
    /// The amount of money spent or earned. Always non-negative.
    pub amount: Decimal,
    /// A user-defined category, e.g. "food" or "salary".
    pub category: String,
    /// An optional free-text note.
    pub note: Option<String>,
    /// When the transaction happened.
    pub occurred_at: OffsetDateTime,
}

impl Transaction {
    /// The signed contribution of this transaction to a balance.
    pub fn signed_amount(&self) -> Decimal {
        self.kind.signed(self.amount)
    }
}

/// The data needed to create a new [Transaction].
///
/// Drafts are validated on construction: [TransactionDraft::new] rejects
/// negative amounts, so a draft that exists is a draft that can be stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    /// The reporting tab the transaction is recorded under.
    pub scope: Scope,
    /// Whether this is income or an expense.
    pub kind: TransactionKind,
    /// The amount of money spent or earned.
    pub amount: Decimal,
    /// A user-defined category.
    pub category: String,
    /// An optional free-text note.
    pub note: Option<String>,
    /// When the transaction happened.
    pub occurred_at: OffsetDateTime,
}

impl TransactionDraft {
    /// Create a draft for a new transaction.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if `amount` is negative.
    pub fn new(
        scope: Scope,
        kind: TransactionKind,
        amount: Decimal,
        category: impl Into<String>,
        note: Option<String>,
        occurred_at: OffsetDateTime,
    ) -> Result<Self, Error> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(Error::InvalidAmount(amount));
        }

        Ok(Self {
            scope,
            kind,
            amount,
            category: category.into(),
            note,
            occurred_at,
        })
    }
}

#[cfg(test)]
mod transaction_tests {
    use rust_decimal::Decimal;
    use time::macros::datetime;

    use crate::{Error, scope::Scope};

    use super::{TransactionDraft, TransactionKind};

    #[test]
    fn draft_rejects_negative_amount() {
        let got = TransactionDraft::new(
            Scope::Daily,
            TransactionKind::Expense,
            Decimal::from(-500),
            "food",
            None,
            datetime!(2024-03-01 12:00 +7),
        );

        assert_eq!(got, Err(Error::InvalidAmount(Decimal::from(-500))));
    }

    #[test]
    fn draft_accepts_zero_amount() {
        let got = TransactionDraft::new(
            Scope::Daily,
            TransactionKind::Income,
            Decimal::ZERO,
            "misc",
            None,
            datetime!(2024-03-01 12:00 +7),
        );

        assert!(got.is_ok());
    }

    #[test]
    fn sign_is_decided_by_kind_alone() {
        let amount = Decimal::from(1_000);

        assert_eq!(TransactionKind::Income.signed(amount), Decimal::from(1_000));
        assert_eq!(
            TransactionKind::Expense.signed(amount),
            Decimal::from(-1_000)
        );
    }

    #[test]
    fn kind_round_trips_through_strings() {
        assert_eq!("income".parse(), Ok(TransactionKind::Income));
        assert_eq!("expense".parse(), Ok(TransactionKind::Expense));
        assert_eq!(
            "transfer".parse::<TransactionKind>(),
            Err(Error::InvalidKind("transfer".to_owned()))
        );
    }
}
