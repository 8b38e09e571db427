//! Implements a SQLite backed transaction store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, params, params_from_iter, types::Value};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{DatabaseID, Transaction, TransactionDraft, UserId},
    stores::{
        TransactionStore,
        sqlite::{decode_datetime, decode_text, encode_datetime},
        transaction::{SortOrder, TransactionQuery},
    },
};

/// Stores transactions in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

const COLUMNS: &str = "id, owner_id, scope, kind, amount, category, note, occurred_at";

impl TransactionStore for SQLiteTransactionStore {
    /// Create a new transaction in the database.
    ///
    /// # Errors
    /// Returns an [Error::Persistence] if there is an SQL error.
    fn create(&mut self, owner: &UserId, draft: TransactionDraft) -> Result<Transaction, Error> {
        let occurred_at = encode_datetime(draft.occurred_at)?;

        let transaction = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "INSERT INTO finance_transaction \
                 (owner_id, scope, kind, amount, category, note, occurred_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                params![
                    owner.as_str(),
                    draft.scope.to_string(),
                    draft.kind.to_string(),
                    draft.amount.to_string(),
                    draft.category,
                    draft.note,
                    occurred_at,
                ],
                Self::map_row,
            )?;

        Ok(transaction)
    }

    /// Retrieve every transaction of `owner` in storage order.
    ///
    /// An empty vector is returned if the user has no transactions.
    ///
    /// # Errors
    /// Returns an [Error::Persistence] if there is an SQL error.
    fn get_all(&self, owner: &UserId) -> Result<Vec<Transaction>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {COLUMNS} FROM finance_transaction WHERE owner_id = :owner_id"
            ))?
            .query_map(&[(":owner_id", owner.as_str())], Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
            .collect()
    }

    /// Query for transactions in the database.
    ///
    /// # Errors
    /// Returns an [Error::Persistence] if there is an SQL error.
    fn get_query(
        &self,
        owner: &UserId,
        query: TransactionQuery,
    ) -> Result<Vec<Transaction>, Error> {
        let mut query_string_parts =
            vec![format!("SELECT {COLUMNS} FROM finance_transaction")];
        let mut where_clause_parts = vec!["owner_id = ?1".to_string()];
        let mut query_parameters = vec![Value::Text(owner.as_str().to_owned())];

        if let Some(scope) = query.scope {
            where_clause_parts.push(format!("scope = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(scope.to_string()));
        }

        if let Some(category) = query.category {
            where_clause_parts.push(format!("category = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(category));
        }

        if let Some(occurred_range) = query.occurred_range {
            where_clause_parts.push(format!(
                "occurred_at BETWEEN ?{} AND ?{}",
                query_parameters.len() + 1,
                query_parameters.len() + 2,
            ));
            query_parameters.push(Value::Text(encode_datetime(*occurred_range.start())?));
            query_parameters.push(Value::Text(encode_datetime(*occurred_range.end())?));
        }

        query_string_parts.push(String::from("WHERE ") + &where_clause_parts.join(" AND "));

        match query.sort_date {
            Some(SortOrder::Ascending) => {
                query_string_parts.push("ORDER BY occurred_at ASC".to_string())
            }
            Some(SortOrder::Descending) => {
                query_string_parts.push("ORDER BY occurred_at DESC".to_string())
            }
            None => {}
        }

        if let Some(limit) = query.limit {
            query_string_parts.push(format!("LIMIT {limit}"));
        }

        let query_string = query_string_parts.join(" ");
        let params = params_from_iter(query_parameters.iter());

        self.connection
            .lock()
            .unwrap()
            .prepare(&query_string)?
            .query_map(params, Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
            .collect()
    }

    /// Delete one of `owner`'s transactions.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if `id` does not refer to a transaction
    /// owned by `owner`, or an [Error::Persistence] on any other SQL error.
    fn delete(&mut self, owner: &UserId, id: DatabaseID) -> Result<(), Error> {
        let rows_deleted = self.connection.lock().unwrap().execute(
            "DELETE FROM finance_transaction WHERE id = ?1 AND owner_id = ?2",
            params![id, owner.as_str()],
        )?;

        if rows_deleted == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}

impl CreateTable for SQLiteTransactionStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS finance_transaction (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    owner_id TEXT NOT NULL,
                    scope TEXT NOT NULL,
                    kind TEXT NOT NULL,
                    amount TEXT NOT NULL,
                    category TEXT NOT NULL,
                    note TEXT,
                    occurred_at TEXT NOT NULL
                    )",
            (),
        )?;

        connection.execute(
            "CREATE INDEX IF NOT EXISTS finance_transaction_owner_occurred
             ON finance_transaction (owner_id, occurred_at)",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteTransactionStore {
    type ReturnType = Transaction;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        Ok(Transaction {
            id: row.get(offset)?,
            owner_id: UserId::new(row.get::<_, String>(offset + 1)?),
            scope: decode_text(offset + 2, row.get(offset + 2)?)?,
            kind: decode_text(offset + 3, row.get(offset + 3)?)?,
            amount: decode_text(offset + 4, row.get(offset + 4)?)?,
            category: row.get(offset + 5)?,
            note: row.get(offset + 6)?,
            occurred_at: decode_datetime(offset + 7, row.get(offset + 7)?)?,
        })
    }
}

#[cfg(test)]
mod sqlite_transaction_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::macros::datetime;

    use crate::{
        Error,
        db::initialize,
        models::{TransactionDraft, TransactionKind, UserId},
        scope::Scope,
        stores::{SortOrder, TransactionQuery, TransactionStore},
    };

    use super::SQLiteTransactionStore;

    fn get_test_store() -> SQLiteTransactionStore {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        SQLiteTransactionStore::new(Arc::new(Mutex::new(connection)))
    }

    fn draft(kind: TransactionKind, amount: &str, category: &str) -> TransactionDraft {
        TransactionDraft::new(
            Scope::Daily,
            kind,
            amount.parse().unwrap(),
            category,
            None,
            datetime!(2024-03-01 10:30 +7),
        )
        .unwrap()
    }

    #[test]
    fn create_round_trips_amounts_exactly() {
        let mut store = get_test_store();
        let owner = UserId::new("user-1");

        let created = store
            .create(&owner, draft(TransactionKind::Expense, "12500.75", "food"))
            .unwrap();

        let all = store.get_all(&owner).unwrap();

        assert_eq!(all, vec![created.clone()]);
        assert_eq!(created.amount, "12500.75".parse::<Decimal>().unwrap());
        assert_eq!(created.kind, TransactionKind::Expense);
        // Stored normalized to UTC, same instant.
        assert_eq!(created.occurred_at, datetime!(2024-03-01 03:30 UTC));
    }

    #[test]
    fn get_all_only_returns_the_owners_records() {
        let mut store = get_test_store();
        let owner = UserId::new("user-1");
        let someone_else = UserId::new("user-2");

        store
            .create(&owner, draft(TransactionKind::Income, "1000", "salary"))
            .unwrap();

        assert_eq!(store.get_all(&someone_else).unwrap(), vec![]);
    }

    #[test]
    fn query_filters_by_scope_and_category() {
        let mut store = get_test_store();
        let owner = UserId::new("user-1");

        let mut weekly = draft(TransactionKind::Expense, "200", "food");
        weekly.scope = Scope::Weekly;
        let weekly = store.create(&owner, weekly).unwrap();
        store
            .create(&owner, draft(TransactionKind::Expense, "300", "food"))
            .unwrap();
        store
            .create(&owner, draft(TransactionKind::Income, "900", "salary"))
            .unwrap();

        let got = store
            .get_query(
                &owner,
                TransactionQuery {
                    scope: Some(Scope::Weekly),
                    category: Some("food".to_owned()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(got, vec![weekly]);
    }

    #[test]
    fn query_filters_by_occurred_range_inclusive() {
        let mut store = get_test_store();
        let owner = UserId::new("user-1");

        let on_boundary = TransactionDraft {
            occurred_at: datetime!(2024-03-02 23:59:59 +7),
            ..draft(TransactionKind::Expense, "50", "food")
        };
        let outside = TransactionDraft {
            occurred_at: datetime!(2024-03-03 00:00:01 +7),
            ..draft(TransactionKind::Expense, "60", "food")
        };
        let on_boundary = store.create(&owner, on_boundary).unwrap();
        store.create(&owner, outside).unwrap();

        let got = store
            .get_query(
                &owner,
                TransactionQuery {
                    occurred_range: Some(
                        datetime!(2024-03-02 00:00:00 +7)..=datetime!(2024-03-02 23:59:59 +7),
                    ),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(got, vec![on_boundary]);
    }

    #[test]
    fn query_sorts_newest_first_and_limits() {
        let mut store = get_test_store();
        let owner = UserId::new("user-1");

        let earlier = TransactionDraft {
            occurred_at: datetime!(2024-03-01 08:00 +7),
            ..draft(TransactionKind::Expense, "10", "food")
        };
        let later = TransactionDraft {
            occurred_at: datetime!(2024-03-01 20:00 +7),
            ..draft(TransactionKind::Expense, "20", "food")
        };
        store.create(&owner, earlier).unwrap();
        let later = store.create(&owner, later).unwrap();

        let got = store
            .get_query(
                &owner,
                TransactionQuery {
                    sort_date: Some(SortOrder::Descending),
                    limit: Some(1),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(got, vec![later]);
    }

    #[test]
    fn delete_fails_for_records_of_other_users() {
        let mut store = get_test_store();
        let owner = UserId::new("user-1");
        let someone_else = UserId::new("user-2");

        let created = store
            .create(&owner, draft(TransactionKind::Expense, "10", "food"))
            .unwrap();

        assert_eq!(
            store.delete(&someone_else, created.id),
            Err(Error::NotFound)
        );
        assert_eq!(store.delete(&owner, created.id), Ok(()));
        assert_eq!(store.get_all(&owner).unwrap(), vec![]);
    }
}
