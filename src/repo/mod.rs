// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Typed, user-scoped access to each table.
//!
//! Every read goes through [`fetch_all`], which filters on `user_id` and maps rows
//! into their record type; a malformed stored value is an error, never a panic.
//! [`TableLoader`] wraps that fetch with the `{data, loading, error}` contract
//! used by the page views.

pub mod accounts;
pub mod categories;
pub mod goals;
pub mod investments;
pub mod transactions;
pub mod users;

use rust_decimal::Decimal;
use rusqlite::{Connection, params};
use serde::{Serialize, de::DeserializeOwned};

use crate::db::{self, Db};
use crate::error::AppError;

pub trait Record: Sized + Clone + Send + 'static {
    const TABLE: &'static str;
    /// Column list in the order `from_row` reads them.
    const COLUMNS: &'static str;
    const LABEL: &'static str;

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self>;
}

/// Tables clients write to through a validated input type.
pub trait Editable: Record {
    type Input: DeserializeOwned + Send + 'static;

    fn insert(conn: &Connection, user_id: i64, input: &Self::Input) -> Result<Self, AppError>;
    fn update(
        conn: &Connection,
        user_id: i64,
        id: i64,
        input: &Self::Input,
    ) -> Result<Self, AppError>;
}

pub fn fetch_all<T: Record>(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<T>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE user_id=?1 ORDER BY id",
        T::COLUMNS,
        T::TABLE
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(params![user_id], |r| T::from_row(r))?;
    rows.collect()
}

pub fn fetch_one<T: Record>(conn: &Connection, user_id: i64, id: i64) -> Result<T, AppError> {
    let sql = format!(
        "SELECT {} FROM {} WHERE id=?1 AND user_id=?2",
        T::COLUMNS,
        T::TABLE
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    match stmt.query_row(params![id, user_id], |r| T::from_row(r)) {
        Ok(v) => Ok(v),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(AppError::NotFound(T::LABEL)),
        Err(e) => Err(e.into()),
    }
}

pub fn delete_owned<T: Record>(conn: &Connection, user_id: i64, id: i64) -> Result<(), AppError> {
    let sql = format!("DELETE FROM {} WHERE id=?1 AND user_id=?2", T::TABLE);
    let n = conn.execute(&sql, params![id, user_id])?;
    if n == 0 {
        return Err(AppError::NotFound(T::LABEL));
    }
    Ok(())
}

/// Largest money value a row may hold. Totals of such values stay far inside
/// `Decimal`'s range.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

pub(crate) fn check_amount(value: Decimal, field: &str) -> Result<(), AppError> {
    if value > Decimal::from(MAX_AMOUNT) {
        return Err(AppError::Validation(format!(
            "{} cannot exceed {}.",
            field, MAX_AMOUNT
        )));
    }
    Ok(())
}

pub(crate) fn not_found_if_zero(n: usize, label: &'static str) -> Result<(), AppError> {
    if n == 0 {
        Err(AppError::NotFound(label))
    } else {
        Ok(())
    }
}

/// Rows of one table for one user, with load state.
///
/// A failed load keeps the rows of the last successful one. The loader holds no
/// connection; callers re-run [`TableLoader::load`] when they need fresh rows, or
/// splice mutations in with [`TableLoader::set_data`].
#[derive(Debug, Clone, Serialize)]
pub struct TableLoader<T> {
    pub data: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T: Record> Default for TableLoader<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

impl<T: Record> TableLoader<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, db: &Db, user_id: i64) {
        self.loading = true;
        let fetched = db::run(db, move |conn| Ok(fetch_all::<T>(conn, user_id)?)).await;

        match fetched {
            Ok(rows) => {
                self.data = rows;
                self.error = None;
            }
            Err(e) => {
                log::warn!("loading {} for user {} failed: {}", T::TABLE, user_id, e);
                self.error = Some(e.to_string());
            }
        }
        self.loading = false;
    }

    pub fn set_data<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Vec<T>),
    {
        f(&mut self.data);
    }

    /// Rows, or the load error when there are none to show.
    pub fn into_result(self) -> Result<Vec<T>, AppError> {
        match self.error {
            Some(e) if self.data.is_empty() => Err(AppError::Internal(e)),
            _ => Ok(self.data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, AccountType};

    fn seeded() -> Db {
        let conn = db::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO identities(id, email, password_hash) VALUES (1,'a@x.io','h'), (2,'b@x.io','h');
            INSERT INTO users(id, name, email) VALUES (1,'A','a@x.io'), (2,'B','b@x.io');
            INSERT INTO accounts(user_id, name, type) VALUES (1,'Checking','banking'), (2,'Other','banking'), (1,'Broker','investment');
            "#,
        )
        .unwrap();
        db::shared(conn)
    }

    #[tokio::test]
    async fn load_scopes_rows_to_user() {
        let db = seeded();
        let mut loader = TableLoader::<Account>::new();
        assert!(loader.loading);
        loader.load(&db, 1).await;
        assert!(!loader.loading);
        let names: Vec<_> = loader.data.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Checking", "Broker"]);
        assert_eq!(loader.data[1].r#type, AccountType::Investment);
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_rows() {
        let db = seeded();
        let mut loader = TableLoader::<Account>::new();
        loader.load(&db, 1).await;
        db.lock()
            .unwrap()
            .execute_batch("DROP TABLE transactions; DROP TABLE accounts;")
            .unwrap();
        loader.load(&db, 1).await;
        assert!(loader.error.is_some());
        assert_eq!(loader.data.len(), 2);
        assert!(!loader.loading);
    }

    #[test]
    fn delete_of_foreign_row_is_not_found() {
        let db = seeded();
        let conn = db.lock().unwrap();
        let other: i64 = conn
            .query_row("SELECT id FROM accounts WHERE user_id=2", [], |r| r.get(0))
            .unwrap();
        assert!(matches!(
            delete_owned::<Account>(&conn, 1, other),
            Err(AppError::NotFound("Account"))
        ));
        assert_eq!(fetch_all::<Account>(&conn, 2).unwrap().len(), 1);
    }

    #[test]
    fn set_data_splices_locally() {
        let mut loader = TableLoader::<Account>::new();
        loader.set_data(|rows| {
            rows.push(Account {
                id: 9,
                user_id: 1,
                name: "Cash".into(),
                r#type: AccountType::Banking,
            })
        });
        assert_eq!(loader.data.len(), 1);
    }
}
