// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, params};
use serde::Deserialize;

use super::{Editable, Record, fetch_one, not_found_if_zero};
use crate::error::AppError;
use crate::models::{Account, AccountType};
use crate::utils::enum_column;

impl Record for Account {
    const TABLE: &'static str = "accounts";
    const COLUMNS: &'static str = "id, user_id, name, type";
    const LABEL: &'static str = "Account";

    fn from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Account {
            id: r.get(0)?,
            user_id: r.get(1)?,
            name: r.get(2)?,
            r#type: enum_column(r, 3)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountInput {
    pub name: String,
    pub r#type: AccountType,
}

impl AccountInput {
    fn validated_name(&self) -> Result<&str, AppError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Account name is required.".into()));
        }
        Ok(name)
    }
}

pub fn insert(conn: &Connection, user_id: i64, input: &AccountInput) -> Result<Account, AppError> {
    let name = input.validated_name()?;
    conn.execute(
        "INSERT INTO accounts(user_id, name, type) VALUES (?1, ?2, ?3)",
        params![user_id, name, input.r#type.as_str()],
    )?;
    fetch_one(conn, user_id, conn.last_insert_rowid())
}

pub fn update(
    conn: &Connection,
    user_id: i64,
    id: i64,
    input: &AccountInput,
) -> Result<Account, AppError> {
    let name = input.validated_name()?;
    let n = conn.execute(
        "UPDATE accounts SET name=?1, type=?2 WHERE id=?3 AND user_id=?4",
        params![name, input.r#type.as_str(), id, user_id],
    )?;
    not_found_if_zero(n, Account::LABEL)?;
    fetch_one(conn, user_id, id)
}

impl Editable for Account {
    type Input = AccountInput;

    fn insert(conn: &Connection, user_id: i64, input: &AccountInput) -> Result<Self, AppError> {
        insert(conn, user_id, input)
    }

    fn update(conn: &Connection, user_id: i64, id: i64, input: &AccountInput) -> Result<Self, AppError> {
        update(conn, user_id, id, input)
    }
}
