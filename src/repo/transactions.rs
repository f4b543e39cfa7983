// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use super::{Editable, Record, check_amount, fetch_one, not_found_if_zero};
use crate::error::AppError;
use crate::models::{Transaction, TransactionType};
use crate::utils::{decimal_column, enum_column, parse_timestamp};

impl Record for Transaction {
    const TABLE: &'static str = "transactions";
    const COLUMNS: &'static str =
        "id, user_id, type, amount, description, date, due_date, account_id, category_id";
    const LABEL: &'static str = "Transaction";

    fn from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Transaction {
            id: r.get(0)?,
            user_id: r.get(1)?,
            r#type: enum_column(r, 2)?,
            amount: decimal_column(r, 3)?,
            description: r.get(4)?,
            date: r.get(5)?,
            due_date: r.get(6)?,
            account_id: r.get(7)?,
            category_id: r.get(8)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionInput {
    pub r#type: TransactionType,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub due_date: Option<DateTime<Utc>>,
    pub account_id: i64,
    pub category_id: i64,
}

// Forms send "" for an empty due date.
fn optional_timestamp<'de, D>(d: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(d)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_timestamp(s)
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("{:#}", e))),
    }
}

impl TransactionInput {
    fn validate(&self, conn: &Connection, user_id: i64) -> Result<(), AppError> {
        if self.amount < Decimal::ZERO {
            return Err(AppError::Validation("Amount cannot be negative.".into()));
        }
        check_amount(self.amount, "Amount")?;
        if !owned(conn, "accounts", self.account_id, user_id)? {
            return Err(AppError::Validation("Unknown account.".into()));
        }
        if !owned(conn, "categories", self.category_id, user_id)? {
            return Err(AppError::Validation("Unknown category.".into()));
        }
        Ok(())
    }
}

fn owned(conn: &Connection, table: &str, id: i64, user_id: i64) -> rusqlite::Result<bool> {
    let sql = format!("SELECT 1 FROM {} WHERE id=?1 AND user_id=?2", table);
    Ok(conn
        .query_row(&sql, params![id, user_id], |_| Ok(()))
        .optional()?
        .is_some())
}

pub fn insert(
    conn: &Connection,
    user_id: i64,
    input: &TransactionInput,
) -> Result<Transaction, AppError> {
    input.validate(conn, user_id)?;
    conn.execute(
        "INSERT INTO transactions(user_id, type, amount, description, date, due_date, account_id, category_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            user_id,
            input.r#type.as_str(),
            input.amount.to_string(),
            input.description.trim(),
            input.date,
            input.due_date,
            input.account_id,
            input.category_id
        ],
    )?;
    fetch_one(conn, user_id, conn.last_insert_rowid())
}

pub fn update(
    conn: &Connection,
    user_id: i64,
    id: i64,
    input: &TransactionInput,
) -> Result<Transaction, AppError> {
    input.validate(conn, user_id)?;
    let n = conn.execute(
        "UPDATE transactions SET type=?1, amount=?2, description=?3, date=?4, due_date=?5,
                account_id=?6, category_id=?7
         WHERE id=?8 AND user_id=?9",
        params![
            input.r#type.as_str(),
            input.amount.to_string(),
            input.description.trim(),
            input.date,
            input.due_date,
            input.account_id,
            input.category_id,
            id,
            user_id
        ],
    )?;
    not_found_if_zero(n, Transaction::LABEL)?;
    fetch_one(conn, user_id, id)
}

impl Editable for Transaction {
    type Input = TransactionInput;

    fn insert(conn: &Connection, user_id: i64, input: &TransactionInput) -> Result<Self, AppError> {
        insert(conn, user_id, input)
    }

    fn update(conn: &Connection, user_id: i64, id: i64, input: &TransactionInput) -> Result<Self, AppError> {
        update(conn, user_id, id, input)
    }
}
