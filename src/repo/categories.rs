// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{Editable, Record, check_amount, fetch_one, not_found_if_zero};
use crate::error::AppError;
use crate::models::Category;
use crate::utils::opt_decimal_column;

impl Record for Category {
    const TABLE: &'static str = "categories";
    const COLUMNS: &'static str = "id, user_id, name, monthly_limit";
    const LABEL: &'static str = "Category";

    fn from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Category {
            id: r.get(0)?,
            user_id: r.get(1)?,
            name: r.get(2)?,
            monthly_limit: opt_decimal_column(r, 3)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub monthly_limit: Option<Decimal>,
}

impl CategoryInput {
    // A zero limit means "no limit".
    fn validated(&self) -> Result<(&str, Option<String>), AppError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Category name is required.".into()));
        }
        let limit = match self.monthly_limit {
            Some(l) if l < Decimal::ZERO => {
                return Err(AppError::Validation(
                    "Monthly limit cannot be negative.".into(),
                ));
            }
            Some(l) if l.is_zero() => None,
            Some(l) => {
                check_amount(l, "Monthly limit")?;
                Some(l.to_string())
            }
            None => None,
        };
        Ok((name, limit))
    }
}

pub fn insert(conn: &Connection, user_id: i64, input: &CategoryInput) -> Result<Category, AppError> {
    let (name, limit) = input.validated()?;
    conn.execute(
        "INSERT INTO categories(user_id, name, monthly_limit) VALUES (?1, ?2, ?3)",
        params![user_id, name, limit],
    )?;
    fetch_one(conn, user_id, conn.last_insert_rowid())
}

pub fn update(
    conn: &Connection,
    user_id: i64,
    id: i64,
    input: &CategoryInput,
) -> Result<Category, AppError> {
    let (name, limit) = input.validated()?;
    let n = conn.execute(
        "UPDATE categories SET name=?1, monthly_limit=?2 WHERE id=?3 AND user_id=?4",
        params![name, limit, id, user_id],
    )?;
    not_found_if_zero(n, Category::LABEL)?;
    fetch_one(conn, user_id, id)
}

impl Editable for Category {
    type Input = CategoryInput;

    fn insert(conn: &Connection, user_id: i64, input: &CategoryInput) -> Result<Self, AppError> {
        insert(conn, user_id, input)
    }

    fn update(conn: &Connection, user_id: i64, id: i64, input: &CategoryInput) -> Result<Self, AppError> {
        update(conn, user_id, id, input)
    }
}
