// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{Editable, Record, check_amount, fetch_one, not_found_if_zero};
use crate::error::AppError;
use crate::models::Goal;
use crate::utils::decimal_column;

impl Record for Goal {
    const TABLE: &'static str = "goals";
    const COLUMNS: &'static str = "id, user_id, name, target_amount, current_amount, due_date";
    const LABEL: &'static str = "Goal";

    fn from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Goal {
            id: r.get(0)?,
            user_id: r.get(1)?,
            name: r.get(2)?,
            target_amount: decimal_column(r, 3)?,
            current_amount: decimal_column(r, 4)?,
            due_date: r.get(5)?,
        })
    }
}

/// `current_amount` may exceed `target_amount`; an overshot goal is still a goal.
#[derive(Debug, Clone, Deserialize)]
pub struct GoalInput {
    pub name: String,
    pub target_amount: Decimal,
    #[serde(default)]
    pub current_amount: Decimal,
    pub due_date: NaiveDate,
}

impl GoalInput {
    fn validated_name(&self) -> Result<&str, AppError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Goal name is required.".into()));
        }
        if self.target_amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Target amount must be positive.".into(),
            ));
        }
        check_amount(self.target_amount, "Target amount")?;
        check_amount(self.current_amount, "Current amount")?;
        Ok(name)
    }
}

pub fn insert(conn: &Connection, user_id: i64, input: &GoalInput) -> Result<Goal, AppError> {
    let name = input.validated_name()?;
    conn.execute(
        "INSERT INTO goals(user_id, name, target_amount, current_amount, due_date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user_id,
            name,
            input.target_amount.to_string(),
            input.current_amount.to_string(),
            input.due_date
        ],
    )?;
    fetch_one(conn, user_id, conn.last_insert_rowid())
}

pub fn update(conn: &Connection, user_id: i64, id: i64, input: &GoalInput) -> Result<Goal, AppError> {
    let name = input.validated_name()?;
    let n = conn.execute(
        "UPDATE goals SET name=?1, target_amount=?2, current_amount=?3, due_date=?4
         WHERE id=?5 AND user_id=?6",
        params![
            name,
            input.target_amount.to_string(),
            input.current_amount.to_string(),
            input.due_date,
            id,
            user_id
        ],
    )?;
    not_found_if_zero(n, Goal::LABEL)?;
    fetch_one(conn, user_id, id)
}

impl Editable for Goal {
    type Input = GoalInput;

    fn insert(conn: &Connection, user_id: i64, input: &GoalInput) -> Result<Self, AppError> {
        insert(conn, user_id, input)
    }

    fn update(conn: &Connection, user_id: i64, id: i64, input: &GoalInput) -> Result<Self, AppError> {
        update(conn, user_id, id, input)
    }
}
