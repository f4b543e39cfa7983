// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{Record, check_amount, fetch_one, not_found_if_zero};
use crate::error::AppError;
use crate::models::{Investment, InvestmentHistory};
use crate::utils::{decimal_column, is_valid_ticker, opt_decimal_column};

impl Record for Investment {
    const TABLE: &'static str = "investments";
    const COLUMNS: &'static str =
        "id, user_id, ticker, quantity, purchase_price, purchase_date, current_price";
    const LABEL: &'static str = "Investment";

    fn from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Investment {
            id: r.get(0)?,
            user_id: r.get(1)?,
            ticker: r.get(2)?,
            quantity: r.get(3)?,
            purchase_price: decimal_column(r, 4)?,
            purchase_date: r.get(5)?,
            current_price: opt_decimal_column(r, 6)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvestmentInput {
    pub ticker: String,
    pub quantity: i64,
    pub purchase_price: Decimal,
    pub purchase_date: NaiveDate,
}

pub fn insert(
    conn: &Connection,
    user_id: i64,
    input: &InvestmentInput,
) -> Result<Investment, AppError> {
    let ticker = input.ticker.trim().to_uppercase();
    if !is_valid_ticker(&ticker) {
        return Err(AppError::Validation("Please enter a valid ticker.".into()));
    }
    if input.quantity <= 0 {
        return Err(AppError::Validation("Please enter a valid quantity.".into()));
    }
    if input.purchase_price <= Decimal::ZERO {
        return Err(AppError::Validation(
            "Please enter a valid purchase price.".into(),
        ));
    }
    check_amount(input.purchase_price, "Purchase price")?;
    conn.execute(
        "INSERT INTO investments(user_id, ticker, quantity, purchase_price, purchase_date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user_id,
            ticker,
            input.quantity,
            input.purchase_price.to_string(),
            input.purchase_date
        ],
    )?;
    fetch_one(conn, user_id, conn.last_insert_rowid())
}

/// Stores the latest price and appends it to the investment's history.
pub fn record_price(
    conn: &mut Connection,
    user_id: i64,
    id: i64,
    price: Decimal,
    as_of: NaiveDate,
) -> Result<Investment, AppError> {
    let tx = conn.transaction()?;
    let n = tx.execute(
        "UPDATE investments SET current_price=?1 WHERE id=?2 AND user_id=?3",
        params![price.to_string(), id, user_id],
    )?;
    not_found_if_zero(n, Investment::LABEL)?;
    tx.execute(
        "INSERT INTO investment_history(investment_id, date, price) VALUES (?1, ?2, ?3)",
        params![id, as_of, price.to_string()],
    )?;
    tx.commit()?;
    fetch_one(conn, user_id, id)
}

pub fn history(
    conn: &Connection,
    user_id: i64,
    id: i64,
) -> Result<Vec<InvestmentHistory>, AppError> {
    fetch_one::<Investment>(conn, user_id, id)?;
    let mut stmt = conn.prepare_cached(
        "SELECT id, investment_id, date, price FROM investment_history
         WHERE investment_id=?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![id], |r| {
        Ok(InvestmentHistory {
            id: r.get(0)?,
            investment_id: r.get(1)?,
            date: r.get(2)?,
            price: decimal_column(r, 3)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
