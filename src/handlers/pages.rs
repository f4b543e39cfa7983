// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! JSON views behind the guard: each loads its tables fresh, then aggregates.

use std::collections::HashMap;

use anyhow::Result;
use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::aggregate::{
    self, CategorySpending, FinanceSummary, HistoryFilter, NamedTotal, UNCATEGORIZED,
};
use crate::error::{AppError, AppResult};
use crate::guard::{AuthUser, LOGIN_PATH};
use crate::models::{Account, Category, Transaction, TransactionType};
use crate::repo::TableLoader;
use crate::state::AppState;

pub async fn login_page() -> Json<Value> {
    Json(json!({
        "page": "login",
        "message": "Please log in to continue.",
        "login": "/api/auth/login",
        "register": "/api/auth/register",
        "path": LOGIN_PATH,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl MonthQuery {
    fn resolve(&self) -> AppResult<Option<(i32, u32)>> {
        let today = Utc::now().date_naive();
        let (year, month) = match (self.year, self.month) {
            (None, None) => return Ok(None),
            (y, m) => (y.unwrap_or(today.year()), m.unwrap_or(today.month())),
        };
        if !(1..=12).contains(&month) {
            return Err(AppError::Validation("Month must be between 1 and 12.".into()));
        }
        let max_year = today.year() + 10;
        if !(1900..=max_year).contains(&year) {
            return Err(AppError::Validation(format!(
                "Year must be between 1900 and {}.",
                max_year
            )));
        }
        Ok(Some((year, month)))
    }
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub expense_data: Vec<NamedTotal>,
    pub income_data: Vec<NamedTotal>,
    pub bar_chart_data: Vec<FinanceSummary>,
    pub upcoming_bills: Vec<Transaction>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

pub async fn dashboard(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<MonthQuery>,
) -> AppResult<Json<Dashboard>> {
    let period = q.resolve()?;
    let mut transactions = TableLoader::<Transaction>::new();
    let mut categories = TableLoader::<Category>::new();
    transactions.load(&state.db, user_id).await;
    categories.load(&state.db, user_id).await;
    let transactions = transactions.into_result()?;
    let categories = categories.into_result()?;

    let upcoming_bills = aggregate::upcoming_bills(&transactions, Utc::now());
    let charted = match period {
        Some((y, m)) => aggregate::in_month(&transactions, y, m),
        None => transactions,
    };
    let expense_data = aggregate::expense_totals(&charted, &categories)?;
    let income_data = aggregate::income_totals(&charted, &categories)?;
    let summary = aggregate::summary(&income_data, &expense_data)?;

    Ok(Json(Dashboard {
        expense_data,
        income_data,
        bar_chart_data: vec![summary],
        upcoming_bills,
        month: period.map(|(_, m)| m),
        year: period.map(|(y, _)| y),
    }))
}

pub async fn categories(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<MonthQuery>,
) -> AppResult<Json<Vec<CategorySpending>>> {
    let period = q.resolve()?;
    let mut transactions = TableLoader::<Transaction>::new();
    let mut categories = TableLoader::<Category>::new();
    transactions.load(&state.db, user_id).await;
    categories.load(&state.db, user_id).await;
    let mut transactions = transactions.into_result()?;
    if let Some((y, m)) = period {
        transactions = aggregate::in_month(&transactions, y, m);
    }
    Ok(Json(aggregate::category_spending(
        &categories.into_result()?,
        &transactions,
    )?))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub id: i64,
    pub date: chrono::NaiveDate,
    pub r#type: TransactionType,
    pub amount: Decimal,
    pub description: String,
    pub account: Option<String>,
    pub category: Option<String>,
}

async fn history_rows(state: &AppState, user_id: i64, filter: &HistoryFilter) -> AppResult<Vec<HistoryRow>> {
    let mut transactions = TableLoader::<Transaction>::new();
    let mut accounts = TableLoader::<Account>::new();
    let mut categories = TableLoader::<Category>::new();
    transactions.load(&state.db, user_id).await;
    accounts.load(&state.db, user_id).await;
    categories.load(&state.db, user_id).await;

    let account_names: HashMap<i64, String> = accounts
        .into_result()?
        .into_iter()
        .map(|a| (a.id, a.name))
        .collect();
    let category_names: HashMap<i64, String> = categories
        .into_result()?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    Ok(filter
        .apply(transactions.into_result()?)
        .into_iter()
        .map(|t| HistoryRow {
            id: t.id,
            date: t.date,
            r#type: t.r#type,
            amount: t.amount,
            description: t.description,
            account: account_names.get(&t.account_id).cloned(),
            category: t.category_id.and_then(|c| category_names.get(&c).cloned()),
        })
        .collect())
}

pub async fn history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(filter): Query<HistoryFilter>,
) -> AppResult<Json<Vec<HistoryRow>>> {
    Ok(Json(history_rows(&state, user_id, &filter).await?))
}

pub async fn export_csv(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(filter): Query<HistoryFilter>,
) -> AppResult<impl IntoResponse> {
    let rows = history_rows(&state, user_id, &filter).await?;
    let body = write_csv(&rows).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"transactions.csv\"",
            ),
        ],
        body,
    ))
}

/// Rows in the order given; no re-sorting.
pub fn write_csv(rows: &[HistoryRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["Date", "Type", "Amount", "Description", "Account", "Category"])?;
    for r in rows {
        wtr.write_record([
            r.date.to_string(),
            r.r#type.to_string(),
            r.amount.to_string(),
            r.description.clone(),
            r.account.clone().unwrap_or_default(),
            r.category.clone().unwrap_or_else(|| UNCATEGORIZED.to_string()),
        ])?;
    }
    let bytes = wtr.into_inner().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn csv_quotes_fields_and_keeps_order() {
        let rows = vec![
            HistoryRow {
                id: 2,
                date: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
                r#type: TransactionType::Expense,
                amount: Decimal::new(1234, 2),
                description: "Coffee, large".into(),
                account: Some("Checking".into()),
                category: None,
            },
            HistoryRow {
                id: 1,
                date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                r#type: TransactionType::Income,
                amount: Decimal::from(1000),
                description: "Salary".into(),
                account: Some("Checking".into()),
                category: Some("Work".into()),
            },
        ];
        let out = write_csv(&rows).unwrap();
        assert_eq!(
            out,
            "Date,Type,Amount,Description,Account,Category\n\
             2025-03-02,expense,12.34,\"Coffee, large\",Checking,Uncategorized\n\
             2025-03-01,income,1000,Salary,Checking,Work\n"
        );
    }

    #[test]
    fn month_query_bounds() {
        assert_eq!(MonthQuery::default().resolve().unwrap(), None);
        let q = MonthQuery {
            month: Some(13),
            year: Some(2025),
        };
        assert!(q.resolve().is_err());
        let q = MonthQuery {
            month: Some(2),
            year: Some(1899),
        };
        assert!(q.resolve().is_err());
        let q = MonthQuery {
            month: Some(2),
            year: Some(2024),
        };
        assert_eq!(q.resolve().unwrap(), Some((2024, 2)));
    }
}
