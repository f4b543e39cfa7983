// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Dashboard math over already-loaded rows. No I/O.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{Category, Transaction, TransactionType};
use crate::utils::empty_as_none;

pub const UNCATEGORIZED: &str = "Uncategorized";

// Chart series carry plain JSON numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedTotal {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinanceSummary {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub expenses: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitStatus {
    Ok,
    Approaching,
    Exceeded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySpending {
    pub category: Category,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_spending: Decimal,
    pub status: Option<LimitStatus>,
}

fn add(total: Decimal, amount: Decimal) -> Result<Decimal, AppError> {
    total
        .checked_add(amount)
        .ok_or_else(|| AppError::Validation("Amounts are too large to total.".into()))
}

fn sum<I: IntoIterator<Item = Decimal>>(amounts: I) -> Result<Decimal, AppError> {
    amounts.into_iter().try_fold(Decimal::ZERO, add)
}

fn category_names(categories: &[Category]) -> HashMap<i64, &str> {
    categories.iter().map(|c| (c.id, c.name.as_str())).collect()
}

/// Sums transactions of `kind` per resolved category name, in first-seen order.
pub fn totals_by_category(
    transactions: &[Transaction],
    categories: &[Category],
    kind: TransactionType,
) -> Result<Vec<NamedTotal>, AppError> {
    let names = category_names(categories);
    let mut out: Vec<NamedTotal> = Vec::new();
    for t in transactions.iter().filter(|t| t.r#type == kind) {
        let name = t
            .category_id
            .and_then(|id| names.get(&id).copied())
            .unwrap_or(UNCATEGORIZED);
        match out.iter_mut().find(|e| e.name == name) {
            Some(existing) => existing.value = add(existing.value, t.amount)?,
            None => out.push(NamedTotal {
                name: name.to_string(),
                value: t.amount,
            }),
        }
    }
    Ok(out)
}

pub fn expense_totals(
    transactions: &[Transaction],
    categories: &[Category],
) -> Result<Vec<NamedTotal>, AppError> {
    totals_by_category(transactions, categories, TransactionType::Expense)
}

pub fn income_totals(
    transactions: &[Transaction],
    categories: &[Category],
) -> Result<Vec<NamedTotal>, AppError> {
    totals_by_category(transactions, categories, TransactionType::Income)
}

pub fn summary(income: &[NamedTotal], expenses: &[NamedTotal]) -> Result<FinanceSummary, AppError> {
    Ok(FinanceSummary {
        name: "Finances".to_string(),
        income: sum(income.iter().map(|i| i.value))?,
        expenses: sum(expenses.iter().map(|e| e.value))?,
    })
}

/// Transactions due within `[now, now + 7 days]`, in input order.
pub fn upcoming_bills(transactions: &[Transaction], now: DateTime<Utc>) -> Vec<Transaction> {
    let horizon = now + Duration::days(7);
    transactions
        .iter()
        .filter(|t| matches!(t.due_date, Some(due) if due >= now && due <= horizon))
        .cloned()
        .collect()
}

/// `limit` must be positive.
pub fn limit_status(spent: Decimal, limit: Decimal) -> LimitStatus {
    if spent > limit {
        return LimitStatus::Exceeded;
    }
    let approaching = match (
        spent.checked_mul(Decimal::from(100)),
        limit.checked_mul(Decimal::from(80)),
    ) {
        (Some(s), Some(l)) => s >= l,
        // spent <= limit here, so the ratio is at most 1.
        _ => spent
            .checked_div(limit)
            .is_some_and(|ratio| ratio >= Decimal::new(8, 1)),
    };
    if approaching {
        LimitStatus::Approaching
    } else {
        LimitStatus::Ok
    }
}

/// Expense spending per category; `status` is set only for a positive limit.
pub fn category_spending(
    categories: &[Category],
    transactions: &[Transaction],
) -> Result<Vec<CategorySpending>, AppError> {
    categories
        .iter()
        .map(|c| {
            let total_spending = sum(
                transactions
                    .iter()
                    .filter(|t| t.r#type == TransactionType::Expense && t.category_id == Some(c.id))
                    .map(|t| t.amount),
            )?;
            let status = c
                .monthly_limit
                .filter(|l| *l > Decimal::ZERO)
                .map(|l| limit_status(total_spending, l));
            Ok(CategorySpending {
                category: c.clone(),
                total_spending,
                status,
            })
        })
        .collect()
}

pub fn in_month(transactions: &[Transaction], year: i32, month: u32) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| t.date.year() == year && t.date.month() == month)
        .cloned()
        .collect()
}

/// Query filters; an empty value (a cleared select) means "any".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub r#type: Option<TransactionType>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub account_id: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category_id: Option<i64>,
}

impl HistoryFilter {
    pub fn matches(&self, t: &Transaction) -> bool {
        self.r#type.is_none_or(|k| t.r#type == k)
            && self.account_id.is_none_or(|a| t.account_id == a)
            && self.category_id.is_none_or(|c| t.category_id == Some(c))
    }

    pub fn apply(&self, transactions: Vec<Transaction>) -> Vec<Transaction> {
        transactions.into_iter().filter(|t| self.matches(t)).collect()
    }
}
