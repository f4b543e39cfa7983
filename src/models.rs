// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[serde(alias = "bancaria")]
    Banking,
    #[serde(alias = "investimento")]
    Investment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[serde(alias = "ganho")]
    Income,
    #[serde(alias = "gasto")]
    Expense,
}

macro_rules! sql_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    other => Err(format!("unknown {} '{}'", stringify!($ty), other)),
                }
            }
        }
    };
}

sql_enum!(AccountType { Banking => "banking", Investment => "investment" });
sql_enum!(TransactionType { Income => "income", Expense => "expense" });

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub r#type: AccountType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub monthly_limit: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub r#type: TransactionType,
    pub amount: Decimal,
    pub description: String,
    pub date: NaiveDate,
    pub due_date: Option<DateTime<Utc>>,
    pub account_id: i64,
    pub category_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    pub id: i64,
    pub user_id: i64,
    pub ticker: String,
    pub quantity: i64,
    pub purchase_price: Decimal,
    pub purchase_date: NaiveDate,
    pub current_price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentHistory {
    pub id: i64,
    pub investment_id: i64,
    pub date: NaiveDate,
    pub price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_type_accepts_legacy_names() {
        let t: TransactionType = serde_json::from_str("\"gasto\"").unwrap();
        assert_eq!(t, TransactionType::Expense);
        let t: TransactionType = serde_json::from_str("\"ganho\"").unwrap();
        assert_eq!(t, TransactionType::Income);
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"income\"");
    }

    #[test]
    fn account_type_round_trips_through_sql_text() {
        let parsed: AccountType = "investment".parse().unwrap();
        assert_eq!(parsed, AccountType::Investment);
        assert_eq!(parsed.as_str(), "investment");
        assert!("broker".parse::<AccountType>().is_err());
    }
}
