// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use axum::http::HeaderMap;
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Type;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

const UA: &str = concat!(
    "walletwise/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/walletwise)"
);

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static IPV4_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:\d{1,3}\.){3}\d{1,3}$").unwrap());
static IPV6_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-fA-F0-9:]+$").unwrap());
static TICKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9.\-]{1,15}$").unwrap());

pub fn http_client() -> Result<reqwest::Client> {
    let c = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    let d = parse_date(s)
        .with_context(|| format!("Invalid timestamp '{}', expected RFC 3339 or YYYY-MM-DD", s))?;
    Ok(d.and_hms_opt(0, 0, 0)
        .context("midnight is always valid")?
        .and_utc())
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(&email.to_lowercase())
}

pub fn is_valid_ticker(ticker: &str) -> bool {
    TICKER_RE.is_match(ticker)
}

/// Blank or missing values become `None`; anything else goes through `FromStr`.
pub fn empty_as_none<'de, D, T>(d: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(d)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// First `X-Forwarded-For` hop when it looks like an IP, then the peer address.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        let ip = forwarded.split(',').next().unwrap_or("").trim();
        if IPV4_RE.is_match(ip) || IPV6_RE.is_match(ip) {
            return ip.to_string();
        }
    }
    match peer {
        Some(addr) => addr.ip().to_string(),
        None => "127.0.0.1".to_string(),
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

// Decimals are stored as TEXT; a bad value surfaces as a conversion error for that column.
pub fn decimal_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = row.get(idx)?;
    s.parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub fn opt_decimal_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| {
        s.parse::<Decimal>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

pub fn enum_column<T>(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    let s: String = row.get(idx)?;
    s.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into())
    })
}
