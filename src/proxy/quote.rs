// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use thiserror::Error;

use crate::config::Config;
use crate::utils::is_valid_ticker;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("BRAPI_API_TOKEN is not configured")]
    MissingToken,

    #[error("Invalid ticker '{0}'")]
    InvalidTicker(String),

    #[error("Quote request timed out")]
    Timeout,

    #[error("Quote provider answered {status}")]
    Upstream { status: StatusCode, details: Value },

    #[error("Quote request failed: {0}")]
    Transport(String),

    #[error("Quote payload has no regularMarketPrice")]
    NoPrice,
}

impl IntoResponse for QuoteError {
    fn into_response(self) -> Response {
        match self {
            QuoteError::MissingToken => {
                log::error!("Missing BRAPI_API_TOKEN");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
            QuoteError::InvalidTicker(t) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("Invalid ticker '{}'", t) })),
            )
                .into_response(),
            QuoteError::Timeout => (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response(),
            QuoteError::Upstream { status, details } => (
                status,
                Json(json!({
                    "message": "Failed to fetch data from brapi.dev",
                    "details": details,
                })),
            )
                .into_response(),
            QuoteError::Transport(e) => {
                log::error!("Quote request failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
            QuoteError::NoPrice => (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": "Quote provider returned no price" })),
            )
                .into_response(),
        }
    }
}

/// Fetches the raw quote payload for `ticker`, bounded by `config.quote_timeout`. Never retries.
pub async fn fetch_quote(
    client: &reqwest::Client,
    config: &Config,
    ticker: &str,
) -> Result<Value, QuoteError> {
    let token = config
        .brapi_token
        .as_deref()
        .ok_or(QuoteError::MissingToken)?;
    let ticker = ticker.trim().to_uppercase();
    if !is_valid_ticker(&ticker) {
        return Err(QuoteError::InvalidTicker(ticker));
    }
    let url = format!(
        "{}/api/quote/{}",
        config.brapi_base_url.trim_end_matches('/'),
        ticker
    );

    let resp = client
        .get(url)
        .query(&[("token", token)])
        .timeout(config.quote_timeout)
        .send()
        .await
        .map_err(classify)?;

    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.map_err(classify)?;
        let details = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
        let status =
            StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        return Err(QuoteError::Upstream { status, details });
    }

    let text = resp.text().await.map_err(classify)?;
    serde_json::from_str(&text).map_err(|e| QuoteError::Transport(e.to_string()))
}

// Unreachable hosts are reported the same as slow ones.
fn classify(e: reqwest::Error) -> QuoteError {
    if e.is_timeout() || e.is_connect() {
        QuoteError::Timeout
    } else {
        QuoteError::Transport(e.without_url().to_string())
    }
}

/// `results[0].regularMarketPrice` of a brapi payload.
pub fn latest_price(payload: &Value) -> Result<Decimal, QuoteError> {
    let px = payload
        .get("results")
        .and_then(|r| r.get(0))
        .and_then(|q| q.get("regularMarketPrice"))
        .and_then(Value::as_f64)
        .ok_or(QuoteError::NoPrice)?;
    Decimal::from_f64_retain(px)
        .map(|d| d.round_dp(6).normalize())
        .ok_or(QuoteError::NoPrice)
}
