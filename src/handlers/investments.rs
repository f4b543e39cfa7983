// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::Value;

use super::JsonBody;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::guard::AuthUser;
use crate::models::{Investment, InvestmentHistory};
use crate::proxy::quote::{QuoteError, fetch_quote, latest_price};
use crate::repo::{self, investments::InvestmentInput};
use crate::state::AppState;

pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonBody(input): JsonBody<InvestmentInput>,
) -> AppResult<(StatusCode, Json<Investment>)> {
    let created =
        db::run(&state.db, move |conn| repo::investments::insert(conn, user_id, &input)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Upstream quote payload, passed through untouched.
pub async fn quote(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<Value>, QuoteError> {
    let payload = fetch_quote(&state.http, &state.config, &ticker).await?;
    Ok(Json(payload))
}

pub async fn refresh(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Response {
    let ticker = match db::run(&state.db, move |conn| {
        repo::fetch_one::<Investment>(conn, user_id, id)
    })
    .await
    {
        Ok(inv) => inv.ticker,
        Err(e) => return e.into_response(),
    };

    let price = match fetch_quote(&state.http, &state.config, &ticker)
        .await
        .and_then(|payload| latest_price(&payload))
    {
        Ok(p) => p,
        Err(e) => {
            log::warn!("price refresh for {} failed: {}", ticker, e);
            return e.into_response();
        }
    };

    let today = Utc::now().date_naive();
    let updated = db::run(&state.db, move |conn| {
        repo::investments::record_price(conn, user_id, id, price, today)
    })
    .await;
    match updated {
        Ok(inv) => {
            log::info!("refreshed {} at {}", inv.ticker, price);
            Json(inv).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Vec<InvestmentHistory>>, AppError> {
    let rows = db::run(&state.db, move |conn| repo::investments::history(conn, user_id, id)).await?;
    Ok(Json(rows))
}
