// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod analyze;
pub mod auth;
pub mod investments;
pub mod pages;

use axum::{
    Json, async_trait,
    extract::{FromRequest, Path, Request, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::db;
use crate::error::{AppError, AppResult};
use crate::guard::AuthUser;
use crate::repo::{self, Editable, Record, TableLoader};
use crate::state::AppState;

/// `Json<T>` whose rejections come back as `{error}` bodies with status 400.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(v)) => Ok(JsonBody(v)),
            Err(rejection) => Err(AppError::Validation(rejection.body_text())),
        }
    }
}

pub async fn list<T: Record + serde::Serialize>(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<T>>> {
    let mut loader = TableLoader::<T>::new();
    loader.load(&state.db, user_id).await;
    Ok(Json(loader.into_result()?))
}

/// Returns the stored row so the client can splice it into its own list.
pub async fn create<T: Editable + serde::Serialize>(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonBody(input): JsonBody<T::Input>,
) -> AppResult<(StatusCode, Json<T>)> {
    let created = db::run(&state.db, move |conn| T::insert(conn, user_id, &input)).await?;
    log::debug!("user {} added a row to {}", user_id, T::TABLE);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update<T: Editable + serde::Serialize>(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    JsonBody(input): JsonBody<T::Input>,
) -> AppResult<Json<T>> {
    let updated = db::run(&state.db, move |conn| T::update(conn, user_id, id, &input)).await?;
    Ok(Json(updated))
}

pub async fn remove<T: Record>(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    db::run(&state.db, move |conn| repo::delete_owned::<T>(conn, user_id, id)).await?;
    log::info!("user {} deleted {} {}", user_id, T::TABLE, id);
    Ok(StatusCode::NO_CONTENT)
}
