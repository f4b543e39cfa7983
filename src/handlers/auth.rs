// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::net::SocketAddr;

use axum::{
    Json,
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::JsonBody;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::guard::CurrentSession;
use crate::models::UserProfile;
use crate::repo::users;
use crate::state::AppState;
use crate::utils::{client_ip, is_valid_email};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, PartialEq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<Registration, AppError> {
        let name = self.name.unwrap_or_default().trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Please enter your name.".into()));
        }
        let email = self.email.unwrap_or_default().trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(AppError::Validation(
                "Please enter a valid email address.".into(),
            ));
        }
        let password = self.password.unwrap_or_default();
        if password.chars().count() < 8 {
            return Err(AppError::Validation(
                "Password must be at least 8 characters long.".into(),
            ));
        }
        Ok(Registration {
            name,
            email,
            password,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

pub async fn register(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<(StatusCode, Json<Value>)> {
    let ip = client_ip(&headers, peer.map(|ConnectInfo(addr)| addr));
    if !state.register_limiter.check(&ip) {
        log::warn!("registration rate limit hit for {}", ip);
        return Err(AppError::RateLimited);
    }

    let req: RegisterRequest = serde_json::from_slice(&body)
        .map_err(|_| AppError::Validation("Invalid request body.".into()))?;
    let reg = req.validate()?;

    let identity = state.identity.clone();
    let (email, password) = (reg.email.clone(), reg.password);
    let identity_id = tokio::task::spawn_blocking(move || identity.sign_up(&email, &password))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let (name, email) = (reg.name, reg.email);
    let profile = db::run(&state.db, move |conn| {
        users::insert(conn, identity_id, &name, &email).map_err(|source| {
            AppError::OrphanedProfile {
                identity_id,
                source,
            }
        })
    })
    .await?;
    log::info!("registered user {} ({})", profile.id, profile.email);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Registration successful! You can now log in."
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let identity = state.identity.clone();
    let creds = tokio::task::spawn_blocking(move || identity.sign_in(&req.email, &req.password))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let identity_id = creds.identity_id;
    let profile = db::run(&state.db, move |conn| Ok(users::find(conn, identity_id)?)).await?;
    let user = profile.ok_or_else(|| {
        AppError::Internal(format!("identity {} has no profile", creds.identity_id))
    })?;

    Ok(Json(LoginResponse {
        token: creds.token,
        user,
    }))
}

pub async fn logout(session: CurrentSession) -> AppResult<StatusCode> {
    session.store.logout(&session.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn current(session: CurrentSession) -> Json<UserProfile> {
    Json(session.user)
}
