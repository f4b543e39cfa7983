// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::identity::IdentityError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("This email is already registered.")]
    EmailTaken,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Too many registration attempts. Please try again later.")]
    RateLimited,

    #[error("Profile insert failed for identity {identity_id}: {source}")]
    OrphanedProfile {
        identity_id: i64,
        source: rusqlite::Error,
    },

    #[error("Failed to analyze transactions: {0}")]
    Analysis(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<IdentityError> for AppError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::AlreadyRegistered => AppError::EmailTaken,
            IdentityError::InvalidCredentials => AppError::InvalidCredentials,
            IdentityError::Storage(e) => AppError::Database(e),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::EmailTaken => (StatusCode::CONFLICT, self.to_string()),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            AppError::OrphanedProfile { identity_id, source } => {
                log::error!(
                    "Orphaned identity {}: profile insert failed: {}",
                    identity_id,
                    source
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Your account was created, but we couldn't set up your profile. Please contact support."
                        .to_string(),
                )
            }
            AppError::Analysis(cause) => {
                log::error!("Analysis request failed: {}", cause);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to analyze transactions".to_string(),
                )
            }
            AppError::Database(e) => {
                log::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            AppError::Internal(e) => {
                log::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
