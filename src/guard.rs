// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::error::AppError;
use crate::models::UserProfile;
use crate::session::SessionStore;
use crate::state::AppState;
use crate::utils::bearer_token;

pub const LOGIN_PATH: &str = "/login";

/// The resolved session of a guarded request.
#[derive(Clone)]
pub struct CurrentSession {
    pub user: UserProfile,
    pub token: String,
    pub store: Arc<SessionStore>,
}

/// Lets a guarded route run only once the session has resolved to a user.
pub async fn require_session(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let token = bearer_token(req.headers());
    let store = Arc::new(SessionStore::new(state.identity.clone(), state.db.clone()));

    match (store.ensure_checked(token.as_deref()).await, token) {
        (Some(user), Some(token)) => {
            req.extensions_mut().insert(CurrentSession { user, token, store });
            next.run(req).await
        }
        _ => Redirect::to(LOGIN_PATH).into_response(),
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentSession>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Just the user id, for handlers that need nothing else.
pub struct AuthUser(pub i64);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = CurrentSession::from_request_parts(parts, state).await?;
        Ok(AuthUser(session.user.id))
    }
}
