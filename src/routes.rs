// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use tower_http::cors::{Any, CorsLayer};

use crate::guard;
use crate::handlers::{self, analyze, auth, investments, pages};
use crate::models::{Account, Category, Goal, Investment, Transaction};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Investment routes share one parameter name; the router rejects
    // siblings that disagree.
    let guarded = Router::new()
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/session", get(auth::current))
        .route(
            "/api/accounts",
            get(handlers::list::<Account>).post(handlers::create::<Account>),
        )
        .route(
            "/api/accounts/:id",
            put(handlers::update::<Account>).delete(handlers::remove::<Account>),
        )
        .route(
            "/api/categories",
            get(handlers::list::<Category>).post(handlers::create::<Category>),
        )
        .route(
            "/api/categories/:id",
            put(handlers::update::<Category>).delete(handlers::remove::<Category>),
        )
        .route(
            "/api/transactions",
            get(handlers::list::<Transaction>).post(handlers::create::<Transaction>),
        )
        .route(
            "/api/transactions/:id",
            put(handlers::update::<Transaction>).delete(handlers::remove::<Transaction>),
        )
        .route(
            "/api/goals",
            get(handlers::list::<Goal>).post(handlers::create::<Goal>),
        )
        .route(
            "/api/goals/:id",
            put(handlers::update::<Goal>).delete(handlers::remove::<Goal>),
        )
        .route(
            "/api/investments",
            get(handlers::list::<Investment>).post(investments::create),
        )
        .route("/api/investments/:key", get(investments::quote))
        .route("/api/investments/:key/refresh", post(investments::refresh))
        .route("/api/investments/:key/history", get(investments::history))
        .route("/api/analyze", post(analyze::analyze))
        .route("/dashboard", get(pages::dashboard))
        .route("/categories", get(pages::categories))
        .route("/history", get(pages::history))
        .route("/history/export.csv", get(pages::export_csv))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            guard::require_session,
        ));

    Router::new()
        .route("/api/health", get(health))
        .route(guard::LOGIN_PATH, get(pages::login_page))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .merge(guarded)
        .layer(cors)
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}
