// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::db::Db;
use crate::identity::{IdentityProvider, LocalIdentity};
use crate::rate_limit::RateLimiter;
use crate::utils::http_client;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Arc<Config>,
    pub identity: Arc<dyn IdentityProvider>,
    pub register_limiter: Arc<RateLimiter>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(db: Db, config: Config) -> Result<Self> {
        let identity = LocalIdentity::new(db.clone(), config.bcrypt_cost, config.session_ttl_hours);
        let register_limiter =
            RateLimiter::new(config.register_max_requests, config.register_window);
        Ok(Self {
            db,
            identity: Arc::new(identity),
            register_limiter: Arc::new(register_limiter),
            http: http_client()?,
            config: Arc::new(config),
        })
    }
}
