// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};

const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: String,
    pub db_path: Option<PathBuf>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub brapi_token: Option<String>,
    pub brapi_base_url: String,
    pub quote_timeout: Duration,
    pub session_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub register_max_requests: u32,
    pub register_window: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:3000".into(),
            db_path: None,
            gemini_api_key: None,
            gemini_model: "gemini-1.5-flash".into(),
            gemini_base_url: "https://generativelanguage.googleapis.com".into(),
            brapi_token: None,
            brapi_base_url: "https://brapi.dev".into(),
            quote_timeout: Duration::from_millis(5_000),
            session_ttl_hours: 24,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            register_max_requests: 5,
            register_window: Duration::from_millis(60_000),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from `lookup`, which returns the raw value of a variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bcrypt_cost: u32 = parsed(&lookup, "BCRYPT_COST", defaults.bcrypt_cost)?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            bail!(
                "BCRYPT_COST must be between {} and {}, got {}",
                MIN_BCRYPT_COST,
                MAX_BCRYPT_COST,
                bcrypt_cost
            );
        }

        Ok(Self {
            addr: lookup("WALLETWISE_ADDR").unwrap_or(defaults.addr),
            db_path: lookup("WALLETWISE_DB").map(PathBuf::from),
            gemini_api_key: non_empty("GEMINI_API_KEY"),
            gemini_model: lookup("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_base_url: lookup("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            brapi_token: non_empty("BRAPI_API_TOKEN"),
            brapi_base_url: lookup("BRAPI_BASE_URL").unwrap_or(defaults.brapi_base_url),
            quote_timeout: Duration::from_millis(parsed(
                &lookup,
                "QUOTE_TIMEOUT_MS",
                defaults.quote_timeout.as_millis() as u64,
            )?),
            session_ttl_hours: parsed(&lookup, "SESSION_TTL_HOURS", defaults.session_ttl_hours)?,
            bcrypt_cost,
            register_max_requests: defaults.register_max_requests,
            register_window: defaults.register_window,
        })
    }
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Invalid {} '{}'", key, v)),
        None => Ok(default),
    }
}
