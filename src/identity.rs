// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Credential store: identities, password hashes and opaque session tokens.

use chrono::{Duration, Utc};
use rusqlite::{OptionalExtension, params};
use thiserror::Error;
use uuid::Uuid;

use crate::db::Db;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("User already registered")]
    AlreadyRegistered,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Identity store error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Identity store unavailable")]
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub identity_id: i64,
    pub token: String,
}

/// The seam between session handling and whatever actually owns credentials.
pub trait IdentityProvider: Send + Sync {
    fn sign_up(&self, email: &str, password: &str) -> Result<i64, IdentityError>;
    fn sign_in(&self, email: &str, password: &str) -> Result<Credentials, IdentityError>;
    fn sign_out(&self, token: &str) -> Result<(), IdentityError>;
    /// Identity behind a live, unexpired token.
    fn resolve(&self, token: &str) -> Result<Option<i64>, IdentityError>;
}

pub struct LocalIdentity {
    db: Db,
    bcrypt_cost: u32,
    session_ttl: Duration,
}

impl LocalIdentity {
    pub fn new(db: Db, bcrypt_cost: u32, session_ttl_hours: i64) -> Self {
        Self {
            db,
            bcrypt_cost,
            session_ttl: Duration::hours(session_ttl_hours),
        }
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, rusqlite::Connection>, IdentityError> {
        self.db.lock().map_err(|_| IdentityError::Unavailable)
    }
}

impl IdentityProvider for LocalIdentity {
    fn sign_up(&self, email: &str, password: &str) -> Result<i64, IdentityError> {
        let email = email.trim().to_lowercase();
        let password_hash = bcrypt::hash(password, self.bcrypt_cost)?;
        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT INTO identities(email, password_hash) VALUES (?1, ?2)",
            params![email, password_hash],
        );
        match inserted {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(IdentityError::AlreadyRegistered)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Credentials, IdentityError> {
        let email = email.trim().to_lowercase();
        let row: Option<(i64, String)> = {
            let conn = self.conn()?;
            conn.query_row(
                "SELECT id, password_hash FROM identities WHERE email=?1",
                params![email],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?
        };
        let (identity_id, password_hash) = row.ok_or(IdentityError::InvalidCredentials)?;
        if !bcrypt::verify(password, &password_hash)? {
            return Err(IdentityError::InvalidCredentials);
        }

        let token = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + self.session_ttl;
        self.conn()?.execute(
            "INSERT INTO auth_sessions(token, identity_id, expires_at) VALUES (?1, ?2, ?3)",
            params![token, identity_id, expires_at],
        )?;
        Ok(Credentials { identity_id, token })
    }

    fn sign_out(&self, token: &str) -> Result<(), IdentityError> {
        self.conn()?
            .execute("DELETE FROM auth_sessions WHERE token=?1", params![token])?;
        Ok(())
    }

    fn resolve(&self, token: &str) -> Result<Option<i64>, IdentityError> {
        let conn = self.conn()?;
        let id = conn
            .query_row(
                "SELECT identity_id FROM auth_sessions WHERE token=?1 AND expires_at > ?2",
                params![token, Utc::now()],
                |r| r.get(0),
            )
            .optional()?;
        Ok(id)
    }
}
