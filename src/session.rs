// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Who is logged in, for one request or client.
//!
//! A [`SessionStore`] starts out loading with no user. [`SessionStore::check_session`]
//! re-validates a token against the [`IdentityProvider`] and hydrates the profile;
//! whatever happens, loading is cleared afterwards. Observers follow changes through
//! [`SessionStore::subscribe`].

use std::sync::Arc;

use tokio::sync::{OnceCell, watch};

use crate::db::{self, Db};
use crate::error::AppError;
use crate::identity::IdentityProvider;
use crate::models::UserProfile;
use crate::repo::users;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<UserProfile>,
    pub is_loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            is_loading: true,
        }
    }
}

pub struct SessionStore {
    provider: Arc<dyn IdentityProvider>,
    db: Db,
    state: watch::Sender<SessionState>,
    checked: OnceCell<()>,
}

impl SessionStore {
    pub fn new(provider: Arc<dyn IdentityProvider>, db: Db) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            provider,
            db,
            state,
            checked: OnceCell::new(),
        }
    }

    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn login(&self, user: UserProfile) {
        self.state.send_replace(SessionState {
            user: Some(user),
            is_loading: false,
        });
    }

    /// Invalidates the provider session first; on failure the user stays logged in.
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        self.state.send_modify(|s| s.is_loading = true);
        let provider = Arc::clone(&self.provider);
        let token = token.to_string();
        let outcome = tokio::task::spawn_blocking(move || provider.sign_out(&token))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))
            .and_then(|r| r.map_err(AppError::from));

        match outcome {
            Ok(()) => {
                self.state.send_replace(SessionState {
                    user: None,
                    is_loading: false,
                });
                Ok(())
            }
            Err(e) => {
                log::warn!("logout failed, keeping session: {}", e);
                self.state.send_modify(|s| s.is_loading = false);
                Err(e)
            }
        }
    }

    pub async fn check_session(&self, token: Option<&str>) -> Option<UserProfile> {
        self.state.send_modify(|s| s.is_loading = true);
        let user = match token {
            Some(token) => match self.validate(token.to_string()).await {
                Ok(user) => user,
                Err(e) => {
                    log::warn!("session check failed: {}", e);
                    None
                }
            },
            None => None,
        };
        self.state.send_replace(SessionState {
            user: user.clone(),
            is_loading: false,
        });
        user
    }

    /// Runs [`Self::check_session`] at most once for this store.
    pub async fn ensure_checked(&self, token: Option<&str>) -> Option<UserProfile> {
        self.checked
            .get_or_init(|| async {
                self.check_session(token).await;
            })
            .await;
        self.current().user
    }

    async fn validate(&self, token: String) -> Result<Option<UserProfile>, AppError> {
        let provider = Arc::clone(&self.provider);
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || -> Result<Option<UserProfile>, AppError> {
            let Some(id) = provider.resolve(&token)? else {
                return Ok(None);
            };
            let conn = db::lock(&db)?;
            let profile = users::find(&conn, id)?;
            if profile.is_none() {
                log::warn!("identity {} has a live session but no profile", id);
            }
            Ok(profile)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{Credentials, IdentityError, LocalIdentity};

    fn seeded() -> (Db, Arc<LocalIdentity>, String) {
        let db = db::shared(db::open_in_memory().unwrap());
        let provider = Arc::new(LocalIdentity::new(Arc::clone(&db), 4, 24));
        let id = provider.sign_up("ana@example.com", "password1").unwrap();
        users::insert(&db.lock().unwrap(), id, "Ana", "ana@example.com").unwrap();
        let Credentials { token, .. } = provider.sign_in("ana@example.com", "password1").unwrap();
        (db, provider, token)
    }

    struct BrokenSignOut;

    impl IdentityProvider for BrokenSignOut {
        fn sign_up(&self, _: &str, _: &str) -> Result<i64, IdentityError> {
            Err(IdentityError::Unavailable)
        }
        fn sign_in(&self, _: &str, _: &str) -> Result<Credentials, IdentityError> {
            Err(IdentityError::Unavailable)
        }
        fn sign_out(&self, _: &str) -> Result<(), IdentityError> {
            Err(IdentityError::Unavailable)
        }
        fn resolve(&self, _: &str) -> Result<Option<i64>, IdentityError> {
            Err(IdentityError::Unavailable)
        }
    }

    #[tokio::test]
    async fn starts_loading_without_user() {
        let (db, provider, _) = seeded();
        let store = SessionStore::new(provider, db);
        assert_eq!(store.current(), SessionState::default());
    }

    #[tokio::test]
    async fn check_session_hydrates_profile() {
        let (db, provider, token) = seeded();
        let store = SessionStore::new(provider, db);
        let user = store.check_session(Some(&token)).await.unwrap();
        assert_eq!(user.email, "ana@example.com");
        assert!(!store.current().is_loading);
    }

    #[tokio::test]
    async fn check_session_failure_clears_loading() {
        let (db, _, _) = seeded();
        let store = SessionStore::new(Arc::new(BrokenSignOut), db);
        assert_eq!(store.check_session(Some("whatever")).await, None);
        assert_eq!(
            store.current(),
            SessionState {
                user: None,
                is_loading: false
            }
        );
    }

    #[tokio::test]
    async fn logout_notifies_subscribers_and_invalidates_token() {
        let (db, provider, token) = seeded();
        let store = SessionStore::new(provider.clone(), db);
        store.check_session(Some(&token)).await;
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        store.logout(&token).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().user, None);
        assert_eq!(provider.resolve(&token).unwrap(), None);
    }

    #[tokio::test]
    async fn failed_logout_keeps_user() {
        let (db, _, _) = seeded();
        let store = SessionStore::new(Arc::new(BrokenSignOut), db);
        let ana = UserProfile {
            id: 1,
            name: "Ana".into(),
            email: "ana@example.com".into(),
        };
        store.login(ana.clone());
        assert!(store.logout("token").await.is_err());
        let state = store.current();
        assert_eq!(state.user, Some(ana));
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn ensure_checked_runs_once() {
        let (db, provider, token) = seeded();
        let store = SessionStore::new(provider.clone(), db);
        assert!(store.ensure_checked(Some(&token)).await.is_some());
        provider.sign_out(&token).unwrap();
        // a second call does not re-validate
        assert!(store.ensure_checked(Some(&token)).await.is_some());
        assert!(store.check_session(Some(&token)).await.is_none());
    }
}
