/*
[INPUT]:  Session store and an optional profile fetcher
[OUTPUT]: Per-check session state (authenticated / unauthenticated / error)
[POS]:    Session layer - gating of authenticated views
[UPDATE]: When state transitions or expiry/failure policies change
*/

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::http::Result;
use crate::session::token::{self, TokenPayload};
use crate::storage::{ADDRESS_KEY, SessionStore, TOKEN_KEY};

/// Anything able to fetch the profile behind a session token
#[async_trait]
pub trait ProfileFetcher: Send + Sync {
    async fn fetch_profile(&self, token: &str) -> Result<Value>;
}

/// Outcome of a session check
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unknown,
    Unauthenticated,
    CheckingProfile,
    Authenticated(Value),
    Error(String),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

/// Whether an expired stored token short-circuits the profile fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryPolicy {
    /// Expiry is logged only; the backend decides
    #[default]
    Advisory,
    /// Expired tokens resolve to `Unauthenticated` without a network call
    Enforce,
}

/// What to do with the stored token when the profile fetch fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileFailurePolicy {
    #[default]
    KeepToken,
    ClearToken,
}

/// Offline inspector for the persisted session token
#[derive(Clone)]
pub struct SessionGuard {
    store: Arc<dyn SessionStore>,
    expiry_policy: ExpiryPolicy,
    failure_policy: ProfileFailurePolicy,
}

impl SessionGuard {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            expiry_policy: ExpiryPolicy::default(),
            failure_policy: ProfileFailurePolicy::default(),
        }
    }

    pub fn with_expiry_policy(mut self, policy: ExpiryPolicy) -> Self {
        self.expiry_policy = policy;
        self
    }

    pub fn with_failure_policy(mut self, policy: ProfileFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn decode(&self, token: &str) -> Result<TokenPayload> {
        token::decode(token)
    }

    pub fn is_expired(&self, token: &str) -> bool {
        token::is_expired(token)
    }

    pub fn time_until_expiry(&self, token: &str) -> Option<i64> {
        token::time_until_expiry(token)
    }

    /// Persisted token, or `None` when absent or unreadable
    pub fn current_token(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                warn!(error = %e, "failed to read session token");
                None
            }
        }
    }

    /// Stored token exists, decodes, and has not expired
    pub fn has_valid_session(&self) -> bool {
        self.current_token()
            .is_some_and(|token| !token::is_expired(&token))
    }

    /// Offline transition out of `Unknown`
    pub fn check(&self) -> SessionState {
        self.check_at(Utc::now())
    }

    pub fn check_at(&self, now: DateTime<Utc>) -> SessionState {
        let Some(token) = self.current_token() else {
            debug!("no session token persisted");
            return SessionState::Unauthenticated;
        };

        if token::is_expired_at(&token, now) {
            let remaining = token::time_until_expiry_at(&token, now);
            warn!(
                seconds_until_expiry = ?remaining,
                policy = ?self.expiry_policy,
                "stored session token is expired or malformed"
            );
            if self.expiry_policy == ExpiryPolicy::Enforce {
                return SessionState::Unauthenticated;
            }
        }

        SessionState::CheckingProfile
    }

    /// Run the offline check and confirm a persisted token with a profile fetch
    pub async fn resolve(&self, fetcher: &dyn ProfileFetcher) -> SessionState {
        self.resolve_at(fetcher, Utc::now()).await
    }

    pub async fn resolve_at(&self, fetcher: &dyn ProfileFetcher, now: DateTime<Utc>) -> SessionState {
        let state = self.check_at(now);
        if state != SessionState::CheckingProfile {
            return state;
        }

        let Some(token) = self.current_token() else {
            // Cleared between the check and the fetch, e.g. by another process
            return SessionState::Unauthenticated;
        };

        match fetcher.fetch_profile(&token).await {
            Ok(profile) => {
                debug!("profile fetched, session authenticated");
                SessionState::Authenticated(profile)
            }
            Err(e) => match self.failure_policy {
                ProfileFailurePolicy::KeepToken => {
                    warn!(error = %e, "profile fetch failed");
                    SessionState::Error(e.to_string())
                }
                ProfileFailurePolicy::ClearToken => {
                    info!(error = %e, "profile fetch failed, clearing session");
                    self.clear();
                    SessionState::Unauthenticated
                }
            },
        }
    }

    fn clear(&self) {
        for key in [TOKEN_KEY, ADDRESS_KEY] {
            if let Err(e) = self.store.remove(key) {
                warn!(key, error = %e, "failed to clear session entry");
            }
        }
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("expiry_policy", &self.expiry_policy)
            .field("failure_policy", &self.failure_policy)
            .finish_non_exhaustive()
    }
}
