//! Injected credential provider for the transport.
//!
//! The bearer token is never read from ambient storage: whoever owns the
//! session injects a provider. [`SessionCredentials`] is the standard
//! implementation — an in-memory token cell plus an optional async
//! refresher with a single-flight guarantee, so a burst of 401s from
//! concurrent requests produces exactly one refresh.

use std::sync::RwLock;

use futures_util::future::BoxFuture;
use tokio::sync::Mutex as TokioMutex;

use super::error::ApiError;

/// How the transport obtains and refreshes the bearer credential.
pub trait CredentialProvider: Send + Sync {
    /// Current bearer token, if any.
    fn token(&self) -> Option<String>;

    /// Obtain a fresh token after an Unauthorized response. `Ok(None)`
    /// means no refresh is possible and the caller should give up.
    ///
    /// Implementations must be single-flight: concurrent callers coalesce
    /// behind one refresh instead of each hitting the auth backend.
    fn refresh(&self) -> BoxFuture<'_, Result<Option<String>, ApiError>>;
}

/// Fixed token (or none). Refresh always declines.
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    /// For pre-authentication requests (register, login).
    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl CredentialProvider for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }

    fn refresh(&self) -> BoxFuture<'_, Result<Option<String>, ApiError>> {
        Box::pin(std::future::ready(Ok(None)))
    }
}

/// Async closure producing a replacement token.
pub type Refresher = Box<dyn Fn() -> BoxFuture<'static, Result<String, ApiError>> + Send + Sync>;

/// Mutable in-memory session credential.
///
/// Install the token returned by login/register via [`set_token`], drop it
/// on logout via [`clear`]. When constructed with a refresher, the first
/// 401 triggers it; callers that lose the refresh race adopt the winner's
/// token instead of refreshing again.
///
/// [`set_token`]: SessionCredentials::set_token
/// [`clear`]: SessionCredentials::clear
pub struct SessionCredentials {
    token: RwLock<Option<String>>,
    refresh_gate: TokioMutex<()>,
    refresher: Option<Refresher>,
}

impl SessionCredentials {
    /// Anonymous session with no refresh capability.
    pub fn new() -> Self {
        Self {
            token: RwLock::new(None),
            refresh_gate: TokioMutex::new(()),
            refresher: None,
        }
    }

    pub fn with_refresher(refresher: Refresher) -> Self {
        Self {
            refresher: Some(refresher),
            ..Self::new()
        }
    }

    pub fn set_token(&self, token: impl Into<String>) {
        if let Ok(mut slot) = self.token.write() {
            *slot = Some(token.into());
        }
    }

    /// Drop the session token (logout).
    pub fn clear(&self) {
        if let Ok(mut slot) = self.token.write() {
            *slot = None;
        }
    }
}

impl Default for SessionCredentials {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialProvider for SessionCredentials {
    fn token(&self) -> Option<String> {
        self.token.read().ok()?.clone()
    }

    fn refresh(&self) -> BoxFuture<'_, Result<Option<String>, ApiError>> {
        Box::pin(async move {
            let stale = self.token();
            let _gate = self.refresh_gate.lock().await;

            // Another request may have refreshed while we waited on the gate.
            let current = self.token();
            if current != stale {
                return Ok(current);
            }

            let Some(refresher) = &self.refresher else {
                return Ok(None);
            };
            let fresh = refresher().await?;
            if let Ok(mut slot) = self.token.write() {
                *slot = Some(fresh.clone());
            }
            tracing::debug!("session credential refreshed");
            Ok(Some(fresh))
        })
    }
}
