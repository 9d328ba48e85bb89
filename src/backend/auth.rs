//! Password authentication and session lifecycle.
//!
//! # Lifecycle
//! ```text
//! sign_in_with_password → session stored in the client
//!     → requests carry the session's access token
//!     → token within REFRESH_LEEWAY of expiry → one refresh under refresh_lock,
//!       concurrent callers reuse its result
//! sign_out → backend logout, session cleared (even if logout fails)
//!     → a refresh finishing afterwards is discarded
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::client::{BackendClient, APIKEY};
use crate::backend::errors::ClientError;
use crate::transport::{RequestDescriptor, Transport};

/// Refresh tokens this many seconds before they expire.
pub const REFRESH_LEEWAY_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: String,
    pub expires_in: u64,
    /// Unix seconds. Filled from `expires_in` when the backend omits it.
    #[serde(default)]
    pub expires_at: Option<u64>,
    pub user: AuthUser,
}

impl Session {
    pub fn expires_at(&self) -> u64 {
        self.expires_at.unwrap_or(0)
    }

    /// True when the access token expires within `leeway_secs` of `now_secs`.
    pub fn needs_refresh(&self, now_secs: u64, leeway_secs: u64) -> bool {
        self.expires_at() <= now_secs.saturating_add(leeway_secs)
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

impl<T: Transport> BackendClient<T> {
    /// The current session, if signed in.
    pub async fn session(&self) -> Option<Session> {
        self.inner.session.read().await.clone()
    }

    /// Token for the `Authorization` header. Refreshes a nearly expired
    /// session first; if that fails the old token is used and the backend decides.
    pub(crate) async fn bearer_token(&self) -> String {
        let current = self.inner.session.read().await.clone();
        match current {
            None => self.inner.anon_key.clone(),
            Some(session) if session.needs_refresh(now_secs(), REFRESH_LEEWAY_SECS) => {
                match self.refresh_expiring().await {
                    Ok(Some(fresh)) => fresh.access_token,
                    Ok(None) => self.inner.anon_key.clone(),
                    Err(e) => {
                        tracing::warn!(error = %e, "Session refresh failed, using existing token");
                        session.access_token
                    }
                }
            }
            Some(session) => session.access_token,
        }
    }

    /// Refresh under the refresh guard, unless another caller already did.
    /// `None` means the session was cleared meanwhile.
    async fn refresh_expiring(&self) -> Result<Option<Session>, ClientError> {
        let _guard = self.inner.refresh_lock.lock().await;
        let current = self.inner.session.read().await.clone();
        match current {
            None => Ok(None),
            Some(session) if !session.needs_refresh(now_secs(), REFRESH_LEEWAY_SECS) => Ok(Some(session)),
            Some(session) => match self.exchange_refresh_token(&session.refresh_token).await {
                Ok(fresh) => Ok(Some(fresh)),
                Err(ClientError::NotSignedIn) => Ok(None),
                Err(e) => Err(e),
            },
        }
    }

    async fn token_grant<B: Serialize>(&self, grant_type: &str, body: &B) -> Result<Session, ClientError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);

        let request = RequestDescriptor::new(Method::POST, url)
            .header(APIKEY, &self.inner.anon_key)
            .header(AUTHORIZATION, &format!("Bearer {}", self.inner.anon_key))
            .json(body)
            .map_err(|e| ClientError::Encode(e.to_string()))?;

        let body = self.send(request).await?;
        let mut session: Session = serde_json::from_slice(&body).map_err(|e| ClientError::Decode {
            resource: "session".to_string(),
            reason: e.to_string(),
        })?;
        if session.expires_at.is_none() {
            session.expires_at = Some(now_secs() + session.expires_in);
        }
        Ok(session)
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let session = self
            .token_grant("password", &PasswordGrant { email, password })
            .await?;
        *self.inner.session.write().await = Some(session.clone());
        tracing::info!(user_id = %session.user.id, "Signed in");
        Ok(session)
    }

    /// Exchange the stored refresh token for a new session.
    pub async fn refresh_session(&self) -> Result<Session, ClientError> {
        let _guard = self.inner.refresh_lock.lock().await;
        let refresh_token = match self.inner.session.read().await.as_ref() {
            Some(session) => session.refresh_token.clone(),
            None => return Err(ClientError::NotSignedIn),
        };
        self.exchange_refresh_token(&refresh_token).await
    }

    /// Grant a new session for `refresh_token` and store it only if the stored
    /// session still carries that token. Callers hold `refresh_lock`.
    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<Session, ClientError> {
        let fresh = self
            .token_grant("refresh_token", &RefreshGrant { refresh_token })
            .await?;

        let mut slot = self.inner.session.write().await;
        let unchanged = matches!(slot.as_ref(), Some(current) if current.refresh_token == refresh_token);
        if unchanged {
            *slot = Some(fresh.clone());
            tracing::debug!(user_id = %fresh.user.id, expires_at = fresh.expires_at(), "Session refreshed");
            return Ok(fresh);
        }

        match slot.as_ref() {
            Some(current) => {
                tracing::debug!("Session replaced during refresh, discarding refreshed session");
                Ok(current.clone())
            }
            None => {
                tracing::debug!("Signed out during refresh, discarding refreshed session");
                Err(ClientError::NotSignedIn)
            }
        }
    }

    /// Revoke the session on the backend and drop it locally.
    ///
    /// The local session is cleared even when the logout request fails; the
    /// error is still returned so callers know the token may remain valid.
    pub async fn sign_out(&self) -> Result<(), ClientError> {
        let session = match self.inner.session.write().await.take() {
            Some(session) => session,
            None => return Ok(()),
        };

        let url = self.endpoint("auth/v1/logout")?;
        let request = RequestDescriptor::new(Method::POST, url)
            .header(APIKEY, &self.inner.anon_key)
            .header(AUTHORIZATION, &format!("Bearer {}", session.access_token));

        let result = self.send(request).await.map(|_| ());
        match &result {
            Ok(()) => tracing::info!(user_id = %session.user.id, "Signed out"),
            Err(e) => tracing::warn!(user_id = %session.user.id, error = %e, "Logout request failed, session dropped locally"),
        }
        result
    }
}
