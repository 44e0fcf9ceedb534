//! Session manager: the single source of truth for "is the caller currently
//! authenticated", with transparent renewal.
//!
//! One logical session exists per [`crate::Client`]. The manager owns the
//! access/refresh token pair and the cached user profile, persists them
//! through a [`SessionStore`], and publishes every change on a watch channel
//! that the route guard subscribes to.
//!
//! # State machine
//!
//! `ANONYMOUS → AUTHENTICATED` (login) `→ REFRESHING` (expiry detected,
//! transient) `→ AUTHENTICATED | ANONYMOUS` (refresh outcome) `→ ANONYMOUS`
//! (explicit logout, from any state).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, watch};
use tracing::instrument;

use green_mango_core::{Email, UserId, UserRole};

use crate::api::ApiClient;

pub mod store;
pub mod token;

pub(crate) mod state;

pub use store::{FileSessionStore, MemorySessionStore, SessionStore, StoreError};
pub use token::TokenError;

use state::SharedSession;

const REFRESH_PATH: &str = "admin/auth/refresh";
const LOGOUT_PATH: &str = "admin/auth/logout";

/// Denormalized snapshot of the signed-in identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Backend user ID.
    pub id: UserId,
    /// Sign-in email.
    pub email: Email,
    /// Display name.
    pub full_name: String,
    /// Back-office role.
    pub role: UserRole,
    /// Avatar image URL, when one is attached.
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Contact phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Whether the email address has been verified.
    #[serde(default)]
    pub verified: bool,
}

/// The authenticated state of the application.
///
/// This is also the persisted record: the whole struct round-trips through
/// the [`SessionStore`] as one JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Short-lived bearer credential with an embedded `exp` claim.
    pub access_token: Option<String>,
    /// Longer-lived credential used to mint a new access token. Absent when
    /// the backend manages it via an HTTP-only cookie.
    pub refresh_token: Option<String>,
    /// Cached profile of the signed-in user.
    pub user_info: Option<UserProfile>,
}

impl Session {
    /// Whether every field is cleared.
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.user_info.is_none()
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            access_token: self.access_token.clone(),
            user_info: self.user_info.clone(),
        }
    }
}

/// The observable slice of session state published on the watch channel.
///
/// The refresh token is deliberately excluded: subscribers (route guard,
/// UI shells) only care about the access token reference and the identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Current access token, if any.
    pub access_token: Option<String>,
    /// Current cached profile, if any.
    pub user_info: Option<UserProfile>,
}

impl SessionSnapshot {
    /// Whether an access token is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    /// Present when the backend rotates refresh tokens.
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Serialize)]
struct LogoutRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
}

/// Session manager handle.
///
/// Cheap to clone; all clones share one session. Constructed by
/// [`crate::Client`] and injected wherever authentication state is needed -
/// there is no ambient global.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionManagerInner>,
}

struct SessionManagerInner {
    state: Arc<SharedSession>,
    api: ApiClient,
    /// Gate coalescing concurrent refresh attempts into one network call.
    refresh_gate: Mutex<()>,
}

impl SessionManager {
    pub(crate) fn new(state: Arc<SharedSession>, api: ApiClient) -> Self {
        Self {
            inner: Arc::new(SessionManagerInner {
                state,
                api,
                refresh_gate: Mutex::new(()),
            }),
        }
    }

    /// Replace both tokens unconditionally and persist.
    ///
    /// No structural validation is performed; a malformed token surfaces
    /// later through [`Self::is_valid`].
    pub async fn set_tokens(&self, access: Option<String>, refresh: Option<String>) {
        self.inner
            .state
            .mutate(|session| {
                session.access_token = access;
                session.refresh_token = refresh;
            })
            .await;
    }

    /// Install a freshly issued credential pair plus profile as one state
    /// transition, e.g. after a successful login.
    ///
    /// Subscribers observe a single watch notification that already carries
    /// both the access token and the identity, so a guard never sees a
    /// token-without-profile intermediate state.
    pub async fn set_authenticated(
        &self,
        access: String,
        refresh: Option<String>,
        profile: UserProfile,
    ) {
        self.inner
            .state
            .mutate(|session| {
                session.access_token = Some(access);
                session.refresh_token = refresh;
                session.user_info = Some(profile);
            })
            .await;
    }

    /// Replace the cached profile and persist.
    pub async fn set_user_info(&self, profile: Option<UserProfile>) {
        self.inner
            .state
            .mutate(|session| session.user_info = profile)
            .await;
    }

    /// Merge a partial update into the cached profile, e.g. after a profile
    /// edit, without discarding unrelated fields. No-op while anonymous.
    pub async fn update_user_info(&self, apply: impl FnOnce(&mut UserProfile)) {
        self.inner
            .state
            .mutate(|session| {
                if let Some(profile) = session.user_info.as_mut() {
                    apply(profile);
                }
            })
            .await;
    }

    /// The current access token, if any. Always observes the latest value.
    pub async fn access_token(&self) -> Option<String> {
        self.inner.state.access_token().await
    }

    /// The cached profile, if any.
    pub async fn user_info(&self) -> Option<UserProfile> {
        self.inner.state.snapshot().await.user_info
    }

    /// Current observable state.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.snapshot().await
    }

    /// Subscribe to session changes (login, refresh, logout, profile edits).
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.state.subscribe()
    }

    /// Whether the caller currently holds a usable session, renewing it
    /// silently when possible.
    ///
    /// - No access token → `false`, no network.
    /// - Malformed token → full logout, `false`.
    /// - `exp` in the past → outcome of one (coalesced) [`Self::refresh`].
    /// - `exp` in the future → `true`, no network (fast path).
    #[instrument(skip(self))]
    pub async fn is_valid(&self) -> bool {
        let Some(access_token) = self.inner.state.access_token().await else {
            return false;
        };

        match token::decode_expiry(&access_token) {
            Err(e) => {
                tracing::warn!(error = %e, "access token undecodable, logging out");
                self.logout().await;
                false
            }
            Ok(exp) if token::is_expired(exp, token::now_epoch()) => {
                tracing::debug!("access token expired, attempting refresh");
                self.refresh().await
            }
            Ok(_) => true,
        }
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Concurrent callers coalesce onto a single in-flight network call:
    /// whoever acquires the gate first performs the exchange, and the rest
    /// adopt its outcome. On any failure the session is fully cleared.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> bool {
        let _gate = self.inner.refresh_gate.lock().await;

        // A caller that queued behind an in-flight refresh finds a fresh
        // token here and must not fire a second exchange.
        if let Some(current) = self.inner.state.access_token().await
            && token::decode_expiry(&current)
                .is_ok_and(|exp| !token::is_expired(exp, token::now_epoch()))
        {
            return true;
        }

        let Some(refresh_token) = self.inner.state.refresh_token().await else {
            return false;
        };

        let request = RefreshRequest {
            refresh_token: Some(&refresh_token),
        };

        match self
            .inner
            .api
            .post::<RefreshResponse, _>(REFRESH_PATH, &request)
            .await
        {
            Ok(response) => {
                self.inner
                    .state
                    .mutate(|session| {
                        session.access_token = Some(response.access_token);
                        if let Some(rotated) = response.refresh_token {
                            session.refresh_token = Some(rotated);
                        }
                    })
                    .await;
                tracing::debug!("access token refreshed");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed, logging out");
                self.logout().await;
                false
            }
        }
    }

    /// Notify the backend (best effort) and clear all session state.
    ///
    /// The server call is exempt from bearer injection and from the 401
    /// safety net, and its failure never blocks local cleanup. Idempotent:
    /// logging out while anonymous is a silent no-op.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Some(refresh_token) = self.inner.state.refresh_token().await {
            let request = LogoutRequest {
                refresh_token: Some(&refresh_token),
            };
            if let Err(e) = self
                .inner
                .api
                .post_exempt::<serde_json::Value, _>(LOGOUT_PATH, &request)
                .await
            {
                tracing::debug!(error = %e, "logout notification failed, clearing locally anyway");
            }
        }

        self.inner.state.clear().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    use base64::Engine as _;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use url::Url;

    fn make_jwt(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"1","exp":{exp}}}"#).as_bytes());
        format!("{header}.{payload}.sig")
    }

    fn profile() -> UserProfile {
        UserProfile {
            id: UserId::new(1),
            email: Email::parse("a@b.com").unwrap(),
            full_name: "Ada Admin".to_string(),
            role: UserRole::Admin,
            avatar_url: None,
            phone: None,
            verified: true,
        }
    }

    /// Manager wired to an unreachable backend: only network-free paths may
    /// be exercised.
    fn offline_manager() -> SessionManager {
        let config = ClientConfig::for_base_url(
            Url::parse("http://127.0.0.1:1/api/v1").unwrap(),
        );
        let state = SharedSession::load(Arc::new(MemorySessionStore::new()));
        let api = ApiClient::new(&config, Arc::clone(&state)).unwrap();
        SessionManager::new(state, api)
    }

    #[tokio::test]
    async fn test_is_valid_false_without_token() {
        let session = offline_manager();
        assert!(!session.is_valid().await);
    }

    #[tokio::test]
    async fn test_is_valid_fast_path_with_future_expiry() {
        let session = offline_manager();
        session
            .set_tokens(Some(make_jwt(token::now_epoch() + 3600)), None)
            .await;
        // Backend is unreachable: a true result proves no network was used.
        assert!(session.is_valid().await);
    }

    #[tokio::test]
    async fn test_malformed_token_clears_session() {
        let session = offline_manager();
        session
            .set_tokens(Some("garbage".to_string()), None)
            .await;
        session.set_user_info(Some(profile())).await;

        assert!(!session.is_valid().await);

        let snapshot = session.snapshot().await;
        assert!(snapshot.access_token.is_none());
        assert!(snapshot.user_info.is_none());
    }

    #[tokio::test]
    async fn test_expired_token_without_refresh_token_is_invalid() {
        let session = offline_manager();
        session
            .set_tokens(Some(make_jwt(token::now_epoch() - 10)), None)
            .await;
        // refresh() returns false immediately when no refresh token exists,
        // so this stays network-free.
        assert!(!session.is_valid().await);
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let session = offline_manager();
        session.logout().await;
        session.logout().await;
        assert!(session.snapshot().await.access_token.is_none());
    }

    #[tokio::test]
    async fn test_update_user_info_merges_fields() {
        let session = offline_manager();
        session.set_user_info(Some(profile())).await;
        session
            .update_user_info(|p| p.full_name = "Grace Admin".to_string())
            .await;

        let updated = session.user_info().await.unwrap();
        assert_eq!(updated.full_name, "Grace Admin");
        // Unrelated fields survive the partial update.
        assert_eq!(updated.email.as_str(), "a@b.com");
        assert!(updated.verified);
    }

    #[tokio::test]
    async fn test_set_authenticated_publishes_one_complete_transition() {
        let session = offline_manager();
        let mut changes = session.subscribe();

        session
            .set_authenticated(
                make_jwt(token::now_epoch() + 3600),
                Some("R1".to_string()),
                profile(),
            )
            .await;

        changes.changed().await.unwrap();
        let snapshot = changes.borrow_and_update().clone();
        // The first observable state already carries both halves.
        assert!(snapshot.is_authenticated());
        assert!(snapshot.user_info.is_some());
        // And nothing else was published.
        assert!(!changes.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_subscribers_observe_changes() {
        let session = offline_manager();
        let mut changes = session.subscribe();
        assert!(!changes.borrow().is_authenticated());

        session
            .set_tokens(Some(make_jwt(token::now_epoch() + 3600)), Some("R1".into()))
            .await;

        changes.changed().await.unwrap();
        assert!(changes.borrow().is_authenticated());
    }
}
