//! Authentication endpoints and their session side effects.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::session::{SessionManager, UserProfile};

const LOGIN_PATH: &str = "admin/auth/login";
const REGISTER_PATH: &str = "auth/register";
const VERIFY_PATH: &str = "auth/verify";
const USER_INFO_PATH: &str = "users/userInfo";

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    user: UserProfile,
}

/// Self-registration payload. Accounts created this way await email
/// verification before they can sign in.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: UserProfile,
}

/// Sign-in, registration, and profile retrieval.
///
/// The only service that mutates the session: a successful login installs
/// both tokens and the profile atomically, so guard subscribers observe a
/// single transition.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    session: SessionManager,
}

impl AuthService {
    pub(crate) const fn new(api: ApiClient, session: SessionManager) -> Self {
        Self { api, session }
    }

    /// Exchange credentials for a session. On success the session manager
    /// holds the new tokens and profile; on failure it is left untouched.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ApiError> {
        let response: LoginResponse = self
            .api
            .post(LOGIN_PATH, &LoginRequest { email, password })
            .await?;

        self.session
            .set_authenticated(
                response.access_token,
                response.refresh_token,
                response.user.clone(),
            )
            .await;

        tracing::info!(user_id = %response.user.id, "signed in");
        Ok(response.user)
    }

    /// Create a new account. Never touches the session: the caller signs in
    /// separately once the account is verified.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        let _: serde_json::Value = self.api.post(REGISTER_PATH, request).await?;
        Ok(())
    }

    /// Confirm an email address with the token from the verification mail.
    #[instrument(skip_all)]
    pub async fn verify_email(&self, token: &str) -> Result<(), ApiError> {
        let _: serde_json::Value = self.api.post(VERIFY_PATH, &VerifyRequest { token }).await?;
        Ok(())
    }

    /// Fetch the signed-in user's profile and refresh the cached copy.
    #[instrument(skip(self))]
    pub async fn fetch_user_info(&self) -> Result<UserProfile, ApiError> {
        let envelope: UserEnvelope = self.api.get(USER_INFO_PATH).await?;
        self.session
            .set_user_info(Some(envelope.user.clone()))
            .await;
        Ok(envelope.user)
    }

    /// Sign out. Delegates to the session manager, which notifies the
    /// backend best-effort and clears local state unconditionally.
    pub async fn logout(&self) {
        self.session.logout().await;
    }
}
