//! Admin user management.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use green_mango_core::{Email, Paginated, UserId, UserRole};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::services::ListQuery;

const USERS_PATH: &str = "admin/users";

/// A back-office user account as the admin API reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub full_name: String,
    pub role: UserRole,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set when the account is soft-deleted.
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Fields for creating a user from the admin side.
///
/// `avatar` carries a blob reference from the upload coordinator; the
/// backend attaches the uploaded image to the new account.
#[derive(Debug, Clone, Serialize)]
pub struct UserCreate {
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub full_name: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Partial user update; unset fields are left unchanged by the backend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Replaces the current avatar when set, by blob reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Serialize)]
struct UserBody<T: Serialize> {
    user: T,
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: User,
}

#[derive(Clone)]
pub struct UsersService {
    api: ApiClient,
}

impl UsersService {
    pub(crate) const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// List users with the given filters.
    #[instrument(skip_all)]
    pub async fn list(&self, query: &ListQuery) -> Result<Paginated<User>, ApiError> {
        self.api.get_with(USERS_PATH, query).await
    }

    pub async fn get(&self, id: UserId) -> Result<User, ApiError> {
        let envelope: UserEnvelope = self.api.get(&format!("{USERS_PATH}/{id}")).await?;
        Ok(envelope.user)
    }

    #[instrument(skip_all, fields(email = %params.email))]
    pub async fn create(&self, params: &UserCreate) -> Result<User, ApiError> {
        let envelope: UserEnvelope = self
            .api
            .post(USERS_PATH, &UserBody { user: params })
            .await?;
        Ok(envelope.user)
    }

    #[instrument(skip_all, fields(%id))]
    pub async fn update(&self, id: UserId, params: &UserUpdate) -> Result<User, ApiError> {
        let envelope: UserEnvelope = self
            .api
            .put(&format!("{USERS_PATH}/{id}"), &UserBody { user: params })
            .await?;
        Ok(envelope.user)
    }

    #[instrument(skip(self), fields(%id))]
    pub async fn delete(&self, id: UserId) -> Result<(), ApiError> {
        self.api.delete(&format!("{USERS_PATH}/{id}")).await
    }
}
