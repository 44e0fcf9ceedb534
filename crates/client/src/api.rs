//! HTTP request pipeline shared by every service.
//!
//! All backend traffic funnels through [`ApiClient`], which applies the
//! cross-cutting policy in one place: bearer injection from the live
//! session, JSON body decoding, API error extraction, and the 401 safety
//! net that clears session state when the backend revokes a token.

use std::sync::Arc;

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::state::SharedSession;

/// Thin wrapper over [`reqwest::Client`] bound to one base URL and one
/// session. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    /// Always carries a trailing slash so `Url::join` appends instead of
    /// replacing the last path segment.
    base_url: Url,
    session: Arc<SharedSession>,
}

/// Shapes the backend uses for error payloads, tried in order.
#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    errors: Vec<String>,
}

fn extract_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(message) = parsed.message {
            return message;
        }
        if let Some(error) = parsed.error {
            return error;
        }
        if !parsed.errors.is_empty() {
            return parsed.errors.join(", ");
        }
    }
    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}

impl ApiClient {
    pub(crate) fn new(
        config: &ClientConfig,
        session: Arc<SharedSession>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url,
                session,
            }),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    /// GET with no query string.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        self.execute(self.inner.http.get(url), true).await
    }

    /// GET with a serialized query string. `None` fields are omitted by the
    /// query types themselves.
    pub async fn get_with<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        self.execute(self.inner.http.get(url).query(query), true)
            .await
    }

    /// POST a JSON body.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        self.execute(self.inner.http.post(url).json(body), true)
            .await
    }

    /// POST outside the authenticated pipeline: no bearer header and no 401
    /// session cleanup. Used for the logout notification, where a rejected
    /// credential must not re-trigger cleanup recursively.
    pub(crate) async fn post_exempt<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        self.execute(self.inner.http.post(url).json(body), false)
            .await
    }

    /// PUT a JSON body.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        self.execute(self.inner.http.put(url).json(body), true)
            .await
    }

    /// PATCH a JSON body, discarding any response payload.
    pub async fn patch_empty<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        self.execute_discard(self.inner.http.patch(url).json(body))
            .await
    }

    /// DELETE, discarding any response payload.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.endpoint(path)?;
        self.execute_discard(self.inner.http.delete(url)).await
    }

    #[instrument(skip(self, request))]
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        authorized: bool,
    ) -> Result<T, ApiError> {
        let body = self.send(request, authorized).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn execute_discard(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<(), ApiError> {
        self.send(request, true).await.map(drop)
    }

    /// Run one request through the pipeline and return the raw success body.
    async fn send(
        &self,
        mut request: reqwest::RequestBuilder,
        authorized: bool,
    ) -> Result<String, ApiError> {
        if authorized && let Some(token) = self.inner.session.access_token().await {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.text().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_message(status, &body);

        if status == StatusCode::UNAUTHORIZED && authorized {
            tracing::warn!(%message, "backend rejected credentials, clearing session");
            self.inner.session.clear().await;
            return Err(ApiError::Unauthorized(message));
        }

        Err(ApiError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;

    fn client(base: &str) -> ApiClient {
        let config = ClientConfig::for_base_url(Url::parse(base).unwrap());
        let state = SharedSession::load(Arc::new(MemorySessionStore::new()));
        ApiClient::new(&config, state).unwrap()
    }

    #[test]
    fn test_endpoint_preserves_base_path() {
        let api = client("http://localhost:3000/api/v1");
        let url = api.endpoint("admin/products").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/v1/admin/products");
    }

    #[test]
    fn test_endpoint_tolerates_leading_slash() {
        let api = client("http://localhost:3000/api/v1/");
        let url = api.endpoint("/admin/auth/login").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/v1/admin/auth/login"
        );
    }

    #[test]
    fn test_extract_message_prefers_message_field() {
        let message = extract_message(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message":"Name is required","errors":["other"]}"#,
        );
        assert_eq!(message, "Name is required");
    }

    #[test]
    fn test_extract_message_joins_errors_list() {
        let message = extract_message(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"errors":["Name is required","Price must be positive"]}"#,
        );
        assert_eq!(message, "Name is required, Price must be positive");
    }

    #[test]
    fn test_extract_message_falls_back_to_canonical_reason() {
        let message = extract_message(StatusCode::NOT_FOUND, "");
        assert_eq!(message, "Not Found");
    }
}
