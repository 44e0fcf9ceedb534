//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `GM_API_BASE_URL` - API base URL (default: `http://localhost:3000/api/v1`)
//! - `GM_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 10)
//! - `GM_UPLOAD_MAX_BYTES` - Maximum upload size in bytes (default: 5 MiB)
//! - `GM_UPLOAD_ALLOWED_TYPES` - Comma-separated MIME allow-list
//!   (default: `image/jpeg,image/png`)
//! - `GM_SESSION_FILE` - Path of the persisted session record
//!   (default: `~/.green-mango/session.json`)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:3000/api/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_UPLOAD_MAX_BYTES: u64 = 5 * 1024 * 1024;
const DEFAULT_ALLOWED_TYPES: &[&str] = &["image/jpeg", "image/png"];
const SESSION_FILE_NAME: &str = "session.json";
const SESSION_DIR_NAME: &str = ".green-mango";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Upload validation limits.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Maximum file size in bytes.
    pub max_bytes: u64,
    /// Accepted MIME types.
    pub allowed_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
            allowed_types: DEFAULT_ALLOWED_TYPES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Green Mango client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every relative API path is joined against.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Upload validation limits.
    pub upload: UploadConfig,
    /// Path of the persisted session record.
    pub session_file: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present. Every
    /// variable is optional; unset variables fall back to the documented
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = get_env_or_default("GM_API_BASE_URL", DEFAULT_BASE_URL);
        let base_url = Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("GM_API_BASE_URL".to_string(), e.to_string()))?;

        let timeout_secs = get_env_or_default("GM_HTTP_TIMEOUT_SECS", &DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("GM_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        let max_bytes = get_env_or_default("GM_UPLOAD_MAX_BYTES", &DEFAULT_UPLOAD_MAX_BYTES.to_string())
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("GM_UPLOAD_MAX_BYTES".to_string(), e.to_string())
            })?;

        let allowed_types = match get_optional_env("GM_UPLOAD_ALLOWED_TYPES") {
            Some(raw) => raw
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            None => DEFAULT_ALLOWED_TYPES
                .iter()
                .map(ToString::to_string)
                .collect(),
        };

        let session_file = get_optional_env("GM_SESSION_FILE")
            .map_or_else(default_session_file, PathBuf::from);

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            upload: UploadConfig {
                max_bytes,
                allowed_types,
            },
            session_file,
        })
    }

    /// Build a config around an explicit base URL, keeping every other
    /// setting at its default. Used by tests pointing at a mock backend.
    #[must_use]
    pub fn for_base_url(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            upload: UploadConfig::default(),
            session_file: default_session_file(),
        }
    }
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// `~/.green-mango/session.json`, falling back to the working directory when
/// no home directory is resolvable.
fn default_session_file() -> PathBuf {
    std::env::home_dir().map_or_else(
        || PathBuf::from(SESSION_FILE_NAME),
        |home| home.join(SESSION_DIR_NAME).join(SESSION_FILE_NAME),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_defaults() {
        let upload = UploadConfig::default();
        assert_eq!(upload.max_bytes, 5 * 1024 * 1024);
        assert_eq!(upload.allowed_types, vec!["image/jpeg", "image/png"]);
    }

    #[test]
    fn test_for_base_url() {
        let url = Url::parse("http://localhost:9999/api/v1").unwrap();
        let config = ClientConfig::for_base_url(url.clone());
        assert_eq!(config.base_url, url);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_default_session_file_name() {
        let path = default_session_file();
        assert!(path.to_string_lossy().ends_with(SESSION_FILE_NAME));
    }
}
