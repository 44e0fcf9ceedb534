//! Error taxonomy for the client SDK.
//!
//! Credential failures are handled centrally by the request pipeline and the
//! session manager; call sites never special-case a 401. Every other failure
//! propagates to the immediate caller.

use thiserror::Error;

/// Errors produced by the request pipeline and the endpoint wrappers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The server rejected the credentials (401). The session has already
    /// been cleared by the time this is returned.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-2xx response, carrying the server-provided message when
    /// one exists.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server-provided error message, or the canonical status reason.
        message: String,
    },

    /// A request URL could not be built from the configured base.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Whether this error means the caller's session is gone.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

/// Stage of the direct-upload flow that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    /// Upload-ticket negotiation with the backend.
    Negotiate,
    /// Binary PUT to object storage.
    Transfer,
}

impl core::fmt::Display for UploadStage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Negotiate => f.write_str("negotiate"),
            Self::Transfer => f.write_str("transfer"),
        }
    }
}

/// Errors produced by the upload coordinator.
///
/// `Rejected` is the only variant raised before any network traffic; a file
/// that fails validation never reaches the backend.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The file failed local validation (size or MIME type).
    #[error("File rejected: {0}")]
    Rejected(String),

    /// Reading the file from disk failed.
    #[error("File read error: {0}")]
    Io(#[from] std::io::Error),

    /// A network stage failed; no blob reference was produced.
    #[error("Upload {stage} failed: {source}")]
    Failed {
        /// Which stage broke.
        stage: UploadStage,
        /// The underlying pipeline error.
        #[source]
        source: ApiError,
    },

    /// Object storage answered the PUT with a non-2xx status.
    #[error("Upload transfer rejected by storage ({status}): {message}")]
    StorageRejected {
        /// HTTP status code returned by the storage endpoint.
        status: u16,
        /// Response body, when readable.
        message: String,
    },
}
