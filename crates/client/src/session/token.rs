//! Local JWT expiry inspection.
//!
//! The client never verifies token signatures - that is the backend's job.
//! It only peeks at the `exp` claim so the session manager can decide whether
//! a refresh is needed before a request goes out.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while reading a token's expiry claim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token is not three dot-separated segments.
    #[error("token is not a three-segment JWT")]
    Malformed,
    /// The payload segment is not valid base64url.
    #[error("token payload is not valid base64url: {0}")]
    Encoding(String),
    /// The payload segment is not a JSON object.
    #[error("token payload is not valid JSON: {0}")]
    Payload(String),
    /// The payload carries no `exp` claim.
    #[error("token payload has no exp claim")]
    MissingExpiry,
}

#[derive(Debug, Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Decode the `exp` claim (seconds since epoch) from a JWT without touching
/// the network or verifying the signature.
///
/// # Errors
///
/// Returns a [`TokenError`] when the token is structurally invalid or the
/// payload carries no expiry. The session manager treats any of these as an
/// unrecoverable credential failure.
pub fn decode_expiry(token: &str) -> Result<i64, TokenError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenError::Malformed);
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| TokenError::Encoding(e.to_string()))?;

    let claims: Claims =
        serde_json::from_slice(&bytes).map_err(|e| TokenError::Payload(e.to_string()))?;

    claims.exp.ok_or(TokenError::MissingExpiry)
}

/// Current wall-clock time in seconds since the Unix epoch.
#[must_use]
pub fn now_epoch() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Whether a token expiring at `exp` is stale at `now`.
///
/// Strict comparison with no clock-skew grace: a token is expired the second
/// its `exp` claim is in the past.
#[must_use]
pub const fn is_expired(exp: i64, now: i64) -> bool {
    exp < now
}
