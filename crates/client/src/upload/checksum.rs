//! Content integrity digest for direct uploads.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use md5::{Digest, Md5};

/// MD5 digest of the file content, base64-encoded over the raw 16 bytes.
///
/// This is the `Content-MD5` convention the storage backend verifies against
/// the negotiated blob record. Hex encoding is rejected by the backend; the
/// encoding here must stay base64-over-raw-digest.
#[must_use]
pub fn content_checksum(bytes: &[u8]) -> String {
    STANDARD.encode(Md5::digest(bytes))
}
