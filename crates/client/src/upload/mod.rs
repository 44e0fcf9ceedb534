//! Direct-to-storage file uploads.
//!
//! Files never travel through the API as payloads. The coordinator runs the
//! two-phase protocol instead: negotiate a blob record with the backend
//! (metadata plus integrity checksum), then PUT the raw bytes straight to
//! the storage URL the backend signed. The returned blob reference is later
//! attached to a product or banner by the entity services.

use std::collections::HashMap;
use std::path::Path;

use reqwest::header::{CONTENT_LENGTH, HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use green_mango_core::AttachmentId;

use crate::api::ApiClient;
use crate::config::UploadConfig;
use crate::error::{ApiError, UploadError, UploadStage};

pub mod checksum;

const DIRECT_UPLOADS_PATH: &str = "direct_uploads";

/// A file staged for upload: name, declared MIME type, and content.
#[derive(Debug, Clone)]
pub struct LocalFile {
    /// Name reported to the backend, e.g. `photo.jpg`.
    pub filename: String,
    /// Declared MIME type, validated against the allow-list before upload.
    pub content_type: String,
    /// Raw content.
    pub bytes: Vec<u8>,
}

impl LocalFile {
    #[must_use]
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing the MIME type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, UploadError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().into_owned());
        let content_type = guess_content_type(path).to_string();
        Ok(Self {
            filename,
            content_type,
            bytes,
        })
    }

    /// Size in bytes as reported to the backend.
    #[must_use]
    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

fn guess_content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Outcome of the negotiate phase: where to PUT the bytes and how.
#[derive(Debug, Clone)]
pub struct UploadTicket {
    /// Presigned storage URL. Carries its own authorization; the API bearer
    /// token must not be sent with it.
    pub target_url: String,
    /// Headers the storage endpoint requires verbatim.
    pub required_headers: HashMap<String, String>,
    /// Opaque reference identifying the blob record, e.g. a signed ID.
    pub blob_reference: String,
}

#[derive(Serialize)]
struct DirectUploadRequest<'a> {
    blob: BlobParams<'a>,
}

#[derive(Serialize)]
struct BlobParams<'a> {
    filename: &'a str,
    byte_size: u64,
    checksum: &'a str,
    content_type: &'a str,
}

#[derive(Deserialize)]
struct DirectUploadResponse {
    direct_upload: DirectUploadTarget,
    blob_signed_id: String,
}

#[derive(Deserialize)]
struct DirectUploadTarget {
    url: String,
    #[serde(default)]
    headers: HashMap<String, String>,
}

/// The set of attachments a form edit converges on: surviving existing
/// attachments plus blob references for freshly uploaded files.
///
/// Entity update payloads are built from this, so removing an existing
/// attachment is expressed by its absence from `kept_existing_ids`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentSet {
    kept: Vec<AttachmentId>,
    new_refs: Vec<String>,
}

impl AttachmentSet {
    /// Start from the attachments currently on the entity.
    #[must_use]
    pub fn for_existing(ids: Vec<AttachmentId>) -> Self {
        Self {
            kept: ids,
            new_refs: Vec::new(),
        }
    }

    /// Mark an existing attachment for removal.
    pub fn remove_existing(&mut self, id: AttachmentId) {
        self.kept.retain(|kept| *kept != id);
    }

    /// Record a freshly uploaded blob reference, preserving upload order.
    pub fn push_new(&mut self, blob_reference: String) {
        self.new_refs.push(blob_reference);
    }

    /// Drop a pending new upload (e.g. the user removed it from the form
    /// before saving).
    pub fn remove_new(&mut self, blob_reference: &str) {
        self.new_refs.retain(|r| r != blob_reference);
    }

    /// Existing attachment IDs that survive the edit.
    #[must_use]
    pub fn kept_existing_ids(&self) -> &[AttachmentId] {
        &self.kept
    }

    /// Blob references for files uploaded during the edit.
    #[must_use]
    pub fn new_blob_references(&self) -> &[String] {
        &self.new_refs
    }
}

/// Runs validate → checksum → negotiate → transfer for each file.
#[derive(Clone)]
pub struct UploadCoordinator {
    api: ApiClient,
    /// Bare client for the presigned PUT; sends no bearer header.
    storage: reqwest::Client,
    limits: UploadConfig,
}

impl UploadCoordinator {
    pub(crate) fn new(api: ApiClient, limits: UploadConfig) -> Result<Self, ApiError> {
        let storage = reqwest::Client::builder().build()?;
        Ok(Self {
            api,
            storage,
            limits,
        })
    }

    /// Check a file against the configured limits without touching the
    /// network. Size is checked before type.
    pub fn validate(&self, file: &LocalFile) -> Result<(), UploadError> {
        if file.byte_size() > self.limits.max_bytes {
            let limit_mb = self.limits.max_bytes / (1024 * 1024);
            return Err(UploadError::Rejected(format!(
                "File size must be less than {limit_mb}MB"
            )));
        }
        if !self
            .limits
            .allowed_types
            .iter()
            .any(|t| t == &file.content_type)
        {
            return Err(UploadError::Rejected(format!(
                "File type must be one of: {}",
                self.limits.allowed_types.join(", ")
            )));
        }
        Ok(())
    }

    /// Upload one file and return its blob reference.
    #[instrument(skip(self, file), fields(filename = %file.filename, bytes = file.byte_size()))]
    pub async fn upload(&self, file: &LocalFile) -> Result<String, UploadError> {
        self.validate(file)?;

        let checksum = checksum::content_checksum(&file.bytes);
        let ticket = self.negotiate(file, &checksum).await?;
        self.transfer(file, &ticket).await?;

        tracing::debug!(blob_reference = %ticket.blob_reference, "upload complete");
        Ok(ticket.blob_reference)
    }

    /// Upload several files sequentially, preserving input order in the
    /// returned references. Fails on the first error.
    pub async fn upload_all(&self, files: &[LocalFile]) -> Result<Vec<String>, UploadError> {
        let mut references = Vec::with_capacity(files.len());
        for file in files {
            references.push(self.upload(file).await?);
        }
        Ok(references)
    }

    /// Phase one: register blob metadata with the backend and obtain the
    /// presigned target.
    async fn negotiate(
        &self,
        file: &LocalFile,
        checksum: &str,
    ) -> Result<UploadTicket, UploadError> {
        let request = DirectUploadRequest {
            blob: BlobParams {
                filename: &file.filename,
                byte_size: file.byte_size(),
                checksum,
                content_type: &file.content_type,
            },
        };

        let response: DirectUploadResponse = self
            .api
            .post(DIRECT_UPLOADS_PATH, &request)
            .await
            .map_err(|source| UploadError::Failed {
                stage: UploadStage::Negotiate,
                source,
            })?;

        Ok(UploadTicket {
            target_url: response.direct_upload.url,
            required_headers: response.direct_upload.headers,
            blob_reference: response.blob_signed_id,
        })
    }

    /// Phase two: PUT the raw bytes to the presigned URL.
    async fn transfer(&self, file: &LocalFile, ticket: &UploadTicket) -> Result<(), UploadError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &ticket.required_headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "skipping unrepresentable upload header"),
            }
        }
        headers.insert(CONTENT_LENGTH, HeaderValue::from(file.byte_size()));

        let response = self
            .storage
            .put(&ticket.target_url)
            .headers(headers)
            .body(file.bytes.clone())
            .send()
            .await
            .map_err(|e| UploadError::Failed {
                stage: UploadStage::Transfer,
                source: ApiError::Http(e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(UploadError::StorageRejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
