//! Object storage client for payment evidence files
//!
//! Bank-transfer screenshots are uploaded to a storage service exposing a
//! Supabase-style REST surface: authenticated `POST /storage/v1/object/...`
//! for uploads, with a public URL derivable from the object path.

use crate::config::StorageConfig;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage client initialization failed: {0}")]
    Initialization(String),

    #[error("Upload rejected: {message}")]
    UploadRejected { status: u16, message: String },

    #[error("Storage request failed: {0}")]
    Network(String),

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),
}

/// Allowed evidence content types with their file extensions
const ALLOWED_CONTENT_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("application/pdf", "pdf"),
];

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct ObjectStorageClient {
    client: Client,
    base_url: String,
    bucket: String,
    service_key: String,
}

impl ObjectStorageClient {
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .map_err(|e| StorageError::Initialization(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            service_key: config.service_key.clone(),
        })
    }

    /// Upload payment evidence and return its public URL.
    ///
    /// The object path is generated from the invoice id and a fresh UUID so
    /// repeated uploads for the same invoice never collide.
    pub async fn upload_evidence(
        &self,
        invoice_id: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        let extension = validate_upload(content_type, bytes.len())?;
        let path = format!("evidence/{}/{}.{}", invoice_id, Uuid::new_v4(), extension);
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.service_key)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| StorageError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::UploadRejected {
                status: status.as_u16(),
                message: body,
            });
        }

        info!(path = %path, "evidence uploaded");

        Ok(self.public_url(&path))
    }

    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }
}

/// Reject unsupported content types and oversized payloads up front
fn validate_upload(content_type: &str, size: usize) -> Result<&'static str, StorageError> {
    if size == 0 {
        return Err(StorageError::InvalidUpload("file is empty".to_string()));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(StorageError::InvalidUpload(format!(
            "file exceeds {} byte limit",
            MAX_UPLOAD_BYTES
        )));
    }

    ALLOWED_CONTENT_TYPES
        .iter()
        .find(|(ct, _)| *ct == content_type)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| {
            StorageError::InvalidUpload(format!("unsupported content type: {}", content_type))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_content_types_map_to_extensions() {
        assert_eq!(validate_upload("image/png", 100).unwrap(), "png");
        assert_eq!(validate_upload("image/jpeg", 100).unwrap(), "jpg");
        assert_eq!(validate_upload("application/pdf", 100).unwrap(), "pdf");
    }

    #[test]
    fn unsupported_content_type_is_rejected() {
        assert!(validate_upload("text/html", 100).is_err());
        assert!(validate_upload("image/gif", 100).is_err());
    }

    #[test]
    fn empty_and_oversized_files_are_rejected() {
        assert!(validate_upload("image/png", 0).is_err());
        assert!(validate_upload("image/png", MAX_UPLOAD_BYTES + 1).is_err());
        assert!(validate_upload("image/png", MAX_UPLOAD_BYTES).is_ok());
    }

    #[test]
    fn public_url_is_derived_from_object_path() {
        let client = ObjectStorageClient::new(&StorageConfig {
            base_url: "https://files.example.com/".to_string(),
            bucket: "payments".to_string(),
            service_key: "sk".to_string(),
            request_timeout: 5,
        })
        .expect("client should build");

        assert_eq!(
            client.public_url("evidence/inv_1/abc.png"),
            "https://files.example.com/storage/v1/object/public/payments/evidence/inv_1/abc.png"
        );
    }
}
