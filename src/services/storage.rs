use crate::{config::AppConfig, errors::ServiceError};
use bytes::Bytes;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{error, info, instrument};
use utoipa::ToSchema;

/// Maximum accepted upload size (5 MiB)
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Content types accepted for product images
pub const ALLOWED_IMAGE_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
];

/// Result of a successful upload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StoredObject {
    pub file_name: String,
    pub url: String,
}

/// Client for the hosted object storage service holding product images.
///
/// Speaks the storage REST surface directly: `POST`/`DELETE` on
/// `/storage/v1/object/{bucket}/{name}`, with public reads served from
/// `/storage/v1/object/public/{bucket}/{name}`.
#[derive(Clone)]
pub struct ObjectStorageService {
    http: reqwest::Client,
    base_url: String,
    bucket: String,
    service_key: String,
}

impl ObjectStorageService {
    pub fn new(
        base_url: impl Into<String>,
        bucket: impl Into<String>,
        service_key: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            bucket: bucket.into(),
            service_key: service_key.into(),
        }
    }

    /// Build the service from configuration; `None` when storage is not
    /// configured (uploads are then rejected at the handler).
    pub fn from_config(cfg: &AppConfig) -> Option<Self> {
        let base_url = cfg.storage_url.clone()?;
        let service_key = cfg.storage_service_key.clone()?;
        Some(Self::new(base_url, cfg.storage_bucket.clone(), service_key))
    }

    fn object_url(&self, file_name: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, file_name
        )
    }

    /// Public URL under which an uploaded object is served
    pub fn public_url(&self, file_name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, file_name
        )
    }

    /// Upload an object into the bucket
    #[instrument(skip(self, bytes))]
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<StoredObject, ServiceError> {
        let response = self
            .http
            .post(self.object_url(file_name))
            .bearer_auth(&self.service_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header(reqwest::header::CACHE_CONTROL, "max-age=3600")
            .body(bytes)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, file_name, "Storage upload request failed");
                ServiceError::InternalError(format!("storage upload failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            error!(%status, file_name, "Storage upload rejected");
            return Err(ServiceError::InternalError(format!(
                "storage upload rejected with status {}",
                status
            )));
        }

        info!(file_name, "Uploaded object");
        Ok(StoredObject {
            file_name: file_name.to_string(),
            url: self.public_url(file_name),
        })
    }

    /// Delete an object from the bucket
    #[instrument(skip(self))]
    pub async fn delete(&self, file_name: &str) -> Result<(), ServiceError> {
        let response = self
            .http
            .delete(self.object_url(file_name))
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, file_name, "Storage delete request failed");
                ServiceError::InternalError(format!("storage delete failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            error!(%status, file_name, "Storage delete rejected");
            return Err(ServiceError::InternalError(format!(
                "storage delete rejected with status {}",
                status
            )));
        }

        info!(file_name, "Deleted object");
        Ok(())
    }
}

/// Generate a unique object name, keeping the original extension
pub fn generate_file_name(original_name: &str) -> String {
    let timestamp = Utc::now().timestamp_millis();
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin");
    format!("{}-{}.{}", timestamp, token.to_lowercase(), ext)
}
