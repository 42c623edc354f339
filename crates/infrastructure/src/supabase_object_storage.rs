//! Supabase Storage adapter for the object storage port.
//!
//! Talks to the storage REST API directly with the service-role key; the
//! key never reaches the browser.

use async_trait::async_trait;
use serde::Deserialize;

use butik_application::ObjectStorage;
use butik_core::{AppError, AppResult};

/// Object storage backed by a Supabase Storage endpoint.
pub struct SupabaseObjectStorage {
    http_client: reqwest::Client,
    /// Storage API root, e.g. `https://project.supabase.co/storage/v1`.
    base_url: String,
    service_key: String,
}

impl SupabaseObjectStorage {
    /// Creates the adapter. A trailing slash on `base_url` is tolerated.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: String, service_key: String) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            service_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

#[async_trait]
impl ObjectStorage for SupabaseObjectStorage {
    async fn upload(
        &self,
        bucket: &str,
        object_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> AppResult<()> {
        let url = format!("{}/object/{bucket}/{object_name}", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.service_key)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|error| AppError::Internal(format!("storage upload failed: {error}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Internal(format!(
                "storage upload returned {status}: {body}"
            )));
        }

        tracing::debug!(bucket, object_name, "objek tersimpan");
        Ok(())
    }

    fn public_url(&self, bucket: &str, object_name: &str) -> String {
        format!("{}/object/public/{bucket}/{object_name}", self.base_url)
    }

    async fn create_signed_url(
        &self,
        bucket: &str,
        object_name: &str,
        expires_in_seconds: u32,
    ) -> AppResult<String> {
        let url = format!("{}/object/sign/{bucket}/{object_name}", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.service_key)
            .json(&serde_json::json!({ "expiresIn": expires_in_seconds }))
            .send()
            .await
            .map_err(|error| AppError::Internal(format!("storage signing failed: {error}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::Internal(format!(
                "storage signing returned {status}"
            )));
        }

        let signed: SignResponse = response
            .json()
            .await
            .map_err(|error| AppError::Internal(format!("invalid signing response: {error}")))?;

        // The API returns a path relative to the storage root.
        Ok(format!(
            "{}/{}",
            self.base_url,
            signed.signed_url.trim_start_matches('/')
        ))
    }
}
