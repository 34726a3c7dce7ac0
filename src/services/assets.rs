// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Robot photo uploads to Cloud Storage.
//!
//! Uses the JSON API media upload. Uploading to an existing object name
//! overwrites it, so retrying an upload for the same team is safe.

use crate::error::AppError;
use async_trait::async_trait;

/// Default Cloud Storage endpoint.
pub const DEFAULT_STORAGE_BASE_URL: &str = "https://storage.googleapis.com";

/// Binary asset service used for profile photos.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Upload `bytes` under `key` and return its public URL.
    async fn upload(&self, key: &str, bytes: &[u8], content_type: &str)
        -> Result<String, AppError>;
}

/// Object name for a team's photo.
pub fn photo_object_name(team_number: u32, content_type: &str) -> String {
    let extension = match content_type {
        "image/png" => "png",
        "image/webp" => "webp",
        _ => "jpg",
    };
    format!("{}.{}", team_number, extension)
}

/// Cloud Storage client.
#[derive(Clone)]
pub struct CloudStorageAssets {
    http: reqwest::Client,
    base_url: String,
    bucket: String,
    access_token: Option<String>,
}

impl CloudStorageAssets {
    /// Create a client for `bucket`.
    ///
    /// `base_url` can point at a local storage emulator.
    pub fn new(base_url: &str, bucket: &str, access_token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            access_token,
        }
    }

    /// Public URL of an uploaded object.
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            self.bucket,
            urlencoding::encode(key)
        )
    }
}

#[async_trait]
impl AssetStore for CloudStorageAssets {
    async fn upload(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, AppError> {
        let url = format!("{}/upload/storage/v1/b/{}/o", self.base_url, self.bucket);

        let mut request = self
            .http
            .post(&url)
            .query(&[("uploadType", "media"), ("name", key)])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes.to_vec());
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::AssetStorage(format!("Upload request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::AssetStorage(format!("HTTP {}: {}", status, body)));
        }

        tracing::debug!(key, size = bytes.len(), "Uploaded asset");
        Ok(self.public_url(key))
    }
}
