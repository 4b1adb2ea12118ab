use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tokio::fs;
use tracing::info;

use backend_domain::ports::ReportUploader;
use backend_domain::RuntimeConfig;

use crate::utils::trim_trailing_slash;

pub const GCS_BASE_URL: &str = "https://storage.googleapis.com";

/// Uploads report files to a Cloud Storage bucket through the JSON media upload API.
pub struct GcsReportUploader {
    client: Client,
    base_url: String,
    bucket: String,
    access_token: String,
}

impl GcsReportUploader {
    pub fn new(
        base_url: &str,
        bucket: &str,
        access_token: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let bucket = bucket.trim();
        if bucket.is_empty() {
            return Err(anyhow!("bucket name must not be empty"));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: trim_trailing_slash(base_url),
            bucket: bucket.to_string(),
            access_token: access_token.to_string(),
        })
    }

    pub fn from_config(config: &RuntimeConfig, bucket: &str) -> Result<Self> {
        let token = config
            .gcs_access_token
            .as_deref()
            .ok_or_else(|| anyhow!("GCS access token not configured"))?;
        Self::new(
            GCS_BASE_URL,
            bucket,
            token,
            Duration::from_secs(config.request_timeout_seconds.max(1)),
        )
    }
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") | Some("sarif") | Some("ocsf") => "application/json",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl ReportUploader for GcsReportUploader {
    async fn upload(&self, local_path: &Path, key: &str) -> Result<String> {
        let bytes = fs::read(local_path).await?;
        let url = format!("{}/upload/storage/v1/b/{}/o", self.base_url, self.bucket);
        self.client
            .post(&url)
            .query(&[("uploadType", "media"), ("name", key)])
            .bearer_auth(&self.access_token)
            .header(CONTENT_TYPE, content_type_for(local_path))
            .body(bytes)
            .send()
            .await?
            .error_for_status()?;
        let location = format!("gs://{}/{}", self.bucket, key);
        info!(location = %location, "report uploaded");
        Ok(location)
    }
}
