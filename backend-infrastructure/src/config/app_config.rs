use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use backend_domain::RuntimeConfig;

use crate::config::validate_engine_url;
use crate::utils::{non_blank, strip_quotes, trim_trailing_slash};

pub const CONFIG_PATH_ENV: &str = "DAST_CONFIG";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub zap_url: String,
    pub zap_api_key: Option<String>,
    pub poll_interval_ms: u64,
    pub job_poll_interval_ms: u64,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub ai_provider: String,
    pub ai_model: String,
    pub ai_api_key: Option<String>,
    pub ai_base_url: String,
    pub gcs_bucket: Option<String>,
    pub gcs_access_token: Option<String>,
    pub log_dir: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let runtime = RuntimeConfig::default();
        Self {
            bind_addr: runtime.bind_addr,
            api_token: runtime.api_token,
            zap_url: runtime.zap_url,
            zap_api_key: runtime.zap_api_key,
            poll_interval_ms: runtime.poll_interval_ms,
            job_poll_interval_ms: runtime.job_poll_interval_ms,
            max_body_bytes: runtime.max_body_bytes,
            request_timeout_seconds: runtime.request_timeout_seconds,
            ai_provider: runtime.ai_provider,
            ai_model: runtime.ai_model,
            ai_api_key: runtime.ai_api_key,
            ai_base_url: runtime.ai_base_url,
            gcs_bucket: runtime.gcs_bucket,
            gcs_access_token: runtime.gcs_access_token,
            log_dir: runtime.log_dir,
        }
    }
}

impl AppConfig {
    /// Loads from `DAST_CONFIG` (default `./config.toml`), or `path` when given.
    pub async fn load(path: Option<&str>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_string(),
            None => env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "./config.toml".to_string()),
        };
        let mut config = Self::read_file(Path::new(&path)).await?;
        config.apply_overrides(|key| env::var(key).ok());
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    async fn read_file(file_path: &Path) -> Result<Self> {
        if !file_path.exists() {
            warn!("{} not found, using defaults", file_path.display());
            return Ok(AppConfig::default());
        }
        let content = fs::read_to_string(file_path).await?;
        let config: AppConfig = toml::from_str(&content)
            .map_err(|err| anyhow!("invalid config {}: {}", file_path.display(), err))?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        self.api_token = non_blank(self.api_token.take());
        self.zap_api_key = non_blank(self.zap_api_key.take().map(|key| strip_quotes(&key)));
        self.ai_api_key = non_blank(self.ai_api_key.take().map(|key| strip_quotes(&key)));
        self.gcs_bucket = non_blank(self.gcs_bucket.take().map(|bucket| bucket.trim().to_string()));
        self.gcs_access_token =
            non_blank(self.gcs_access_token.take().map(|token| strip_quotes(&token)));
        self.log_dir = non_blank(self.log_dir.take());
        self.zap_url = trim_trailing_slash(&self.zap_url);
        self.ai_base_url = trim_trailing_slash(&self.ai_base_url);
        self.ai_provider = self.ai_provider.trim().to_lowercase();
        self.ai_model = self.ai_model.trim().to_string();
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        validate_engine_url(&self.zap_url)?;
        if self.poll_interval_ms == 0 || self.job_poll_interval_ms == 0 {
            return Err(anyhow!("poll intervals must be greater than 0"));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            api_token: self.api_token.clone(),
            zap_url: self.zap_url.clone(),
            zap_api_key: self.zap_api_key.clone(),
            poll_interval_ms: self.poll_interval_ms,
            job_poll_interval_ms: self.job_poll_interval_ms,
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
            ai_provider: self.ai_provider.clone(),
            ai_model: self.ai_model.clone(),
            ai_api_key: self.ai_api_key.clone(),
            ai_base_url: self.ai_base_url.clone(),
            gcs_bucket: self.gcs_bucket.clone(),
            gcs_access_token: self.gcs_access_token.clone(),
            log_dir: self.log_dir.clone(),
        }
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("DAST_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Some(value) = lookup("DAST_API_TOKEN") {
            self.api_token = Some(value);
        }
        if let Some(value) = lookup("DAST_ZAP_URL").or_else(|| lookup("ZAP_URL")) {
            self.zap_url = value;
        }
        if let Some(value) = lookup("DAST_ZAP_API_KEY").or_else(|| lookup("ZAP_API_KEY")) {
            self.zap_api_key = Some(value);
        }
        if let Some(value) = lookup("DAST_POLL_INTERVAL_MS") {
            self.poll_interval_ms = value.parse().unwrap_or(self.poll_interval_ms);
        }
        if let Some(value) = lookup("DAST_JOB_POLL_INTERVAL_MS") {
            self.job_poll_interval_ms = value.parse().unwrap_or(self.job_poll_interval_ms);
        }
        if let Some(value) = lookup("DAST_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Some(value) = lookup("DAST_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Some(value) = lookup("DAST_AI_PROVIDER").or_else(|| lookup("AI_PROVIDER")) {
            self.ai_provider = value;
        }
        if let Some(value) = lookup("DAST_AI_MODEL").or_else(|| lookup("AI_MODEL")) {
            self.ai_model = value;
        }
        if let Some(value) = lookup("DAST_AI_API_KEY").or_else(|| lookup("GEMINI_API_KEY")) {
            self.ai_api_key = Some(value);
        }
        if let Some(value) = lookup("DAST_AI_BASE_URL").or_else(|| lookup("AI_BASE_URL")) {
            if !value.trim().is_empty() {
                self.ai_base_url = value;
            }
        }
        if let Some(value) = lookup("DAST_GCS_BUCKET").or_else(|| lookup("GCS_BUCKET")) {
            self.gcs_bucket = Some(value);
        }
        if let Some(value) =
            lookup("DAST_GCS_ACCESS_TOKEN").or_else(|| lookup("GCS_ACCESS_TOKEN"))
        {
            self.gcs_access_token = Some(value);
        }
        if let Some(value) = lookup("DAST_LOG_DIR") {
            self.log_dir = Some(value);
        }
    }
}
