use serde::{Deserialize, Serialize};

use crate::entities::{ScanConfig, ScanRule};
use crate::value_objects::{ReportFormat, ScanType};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateScanRequest {
    pub target_url: String,
    #[serde(default)]
    pub scan_type: Option<String>,
    #[serde(default, alias = "scan_types")]
    pub checks: Vec<String>,
    #[serde(default)]
    pub report_format: Option<ReportFormat>,
    #[serde(default)]
    pub custom_rules: Option<Vec<ScanRule>>,
}

impl CreateScanRequest {
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            scan_type: self
                .scan_type
                .as_deref()
                .map(ScanType::from)
                .unwrap_or_default(),
            checks: self
                .checks
                .iter()
                .map(|check| check.trim().to_string())
                .filter(|check| !check.is_empty())
                .collect(),
            custom_rules: self.custom_rules.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultsQuery {
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsQuery {
    pub format: Option<String>,
}

/// Settings the application layer runs with, resolved from file and environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
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

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            api_token: None,
            zap_url: "http://zap:8080".to_string(),
            zap_api_key: None,
            poll_interval_ms: 2_000,
            job_poll_interval_ms: 5_000,
            max_body_bytes: 16 * 1024 * 1024,
            request_timeout_seconds: 30,
            ai_provider: "google".to_string(),
            ai_model: "gemini-1.5-pro".to_string(),
            ai_api_key: None,
            ai_base_url: "https://generativelanguage.googleapis.com".to_string(),
            gcs_bucket: None,
            gcs_access_token: None,
            log_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_accepts_legacy_check_field() {
        let request: CreateScanRequest = serde_json::from_str(
            r#"{"target_url":"example.com","scan_type":"api","scan_types":["XSS"," "]}"#,
        )
        .expect("parse request");
        let config = request.scan_config();
        assert_eq!(config.scan_type, ScanType::Api);
        assert_eq!(config.checks, vec!["XSS".to_string()]);
        assert!(config.custom_rules.is_empty());
    }

    #[test]
    fn create_request_defaults_to_web() {
        let request: CreateScanRequest =
            serde_json::from_str(r#"{"target_url":"example.com"}"#).expect("parse request");
        assert_eq!(request.scan_config().scan_type, ScanType::Web);
        assert!(request.report_format.is_none());
    }
}
