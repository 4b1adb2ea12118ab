use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, warn};

use backend_domain::ports::ScannerClient;
use backend_domain::{EngineReportFormat, RawAlert, RuntimeConfig, ScanRule, ScannerError};

use crate::utils::trim_trailing_slash;

const API_KEY_HEADER: &str = "X-ZAP-API-Key";

/// Engine scanner ids enabled for each named check.
const CHECK_SCANNERS: [(&str, &[&str]); 4] = [
    (
        "sql injection",
        &["40018", "40019", "40020", "40021", "40022", "40024"],
    ),
    ("xss", &["40012", "40014", "40016", "40017", "40026"]),
    ("csrf", &["20012"]),
    ("path traversal", &["6"]),
];

pub fn scanner_ids_for_check(check: &str) -> Option<&'static [&'static str]> {
    let wanted = check.trim().to_lowercase();
    CHECK_SCANNERS
        .iter()
        .find(|(name, _)| *name == wanted)
        .map(|(_, ids)| *ids)
}

/// `ScannerClient` backed by the ZAP JSON API.
pub struct ZapScannerClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ZapScannerClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: trim_trailing_slash(base_url),
            api_key,
        })
    }

    pub fn from_config(config: &RuntimeConfig) -> Result<Self> {
        Self::new(
            &config.zap_url,
            config.zap_api_key.clone(),
            Duration::from_secs(config.request_timeout_seconds.max(1)),
        )
    }

    async fn send(&self, path: &str, params: &[(&str, &str)]) -> Result<Response, ScannerError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.get(&url).query(params);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        let response = request
            .send()
            .await
            .map_err(|err| ScannerError::Unreachable(format!("{}: {}", path, err)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScannerError::InvalidResponse(format!(
                "{} responded {}",
                path, status
            )));
        }
        Ok(response)
    }

    async fn call(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, ScannerError> {
        self.send(path, params)
            .await?
            .json::<Value>()
            .await
            .map_err(|err| ScannerError::InvalidResponse(format!("{}: {}", path, err)))
    }

    async fn start_task(&self, path: &str, target: &str) -> Result<String, ScannerError> {
        let body = self.call(path, &[("url", target)]).await?;
        let task_id = text_field(&body, "scan").unwrap_or_default();
        if task_id.is_empty() || !task_id.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(ScannerError::InvalidResponse(format!(
                "{} returned task id '{}'",
                path, task_id
            )));
        }
        Ok(task_id)
    }

    /// Reads a task status; every failure comes back as `Transient`.
    async fn task_status(&self, path: &str, task_id: &str) -> Result<u8, ScannerError> {
        let body = self
            .call(path, &[("scanId", task_id)])
            .await
            .map_err(|err| ScannerError::Transient(err.to_string()))?;
        let raw = text_field(&body, "status").unwrap_or_default();
        raw.parse::<u16>()
            .map(|percent| percent.min(100) as u8)
            .map_err(|_| ScannerError::Transient(format!("{} returned status '{}'", path, raw)))
    }

    async fn stop_task(&self, path: &str, task_id: &str) {
        if let Err(err) = self.call(path, &[("scanId", task_id)]).await {
            debug!(task_id, "engine stop ignored: {}", err);
        }
    }
}

fn text_field(body: &Value, field: &str) -> Option<String> {
    match body.get(field)? {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[async_trait]
impl ScannerClient for ZapScannerClient {
    async fn apply_policy(
        &self,
        checks: &[String],
        rules: &[ScanRule],
    ) -> Result<(), ScannerError> {
        if !checks.is_empty() {
            let mut ids = Vec::new();
            for check in checks {
                match scanner_ids_for_check(check) {
                    Some(found) => ids.extend(found.iter().copied()),
                    None => warn!(check = %check, "unknown check ignored"),
                }
            }
            if ids.is_empty() {
                self.call("/JSON/ascan/action/enableAllScanners/", &[]).await?;
            } else {
                self.call("/JSON/ascan/action/disableAllScanners/", &[]).await?;
                let joined = ids.join(",");
                self.call("/JSON/ascan/action/enableScanners/", &[("ids", joined.as_str())])
                    .await?;
            }
        }
        for rule in rules {
            let id = rule.id.trim();
            if let Some(threshold) = &rule.threshold {
                let threshold = threshold.trim().to_uppercase();
                self.call(
                    "/JSON/ascan/action/setScannerAlertThreshold/",
                    &[("id", id), ("alertThreshold", threshold.as_str())],
                )
                .await?;
            }
            if let Some(strength) = &rule.strength {
                let strength = strength.trim().to_uppercase();
                self.call(
                    "/JSON/ascan/action/setScannerAttackStrength/",
                    &[("id", id), ("attackStrength", strength.as_str())],
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn start_discovery(&self, target: &str) -> Result<String, ScannerError> {
        self.start_task("/JSON/spider/action/scan/", target).await
    }

    async fn discovery_status(&self, task_id: &str) -> Result<u8, ScannerError> {
        self.task_status("/JSON/spider/view/status/", task_id).await
    }

    async fn start_probe(&self, target: &str) -> Result<String, ScannerError> {
        self.start_task("/JSON/ascan/action/scan/", target).await
    }

    async fn probe_status(&self, task_id: &str) -> Result<u8, ScannerError> {
        self.task_status("/JSON/ascan/view/status/", task_id).await
    }

    async fn stop(&self, discovery_task_id: Option<&str>, probe_task_id: Option<&str>) {
        if let Some(task_id) = discovery_task_id {
            self.stop_task("/JSON/spider/action/stop/", task_id).await;
        }
        if let Some(task_id) = probe_task_id {
            self.stop_task("/JSON/ascan/action/stop/", task_id).await;
        }
    }

    async fn fetch_findings(&self, target: &str) -> Vec<RawAlert> {
        let body = match self.call("/JSON/core/view/alerts/", &[("baseurl", target)]).await {
            Ok(body) => body,
            Err(err) => {
                warn!(url = %target, "alert retrieval failed: {}", err);
                return Vec::new();
            }
        };
        let Some(alerts) = body.get("alerts").cloned() else {
            warn!(url = %target, "alert response carried no alerts field");
            return Vec::new();
        };
        serde_json::from_value(alerts).unwrap_or_else(|err| {
            warn!(url = %target, "alert records unreadable: {}", err);
            Vec::new()
        })
    }

    async fn fetch_report(&self, format: EngineReportFormat) -> Result<String, ScannerError> {
        let path = match format {
            EngineReportFormat::Json => "/OTHER/core/other/jsonreport/",
            EngineReportFormat::Html => "/OTHER/core/other/htmlreport/",
        };
        self.send(path, &[])
            .await?
            .text()
            .await
            .map_err(|err| ScannerError::InvalidResponse(format!("{}: {}", path, err)))
    }

    async fn ping(&self) -> Result<String, ScannerError> {
        let body = self.call("/JSON/core/view/version/", &[]).await?;
        text_field(&body, "version")
            .ok_or_else(|| ScannerError::InvalidResponse("version missing".to_string()))
    }
}
