use async_trait::async_trait;
use thiserror::Error;

use crate::entities::{RawAlert, ScanRule};
use crate::value_objects::EngineReportFormat;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScannerError {
    #[error("scan engine unreachable: {0}")]
    Unreachable(String),
    #[error("invalid scan engine response: {0}")]
    InvalidResponse(String),
    /// A reading that failed this time but may succeed on the next poll.
    #[error("transient scan engine failure: {0}")]
    Transient(String),
}

impl ScannerError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ScannerError::Transient(_))
    }
}

/// Contract the orchestrator needs from the external scan engine.
#[async_trait]
pub trait ScannerClient: Send + Sync {
    /// Restricts the probe phase to the named checks and applies rule overrides.
    async fn apply_policy(&self, checks: &[String], rules: &[ScanRule]) -> Result<(), ScannerError>;

    async fn start_discovery(&self, target: &str) -> Result<String, ScannerError>;

    /// Percent complete in `[0, 100]`. Query failures come back as `Transient`.
    async fn discovery_status(&self, task_id: &str) -> Result<u8, ScannerError>;

    async fn start_probe(&self, target: &str) -> Result<String, ScannerError>;

    async fn probe_status(&self, task_id: &str) -> Result<u8, ScannerError>;

    /// Best-effort; each sub-call failure is ignored.
    async fn stop(&self, discovery_task_id: Option<&str>, probe_task_id: Option<&str>);

    /// Alerts recorded for a target. Retrieval failures yield an empty list.
    async fn fetch_findings(&self, target: &str) -> Vec<RawAlert>;

    /// The engine's own report covering every alert it holds.
    async fn fetch_report(&self, format: EngineReportFormat) -> Result<String, ScannerError>;

    async fn ping(&self) -> Result<String, ScannerError>;
}
