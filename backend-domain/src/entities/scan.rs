// Scan entity
// One record per submitted job; the registry owns it, the orchestrator moves it forward.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::ScanConfig;
use crate::value_objects::{ReportFormat, ScanId, ScanState, ScanType};

/// Highest progress a scan can report before it is COMPLETED.
pub const MAX_RUNNING_PROGRESS: u8 = 99;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scan {
    pub id: ScanId,
    pub state: ScanState,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    pub target_url: String,
    #[serde(default)]
    pub scan_type: ScanType,
    #[serde(default)]
    pub checks: Vec<String>,
    #[serde(default)]
    pub report_format: ReportFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Scan {
    pub fn new(target_url: String, config: &ScanConfig, report_format: ReportFormat) -> Self {
        Self {
            id: ScanId::generate(),
            state: ScanState::Pending,
            progress: 0,
            created_at: Utc::now(),
            target_url,
            scan_type: config.scan_type,
            checks: config.checks.clone(),
            report_format,
            discovery_task_id: None,
            probe_task_id: None,
            error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    fn transition(&mut self, next: ScanState) -> bool {
        if !self.state.can_transition_to(next) {
            return false;
        }
        self.state = next;
        true
    }

    pub fn start(&mut self) -> bool {
        self.transition(ScanState::Running)
    }

    /// Records blended progress. Never lowers the value and never reaches 100 while running.
    pub fn record_progress(&mut self, value: u8) {
        if self.state != ScanState::Running {
            return;
        }
        let capped = value.min(MAX_RUNNING_PROGRESS);
        if capped > self.progress {
            self.progress = capped;
        }
    }

    pub fn complete(&mut self) -> bool {
        if !self.transition(ScanState::Completed) {
            return false;
        }
        self.progress = 100;
        true
    }

    pub fn fail(&mut self, reason: impl Into<String>) -> bool {
        if !self.transition(ScanState::Failed) {
            return false;
        }
        self.error = Some(reason.into());
        true
    }

    pub fn stop(&mut self) -> bool {
        self.transition(ScanState::Stopped)
    }
}

/// The two engine phases of a scan, each reported by the engine on its own 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Discovery,
    Probe,
}

impl ScanPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanPhase::Discovery => "discovery",
            ScanPhase::Probe => "probe",
        }
    }

    /// Maps a phase percentage onto the single 0-100 scale shown to callers.
    pub fn blend(&self, percent: u8) -> u8 {
        let percent = percent.min(100);
        match self {
            ScanPhase::Discovery => percent / 2,
            ScanPhase::Probe => 50 + percent / 2,
        }
    }
}
