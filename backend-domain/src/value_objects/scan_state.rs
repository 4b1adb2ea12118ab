// Scan lifecycle state

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScanState {
    Pending,
    Running,
    Completed,
    Failed,
    Stopped,
}

impl ScanState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanState::Pending => "PENDING",
            ScanState::Running => "RUNNING",
            ScanState::Completed => "COMPLETED",
            ScanState::Failed => "FAILED",
            ScanState::Stopped => "STOPPED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScanState::Completed | ScanState::Failed | ScanState::Stopped
        )
    }

    /// Forward-only transitions. A stop may land before the job task starts.
    pub fn can_transition_to(&self, next: ScanState) -> bool {
        match (self, next) {
            (ScanState::Pending, ScanState::Running) => true,
            (ScanState::Pending, ScanState::Stopped) => true,
            (ScanState::Running, ScanState::Completed) => true,
            (ScanState::Running, ScanState::Failed) => true,
            (ScanState::Running, ScanState::Stopped) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for ScanState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
