// Scan configuration as requested by a caller or derived from a prompt

use serde::{Deserialize, Serialize};

use crate::value_objects::ScanType;

/// Checks the intent classifier may select.
pub const KNOWN_CHECKS: [&str; 4] = ["SQL Injection", "XSS", "CSRF", "Path Traversal"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentAnalysis {
    #[serde(default)]
    pub scan_type: ScanType,
    #[serde(default)]
    pub checks: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
}

impl IntentAnalysis {
    /// Safe configuration used whenever classification fails.
    pub fn fallback() -> Self {
        Self {
            scan_type: ScanType::Web,
            checks: Vec::new(),
            reasoning: "AI Analysis failed. Please configure settings manually.".to_string(),
        }
    }
}

/// Engine scan rule override, usually loaded from a YAML rules file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRule {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    pub scan_type: ScanType,
    #[serde(default)]
    pub checks: Vec<String>,
    #[serde(default)]
    pub custom_rules: Vec<ScanRule>,
}

impl ScanConfig {
    pub fn has_policy(&self) -> bool {
        !self.checks.is_empty() || !self.custom_rules.is_empty()
    }
}
