// Scan type value object

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScanType {
    #[default]
    Web,
    Api,
    Baseline,
}

impl ScanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanType::Web => "WEB",
            ScanType::Api => "API",
            ScanType::Baseline => "BASELINE",
        }
    }
}

impl From<&str> for ScanType {
    fn from(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "API" => ScanType::Api,
            "BASELINE" => ScanType::Baseline,
            _ => ScanType::Web,
        }
    }
}
