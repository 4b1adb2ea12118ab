// Flat JSON findings report

use serde::{Deserialize, Serialize};

use crate::entities::Finding;
use crate::value_objects::{ReportFormat, ScanId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSummary {
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub scan_id: ScanId,
    pub vulnerabilities: Vec<Finding>,
    pub summary: ResultSummary,
    pub format: ReportFormat,
}

impl ScanResult {
    pub fn new(scan_id: ScanId, vulnerabilities: Vec<Finding>) -> Self {
        let count = vulnerabilities.len();
        Self {
            scan_id,
            vulnerabilities,
            summary: ResultSummary { count },
            format: ReportFormat::Json,
        }
    }
}
