// Pure report services: format converters and report statistics

pub mod ocsf;
pub mod report_stats;
pub mod sarif;

pub use ocsf::*;
pub use report_stats::*;
pub use sarif::*;

use serde::Serialize;

use crate::entities::{Finding, ScanResult};
use crate::value_objects::{ReportFormat, ScanId};

/// A findings report rendered in one of the supported dialects.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ReportDocument {
    Json(ScanResult),
    Sarif(SarifLog),
    Ocsf(OcsfDocument),
}

pub fn build_report(
    format: ReportFormat,
    scan_id: &ScanId,
    findings: Vec<Finding>,
) -> ReportDocument {
    match format {
        ReportFormat::Json => ReportDocument::Json(ScanResult::new(scan_id.clone(), findings)),
        ReportFormat::Sarif => ReportDocument::Sarif(convert_to_sarif(&findings)),
        ReportFormat::Ocsf => ReportDocument::Ocsf(convert_to_ocsf(&findings)),
    }
}
