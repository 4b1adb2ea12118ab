// OCSF Vulnerability Finding conversion

use serde::{Deserialize, Serialize};

use crate::entities::Finding;
use crate::utils::current_millis;

pub const OCSF_ACTIVITY_CREATE: u32 = 1;
pub const OCSF_CATEGORY_FINDINGS: u32 = 2;
pub const OCSF_CLASS_VULNERABILITY_FINDING: u32 = 2001;
pub const OCSF_SEVERITY_UNKNOWN: u32 = 1;
pub const OCSF_STATUS_NEW: u32 = 1;
pub const OCSF_TYPE_VULNERABILITY_FINDING_CREATE: u32 = 200101;

pub const OCSF_PRODUCT_NAME: &str = "Automated Cognitive DAST";
pub const OCSF_VENDOR_NAME: &str = "Cognitive Security";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcsfDocument {
    pub findings: Vec<OcsfFinding>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcsfFinding {
    pub activity_id: u32,
    pub category_uid: u32,
    pub class_uid: u32,
    pub severity_id: u32,
    pub severity: String,
    pub status_id: u32,
    pub time: i64,
    pub type_uid: u32,
    pub finding: OcsfFindingInfo,
    pub resource: OcsfResource,
    pub metadata: OcsfMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcsfFindingInfo {
    pub title: String,
    pub desc: String,
    pub remediation: OcsfRemediation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcsfRemediation {
    pub desc: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcsfResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub uid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcsfMetadata {
    pub product: OcsfProduct,
    pub profiles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcsfProduct {
    pub name: String,
    pub vendor_name: String,
}

impl OcsfFinding {
    fn from_finding(finding: &Finding, time: i64) -> Self {
        Self {
            activity_id: OCSF_ACTIVITY_CREATE,
            category_uid: OCSF_CATEGORY_FINDINGS,
            class_uid: OCSF_CLASS_VULNERABILITY_FINDING,
            severity_id: OCSF_SEVERITY_UNKNOWN,
            severity: finding.risk_text().to_string(),
            status_id: OCSF_STATUS_NEW,
            time,
            type_uid: OCSF_TYPE_VULNERABILITY_FINDING_CREATE,
            finding: OcsfFindingInfo {
                title: finding.alert.clone(),
                desc: finding.description.clone(),
                remediation: OcsfRemediation {
                    desc: finding.solution.clone(),
                },
            },
            resource: OcsfResource {
                resource_type: "URL".to_string(),
                uid: finding.url.clone(),
            },
            metadata: OcsfMetadata {
                product: OcsfProduct {
                    name: OCSF_PRODUCT_NAME.to_string(),
                    vendor_name: OCSF_VENDOR_NAME.to_string(),
                },
                profiles: vec!["security_control".to_string()],
            },
        }
    }
}

/// One record per finding, stamped with the conversion time.
pub fn convert_to_ocsf(findings: &[Finding]) -> OcsfDocument {
    convert_to_ocsf_at(findings, current_millis())
}

pub fn convert_to_ocsf_at(findings: &[Finding], time: i64) -> OcsfDocument {
    OcsfDocument {
        findings: findings
            .iter()
            .map(|finding| OcsfFinding::from_finding(finding, time))
            .collect(),
    }
}
