// SARIF 2.1.0 conversion

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::entities::Finding;
use crate::value_objects::RiskLevel;

pub const SARIF_SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";
pub const SARIF_VERSION: &str = "2.1.0";
pub const SARIF_DRIVER_NAME: &str = "Automated Cognitive DAST (ZAP)";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifLog {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub version: String,
    pub runs: Vec<SarifRun>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifTool {
    pub driver: SarifDriver,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifDriver {
    pub name: String,
    pub rules: Vec<SarifRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifText {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifHelp {
    pub text: String,
    pub markdown: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifRuleProperties {
    pub risk: RiskLevel,
    pub confidence: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRule {
    pub id: String,
    pub name: String,
    pub short_description: SarifText,
    pub full_description: SarifText,
    pub help: SarifHelp,
    pub properties: SarifRuleProperties,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SarifLevel {
    Error,
    Warning,
    Note,
}

impl From<RiskLevel> for SarifLevel {
    fn from(risk: RiskLevel) -> Self {
        match risk {
            RiskLevel::High => SarifLevel::Error,
            RiskLevel::Medium => SarifLevel::Warning,
            _ => SarifLevel::Note,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifResult {
    pub rule_id: String,
    pub level: SarifLevel,
    pub message: SarifText,
    pub locations: Vec<SarifLocation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifLocation {
    pub physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifPhysicalLocation {
    pub artifact_location: SarifArtifactLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifArtifactLocation {
    pub uri: String,
}

impl SarifRule {
    fn seeded_by(rule_id: &str, finding: &Finding) -> Self {
        Self {
            id: rule_id.to_string(),
            name: finding.alert.clone(),
            short_description: SarifText {
                text: finding.alert.clone(),
            },
            full_description: SarifText {
                text: finding.description.clone(),
            },
            help: SarifHelp {
                text: finding.solution.clone(),
                markdown: finding.solution.clone(),
            },
            properties: SarifRuleProperties {
                risk: finding.risk,
                confidence: finding.confidence.clone(),
            },
        }
    }
}

impl SarifResult {
    fn for_finding(rule_id: &str, finding: &Finding) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            level: SarifLevel::from(finding.risk),
            message: SarifText {
                text: finding.description.clone(),
            },
            locations: vec![SarifLocation {
                physical_location: SarifPhysicalLocation {
                    artifact_location: SarifArtifactLocation {
                        uri: finding.url.clone(),
                    },
                },
            }],
        }
    }
}

/// One rule per distinct classifier id (first finding wins), one result per finding.
pub fn convert_to_sarif(findings: &[Finding]) -> SarifLog {
    let mut seen = HashSet::new();
    let mut rules = Vec::new();
    let mut results = Vec::with_capacity(findings.len());

    for finding in findings {
        let rule_id = finding.rule_id();
        if seen.insert(rule_id.to_string()) {
            rules.push(SarifRule::seeded_by(rule_id, finding));
        }
        results.push(SarifResult::for_finding(rule_id, finding));
    }

    SarifLog {
        schema: SARIF_SCHEMA.to_string(),
        version: SARIF_VERSION.to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: SARIF_DRIVER_NAME.to_string(),
                    rules,
                },
            },
            results,
        }],
    }
}
