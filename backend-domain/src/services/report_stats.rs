// Severity and finding-count summaries for persisted report artifacts
//
// Two dialects are recognized: the engine's native JSON report (a `site`
// collection holding `alerts`) and SARIF (a `runs` collection holding
// `results`). Breakdowns are sorted by descending count; equal counts keep
// the order in which they first appear in the document.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeverityBreakdown {
    pub high: u64,
    pub medium: u64,
    pub low: u64,
    pub info: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FindingCount {
    pub name: String,
    pub riskdesc: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleCount {
    pub rule_id: String,
    pub level: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "dialect", rename_all = "snake_case")]
pub enum ReportStats {
    Native {
        total: u64,
        severity: SeverityBreakdown,
        findings: Vec<FindingCount>,
    },
    Sarif {
        total: u64,
        rules: Vec<RuleCount>,
    },
    Unrecognized {
        message: String,
    },
}

impl ReportStats {
    pub fn total(&self) -> u64 {
        match self {
            ReportStats::Native { total, .. } | ReportStats::Sarif { total, .. } => *total,
            ReportStats::Unrecognized { .. } => 0,
        }
    }
}

pub fn parse_report_stats(document: &Value, format: &str) -> ReportStats {
    if let Some(sites) = document.get("site").and_then(as_collection) {
        return native_stats(&sites);
    }
    if let Some(runs) = document.get("runs").and_then(as_collection) {
        return sarif_stats(&runs);
    }
    ReportStats::Unrecognized {
        message: format!(
            "Unrecognized report format (claimed '{}'): expected a 'site' or 'runs' collection",
            format.trim()
        ),
    }
}

/// Arrays are collections; a lone object is treated as a one-element collection.
fn as_collection(value: &Value) -> Option<Vec<&Value>> {
    match value {
        Value::Array(items) => Some(items.iter().collect()),
        Value::Object(_) => Some(vec![value]),
        _ => None,
    }
}

fn nested<'a>(value: &'a Value, key: &str) -> Vec<&'a Value> {
    value.get(key).and_then(as_collection).unwrap_or_default()
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn occurrence_count(alert: &Value) -> u64 {
    match alert.get("count") {
        Some(Value::Number(number)) => number.as_u64().unwrap_or(1),
        Some(Value::String(text)) => text.trim().parse::<u64>().unwrap_or(1),
        _ => 1,
    }
}

fn native_stats(sites: &[&Value]) -> ReportStats {
    let mut total = 0u64;
    let mut by_risk: HashMap<String, u64> = HashMap::new();
    let mut findings: Vec<FindingCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for alert in sites.iter().flat_map(|site| nested(site, "alerts")) {
        let riskcode = text_field(alert, "riskcode")
            .filter(|code| !code.is_empty())
            .unwrap_or_else(|| "0".to_string());
        let count = occurrence_count(alert);
        total = total.saturating_add(count);
        let risk_total = by_risk.entry(riskcode).or_default();
        *risk_total = risk_total.saturating_add(count);

        let name = text_field(alert, "name")
            .or_else(|| text_field(alert, "alert"))
            .unwrap_or_else(|| "Unknown".to_string());
        match index.get(&name) {
            Some(&position) => {
                let item = &mut findings[position];
                item.count = item.count.saturating_add(count);
            }
            None => {
                index.insert(name.clone(), findings.len());
                findings.push(FindingCount {
                    name,
                    riskdesc: text_field(alert, "riskdesc").unwrap_or_default(),
                    count,
                });
            }
        }
    }

    findings.sort_by(|a, b| b.count.cmp(&a.count));
    let severity = SeverityBreakdown {
        high: by_risk.get("3").copied().unwrap_or(0),
        medium: by_risk.get("2").copied().unwrap_or(0),
        low: by_risk.get("1").copied().unwrap_or(0),
        info: by_risk.get("0").copied().unwrap_or(0),
    };
    ReportStats::Native {
        total,
        severity,
        findings,
    }
}

fn sarif_stats(runs: &[&Value]) -> ReportStats {
    let mut total = 0u64;
    let mut rules: Vec<RuleCount> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for result in runs.iter().flat_map(|run| nested(run, "results")) {
        total = total.saturating_add(1);
        let rule_id = text_field(result, "ruleId").unwrap_or_else(|| "unknown".to_string());
        let level = text_field(result, "level").unwrap_or_else(|| "warning".to_string());
        let key = (rule_id, level);
        match index.get(&key) {
            Some(&position) => {
                let item = &mut rules[position];
                item.count = item.count.saturating_add(1);
            }
            None => {
                index.insert(key.clone(), rules.len());
                rules.push(RuleCount {
                    rule_id: key.0,
                    level: key.1,
                    count: 1,
                });
            }
        }
    }

    rules.sort_by(|a, b| b.count.cmp(&a.count));
    ReportStats::Sarif { total, rules }
}

impl fmt::Display for ReportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportStats::Native {
                total,
                severity,
                findings,
            } => {
                writeln!(f, "Total alerts: {}", total)?;
                writeln!(
                    f,
                    "High: {} | Medium: {} | Low: {} | Info: {}",
                    severity.high, severity.medium, severity.low, severity.info
                )?;
                for item in findings {
                    writeln!(f, "{:>6}  {} ({})", item.count, item.name, item.riskdesc)?;
                }
                Ok(())
            }
            ReportStats::Sarif { total, rules } => {
                writeln!(f, "Total results: {}", total)?;
                for item in rules {
                    writeln!(f, "{:>6}  {} [{}]", item.count, item.rule_id, item.level)?;
                }
                Ok(())
            }
            ReportStats::Unrecognized { message } => writeln!(f, "{}", message),
        }
    }
}
