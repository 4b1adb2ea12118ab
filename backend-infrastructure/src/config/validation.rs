use anyhow::{anyhow, Result};

use backend_domain::ScanRule;

const ALERT_THRESHOLDS: [&str; 5] = ["OFF", "DEFAULT", "LOW", "MEDIUM", "HIGH"];
const ATTACK_STRENGTHS: [&str; 5] = ["DEFAULT", "LOW", "MEDIUM", "HIGH", "INSANE"];

pub fn validate_engine_url(value: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("zap_url must not be empty"));
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(anyhow!("zap_url must start with http:// or https://"));
    }
    Ok(())
}

pub fn validate_scan_rule(rule: &ScanRule) -> Result<()> {
    let id = rule.id.trim();
    if id.is_empty() {
        return Err(anyhow!("scan rule id is empty"));
    }
    if !id.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(anyhow!("scan rule id '{}' must be numeric", id));
    }
    if let Some(threshold) = &rule.threshold {
        if !ALERT_THRESHOLDS.contains(&threshold.trim().to_uppercase().as_str()) {
            return Err(anyhow!("scan rule {}: unknown threshold '{}'", id, threshold));
        }
    }
    if let Some(strength) = &rule.strength {
        if !ATTACK_STRENGTHS.contains(&strength.trim().to_uppercase().as_str()) {
            return Err(anyhow!("scan rule {}: unknown strength '{}'", id, strength));
        }
    }
    Ok(())
}
