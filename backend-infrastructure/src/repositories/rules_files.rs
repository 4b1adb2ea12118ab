use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde_yaml::Value;
use tokio::fs;

use backend_domain::ScanRule;

use crate::config::validate_scan_rule;

/// Loads scan rule overrides from YAML: either a top-level `rules:` list or a bare list.
pub async fn load_scan_rules(path: &Path) -> Result<Vec<ScanRule>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read rules file {}", path.display()))?;
    parse_scan_rules(&content).with_context(|| format!("invalid rules file {}", path.display()))
}

pub fn parse_scan_rules(content: &str) -> Result<Vec<ScanRule>> {
    let document: Value = serde_yaml::from_str(content)?;
    let list = match &document {
        Value::Mapping(map) => map
            .get("rules")
            .ok_or_else(|| anyhow!("expected a 'rules' list"))?,
        other => other,
    };
    let Value::Sequence(items) = list else {
        return Err(anyhow!("rules must be a list"));
    };
    let mut rules = Vec::with_capacity(items.len());
    for item in items {
        let rule = ScanRule {
            id: scalar(item.get("id")).ok_or_else(|| anyhow!("rule without id"))?,
            name: scalar(item.get("name")),
            threshold: scalar(item.get("threshold")),
            strength: scalar(item.get("strength")),
        };
        validate_scan_rule(&rule)?;
        rules.push(rule);
    }
    Ok(rules)
}

fn scalar(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
