// Finding entity
// One reported issue instance, normalized from a raw engine alert

use serde::{Deserialize, Deserializer, Serialize};

use crate::value_objects::RiskLevel;

/// Rule id used when an alert carries no weakness classifier.
pub const UNCLASSIFIED_RULE_ID: &str = "0";

/// Alert record as the engine reports it. Every field is optional and
/// numeric fields may arrive either as numbers or as strings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawAlert {
    #[serde(default, deserialize_with = "lenient_string")]
    pub alert: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub risk: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub confidence: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub solution: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cweid: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub wascid: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Text(String),
        Integer(i64),
        Float(f64),
        Bool(bool),
    }

    let value = Option::<Lenient>::deserialize(deserializer)?;
    Ok(value.map(|item| match item {
        Lenient::Text(text) => text,
        Lenient::Integer(number) => number.to_string(),
        Lenient::Float(number) => number.to_string(),
        Lenient::Bool(flag) => flag.to_string(),
    }))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub alert: String,
    pub risk: RiskLevel,
    pub confidence: String,
    pub description: String,
    pub solution: String,
    pub url: String,
    #[serde(default)]
    pub cweid: Option<String>,
    #[serde(default)]
    pub wascid: Option<String>,
    /// Risk text exactly as the engine reported it.
    #[serde(default, skip_serializing)]
    pub reported_risk: Option<String>,
}

impl Finding {
    /// Classifier id used to group findings into rules; blank ids fall back to "0".
    pub fn rule_id(&self) -> &str {
        match self.cweid.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => UNCLASSIFIED_RULE_ID,
        }
    }

    /// Engine risk text when present, otherwise the normalized level.
    pub fn risk_text(&self) -> &str {
        match self.reported_risk.as_deref() {
            Some(text) if !text.trim().is_empty() => text,
            _ => self.risk.as_str(),
        }
    }
}

impl From<RawAlert> for Finding {
    fn from(raw: RawAlert) -> Self {
        let risk = raw
            .risk
            .as_deref()
            .map(RiskLevel::from)
            .unwrap_or_default();
        Self {
            alert: raw.alert.unwrap_or_else(|| "Unknown".to_string()),
            risk,
            confidence: raw.confidence.unwrap_or_else(|| "Unknown".to_string()),
            description: raw.description.unwrap_or_default(),
            solution: raw.solution.unwrap_or_default(),
            url: raw.url.unwrap_or_default(),
            cweid: Some(raw.cweid.unwrap_or_else(|| UNCLASSIFIED_RULE_ID.to_string())),
            wascid: Some(raw.wascid.unwrap_or_else(|| UNCLASSIFIED_RULE_ID.to_string())),
            reported_risk: raw.risk,
        }
    }
}

pub fn findings_from_alerts(alerts: Vec<RawAlert>) -> Vec<Finding> {
    alerts.into_iter().map(Finding::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_alert_accepts_numeric_ids() {
        let raw: RawAlert = serde_json::from_str(
            r#"{"alert":"XSS","risk":"High","cweid":79,"wascid":"8","url":"https://a.test/x"}"#,
        )
        .expect("parse alert");
        let finding = Finding::from(raw);
        assert_eq!(finding.cweid.as_deref(), Some("79"));
        assert_eq!(finding.wascid.as_deref(), Some("8"));
        assert_eq!(finding.risk, RiskLevel::High);
    }

    #[test]
    fn engine_risk_text_is_kept_alongside_level() {
        let raw: RawAlert =
            serde_json::from_str(r#"{"alert":"Banner","risk":"Info"}"#).expect("parse alert");
        let finding = Finding::from(raw);
        assert_eq!(finding.risk, RiskLevel::Informational);
        assert_eq!(finding.risk_text(), "Info");

        let bare = Finding::from(RawAlert::default());
        assert_eq!(bare.risk_text(), RiskLevel::Unknown.as_str());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let finding = Finding::from(RawAlert::default());
        assert_eq!(finding.alert, "Unknown");
        assert_eq!(finding.risk, RiskLevel::Unknown);
        assert_eq!(finding.confidence, "Unknown");
        assert_eq!(finding.description, "");
        assert_eq!(finding.rule_id(), "0");
    }

    #[test]
    fn blank_classifier_maps_to_sentinel_rule() {
        let mut finding = Finding::from(RawAlert::default());
        finding.cweid = Some("  ".to_string());
        assert_eq!(finding.rule_id(), UNCLASSIFIED_RULE_ID);
        finding.cweid = None;
        assert_eq!(finding.rule_id(), UNCLASSIFIED_RULE_ID);
    }
}
