// Output dialect of a findings report

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportFormat {
    #[default]
    Json,
    Sarif,
    Ocsf,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Json => "JSON",
            ReportFormat::Sarif => "SARIF",
            ReportFormat::Ocsf => "OCSF",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Sarif => "sarif",
            ReportFormat::Ocsf => "ocsf",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "JSON" => Some(ReportFormat::Json),
            "SARIF" => Some(ReportFormat::Sarif),
            "OCSF" => Some(ReportFormat::Ocsf),
            _ => None,
        }
    }
}

/// Report rendered by the scan engine itself instead of converted from alerts.
///
/// The JSON flavour is the engine's native `site`/`alerts` document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineReportFormat {
    Json,
    Html,
}

impl EngineReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            EngineReportFormat::Json => "json",
            EngineReportFormat::Html => "html",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(ReportFormat::parse("sarif"), Some(ReportFormat::Sarif));
        assert_eq!(ReportFormat::parse(" OCSF "), Some(ReportFormat::Ocsf));
        assert_eq!(ReportFormat::parse("html"), None);
    }

    #[test]
    fn engine_formats_keep_their_extension() {
        assert_eq!(EngineReportFormat::Json.extension(), "json");
        assert_eq!(EngineReportFormat::Html.extension(), "html");
    }
}
