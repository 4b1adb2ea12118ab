use backend_domain::{parse_report_stats, ReportStats};
use serde_json::Value;
use tracing::warn;

pub fn summarize_report(document: &Value, format: Option<&str>) -> ReportStats {
    let format = format
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("json");
    let stats = parse_report_stats(document, format);
    if let ReportStats::Unrecognized { message } = &stats {
        warn!("report summary skipped: {}", message);
    }
    stats
}
