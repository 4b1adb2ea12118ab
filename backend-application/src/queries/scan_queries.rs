use backend_domain::{
    build_report, findings_from_alerts, ReportDocument, ReportFormat, Scan, ScanId,
};
use tracing::info;

use crate::{AppError, AppState};

pub async fn get_scan(state: &AppState, scan_id: &str) -> Result<Scan, AppError> {
    state.registry.get(&ScanId::from(scan_id)).await
}

pub async fn list_scans(state: &AppState) -> Result<Vec<Scan>, AppError> {
    Ok(state.registry.list().await)
}

/// Current findings for the scan's target, rendered in `format` (JSON when omitted).
pub async fn get_scan_results(
    state: &AppState,
    scan_id: &str,
    format: Option<&str>,
) -> Result<ReportDocument, AppError> {
    let format = match format.map(str::trim).filter(|value| !value.is_empty()) {
        Some(raw) => ReportFormat::parse(raw)
            .ok_or_else(|| AppError::BadRequest(format!("unsupported report format '{}'", raw)))?,
        None => ReportFormat::Json,
    };
    let scan = state.registry.get(&ScanId::from(scan_id)).await?;
    let alerts = state.scanner.fetch_findings(&scan.target_url).await;
    let findings = findings_from_alerts(alerts);
    state.metrics.record_results_request();
    info!(scan_id = %scan.id, format = format.as_str(), count = findings.len(), "results rendered");
    Ok(build_report(format, &scan.id, findings))
}
