use backend_domain::{CreateScanRequest, Scan, ScanId};

use crate::{AppError, AppState};

pub async fn start_scan(state: &AppState, payload: CreateScanRequest) -> Result<Scan, AppError> {
    let target = payload.target_url.trim();
    if target.is_empty() {
        return Err(AppError::BadRequest("target_url must not be empty".to_string()));
    }
    let config = payload.scan_config();
    let report_format = payload.report_format.unwrap_or_default();
    Ok(state.orchestrator.submit(target, config, report_format).await)
}

pub async fn stop_scan(state: &AppState, scan_id: &str) -> Result<Scan, AppError> {
    state.orchestrator.stop(&ScanId::from(scan_id)).await
}
