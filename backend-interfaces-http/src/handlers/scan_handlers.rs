use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;

use backend_application::commands::scan_commands;
use backend_application::queries::scan_queries;
use backend_application::AppState;
use backend_domain::{CreateScanRequest, ReportDocument, ResultsQuery, Scan};

use crate::error::HttpError;
use crate::middleware::authorize;

pub async fn create_scan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateScanRequest>,
) -> Result<Json<Scan>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let scan = scan_commands::start_scan(&state, payload).await?;
    Ok(Json(scan))
}

pub async fn get_scan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(scan_id): Path<String>,
) -> Result<Json<Scan>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let scan = scan_queries::get_scan(&state, &scan_id).await?;
    Ok(Json(scan))
}

pub async fn list_scans(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Scan>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let scans = scan_queries::list_scans(&state).await?;
    Ok(Json(scans))
}

pub async fn stop_scan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(scan_id): Path<String>,
) -> Result<Json<Scan>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let scan = scan_commands::stop_scan(&state, &scan_id).await?;
    Ok(Json(scan))
}

pub async fn get_scan_results(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(scan_id): Path<String>,
    Query(query): Query<ResultsQuery>,
) -> Result<Json<ReportDocument>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let document = scan_queries::get_scan_results(&state, &scan_id, query.format.as_deref()).await?;
    Ok(Json(document))
}
