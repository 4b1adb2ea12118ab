use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use tracing::error;

use backend_application::commands::intent_commands;
use backend_application::queries::report_queries;
use backend_application::AppState;
use backend_domain::{AnalyzeRequest, IntentAnalysis, ReportStats, StatsQuery};

use crate::error::HttpError;
use crate::middleware::{authorize, parse_json_body};

pub async fn analyze_intent(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<IntentAnalysis>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let analysis = intent_commands::analyze_intent(&state, &payload.prompt).await?;
    Ok(Json(analysis))
}

pub async fn report_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<StatsQuery>,
    body: axum::body::Bytes,
) -> Result<Json<ReportStats>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let document = parse_json_body(&headers, &body).map_err(|err| {
        error!("failed to parse report body: {}", err);
        HttpError::BadRequest(err.to_string())
    })?;
    let stats = report_queries::summarize_report(&document, query.format.as_deref());
    Ok(Json(stats))
}
