use axum::routing::{get, post};
use axum::Router;

use backend_application::AppState;

use crate::handlers::{ops_handlers, report_handlers, scan_handlers};

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/scan", post(scan_handlers::create_scan))
        .route("/scans", get(scan_handlers::list_scans))
        .route("/scan/:scan_id", get(scan_handlers::get_scan))
        .route("/scan/:scan_id/stop", post(scan_handlers::stop_scan))
        .route("/scan/:scan_id/results", get(scan_handlers::get_scan_results))
        .route("/analyze", post(report_handlers::analyze_intent))
        .route("/report/stats", post(report_handlers::report_stats))
        .route("/health/live", get(ops_handlers::health_live))
        .route("/health/ready", get(ops_handlers::health_ready))
        .route("/metrics/prometheus", get(ops_handlers::metrics_prometheus));

    Router::new()
        .route("/", get(ops_handlers::root))
        .nest("/api", api)
        .with_state(state)
}
