use std::sync::atomic::{AtomicU64, Ordering};

use backend_domain::ScanState;

#[derive(Debug, Default)]
pub struct Metrics {
    scans_submitted: AtomicU64,
    scans_completed: AtomicU64,
    scans_failed: AtomicU64,
    scans_stopped: AtomicU64,
    results_requests: AtomicU64,
}

impl Metrics {
    pub fn record_submitted(&self) {
        self.scans_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_outcome(&self, state: ScanState) {
        let counter = match state {
            ScanState::Completed => &self.scans_completed,
            ScanState::Failed => &self.scans_failed,
            ScanState::Stopped => &self.scans_stopped,
            ScanState::Pending | ScanState::Running => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_results_request(&self) {
        self.results_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let submitted = self.scans_submitted.load(Ordering::Relaxed);
        let completed = self.scans_completed.load(Ordering::Relaxed);
        let failed = self.scans_failed.load(Ordering::Relaxed);
        let stopped = self.scans_stopped.load(Ordering::Relaxed);
        let results = self.results_requests.load(Ordering::Relaxed);

        format!(
            "# TYPE dast_scans_submitted_total counter\n\
dast_scans_submitted_total {}\n\
# TYPE dast_scans_completed_total counter\n\
dast_scans_completed_total {}\n\
# TYPE dast_scans_failed_total counter\n\
dast_scans_failed_total {}\n\
# TYPE dast_scans_stopped_total counter\n\
dast_scans_stopped_total {}\n\
# TYPE dast_results_requests_total counter\n\
dast_results_requests_total {}\n",
            submitted, completed, failed, stopped, results
        )
    }
}
