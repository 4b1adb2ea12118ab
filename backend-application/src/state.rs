use std::sync::Arc;
use std::time::Duration;

use backend_domain::ports::{IntentClassifier, ScannerClient};
use backend_domain::RuntimeConfig;

use crate::{Metrics, ScanOrchestrator, ScanRegistry};

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub registry: Arc<ScanRegistry>,
    pub scanner: Arc<dyn ScannerClient>,
    pub classifier: Arc<dyn IntentClassifier>,
    pub orchestrator: ScanOrchestrator,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(
        config: RuntimeConfig,
        scanner: Arc<dyn ScannerClient>,
        classifier: Arc<dyn IntentClassifier>,
    ) -> Self {
        let registry = Arc::new(ScanRegistry::new());
        let metrics = Arc::new(Metrics::default());
        let orchestrator = ScanOrchestrator::new(
            registry.clone(),
            scanner.clone(),
            metrics.clone(),
            Duration::from_millis(config.poll_interval_ms.max(1)),
        );
        Self {
            config,
            registry,
            scanner,
            classifier,
            orchestrator,
            metrics,
        }
    }
}
