use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use backend_application::AppState;
use backend_infrastructure::{build_intent_classifier, AppConfig, ZapScannerClient};

pub struct AppContext {
    pub config: AppConfig,
    pub state: AppState,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Result<Self> {
        let runtime_config = config.to_runtime_config();
        let scanner = Arc::new(ZapScannerClient::from_config(&runtime_config)?);
        let classifier = build_intent_classifier(&runtime_config)?;
        info!(engine = %runtime_config.zap_url, "scan engine client ready");

        let state = AppState::new(runtime_config, scanner, classifier);
        Ok(Self { config, state })
    }
}
