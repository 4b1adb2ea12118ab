use std::path::Path;

use async_trait::async_trait;

use crate::entities::IntentAnalysis;

#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, prompt: &str) -> anyhow::Result<IntentAnalysis>;
}

#[async_trait]
pub trait ReportUploader: Send + Sync {
    /// Uploads a written report and returns the object location.
    async fn upload(&self, local_path: &Path, key: &str) -> anyhow::Result<String>;
}
