use backend_domain::IntentAnalysis;
use tracing::warn;

use crate::{AppError, AppState};

/// Turns a natural-language request into a scan configuration.
///
/// Classifier failures never reach the caller; they produce the fallback analysis.
pub async fn analyze_intent(state: &AppState, prompt: &str) -> Result<IntentAnalysis, AppError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::BadRequest("prompt must not be empty".to_string()));
    }
    match state.classifier.classify(prompt).await {
        Ok(analysis) => Ok(analysis),
        Err(err) => {
            warn!("intent classification failed: {:#}", err);
            Ok(IntentAnalysis::fallback())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use backend_domain::{RuntimeConfig, ScanType};

    use super::*;
    use crate::test_support::{FixedClassifier, ScriptedScanner};

    fn state(result: anyhow::Result<IntentAnalysis>) -> AppState {
        AppState::new(
            RuntimeConfig::default(),
            Arc::new(ScriptedScanner::new(vec![100], vec![100])),
            Arc::new(FixedClassifier(result)),
        )
    }

    #[tokio::test]
    async fn classifier_answer_is_returned() {
        let expected = IntentAnalysis {
            scan_type: ScanType::Api,
            checks: vec!["SQL Injection".to_string()],
            reasoning: "api login".to_string(),
        };
        let state = state(Ok(expected.clone()));
        let analysis = analyze_intent(&state, "scan my api for sqli").await.expect("analysis");
        assert_eq!(analysis, expected);
    }

    #[tokio::test]
    async fn classifier_failure_yields_fallback() {
        let state = state(Err(anyhow::anyhow!("provider timed out")));
        let analysis = analyze_intent(&state, "anything").await.expect("analysis");
        assert_eq!(analysis, IntentAnalysis::fallback());
        assert_eq!(analysis.scan_type, ScanType::Web);
        assert!(analysis.checks.is_empty());
    }

    #[tokio::test]
    async fn blank_prompt_is_rejected() {
        let state = state(Ok(IntentAnalysis::fallback()));
        assert!(matches!(
            analyze_intent(&state, "  ").await,
            Err(AppError::BadRequest(_))
        ));
    }
}
