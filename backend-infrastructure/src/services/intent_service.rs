use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use backend_domain::ports::IntentClassifier;
use backend_domain::{IntentAnalysis, RuntimeConfig, ScanType, KNOWN_CHECKS};

use crate::utils::trim_trailing_slash;

const PLACEHOLDER_KEY: &str = "your_api_key_here";

const MOCK_REASONING: &str =
    "Simulated AI Analysis (Mock Mode): Detected relevant keywords in your prompt.";

const SYSTEM_INSTRUCTION: &str = "You are an Application Security Expert. Translate the user's \
natural language security requirement into a structured DAST scan configuration.\n\
Return a JSON object with the fields:\n\
- scan_type: \"WEB\" or \"API\"\n\
- checks: a list of strings selected from \
[\"SQL Injection\", \"XSS\", \"CSRF\", \"Path Traversal\"]\n\
- reasoning: a brief explanation of the chosen checks\n\
Rules:\n\
- If the user mentions API, Service, Endpoint, REST or GraphQL, set scan_type to \"API\"; \
otherwise \"WEB\".\n\
- Database, Sequel or SQL concerns map to \"SQL Injection\".\n\
- Scripting, frontend or client-side attacks map to \"XSS\".\n\
- Session, state change or forged requests map to \"CSRF\".\n\
- File access, directory or local file concerns map to \"Path Traversal\".\n\
- If the prompt is generic (for example \"full scan\"), include all checks.\n\
Return only valid JSON without markdown code fences.";

/// Offline classifier that matches keywords in the prompt.
#[derive(Default)]
pub struct KeywordIntentClassifier;

impl KeywordIntentClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(prompt: &str) -> IntentAnalysis {
        let lowered = prompt.to_lowercase();
        let mut checks = Vec::new();
        if lowered.contains("sql") {
            checks.push("SQL Injection");
        }
        if lowered.contains("xss") || lowered.contains("script") {
            checks.push("XSS");
        }
        if lowered.contains("csrf") {
            checks.push("CSRF");
        }
        if lowered.contains("file") || lowered.contains("traversal") {
            checks.push("Path Traversal");
        }
        if checks.is_empty() {
            checks = vec!["SQL Injection", "XSS"];
        }
        IntentAnalysis {
            scan_type: if lowered.contains("api") {
                ScanType::Api
            } else {
                ScanType::Web
            },
            checks: checks.into_iter().map(ToString::to_string).collect(),
            reasoning: MOCK_REASONING.to_string(),
        }
    }
}

#[async_trait]
impl IntentClassifier for KeywordIntentClassifier {
    async fn classify(&self, prompt: &str) -> Result<IntentAnalysis> {
        Ok(Self::analyze(prompt))
    }
}

/// Answers every prompt with the same analysis; used for providers without an adapter.
pub struct StaticIntentClassifier(IntentAnalysis);

impl StaticIntentClassifier {
    pub fn provider_not_configured() -> Self {
        Self(IntentAnalysis {
            scan_type: ScanType::Web,
            checks: vec!["SQL Injection".to_string(), "XSS".to_string()],
            reasoning: "Provider not configured, returning default safe scan.".to_string(),
        })
    }
}

#[async_trait]
impl IntentClassifier for StaticIntentClassifier {
    async fn classify(&self, _prompt: &str) -> Result<IntentAnalysis> {
        Ok(self.0.clone())
    }
}

/// Classifier backed by the Gemini `generateContent` endpoint.
pub struct GeminiIntentClassifier {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiIntentClassifier {
    pub fn new(base_url: &str, model: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: trim_trailing_slash(base_url),
            model: model.trim().to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl IntentClassifier for GeminiIntentClassifier {
    async fn classify(&self, prompt: &str) -> Result<IntentAnalysis> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let full_prompt = format!(
            "{}\n\nUser Request: {}\nJSON Response:",
            SYSTEM_INSTRUCTION, prompt
        );
        let body = json!({ "contents": [{ "parts": [{ "text": full_prompt }] }] });
        let response: Value = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let text = response
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("model response carried no text"))?;
        parse_analysis(text)
    }
}

#[derive(Deserialize)]
struct ModelAnswer {
    #[serde(default)]
    scan_type: Option<String>,
    #[serde(default)]
    checks: Vec<String>,
    #[serde(default)]
    reasoning: Option<String>,
}

/// Parses the model's JSON answer, tolerating a markdown code fence around it.
pub fn parse_analysis(text: &str) -> Result<IntentAnalysis> {
    let answer: ModelAnswer =
        serde_json::from_str(strip_code_fence(text)).context("model answer is not valid JSON")?;
    let checks = answer
        .checks
        .into_iter()
        .filter_map(|check| {
            KNOWN_CHECKS
                .iter()
                .find(|known| known.eq_ignore_ascii_case(check.trim()))
                .map(|known| known.to_string())
        })
        .collect();
    Ok(IntentAnalysis {
        scan_type: answer.scan_type.as_deref().map(ScanType::from).unwrap_or_default(),
        checks,
        reasoning: answer.reasoning.unwrap_or_default(),
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let inner = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };
    inner.trim_end().trim_end_matches("```").trim()
}

pub fn build_intent_classifier(config: &RuntimeConfig) -> Result<Arc<dyn IntentClassifier>> {
    if config.ai_provider != "google" {
        warn!(provider = %config.ai_provider, "no adapter for AI provider, using default plan");
        return Ok(Arc::new(StaticIntentClassifier::provider_not_configured()));
    }
    match config.ai_api_key.as_deref() {
        Some(key) if key != PLACEHOLDER_KEY => {
            info!(model = %config.ai_model, "intent classifier: gemini");
            let classifier = GeminiIntentClassifier::new(
                &config.ai_base_url,
                &config.ai_model,
                key,
                Duration::from_secs(config.request_timeout_seconds.max(1)),
            )?;
            Ok(Arc::new(classifier))
        }
        _ => {
            warn!("no AI API key configured, intent classifier runs in keyword mode");
            Ok(Arc::new(KeywordIntentClassifier::new()))
        }
    }
}
