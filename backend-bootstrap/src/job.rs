use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use tracing::{error, info, warn};

use backend_application::commands::intent_commands;
use backend_application::AppState;
use backend_domain::ports::ReportUploader;
use backend_domain::{
    build_report, findings_from_alerts, EngineReportFormat, ReportFormat, Scan, ScanConfig,
    ScanState, ScanType,
};
use backend_infrastructure::{
    default_report_path, load_scan_rules, upload_key, write_report, write_report_text,
};

/// What a batch job writes once its scan completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobReportFormat {
    /// The engine's own report.
    Engine(EngineReportFormat),
    /// Findings converted from the engine's alerts.
    Converted(ReportFormat),
}

impl Default for JobReportFormat {
    fn default() -> Self {
        JobReportFormat::Engine(EngineReportFormat::Json)
    }
}

impl JobReportFormat {
    /// `json` and `html` select engine reports; `sarif` and `ocsf` are converted.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "json" => Some(JobReportFormat::Engine(EngineReportFormat::Json)),
            "html" => Some(JobReportFormat::Engine(EngineReportFormat::Html)),
            "sarif" => Some(JobReportFormat::Converted(ReportFormat::Sarif)),
            "ocsf" => Some(JobReportFormat::Converted(ReportFormat::Ocsf)),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            JobReportFormat::Engine(format) => format.extension(),
            JobReportFormat::Converted(format) => format.extension(),
        }
    }

    /// Format stored on the scan record.
    fn recorded(&self) -> ReportFormat {
        match self {
            JobReportFormat::Engine(_) => ReportFormat::Json,
            JobReportFormat::Converted(format) => *format,
        }
    }
}

/// One batch scan as requested on the command line.
#[derive(Debug, Clone, Default)]
pub struct JobOptions {
    pub url: String,
    pub scan_type: Option<String>,
    pub checks: Vec<String>,
    pub rules_file: Option<PathBuf>,
    pub ai_prompt: Option<String>,
    pub format: JobReportFormat,
    pub output: Option<PathBuf>,
}

#[derive(Debug)]
pub struct JobOutcome {
    pub scan: Scan,
    pub report_path: Option<PathBuf>,
    pub uploaded_to: Option<String>,
}

impl JobOutcome {
    pub fn succeeded(&self) -> bool {
        self.scan.state == ScanState::Completed
    }
}

/// Builds the scan configuration; a prompt's scan type wins, its checks only fill an empty list.
pub async fn resolve_scan_config(state: &AppState, options: &JobOptions) -> Result<ScanConfig> {
    let mut scan_type = options
        .scan_type
        .as_deref()
        .map(ScanType::from)
        .unwrap_or_default();
    let mut checks: Vec<String> = options
        .checks
        .iter()
        .map(|check| check.trim().to_string())
        .filter(|check| !check.is_empty())
        .collect();

    if let Some(prompt) = options.ai_prompt.as_deref() {
        if state.config.ai_api_key.is_none() {
            bail!("AI prompt provided but no AI API key is configured");
        }
        let analysis = intent_commands::analyze_intent(state, prompt).await?;
        info!(
            scan_type = analysis.scan_type.as_str(),
            checks = ?analysis.checks,
            "prompt analysis: {}",
            analysis.reasoning
        );
        scan_type = analysis.scan_type;
        if checks.is_empty() {
            checks = analysis.checks;
        }
    }

    let custom_rules = match &options.rules_file {
        Some(path) => {
            let rules = load_scan_rules(path).await?;
            info!(count = rules.len(), "loaded custom rules from {}", path.display());
            rules
        }
        None => Vec::new(),
    };

    Ok(ScanConfig {
        scan_type,
        checks,
        custom_rules,
    })
}

/// Runs one scan to a terminal state, then writes and optionally uploads its report.
pub async fn run_job(
    state: &AppState,
    options: JobOptions,
    uploader: Option<Arc<dyn ReportUploader>>,
) -> Result<JobOutcome> {
    let config = resolve_scan_config(state, &options).await?;
    info!(
        url = %options.url,
        scan_type = config.scan_type.as_str(),
        checks = ?config.checks,
        "configuring scan"
    );
    let submitted = state
        .orchestrator
        .submit(&options.url, config, options.format.recorded())
        .await;
    let scan = wait_for_terminal(state, &submitted).await?;
    info!(scan_id = %scan.id, state = %scan.state, "scan finished");

    if scan.state != ScanState::Completed {
        if let Some(reason) = &scan.error {
            error!(scan_id = %scan.id, "scan failed: {}", reason);
        }
        return Ok(JobOutcome {
            scan,
            report_path: None,
            uploaded_to: None,
        });
    }

    let path = options
        .output
        .clone()
        .unwrap_or_else(|| default_report_path(options.format.extension()));
    if let Err(err) = save_report(state, &scan, options.format, &path).await {
        error!("failed to write report to {}: {:#}", path.display(), err);
        return Ok(JobOutcome {
            scan,
            report_path: None,
            uploaded_to: None,
        });
    }
    info!("report saved to {}", path.display());

    let uploaded_to = match uploader {
        Some(uploader) => {
            let key = upload_key(&scan.id, options.format.extension());
            match uploader.upload(&path, &key).await {
                Ok(location) => Some(location),
                Err(err) => {
                    warn!("report upload failed: {:#}", err);
                    None
                }
            }
        }
        None => {
            info!("no bucket configured, report is local only");
            None
        }
    };

    Ok(JobOutcome {
        scan,
        report_path: Some(path),
        uploaded_to,
    })
}

async fn save_report(
    state: &AppState,
    scan: &Scan,
    format: JobReportFormat,
    path: &Path,
) -> Result<()> {
    match format {
        JobReportFormat::Engine(format) => {
            let content = state.scanner.fetch_report(format).await?;
            write_report_text(path, &content).await
        }
        JobReportFormat::Converted(format) => {
            let alerts = state.scanner.fetch_findings(&scan.target_url).await;
            let document = build_report(format, &scan.id, findings_from_alerts(alerts));
            write_report(path, &document).await
        }
    }
}

async fn wait_for_terminal(state: &AppState, submitted: &Scan) -> Result<Scan> {
    let interval = Duration::from_millis(state.config.job_poll_interval_ms.max(1));
    let mut last_progress = None;
    loop {
        let scan = state.registry.get(&submitted.id).await?;
        if scan.is_terminal() {
            return Ok(scan);
        }
        if scan.state == ScanState::Running && last_progress != Some(scan.progress) {
            info!(scan_id = %scan.id, progress = scan.progress, "scan progress");
            last_progress = Some(scan.progress);
        }
        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use backend_domain::ports::{IntentClassifier, ScannerClient};
    use backend_domain::{
        parse_report_stats, IntentAnalysis, RawAlert, ReportStats, RuntimeConfig, ScanRule,
        ScannerError,
    };

    use super::*;

    const NATIVE_REPORT: &str = r#"{"@version":"2.14.0","site":[{"alerts":[
        {"name":"Path Traversal","riskcode":"3","riskdesc":"High (Medium)","count":"2"}
    ]}]}"#;

    struct StubScanner {
        fail_probe: bool,
        fail_engine_report: bool,
        policies: Mutex<Vec<(Vec<String>, Vec<ScanRule>)>>,
    }

    impl StubScanner {
        fn new(fail_probe: bool) -> Self {
            Self {
                fail_probe,
                fail_engine_report: false,
                policies: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ScannerClient for StubScanner {
        async fn apply_policy(
            &self,
            checks: &[String],
            rules: &[ScanRule],
        ) -> Result<(), ScannerError> {
            self.policies.lock().unwrap().push((checks.to_vec(), rules.to_vec()));
            Ok(())
        }
        async fn start_discovery(&self, _target: &str) -> Result<String, ScannerError> {
            Ok("1".to_string())
        }
        async fn discovery_status(&self, _task_id: &str) -> Result<u8, ScannerError> {
            Ok(100)
        }
        async fn start_probe(&self, _target: &str) -> Result<String, ScannerError> {
            if self.fail_probe {
                return Err(ScannerError::Unreachable("engine gone".to_string()));
            }
            Ok("2".to_string())
        }
        async fn probe_status(&self, _task_id: &str) -> Result<u8, ScannerError> {
            Ok(100)
        }
        async fn stop(&self, _discovery: Option<&str>, _probe: Option<&str>) {}
        async fn fetch_findings(&self, _target: &str) -> Vec<RawAlert> {
            vec![RawAlert {
                alert: Some("Path Traversal".to_string()),
                risk: Some("High".to_string()),
                cweid: Some("22".to_string()),
                ..RawAlert::default()
            }]
        }
        async fn fetch_report(&self, format: EngineReportFormat) -> Result<String, ScannerError> {
            if self.fail_engine_report {
                return Err(ScannerError::InvalidResponse("report unavailable".to_string()));
            }
            Ok(match format {
                EngineReportFormat::Json => NATIVE_REPORT.to_string(),
                EngineReportFormat::Html => "<html><body>report</body></html>".to_string(),
            })
        }
        async fn ping(&self) -> Result<String, ScannerError> {
            Ok("test".to_string())
        }
    }

    struct ApiClassifier;

    #[async_trait]
    impl IntentClassifier for ApiClassifier {
        async fn classify(&self, _prompt: &str) -> anyhow::Result<IntentAnalysis> {
            Ok(IntentAnalysis {
                scan_type: ScanType::Api,
                checks: vec!["CSRF".to_string()],
                reasoning: "api".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingUploader {
        keys: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl ReportUploader for RecordingUploader {
        async fn upload(&self, local_path: &Path, key: &str) -> anyhow::Result<String> {
            assert!(local_path.exists());
            self.keys.lock().unwrap().push(key.to_string());
            if self.fail {
                anyhow::bail!("permission denied");
            }
            Ok(format!("gs://bucket/{}", key))
        }
    }

    fn state(scanner: Arc<StubScanner>, ai_api_key: Option<&str>) -> AppState {
        let config = RuntimeConfig {
            poll_interval_ms: 5,
            job_poll_interval_ms: 5,
            ai_api_key: ai_api_key.map(ToString::to_string),
            ..RuntimeConfig::default()
        };
        AppState::new(config, scanner, Arc::new(ApiClassifier))
    }

    #[tokio::test]
    async fn completed_scan_writes_and_uploads_report() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("out.sarif");
        let state = state(Arc::new(StubScanner::new(false)), None);
        let uploader = Arc::new(RecordingUploader::default());
        let options = JobOptions {
            url: "a.test".to_string(),
            format: JobReportFormat::Converted(ReportFormat::Sarif),
            output: Some(output.clone()),
            ..JobOptions::default()
        };

        let outcome = run_job(&state, options, Some(uploader.clone())).await.expect("job");
        assert!(outcome.succeeded());
        assert_eq!(outcome.report_path.as_deref(), Some(output.as_path()));
        let written: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&output).expect("report")).expect("json");
        assert_eq!(written["runs"][0]["results"][0]["ruleId"], "22");

        let expected_key = format!("reports/{}.sarif", outcome.scan.id);
        assert_eq!(uploader.keys.lock().unwrap().clone(), vec![expected_key.clone()]);
        assert_eq!(outcome.uploaded_to, Some(format!("gs://bucket/{}", expected_key)));
    }

    #[tokio::test]
    async fn upload_failure_is_not_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = state(Arc::new(StubScanner::new(false)), None);
        let uploader = Arc::new(RecordingUploader {
            fail: true,
            ..RecordingUploader::default()
        });
        let options = JobOptions {
            url: "https://a.test".to_string(),
            output: Some(dir.path().join("r.json")),
            ..JobOptions::default()
        };
        let outcome = run_job(&state, options, Some(uploader)).await.expect("job");
        assert!(outcome.succeeded());
        assert!(outcome.report_path.is_some());
        assert!(outcome.uploaded_to.is_none());
    }

    #[tokio::test]
    async fn failed_scan_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("r.json");
        let state = state(Arc::new(StubScanner::new(true)), None);
        let options = JobOptions {
            url: "https://a.test".to_string(),
            output: Some(output.clone()),
            ..JobOptions::default()
        };
        let outcome = run_job(&state, options, None).await.expect("job");
        assert!(!outcome.succeeded());
        assert_eq!(outcome.scan.state, ScanState::Failed);
        assert!(outcome.report_path.is_none());
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn prompt_sets_type_and_fills_empty_checks() {
        let state = state(Arc::new(StubScanner::new(false)), Some("key"));
        let options = JobOptions {
            url: "https://a.test".to_string(),
            scan_type: Some("BASELINE".to_string()),
            ai_prompt: Some("check the api".to_string()),
            ..JobOptions::default()
        };
        let config = resolve_scan_config(&state, &options).await.expect("config");
        assert_eq!(config.scan_type, ScanType::Api);
        assert_eq!(config.checks, vec!["CSRF".to_string()]);

        let explicit = JobOptions {
            checks: vec!["XSS".to_string()],
            ..options
        };
        let config = resolve_scan_config(&state, &explicit).await.expect("config");
        assert_eq!(config.checks, vec!["XSS".to_string()]);
    }

    #[tokio::test]
    async fn prompt_without_key_is_rejected() {
        let state = state(Arc::new(StubScanner::new(false)), None);
        let options = JobOptions {
            url: "https://a.test".to_string(),
            ai_prompt: Some("anything".to_string()),
            ..JobOptions::default()
        };
        assert!(resolve_scan_config(&state, &options).await.is_err());
    }

    #[tokio::test]
    async fn rules_file_feeds_policy() {
        let dir = tempfile::tempdir().expect("tempdir");
        let rules = dir.path().join("rules.yaml");
        std::fs::write(&rules, "rules:\n  - id: 40018\n    strength: HIGH\n").expect("write");
        let scanner = Arc::new(StubScanner::new(false));
        let state = state(scanner.clone(), None);
        let options = JobOptions {
            url: "https://a.test".to_string(),
            rules_file: Some(rules),
            output: Some(dir.path().join("r.json")),
            ..JobOptions::default()
        };
        let outcome = run_job(&state, options, None).await.expect("job");
        assert!(outcome.succeeded());
        let policies = scanner.policies.lock().unwrap().clone();
        assert_eq!(policies.len(), 1);
        assert_eq!(policies[0].1[0].id, "40018");
    }

    #[tokio::test]
    async fn engine_json_report_is_readable_by_stats() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("scan_report.json");
        let state = state(Arc::new(StubScanner::new(false)), None);
        let options = JobOptions {
            url: "https://a.test".to_string(),
            format: JobReportFormat::parse("json").expect("format"),
            output: Some(output.clone()),
            ..JobOptions::default()
        };
        let outcome = run_job(&state, options, None).await.expect("job");
        assert!(outcome.succeeded());
        assert_eq!(outcome.scan.report_format, ReportFormat::Json);

        let document: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&output).expect("report")).expect("json");
        let ReportStats::Native { total, severity, .. } = parse_report_stats(&document, "json")
        else {
            panic!("expected native dialect");
        };
        assert_eq!(total, 2);
        assert_eq!(severity.high, 2);
    }

    #[tokio::test]
    async fn html_report_is_written_and_uploaded_with_its_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("report.html");
        let state = state(Arc::new(StubScanner::new(false)), None);
        let uploader = Arc::new(RecordingUploader::default());
        let options = JobOptions {
            url: "https://a.test".to_string(),
            format: JobReportFormat::parse("HTML").expect("format"),
            output: Some(output.clone()),
            ..JobOptions::default()
        };
        let outcome = run_job(&state, options, Some(uploader.clone())).await.expect("job");
        assert!(outcome.succeeded());
        let html = std::fs::read_to_string(&output).expect("report");
        assert!(html.contains("<body>report</body>"));
        assert_eq!(
            uploader.keys.lock().unwrap().clone(),
            vec![format!("reports/{}.html", outcome.scan.id)]
        );
    }

    #[tokio::test]
    async fn missing_engine_report_leaves_no_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("scan_report.json");
        let scanner = Arc::new(StubScanner {
            fail_engine_report: true,
            ..StubScanner::new(false)
        });
        let state = state(scanner, None);
        let options = JobOptions {
            url: "https://a.test".to_string(),
            output: Some(output.clone()),
            ..JobOptions::default()
        };
        let outcome = run_job(&state, options, None).await.expect("job");
        assert!(outcome.succeeded());
        assert!(outcome.report_path.is_none());
        assert!(!output.exists());
    }

    #[test]
    fn job_formats_parse_and_map_extensions() {
        assert_eq!(
            JobReportFormat::parse(" sarif "),
            Some(JobReportFormat::Converted(ReportFormat::Sarif))
        );
        assert_eq!(JobReportFormat::parse("ocsf").map(|f| f.extension()), Some("ocsf"));
        assert_eq!(JobReportFormat::default().extension(), "json");
        assert!(JobReportFormat::parse("pdf").is_none());
    }
}
