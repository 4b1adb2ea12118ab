use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use backend_domain::{
    EngineReportFormat, IntentAnalysis, IntentClassifier, RawAlert, ScanRule, ScannerClient,
    ScannerError,
};
use tokio::sync::Notify;

type Gate = Mutex<Option<Arc<Notify>>>;

/// Plays back scripted status readings. The last reading of a script repeats forever.
#[derive(Default)]
pub struct ScriptedScanner {
    pub discovery: Mutex<VecDeque<Result<u8, ScannerError>>>,
    pub probe: Mutex<VecDeque<Result<u8, ScannerError>>>,
    pub start_probe_error: Mutex<Option<ScannerError>>,
    pub policy_error: Mutex<Option<ScannerError>>,
    pub alerts: Mutex<Vec<RawAlert>>,
    pub starts: Mutex<Vec<&'static str>>,
    pub policies: Mutex<Vec<(Vec<String>, Vec<ScanRule>)>>,
    pub stops: Mutex<Vec<(Option<String>, Option<String>)>>,
    pub discovery_gate: Gate,
    pub probe_gate: Gate,
}

impl ScriptedScanner {
    pub fn new(discovery: Vec<u8>, probe: Vec<u8>) -> Self {
        Self::with_readings(
            discovery.into_iter().map(Ok).collect(),
            probe.into_iter().map(Ok).collect(),
        )
    }

    pub fn with_readings(
        discovery: Vec<Result<u8, ScannerError>>,
        probe: Vec<Result<u8, ScannerError>>,
    ) -> Self {
        Self {
            discovery: Mutex::new(discovery.into()),
            probe: Mutex::new(probe.into()),
            ..Self::default()
        }
    }

    pub fn stop_calls(&self) -> Vec<(Option<String>, Option<String>)> {
        self.stops.lock().unwrap().clone()
    }

    pub fn start_calls(&self) -> Vec<&'static str> {
        self.starts.lock().unwrap().clone()
    }

    /// Makes `start_discovery` wait until the returned handle is notified.
    pub fn hold_discovery_start(&self) -> Arc<Notify> {
        Self::hold(&self.discovery_gate)
    }

    pub fn hold_probe_start(&self) -> Arc<Notify> {
        Self::hold(&self.probe_gate)
    }

    fn hold(gate: &Gate) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *gate.lock().unwrap() = Some(notify.clone());
        notify
    }

    async fn pass(gate: &Gate) {
        let held = gate.lock().unwrap().clone();
        if let Some(notify) = held {
            notify.notified().await;
        }
    }

    fn next(script: &Mutex<VecDeque<Result<u8, ScannerError>>>) -> Result<u8, ScannerError> {
        let mut script = script.lock().unwrap();
        if script.len() > 1 {
            return script.pop_front().unwrap_or(Ok(100));
        }
        script.front().cloned().unwrap_or(Ok(100))
    }
}

#[async_trait]
impl ScannerClient for ScriptedScanner {
    async fn apply_policy(
        &self,
        checks: &[String],
        rules: &[ScanRule],
    ) -> Result<(), ScannerError> {
        self.policies
            .lock()
            .unwrap()
            .push((checks.to_vec(), rules.to_vec()));
        match self.policy_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn start_discovery(&self, _target: &str) -> Result<String, ScannerError> {
        self.starts.lock().unwrap().push("discovery");
        Self::pass(&self.discovery_gate).await;
        Ok("7".to_string())
    }

    async fn discovery_status(&self, _task_id: &str) -> Result<u8, ScannerError> {
        Self::next(&self.discovery)
    }

    async fn start_probe(&self, _target: &str) -> Result<String, ScannerError> {
        self.starts.lock().unwrap().push("probe");
        Self::pass(&self.probe_gate).await;
        match self.start_probe_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok("11".to_string()),
        }
    }

    async fn probe_status(&self, _task_id: &str) -> Result<u8, ScannerError> {
        Self::next(&self.probe)
    }

    async fn stop(&self, discovery_task_id: Option<&str>, probe_task_id: Option<&str>) {
        self.stops.lock().unwrap().push((
            discovery_task_id.map(ToString::to_string),
            probe_task_id.map(ToString::to_string),
        ));
    }

    async fn fetch_findings(&self, _target: &str) -> Vec<RawAlert> {
        self.alerts.lock().unwrap().clone()
    }

    async fn fetch_report(&self, format: EngineReportFormat) -> Result<String, ScannerError> {
        Ok(match format {
            EngineReportFormat::Json => r#"{"site":[]}"#.to_string(),
            EngineReportFormat::Html => "<html></html>".to_string(),
        })
    }

    async fn ping(&self) -> Result<String, ScannerError> {
        Ok("2.14.0".to_string())
    }
}

pub struct FixedClassifier(pub anyhow::Result<IntentAnalysis>);

#[async_trait]
impl IntentClassifier for FixedClassifier {
    async fn classify(&self, _prompt: &str) -> anyhow::Result<IntentAnalysis> {
        match &self.0 {
            Ok(analysis) => Ok(analysis.clone()),
            Err(err) => Err(anyhow::anyhow!(err.to_string())),
        }
    }
}
