use std::sync::Arc;
use std::time::Duration;

use backend_domain::{
    normalize_target_url, ReportFormat, Scan, ScanConfig, ScanId, ScanPhase, ScanState,
    ScannerClient, ScannerError,
};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::{AppError, Metrics, ScanRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollOutcome {
    Finished,
    Cancelled,
}

/// Drives scans through discovery and probing against the scan engine.
///
/// Each submitted scan gets one task. The task suspends only while waiting
/// between status polls, and that wait is raced against the scan's
/// cancellation signal.
#[derive(Clone)]
pub struct ScanOrchestrator {
    registry: Arc<ScanRegistry>,
    scanner: Arc<dyn ScannerClient>,
    metrics: Arc<Metrics>,
    poll_interval: Duration,
}

impl ScanOrchestrator {
    pub fn new(
        registry: Arc<ScanRegistry>,
        scanner: Arc<dyn ScannerClient>,
        metrics: Arc<Metrics>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            registry,
            scanner,
            metrics,
            poll_interval,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Registers a PENDING scan and spawns its orchestration task.
    pub async fn submit(
        &self,
        target: &str,
        config: ScanConfig,
        report_format: ReportFormat,
    ) -> Scan {
        let scan = self
            .registry
            .create(normalize_target_url(target), &config, report_format)
            .await;
        self.metrics.record_submitted();
        info!(
            scan_id = %scan.id,
            url = %scan.target_url,
            scan_type = config.scan_type.as_str(),
            "scan submitted"
        );

        let orchestrator = self.clone();
        let scan_id = scan.id.clone();
        tokio::spawn(async move {
            orchestrator.run(scan_id, config).await;
        });
        scan
    }

    /// Marks the scan STOPPED and asks the engine to stop whichever tasks it started.
    pub async fn stop(&self, scan_id: &ScanId) -> Result<Scan, AppError> {
        let scan = self.registry.request_stop(scan_id).await?;
        self.scanner
            .stop(
                scan.discovery_task_id.as_deref(),
                scan.probe_task_id.as_deref(),
            )
            .await;
        info!(scan_id = %scan_id, state = %scan.state, "stop requested");
        Ok(scan)
    }

    /// Runs one scan to a terminal state and returns that state.
    pub async fn run(&self, scan_id: ScanId, config: ScanConfig) -> ScanState {
        let Ok(mut cancel) = self.registry.cancel_signal(&scan_id).await else {
            warn!(scan_id = %scan_id, "scan vanished before its task started");
            return ScanState::Stopped;
        };
        let started = self
            .registry
            .update(&scan_id, |scan| scan.start().then(|| scan.target_url.clone()))
            .await;
        let target = match started {
            Ok(Some(target)) => target,
            Ok(None) => {
                info!(scan_id = %scan_id, "scan no longer pending, skipping");
                return self.finish(&scan_id).await;
            }
            Err(_) => return ScanState::Stopped,
        };

        if config.has_policy() {
            if let Err(err) = self
                .scanner
                .apply_policy(&config.checks, &config.custom_rules)
                .await
            {
                warn!(
                    scan_id = %scan_id,
                    "scan policy not applied, using engine defaults: {}", err
                );
            }
        }

        match self.drive(&scan_id, &target, &mut cancel).await {
            Ok(PollOutcome::Finished) => {
                let completed = self
                    .registry
                    .update(&scan_id, |scan| scan.complete())
                    .await
                    .unwrap_or(false);
                if completed {
                    info!(scan_id = %scan_id, "scan completed");
                }
            }
            Ok(PollOutcome::Cancelled) => {
                info!(scan_id = %scan_id, "scan stopped");
            }
            Err(err) => {
                error!(scan_id = %scan_id, "scan failed: {}", err);
                let reason = err.to_string();
                let _ = self
                    .registry
                    .update(&scan_id, move |scan| scan.fail(reason))
                    .await;
            }
        }
        self.finish(&scan_id).await
    }

    async fn finish(&self, scan_id: &ScanId) -> ScanState {
        let state = self
            .registry
            .get(scan_id)
            .await
            .map(|scan| scan.state)
            .unwrap_or(ScanState::Stopped);
        self.metrics.record_outcome(state);
        state
    }

    async fn drive(
        &self,
        scan_id: &ScanId,
        target: &str,
        cancel: &mut watch::Receiver<bool>,
    ) -> Result<PollOutcome, ScannerError> {
        for phase in [ScanPhase::Discovery, ScanPhase::Probe] {
            if self.is_cancelled(scan_id, cancel).await {
                return Ok(PollOutcome::Cancelled);
            }
            let task_id = match phase {
                ScanPhase::Discovery => self.scanner.start_discovery(target).await?,
                ScanPhase::Probe => self.scanner.start_probe(target).await?,
            };
            let recorded = task_id.clone();
            let stored = self
                .registry
                .update(scan_id, move |scan| match phase {
                    ScanPhase::Discovery => scan.discovery_task_id = Some(recorded),
                    ScanPhase::Probe => scan.probe_task_id = Some(recorded),
                })
                .await;
            info!(scan_id = %scan_id, phase = phase.as_str(), task_id = %task_id, "phase started");

            let outcome = if stored.is_err() {
                PollOutcome::Cancelled
            } else {
                self.poll_phase(scan_id, phase, &task_id, cancel).await?
            };
            if outcome == PollOutcome::Cancelled {
                // The stop request may have raced the task start; stop it too.
                match phase {
                    ScanPhase::Discovery => self.scanner.stop(Some(&task_id), None).await,
                    ScanPhase::Probe => self.scanner.stop(None, Some(&task_id)).await,
                }
                return Ok(PollOutcome::Cancelled);
            }
        }
        Ok(PollOutcome::Finished)
    }

    async fn poll_phase(
        &self,
        scan_id: &ScanId,
        phase: ScanPhase,
        task_id: &str,
        cancel: &mut watch::Receiver<bool>,
    ) -> Result<PollOutcome, ScannerError> {
        loop {
            if self.is_cancelled(scan_id, cancel).await {
                return Ok(PollOutcome::Cancelled);
            }

            let reading = match phase {
                ScanPhase::Discovery => self.scanner.discovery_status(task_id).await,
                ScanPhase::Probe => self.scanner.probe_status(task_id).await,
            };
            match reading {
                Ok(percent) => {
                    let blended = phase.blend(percent);
                    if self
                        .registry
                        .update(scan_id, |scan| scan.record_progress(blended))
                        .await
                        .is_err()
                    {
                        return Ok(PollOutcome::Cancelled);
                    }
                    debug!(
                        scan_id = %scan_id,
                        phase = phase.as_str(),
                        percent,
                        progress = blended,
                        "phase progress"
                    );
                    if percent >= 100 {
                        return Ok(PollOutcome::Finished);
                    }
                }
                Err(err) if err.is_transient() => {
                    warn!(
                        scan_id = %scan_id,
                        phase = phase.as_str(),
                        "status poll failed, retrying: {}", err
                    );
                }
                Err(err) => return Err(err),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                changed = cancel.changed() => {
                    if changed.is_err() {
                        tokio::time::sleep(self.poll_interval).await;
                    }
                }
            }
        }
    }

    async fn is_cancelled(&self, scan_id: &ScanId, cancel: &watch::Receiver<bool>) -> bool {
        if *cancel.borrow() {
            return true;
        }
        match self.registry.get(scan_id).await {
            Ok(scan) => scan.state == ScanState::Stopped,
            Err(_) => true,
        }
    }
}
