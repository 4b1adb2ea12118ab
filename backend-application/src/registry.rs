use std::collections::HashMap;

use backend_domain::{ReportFormat, Scan, ScanConfig, ScanId};
use tokio::sync::{watch, RwLock};

use crate::AppError;

struct ScanEntry {
    scan: Scan,
    cancel: watch::Sender<bool>,
}

#[derive(Default)]
struct RegistryInner {
    order: Vec<ScanId>,
    entries: HashMap<ScanId, ScanEntry>,
}

/// Process-wide store of scan records.
///
/// A single lock guards every record, so readers never observe a
/// half-applied update. Each record also owns the cancellation signal its
/// orchestration task listens on.
#[derive(Default)]
pub struct ScanRegistry {
    inner: RwLock<RegistryInner>,
}

impl ScanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(
        &self,
        target_url: String,
        config: &ScanConfig,
        report_format: ReportFormat,
    ) -> Scan {
        let scan = Scan::new(target_url, config, report_format);
        let (cancel, _rx) = watch::channel(false);
        let mut inner = self.inner.write().await;
        inner.order.push(scan.id.clone());
        inner.entries.insert(
            scan.id.clone(),
            ScanEntry {
                scan: scan.clone(),
                cancel,
            },
        );
        scan
    }

    pub async fn get(&self, id: &ScanId) -> Result<Scan, AppError> {
        let inner = self.inner.read().await;
        inner
            .entries
            .get(id)
            .map(|entry| entry.scan.clone())
            .ok_or_else(|| AppError::scan_not_found(id))
    }

    /// Records in insertion order.
    pub async fn list(&self) -> Vec<Scan> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter_map(|id| inner.entries.get(id))
            .map(|entry| entry.scan.clone())
            .collect()
    }

    /// Applies `mutator` to the record while holding the write lock.
    pub async fn update<F, R>(&self, id: &ScanId, mutator: F) -> Result<R, AppError>
    where
        F: FnOnce(&mut Scan) -> R,
    {
        let mut inner = self.inner.write().await;
        let entry = inner
            .entries
            .get_mut(id)
            .ok_or_else(|| AppError::scan_not_found(id))?;
        Ok(mutator(&mut entry.scan))
    }

    /// Marks the scan STOPPED (unless already terminal) and fires its cancellation signal.
    pub async fn request_stop(&self, id: &ScanId) -> Result<Scan, AppError> {
        let mut inner = self.inner.write().await;
        let entry = inner
            .entries
            .get_mut(id)
            .ok_or_else(|| AppError::scan_not_found(id))?;
        if entry.scan.stop() {
            entry.cancel.send_replace(true);
        }
        Ok(entry.scan.clone())
    }

    pub async fn cancel_signal(&self, id: &ScanId) -> Result<watch::Receiver<bool>, AppError> {
        let inner = self.inner.read().await;
        inner
            .entries
            .get(id)
            .map(|entry| entry.cancel.subscribe())
            .ok_or_else(|| AppError::scan_not_found(id))
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drops every record. Running orchestration tasks see their record vanish and exit.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        for entry in inner.entries.values() {
            entry.cancel.send_replace(true);
        }
        inner.order.clear();
        inner.entries.clear();
    }
}
