//! Shared application state for the exporter.
//!
//! Owns the metrics registry; the poller and the HTTP handlers each hold a
//! clone of the same `Arc`.

use std::sync::Arc;

use crate::config::ExporterConfig;
use crate::modem::{CellSource, Target};
use crate::obs::metrics::ExporterMetrics;
use crate::poller::Poller;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    metrics: Arc<ExporterMetrics>,
}

struct AppStateInner {
    cfg: ExporterConfig,
    targets: Vec<Target>,
}

impl AppState {
    pub fn new(cfg: ExporterConfig) -> Self {
        if cfg.targets.is_empty() {
            tracing::warn!("no targets configured; only exporter metrics will be served");
        }

        let targets = cfg.targets.iter().map(Target::from).collect();
        let metrics = Arc::new(ExporterMetrics::new(cfg.metrics.cell_series));

        Self {
            inner: Arc::new(AppStateInner { cfg, targets }),
            metrics,
        }
    }

    pub fn metrics(&self) -> Arc<ExporterMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn is_ready(&self) -> bool {
        self.metrics.is_ready()
    }

    /// Build the poller for the configured targets on top of `source`.
    pub fn poller(&self, source: Arc<dyn CellSource>) -> Poller {
        let p = &self.inner.cfg.poller;
        Poller::new(
            source,
            self.metrics(),
            self.inner.targets.clone(),
            p.interval(),
            p.sweep,
        )
    }
}
