//! Fetch → parse → publish loop.
//!
//! One sweep polls every target once, in configured order (or all at once
//! with `SweepMode::Concurrent`). A failing target is counted, logged, and
//! skipped; it never stops the sweep. The next sweep is the only retry.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use futures_util::future::join_all;

use cellprobe_core::error::{CellProbeError, ParseError, Result};
use cellprobe_core::protocol::servingcell;
use cellprobe_core::Reading;

use crate::config::SweepMode;
use crate::modem::{CellSource, Target};
use crate::obs::metrics::ExporterMetrics;

/// Characters of the raw body kept in failure logs.
const SNIPPET_CHARS: usize = 160;

pub struct Poller {
    source: Arc<dyn CellSource>,
    metrics: Arc<ExporterMetrics>,
    targets: Vec<Target>,
    interval: Duration,
    mode: SweepMode,
}

impl Poller {
    pub fn new(
        source: Arc<dyn CellSource>,
        metrics: Arc<ExporterMetrics>,
        targets: Vec<Target>,
        interval: Duration,
        mode: SweepMode,
    ) -> Self {
        Self {
            source,
            metrics,
            targets,
            interval,
            mode,
        }
    }

    /// Sweep, sleep `interval`, repeat. Runs until the task is dropped.
    pub async fn run(self) {
        tracing::info!(
            targets = self.targets.len(),
            interval_secs = self.interval.as_secs(),
            sweep = ?self.mode,
            "poller started"
        );
        loop {
            self.sweep().await;
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Poll every target once.
    pub async fn sweep(&self) {
        match self.mode {
            SweepMode::Sequential => {
                for target in &self.targets {
                    let _ = self.poll_target(target).await;
                }
            }
            SweepMode::Concurrent => {
                join_all(self.targets.iter().map(|t| self.poll_target(t))).await;
            }
        }
    }

    /// Fetch and parse one target, publishing the reading on success.
    ///
    /// Errors are already counted and logged when this returns.
    pub async fn poll_target(&self, target: &Target) -> Result<Reading> {
        let fetched = match self.source.fetch(target).await {
            Ok(f) => f,
            Err(e) => {
                self.report(target, &e, None);
                return Err(e);
            }
        };
        tracing::debug!(url = %target.label, body = ?fetched.body, "modem response");

        let reading = match servingcell::parse(&fetched.body, &target.label) {
            Ok(r) => r.with_probe(fetched.probe),
            Err(pe) => {
                let e = CellProbeError::from(pe);
                self.report(target, &e, Some(&fetched.body));
                return Err(e);
            }
        };

        self.metrics.update(&reading);
        self.metrics.record_outcome(&target.label, "ok");
        self.metrics.mark_success(&target.label, unix_now());

        tracing::info!(
            url = %reading.target_url,
            state = %reading.state,
            mode = %reading.mode,
            cellid = %reading.cell_id,
            rsrp = reading.rsrp,
            rsrq = reading.rsrq,
            sinr = reading.sinr,
            status = reading.http_status,
            total_ms = reading.total_ms,
            "reading published"
        );

        Ok(reading)
    }

    fn report(&self, target: &Target, err: &CellProbeError, body: Option<&str>) {
        let kind = err.kind().as_str();
        self.metrics.record_outcome(&target.label, kind);

        let index = match err {
            CellProbeError::Parse(ParseError::FieldConversion { index, .. }) => Some(*index),
            _ => None,
        };
        let snippet: Option<String> = body.map(|b| b.chars().take(SNIPPET_CHARS).collect());

        tracing::warn!(
            url = %target.label,
            kind,
            index = ?index,
            snippet = ?snippet,
            error = %err,
            "poll failed, skipping target this round"
        );
    }
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
