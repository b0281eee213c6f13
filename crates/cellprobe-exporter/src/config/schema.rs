use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use cellprobe_core::error::{CellProbeError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub version: u32,

    #[serde(default)]
    pub exporter: ExporterSection,

    #[serde(default)]
    pub poller: PollerSection,

    #[serde(default)]
    pub metrics: MetricsSection,

    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(CellProbeError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.exporter.validate()?;
        self.poller.validate()?;

        let mut seen = HashSet::new();
        for t in &self.targets {
            let url = t.url();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(CellProbeError::Config(format!(
                    "target url must start with http:// or https://: {url}"
                )));
            }
            if t.label().trim().is_empty() {
                return Err(CellProbeError::Config(format!(
                    "target name must not be empty (url={url})"
                )));
            }
            if !seen.insert(t.label()) {
                return Err(CellProbeError::Config(format!(
                    "duplicate target label: {}",
                    t.label()
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ExporterSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ExporterSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            CellProbeError::Config(format!(
                "exporter.listen must be a valid SocketAddr ({}): {e}",
                self.listen
            ))
        })
    }
}

/// How targets of one sweep are polled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepMode {
    /// One target after another, in configured order.
    #[default]
    Sequential,
    /// All targets of a sweep at once; the sleep still follows the whole sweep.
    Concurrent,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollerSection {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default)]
    pub sweep: SweepMode,

    /// Fill the reading's HTTP status and timing from the fetch.
    #[serde(default)]
    pub record_http_timing: bool,
}

impl Default for PollerSection {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            request_timeout_ms: default_request_timeout_ms(),
            sweep: SweepMode::default(),
            record_http_timing: false,
        }
    }
}

impl PollerSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=86_400).contains(&self.interval_secs) {
            return Err(CellProbeError::Config(
                "poller.interval_secs must be between 1 and 86400".into(),
            ));
        }
        if !(100..=120_000).contains(&self.request_timeout_ms) {
            return Err(CellProbeError::Config(
                "poller.request_timeout_ms must be between 100 and 120000".into(),
            ));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn default_listen() -> String {
    "0.0.0.0:8000".into()
}
fn default_interval_secs() -> u64 {
    60
}
fn default_request_timeout_ms() -> u64 {
    10_000
}

/// Lifecycle of per-cell series when state, mode, or cell id change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellSeries {
    /// Keep every label combination ever seen at its last value.
    #[default]
    Retain,
    /// Drop a target's older label combinations once a new one is published.
    Replace,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    #[serde(default)]
    pub cell_series: CellSeries,
}

/// A polled modem. Either a bare base URL or `{ url, name }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TargetConfig {
    Url(String),
    Detailed(TargetDetail),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetDetail {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl TargetConfig {
    pub fn url(&self) -> &str {
        match self {
            TargetConfig::Url(url) => url,
            TargetConfig::Detailed(d) => &d.url,
        }
    }

    /// Value of the `url` metric label; the name when given, else the URL.
    pub fn label(&self) -> &str {
        match self {
            TargetConfig::Url(url) => url,
            TargetConfig::Detailed(d) => d.name.as_deref().unwrap_or(&d.url),
        }
    }
}
