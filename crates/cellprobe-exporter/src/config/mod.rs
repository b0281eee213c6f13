//! Exporter config loader (strict parsing).

pub mod schema;

use std::fs;

use cellprobe_core::error::{CellProbeError, Result};

pub use schema::{
    CellSeries, ExporterConfig, ExporterSection, MetricsSection, PollerSection, SweepMode,
    TargetConfig,
};

/// Config file used when neither an argument nor `CELLPROBE_CONFIG` is given.
pub const DEFAULT_CONFIG_PATH: &str = "cellprobe.yaml";

/// Resolve the config path: first CLI argument, then `CELLPROBE_CONFIG`.
pub fn resolve_path(arg: Option<String>) -> String {
    arg.or_else(|| std::env::var("CELLPROBE_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

pub fn load_from_file(path: &str) -> Result<ExporterConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| CellProbeError::Config(format!("read {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ExporterConfig> {
    let cfg: ExporterConfig = serde_yaml::from_str(s)
        .map_err(|e| CellProbeError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
