//! Modem access.
//!
//! `CellSource` is the seam between the poller and the network: the poller
//! only asks for a response body and never sees HTTP.

pub mod http;

use async_trait::async_trait;

use cellprobe_core::{HttpProbe, Result};

use crate::config::TargetConfig;

pub use http::HttpCellSource;

/// One configured modem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Value of the `url` label on every series for this modem.
    pub label: String,
    /// Base URL the diagnostic endpoint hangs off.
    pub base_url: String,
}

impl From<&TargetConfig> for Target {
    fn from(t: &TargetConfig) -> Self {
        Self {
            label: t.label().to_string(),
            base_url: t.url().to_string(),
        }
    }
}

/// Raw response body plus whatever timing the source measured.
#[derive(Debug, Clone, Default)]
pub struct Fetched {
    pub body: String,
    pub probe: HttpProbe,
}

/// Source of serving-cell responses.
#[async_trait]
pub trait CellSource: Send + Sync {
    async fn fetch(&self, target: &Target) -> Result<Fetched>;
}
