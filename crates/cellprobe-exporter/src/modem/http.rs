//! HTTP client for the modem's `get_atcommand` CGI.
//!
//! The endpoint only answers requests that look like they came from the
//! modem's own web UI, hence the fixed browser header set. Every request is
//! bounded by the configured timeout.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONNECTION, PRAGMA, REFERER, USER_AGENT,
};

use cellprobe_core::error::{CellProbeError, Result};
use cellprobe_core::HttpProbe;

use super::{CellSource, Fetched, Target};

/// Path and percent-encoded query for `AT+QENG="servingcell"`.
pub const SERVINGCELL_PATH: &str = "/cgi-bin/get_atcommand?atcmd=AT%2BQENG%3D%22servingcell%22";

const BROWSER_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.0 Safari/605.1.15";

/// Full request URL for a target base URL (trailing `/` ignored).
pub fn request_url(base: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), SERVINGCELL_PATH)
}

pub struct HttpCellSource {
    client: reqwest::Client,
    timeout: Duration,
    record_timing: bool,
}

impl HttpCellSource {
    pub fn new(timeout: Duration, record_timing: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CellProbeError::Internal(format!("http client build failed: {e}")))?;
        Ok(Self {
            client,
            timeout,
            record_timing,
        })
    }

    /// Request timeout in milliseconds, saturating at `u64::MAX`.
    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    fn classify(&self, e: reqwest::Error) -> CellProbeError {
        if e.is_timeout() {
            CellProbeError::Timeout(self.timeout_ms())
        } else {
            CellProbeError::Transport(e.to_string())
        }
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

#[async_trait]
impl CellSource for HttpCellSource {
    async fn fetch(&self, target: &Target) -> Result<Fetched> {
        let base = target.base_url.trim_end_matches('/');
        let started = Instant::now();

        let resp = self
            .client
            .get(request_url(base))
            .header(ACCEPT, "*/*")
            .header(PRAGMA, "no-cache")
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(REFERER, format!("{base}/bandlock.html"))
            .header(CACHE_CONTROL, "no-cache")
            .header(USER_AGENT, BROWSER_UA)
            .header(CONNECTION, "keep-alive")
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        let first_byte = started.elapsed();

        let status = resp.status();
        if !status.is_success() {
            return Err(CellProbeError::Transport(format!("modem answered {status}")));
        }

        let body = resp.text().await.map_err(|e| self.classify(e))?;

        let probe = if self.record_timing {
            HttpProbe {
                status: status.as_u16(),
                total_ms: millis(started.elapsed()),
                first_byte_ms: millis(first_byte),
                ..HttpProbe::default()
            }
        } else {
            HttpProbe::default()
        };

        Ok(Fetched { body, probe })
    }
}
