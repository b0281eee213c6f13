//! Serving-cell observation.

use serde::Deserialize;

/// HTTP timing captured while fetching one response.
///
/// The default fetch path does not measure anything, so every field is zero
/// unless timing capture is switched on in the exporter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HttpProbe {
    pub status: u16,
    pub total_ms: f64,
    pub dns_ms: f64,
    pub first_byte_ms: f64,
    pub connect_ms: f64,
}

/// One fully parsed serving-cell observation for a target.
///
/// Values are only produced by the parser, all at once. There are no setters:
/// attaching probe timing consumes the reading and returns a new one.
/// `Deserialize` exists for fixtures that spell out an expected reading.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Reading {
    /// Label of the polled target (not necessarily the modem URL).
    pub target_url: String,

    #[serde(default)]
    pub http_status: u16,
    #[serde(default)]
    pub total_ms: f64,
    #[serde(default)]
    pub dns_ms: f64,
    #[serde(default)]
    pub first_byte_ms: f64,
    #[serde(default)]
    pub connect_ms: f64,

    pub state: String,
    pub mode: String,
    pub duplex_mode: String,
    pub mcc: f64,
    pub mnc: f64,
    /// Hex or decimal, kept verbatim.
    pub cell_id: String,
    pub pcid: f64,
    /// Never filled by the parser; the layout has no TAC position.
    #[serde(default)]
    pub tac: String,
    pub arfcn: f64,
    pub band: f64,
    pub dl_bandwidth: f64,
    pub rsrp: f64,
    pub rsrq: f64,
    pub sinr: f64,
    pub tx_power: f64,
}

impl Reading {
    /// Return the same observation carrying `probe` as its HTTP timing.
    pub fn with_probe(self, probe: HttpProbe) -> Self {
        Self {
            http_status: probe.status,
            total_ms: probe.total_ms,
            dns_ms: probe.dns_ms,
            first_byte_ms: probe.first_byte_ms,
            connect_ms: probe.connect_ms,
            ..self
        }
    }

    /// Timing fields as a probe value.
    pub fn probe(&self) -> HttpProbe {
        HttpProbe {
            status: self.http_status,
            total_ms: self.total_ms,
            dns_ms: self.dns_ms,
            first_byte_ms: self.first_byte_ms,
            connect_ms: self.connect_ms,
        }
    }
}
