//! Metrics registry for the exporter.
//!
//! Instruments are declared once with their label names; every series is a
//! label-value tuple of the same arity mapped to an atomic cell. Setting a
//! tuple creates it or overwrites it. Nothing is aggregated or expired here:
//! series only disappear through an explicit `retain`.

use std::fmt::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use cellprobe_core::Reading;
use dashmap::DashMap;

use crate::config::CellSeries;

/// Labels of the per-target HTTP instruments.
pub const URL_LABELS: [&str; 1] = ["url"];
/// Labels of the per-cell instruments, in exposition order.
pub const CELL_LABELS: [&str; 5] = ["url", "state", "mode", "duplexmode", "cellid"];

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".into()
    } else if v.is_infinite() {
        if v > 0.0 { "+Inf".into() } else { "-Inf".into() }
    } else {
        v.to_string()
    }
}

fn label_str(names: &[&str], values: &[String]) -> String {
    names
        .iter()
        .zip(values)
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

fn write_header(out: &mut String, name: &str, help: &str, kind: &str) {
    let _ = writeln!(out, "# HELP {} {}", name, help);
    let _ = writeln!(out, "# TYPE {} {}", name, kind);
}

/// Last-write-wins `f64` gauge family.
pub struct GaugeVec<const N: usize> {
    name: &'static str,
    help: &'static str,
    labels: [&'static str; N],
    map: DashMap<[String; N], AtomicU64>,
}

impl<const N: usize> GaugeVec<N> {
    pub fn new(name: &'static str, help: &'static str, labels: [&'static str; N]) -> Self {
        Self {
            name,
            help,
            labels,
            map: DashMap::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Set the series for `values`, creating it if absent.
    pub fn set(&self, values: [&str; N], v: f64) {
        let key = values.map(str::to_owned);
        let cell = self.map.entry(key).or_insert_with(|| AtomicU64::new(0));
        cell.store(v.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self, values: [&str; N]) -> Option<f64> {
        let key = values.map(str::to_owned);
        self.map
            .get(&key)
            .map(|cell| f64::from_bits(cell.load(Ordering::Relaxed)))
    }

    /// Keep only the series whose label tuple satisfies `keep`.
    pub fn retain(&self, mut keep: impl FnMut(&[String; N]) -> bool) {
        self.map.retain(|k, _| keep(k));
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Render in Prometheus text exposition format, series sorted by labels.
    fn render(&self, out: &mut String) {
        write_header(out, self.name, self.help, "gauge");
        let mut rows: Vec<([String; N], f64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), f64::from_bits(r.value().load(Ordering::Relaxed))))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        for (key, v) in rows {
            let _ = writeln!(
                out,
                "{}{{{}}} {}",
                self.name,
                label_str(&self.labels, &key),
                format_value(v)
            );
        }
    }
}

/// Monotonic counter family.
pub struct CounterVec<const N: usize> {
    name: &'static str,
    help: &'static str,
    labels: [&'static str; N],
    map: DashMap<[String; N], AtomicU64>,
}

impl<const N: usize> CounterVec<N> {
    pub fn new(name: &'static str, help: &'static str, labels: [&'static str; N]) -> Self {
        Self {
            name,
            help,
            labels,
            map: DashMap::new(),
        }
    }

    /// Increment by 1.
    pub fn inc(&self, values: [&str; N]) {
        let key = values.map(str::to_owned);
        let counter = self.map.entry(key).or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self, values: [&str; N]) -> u64 {
        let key = values.map(str::to_owned);
        self.map
            .get(&key)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, out: &mut String) {
        write_header(out, self.name, self.help, "counter");
        let mut rows: Vec<([String; N], u64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        for (key, v) in rows {
            let _ = writeln!(out, "{}{{{}}} {}", self.name, label_str(&self.labels, &key), v);
        }
    }
}

/// Every instrument the exporter publishes.
///
/// Reading families keep the metric names dashboards already query. The
/// `cellprobe_*` families describe the exporter itself and never share a
/// name or label tuple with reading series.
pub struct ExporterMetrics {
    cell_series: CellSeries,

    pub url_status: GaugeVec<1>,
    pub url_response_ms: GaugeVec<1>,
    pub url_dns_ms: GaugeVec<1>,
    pub url_first_byte_ms: GaugeVec<1>,
    pub url_connect_time_ms: GaugeVec<1>,

    pub mcc: GaugeVec<5>,
    pub mnc: GaugeVec<5>,
    pub pcid: GaugeVec<5>,
    pub tac: GaugeVec<5>,
    pub arfcn: GaugeVec<5>,
    pub band: GaugeVec<5>,
    pub nrdlbw: GaugeVec<5>,
    pub rsrp: GaugeVec<5>,
    pub rsrq: GaugeVec<5>,
    pub sinr: GaugeVec<5>,
    pub txpower: GaugeVec<5>,

    pub polls: CounterVec<2>,
    pub last_success: GaugeVec<1>,
    ready: AtomicBool,
}

impl Default for ExporterMetrics {
    fn default() -> Self {
        Self::new(CellSeries::default())
    }
}

impl ExporterMetrics {
    pub fn new(cell_series: CellSeries) -> Self {
        Self {
            cell_series,

            url_status: GaugeVec::new("url_status", "Status of the URL as a integer value", URL_LABELS),
            url_response_ms: GaugeVec::new(
                "url_response_ms",
                "Response time in milliseconds it took for the URL to respond.",
                URL_LABELS,
            ),
            url_dns_ms: GaugeVec::new(
                "url_dns_ms",
                "Response time in milliseconds it took for the DNS request to take place.",
                URL_LABELS,
            ),
            url_first_byte_ms: GaugeVec::new(
                "url_first_byte_ms",
                "Response time in milliseconds it took to retrieve the first byte.",
                URL_LABELS,
            ),
            url_connect_time_ms: GaugeVec::new(
                "url_connect_time_ms",
                "Response time in milliseconds it took to establish the initial connection.",
                URL_LABELS,
            ),

            mcc: GaugeVec::new("mcc", "Mobile country code", CELL_LABELS),
            mnc: GaugeVec::new("mnc", "Mobile network code", CELL_LABELS),
            pcid: GaugeVec::new("pcid", "Physical cell identifier", CELL_LABELS),
            tac: GaugeVec::new("tac", "Tracking area code", CELL_LABELS),
            arfcn: GaugeVec::new("arfcn", "Absolute radio-frequency channel number", CELL_LABELS),
            band: GaugeVec::new("band", "Frequency band", CELL_LABELS),
            nrdlbw: GaugeVec::new("nrdlbw", "NR DL bandwidth", CELL_LABELS),
            rsrp: GaugeVec::new("rsrp", "Reference signal received power", CELL_LABELS),
            rsrq: GaugeVec::new("rsrq", "Reference signal received quality", CELL_LABELS),
            sinr: GaugeVec::new("sinr", "Signal-to-interference-plus-noise ratio", CELL_LABELS),
            txpower: GaugeVec::new("txpower", "Transmit power", CELL_LABELS),

            polls: CounterVec::new(
                "cellprobe_polls_total",
                "Poll attempts per target by outcome.",
                ["url", "outcome"],
            ),
            last_success: GaugeVec::new(
                "cellprobe_last_success_timestamp_seconds",
                "Unix time of the last reading published for the target.",
                URL_LABELS,
            ),
            ready: AtomicBool::new(false),
        }
    }

    pub fn cell_series(&self) -> CellSeries {
        self.cell_series
    }

    fn cell_gauges(&self) -> [&GaugeVec<5>; 11] {
        [
            &self.mcc,
            &self.mnc,
            &self.pcid,
            &self.tac,
            &self.arfcn,
            &self.band,
            &self.nrdlbw,
            &self.rsrp,
            &self.rsrq,
            &self.sinr,
            &self.txpower,
        ]
    }

    /// Publish every series derived from `r`.
    ///
    /// Per-cell series are keyed by url, state, mode, duplex mode and cell id.
    /// With `CellSeries::Retain` a change in any of them opens a new series
    /// and the old one keeps its last value. With `CellSeries::Replace` the
    /// target's other per-cell tuples are dropped after the new values land.
    pub fn update(&self, r: &Reading) {
        let url = r.target_url.as_str();

        self.url_dns_ms.set([url], r.dns_ms);
        self.url_connect_time_ms.set([url], r.connect_ms);
        self.url_response_ms.set([url], r.total_ms);
        self.url_first_byte_ms.set([url], r.first_byte_ms);
        self.url_status.set([url], f64::from(r.http_status));

        let cell = [
            url,
            r.state.as_str(),
            r.mode.as_str(),
            r.duplex_mode.as_str(),
            r.cell_id.as_str(),
        ];
        let values = [
            (&self.mcc, r.mcc),
            (&self.mnc, r.mnc),
            (&self.pcid, r.pcid),
            (&self.arfcn, r.arfcn),
            (&self.band, r.band),
            (&self.nrdlbw, r.dl_bandwidth),
            (&self.rsrp, r.rsrp),
            (&self.rsrq, r.rsrq),
            (&self.sinr, r.sinr),
            (&self.txpower, r.tx_power),
        ];
        for (gauge, v) in values {
            gauge.set(cell, v);
        }

        if self.cell_series == CellSeries::Replace {
            let current = cell.map(str::to_owned);
            for gauge in self.cell_gauges() {
                let before = gauge.len();
                gauge.retain(|k| k[0] != url || *k == current);
                let dropped = before.saturating_sub(gauge.len());
                if dropped > 0 {
                    tracing::debug!(url = %url, metric = gauge.name(), dropped, "replaced stale cell series");
                }
            }
        }

        self.ready.store(true, Ordering::Relaxed);
    }

    /// Count one poll attempt for `url`.
    pub fn record_outcome(&self, url: &str, outcome: &str) {
        self.polls.inc([url, outcome]);
    }

    pub fn mark_success(&self, url: &str, unix_secs: f64) {
        self.last_success.set([url], unix_secs);
    }

    /// True once any reading has been published.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }

    /// Render all registered metrics.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.url_status.render(&mut out);
        self.url_response_ms.render(&mut out);
        self.url_dns_ms.render(&mut out);
        self.url_first_byte_ms.render(&mut out);
        self.url_connect_time_ms.render(&mut out);
        for gauge in self.cell_gauges() {
            gauge.render(&mut out);
        }
        self.polls.render(&mut out);
        self.last_success.render(&mut out);
        out
    }
}
