//! Registry labeling and lifecycle.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use cellprobe_core::protocol::servingcell::parse;
use cellprobe_core::{HttpProbe, Reading};
use cellprobe_exporter::config::CellSeries;
use cellprobe_exporter::obs::metrics::ExporterMetrics;

const LTE: &str = "+QENG: \"servingcell\",\"CONNECT\",\"LTE\",\"FDD\",310,410,\"1A2B3C\",55,0,1300,7,15,30,-95.5,-10.2,12.3,18.0";
const LTE_HANDOVER: &str = "+QENG: \"servingcell\",\"CONNECT\",\"LTE\",\"FDD\",310,410,\"4D5E6F\",101,0,1300,7,15,-88,-9,14,10,18.0";

fn reading(raw: &str, url: &str) -> Reading {
    parse(raw, url).unwrap()
}

fn cell<'a>(url: &'a str, cellid: &'a str) -> [&'a str; 5] {
    [url, "CONNECT", "LTE", "FDD", cellid]
}

#[test]
fn update_sets_every_series_for_the_reading() {
    let m = ExporterMetrics::default();
    m.update(&reading(LTE, "modem-a"));

    let key = cell("modem-a", "1A2B3C");
    assert_eq!(m.mcc.get(key), Some(310.0));
    assert_eq!(m.mnc.get(key), Some(410.0));
    assert_eq!(m.pcid.get(key), Some(55.0));
    assert_eq!(m.arfcn.get(key), Some(1300.0));
    assert_eq!(m.band.get(key), Some(7.0));
    assert_eq!(m.nrdlbw.get(key), Some(15.0));
    assert_eq!(m.rsrp.get(key), Some(30.0));
    assert_eq!(m.rsrq.get(key), Some(-95.5));
    assert_eq!(m.sinr.get(key), Some(-10.2));
    assert_eq!(m.txpower.get(key), Some(12.3));
    assert!(m.tac.is_empty());

    assert_eq!(m.url_status.get(["modem-a"]), Some(0.0));
    assert_eq!(m.url_response_ms.get(["modem-a"]), Some(0.0));
    assert_eq!(m.url_dns_ms.get(["modem-a"]), Some(0.0));
    assert_eq!(m.url_first_byte_ms.get(["modem-a"]), Some(0.0));
    assert_eq!(m.url_connect_time_ms.get(["modem-a"]), Some(0.0));
    assert!(m.is_ready());
}

#[test]
fn default_registry_retains_cell_series() {
    assert_eq!(ExporterMetrics::default().cell_series(), CellSeries::Retain);
}

#[test]
fn update_is_idempotent() {
    let m = ExporterMetrics::default();
    let r = reading(LTE, "modem-a");
    m.update(&r);
    let once = m.render();
    m.update(&r);
    assert_eq!(m.render(), once);
    assert_eq!(m.rsrp.len(), 1);
}

#[test]
fn changed_cell_adds_series_and_keeps_old_values_by_default() {
    let m = ExporterMetrics::new(CellSeries::Retain);
    assert_eq!(m.cell_series(), CellSeries::Retain);
    m.update(&reading(LTE, "modem-a"));
    m.update(&reading(LTE_HANDOVER, "modem-a"));

    assert_eq!(m.rsrp.len(), 2);
    assert_eq!(m.rsrp.get(cell("modem-a", "1A2B3C")), Some(30.0));
    assert_eq!(m.rsrp.get(cell("modem-a", "4D5E6F")), Some(-88.0));
    assert_eq!(m.pcid.get(cell("modem-a", "1A2B3C")), Some(55.0));
    // Per-URL series are overwritten, not duplicated.
    assert_eq!(m.url_status.len(), 1);
}

#[test]
fn replace_mode_drops_the_targets_previous_cell() {
    let m = ExporterMetrics::new(CellSeries::Replace);
    assert_eq!(m.cell_series(), CellSeries::Replace);
    m.update(&reading(LTE, "modem-a"));
    m.update(&reading(LTE, "modem-b"));
    m.update(&reading(LTE_HANDOVER, "modem-a"));

    assert_eq!(m.rsrp.get(cell("modem-a", "1A2B3C")), None);
    assert_eq!(m.rsrp.get(cell("modem-a", "4D5E6F")), Some(-88.0));
    // Other targets are untouched.
    assert_eq!(m.rsrp.get(cell("modem-b", "1A2B3C")), Some(30.0));
    assert_eq!(m.rsrp.len(), 2);
    assert_eq!(m.mcc.len(), 2);
}

#[test]
fn http_timing_lands_on_url_series() {
    let m = ExporterMetrics::default();
    let probe = HttpProbe {
        status: 200,
        total_ms: 42.0,
        dns_ms: 1.5,
        first_byte_ms: 40.0,
        connect_ms: 2.5,
    };
    m.update(&reading(LTE, "modem-a").with_probe(probe));

    assert_eq!(m.url_status.get(["modem-a"]), Some(200.0));
    assert_eq!(m.url_response_ms.get(["modem-a"]), Some(42.0));
    assert_eq!(m.url_dns_ms.get(["modem-a"]), Some(1.5));
    assert_eq!(m.url_first_byte_ms.get(["modem-a"]), Some(40.0));
    assert_eq!(m.url_connect_time_ms.get(["modem-a"]), Some(2.5));
}

#[test]
fn render_uses_text_exposition_format() {
    let m = ExporterMetrics::default();
    m.update(&reading(LTE, "http://192.168.225.1:8080"));
    m.record_outcome("http://192.168.225.1:8080", "ok");
    let out = m.render();

    assert!(out.contains("# HELP rsrp Reference signal received power\n"));
    assert!(out.contains("# TYPE rsrp gauge\n"));
    assert!(out.contains(
        "rsrq{url=\"http://192.168.225.1:8080\",state=\"CONNECT\",mode=\"LTE\",duplexmode=\"FDD\",cellid=\"1A2B3C\"} -95.5\n"
    ));
    assert!(out.contains("url_status{url=\"http://192.168.225.1:8080\"} 0\n"));
    assert!(out.contains(
        "cellprobe_polls_total{url=\"http://192.168.225.1:8080\",outcome=\"ok\"} 1\n"
    ));
    assert!(out.contains("# TYPE cellprobe_polls_total counter\n"));

    // Registered but never set: header only.
    assert!(out.contains("# TYPE tac gauge\n"));
    assert!(!out.contains("tac{"));
}

#[test]
fn label_values_are_escaped() {
    let m = ExporterMetrics::default();
    m.mcc.set(["a\"b", "x\\y", "line\nbreak", "FDD", "1"], 1.0);
    let out = m.render();
    assert!(out.contains(
        "mcc{url=\"a\\\"b\",state=\"x\\\\y\",mode=\"line\\nbreak\",duplexmode=\"FDD\",cellid=\"1\"} 1\n"
    ));
}

#[test]
fn non_finite_values_render_as_prometheus_literals() {
    let m = ExporterMetrics::default();
    m.last_success.set(["nan"], f64::NAN);
    m.last_success.set(["pos"], f64::INFINITY);
    m.last_success.set(["neg"], f64::NEG_INFINITY);
    let out = m.render();
    assert!(out.contains("cellprobe_last_success_timestamp_seconds{url=\"nan\"} NaN\n"));
    assert!(out.contains("cellprobe_last_success_timestamp_seconds{url=\"pos\"} +Inf\n"));
    assert!(out.contains("cellprobe_last_success_timestamp_seconds{url=\"neg\"} -Inf\n"));
}

#[test]
fn concurrent_updates_and_renders_do_not_lose_series() {
    let m = Arc::new(ExporterMetrics::default());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let m = Arc::clone(&m);
            std::thread::spawn(move || {
                let url = format!("modem-{i}");
                let r = reading(LTE, &url);
                for _ in 0..200 {
                    m.update(&r);
                    let _ = m.render();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(m.rsrp.len(), 8);
    for i in 0..8 {
        let url = format!("modem-{i}");
        assert_eq!(m.rsrq.get(cell(&url, "1A2B3C")), Some(-95.5));
    }
}
