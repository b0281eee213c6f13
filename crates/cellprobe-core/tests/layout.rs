//! Layout table and reading model checks.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use cellprobe_core::protocol::servingcell::{layout_for, Field, MIN_FIELDS, SERVINGCELL_LAYOUT};
use cellprobe_core::{HttpProbe, Reading};

#[test]
fn layout_places_every_field_once() {
    for field in Field::ALL {
        let n = SERVINGCELL_LAYOUT.iter().filter(|(_, f)| *f == field).count();
        assert_eq!(n, 1, "field {field:?} placed {n} times");
    }
}

#[test]
fn layout_stays_inside_minimum_and_skips_echo_and_index_8() {
    for (index, _) in SERVINGCELL_LAYOUT {
        assert!(*index > 0 && *index < MIN_FIELDS, "index {index}");
        assert_ne!(*index, 8);
    }
}

#[test]
fn text_fields_sit_at_documented_positions() {
    let text: Vec<usize> = SERVINGCELL_LAYOUT
        .iter()
        .filter(|(_, f)| f.is_text())
        .map(|(i, _)| *i)
        .collect();
    assert_eq!(text, vec![1, 2, 3, 6]);
}

#[test]
fn every_mode_uses_the_servingcell_layout_today() {
    for mode in ["LTE", "NR5G-SA", "NR5G-NSA", "WCDMA", ""] {
        assert_eq!(layout_for(mode), SERVINGCELL_LAYOUT);
    }
}

#[test]
fn attaching_timing_returns_new_reading() {
    let raw = "+QENG: \"servingcell\",\"CONNECT\",\"LTE\",\"FDD\",310,410,\"1A2B3C\",55,0,1300,7,15,30,-95.5,-10.2,12.3,18.0";
    let base: Reading = cellprobe_core::protocol::servingcell::parse(raw, "modem").unwrap();
    let probe = HttpProbe {
        status: 200,
        total_ms: 41.5,
        dns_ms: 0.0,
        first_byte_ms: 40.0,
        connect_ms: 0.0,
    };

    let timed = base.clone().with_probe(probe);
    assert_eq!(timed.probe(), probe);
    assert_eq!(base.probe(), HttpProbe::default());
    assert_eq!(timed.rsrq, base.rsrq);
    assert_eq!(timed.cell_id, base.cell_id);
}
