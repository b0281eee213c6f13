//! `AT+QENG="servingcell"` report parsing (panic-free).
//!
//! The modem answers with one comma-separated line such as
//!
//! ```text
//! +QENG: "servingcell","NOCONN","LTE","FDD",310,410,"1A2B3C",55,0,1300,7,15,30,-95.5,-10.2,12.3,18.0
//! ```
//!
//! Meaning is purely positional. Positions are declared in a layout table so
//! a mode with a different shape only needs its own table in [`layout_for`].
//!
//! Parsing rules:
//! - Marker check first, then field count, then per-field conversion.
//! - Only the first marker line is read. Multi-line reports (NR5G-NSA puts
//!   each radio on its own `+QENG:` line) never merge into one field list.
//! - A reading is only built after every position converted cleanly.
//! - No I/O and no logging here; callers decide what to report.

use crate::error::ParseError;
use crate::reading::Reading;

/// Substring every serving-cell report carries.
pub const MARKER: &str = "+QENG:";

/// Minimum number of comma-separated fields (index 0 is the echo).
pub const MIN_FIELDS: usize = 17;

/// Position of the radio access technology, used to pick a layout.
const MODE_INDEX: usize = 2;

/// A value the parser extracts from one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    State,
    Mode,
    DuplexMode,
    Mcc,
    Mnc,
    CellId,
    Pcid,
    Arfcn,
    Band,
    DlBandwidth,
    Rsrp,
    Rsrq,
    Sinr,
    TxPower,
}

impl Field {
    /// Every field a layout must place.
    pub const ALL: [Field; 14] = [
        Field::State,
        Field::Mode,
        Field::DuplexMode,
        Field::Mcc,
        Field::Mnc,
        Field::CellId,
        Field::Pcid,
        Field::Arfcn,
        Field::Band,
        Field::DlBandwidth,
        Field::Rsrp,
        Field::Rsrq,
        Field::Sinr,
        Field::TxPower,
    ];

    /// Text fields keep their content verbatim; the rest must parse as `f64`.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            Field::State | Field::Mode | Field::DuplexMode | Field::CellId
        )
    }
}

/// Index-to-field table for one response shape.
pub type Layout = &'static [(usize, Field)];

/// Serving-cell layout. Index 8 is unused upstream and skipped.
pub const SERVINGCELL_LAYOUT: Layout = &[
    (1, Field::State),
    (2, Field::Mode),
    (3, Field::DuplexMode),
    (4, Field::Mcc),
    (5, Field::Mnc),
    (6, Field::CellId),
    (7, Field::Pcid),
    (9, Field::Arfcn),
    (10, Field::Band),
    (11, Field::DlBandwidth),
    (12, Field::Rsrp),
    (13, Field::Rsrq),
    (14, Field::Sinr),
    (15, Field::TxPower),
];

/// Pick the layout for a detected mode.
///
/// All modes share [`SERVINGCELL_LAYOUT`] for now.
pub fn layout_for(_mode: &str) -> Layout {
    SERVINGCELL_LAYOUT
}

/// Parse one raw response body into a reading labelled with `target_url`.
pub fn parse(raw: &str, target_url: &str) -> Result<Reading, ParseError> {
    let (_, payload) = raw
        .split_once(MARKER)
        .ok_or(ParseError::MalformedResponse)?;
    let payload = payload
        .split(['\r', '\n'])
        .next()
        .unwrap_or_default();

    let parts: Vec<&str> = payload.split(',').collect();
    if parts.len() < MIN_FIELDS {
        return Err(ParseError::TruncatedResponse {
            fields: parts.len(),
            required: MIN_FIELDS,
        });
    }

    let mode = parts.get(MODE_INDEX).map(|s| unquote(s)).unwrap_or_default();

    let mut draft = Draft::default();
    for &(index, field) in layout_for(mode) {
        let raw_value = parts
            .get(index)
            .copied()
            .ok_or(ParseError::TruncatedResponse {
                fields: parts.len(),
                required: index + 1,
            })?;
        draft.assign(field, index, raw_value)?;
    }

    Ok(draft.into_reading(target_url))
}

/// Trim whitespace and one pair of surrounding double quotes.
fn unquote(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(s)
}

fn number(index: usize, raw: &str) -> Result<f64, ParseError> {
    let s = raw.trim();
    s.parse::<f64>().map_err(|_| ParseError::FieldConversion {
        index,
        raw_value: s.to_owned(),
    })
}

/// Fields collected so far. Never leaves this module.
#[derive(Default)]
struct Draft {
    state: String,
    mode: String,
    duplex_mode: String,
    mcc: f64,
    mnc: f64,
    cell_id: String,
    pcid: f64,
    arfcn: f64,
    band: f64,
    dl_bandwidth: f64,
    rsrp: f64,
    rsrq: f64,
    sinr: f64,
    tx_power: f64,
}

impl Draft {
    fn assign(&mut self, field: Field, index: usize, raw: &str) -> Result<(), ParseError> {
        match field {
            Field::State => self.state = unquote(raw).to_owned(),
            Field::Mode => self.mode = unquote(raw).to_owned(),
            Field::DuplexMode => self.duplex_mode = unquote(raw).to_owned(),
            Field::CellId => self.cell_id = unquote(raw).to_owned(),
            Field::Mcc => self.mcc = number(index, raw)?,
            Field::Mnc => self.mnc = number(index, raw)?,
            Field::Pcid => self.pcid = number(index, raw)?,
            Field::Arfcn => self.arfcn = number(index, raw)?,
            Field::Band => self.band = number(index, raw)?,
            Field::DlBandwidth => self.dl_bandwidth = number(index, raw)?,
            Field::Rsrp => self.rsrp = number(index, raw)?,
            Field::Rsrq => self.rsrq = number(index, raw)?,
            Field::Sinr => self.sinr = number(index, raw)?,
            Field::TxPower => self.tx_power = number(index, raw)?,
        }
        Ok(())
    }

    fn into_reading(self, target_url: &str) -> Reading {
        Reading {
            target_url: target_url.to_owned(),
            http_status: 0,
            total_ms: 0.0,
            dns_ms: 0.0,
            first_byte_ms: 0.0,
            connect_ms: 0.0,
            state: self.state,
            mode: self.mode,
            duplex_mode: self.duplex_mode,
            mcc: self.mcc,
            mnc: self.mnc,
            cell_id: self.cell_id,
            pcid: self.pcid,
            tac: String::new(),
            arfcn: self.arfcn,
            band: self.band,
            dl_bandwidth: self.dl_bandwidth,
            rsrp: self.rsrp,
            rsrq: self.rsrq,
            sinr: self.sinr,
            tx_power: self.tx_power,
        }
    }
}
