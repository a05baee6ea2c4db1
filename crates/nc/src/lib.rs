//! Press-brake CSV wire format.
//!
//! One member encodes to a single comma-separated line with no trailing
//! newline and no header row. The press consumes the record verbatim:
//!
//! ```text
//! csvCOMPONENT,<component>,<part>,<BEARER|JOIST>,NORMAL,<qty>,<len>,0,0,<len>,0,50[,<station>,<pos>]*
//! ```
//!
//! Punch hits are merged across all five lists, sorted by position, and named
//! by their station; corner brackets hit the service station and emit under
//! its name. [`parse_csv`] is the inverse used for verification; it is not a
//! general CSV reader.

use catalog::emit_station;
use thiserror::Error;
use types::{round_half, Layout, PunchKind, Role};

/// Mandatory first token of every record.
pub const LINE_PREFIX: &str = "csvCOMPONENT";
/// Member length written when a layout carries no derived scalars.
const FALLBACK_LENGTH: f64 = 5200.0;

#[derive(Debug, Error)]
pub enum NcError {
    #[error("record does not start with {LINE_PREFIX}")]
    MissingPrefix,

    #[error("record truncated: expected at least 12 header fields, got {0}")]
    Truncated(usize),

    #[error("punch fields are not station/position pairs")]
    UnpairedPunch,

    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("unknown member role: {0}")]
    UnknownRole(String),

    #[error("unknown station: {0}")]
    UnknownStation(String),
}

/// Export metadata supplied by the host.
#[derive(Debug, Clone)]
pub struct Meta {
    pub part_code: String,
    pub qty: u32,
}

/// A decoded record, used to verify encodes round-trip.
#[derive(Debug, Clone, PartialEq)]
pub struct NcRecord {
    pub component_code: String,
    pub part_code: String,
    pub role: Role,
    pub qty: u32,
    pub length_mm: f64,
    /// (station kind, position) pairs in wire order
    pub punches: Vec<(PunchKind, f64)>,
}

/// Encode a layout as one press record.
pub fn encode_csv(layout: &Layout, meta: &Meta) -> String {
    let component_code = if meta.part_code.starts_with('B') {
        "B1-1"
    } else {
        "J1-1"
    };
    let role = match layout.variant.role() {
        Role::Bearer => "BEARER",
        Role::Joist => "JOIST",
    };
    let mut length = layout.dims.length_mod_mm + layout.dims.end_exclusion_mm;
    if length <= 0.0 {
        length = FALLBACK_LENGTH;
    }

    let mut line = format!(
        "{LINE_PREFIX},{component_code},{},{role},NORMAL,{},{len},0,0,{len},0,50",
        meta.part_code,
        meta.qty,
        len = fmt(length),
    );
    for punch in layout.merged() {
        if !punch.active {
            continue;
        }
        line.push(',');
        line.push_str(emit_station(punch.kind));
        line.push(',');
        line.push_str(&fmt(round_half(punch.position_mm)));
    }
    line
}

/// Decode a press record back into its header and punch pairs.
pub fn parse_csv(line: &str) -> Result<NcRecord, NcError> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields[0] != LINE_PREFIX {
        return Err(NcError::MissingPrefix);
    }
    if fields.len() < 12 {
        return Err(NcError::Truncated(fields.len()));
    }

    let role = match fields[3] {
        "BEARER" => Role::Bearer,
        "JOIST" => Role::Joist,
        other => return Err(NcError::UnknownRole(other.to_string())),
    };
    let qty = fields[5]
        .parse::<u32>()
        .map_err(|_| NcError::InvalidNumber(fields[5].to_string()))?;
    let length_mm = number(fields[6])?;

    let rest = &fields[12..];
    if rest.len() % 2 != 0 {
        return Err(NcError::UnpairedPunch);
    }
    let mut punches = Vec::with_capacity(rest.len() / 2);
    for pair in rest.chunks_exact(2) {
        punches.push((station_kind(pair[0])?, number(pair[1])?));
    }

    Ok(NcRecord {
        component_code: fields[1].to_string(),
        part_code: fields[2].to_string(),
        role,
        qty,
        length_mm,
        punches,
    })
}

fn number(field: &str) -> Result<f64, NcError> {
    field
        .parse::<f64>()
        .map_err(|_| NcError::InvalidNumber(field.to_string()))
}

fn station_kind(station: &str) -> Result<PunchKind, NcError> {
    match station {
        "BOLT HOLE" => Ok(PunchKind::BoltHole),
        "DIMPLE" => Ok(PunchKind::Dimple),
        "WEB TAB" => Ok(PunchKind::WebTab),
        "SERVICE" => Ok(PunchKind::Service),
        "SMALL SERVICE HOLE" => Ok(PunchKind::SmallServiceHole),
        "M SERVICE HOLE" => Ok(PunchKind::MServiceHole),
        "LARGE SERVICE HOLE" => Ok(PunchKind::LargeServiceHole),
        other => Err(NcError::UnknownStation(other.to_string())),
    }
}

/// Positions print as integers where whole, else with one decimal.
fn fmt(x: f64) -> String {
    if x.fract() == 0.0 {
        format!("{}", x as i64)
    } else {
        format!("{x:.1}")
    }
}
