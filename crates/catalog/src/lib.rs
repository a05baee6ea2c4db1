//! Punch geometry, hit codes and manufacturing constants.
//!
//! Read-only reference data for the rest of the workspace: the per-station
//! tool geometry, the press hit codes, the clearance rules the generators and
//! the clash detector share, and the span-table rows. These values have
//! direct manufacturing consequences and must not drift.

use types::{KpaRating, ProfileVariant, PunchKind};

/// Tool footprint shape at a punch station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Square,
    Round,
    Rectangular,
    Oval,
}

/// Static geometry for one punch station.
#[derive(Debug, Clone, Copy)]
pub struct PunchSpec {
    /// Single-digit press hit code
    pub hit_code: &'static str,
    /// Station name as emitted on the wire
    pub station: &'static str,
    pub shape: Shape,
    /// Footprint width in mm (rectangular/oval/square)
    pub width_mm: f64,
    /// Footprint height in mm (rectangular/oval/square)
    pub height_mm: f64,
    /// Nominal diameter in mm (round)
    pub diameter_mm: f64,
}

const BOLT_HOLE: PunchSpec = PunchSpec {
    hit_code: ".1",
    station: "BOLT HOLE",
    shape: Shape::Square,
    width_mm: 11.0,
    height_mm: 11.0,
    diameter_mm: 0.0,
};

const DIMPLE: PunchSpec = PunchSpec {
    hit_code: ".2",
    station: "DIMPLE",
    shape: Shape::Round,
    width_mm: 0.0,
    height_mm: 0.0,
    diameter_mm: 5.0,
};

const WEB_TAB: PunchSpec = PunchSpec {
    hit_code: ".3",
    station: "WEB TAB",
    shape: Shape::Rectangular,
    width_mm: 45.0,
    height_mm: 70.0,
    diameter_mm: 0.0,
};

const SERVICE: PunchSpec = PunchSpec {
    hit_code: ".4",
    station: "SERVICE",
    shape: Shape::Rectangular,
    width_mm: 115.0,
    height_mm: 300.0,
    diameter_mm: 0.0,
};

const SMALL_SERVICE_HOLE: PunchSpec = PunchSpec {
    hit_code: ".5",
    station: "SMALL SERVICE HOLE",
    shape: Shape::Round,
    width_mm: 0.0,
    height_mm: 0.0,
    diameter_mm: 115.0,
};

const M_SERVICE_HOLE: PunchSpec = PunchSpec {
    hit_code: ".6",
    station: "M SERVICE HOLE",
    shape: Shape::Round,
    width_mm: 0.0,
    height_mm: 0.0,
    diameter_mm: 200.0,
};

const LARGE_SERVICE_HOLE: PunchSpec = PunchSpec {
    hit_code: ".7",
    station: "LARGE SERVICE HOLE",
    shape: Shape::Oval,
    width_mm: 400.0,
    height_mm: 200.0,
    diameter_mm: 0.0,
};

const CORNER_BRACKETS: PunchSpec = PunchSpec {
    hit_code: ".4",
    station: "CORNER BRACKETS",
    shape: Shape::Rectangular,
    width_mm: 115.0,
    height_mm: 300.0,
    diameter_mm: 0.0,
};

/// Geometry for a punch station. Total over [`PunchKind`].
pub fn punch_spec(kind: PunchKind) -> &'static PunchSpec {
    match kind {
        PunchKind::BoltHole => &BOLT_HOLE,
        PunchKind::Dimple => &DIMPLE,
        PunchKind::WebTab => &WEB_TAB,
        PunchKind::Service => &SERVICE,
        PunchKind::SmallServiceHole => &SMALL_SERVICE_HOLE,
        PunchKind::MServiceHole => &M_SERVICE_HOLE,
        PunchKind::LargeServiceHole => &LARGE_SERVICE_HOLE,
        PunchKind::CornerBrackets => &CORNER_BRACKETS,
    }
}

/// Station name as emitted on the wire.
///
/// Corner brackets hit the service station and emit under its name.
pub fn emit_station(kind: PunchKind) -> &'static str {
    match kind {
        PunchKind::CornerBrackets => SERVICE.station,
        other => punch_spec(other).station,
    }
}

/// Press hit code for a punch station; corner brackets alias to service.
pub fn hit_code(kind: PunchKind) -> &'static str {
    match kind {
        PunchKind::CornerBrackets => SERVICE.hit_code,
        other => punch_spec(other).hit_code,
    }
}

/// Half-footprint of a punch along the member axis, in mm.
///
/// Rectangular, square and oval tools use half their width; round tools use
/// their radius.
pub fn clearance_radius(kind: PunchKind) -> f64 {
    let spec = punch_spec(kind);
    match spec.shape {
        Shape::Round => spec.diameter_mm / 2.0,
        _ => spec.width_mm / 2.0,
    }
}

/// Base end-exclusion distance either side of a service aperture, in mm.
pub const END_EXCLUSION_BASE: f64 = 300.0;
/// Hole diameter assumed when the profile carries no service holes, in mm.
pub const DEFAULT_HOLE_DIAMETER: f64 = 200.0;
/// Minimum distance of interior bolt holes from either member end, in mm.
pub const MIN_CLEARANCE: f64 = 50.0;
/// Half-width of a web tab, in mm.
pub const WEB_TAB_CLEARANCE: f64 = 22.5;
/// Minimum stub to service-hole centre distance, in mm.
pub const SERVICE_CLEARANCE: f64 = 250.0;
/// Alternating bolt offsets around bearer web tabs, in mm.
pub const BOLT_OFFSET_PATTERN: [f64; 2] = [-29.5, 29.5];
/// Bearer dimple pitch, in mm.
pub const DIMPLE_SPACING_BEARER: f64 = 450.0;
/// First bearer dimple position, in mm.
pub const DIMPLE_START_BEARER: f64 = 479.5;
/// Joist dimple base interval, in mm.
pub const DIMPLE_BASE_INTERVAL_JOIST: f64 = 600.0;
/// Joist dimple offset either side of each base point, in mm.
pub const DIMPLE_OFFSET_JOIST: f64 = 75.0;
/// Legacy joist dimple pitch still used by the grid check, in mm.
pub const DIMPLE_SPACING_JOIST: f64 = 409.5;
/// Legacy first joist dimple position still used by the grid check, in mm.
pub const DIMPLE_START_JOIST: f64 = 509.5;
/// Nominal service-hole pitch, in mm.
pub const SERVICE_HOLE_SPACING: f64 = 650.0;
/// Position match tolerance, in mm.
pub const POSITION_TOLERANCE: f64 = 10.0;
/// Relative web-tab spacing tolerance.
pub const SPACING_TOLERANCE_PERCENT: f64 = 0.15;
/// Absolute floor of the web-tab spacing tolerance, in mm.
pub const MIN_SPACING_TOLERANCE: f64 = 100.0;
/// Canonical end-bolt inset, in mm.
pub const END_BOLT_POSITION: f64 = 30.0;
/// Corner bracket inset from either member end, in mm.
pub const CORNER_BRACKET_POSITION: f64 = 131.0;
/// Default first stub position offered to operators, in mm.
pub const FIRST_STUB_POSITION: f64 = 331.0;
/// First web-tab inset on screens bearers, in mm.
pub const SCREENS_BEARER_FIRST_WEB_TAB: f64 = 475.0;
/// First web-tab inset on screens joists, in mm.
pub const SCREENS_JOIST_FIRST_WEB_TAB: f64 = 425.0;
/// Cap on intermediate web-tab spacing in screens mode, in mm.
pub const SCREENS_MAX_WEB_TAB_SPACING: f64 = 1200.0;

/// Maximum joist span per load rating, in mm.
pub fn span_limit(kpa: KpaRating) -> f64 {
    match kpa {
        KpaRating::Kpa2_5 => 11750.0,
        KpaRating::Kpa5_0 => 9300.0,
    }
}

/// One row of the span table: first row whose limit covers the span wins.
#[derive(Debug, Clone, Copy)]
pub struct SpanRow {
    pub max_length_mm: u32,
    pub variant: ProfileVariant,
    pub joist_spacing_mm: u32,
}

const fn row(max_length_mm: u32, variant: ProfileVariant, joist_spacing_mm: u32) -> SpanRow {
    SpanRow {
        max_length_mm,
        variant,
        joist_spacing_mm,
    }
}

/// 2.5 kPa span rows, in contract order.
///
/// The single rows are exhausted before any box row is consulted, so spans in
/// (9100, 9550] resolve to a single joist even though the first box row's
/// limit is lower. Keep the ordering.
pub static SPAN_ROWS_2_5: [SpanRow; 8] = [
    row(6800, ProfileVariant::JoistSingle, 600),
    row(7600, ProfileVariant::JoistSingle, 500),
    row(8600, ProfileVariant::JoistSingle, 400),
    row(9550, ProfileVariant::JoistSingle, 300),
    row(9100, ProfileVariant::JoistBox, 600),
    row(9750, ProfileVariant::JoistBox, 500),
    row(10600, ProfileVariant::JoistBox, 400),
    row(11750, ProfileVariant::JoistBox, 300),
];

/// 5.0 kPa span rows, in contract order.
pub static SPAN_ROWS_5_0: [SpanRow; 7] = [
    row(4500, ProfileVariant::JoistSingle, 600),
    row(5100, ProfileVariant::JoistSingle, 500),
    row(5850, ProfileVariant::JoistSingle, 400),
    row(7000, ProfileVariant::JoistSingle, 300),
    row(7700, ProfileVariant::JoistBox, 500),
    row(8350, ProfileVariant::JoistBox, 400),
    row(9300, ProfileVariant::JoistBox, 300),
];

/// Span rows for a load rating, in evaluation order.
pub fn span_rows(kpa: KpaRating) -> &'static [SpanRow] {
    match kpa {
        KpaRating::Kpa2_5 => &SPAN_ROWS_2_5,
        KpaRating::Kpa5_0 => &SPAN_ROWS_5_0,
    }
}
