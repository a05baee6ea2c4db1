//! Bearer generator branches.
//!
//! Bearers carry joists on web tabs (or, in box mode, on paired service cuts
//! that seat a box joist) and take stub columns and corner brackets on the
//! web face. Bolt holes on the flange pair up with web tabs using the
//! alternating offset pattern.

use catalog::{
    BOLT_OFFSET_PATTERN, CORNER_BRACKET_POSITION, DIMPLE_SPACING_BEARER, DIMPLE_START_BEARER,
    END_BOLT_POSITION, MIN_CLEARANCE, POSITION_TOLERANCE, SCREENS_BEARER_FIRST_WEB_TAB,
};
use types::{Dimensions, ProfileSpec, Punch, PunchKind};

use crate::grid;

/// Service hits land this far either side of a box joist seat.
const BOX_SEAT_OFFSET: f64 = 12.0;

pub(crate) fn normal(spec: &ProfileSpec, dims: &Dimensions) -> Vec<Punch> {
    let length = spec.length_mm as f64;
    let mut punches = Vec::new();
    let mut bolts = Vec::new();

    if spec.station_enabled(PunchKind::BoltHole) {
        end_bolts(length, &mut punches, &mut bolts);
    }
    if spec.station_enabled(PunchKind::Dimple) {
        dimple_run(length, &mut punches);
    }
    service_holes(spec, dims, length, &mut punches);

    if spec.station_enabled(PunchKind::WebTab) {
        let tabs = joist_grid(spec, length);
        for &tab in &tabs {
            punches.push(Punch::new(PunchKind::WebTab, tab));
        }
        if spec.station_enabled(PunchKind::BoltHole) {
            paired_bolts(&tabs, length, &mut punches, &mut bolts);
        }
    }

    stubs(spec, length, &mut punches);
    punches
}

pub(crate) fn normal_boxmode(spec: &ProfileSpec, dims: &Dimensions) -> Vec<Punch> {
    let length = spec.length_mm as f64;
    let mut punches = Vec::new();

    // Box joists seat on paired service cuts; bolts give way to dimples.
    if spec.station_enabled(PunchKind::Dimple) {
        punches.push(Punch::new(PunchKind::Dimple, END_BOLT_POSITION));
        punches.push(Punch::new(PunchKind::Dimple, length - END_BOLT_POSITION));
        dimple_run(length, &mut punches);
    }
    service_holes(spec, dims, length, &mut punches);

    for &seat in &joist_grid(spec, length) {
        if spec.station_enabled(PunchKind::Service) {
            punches.push(Punch::new(PunchKind::Service, seat - BOX_SEAT_OFFSET));
            punches.push(Punch::new(PunchKind::Service, seat + BOX_SEAT_OFFSET));
        }
        if spec.station_enabled(PunchKind::Dimple)
            && seat > MIN_CLEARANCE
            && seat < length - MIN_CLEARANCE
        {
            punches.push(Punch::new(PunchKind::Dimple, seat));
        }
    }

    stubs(spec, length, &mut punches);
    punches
}

pub(crate) fn screens(spec: &ProfileSpec, dims: &Dimensions) -> Vec<Punch> {
    let length = spec.length_mm as f64;
    let mut punches = Vec::new();
    let mut bolts = Vec::new();

    if spec.station_enabled(PunchKind::BoltHole) {
        end_bolts(length, &mut punches, &mut bolts);
    }
    if spec.station_enabled(PunchKind::Dimple) {
        dimple_run(length, &mut punches);
    }
    service_holes(spec, dims, length, &mut punches);

    if spec.station_enabled(PunchKind::WebTab) {
        let tabs = screens_tabs(length, spec.joist_spacing_mm as f64);
        for &tab in &tabs {
            punches.push(Punch::new(PunchKind::WebTab, tab));
        }
        if spec.station_enabled(PunchKind::BoltHole) {
            paired_bolts(&tabs, length, &mut punches, &mut bolts);
        }
    }

    stubs(spec, length, &mut punches);
    punches
}

pub(crate) fn screens_boxmode(spec: &ProfileSpec, dims: &Dimensions) -> Vec<Punch> {
    let length = spec.length_mm as f64;
    let mut punches = Vec::new();
    let mut bolts = Vec::new();

    if spec.station_enabled(PunchKind::BoltHole) {
        end_bolts(length, &mut punches, &mut bolts);
    }
    if spec.station_enabled(PunchKind::Dimple) {
        dimple_run(length, &mut punches);
    }
    service_holes(spec, dims, length, &mut punches);

    // Screens seats take a triple service hit and a centred bolt.
    for &seat in &screens_tabs(length, spec.joist_spacing_mm as f64) {
        if spec.station_enabled(PunchKind::Service) {
            punches.push(Punch::new(PunchKind::Service, seat - BOX_SEAT_OFFSET));
            punches.push(Punch::new(PunchKind::Service, seat));
            punches.push(Punch::new(PunchKind::Service, seat + BOX_SEAT_OFFSET));
        }
        if spec.station_enabled(PunchKind::BoltHole) {
            push_bolt(seat, length, &mut punches, &mut bolts);
        }
    }

    stubs(spec, length, &mut punches);
    punches
}

/// Web-tab grid for screens bearers: fixed 475 insets at both ends,
/// joist-spaced intermediates strictly inside them.
fn screens_tabs(length: f64, joist_spacing: f64) -> Vec<f64> {
    let first = SCREENS_BEARER_FIRST_WEB_TAB;
    let last = length - first;
    let mut tabs = vec![first];
    let mut pos = first + joist_spacing;
    while pos < last {
        tabs.push(pos);
        pos += joist_spacing;
    }
    tabs.push(last);
    tabs
}

fn end_bolts(length: f64, punches: &mut Vec<Punch>, bolts: &mut Vec<f64>) {
    for pos in [END_BOLT_POSITION, length - END_BOLT_POSITION] {
        punches.push(Punch::new(PunchKind::BoltHole, pos));
        bolts.push(pos);
    }
}

/// Joist seat positions: every joist-spacing multiple inside the member.
fn joist_grid(spec: &ProfileSpec, length: f64) -> Vec<f64> {
    let spacing = spec.joist_spacing_mm as f64;
    grid(spacing, spacing, length)
}

fn dimple_run(length: f64, punches: &mut Vec<Punch>) {
    for pos in grid(DIMPLE_START_BEARER, DIMPLE_SPACING_BEARER, length) {
        punches.push(Punch::new(PunchKind::Dimple, pos));
    }
}

/// One bolt per web tab, alternating the ±29.5 offset with the tab index.
fn paired_bolts(tabs: &[f64], length: f64, punches: &mut Vec<Punch>, bolts: &mut Vec<f64>) {
    for (i, &tab) in tabs.iter().enumerate() {
        push_bolt(tab + BOLT_OFFSET_PATTERN[i % 2], length, punches, bolts);
    }
}

fn push_bolt(pos: f64, length: f64, punches: &mut Vec<Punch>, bolts: &mut Vec<f64>) {
    if pos <= MIN_CLEARANCE || pos >= length - MIN_CLEARANCE {
        return;
    }
    if bolts.iter().any(|b| (b - pos).abs() <= POSITION_TOLERANCE) {
        return;
    }
    punches.push(Punch::new(PunchKind::BoltHole, pos));
    bolts.push(pos);
}

/// Service apertures centred symmetrically about the member midpoint.
fn service_holes(spec: &ProfileSpec, dims: &Dimensions, length: f64, punches: &mut Vec<Punch>) {
    let Some(kind) = spec.hole_type.punch_kind() else {
        return;
    };
    if !spec.station_enabled(kind) {
        return;
    }
    let centres = dims.opening_centres_mm;
    let count = ((length - 2.0 * centres) / centres).floor();
    if count < 1.0 {
        return;
    }
    let count = count as usize;
    let first = length / 2.0 - (count as f64 - 1.0) * centres / 2.0;
    for i in 0..count {
        punches.push(Punch::new(kind, first + i as f64 * centres));
    }
}

fn stubs(spec: &ProfileSpec, length: f64, punches: &mut Vec<Punch>) {
    if !spec.stubs_enabled || !spec.station_enabled(PunchKind::Service) {
        return;
    }
    punches.push(Punch::new(PunchKind::CornerBrackets, CORNER_BRACKET_POSITION));
    punches.push(Punch::new(
        PunchKind::CornerBrackets,
        length - CORNER_BRACKET_POSITION,
    ));
    for &pos in &spec.stub_positions {
        let pos = pos as f64;
        if pos > 0.0 && pos < length {
            punches.push(Punch::new(PunchKind::Service, pos));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::plan;
    use types::{HoleType, ProfileSpec, ProfileVariant, PunchKind, StationSet};

    fn bearer_5200() -> ProfileSpec {
        ProfileSpec {
            variant: ProfileVariant::BearerSingle,
            length_mm: 5200,
            joist_spacing_mm: 600,
            stub_spacing_mm: 1200,
            stub_positions: vec![331, 1531, 2731, 3931, 4869],
            stubs_enabled: true,
            hole_type: HoleType::None,
            kpa_rating: Some(types::KpaRating::Kpa2_5),
            ..Default::default()
        }
    }

    fn positions(punches: &[types::Punch]) -> Vec<f64> {
        punches.iter().map(|p| p.position_mm).collect()
    }

    #[test]
    fn test_bearer_normal_bolts_alternate_around_tabs() {
        let layout = plan(&bearer_5200());
        assert_eq!(
            positions(&layout.bolt_holes),
            vec![30.0, 570.5, 1229.5, 1770.5, 2429.5, 2970.5, 3629.5, 4170.5, 4829.5, 5170.0]
        );
    }

    #[test]
    fn test_bearer_normal_dimple_run() {
        let layout = plan(&bearer_5200());
        let dimples = positions(&layout.dimples);
        assert_eq!(dimples.len(), 11);
        assert_eq!(dimples[0], 479.5);
        assert_eq!(dimples[1], 929.5);
        assert_eq!(*dimples.last().unwrap(), 4979.5);
    }

    #[test]
    fn test_bearer_normal_web_tabs() {
        let layout = plan(&bearer_5200());
        assert_eq!(
            positions(&layout.web_tabs),
            vec![600.0, 1200.0, 1800.0, 2400.0, 3000.0, 3600.0, 4200.0, 4800.0]
        );
    }

    #[test]
    fn test_bearer_normal_stubs_and_corners() {
        let layout = plan(&bearer_5200());
        assert_eq!(
            positions(&layout.stubs),
            vec![131.0, 331.0, 1531.0, 2731.0, 3931.0, 4869.0, 5069.0]
        );
        assert_eq!(layout.stubs[0].kind, PunchKind::CornerBrackets);
        assert_eq!(layout.stubs.last().unwrap().kind, PunchKind::CornerBrackets);
        assert_eq!(layout.stubs[1].kind, PunchKind::Service);
        assert!(layout.service_holes.is_empty());
    }

    #[test]
    fn test_bearer_normal_out_of_range_stub_positions_dropped() {
        let mut spec = bearer_5200();
        spec.stub_positions = vec![0, 331, 5200, 6000];
        let layout = plan(&spec);
        let user_stubs: Vec<f64> = layout
            .stubs
            .iter()
            .filter(|p| p.kind == PunchKind::Service)
            .map(|p| p.position_mm)
            .collect();
        assert_eq!(user_stubs, vec![331.0]);
    }

    #[test]
    fn test_bearer_boxmode_replaces_tabs_and_bolts() {
        let mut spec = bearer_5200();
        spec.joist_box = true;
        let layout = plan(&spec);

        assert!(layout.web_tabs.is_empty());
        assert!(layout.bolt_holes.is_empty());

        let dimples = positions(&layout.dimples);
        assert!(dimples.contains(&30.0));
        assert!(dimples.contains(&5170.0));
        for seat in [600.0, 1200.0, 1800.0, 2400.0, 3000.0, 3600.0, 4200.0, 4800.0] {
            assert!(dimples.contains(&seat), "missing seat dimple at {seat}");
            let stubs = positions(&layout.stubs);
            assert!(stubs.contains(&(seat - 12.0)), "missing seat cut at {}", seat - 12.0);
            assert!(stubs.contains(&(seat + 12.0)), "missing seat cut at {}", seat + 12.0);
        }
        // Corner brackets survive box mode.
        let stubs = positions(&layout.stubs);
        assert!(stubs.contains(&131.0));
        assert!(stubs.contains(&5069.0));
    }

    #[test]
    fn test_bearer_screens_tab_grid() {
        let mut spec = bearer_5200();
        spec.screens_enabled = true;
        spec.stubs_enabled = false;
        let layout = plan(&spec);

        let tabs = positions(&layout.web_tabs);
        assert_eq!(tabs.first(), Some(&475.0));
        assert_eq!(tabs.last(), Some(&4725.0));
        for pair in tabs.windows(2) {
            assert!(pair[1] > pair[0]);
        }
        // Intermediates stay strictly inside the 475 insets.
        for &tab in &tabs[1..tabs.len() - 1] {
            assert!(tab > 475.0 && tab < 4725.0);
        }
        // Paired bolts still alternate: first tab is even-indexed.
        let bolts = positions(&layout.bolt_holes);
        assert!(bolts.contains(&445.5));
        assert!(bolts.contains(&1104.5));
    }

    #[test]
    fn test_bearer_screens_boxmode_triple_hits_and_centred_bolts() {
        let mut spec = bearer_5200();
        spec.screens_enabled = true;
        spec.joist_box = true;
        spec.stubs_enabled = false;
        let layout = plan(&spec);

        assert!(layout.web_tabs.is_empty());
        let stubs = positions(&layout.stubs);
        for seat in [475.0, 1075.0, 4725.0] {
            assert!(stubs.contains(&(seat - 12.0)));
            assert!(stubs.contains(&seat));
            assert!(stubs.contains(&(seat + 12.0)));
        }
        let bolts = positions(&layout.bolt_holes);
        assert!(bolts.contains(&475.0));
        assert!(bolts.contains(&4725.0));
        assert!(bolts.contains(&30.0));
        assert!(bolts.contains(&5170.0));
    }

    #[test]
    fn test_bearer_station_flags_suppress_lists() {
        let mut spec = bearer_5200();
        spec.punch_stations = StationSet::none();
        let layout = plan(&spec);
        assert_eq!(layout.punch_count(), 0);

        let mut spec = bearer_5200();
        spec.punch_stations = StationSet::none().with(PunchKind::BoltHole, true);
        let layout = plan(&spec);
        assert_eq!(positions(&layout.bolt_holes), vec![30.0, 5170.0]);
        assert!(layout.web_tabs.is_empty());
        assert!(layout.dimples.is_empty());
    }

    #[test]
    fn test_bearer_service_holes_symmetric() {
        let mut spec = bearer_5200();
        spec.hole_type = HoleType::R115;
        spec.hole_spacing_mm = 650;
        let layout = plan(&spec);

        let holes = positions(&layout.service_holes);
        assert!(!holes.is_empty());
        assert_eq!(layout.dims.hole_qty as usize, holes.len());
        // Symmetric about the midpoint.
        let n = holes.len();
        for i in 0..n {
            let mirrored = 5200.0 - holes[n - 1 - i];
            assert!((holes[i] - mirrored).abs() < 1.0, "{holes:?}");
        }
        for pair in holes.windows(2) {
            assert!((pair[1] - pair[0] - layout.dims.opening_centres_mm).abs() < 1.0);
        }
        assert_eq!(layout.service_holes[0].kind, PunchKind::SmallServiceHole);
    }
}
