//! Joist generator branches.
//!
//! Joists take service apertures through the web and web tabs coordinated
//! around them; flange bolts sit centred on each tab. Dimples follow the
//! paired-offset stitch pattern either side of each 600 mm base point.

use catalog::{
    CORNER_BRACKET_POSITION, DIMPLE_BASE_INTERVAL_JOIST, DIMPLE_OFFSET_JOIST, END_BOLT_POSITION,
    MIN_CLEARANCE, POSITION_TOLERANCE, SCREENS_JOIST_FIRST_WEB_TAB, SCREENS_MAX_WEB_TAB_SPACING,
    SERVICE_HOLE_SPACING,
};
use types::{Dimensions, ProfileSpec, Punch, PunchKind};

/// Required web-tab to service-hole centre distance during placement:
/// 100 hole radius + 20 half tab + 30 safety.
const WEB_TAB_SERVICE_MARGIN: f64 = 150.0;
/// Longest allowed gap between consecutive web-tab anchors.
const MAX_TAB_SPAN: f64 = 2400.0 + POSITION_TOLERANCE;
/// Shortest allowed gap between consecutive web-tab anchors.
const MIN_TAB_SPAN: f64 = 1200.0 - POSITION_TOLERANCE;

pub(crate) fn normal(spec: &ProfileSpec, dims: &Dimensions) -> Vec<Punch> {
    let length = spec.length_mm as f64;
    let mut punches = Vec::new();

    if spec.station_enabled(PunchKind::BoltHole) {
        punches.push(Punch::new(PunchKind::BoltHole, END_BOLT_POSITION));
        punches.push(Punch::new(PunchKind::BoltHole, length - END_BOLT_POSITION));
    }
    if spec.station_enabled(PunchKind::Dimple) {
        for pos in dimple_pattern(length) {
            punches.push(Punch::new(PunchKind::Dimple, pos));
        }
    }

    let mut holes = Vec::new();
    if let Some(kind) = spec.hole_type.punch_kind() {
        if spec.station_enabled(kind) {
            holes = service_positions(spec, dims, length);
            for &pos in &holes {
                punches.push(Punch::new(kind, pos));
            }
        }
    }

    if spec.station_enabled(PunchKind::WebTab) {
        let tabs = web_tabs(length, dims, &holes);
        for &tab in &tabs {
            punches.push(Punch::new(PunchKind::WebTab, tab));
        }
        if spec.station_enabled(PunchKind::BoltHole) {
            centred_bolts(&tabs, length, &mut punches);
        }
    }

    corner_brackets(spec, length, &mut punches);
    punches
}

pub(crate) fn screens(spec: &ProfileSpec, _dims: &Dimensions) -> Vec<Punch> {
    let length = spec.length_mm as f64;
    let mut punches = Vec::new();

    if spec.station_enabled(PunchKind::BoltHole) {
        punches.push(Punch::new(PunchKind::BoltHole, END_BOLT_POSITION));
        punches.push(Punch::new(PunchKind::BoltHole, length - END_BOLT_POSITION));
    }
    if spec.station_enabled(PunchKind::Dimple) {
        for pos in dimple_pattern(length) {
            punches.push(Punch::new(PunchKind::Dimple, pos));
        }
    }

    let tabs = screens_tabs(length);
    if spec.station_enabled(PunchKind::WebTab) {
        for &tab in &tabs {
            punches.push(Punch::new(PunchKind::WebTab, tab));
        }
        if spec.station_enabled(PunchKind::BoltHole) {
            centred_bolts(&tabs, length, &mut punches);
        }
    }

    // Service apertures fill each tab gap at the nominal pitch.
    if let Some(kind) = spec.hole_type.punch_kind() {
        if spec.station_enabled(kind) {
            for pair in tabs.windows(2) {
                let gap = pair[1] - pair[0];
                let count = (gap / SERVICE_HOLE_SPACING).floor() as usize;
                if count == 0 {
                    continue;
                }
                let step = gap / (count as f64 + 1.0);
                for j in 1..=count {
                    punches.push(Punch::new(kind, pair[0] + step * j as f64));
                }
            }
        }
    }

    corner_brackets(spec, length, &mut punches);
    punches
}

/// Paired-offset stitch pattern: 75, then a pair 75 mm either side of each
/// 600 mm base point, closing at length - 75.
fn dimple_pattern(length: f64) -> Vec<f64> {
    let last = length - DIMPLE_OFFSET_JOIST;
    let mut out = vec![DIMPLE_OFFSET_JOIST];
    let mut base = DIMPLE_BASE_INTERVAL_JOIST;
    while base < last {
        out.push(base - DIMPLE_OFFSET_JOIST);
        if base + DIMPLE_OFFSET_JOIST < last {
            out.push(base + DIMPLE_OFFSET_JOIST);
        }
        base += DIMPLE_BASE_INTERVAL_JOIST;
    }
    out.push(last);
    out
}

/// Service apertures spanning the working interval between the end
/// exclusions, inclusive of both interval ends.
fn service_positions(spec: &ProfileSpec, dims: &Dimensions, length: f64) -> Vec<f64> {
    let first = dims.end_exclusion_mm / 2.0;
    let openings = (dims.length_mod_mm / spec.hole_spacing_mm as f64).floor();
    if openings < 1.0 {
        // Too short for a full opening; a single hole sits on the midpoint.
        return vec![length / 2.0];
    }
    let count = openings as usize + 1;
    (0..count)
        .map(|i| first + i as f64 * dims.opening_centres_mm)
        .collect()
}

/// Place web tabs between the outermost anchors, dodging service apertures.
///
/// The ideal grid splits the anchor span into the fewest segments that keep
/// each gap under the cap. A candidate that lands too close to an aperture is
/// recentred between its neighbouring apertures when that stays near the
/// ideal, else stepped off the conflicting aperture, else skipped.
fn web_tabs(length: f64, dims: &Dimensions, holes: &[f64]) -> Vec<f64> {
    let (first, last) = if holes.len() >= 2 {
        (holes[0], holes[holes.len() - 1])
    } else {
        (dims.end_exclusion_mm / 2.0, length - dims.end_exclusion_mm / 2.0)
    };
    let span = last - first;
    if span <= 0.0 {
        return Vec::new();
    }

    let mut segments = (span / MAX_TAB_SPAN).ceil().max(1.0) as usize;
    while segments > 1 && span / (segments as f64) < MIN_TAB_SPAN {
        segments -= 1;
    }

    let mut tabs = Vec::new();
    for i in 1..segments {
        let ideal = first + span * i as f64 / segments as f64;
        if let Some(pos) = place_tab(ideal, holes, length) {
            tabs.push(pos);
        }
    }
    tabs
}

fn clear_of_holes(pos: f64, holes: &[f64]) -> bool {
    holes
        .iter()
        .all(|h| (h - pos).abs() >= WEB_TAB_SERVICE_MARGIN)
}

fn place_tab(ideal: f64, holes: &[f64], length: f64) -> Option<f64> {
    if clear_of_holes(ideal, holes) {
        return Some(ideal);
    }

    // Recentre between the apertures bracketing the ideal slot.
    let left = holes
        .iter()
        .copied()
        .filter(|h| *h <= ideal)
        .fold(f64::NEG_INFINITY, f64::max);
    let right = holes
        .iter()
        .copied()
        .filter(|h| *h >= ideal)
        .fold(f64::INFINITY, f64::min);
    if left.is_finite() && right.is_finite() {
        let mid = (left + right) / 2.0;
        if (mid - ideal).abs() <= SERVICE_HOLE_SPACING && clear_of_holes(mid, holes) {
            return Some(mid);
        }
    }

    // Step off the conflicting aperture, nearer side first.
    let conflict = holes
        .iter()
        .copied()
        .min_by(|a, b| (a - ideal).abs().total_cmp(&(b - ideal).abs()))?;
    let mut shifts = [
        conflict + WEB_TAB_SERVICE_MARGIN,
        conflict - WEB_TAB_SERVICE_MARGIN,
    ];
    shifts.sort_by(|a, b| (a - ideal).abs().total_cmp(&(b - ideal).abs()));
    shifts
        .into_iter()
        .find(|s| *s > 0.0 && *s < length && clear_of_holes(*s, holes))
}

/// Evenly spaced tabs from the 425 insets, gaps capped at 1200.
fn screens_tabs(length: f64) -> Vec<f64> {
    let first = SCREENS_JOIST_FIRST_WEB_TAB;
    let span = length - 2.0 * first;
    let segments = (span / SCREENS_MAX_WEB_TAB_SPACING).ceil().max(1.0);
    let step = span / segments;
    (0..=segments as usize)
        .map(|i| first + i as f64 * step)
        .collect()
}

/// Joist bolts sit centred on their web tab, except hard against an end bolt.
fn centred_bolts(tabs: &[f64], length: f64, punches: &mut Vec<Punch>) {
    for &tab in tabs {
        if (tab - END_BOLT_POSITION).abs() < MIN_CLEARANCE
            || (tab - (length - END_BOLT_POSITION)).abs() < MIN_CLEARANCE
        {
            continue;
        }
        punches.push(Punch::new(PunchKind::BoltHole, tab));
    }
}

fn corner_brackets(spec: &ProfileSpec, length: f64, punches: &mut Vec<Punch>) {
    if !spec.station_enabled(PunchKind::CornerBrackets) {
        return;
    }
    punches.push(Punch::new(PunchKind::CornerBrackets, CORNER_BRACKET_POSITION));
    punches.push(Punch::new(
        PunchKind::CornerBrackets,
        length - CORNER_BRACKET_POSITION,
    ));
}
