//! Manufacturing rule checks over a punch layout.
//!
//! [`detect_clashes`] grades a layout against the fixed rule set and returns
//! every violation as data; nothing here ever fails. Rules are evaluated in a
//! fixed order and, within a rule, in ascending position order, so the
//! diagnostic list is stable for a given layout.
//!
//! The two punch planes are respected throughout: flange punches are only
//! checked against flange punches and web-face punches against web-face
//! punches. The logical rules (bolt/web-tab alignment, span limits) may read
//! across planes but never report geometric overlap between them.

use catalog::{
    clearance_radius, punch_spec, span_limit, BOLT_OFFSET_PATTERN, DIMPLE_SPACING_BEARER,
    DIMPLE_SPACING_JOIST, DIMPLE_START_BEARER, DIMPLE_START_JOIST, MIN_CLEARANCE,
    MIN_SPACING_TOLERANCE, POSITION_TOLERANCE, SERVICE_CLEARANCE, SERVICE_HOLE_SPACING,
    SPACING_TOLERANCE_PERCENT, WEB_TAB_CLEARANCE,
};
use serde::{Deserialize, Serialize};
use types::{Layout, ProfileSpec, Punch, PunchKind, Role};

/// End-bolt exemption band for the edge-clearance rule.
const END_BOLT_EXEMPT: f64 = 35.0;
/// Minimum dimple-to-bolt distance on the flange: 2.5 + 5.5 + 5 safety.
const FLANGE_MIN_DISTANCE: f64 = 13.0;
/// Corner-bracket band excluded from the service-hole spacing rule.
const CORNER_EXCLUSION: f64 = 150.0;
/// Allowed deviation from the nominal service-hole pitch.
const SERVICE_SPACING_TOLERANCE: f64 = 100.0;
/// Grid tolerance for the dimple pattern checks.
const DIMPLE_GRID_TOLERANCE: f64 = 1.0;
/// Face punches further apart than this can never overlap.
const MAX_FACE_REACH: f64 = 2.0 * 200.0 + POSITION_TOLERANCE;

/// How severe a violation is; errors should gate export, warnings should not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

/// Which rule produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleKind {
    EdgeClearance,
    WebTabServiceClearance,
    StubServiceClearance,
    BoltAlignment,
    FlangeClearance,
    DimpleGrid,
    SpanLimit,
    WebTabSpacing,
    ServiceHoleSpacing,
    FaceOverlap,
}

/// One graded rule violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub rule: RuleKind,
    pub severity: Severity,
    /// Anchor position of the violation, where one exists
    pub position_mm: Option<f64>,
    pub element_a: String,
    pub element_b: Option<String>,
    pub message: String,
}

/// Ordered diagnostics plus severity tallies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    pub items: Vec<Diagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
}

impl Diagnostics {
    pub fn is_clean(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    fn extend_sorted(&mut self, mut batch: Vec<Diagnostic>) {
        batch.sort_by(|a, b| {
            a.position_mm
                .unwrap_or(f64::NEG_INFINITY)
                .total_cmp(&b.position_mm.unwrap_or(f64::NEG_INFINITY))
        });
        for item in batch {
            match item.severity {
                Severity::Error => self.error_count += 1,
                Severity::Warning => self.warning_count += 1,
            }
            self.items.push(item);
        }
    }
}

fn describe(punch: &Punch) -> String {
    format!(
        "{} at {}",
        punch_spec(punch.kind).station,
        punch.position_mm
    )
}

fn active(list: &[Punch]) -> impl Iterator<Item = &Punch> {
    list.iter().filter(|p| p.active)
}

/// Grade a layout against the full rule set.
pub fn detect_clashes(layout: &Layout, spec: &ProfileSpec) -> Diagnostics {
    let mut diags = Diagnostics::default();
    diags.extend_sorted(edge_clearance(layout));
    diags.extend_sorted(web_tab_service_clearance(layout));
    diags.extend_sorted(stub_service_clearance(layout));
    diags.extend_sorted(bolt_alignment(layout, spec));
    diags.extend_sorted(flange_clearance(layout));
    diags.extend_sorted(dimple_grid(layout, spec));
    diags.extend_sorted(span_limits(spec));
    diags.extend_sorted(web_tab_spacing(layout, spec));
    diags.extend_sorted(service_hole_spacing(layout, spec));
    diags.extend_sorted(face_overlap(layout));
    diags
}

/// Rule 1: punches may not crowd the member ends.
fn edge_clearance(layout: &Layout) -> Vec<Diagnostic> {
    let length = layout.length_mm;
    let mut batch = Vec::new();

    for bolt in active(&layout.bolt_holes) {
        let pos = bolt.position_mm;
        if pos <= END_BOLT_EXEMPT || pos >= length - END_BOLT_EXEMPT {
            continue;
        }
        if pos < MIN_CLEARANCE || pos > length - MIN_CLEARANCE {
            batch.push(Diagnostic {
                rule: RuleKind::EdgeClearance,
                severity: Severity::Error,
                position_mm: Some(pos),
                element_a: describe(bolt),
                element_b: None,
                message: format!(
                    "{} is within {MIN_CLEARANCE} mm of the member end",
                    describe(bolt)
                ),
            });
        }
    }

    for tab in active(&layout.web_tabs) {
        let pos = tab.position_mm;
        if pos < WEB_TAB_CLEARANCE || pos > length - WEB_TAB_CLEARANCE {
            batch.push(Diagnostic {
                rule: RuleKind::EdgeClearance,
                severity: Severity::Error,
                position_mm: Some(pos),
                element_a: describe(tab),
                element_b: None,
                message: format!("{} overhangs the member end", describe(tab)),
            });
        }
    }

    for hole in active(&layout.service_holes) {
        let radius = clearance_radius(hole.kind);
        let pos = hole.position_mm;
        if pos < radius || pos > length - radius {
            batch.push(Diagnostic {
                rule: RuleKind::EdgeClearance,
                severity: Severity::Error,
                position_mm: Some(pos),
                element_a: describe(hole),
                element_b: None,
                message: format!("{} breaks out of the member end", describe(hole)),
            });
        }
    }

    batch
}

/// Required web-tab to service-hole centre distance.
fn tab_hole_clearance(kind: PunchKind) -> f64 {
    match kind {
        PunchKind::MServiceHole => 145.0,
        PunchKind::LargeServiceHole => 245.0,
        PunchKind::SmallServiceHole => 102.5,
        other => WEB_TAB_CLEARANCE + clearance_radius(other) + WEB_TAB_CLEARANCE,
    }
}

/// Rule 2: web tabs keep clear of service apertures.
fn web_tab_service_clearance(layout: &Layout) -> Vec<Diagnostic> {
    let mut batch = Vec::new();
    for tab in active(&layout.web_tabs) {
        for hole in active(&layout.service_holes) {
            let required = tab_hole_clearance(hole.kind);
            let distance = (tab.position_mm - hole.position_mm).abs();
            if distance < required {
                batch.push(Diagnostic {
                    rule: RuleKind::WebTabServiceClearance,
                    severity: Severity::Warning,
                    position_mm: Some(tab.position_mm),
                    element_a: describe(tab),
                    element_b: Some(describe(hole)),
                    message: format!(
                        "{} is {distance} mm from {} (needs {required})",
                        describe(tab),
                        describe(hole)
                    ),
                });
            }
        }
    }
    batch
}

/// Rule 3: stubs and corner brackets keep clear of service apertures.
fn stub_service_clearance(layout: &Layout) -> Vec<Diagnostic> {
    let mut batch = Vec::new();
    for stub in active(&layout.stubs) {
        for hole in active(&layout.service_holes) {
            let distance = (stub.position_mm - hole.position_mm).abs();
            if distance < SERVICE_CLEARANCE {
                batch.push(Diagnostic {
                    rule: RuleKind::StubServiceClearance,
                    severity: Severity::Warning,
                    position_mm: Some(stub.position_mm),
                    element_a: describe(stub),
                    element_b: Some(describe(hole)),
                    message: format!(
                        "{} is {distance} mm from {} (needs {SERVICE_CLEARANCE})",
                        describe(stub),
                        describe(hole)
                    ),
                });
            }
        }
    }
    batch
}

/// Rule 4: every bearer web tab needs its alternating-offset partner bolt.
fn bolt_alignment(layout: &Layout, spec: &ProfileSpec) -> Vec<Diagnostic> {
    if spec.role() != Role::Bearer {
        return Vec::new();
    }
    let length = layout.length_mm;
    let mut batch = Vec::new();
    for (i, tab) in active(&layout.web_tabs).enumerate() {
        let expected = tab.position_mm + BOLT_OFFSET_PATTERN[i % 2];
        let found = active(&layout.bolt_holes).any(|bolt| {
            bolt.position_mm > MIN_CLEARANCE
                && bolt.position_mm < length - MIN_CLEARANCE
                && (bolt.position_mm - expected).abs() <= POSITION_TOLERANCE
        });
        if !found {
            batch.push(Diagnostic {
                rule: RuleKind::BoltAlignment,
                severity: Severity::Warning,
                position_mm: Some(tab.position_mm),
                element_a: describe(tab),
                element_b: None,
                message: format!(
                    "{} has no partner bolt near {expected}",
                    describe(tab)
                ),
            });
        }
    }
    batch
}

/// Rule 5: dimples and bolt holes may not collide on the flange.
fn flange_clearance(layout: &Layout) -> Vec<Diagnostic> {
    let mut batch = Vec::new();
    for dimple in active(&layout.dimples) {
        for bolt in active(&layout.bolt_holes) {
            let distance = (dimple.position_mm - bolt.position_mm).abs();
            if distance < FLANGE_MIN_DISTANCE {
                batch.push(Diagnostic {
                    rule: RuleKind::FlangeClearance,
                    severity: Severity::Warning,
                    position_mm: Some(dimple.position_mm),
                    element_a: describe(dimple),
                    element_b: Some(describe(bolt)),
                    message: format!(
                        "{} is {distance} mm from {} (needs {FLANGE_MIN_DISTANCE})",
                        describe(dimple),
                        describe(bolt)
                    ),
                });
            }
        }
    }
    batch
}

/// Rule 6: dimples follow the canonical stitch grid for their role.
///
/// Box-mode bearers seat dimples on the joist grid instead, so the check is
/// skipped there. Joists are graded against the historical 409.5/509.5 grid,
/// which the current stitch pattern does not produce; the message carries the
/// expected grid so the drift is visible.
fn dimple_grid(layout: &Layout, spec: &ProfileSpec) -> Vec<Diagnostic> {
    let (start, spacing) = match spec.role() {
        Role::Bearer if spec.joist_box => return Vec::new(),
        Role::Bearer => (DIMPLE_START_BEARER, DIMPLE_SPACING_BEARER),
        Role::Joist => (DIMPLE_START_JOIST, DIMPLE_SPACING_JOIST),
    };

    let mut batch = Vec::new();
    let mut dimples = active(&layout.dimples);
    let Some(first) = dimples.next() else {
        return batch;
    };

    if (first.position_mm - start).abs() > DIMPLE_GRID_TOLERANCE {
        batch.push(grid_diagnostic(first, start));
    }
    for dimple in dimples {
        let steps = ((dimple.position_mm - start) / spacing).round();
        let expected = start + steps * spacing;
        if (dimple.position_mm - expected).abs() > DIMPLE_GRID_TOLERANCE {
            batch.push(grid_diagnostic(dimple, expected));
        }
    }
    batch
}

fn grid_diagnostic(dimple: &Punch, expected: f64) -> Diagnostic {
    Diagnostic {
        rule: RuleKind::DimpleGrid,
        severity: Severity::Warning,
        position_mm: Some(dimple.position_mm),
        element_a: describe(dimple),
        element_b: None,
        message: format!("{} is off the stitch grid (expected {expected})", describe(dimple)),
    }
}

/// Rule 7: rated spans must stay inside the span table.
fn span_limits(spec: &ProfileSpec) -> Vec<Diagnostic> {
    let Some(kpa) = spec.kpa_rating else {
        return Vec::new();
    };
    let limit = span_limit(kpa);
    let mut batch = Vec::new();
    match spec.role() {
        Role::Joist => {
            if spec.length_mm as f64 > limit {
                batch.push(span_diagnostic(
                    Severity::Error,
                    format!(
                        "member length {} exceeds the {} kPa span limit of {limit}",
                        spec.length_mm,
                        kpa.value()
                    ),
                ));
            }
        }
        Role::Bearer => {
            if let Some(joist_length) = spec.joist_length_mm {
                if joist_length as f64 > limit {
                    batch.push(span_diagnostic(
                        Severity::Warning,
                        format!(
                            "joist span {joist_length} exceeds the {} kPa span limit of {limit}",
                            kpa.value()
                        ),
                    ));
                }
            }
        }
    }
    batch
}

fn span_diagnostic(severity: Severity, message: String) -> Diagnostic {
    Diagnostic {
        rule: RuleKind::SpanLimit,
        severity,
        position_mm: None,
        element_a: "member".to_string(),
        element_b: None,
        message,
    }
}

/// Rule 8: adjacent web tabs stay near the configured joist spacing.
fn web_tab_spacing(layout: &Layout, spec: &ProfileSpec) -> Vec<Diagnostic> {
    let spacing = spec.joist_spacing_mm as f64;
    let tolerance = (SPACING_TOLERANCE_PERCENT * spacing).max(MIN_SPACING_TOLERANCE);
    let tabs: Vec<&Punch> = active(&layout.web_tabs).collect();
    let mut batch = Vec::new();
    for pair in tabs.windows(2) {
        let gap = pair[1].position_mm - pair[0].position_mm;
        if (gap - spacing).abs() > tolerance {
            batch.push(Diagnostic {
                rule: RuleKind::WebTabSpacing,
                severity: Severity::Warning,
                position_mm: Some(pair[0].position_mm),
                element_a: describe(pair[0]),
                element_b: Some(describe(pair[1])),
                message: format!(
                    "web tab gap of {gap} mm deviates from the {spacing} mm joist spacing by more than {tolerance}"
                ),
            });
        }
    }
    batch
}

/// Rule 9: service apertures hold the nominal pitch outside the corner bands.
fn service_hole_spacing(layout: &Layout, spec: &ProfileSpec) -> Vec<Diagnostic> {
    if spec.screens_enabled {
        return Vec::new();
    }
    let length = layout.length_mm;
    let holes: Vec<&Punch> = active(&layout.service_holes)
        .filter(|h| h.position_mm > CORNER_EXCLUSION && h.position_mm < length - CORNER_EXCLUSION)
        .collect();
    let mut batch = Vec::new();
    for pair in holes.windows(2) {
        let gap = pair[1].position_mm - pair[0].position_mm;
        if (gap - SERVICE_HOLE_SPACING).abs() > SERVICE_SPACING_TOLERANCE {
            batch.push(Diagnostic {
                rule: RuleKind::ServiceHoleSpacing,
                severity: Severity::Warning,
                position_mm: Some(pair[0].position_mm),
                element_a: describe(pair[0]),
                element_b: Some(describe(pair[1])),
                message: format!(
                    "service hole gap of {gap} mm is outside {SERVICE_HOLE_SPACING} ± {SERVICE_SPACING_TOLERANCE}"
                ),
            });
        }
    }
    batch
}

/// Rule 10: web-face punches may not overlap each other.
fn face_overlap(layout: &Layout) -> Vec<Diagnostic> {
    let face = layout.active_face_punches();
    let mut batch = Vec::new();
    for (i, a) in face.iter().enumerate() {
        for b in &face[i + 1..] {
            let distance = b.position_mm - a.position_mm;
            if distance > MAX_FACE_REACH {
                break;
            }
            let required =
                clearance_radius(a.kind) + clearance_radius(b.kind) + POSITION_TOLERANCE;
            if distance < required {
                let severity = if distance < 5.0 {
                    Severity::Error
                } else {
                    Severity::Warning
                };
                batch.push(Diagnostic {
                    rule: RuleKind::FaceOverlap,
                    severity,
                    position_mm: Some(a.position_mm),
                    element_a: describe(a),
                    element_b: Some(describe(b)),
                    message: format!(
                        "{} and {} are {distance} mm apart (needs {required})",
                        describe(a),
                        describe(b)
                    ),
                });
            }
        }
    }
    batch
}
