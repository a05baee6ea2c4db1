//! End-to-end scenarios across the planning stack.
//!
//! Each test drives the same path a host does: build a profile spec, take
//! span advice, plan or edit the layout, grade it, and export the press
//! record.

use approx::assert_relative_eq;
use clash::{detect_clashes, RuleKind, Severity};
use nc::{encode_csv, parse_csv, Meta};
use planner::plan;
use spantable::advise;
use state::PunchProgram;
use types::{HoleType, KpaRating, ProfileSpec, ProfileVariant, Punch, PunchKind};

fn bearer_5200() -> ProfileSpec {
    ProfileSpec {
        variant: ProfileVariant::BearerSingle,
        length_mm: 5200,
        joist_spacing_mm: 600,
        stub_spacing_mm: 1200,
        stub_positions: vec![catalog::FIRST_STUB_POSITION as u32, 1531, 2731, 3931, 4869],
        stubs_enabled: true,
        hole_type: HoleType::None,
        kpa_rating: Some(KpaRating::Kpa2_5),
        ..Default::default()
    }
}

fn positions(punches: &[Punch]) -> Vec<f64> {
    punches.iter().map(|p| p.position_mm).collect()
}

#[test]
fn bearer_normal_full_layout() {
    let layout = plan(&bearer_5200());

    assert_eq!(
        positions(&layout.bolt_holes),
        vec![30.0, 570.5, 1229.5, 1770.5, 2429.5, 2970.5, 3629.5, 4170.5, 4829.5, 5170.0]
    );
    let dimples = positions(&layout.dimples);
    assert_eq!(dimples.len(), 11);
    assert_eq!(dimples[0], catalog::DIMPLE_START_BEARER);
    assert_eq!(*dimples.last().unwrap(), 4979.5);
    for pair in dimples.windows(2) {
        assert_relative_eq!(pair[1] - pair[0], catalog::DIMPLE_SPACING_BEARER);
    }
    assert_eq!(
        positions(&layout.web_tabs),
        vec![600.0, 1200.0, 1800.0, 2400.0, 3000.0, 3600.0, 4200.0, 4800.0]
    );
    assert!(layout.service_holes.is_empty());
    assert_eq!(
        positions(&layout.stubs),
        vec![131.0, 331.0, 1531.0, 2731.0, 3931.0, 4869.0, 5069.0]
    );
}

#[test]
fn bearer_boxmode_swaps_tabs_for_seat_hits() {
    let spec = ProfileSpec {
        joist_box: true,
        ..bearer_5200()
    };
    let layout = plan(&spec);

    assert!(layout.web_tabs.is_empty());
    assert!(layout.bolt_holes.is_empty());
    let dimples = positions(&layout.dimples);
    let stubs = positions(&layout.stubs);
    for seat in (1..=8).map(|i| (i * 600) as f64) {
        assert!(stubs.contains(&(seat - 12.0)));
        assert!(stubs.contains(&(seat + 12.0)));
        assert!(!stubs.contains(&seat));
        assert!(dimples.contains(&seat));
    }
    assert!(dimples.contains(&30.0));
    assert!(dimples.contains(&5170.0));
}

#[test]
fn joist_advice_and_coordinated_layout() {
    let advice = advise(6000, KpaRating::Kpa2_5);
    assert_eq!(advice.variant, ProfileVariant::JoistSingle);
    assert_eq!(advice.joist_spacing_mm, 600);
    assert!(!advice.exceeds_limit);

    let spec = ProfileSpec {
        variant: advice.variant,
        length_mm: 6000,
        joist_spacing_mm: advice.joist_spacing_mm,
        hole_type: HoleType::R200,
        hole_spacing_mm: 650,
        kpa_rating: Some(KpaRating::Kpa2_5),
        ..Default::default()
    };
    let layout = plan(&spec);

    let holes = positions(&layout.service_holes);
    assert!(!holes.is_empty());
    for pair in holes.windows(2) {
        assert_eq!(pair[1] - pair[0], 650.0);
    }
    // Symmetric about the member midpoint.
    assert_eq!(holes.first().unwrap() + holes.last().unwrap(), 6000.0);

    for tab in positions(&layout.web_tabs) {
        assert!(*holes.first().unwrap() < tab && tab < *holes.last().unwrap());
        for &hole in &holes {
            assert!((tab - hole).abs() >= 149.5, "tab {tab} crowds hole {hole}");
        }
    }
}

#[test]
fn overspan_bearer_advises_box_and_warns() {
    let advice = advise(12000, KpaRating::Kpa5_0);
    assert_eq!(advice.variant, ProfileVariant::JoistBox);
    assert_eq!(advice.joist_spacing_mm, 300);
    assert!(advice.exceeds_limit);

    let spec = ProfileSpec {
        length_mm: 12000,
        joist_length_mm: Some(12000),
        kpa_rating: Some(KpaRating::Kpa5_0),
        joist_spacing_mm: advice.joist_spacing_mm,
        stub_positions: vec![],
        ..bearer_5200()
    };
    let layout = plan(&spec);
    let diags = detect_clashes(&layout, &spec);

    let span: Vec<_> = diags
        .items
        .iter()
        .filter(|d| d.rule == RuleKind::SpanLimit)
        .collect();
    assert_eq!(span.len(), 1);
    assert_eq!(span[0].severity, Severity::Warning);
    assert_eq!(diags.error_count, 0);
}

#[test]
fn export_matches_press_record() {
    let program = PunchProgram::new(bearer_5200()).unwrap();
    assert_eq!(program.get_part_code(), "B_5200_J600_S1200");

    let line = encode_csv(
        program.get_calculations(),
        &Meta {
            part_code: program.get_part_code(),
            qty: 2,
        },
    );
    assert!(line.starts_with(
        "csvCOMPONENT,B1-1,B_5200_J600_S1200,BEARER,NORMAL,2,5200,0,0,5200,0,50,BOLT HOLE,30"
    ));
    assert!(line.ends_with(",BOLT HOLE,5170"));

    let record = parse_csv(&line).unwrap();
    assert_eq!(record.qty, 2);
    let hits = program
        .get_calculations()
        .merged()
        .iter()
        .filter(|p| p.active)
        .count();
    assert_eq!(record.punches.len(), hits);
    // Corner brackets come back as plain service hits.
    assert!(record
        .punches
        .iter()
        .any(|(kind, pos)| *kind == PunchKind::Service && *pos == 131.0));
}

#[test]
fn manual_tab_removal_resyncs_bolts_cleanly() {
    let mut program = PunchProgram::new(bearer_5200()).unwrap();
    let mut punches: Vec<Punch> = program
        .get_calculations()
        .merged()
        .into_iter()
        .filter(|p| {
            !(p.kind == PunchKind::WebTab
                && (p.position_mm == 1200.0 || p.position_mm == 1800.0))
        })
        .collect();
    punches.retain(|p| p.active);
    let version_before = program.get_update_version();
    program.set_manual_punches(punches, None);
    assert!(program.get_update_version() > version_before);

    let layout = program.get_calculations();
    let bolts = positions(&layout.bolt_holes);
    // End bolts survive; the partners of the dropped tabs are gone and the
    // remaining tabs repair onto the alternating offsets.
    assert!(bolts.contains(&30.0));
    assert!(bolts.contains(&5170.0));
    assert!(!bolts.contains(&1229.5));
    assert!(!bolts.contains(&1770.5));
    assert_eq!(
        bolts,
        vec![30.0, 570.5, 2429.5, 2970.5, 3629.5, 4170.5, 4829.5, 5170.0]
    );

    // Every surviving tab has its partner again, so the alignment rule has
    // nothing to report.
    let diags = detect_clashes(layout, program.spec());
    assert!(!diags.items.iter().any(|d| d.rule == RuleKind::BoltAlignment));
}

#[test]
fn alignment_warning_when_partner_bolt_deleted() {
    let mut program = PunchProgram::new(bearer_5200()).unwrap();
    program.set_manual_punches(
        vec![
            Punch::new(PunchKind::BoltHole, 30.0),
            Punch::new(PunchKind::BoltHole, 5170.0),
            Punch::new(PunchKind::WebTab, 55.0),
            Punch::new(PunchKind::WebTab, 600.0),
        ],
        None,
    );
    // The first tab's partner would land at 25.5, inside the end clearance,
    // so resync cannot place it.
    let diags = detect_clashes(program.get_calculations(), program.spec());
    let misses: Vec<_> = diags
        .items
        .iter()
        .filter(|d| d.rule == RuleKind::BoltAlignment)
        .collect();
    assert_eq!(misses.len(), 1);
    assert_eq!(misses[0].position_mm, Some(55.0));
    assert_eq!(misses[0].severity, Severity::Warning);
}

#[test]
fn recompute_restores_computed_layout_and_versions() {
    let mut program = PunchProgram::new(bearer_5200()).unwrap();
    let computed = program.get_calculations().clone();

    let v2 = program.set_manual_punches(vec![Punch::new(PunchKind::WebTab, 900.0)], None);
    assert!(program.is_manual());
    let v3 = program.update_calculations(bearer_5200()).unwrap();
    assert!(!program.is_manual());
    assert!(v2 < v3);
    assert_eq!(*program.get_calculations(), computed);
}

#[test]
fn screens_joist_program_round_trips() {
    let spec = ProfileSpec {
        variant: ProfileVariant::JoistSingle,
        length_mm: 6000,
        screens_enabled: true,
        hole_type: HoleType::R115,
        ..Default::default()
    };
    let program = PunchProgram::new(spec).unwrap();
    assert_eq!(program.get_part_code(), "J_6000_J600");

    let layout = program.get_calculations();
    let tabs = positions(&layout.web_tabs);
    assert_eq!(tabs.first(), Some(&425.0));
    assert_eq!(tabs.last(), Some(&5575.0));
    for pair in tabs.windows(2) {
        assert!(pair[1] - pair[0] <= 1200.0);
    }

    let line = encode_csv(
        layout,
        &Meta {
            part_code: program.get_part_code(),
            qty: 1,
        },
    );
    let record = parse_csv(&line).unwrap();
    let expected: Vec<(PunchKind, f64)> = layout
        .merged()
        .iter()
        .filter(|p| p.active)
        .map(|p| {
            let kind = if p.kind == PunchKind::CornerBrackets {
                PunchKind::Service
            } else {
                p.kind
            };
            (kind, p.position_mm)
        })
        .collect();
    assert_eq!(record.punches, expected);
}
