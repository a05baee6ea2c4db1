//! Rule-driven punch layout generator.
//!
//! [`plan`] turns a [`ProfileSpec`] into a [`Layout`]: five position-sorted
//! punch lists plus the derived member scalars. Generation is pure and
//! deterministic; it never validates the result. Layouts that break
//! manufacturing rules are allowed to exist and are graded downstream by the
//! clash detector.
//!
//! Dispatch is a small lattice over (role, screens, joist-box):
//! bearers split four ways, joists two. Each branch only reads the spec and
//! the catalog.

mod bearer;
mod joist;

use catalog::{span_limit, DEFAULT_HOLE_DIAMETER, END_EXCLUSION_BASE};
use tracing::{debug, warn};
use types::{Dimensions, Layout, ProfileSpec, PunchKind, Role};

/// Plan the full punch layout for one member.
pub fn plan(spec: &ProfileSpec) -> Layout {
    let dims = derive_dimensions(spec);
    let length = spec.length_mm as f64;

    if let Some(kpa) = spec.kpa_rating {
        if spec.role() == Role::Joist && length > span_limit(kpa) {
            warn!(length_mm = spec.length_mm, kpa = kpa.value(), "span exceeds rated limit");
        }
    }

    let (branch, punches) = match (spec.role(), spec.screens_enabled, spec.joist_box) {
        (Role::Bearer, false, false) => ("bearer_normal", bearer::normal(spec, &dims)),
        (Role::Bearer, false, true) => ("bearer_normal_boxmode", bearer::normal_boxmode(spec, &dims)),
        (Role::Bearer, true, false) => ("bearer_screens", bearer::screens(spec, &dims)),
        (Role::Bearer, true, true) => ("bearer_screens_boxmode", bearer::screens_boxmode(spec, &dims)),
        (Role::Joist, false, _) => ("joist_normal", joist::normal(spec, &dims)),
        (Role::Joist, true, _) => ("joist_screens", joist::screens(spec, &dims)),
    };
    debug!(branch, punches = punches.len(), "layout planned");

    let mut dims = dims;
    dims.hole_qty = punches
        .iter()
        .filter(|p| {
            matches!(
                p.kind,
                PunchKind::SmallServiceHole | PunchKind::MServiceHole | PunchKind::LargeServiceHole
            )
        })
        .count() as u32;

    Layout::planned(spec.variant, length, dims, punches)
}

/// Compute the derived scalars for a spec.
///
/// Shared by every branch and by the manual-override engine, which needs the
/// same scalars for layouts it rebuilds from user edits.
pub fn derive_dimensions(spec: &ProfileSpec) -> Dimensions {
    let length = spec.length_mm as f64;
    let height = spec.profile_height_mm as f64;
    let hole_diameter = spec.hole_type.diameter().unwrap_or(DEFAULT_HOLE_DIAMETER);
    let end_exclusion = 2.0 * (hole_diameter / 2.0 + END_EXCLUSION_BASE);
    let length_mod = length - end_exclusion;
    let hole_spacing = spec.hole_spacing_mm as f64;
    let openings = (length_mod / hole_spacing).floor();
    let opening_centres = if openings >= 1.0 {
        length_mod / openings
    } else {
        length_mod
    };

    Dimensions {
        end_exclusion_mm: end_exclusion,
        length_mod_mm: length_mod,
        opening_centres_mm: opening_centres,
        hole_qty: 0,
        tab_offset_mm: (height - 70.0) / 2.0,
        flange_mm: match spec.role() {
            Role::Bearer => 63.0,
            Role::Joist => 59.0,
        },
        thickness_mm: 1.8,
        hole_diameter_mm: hole_diameter,
        hole_edge_distance_mm: ((height - hole_diameter) / 2.0).max(0.0),
    }
}

/// Grid positions from `start` at `step` pitch, strictly inside `end`.
pub(crate) fn grid(start: f64, step: f64, end: f64) -> Vec<f64> {
    let mut out = Vec::new();
    let mut pos = start;
    while pos < end {
        out.push(pos);
        pos += step;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use types::{HoleType, ProfileVariant};

    #[test]
    fn test_grid_stays_strictly_inside() {
        assert_eq!(grid(600.0, 600.0, 5200.0), vec![
            600.0, 1200.0, 1800.0, 2400.0, 3000.0, 3600.0, 4200.0, 4800.0
        ]);
        // An exact multiple of the pitch never lands on the member end.
        assert_eq!(grid(300.0, 300.0, 1200.0), vec![300.0, 600.0, 900.0]);
        assert_eq!(grid(600.0, 600.0, 600.0), Vec::<f64>::new());
    }

    #[test]
    fn test_dimensions_default_hole_diameter() {
        let spec = ProfileSpec {
            variant: ProfileVariant::BearerSingle,
            length_mm: 5200,
            hole_type: HoleType::None,
            ..Default::default()
        };
        let dims = derive_dimensions(&spec);
        assert_relative_eq!(dims.hole_diameter_mm, 200.0);
        assert_relative_eq!(dims.end_exclusion_mm, 800.0);
        assert_relative_eq!(dims.length_mod_mm, 4400.0);
        assert_relative_eq!(dims.flange_mm, 63.0);
        assert_relative_eq!(dims.thickness_mm, 1.8);
    }

    #[test]
    fn test_dimensions_opening_centres() {
        let spec = ProfileSpec {
            variant: ProfileVariant::JoistSingle,
            length_mm: 6000,
            hole_type: HoleType::R200,
            hole_spacing_mm: 650,
            ..Default::default()
        };
        let dims = derive_dimensions(&spec);
        assert_relative_eq!(dims.end_exclusion_mm, 800.0);
        assert_relative_eq!(dims.length_mod_mm, 5200.0);
        // 5200 / floor(5200/650) = 5200 / 8
        assert_relative_eq!(dims.opening_centres_mm, 650.0);
        assert_relative_eq!(dims.flange_mm, 59.0);
    }

    #[test]
    fn test_dimensions_oval_uses_width() {
        let spec = ProfileSpec {
            hole_type: HoleType::Oval200x400,
            ..Default::default()
        };
        let dims = derive_dimensions(&spec);
        assert_relative_eq!(dims.hole_diameter_mm, 400.0);
        assert_relative_eq!(dims.end_exclusion_mm, 1000.0);
    }

    #[test]
    fn test_plan_is_deterministic() {
        let spec = ProfileSpec {
            variant: ProfileVariant::BearerSingle,
            length_mm: 5200,
            stubs_enabled: true,
            stub_positions: vec![331, 1531, 2731, 3931, 4869],
            ..Default::default()
        };
        assert_eq!(plan(&spec), plan(&spec));
    }

    #[test]
    fn test_plan_positions_sorted_quantised_in_bounds() {
        let spec = ProfileSpec {
            variant: ProfileVariant::JoistSingle,
            length_mm: 6000,
            hole_type: HoleType::R200,
            ..Default::default()
        };
        let layout = plan(&spec);
        for list in [
            &layout.bolt_holes,
            &layout.dimples,
            &layout.web_tabs,
            &layout.service_holes,
            &layout.stubs,
        ] {
            for pair in list.windows(2) {
                assert!(pair[0].position_mm <= pair[1].position_mm);
            }
            for p in list.iter() {
                assert!(p.position_mm >= 0.0 && p.position_mm <= 6000.0);
                let doubled = p.position_mm * 2.0;
                assert_eq!(doubled, doubled.round(), "not half-mm quantised: {}", p.position_mm);
                assert!(p.active);
            }
        }
    }
}
