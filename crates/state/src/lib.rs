//! Computed/manual program state for one member.
//!
//! [`PunchProgram`] owns the only mutable state in the core: the installed
//! profile spec, the current layout tagged by how it was produced, and a
//! monotonic update version observers use to detect changes cheaply. In
//! Computed mode the layout is replanned on every spec install; in Manual
//! mode it holds the operator's edits until a recompute or an explicit clear.
//!
//! The engine assumes exclusive access during mutation; hosts calling from
//! multiple threads wrap it in their own single-writer synchronisation.

use catalog::{BOLT_OFFSET_PATTERN, MIN_CLEARANCE};
use planner::{derive_dimensions, plan};
use tracing::info;
use types::{Layout, ProfileSpec, ProfileVariant, Punch, PunchKind, Role, SpecError};

/// How the current layout was produced.
#[derive(Debug, Clone)]
pub enum Mode {
    /// Replanned from the installed spec
    Computed(Layout),
    /// Holding operator edits
    Manual(Layout),
}

impl Mode {
    fn name(&self) -> &'static str {
        match self {
            Self::Computed(_) => "computed",
            Self::Manual(_) => "manual",
        }
    }

    fn layout(&self) -> &Layout {
        match self {
            Self::Computed(layout) | Self::Manual(layout) => layout,
        }
    }
}

/// State machine for one member's punch program.
pub struct PunchProgram {
    spec: ProfileSpec,
    mode: Mode,
    update_version: u64,
}

impl PunchProgram {
    /// Install a spec and plan its layout. Fails on an invalid spec.
    pub fn new(spec: ProfileSpec) -> Result<Self, SpecError> {
        spec.validate()?;
        let layout = plan(&spec);
        Ok(Self {
            spec,
            mode: Mode::Computed(layout),
            update_version: 1,
        })
    }

    /// Install a new spec and recompute, clearing any manual overrides.
    ///
    /// An invalid spec is rejected before any state changes.
    pub fn update_calculations(&mut self, spec: ProfileSpec) -> Result<u64, SpecError> {
        spec.validate()?;
        let layout = plan(&spec);
        let old_mode = self.mode.name();
        self.spec = spec;
        self.mode = Mode::Computed(layout);
        Ok(self.bump(old_mode))
    }

    /// Replace the layout with operator-edited punches and enter Manual mode.
    ///
    /// Punches are partitioned by kind and sorted; on bearers the bolt list
    /// is then resynchronised against the edited web tabs.
    pub fn set_manual_punches(
        &mut self,
        punches: Vec<Punch>,
        variant: Option<ProfileVariant>,
    ) -> u64 {
        if let Some(variant) = variant {
            self.spec.variant = variant;
        }
        let dims = derive_dimensions(&self.spec);
        let mut layout = Layout::manual(
            self.spec.variant,
            self.spec.length_mm as f64,
            dims,
            punches,
        );
        if self.spec.role() == Role::Bearer {
            resync_bolts(&mut layout);
        }
        let old_mode = self.mode.name();
        self.mode = Mode::Manual(layout);
        self.bump(old_mode)
    }

    /// Leave Manual mode, repopulating from the installed spec.
    ///
    /// A no-op in Computed mode; the version only moves on a real transition.
    pub fn clear_manual_mode(&mut self) -> u64 {
        if matches!(self.mode, Mode::Manual(_)) {
            self.mode = Mode::Computed(plan(&self.spec));
            return self.bump("manual");
        }
        self.update_version
    }

    /// The current layout.
    pub fn get_calculations(&self) -> &Layout {
        self.mode.layout()
    }

    /// True while operator edits are in effect.
    pub fn is_manual(&self) -> bool {
        matches!(self.mode, Mode::Manual(_))
    }

    pub fn get_update_version(&self) -> u64 {
        self.update_version
    }

    pub fn spec(&self) -> &ProfileSpec {
        &self.spec
    }

    /// Manufacturing part code for the installed spec.
    pub fn get_part_code(&self) -> String {
        let spec = &self.spec;
        let code = match spec.role() {
            Role::Bearer => format!(
                "B_{}_J{}_S{}",
                spec.length_mm, spec.joist_spacing_mm, spec.stub_spacing_mm
            ),
            Role::Joist => format!("J_{}_J{}", spec.length_mm, spec.joist_spacing_mm),
        };
        if spec.variant.is_box() {
            format!("{code}_BOX")
        } else {
            code
        }
    }

    fn bump(&mut self, old_mode: &str) -> u64 {
        self.update_version += 1;
        info!(
            old_mode,
            new_mode = self.mode.name(),
            version = self.update_version,
            "program state updated"
        );
        self.update_version
    }
}

/// Rebuild a bearer's bolt list from its web tabs.
///
/// End bolts (within 50 mm of either end) survive; every active web tab, in
/// position order, gets one partner bolt at the alternating ±29.5 offset,
/// provided the partner lands strictly inside the end clearances.
pub fn resync_bolts(layout: &mut Layout) {
    let length = layout.length_mm;
    layout.bolt_holes.retain(|bolt| {
        bolt.position_mm <= MIN_CLEARANCE || bolt.position_mm >= length - MIN_CLEARANCE
    });

    let partners: Vec<Punch> = layout
        .web_tabs
        .iter()
        .filter(|tab| tab.active)
        .enumerate()
        .filter_map(|(i, tab)| {
            let pos = tab.position_mm + BOLT_OFFSET_PATTERN[i % 2];
            (pos > MIN_CLEARANCE && pos < length - MIN_CLEARANCE)
                .then(|| Punch::new(PunchKind::BoltHole, pos))
        })
        .collect();

    layout.bolt_holes.extend(partners);
    layout
        .bolt_holes
        .sort_by(|a, b| a.position_mm.total_cmp(&b.position_mm));
}
