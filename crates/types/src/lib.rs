//! Shared types and profile definitions for punchplan.
//!
//! Everything here is plain data: the profile specification the host builds
//! from its input forms, the punch/layout model the planner produces, and the
//! validation errors raised before any layout work happens. All lengths are
//! millimetres measured from the start end of the member; positions are
//! quantised to half millimetres.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Quantise a position to the half-millimetre grid.
pub fn round_half(x: f64) -> f64 {
    (x * 2.0).round() / 2.0
}

/// Errors raised when a profile specification fails validation.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("{field} out of range: {value} (allowed {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("unsupported profile height: {0} (allowed 200/250/300/350)")]
    UnsupportedHeight(u32),
}

/// Which face of the C-section a punch lands on.
///
/// Flange punches (bolts, dimples) and web punches (tabs, service holes,
/// stubs) live on different planes and never geometrically overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plane {
    Flange,
    Web,
}

/// Punch station, one per press tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PunchKind {
    /// 11x11 square bolt hole
    BoltHole,
    /// 5 mm reinforcement stitch
    Dimple,
    /// 45x70 rectangular joist slot
    WebTab,
    /// 115x300 stub / bracket cut
    Service,
    /// Round 115 mm service aperture
    SmallServiceHole,
    /// Round 200 mm service aperture
    MServiceHole,
    /// 400x200 oval service aperture
    LargeServiceHole,
    /// 115x300 corner bracket cut (emits as Service)
    CornerBrackets,
}

impl PunchKind {
    pub const COUNT: usize = 8;

    pub fn index(&self) -> usize {
        match self {
            Self::BoltHole => 0,
            Self::Dimple => 1,
            Self::WebTab => 2,
            Self::Service => 3,
            Self::SmallServiceHole => 4,
            Self::MServiceHole => 5,
            Self::LargeServiceHole => 6,
            Self::CornerBrackets => 7,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Self::BoltHole),
            1 => Some(Self::Dimple),
            2 => Some(Self::WebTab),
            3 => Some(Self::Service),
            4 => Some(Self::SmallServiceHole),
            5 => Some(Self::MServiceHole),
            6 => Some(Self::LargeServiceHole),
            7 => Some(Self::CornerBrackets),
            _ => None,
        }
    }

    /// The face this punch lands on.
    pub fn plane(&self) -> Plane {
        match self {
            Self::BoltHole | Self::Dimple => Plane::Flange,
            _ => Plane::Web,
        }
    }
}

/// Profile role within the flooring platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Joist,
    Bearer,
}

/// Profile variant: single or doubled-up (box) joists and bearers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProfileVariant {
    #[default]
    JoistSingle,
    JoistBox,
    BearerSingle,
    BearerBox,
}

impl ProfileVariant {
    pub fn role(&self) -> Role {
        match self {
            Self::JoistSingle | Self::JoistBox => Role::Joist,
            Self::BearerSingle | Self::BearerBox => Role::Bearer,
        }
    }

    pub fn is_box(&self) -> bool {
        matches!(self, Self::JoistBox | Self::BearerBox)
    }
}

/// Service-hole style for a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HoleType {
    #[default]
    None,
    R50,
    R115,
    R200,
    Oval200x400,
}

impl HoleType {
    /// Nominal aperture diameter in mm; the oval reports its 400 mm width.
    pub fn diameter(&self) -> Option<f64> {
        match self {
            Self::None => None,
            Self::R50 => Some(50.0),
            Self::R115 => Some(115.0),
            Self::R200 => Some(200.0),
            Self::Oval200x400 => Some(400.0),
        }
    }

    /// The punch station used to cut this hole style.
    pub fn punch_kind(&self) -> Option<PunchKind> {
        match self {
            Self::None => None,
            Self::R50 | Self::R115 => Some(PunchKind::SmallServiceHole),
            Self::R200 => Some(PunchKind::MServiceHole),
            Self::Oval200x400 => Some(PunchKind::LargeServiceHole),
        }
    }

    /// Normalise a raw hole-type code from the host.
    ///
    /// Unknown codes are undefined input; they are normalised to the nearest
    /// catalogued aperture and logged.
    pub fn from_code(code: &str) -> Self {
        match code {
            "NONE" | "None" | "none" => Self::None,
            "R50" => Self::R50,
            "R115" => Self::R115,
            "R200" => Self::R200,
            "OVAL200X400" | "Oval200x400" => Self::Oval200x400,
            other => {
                warn!(code = other, "unknown hole type code, defaulting to R115");
                Self::R115
            }
        }
    }
}

/// Structural load class; selects span-table rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KpaRating {
    #[serde(rename = "2.5")]
    Kpa2_5,
    #[serde(rename = "5.0")]
    Kpa5_0,
}

impl KpaRating {
    pub fn value(&self) -> f64 {
        match self {
            Self::Kpa2_5 => 2.5,
            Self::Kpa5_0 => 5.0,
        }
    }
}

/// Per-station enable flags, total over [`PunchKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationSet([bool; PunchKind::COUNT]);

impl StationSet {
    /// All stations enabled.
    pub fn all() -> Self {
        Self([true; PunchKind::COUNT])
    }

    /// All stations disabled.
    pub fn none() -> Self {
        Self([false; PunchKind::COUNT])
    }

    pub fn enabled(&self, kind: PunchKind) -> bool {
        self.0[kind.index()]
    }

    pub fn set(&mut self, kind: PunchKind, enabled: bool) -> &mut Self {
        self.0[kind.index()] = enabled;
        self
    }

    pub fn with(mut self, kind: PunchKind, enabled: bool) -> Self {
        self.0[kind.index()] = enabled;
        self
    }
}

impl Default for StationSet {
    fn default() -> Self {
        Self::all()
    }
}

/// Profile description built by the host from its input forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSpec {
    pub variant: ProfileVariant,
    /// Member length in mm
    pub length_mm: u32,
    /// Web height in mm (200/250/300/350)
    pub profile_height_mm: u32,
    /// Span of the joists this bearer carries (bearers only)
    pub joist_length_mm: Option<u32>,
    /// Centre spacing of attached joists in mm
    pub joist_spacing_mm: u32,
    /// Centre spacing of stub columns in mm
    pub stub_spacing_mm: u32,
    /// Manually placed stub positions (bearers only)
    pub stub_positions: Vec<u32>,
    pub stubs_enabled: bool,
    pub hole_type: HoleType,
    /// Requested service-hole spacing in mm
    pub hole_spacing_mm: u32,
    /// Per-station enable flags
    pub punch_stations: StationSet,
    /// Box joist at the member ends (joists only)
    pub end_box_joist: bool,
    /// Screen-platform spacing regime
    pub screens_enabled: bool,
    /// Attached joists are box profiles (bearers only)
    pub joist_box: bool,
    pub kpa_rating: Option<KpaRating>,
}

impl Default for ProfileSpec {
    fn default() -> Self {
        Self {
            variant: ProfileVariant::JoistSingle,
            length_mm: 6000,
            profile_height_mm: 250,
            joist_length_mm: None,
            joist_spacing_mm: 600,
            stub_spacing_mm: 1200,
            stub_positions: Vec::new(),
            stubs_enabled: false,
            hole_type: HoleType::None,
            hole_spacing_mm: 650,
            punch_stations: StationSet::all(),
            end_box_joist: false,
            screens_enabled: false,
            joist_box: false,
            kpa_rating: None,
        }
    }
}

impl ProfileSpec {
    /// Validate every numeric field against its documented range.
    ///
    /// Callers must reject the spec before producing any layout from it.
    pub fn validate(&self) -> Result<(), SpecError> {
        range("length_mm", self.length_mm, 1000, 15000)?;
        if ![200, 250, 300, 350].contains(&self.profile_height_mm) {
            return Err(SpecError::UnsupportedHeight(self.profile_height_mm));
        }
        range("joist_spacing_mm", self.joist_spacing_mm, 400, 1200)?;
        range("stub_spacing_mm", self.stub_spacing_mm, 600, 2400)?;
        range("hole_spacing_mm", self.hole_spacing_mm, 400, 1000)?;
        if let Some(jl) = self.joist_length_mm {
            range("joist_length_mm", jl, 1000, 15000)?;
        }
        Ok(())
    }

    pub fn role(&self) -> Role {
        self.variant.role()
    }

    pub fn station_enabled(&self, kind: PunchKind) -> bool {
        self.punch_stations.enabled(kind)
    }
}

fn range(field: &'static str, value: u32, min: u32, max: u32) -> Result<(), SpecError> {
    if value < min || value > max {
        return Err(SpecError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// A single press hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Punch {
    /// Centre position along the member, half-mm quantised
    pub position_mm: f64,
    pub kind: PunchKind,
    /// Disabled entries are kept for editing but never emitted
    pub active: bool,
}

impl Punch {
    /// New active punch; the position is quantised on construction.
    pub fn new(kind: PunchKind, position_mm: f64) -> Self {
        Self {
            position_mm: round_half(position_mm),
            kind,
            active: true,
        }
    }

    pub fn plane(&self) -> Plane {
        self.kind.plane()
    }
}

/// Scalars derived from a profile spec alongside the punch lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub end_exclusion_mm: f64,
    pub length_mod_mm: f64,
    pub opening_centres_mm: f64,
    pub hole_qty: u32,
    pub tab_offset_mm: f64,
    pub flange_mm: f64,
    pub thickness_mm: f64,
    pub hole_diameter_mm: f64,
    pub hole_edge_distance_mm: f64,
}

/// The planned punch program for one member.
///
/// Five position-sorted lists, split by plane: bolt holes and dimples on the
/// flange; web tabs, service holes and stubs on the web face.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub variant: ProfileVariant,
    pub length_mm: f64,
    pub dims: Dimensions,
    pub bolt_holes: Vec<Punch>,
    pub dimples: Vec<Punch>,
    pub web_tabs: Vec<Punch>,
    pub service_holes: Vec<Punch>,
    pub stubs: Vec<Punch>,
}

impl Layout {
    /// Build a computed layout.
    ///
    /// Positions outside `[0, length]` are dropped silently; lists come out
    /// sorted ascending.
    pub fn planned(
        variant: ProfileVariant,
        length_mm: f64,
        dims: Dimensions,
        punches: Vec<Punch>,
    ) -> Self {
        let mut layout = Self::assemble(variant, length_mm, dims, punches, true);
        layout.sort();
        layout
    }

    /// Build a layout from user-edited punches.
    ///
    /// Out-of-range positions are retained so the clash detector can report
    /// them.
    pub fn manual(
        variant: ProfileVariant,
        length_mm: f64,
        dims: Dimensions,
        punches: Vec<Punch>,
    ) -> Self {
        let mut layout = Self::assemble(variant, length_mm, dims, punches, false);
        layout.sort();
        layout
    }

    fn assemble(
        variant: ProfileVariant,
        length_mm: f64,
        dims: Dimensions,
        punches: Vec<Punch>,
        strict: bool,
    ) -> Self {
        let mut layout = Self {
            variant,
            length_mm,
            dims,
            ..Self::default()
        };
        for punch in punches {
            if strict && (punch.position_mm < 0.0 || punch.position_mm > length_mm) {
                continue;
            }
            layout.list_mut(punch.kind).push(punch);
        }
        layout
    }

    fn sort(&mut self) {
        for list in [
            &mut self.bolt_holes,
            &mut self.dimples,
            &mut self.web_tabs,
            &mut self.service_holes,
            &mut self.stubs,
        ] {
            list.sort_by(|a, b| a.position_mm.total_cmp(&b.position_mm));
        }
    }

    /// The list a punch kind is stored in.
    pub fn list(&self, kind: PunchKind) -> &[Punch] {
        match kind {
            PunchKind::BoltHole => &self.bolt_holes,
            PunchKind::Dimple => &self.dimples,
            PunchKind::WebTab => &self.web_tabs,
            PunchKind::SmallServiceHole
            | PunchKind::MServiceHole
            | PunchKind::LargeServiceHole => &self.service_holes,
            PunchKind::Service | PunchKind::CornerBrackets => &self.stubs,
        }
    }

    fn list_mut(&mut self, kind: PunchKind) -> &mut Vec<Punch> {
        match kind {
            PunchKind::BoltHole => &mut self.bolt_holes,
            PunchKind::Dimple => &mut self.dimples,
            PunchKind::WebTab => &mut self.web_tabs,
            PunchKind::SmallServiceHole
            | PunchKind::MServiceHole
            | PunchKind::LargeServiceHole => &mut self.service_holes,
            PunchKind::Service | PunchKind::CornerBrackets => &mut self.stubs,
        }
    }

    /// All punches merged and sorted by position.
    ///
    /// Ties keep flange-before-web order, which the wire format relies on.
    pub fn merged(&self) -> Vec<Punch> {
        let mut all: Vec<Punch> = Vec::with_capacity(self.punch_count());
        all.extend_from_slice(&self.bolt_holes);
        all.extend_from_slice(&self.dimples);
        all.extend_from_slice(&self.web_tabs);
        all.extend_from_slice(&self.service_holes);
        all.extend_from_slice(&self.stubs);
        all.sort_by(|a, b| a.position_mm.total_cmp(&b.position_mm));
        all
    }

    pub fn punch_count(&self) -> usize {
        self.bolt_holes.len()
            + self.dimples.len()
            + self.web_tabs.len()
            + self.service_holes.len()
            + self.stubs.len()
    }

    /// Active punches on the web face, merged and sorted.
    pub fn active_face_punches(&self) -> Vec<Punch> {
        let mut face: Vec<Punch> = self
            .web_tabs
            .iter()
            .chain(self.service_holes.iter())
            .chain(self.stubs.iter())
            .filter(|p| p.active)
            .copied()
            .collect();
        face.sort_by(|a, b| a.position_mm.total_cmp(&b.position_mm));
        face
    }
}
