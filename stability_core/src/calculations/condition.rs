//! # Loading Condition Computation
//!
//! Turns a loading condition into hydrostatic and stability results:
//!
//! 1. Lightship, tank and pen weights are summed with their moments
//! 2. Hydrostatic curves are taken from the input or generated from the
//!    principal dimensions
//! 3. Draft and trim are solved; KG, KB, BM and GM follow
//! 4. Strength and ancillary checks run on the solved waterline
//!
//! The computation is a pure function of its input: no caches, no shared
//! state, and identical inputs give bit-identical results.
//!
//! ## Example
//!
//! ```rust
//! use stability_core::calculations::condition::{compute_condition, LoadingInput};
//! use stability_core::model::{LoadingCondition, Ship, Tank};
//!
//! let ship = Ship::new("MV Example", 150.0, 25.0, 15.0, 10.0);
//! let tanks = vec![Tank::new(1, "DB1", 12_000.0, 0.5, 3.0)];
//! let condition = LoadingCondition::new("Departure").with_tank_volume(1, 12_000.0);
//!
//! let input = LoadingInput::new(&ship, &tanks, &condition);
//! let results = compute_condition(&input);
//!
//! assert_eq!(results.displacement_t, 12_000.0);
//! assert!(results.gm_m > 0.15);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ancillary::{compute_ancillary_with_limits, AncillaryResults};
use super::criteria::CriteriaEvaluation;
use super::strength::{compute_strength, StrengthInput, StrengthResult};
use super::validation::ValidationResult;
use crate::hydrostatics::curves::{build_curves_from_formulas, HydrostaticCurves, DEFAULT_CURVE_POINTS};
use crate::hydrostatics::solver::{kb_at_draft, solve_draft_and_trim, transverse_bm_at, HydroMethod};
use crate::model::{LivestockPen, LoadingCondition, PenId, Ship, Tank, TankCog, TankId};
use crate::settings::{ReferenceVessel, StabilityLimits, DEFAULT_BLOCK_COEFFICIENT, DEFAULT_MASS_PER_HEAD_T, RHO_SEA};
use crate::traceability::CalculationSnapshot;

/// Bounds applied to the aggregate LCG before solving trim
pub const LCG_NORM_MIN: f64 = 0.001;
pub const LCG_NORM_MAX: f64 = 0.999;

/// GM below which heel is not derived
const GM_HEEL_EPS: f64 = 1e-9;

// =============================================================================
// Input
// =============================================================================

/// Everything a condition computation reads, borrowed from the caller.
///
/// Construct with [`LoadingInput::new`] and adjust with the `with_*`
/// methods; unset options take the documented defaults.
#[derive(Debug, Clone, Copy)]
pub struct LoadingInput<'a> {
    pub ship: &'a Ship,
    pub tanks: &'a [Tank],
    pub condition: &'a LoadingCondition,
    pub pens: &'a [LivestockPen],

    /// Head counts; `None` uses the condition's own pen loadings
    pub pen_loadings: Option<&'a BTreeMap<PenId, u32>>,

    /// Density applied to every tank volume (t/m³), default 1.0
    pub cargo_density: f64,

    /// Default 0.5 t
    pub mass_per_head_t: f64,

    /// Height of the livestock CoG above the pen deck (m), default 0
    pub vcg_from_deck_m: f64,

    /// Sounding-table centres of gravity per tank
    pub tank_cog_override: Option<&'a BTreeMap<TankId, TankCog>>,

    /// Tabulated hydrostatics; generated from dimensions when absent or invalid
    pub curves: Option<&'a HydrostaticCurves>,

    /// Completes missing lightship data and dimensions when set
    pub reference: Option<&'a ReferenceVessel>,

    pub limits: Option<&'a StabilityLimits>,

    /// Default seawater
    pub water_density: f64,

    pub block_coefficient: f64,
}

impl<'a> LoadingInput<'a> {
    pub fn new(ship: &'a Ship, tanks: &'a [Tank], condition: &'a LoadingCondition) -> Self {
        LoadingInput {
            ship,
            tanks,
            condition,
            pens: &[],
            pen_loadings: None,
            cargo_density: 1.0,
            mass_per_head_t: DEFAULT_MASS_PER_HEAD_T,
            vcg_from_deck_m: 0.0,
            tank_cog_override: None,
            curves: None,
            reference: None,
            limits: None,
            water_density: RHO_SEA,
            block_coefficient: DEFAULT_BLOCK_COEFFICIENT,
        }
    }

    pub fn with_pens(mut self, pens: &'a [LivestockPen]) -> Self {
        self.pens = pens;
        self
    }

    pub fn with_pen_loadings(mut self, loadings: &'a BTreeMap<PenId, u32>) -> Self {
        self.pen_loadings = Some(loadings);
        self
    }

    pub fn with_cargo_density(mut self, density: f64) -> Self {
        self.cargo_density = density;
        self
    }

    /// Set mass per head and the VCG offset above the pen deck.
    pub fn with_livestock(mut self, mass_per_head_t: f64, vcg_from_deck_m: f64) -> Self {
        self.mass_per_head_t = mass_per_head_t;
        self.vcg_from_deck_m = vcg_from_deck_m;
        self
    }

    pub fn with_tank_cog_override(mut self, overrides: &'a BTreeMap<TankId, TankCog>) -> Self {
        self.tank_cog_override = Some(overrides);
        self
    }

    pub fn with_curves(mut self, curves: &'a HydrostaticCurves) -> Self {
        self.curves = Some(curves);
        self
    }

    pub fn with_reference(mut self, reference: &'a ReferenceVessel) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn with_limits(mut self, limits: &'a StabilityLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    fn pen_loadings(&self) -> &'a BTreeMap<PenId, u32> {
        self.pen_loadings.unwrap_or(&self.condition.pen_loadings)
    }
}

// =============================================================================
// Results
// =============================================================================

/// Origin of the hydrostatic curves used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveSource {
    /// Supplied tabulated data
    Tabulated,
    /// Generated from principal dimensions
    Generated,
    /// No valid curves; closed-form formulas only
    None,
}

/// Origin of the lightship weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightshipSource {
    Ship,
    Reference,
    None,
}

/// Records which fallback each hydrostatic value took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputationPath {
    pub curves: CurveSource,
    pub lightship: LightshipSource,
    pub draft: HydroMethod,
    pub trim: HydroMethod,
    pub kb: HydroMethod,
    pub bm_t: HydroMethod,
}

impl ComputationPath {
    fn skipped(lightship: LightshipSource) -> Self {
        ComputationPath {
            curves: CurveSource::None,
            lightship,
            draft: HydroMethod::Skipped,
            trim: HydroMethod::Skipped,
            kb: HydroMethod::Skipped,
            bm_t: HydroMethod::Skipped,
        }
    }

    /// True when every value came from hydrostatic curves.
    pub fn fully_from_curves(&self) -> bool {
        [self.draft, self.trim, self.kb, self.bm_t].iter().all(|m| *m == HydroMethod::Curves)
    }
}

/// Results of a condition computation.
///
/// Downstream steps attach `validation`, `criteria` and `snapshot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionResults {
    pub displacement_t: f64,
    pub draft_m: f64,
    pub draft_aft_m: f64,
    pub draft_fwd_m: f64,
    /// Positive when G lies forward of B; aft mark = draft + trim / 2
    pub trim_m: f64,
    /// Positive to starboard
    pub heel_deg: f64,
    pub kg_m: f64,
    pub kb_m: f64,
    pub bm_t_m: f64,
    pub km_m: f64,
    /// Uncorrected GM, never negative
    pub gm_m: f64,
    /// Aggregate LCG as a fraction of length, after clamping
    pub lcg_norm: f64,
    pub tcg_m: f64,
    pub path: ComputationPath,
    pub strength: Option<StrengthResult>,
    pub ancillary: Option<AncillaryResults>,
    pub validation: Option<ValidationResult>,
    pub criteria: Option<CriteriaEvaluation>,
    pub snapshot: Option<CalculationSnapshot>,
}

impl ConditionResults {
    /// All-zero results with no computation path.
    pub fn zero() -> Self {
        ConditionResults {
            displacement_t: 0.0,
            draft_m: 0.0,
            draft_aft_m: 0.0,
            draft_fwd_m: 0.0,
            trim_m: 0.0,
            heel_deg: 0.0,
            kg_m: 0.0,
            kb_m: 0.0,
            bm_t_m: 0.0,
            km_m: 0.0,
            gm_m: 0.0,
            lcg_norm: 0.0,
            tcg_m: 0.0,
            path: ComputationPath::skipped(LightshipSource::None),
            strength: None,
            ancillary: None,
            validation: None,
            criteria: None,
            snapshot: None,
        }
    }

    /// GM after free-surface correction when validation has run.
    pub fn gm_effective_m(&self) -> f64 {
        self.validation.as_ref().map(|v| v.gm_effective_m).unwrap_or(self.gm_m)
    }
}

// =============================================================================
// Computation
// =============================================================================

/// Mass and first moments of a set of weights.
#[derive(Debug, Clone, Copy, Default)]
struct WeightSummary {
    mass_t: f64,
    /// Σ m · LCG/L
    lcg_moment: f64,
    vcg_moment: f64,
    tcg_moment: f64,
}

impl WeightSummary {
    fn add(&mut self, mass_t: f64, lcg_norm: f64, vcg_m: f64, tcg_m: f64) {
        self.mass_t += mass_t;
        self.lcg_moment += mass_t * lcg_norm;
        self.vcg_moment += mass_t * vcg_m;
        self.tcg_moment += mass_t * tcg_m;
    }
}

/// Compute the hydrostatic and stability results of a loading condition.
pub fn compute_condition(input: &LoadingInput<'_>) -> ConditionResults {
    let default_limits = StabilityLimits::default();
    let limits = input.limits.unwrap_or(&default_limits);
    let default_reference = ReferenceVessel::default();
    let figures = input.reference.unwrap_or(&default_reference);

    let ship = match input.reference {
        Some(reference) => input.ship.completed_from(reference),
        None => input.ship.clone(),
    };
    let lightship_source = if input.ship.lightship_displacement_t > 0.0 {
        LightshipSource::Ship
    } else if ship.lightship_displacement_t > 0.0 {
        LightshipSource::Reference
    } else {
        LightshipSource::None
    };

    let length = ship.length_overall_m;
    let breadth = ship.breadth_m;
    let norm_length = length.max(1e-6);
    let lightship_mass = ship.lightship_displacement_t.max(0.0);

    // Curves: supplied table, else generated from dimensions
    let generated;
    let (curves, curve_source) = match input.curves {
        Some(c) if c.is_valid() => (Some(c), CurveSource::Tabulated),
        _ => {
            generated = build_curves_from_formulas(
                length,
                breadth,
                ship.design_draft_m,
                input.block_coefficient,
                input.water_density,
                DEFAULT_CURVE_POINTS,
            );
            if generated.is_valid() {
                (Some(&generated), CurveSource::Generated)
            } else {
                debug!(ship = %ship.name, "ship dimensions incomplete, no hydrostatic curves available");
                (None, CurveSource::None)
            }
        }
    };

    // Empty ship floats level: lightship LCG sits over the LCB at lightship draft
    let lightship_lcg_norm = match curves {
        Some(c) if lightship_mass > 0.0 => {
            let draft = if ship.lightship_draft_m > 0.0 {
                ship.lightship_draft_m
            } else {
                c.draft_for_displacement(lightship_mass)
            };
            c.lcb_at(draft).unwrap_or(0.5)
        }
        _ => 0.5,
    };

    let mut weights = WeightSummary::default();
    if lightship_mass > 0.0 {
        weights.add(lightship_mass, lightship_lcg_norm, figures.lightship_kg_m, figures.lightship_tcg_m);
    }

    let volumes = &input.condition.tank_volumes_m3;
    for tank in input.tanks {
        let volume = volumes.get(&tank.id).copied().unwrap_or(0.0);
        let mass = volume * input.cargo_density;
        match input.tank_cog_override.and_then(|o| o.get(&tank.id)) {
            Some(cog) => weights.add(mass, cog.lcg_m / norm_length, cog.vcg_m, cog.tcg_m),
            None => weights.add(mass, tank.longitudinal_position.fraction_of(length), tank.kg_m, tank.tcg_m),
        }
    }

    let pen_loadings = input.pen_loadings();
    for pen in input.pens {
        let heads = pen_loadings.get(&pen.id).copied().unwrap_or(0);
        if heads == 0 {
            continue;
        }
        let mass = f64::from(heads) * input.mass_per_head_t;
        weights.add(mass, pen.lcg_m / norm_length, pen.vcg_m + input.vcg_from_deck_m, pen.tcg_m);
    }

    let strength_input = StrengthInput {
        displacement_t: weights.mass_t,
        length_m: length,
        tanks: input.tanks,
        tank_volumes: volumes,
        cargo_density: input.cargo_density,
        pens: input.pens,
        pen_loadings,
        mass_per_head_t: input.mass_per_head_t,
        lightship_mass_t: lightship_mass,
        lightship_lcg_norm,
        tank_cog_override: input.tank_cog_override,
    };

    if weights.mass_t <= 0.0 {
        return ConditionResults {
            path: ComputationPath::skipped(lightship_source),
            strength: Some(compute_strength(&StrengthInput {
                displacement_t: 0.0,
                ..strength_input
            })),
            ..ConditionResults::zero()
        };
    }

    let displacement = weights.mass_t;
    let lcg_norm = (weights.lcg_moment / displacement).clamp(LCG_NORM_MIN, LCG_NORM_MAX);
    let kg = weights.vcg_moment / displacement;
    let tcg = weights.tcg_moment / displacement;

    let solution = solve_draft_and_trim(displacement, length, breadth, lcg_norm, input.water_density, input.block_coefficient, curves);
    let draft = solution.draft_m;
    let trim = solution.trim_m;

    // A formula draft lies outside the curves; their columns would clamp
    let curves_at_draft = curves.filter(|_| solution.draft_method == HydroMethod::Curves);
    let (kb, kb_method) = kb_at_draft(draft, curves_at_draft);
    let (bm_t, bm_method) = transverse_bm_at(draft, displacement, length, breadth, input.water_density, curves_at_draft);
    let km = kb + bm_t;
    let gm = (km - kg).max(0.0);

    let draft_aft = draft + trim / 2.0;
    let draft_fwd = draft - trim / 2.0;
    let heel = if gm < GM_HEEL_EPS { 0.0 } else { (tcg / gm).atan().to_degrees() };

    let strength = compute_strength(&strength_input);
    let ancillary = compute_ancillary_with_limits(&ship, draft, draft_aft, draft_fwd, trim, gm, heel, limits);

    ConditionResults {
        displacement_t: displacement,
        draft_m: draft,
        draft_aft_m: draft_aft,
        draft_fwd_m: draft_fwd,
        trim_m: trim,
        heel_deg: heel,
        kg_m: kg,
        kb_m: kb,
        bm_t_m: bm_t,
        km_m: km,
        gm_m: gm,
        lcg_norm,
        tcg_m: tcg,
        path: ComputationPath {
            curves: curve_source,
            lightship: lightship_source,
            draft: solution.draft_method,
            trim: solution.trim_method,
            kb: kb_method,
            bm_t: bm_method,
        },
        strength: Some(strength),
        ancillary: Some(ancillary),
        validation: None,
        criteria: None,
        snapshot: None,
    }
}
