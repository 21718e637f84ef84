//! # Longitudinal Strength Estimate
//!
//! A coarse still-water bending moment and shear indicator derived from how
//! far the weight centroid sits from amidships, assuming buoyancy uniformly
//! distributed over the length.
//!
//! ## Assumptions
//!
//! - Uniform buoyancy, LCB at 0.5 L
//! - SWBM ≈ Δ · L · e · 0.25 and SF ≈ Δ · 0.1 · e · 2, with e = |LCG/L − 0.5|
//! - The design limits (Δ · L · 0.12 and Δ · 0.15) are placeholder values for
//!   expressing the estimate as a percentage. They have no classification
//!   society basis and the percentages are informational only.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{LivestockPen, PenId, Tank, TankCog, TankId};

/// Placeholder design bending moment factor (× Δ · L)
pub const DESIGN_BM_FACTOR: f64 = 0.12;

/// Placeholder design shear factor (× Δ)
pub const DESIGN_SF_FACTOR: f64 = 0.15;

/// Weight distribution for the strength estimate.
#[derive(Debug, Clone, Copy)]
pub struct StrengthInput<'a> {
    pub displacement_t: f64,
    pub length_m: f64,
    pub tanks: &'a [Tank],
    pub tank_volumes: &'a BTreeMap<TankId, f64>,
    pub cargo_density: f64,
    pub pens: &'a [LivestockPen],
    pub pen_loadings: &'a BTreeMap<PenId, u32>,
    pub mass_per_head_t: f64,
    pub lightship_mass_t: f64,
    pub lightship_lcg_norm: f64,
    pub tank_cog_override: Option<&'a BTreeMap<TankId, TankCog>>,
}

/// Still-water strength indicators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct StrengthResult {
    /// Signed moment: hogging positive, sagging negative (t·m)
    pub hogging_bm_tm: f64,
    pub shear_force_max_t: f64,
    /// Magnitude of the still-water bending moment estimate (t·m)
    pub still_water_bm_tm: f64,
    /// Placeholder design bending moment (t·m)
    pub design_bm_tm: f64,
    /// Placeholder design shear (t)
    pub design_sf_t: f64,
    pub bm_pct_allow: f64,
    pub sf_pct_allow: f64,
}

impl StrengthResult {
    /// True when the moment estimate is a sagging one.
    pub fn is_sagging(&self) -> bool {
        self.hogging_bm_tm < 0.0
    }
}

/// Estimate still-water bending moment and shear.
///
/// Returns an all-zero result for non-positive length or displacement.
pub fn compute_strength(input: &StrengthInput<'_>) -> StrengthResult {
    let length = input.length_m;
    if length <= 0.0 || input.displacement_t <= 0.0 {
        return StrengthResult::default();
    }
    let half = 0.5 * length;

    // Moments about amidships, positive forward
    let mut total_mass = input.lightship_mass_t;
    let mut moment = if input.lightship_mass_t > 0.0 {
        input.lightship_mass_t * (input.lightship_lcg_norm - 0.5) * length
    } else {
        0.0
    };

    for tank in input.tanks {
        let volume = input.tank_volumes.get(&tank.id).copied().unwrap_or(0.0);
        let mass = volume * input.cargo_density;
        total_mass += mass;
        let lcg_m = match input.tank_cog_override.and_then(|o| o.get(&tank.id)) {
            Some(cog) => cog.lcg_m,
            None => tank.longitudinal_position.metres_from_ap(length),
        };
        moment += (lcg_m - half) * mass;
    }

    for pen in input.pens {
        let heads = input.pen_loadings.get(&pen.id).copied().unwrap_or(0);
        if heads == 0 {
            continue;
        }
        let mass = f64::from(heads) * input.mass_per_head_t;
        total_mass += mass;
        moment += (pen.lcg_m - half) * mass;
    }

    if total_mass <= 0.0 {
        return StrengthResult::default();
    }

    let lcg_norm = (0.5 + (moment / total_mass) / length).clamp(0.0, 1.0);
    let eccentricity = (lcg_norm - 0.5).abs();
    let swbm = input.displacement_t * length * eccentricity * 0.25;
    let sf_max = input.displacement_t * 0.1 * eccentricity * 2.0;

    let design_bm = input.displacement_t * length * DESIGN_BM_FACTOR;
    let design_sf = input.displacement_t * DESIGN_SF_FACTOR;

    StrengthResult {
        hogging_bm_tm: if lcg_norm < 0.5 { swbm } else { -swbm },
        shear_force_max_t: sf_max.abs(),
        still_water_bm_tm: swbm,
        design_bm_tm: design_bm,
        design_sf_t: design_sf,
        bm_pct_allow: if design_bm > 0.0 { 100.0 * swbm / design_bm } else { 0.0 },
        sf_pct_allow: if design_sf > 0.0 { 100.0 * sf_max.abs() / design_sf } else { 0.0 },
    }
}
