//! # Box-Approximation Hydrostatics
//!
//! Closed-form estimates for a hull described only by its principal
//! dimensions and a block coefficient.
//!
//! Every function returns 0.0 for degenerate input (non-positive length,
//! breadth, density or coefficient) instead of dividing by zero, so a ship
//! record that is still being set up produces displayable zeros.
//!
//! ## Notation
//!
//! - `Δ` = Displacement (t)
//! - `∇` = Displaced volume = Δ/ρ (m³)
//! - `L`, `B`, `T` = Length, breadth, draft (m)
//! - `Cb` = Block coefficient
//! - `ρ` = Water density (t/m³)

/// Empirical KB/T ratio for typical full hull forms
pub const KB_DRAFT_RATIO: f64 = 0.53;

/// Mean draft of a box-coefficient hull
///
/// # Formula
/// T = Δ / (L · B · Cb · ρ)
#[inline]
pub fn draft_from_displacement(displacement_t: f64, length_m: f64, breadth_m: f64, block_coefficient: f64, density: f64) -> f64 {
    let divisor = length_m * breadth_m * block_coefficient * density;
    if length_m <= 0.0 || breadth_m <= 0.0 || block_coefficient <= 0.0 || density <= 0.0 || divisor <= 0.0 {
        return 0.0;
    }
    displacement_t / divisor
}

/// Displacement of a box-coefficient hull at a given draft
///
/// # Formula
/// Δ = L · B · T · Cb · ρ
#[inline]
pub fn displacement_from_draft(draft_m: f64, length_m: f64, breadth_m: f64, block_coefficient: f64, density: f64) -> f64 {
    if length_m <= 0.0 || breadth_m <= 0.0 || block_coefficient <= 0.0 || density <= 0.0 {
        return 0.0;
    }
    length_m * breadth_m * draft_m * block_coefficient * density
}

/// Vertical centre of buoyancy above baseline
///
/// # Formula
/// KB = 0.53 · T
#[inline]
pub fn kb_from_draft(draft_m: f64) -> f64 {
    KB_DRAFT_RATIO * draft_m
}

/// Transverse metacentric radius of the rectangular waterplane
///
/// # Formula
/// BM_T = (L · B³ / 12) / ∇
#[inline]
pub fn transverse_bm(displacement_t: f64, length_m: f64, breadth_m: f64, density: f64) -> f64 {
    if displacement_t <= 0.0 || density <= 0.0 {
        return 0.0;
    }
    let i_t = length_m * breadth_m.powi(3) / 12.0;
    i_t / (displacement_t / density)
}

/// Longitudinal metacentric radius of the rectangular waterplane
///
/// # Formula
/// BM_L = (B · L³ / 12) / ∇
#[inline]
pub fn longitudinal_bm(displacement_t: f64, length_m: f64, breadth_m: f64, density: f64) -> f64 {
    if displacement_t <= 0.0 || density <= 0.0 {
        return 0.0;
    }
    let i_l = breadth_m * length_m.powi(3) / 12.0;
    i_l / (displacement_t / density)
}

/// Moment to change trim from a longitudinal metacentric radius
///
/// # Formula
/// MTC = Δ · BM_L / (L · 100)
#[inline]
pub fn moment_to_change_trim(displacement_t: f64, bm_l: f64, length_m: f64) -> f64 {
    if length_m <= 0.0 {
        return 0.0;
    }
    displacement_t * bm_l / (length_m * 100.0)
}

/// Trim from the longitudinal separation of G and B
///
/// # Formula
/// trim = (LCG − LCB) · Δ / MTC, with LCG and LCB in metres from the AP
///
/// # Arguments
/// * `lcg_norm` - LCG as a fraction of length
/// * `lcb_norm` - LCB as a fraction of length (0.5 when unknown)
///
/// # Returns
/// Trim in metres, positive when LCG is forward of LCB; 0.0 when BM_L or MTC is not positive
#[inline]
pub fn trim_from_lcg_lcb(displacement_t: f64, lcg_norm: f64, length_m: f64, breadth_m: f64, density: f64, lcb_norm: f64) -> f64 {
    let bm_l = longitudinal_bm(displacement_t, length_m, breadth_m, density);
    trim_from_bm_l(displacement_t, lcg_norm, lcb_norm, length_m, bm_l)
}

/// Trim from a known longitudinal metacentric radius.
#[inline]
pub fn trim_from_bm_l(displacement_t: f64, lcg_norm: f64, lcb_norm: f64, length_m: f64, bm_l: f64) -> f64 {
    if bm_l <= 0.0 {
        return 0.0;
    }
    let mtc = moment_to_change_trim(displacement_t, bm_l, length_m);
    if mtc <= 0.0 {
        return 0.0;
    }
    let lcg_m = lcg_norm * length_m;
    let lcb_m = lcb_norm * length_m;
    (lcg_m - lcb_m) * displacement_t / mtc
}
