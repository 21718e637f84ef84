//! # Ancillary Operational Checks
//!
//! Propeller immersion, forward visibility, air draft and a coarse GZ flag.
//! Geometry the ship record does not provide is taken as a typical
//! proportion of the principal dimensions (see [`AncillaryGeometry`]).
//!
//! The GZ flag (`GM ≥ min GM` and `|heel| < 5°`) is a proxy; the full
//! righting-arm analysis lives in [`crate::gz`].

use serde::{Deserialize, Serialize};

use crate::model::{AncillaryGeometry, Ship};
use crate::settings::{StabilityLimits, EPS};

/// Propeller centre above baseline as a fraction of depth
pub const PROP_CENTRE_DEPTH_RATIO: f64 = 0.05;
/// Propeller diameter as a fraction of length overall
pub const PROP_DIAMETER_LENGTH_RATIO: f64 = 0.03;
/// Bridge position from the AP as a fraction of length overall
pub const BRIDGE_POSITION_RATIO: f64 = 0.85;
/// Bridge eye height as a fraction of depth
pub const BRIDGE_HEIGHT_RATIO: f64 = 1.0;
/// Mast height as a fraction of depth
pub const MAST_HEIGHT_RATIO: f64 = 1.8;

/// Results of the ancillary checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AncillaryResults {
    /// Propeller immersion, 0-100 %
    pub prop_immersion_pct: f64,
    /// Sight-line distance from bridge to the water ahead (m)
    pub visibility_m: f64,
    /// Clearance from waterline to the highest point (m)
    pub air_draft_m: f64,
    pub gz_criteria_ok: bool,
}

/// Propeller immersion as a percentage of diameter, clamped to [0, 100].
pub fn compute_prop_immersion_pct(draft_aft_m: f64, length_m: f64, depth_m: f64, geometry: &AncillaryGeometry) -> f64 {
    if length_m <= 0.0 || depth_m <= 0.0 {
        return 0.0;
    }
    let centre = geometry.prop_centre_height_m.unwrap_or(depth_m * PROP_CENTRE_DEPTH_RATIO);
    let diameter = geometry.prop_diameter_m.unwrap_or(length_m * PROP_DIAMETER_LENGTH_RATIO);
    if diameter <= 0.0 {
        return if draft_aft_m > centre { 100.0 } else { 0.0 };
    }
    let immersion = (draft_aft_m - centre).max(0.0);
    (100.0 * immersion / diameter).clamp(0.0, 100.0)
}

/// Distance ahead of the bridge at which the sight line meets the water.
///
/// Returns the full length overall when the bridge is at or past the bow,
/// when the eye is not above the forward waterline, or when trim is negligible.
pub fn compute_visibility_m(length_m: f64, depth_m: f64, draft_fwd_m: f64, trim_m: f64, geometry: &AncillaryGeometry) -> f64 {
    if length_m <= 0.0 {
        return 0.0;
    }
    let bridge_x = geometry.bridge_from_ap_m.unwrap_or(length_m * BRIDGE_POSITION_RATIO);
    let bridge_h = geometry.bridge_height_m.unwrap_or(depth_m * BRIDGE_HEIGHT_RATIO);

    if length_m - bridge_x <= 0.0 {
        return length_m;
    }
    let height_diff = bridge_h - draft_fwd_m;
    if height_diff <= 0.0 {
        return length_m;
    }
    let trim_angle = (trim_m / length_m).atan();
    if trim_angle.abs() < EPS {
        return length_m;
    }
    (height_diff / trim_angle.tan().abs()).clamp(0.0, length_m)
}

/// Air draft, never negative.
pub fn compute_air_draft_m(depth_m: f64, draft_m: f64, geometry: &AncillaryGeometry) -> f64 {
    let mast = geometry.mast_height_m.unwrap_or(depth_m * MAST_HEIGHT_RATIO);
    (mast - draft_m).max(0.0)
}

/// Run all ancillary checks with default limits.
pub fn compute_ancillary(ship: &Ship, draft_m: f64, draft_aft_m: f64, draft_fwd_m: f64, trim_m: f64, gm_m: f64, heel_deg: f64) -> AncillaryResults {
    compute_ancillary_with_limits(ship, draft_m, draft_aft_m, draft_fwd_m, trim_m, gm_m, heel_deg, &StabilityLimits::default())
}

/// Run all ancillary checks.
#[allow(clippy::too_many_arguments)]
pub fn compute_ancillary_with_limits(
    ship: &Ship,
    draft_m: f64,
    draft_aft_m: f64,
    draft_fwd_m: f64,
    trim_m: f64,
    gm_m: f64,
    heel_deg: f64,
    limits: &StabilityLimits,
) -> AncillaryResults {
    let length = ship.length_overall_m;
    let depth = ship.depth_m;
    let geometry = &ship.ancillary;

    AncillaryResults {
        prop_immersion_pct: compute_prop_immersion_pct(draft_aft_m, length, depth, geometry),
        visibility_m: compute_visibility_m(length, depth, draft_fwd_m, trim_m, geometry),
        air_draft_m: compute_air_draft_m(depth, draft_m, geometry),
        gz_criteria_ok: gm_m >= limits.min_gm_m && heel_deg.abs() < limits.max_gz_flag_heel_deg,
    }
}
