//! # Hydrostatic Curves
//!
//! Parallel columns keyed by draft: displacement, KB, LCB, waterplane area
//! and waterplane inertias. Curves come from three places:
//!
//! - [`build_curves_from_formulas`] for a ship with only principal dimensions
//! - [`build_curves_from_waterplanes`] for sectioned waterplane data
//! - JSON tables supplied by the ship's documentation, cleaned with
//!   [`HydrostaticCurves::sanitized`]
//!
//! Interpolation never extrapolates: values outside the tabulated range are
//! clamped to the first or last point.
//!
//! ## Example
//!
//! ```rust
//! use stability_core::hydrostatics::build_curves_from_formulas;
//!
//! let curves = build_curves_from_formulas(150.0, 25.0, 10.0, 0.63, 1.025, 25);
//! assert!(curves.is_valid());
//!
//! let draft = curves.draft_for_displacement(12_000.0);
//! assert!(draft > 4.9 && draft < 5.0);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::formulas::{displacement_from_draft, kb_from_draft};
use crate::settings::EPS;

/// Default number of draft stations for generated curves
pub const DEFAULT_CURVE_POINTS: usize = 25;

/// Hydrostatic particulars tabulated against draft.
///
/// Only `draft_m` and `displacement_t` are required; the other columns are
/// optional and are ignored when their length does not match the draft column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HydrostaticCurves {
    /// Draft stations (m), ascending
    pub draft_m: Vec<f64>,
    pub displacement_t: Vec<f64>,
    /// Vertical centre of buoyancy (m)
    pub kb_m: Vec<f64>,
    /// Longitudinal centre of buoyancy as a fraction of length
    pub lcb_norm: Vec<f64>,
    /// Waterplane area (m²)
    pub awp_m2: Vec<f64>,
    /// Transverse waterplane inertia (m⁴)
    pub i_t_m4: Vec<f64>,
    /// Longitudinal waterplane inertia (m⁴)
    pub i_l_m4: Vec<f64>,
}

impl HydrostaticCurves {
    /// At least two stations, a matching displacement column and no negative drafts.
    pub fn is_valid(&self) -> bool {
        self.draft_m.len() >= 2 && self.displacement_t.len() == self.draft_m.len() && self.draft_m.iter().all(|&d| d >= 0.0)
    }

    /// Drop optional columns whose length does not match the draft column.
    pub fn sanitized(mut self) -> Self {
        let n = self.draft_m.len();
        for (name, column) in [
            ("kb_m", &mut self.kb_m),
            ("lcb_norm", &mut self.lcb_norm),
            ("awp_m2", &mut self.awp_m2),
            ("i_t_m4", &mut self.i_t_m4),
            ("i_l_m4", &mut self.i_l_m4),
        ] {
            if !column.is_empty() && column.len() != n {
                debug!(column = name, len = column.len(), expected = n, "dropping mismatched hydrostatic column");
                column.clear();
            }
        }
        self
    }

    fn column_at(&self, column: &[f64], draft_m: f64) -> Option<f64> {
        if column.is_empty() || column.len() != self.draft_m.len() {
            return None;
        }
        Some(interpolate(draft_m, &self.draft_m, column))
    }

    /// Draft at which the displacement curve reaches `displacement_t`.
    ///
    /// Returns 0.0 for invalid curves or non-positive displacement.
    pub fn draft_for_displacement(&self, displacement_t: f64) -> f64 {
        if !self.is_valid() || displacement_t <= 0.0 {
            return 0.0;
        }
        interpolate_inverse(displacement_t, &self.draft_m, &self.displacement_t)
    }

    /// Displacement at a draft, `None` for invalid curves.
    pub fn displacement_at(&self, draft_m: f64) -> Option<f64> {
        if !self.is_valid() {
            return None;
        }
        Some(interpolate(draft_m, &self.draft_m, &self.displacement_t))
    }

    /// Largest tabulated displacement, `None` for invalid curves.
    pub fn max_displacement(&self) -> Option<f64> {
        if !self.is_valid() {
            return None;
        }
        self.displacement_t.iter().copied().reduce(f64::max)
    }

    pub fn kb_at(&self, draft_m: f64) -> Option<f64> {
        self.column_at(&self.kb_m, draft_m)
    }

    pub fn lcb_at(&self, draft_m: f64) -> Option<f64> {
        self.column_at(&self.lcb_norm, draft_m)
    }

    pub fn awp_at(&self, draft_m: f64) -> Option<f64> {
        self.column_at(&self.awp_m2, draft_m)
    }

    pub fn i_t_at(&self, draft_m: f64) -> Option<f64> {
        self.column_at(&self.i_t_m4, draft_m)
    }

    pub fn i_l_at(&self, draft_m: f64) -> Option<f64> {
        self.column_at(&self.i_l_m4, draft_m)
    }

    /// Number of draft stations
    pub fn len(&self) -> usize {
        self.draft_m.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draft_m.is_empty()
    }
}

/// Linear interpolation of `ys` at `x`, clamped to the end points.
///
/// Returns 0.0 for empty or mismatched columns.
pub fn interpolate(x: f64, xs: &[f64], ys: &[f64]) -> f64 {
    if xs.is_empty() || xs.len() != ys.len() {
        return 0.0;
    }
    let last = xs.len() - 1;
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[last] {
        return ys[last];
    }
    for i in 0..last {
        if xs[i] <= x && x <= xs[i + 1] {
            let t = if xs[i + 1] != xs[i] { (x - xs[i]) / (xs[i + 1] - xs[i]) } else { 0.0 };
            return ys[i] + t * (ys[i + 1] - ys[i]);
        }
    }
    ys[last]
}

/// Inverse interpolation: the `x` at which the tabulated `ys` reaches `y`.
///
/// Searches for the first interval whose value range contains `y`; an
/// interval with equal end values resolves to its left boundary.
pub fn interpolate_inverse(y: f64, xs: &[f64], ys: &[f64]) -> f64 {
    if xs.is_empty() || xs.len() != ys.len() {
        return 0.0;
    }
    let last = ys.len() - 1;
    if y <= ys[0] {
        return xs[0];
    }
    if y >= ys[last] {
        return xs[last];
    }
    for i in 0..last {
        let (lo, hi) = (ys[i].min(ys[i + 1]), ys[i].max(ys[i + 1]));
        if lo <= y && y <= hi {
            let t = if ys[i + 1] != ys[i] { (y - ys[i]) / (ys[i + 1] - ys[i]) } else { 0.0 };
            return xs[i] + t * (xs[i + 1] - xs[i]);
        }
    }
    xs[last]
}

/// Generate curves for a box-coefficient hull.
///
/// Drafts are evenly spaced from 0 to the design draft. KB follows the formula
/// library, LCB is fixed at amidships and the waterplane inertias are those of
/// the L × B rectangle. Returns empty (invalid) curves for non-positive
/// dimensions or fewer than two points.
pub fn build_curves_from_formulas(
    length_m: f64,
    breadth_m: f64,
    design_draft_m: f64,
    block_coefficient: f64,
    density: f64,
    n_points: usize,
) -> HydrostaticCurves {
    if length_m <= 0.0 || breadth_m <= 0.0 || design_draft_m <= 0.0 || block_coefficient <= 0.0 || density <= 0.0 || n_points < 2 {
        return HydrostaticCurves::default();
    }

    let i_t = length_m * breadth_m.powi(3) / 12.0;
    let i_l = breadth_m * length_m.powi(3) / 12.0;
    let awp = length_m * breadth_m;

    let mut curves = HydrostaticCurves::default();
    for i in 0..n_points {
        let draft = design_draft_m * (i as f64 / (n_points - 1) as f64);
        curves.draft_m.push(draft);
        curves
            .displacement_t
            .push(displacement_from_draft(draft, length_m, breadth_m, block_coefficient, density));
        curves.kb_m.push(kb_from_draft(draft));
        curves.lcb_norm.push(0.5);
        curves.awp_m2.push(awp);
        curves.i_t_m4.push(i_t);
        curves.i_l_m4.push(i_l);
    }
    curves
}

/// Waterplane section properties at one draft station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Waterplane {
    pub draft_m: f64,
    pub area_m2: f64,
    /// Centre of flotation from the aft perpendicular (m)
    pub lcf_m: f64,
    pub i_t_m4: f64,
    pub i_l_m4: f64,
}

/// Integrate waterplane sections upward to displacement, KB and LCB.
///
/// Sections must be ordered by ascending draft, starting at the keel.
/// Volumes use the trapezoidal rule between stations.
pub fn build_curves_from_waterplanes(sections: &[Waterplane], length_m: f64, density: f64) -> HydrostaticCurves {
    if sections.len() < 2 || length_m <= 0.0 || density <= 0.0 {
        return HydrostaticCurves::default();
    }

    let mut curves = HydrostaticCurves::default();
    let mut volume = 0.0;
    let mut vertical_moment = 0.0;
    let mut longitudinal_moment = 0.0;

    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            let prev = &sections[i - 1];
            let dz = section.draft_m - prev.draft_m;
            volume += 0.5 * (section.area_m2 + prev.area_m2) * dz;
            vertical_moment += 0.5 * (section.draft_m * section.area_m2 + prev.draft_m * prev.area_m2) * dz;
            longitudinal_moment += 0.5 * (section.lcf_m * section.area_m2 + prev.lcf_m * prev.area_m2) * dz;
        }

        curves.draft_m.push(section.draft_m);
        curves.displacement_t.push(volume * density);
        if volume > EPS {
            curves.kb_m.push(vertical_moment / volume);
            curves.lcb_norm.push((longitudinal_moment / volume / length_m).clamp(0.0, 1.0));
        } else {
            curves.kb_m.push(0.0);
            curves.lcb_norm.push(0.5);
        }
        curves.awp_m2.push(section.area_m2);
        curves.i_t_m4.push(section.i_t_m4);
        curves.i_l_m4.push(section.i_l_m4);
    }
    curves
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity() {
        assert!(!HydrostaticCurves::default().is_valid());

        let one_point = HydrostaticCurves {
            draft_m: vec![1.0],
            displacement_t: vec![100.0],
            ..Default::default()
        };
        assert!(!one_point.is_valid());

        let mismatched = HydrostaticCurves {
            draft_m: vec![0.0, 1.0, 2.0],
            displacement_t: vec![0.0, 100.0],
            ..Default::default()
        };
        assert!(!mismatched.is_valid());

        let negative = HydrostaticCurves {
            draft_m: vec![-1.0, 1.0],
            displacement_t: vec![0.0, 100.0],
            ..Default::default()
        };
        assert!(!negative.is_valid());
    }

    #[test]
    fn test_forward_interpolation_clamps() {
        let xs = [0.0, 2.0, 4.0];
        let ys = [10.0, 20.0, 40.0];
        assert_eq!(interpolate(-1.0, &xs, &ys), 10.0);
        assert_eq!(interpolate(5.0, &xs, &ys), 40.0);
        assert!((interpolate(3.0, &xs, &ys) - 30.0).abs() < 1e-12);
        assert_eq!(interpolate(1.0, &[], &[]), 0.0);
    }

    #[test]
    fn test_inverse_interpolation() {
        let xs = [0.0, 2.0, 4.0];
        let ys = [0.0, 100.0, 300.0];
        assert!((interpolate_inverse(200.0, &xs, &ys) - 3.0).abs() < 1e-12);
        assert_eq!(interpolate_inverse(-5.0, &xs, &ys), 0.0);
        assert_eq!(interpolate_inverse(400.0, &xs, &ys), 4.0);
    }

    #[test]
    fn test_inverse_interpolation_flat_segment() {
        // Target inside a flat run resolves in the first interval touching it
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [0.0, 50.0, 50.0, 80.0];
        assert!((interpolate_inverse(50.0, &xs, &ys) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_formula_curves() {
        let curves = build_curves_from_formulas(150.0, 25.0, 10.0, 0.63, 1.025, DEFAULT_CURVE_POINTS);
        assert_eq!(curves.len(), 25);
        assert_eq!(curves.draft_m[0], 0.0);
        assert!((curves.draft_m[24] - 10.0).abs() < 1e-12);
        assert_eq!(curves.lcb_at(4.0), Some(0.5));
        assert!((curves.kb_at(4.0).unwrap() - 2.12).abs() < 1e-9);
        assert!((curves.i_t_at(3.3).unwrap() - 195_312.5).abs() < 1e-6);

        // Linear displacement curve inverts exactly
        let draft = curves.draft_for_displacement(20_000.0);
        assert!((draft - 20_000.0 / (150.0 * 25.0 * 0.63 * 1.025)).abs() < 1e-9);
    }

    #[test]
    fn test_formula_curves_degenerate() {
        assert!(build_curves_from_formulas(0.0, 25.0, 10.0, 0.63, 1.025, 25).is_empty());
        assert!(build_curves_from_formulas(150.0, 25.0, 0.0, 0.63, 1.025, 25).is_empty());
        assert!(build_curves_from_formulas(150.0, 25.0, 10.0, 0.63, 1.025, 1).is_empty());
    }

    #[test]
    fn test_sanitized_drops_bad_columns() {
        let json = r#"{
            "draft_m": [0.0, 2.0, 4.0],
            "displacement_t": [0.0, 1000.0, 2100.0],
            "kb_m": [0.0, 1.1],
            "lcb_norm": [0.5, 0.49, 0.48]
        }"#;
        let curves: HydrostaticCurves = serde_json::from_str(json).unwrap();
        let curves = curves.sanitized();
        assert!(curves.is_valid());
        assert!(curves.kb_m.is_empty());
        assert!(curves.kb_at(1.0).is_none());
        assert!((curves.lcb_at(3.0).unwrap() - 0.485).abs() < 1e-12);
    }

    #[test]
    fn test_waterplane_integration_matches_box() {
        // Box barge 100 x 20: constant 2000 m² waterplane centred at 50 m
        let sections: Vec<Waterplane> = (0..=4)
            .map(|i| Waterplane {
                draft_m: i as f64,
                area_m2: 2000.0,
                lcf_m: 50.0,
                i_t_m4: 100.0 * 20.0_f64.powi(3) / 12.0,
                i_l_m4: 20.0 * 100.0_f64.powi(3) / 12.0,
            })
            .collect();
        let curves = build_curves_from_waterplanes(&sections, 100.0, 1.0);
        assert!(curves.is_valid());
        assert!((curves.displacement_t[4] - 8000.0).abs() < 1e-9);
        assert!((curves.kb_m[4] - 2.0).abs() < 1e-9);
        assert!((curves.lcb_norm[2] - 0.5).abs() < 1e-12);
        assert_eq!(curves.kb_m[0], 0.0);
    }
}
