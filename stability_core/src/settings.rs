//! # Settings and Reference Data
//!
//! Physical constants, criteria limits and the reference vessel used when a
//! ship record is only partially configured.
//!
//! Limits are grouped in [`StabilityLimits`] so a project file can carry its
//! own set; every evaluator has a variant taking the limits explicitly and a
//! plain variant using `StabilityLimits::default()`.
//!
//! ## Example
//!
//! ```rust
//! use stability_core::settings::StabilityLimits;
//!
//! let limits = StabilityLimits::default();
//! assert_eq!(limits.min_gm_m, 0.15);
//! assert!((limits.gm_marginal_m() - 0.225).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};

/// Numerical tolerance shared by every module
pub const EPS: f64 = 1e-9;

/// Seawater density (t/m³)
pub const RHO_SEA: f64 = 1.025;

/// Vessel-calibrated block coefficient for the box approximation
pub const DEFAULT_BLOCK_COEFFICIENT: f64 = 0.63;

/// Gravitational acceleration (m/s²)
pub const GRAVITY: f64 = 9.81;

/// Roll radius of gyration as a fraction of breadth
pub const ROLL_GYRATION_RATIO: f64 = 0.45;

/// Default live mass per head of cattle (t)
pub const DEFAULT_MASS_PER_HEAD_T: f64 = 0.5;

/// Regulatory references printed on criteria lines.
pub mod criteria_ref {
    /// Intact Stability Code, general criteria
    pub const IS_CODE_CH2: &str = "IS Code Ch.2";
    /// Intact Stability Code
    pub const IS_CODE: &str = "IS Code";
    /// International Convention on Load Lines
    pub const LOAD_LINE: &str = "Load Line";
    /// Livestock GM requirement
    pub const AMSA_IMO_LIVESTOCK: &str = "AMSA MO43 / IMO Livestock";
    /// Marine Order 43 (livestock)
    pub const AMSA_MO43: &str = "AMSA MO43";
    /// Navigation bridge visibility
    pub const SOLAS: &str = "SOLAS";
    /// Owner/operator practice
    pub const OPERATIONAL: &str = "Operational";
}

/// Criteria and validation limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityLimits {
    /// Minimum effective GM (m)
    pub min_gm_m: f64,

    /// Minimum effective GM with livestock aboard (m)
    pub min_gm_livestock_m: f64,

    /// GM below `min_gm_m * gm_marginal_factor` is reported as marginal
    pub gm_marginal_factor: f64,

    /// Maximum natural roll period (s)
    pub max_roll_period_s: f64,

    /// Minimum freeboard to the weather deck (m)
    pub min_freeboard_m: f64,

    /// Maximum |trim| as a fraction of length overall
    pub max_trim_fraction: f64,

    /// Maximum mean draft as a fraction of design draft
    pub max_draft_fraction: f64,

    /// Maximum still-water bending moment as a fraction of the design limit
    pub max_swbm_fraction: f64,

    /// Minimum propeller immersion (%)
    pub min_prop_immersion_pct: f64,

    /// Minimum forward visibility (m)
    pub min_visibility_m: f64,

    /// Minimum air draft (m)
    pub min_air_draft_m: f64,

    /// Maximum heel for the simplified GZ flag (degrees)
    pub max_gz_flag_heel_deg: f64,
}

impl StabilityLimits {
    /// Effective GM below which a GM_MARGINAL warning is raised.
    pub fn gm_marginal_m(&self) -> f64 {
        self.min_gm_m * self.gm_marginal_factor
    }
}

impl Default for StabilityLimits {
    fn default() -> Self {
        StabilityLimits {
            min_gm_m: 0.15,
            min_gm_livestock_m: 0.20,
            gm_marginal_factor: 1.5,
            max_roll_period_s: 15.0,
            min_freeboard_m: 0.3,
            max_trim_fraction: 0.02,
            max_draft_fraction: 1.05,
            max_swbm_fraction: 1.0,
            min_prop_immersion_pct: 60.0,
            min_visibility_m: 1.0,
            min_air_draft_m: 5.0,
            max_gz_flag_heel_deg: 5.0,
        }
    }
}

/// Reference vessel figures from the stability manual.
///
/// Used to complete a ship record that has no lightship data or no principal
/// dimensions yet, when the caller opts in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceVessel {
    pub length_overall_m: f64,
    pub length_bp_m: f64,
    pub breadth_m: f64,
    pub depth_m: f64,
    pub design_draft_m: f64,
    pub lightship_draft_m: f64,
    pub lightship_displacement_t: f64,
    /// Lightship VCG above baseline (m)
    pub lightship_kg_m: f64,
    /// Lightship LCG from the aft perpendicular (m)
    pub lightship_lcg_m: f64,
    pub lightship_tcg_m: f64,
}

impl ReferenceVessel {
    /// Lightship LCG as a 0-1 fraction of length overall.
    pub fn lightship_lcg_norm(&self) -> f64 {
        if self.length_overall_m > EPS {
            self.lightship_lcg_m / self.length_overall_m
        } else {
            0.5
        }
    }
}

impl Default for ReferenceVessel {
    fn default() -> Self {
        ReferenceVessel {
            length_overall_m: 118.02,
            length_bp_m: 110.04,
            breadth_m: 19.40,
            depth_m: 9.45,
            design_draft_m: 7.60,
            lightship_draft_m: 4.188,
            lightship_displacement_t: 5076.0,
            lightship_kg_m: 7.79,
            lightship_lcg_m: 47.72,
            lightship_tcg_m: 0.0,
        }
    }
}

/// Per-project defaults persisted with the project file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    /// Density applied to tank volumes (t/m³)
    pub cargo_density_t_per_m3: f64,

    /// Mass per head for pens with no cargo type (t)
    pub mass_per_head_t: f64,

    /// VCG of livestock above the pen deck (m)
    pub vcg_from_deck_m: f64,

    /// Complete missing ship data from the reference vessel
    pub use_reference_vessel: bool,

    pub limits: StabilityLimits,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        ProjectSettings {
            cargo_density_t_per_m3: 1.0,
            mass_per_head_t: DEFAULT_MASS_PER_HEAD_T,
            vcg_from_deck_m: 0.0,
            use_reference_vessel: false,
            limits: StabilityLimits::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_lcg_norm() {
        let reference = ReferenceVessel::default();
        let norm = reference.lightship_lcg_norm();
        assert!((norm - 47.72 / 118.02).abs() < 1e-12);
        assert!(norm > 0.4 && norm < 0.41);
    }

    #[test]
    fn test_limits_partial_json_uses_defaults() {
        let limits: StabilityLimits = serde_json::from_str(r#"{"min_gm_m": 0.30}"#).unwrap();
        assert_eq!(limits.min_gm_m, 0.30);
        assert_eq!(limits.min_air_draft_m, 5.0);
        assert!((limits.gm_marginal_m() - 0.45).abs() < 1e-12);
    }
}
