//! # Free-Surface Correction and Condition Validation
//!
//! Applies the free-surface correction to GM and runs rule checks on a
//! computed condition. Problems are returned as severity-tagged issues; the
//! checks never fail.
//!
//! The correction is only taken from free-surface moments supplied by tank
//! sounding tables. Without them the correction is zero; it is never
//! estimated from tank geometry.
//!
//! ## Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use stability_core::calculations::validation::compute_free_surface_correction;
//! use stability_core::model::Tank;
//!
//! let tanks = vec![Tank::new(1, "DB1", 100.0, 0.5, 1.0)];
//! let volumes = BTreeMap::from([(1, 50.0)]);
//! let fsm = BTreeMap::from([(1, 400.0)]);
//!
//! let fsc = compute_free_surface_correction(&tanks, &volumes, 2000.0, Some(&fsm));
//! assert!((fsc - 0.2).abs() < 1e-12);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::condition::ConditionResults;
use crate::model::{Ship, Tank, TankId};
use crate::settings::{StabilityLimits, EPS};

/// Tanks filled above this ratio are slack
pub const SLACK_FILL_MIN: f64 = 0.05;

/// Tanks filled below this ratio are slack
pub const SLACK_FILL_MAX: f64 = 0.95;

/// Placeholder design bending moment used by the BM_OVER check (× Δ · L)
pub const VALIDATION_BM_FACTOR: f64 = 0.1;

/// Minimum length/draft for a dimension to count as configured (m)
const KNOWN_DIMENSION_M: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Ok,
    Warning,
    Error,
}

/// Validation rule identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    GmLow,
    GmMarginal,
    TrimExcessive,
    DraftOver,
    BmOver,
    ZeroWeight,
    TankUnknown,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::GmLow => "GM_LOW",
            IssueCode::GmMarginal => "GM_MARGINAL",
            IssueCode::TrimExcessive => "TRIM_EXCESSIVE",
            IssueCode::DraftOver => "DRAFT_OVER",
            IssueCode::BmOver => "BM_OVER",
            IssueCode::ZeroWeight => "ZERO_WEIGHT",
            IssueCode::TankUnknown => "TANK_UNKNOWN",
        }
    }
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub severity: Severity,
    pub message: String,
    pub value: Option<f64>,
    pub limit: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// No ERROR-severity issue present
    pub valid: bool,
    /// GM after free-surface correction, never negative (m)
    pub gm_effective_m: f64,
    pub free_surface_correction_m: f64,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Warning)
    }

    pub fn has_issue(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }
}

/// Free-surface GM correction (m) from sounding-table free-surface moments.
///
/// Only slack tanks (fill strictly between 5% and 95%) with a positive
/// moment contribute. Returns 0.0 without moment data or displacement.
pub fn compute_free_surface_correction(
    tanks: &[Tank],
    volumes: &BTreeMap<TankId, f64>,
    displacement_t: f64,
    tank_fsm: Option<&BTreeMap<TankId, f64>>,
) -> f64 {
    let Some(tank_fsm) = tank_fsm else {
        return 0.0;
    };
    if displacement_t < EPS {
        return 0.0;
    }

    let total_fsm: f64 = tanks
        .iter()
        .filter(|tank| {
            let fill = tank.fill_ratio(volumes.get(&tank.id).copied().unwrap_or(0.0));
            SLACK_FILL_MIN < fill && fill < SLACK_FILL_MAX
        })
        .filter_map(|tank| tank_fsm.get(&tank.id).copied())
        .filter(|&fsm| fsm > 0.0)
        .sum();

    total_fsm / displacement_t
}

/// Validate a computed condition with default limits.
pub fn validate_condition(
    ship: &Ship,
    results: &ConditionResults,
    tanks: &[Tank],
    volumes: &BTreeMap<TankId, f64>,
    tank_fsm: Option<&BTreeMap<TankId, f64>>,
) -> ValidationResult {
    validate_condition_with_limits(ship, results, tanks, volumes, tank_fsm, &StabilityLimits::default())
}

/// Validate a computed condition.
pub fn validate_condition_with_limits(
    ship: &Ship,
    results: &ConditionResults,
    tanks: &[Tank],
    volumes: &BTreeMap<TankId, f64>,
    tank_fsm: Option<&BTreeMap<TankId, f64>>,
    limits: &StabilityLimits,
) -> ValidationResult {
    let mut issues = Vec::new();

    let fsc = compute_free_surface_correction(tanks, volumes, results.displacement_t, tank_fsm);
    let gm_effective = (results.gm_m - fsc).max(0.0);

    if gm_effective < limits.min_gm_m {
        issues.push(ValidationIssue {
            code: IssueCode::GmLow,
            severity: Severity::Error,
            message: format!("GM {:.3} m below minimum {} m. Condition unsafe.", gm_effective, limits.min_gm_m),
            value: Some(gm_effective),
            limit: Some(limits.min_gm_m),
        });
    } else if gm_effective < limits.gm_marginal_m() {
        issues.push(ValidationIssue {
            code: IssueCode::GmMarginal,
            severity: Severity::Warning,
            message: format!("GM {:.3} m is marginal. Minimum recommended: {} m.", gm_effective, limits.min_gm_m),
            value: Some(gm_effective),
            limit: Some(limits.min_gm_m),
        });
    }

    let length = ship.length_overall_m;
    if length > KNOWN_DIMENSION_M {
        let max_trim = length * limits.max_trim_fraction;
        if results.trim_m.abs() > max_trim {
            issues.push(ValidationIssue {
                code: IssueCode::TrimExcessive,
                severity: Severity::Error,
                message: format!(
                    "Trim {:.2} m exceeds limit {:.2} m ({:.1}% LOA).",
                    results.trim_m,
                    max_trim,
                    limits.max_trim_fraction * 100.0
                ),
                value: Some(results.trim_m.abs()),
                limit: Some(max_trim),
            });
        }
    }

    let design_draft = ship.design_draft_m;
    if design_draft > KNOWN_DIMENSION_M {
        let max_draft = design_draft * limits.max_draft_fraction;
        if results.draft_m > max_draft {
            issues.push(ValidationIssue {
                code: IssueCode::DraftOver,
                severity: Severity::Error,
                message: format!(
                    "Draft {:.2} m exceeds {:.0}% of design draft {:.2} m.",
                    results.draft_m,
                    limits.max_draft_fraction * 100.0,
                    design_draft
                ),
                value: Some(results.draft_m),
                limit: Some(max_draft),
            });
        }
    }

    if let Some(strength) = &results.strength {
        let swbm = strength.still_water_bm_tm.abs();
        let design_bm = results.displacement_t * length * VALIDATION_BM_FACTOR;
        if design_bm > EPS && swbm > design_bm * limits.max_swbm_fraction {
            issues.push(ValidationIssue {
                code: IssueCode::BmOver,
                severity: Severity::Warning,
                message: format!("Still-water BM {:.0} tm may exceed design limits. Verify strength.", swbm),
                value: Some(swbm),
                limit: Some(design_bm),
            });
        }
    }

    if results.displacement_t < EPS {
        issues.push(ValidationIssue {
            code: IssueCode::ZeroWeight,
            severity: Severity::Warning,
            message: "Zero displacement. No cargo/ballast loaded.".to_string(),
            value: Some(0.0),
            limit: None,
        });
    }

    let known: BTreeSet<TankId> = tanks.iter().map(|t| t.id).collect();
    for (&tank_id, &volume) in volumes {
        if !known.contains(&tank_id) && volume > EPS {
            issues.push(ValidationIssue {
                code: IssueCode::TankUnknown,
                severity: Severity::Warning,
                message: format!("Volume specified for unknown tank ID {}. Ignored in calculations.", tank_id),
                value: Some(volume),
                limit: None,
            });
        }
    }

    let valid = !issues.iter().any(|i| i.severity == Severity::Error);
    ValidationResult {
        valid,
        gm_effective_m: gm_effective,
        free_surface_correction_m: fsc,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::strength::StrengthResult;

    fn results(displacement_t: f64, draft_m: f64, trim_m: f64, gm_m: f64) -> ConditionResults {
        ConditionResults {
            displacement_t,
            draft_m,
            trim_m,
            gm_m,
            ..ConditionResults::zero()
        }
    }

    fn fsm_setup() -> (Vec<Tank>, BTreeMap<TankId, f64>) {
        (vec![Tank::new(1, "FW1", 100.0, 0.5, 1.0)], BTreeMap::from([(1, 500.0)]))
    }

    #[test]
    fn test_no_fsm_data_means_no_correction() {
        let (tanks, _) = fsm_setup();
        let volumes = BTreeMap::from([(1, 50.0)]);
        assert_eq!(compute_free_surface_correction(&tanks, &volumes, 1000.0, None), 0.0);
    }

    #[test]
    fn test_fsc_decreases_with_displacement() {
        let (tanks, fsm) = fsm_setup();
        let volumes = BTreeMap::from([(1, 50.0)]);
        let mut previous = f64::INFINITY;
        for displacement in [500.0, 1000.0, 2000.0, 8000.0] {
            let fsc = compute_free_surface_correction(&tanks, &volumes, displacement, Some(&fsm));
            assert!(fsc < previous);
            previous = fsc;
        }
        assert_eq!(compute_free_surface_correction(&tanks, &volumes, 0.0, Some(&fsm)), 0.0);
    }

    #[test]
    fn test_fsc_zero_outside_slack_band() {
        let (tanks, fsm) = fsm_setup();
        for volume in [0.0, 3.0, 5.0, 95.0, 99.0, 100.0] {
            let volumes = BTreeMap::from([(1, volume)]);
            assert_eq!(compute_free_surface_correction(&tanks, &volumes, 1000.0, Some(&fsm)), 0.0);
        }
        let volumes = BTreeMap::from([(1, 5.5)]);
        assert!(compute_free_surface_correction(&tanks, &volumes, 1000.0, Some(&fsm)) > 0.0);
    }

    #[test]
    fn test_negative_fsm_ignored() {
        let (tanks, _) = fsm_setup();
        let volumes = BTreeMap::from([(1, 50.0)]);
        let fsm = BTreeMap::from([(1, -200.0)]);
        assert_eq!(compute_free_surface_correction(&tanks, &volumes, 1000.0, Some(&fsm)), 0.0);
    }

    #[test]
    fn test_gm_low_and_marginal() {
        let ship = Ship::new("Test", 150.0, 25.0, 15.0, 10.0);
        let none = BTreeMap::new();

        let low = validate_condition(&ship, &results(10_000.0, 5.0, 0.0, 0.10), &[], &none, None);
        assert!(!low.valid);
        let issue = &low.issues[0];
        assert_eq!(issue.code, IssueCode::GmLow);
        assert_eq!(issue.severity, Severity::Error);
        assert_eq!(issue.message, "GM 0.100 m below minimum 0.15 m. Condition unsafe.");

        let marginal = validate_condition(&ship, &results(10_000.0, 5.0, 0.0, 0.20), &[], &none, None);
        assert!(marginal.valid);
        assert!(marginal.has_issue(IssueCode::GmMarginal));
        assert!(!marginal.has_issue(IssueCode::GmLow));

        let fine = validate_condition(&ship, &results(10_000.0, 5.0, 0.0, 1.0), &[], &none, None);
        assert!(fine.issues.is_empty());
    }

    #[test]
    fn test_fsc_reduces_effective_gm() {
        let ship = Ship::new("Test", 150.0, 25.0, 15.0, 10.0);
        let (tanks, fsm) = fsm_setup();
        let volumes = BTreeMap::from([(1, 50.0)]);
        // 500 t·m / 1000 t = 0.5 m correction
        let result = validate_condition(&ship, &results(1000.0, 2.0, 0.0, 0.6), &tanks, &volumes, Some(&fsm));
        assert!((result.free_surface_correction_m - 0.5).abs() < 1e-12);
        assert!((result.gm_effective_m - 0.1).abs() < 1e-9);
        assert!(result.has_issue(IssueCode::GmLow));
    }

    #[test]
    fn test_trim_and_draft_limits() {
        let ship = Ship::new("Test", 100.0, 20.0, 10.0, 6.0);
        let none = BTreeMap::new();
        let result = validate_condition(&ship, &results(5000.0, 6.5, -2.5, 1.0), &[], &none, None);
        assert!(result.has_issue(IssueCode::TrimExcessive));
        assert!(result.has_issue(IssueCode::DraftOver));
        assert!(!result.valid);

        // Unknown dimensions skip the checks
        let bare = Ship::new("Bare", 0.0, 0.0, 0.0, 0.0);
        let result = validate_condition(&bare, &results(5000.0, 6.5, -2.5, 1.0), &[], &none, None);
        assert!(result.valid);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_bm_over_zero_weight_unknown_tank() {
        let ship = Ship::new("Test", 100.0, 20.0, 10.0, 6.0);
        let mut heavy = results(1000.0, 3.0, 0.0, 1.0);
        heavy.strength = Some(StrengthResult {
            still_water_bm_tm: 12_000.0,
            ..Default::default()
        });
        let none = BTreeMap::new();
        assert!(validate_condition(&ship, &heavy, &[], &none, None).has_issue(IssueCode::BmOver));

        let volumes = BTreeMap::from([(42, 10.0), (43, 0.0)]);
        let empty = validate_condition(&ship, &ConditionResults::zero(), &[], &volumes, None);
        assert!(empty.has_issue(IssueCode::ZeroWeight));
        let unknown: Vec<_> = empty.issues.iter().filter(|i| i.code == IssueCode::TankUnknown).collect();
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].value, Some(10.0));
        assert!(empty.has_warnings());
    }

    #[test]
    fn test_issue_code_serialization() {
        assert_eq!(serde_json::to_string(&IssueCode::TrimExcessive).unwrap(), "\"TRIM_EXCESSIVE\"");
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "\"WARNING\"");
        assert_eq!(IssueCode::GmLow.to_string(), "GM_LOW");
    }
}
