//! # Stability Criteria
//!
//! Evaluates a computed condition against IMO intact stability, livestock
//! carriage and operational criteria. Each line is independent of the others
//! and carries its regulatory reference for the printed checklist.
//!
//! ## Margins
//!
//! A positive margin always means the criterion is met: `value − limit` for
//! minimum-type criteria and `limit − value` for maximum-type criteria (trim,
//! draft, roll period). The binary GZ status line uses 0.0 (pass) or −1.0
//! (fail).
//!
//! ## Groups
//!
//! | Group       | Codes                                              |
//! |-------------|----------------------------------------------------|
//! | `IMO`       | IMO_GM, IMO_TRIM, IMO_DRAFT                        |
//! | `LIVESTOCK` | LIV_GM, LIV_ROLL, LIV_FREEBORD                     |
//! | `ANCILLARY` | GZ_STATUS, PROP_IMM, VISIBILITY, AIR_DRAFT         |
//!
//! The ANCILLARY group is only produced when ancillary results are attached.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::ancillary::AncillaryResults;
use super::condition::ConditionResults;
use super::validation::compute_free_surface_correction;
use crate::model::{Ship, Tank, TankId};
use crate::settings::{criteria_ref, StabilityLimits, EPS, GRAVITY, ROLL_GYRATION_RATIO};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CriterionResult {
    Pass,
    Fail,
    /// Cannot be meaningfully evaluated for this condition
    NA,
}

impl CriterionResult {
    fn from_margin(margin: f64) -> Self {
        if margin >= 0.0 {
            CriterionResult::Pass
        } else {
            CriterionResult::Fail
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CriterionResult::Pass => "PASS",
            CriterionResult::Fail => "FAIL",
            CriterionResult::NA => "N/A",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CriterionGroup {
    Imo,
    Livestock,
    Ancillary,
}

/// One evaluated criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionLine {
    pub code: String,
    pub name: String,
    pub reference: String,
    pub result: CriterionResult,
    pub value: Option<f64>,
    pub limit: Option<f64>,
    /// Positive means the criterion is met
    pub margin: Option<f64>,
    pub message: String,
    pub group: CriterionGroup,
}

impl CriterionLine {
    #[allow(clippy::too_many_arguments)]
    fn evaluated(
        group: CriterionGroup,
        code: &str,
        name: &str,
        reference: &str,
        value: f64,
        limit: f64,
        margin: f64,
        message: String,
    ) -> Self {
        CriterionLine {
            code: code.to_string(),
            name: name.to_string(),
            reference: reference.to_string(),
            result: CriterionResult::from_margin(margin),
            value: Some(value),
            limit: Some(limit),
            margin: Some(margin),
            message,
            group,
        }
    }

    /// True for criteria whose limit is an upper bound.
    pub fn is_maximum(&self) -> bool {
        matches!(self.code.as_str(), "IMO_TRIM" | "IMO_DRAFT" | "LIV_ROLL")
    }
}

/// The complete checklist with result counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CriteriaEvaluation {
    pub lines: Vec<CriterionLine>,
    pub passed: usize,
    pub failed: usize,
    pub n_a: usize,
}

impl CriteriaEvaluation {
    fn from_lines(lines: Vec<CriterionLine>) -> Self {
        let count = |r: CriterionResult| lines.iter().filter(|l| l.result == r).count();
        CriteriaEvaluation {
            passed: count(CriterionResult::Pass),
            failed: count(CriterionResult::Fail),
            n_a: count(CriterionResult::NA),
            lines,
        }
    }

    /// N/A lines neither pass nor fail the condition.
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn lines_in_group(&self, group: CriterionGroup) -> impl Iterator<Item = &CriterionLine> {
        self.lines.iter().filter(move |l| l.group == group)
    }

    pub fn line(&self, code: &str) -> Option<&CriterionLine> {
        self.lines.iter().find(|l| l.code == code)
    }
}

/// GM after free-surface correction: from attached validation when present,
/// otherwise recomputed.
fn effective_gm(results: &ConditionResults, tanks: &[Tank], volumes: &BTreeMap<TankId, f64>, tank_fsm: Option<&BTreeMap<TankId, f64>>) -> f64 {
    match &results.validation {
        Some(validation) => validation.gm_effective_m,
        None => {
            let fsc = compute_free_surface_correction(tanks, volumes, results.displacement_t, tank_fsm);
            (results.gm_m - fsc).max(0.0)
        }
    }
}

/// Natural roll period estimate
///
/// # Formula
/// T = 2π · K · B / √(g · GM), K = 0.45
pub fn roll_period_s(breadth_m: f64, gm_m: f64) -> f64 {
    2.0 * PI * ROLL_GYRATION_RATIO * breadth_m / (GRAVITY * gm_m).sqrt()
}

fn imo_criteria(ship: &Ship, results: &ConditionResults, gm_eff: f64, limits: &StabilityLimits) -> Vec<CriterionLine> {
    let length = ship.length_overall_m.max(EPS);
    let group = CriterionGroup::Imo;

    let margin_gm = gm_eff - limits.min_gm_m;
    let gm = CriterionLine::evaluated(
        group,
        "IMO_GM",
        "Minimum GM",
        criteria_ref::IS_CODE_CH2,
        gm_eff,
        limits.min_gm_m,
        margin_gm,
        format!("GM {:.3} m, min {} m, margin {:+.3} m", gm_eff, limits.min_gm_m, margin_gm),
    );

    let trim = results.trim_m.abs();
    let max_trim = length * limits.max_trim_fraction;
    let margin_trim = max_trim - trim;
    let trim_line = CriterionLine::evaluated(
        group,
        "IMO_TRIM",
        "Trim limit",
        criteria_ref::IS_CODE,
        trim,
        max_trim,
        margin_trim,
        format!("Trim {:.2} m, max {:.2} m, margin {:+.2} m", trim, max_trim, margin_trim),
    );

    let max_draft = ship.design_draft_m.max(EPS) * limits.max_draft_fraction;
    let margin_draft = max_draft - results.draft_m;
    let draft = CriterionLine::evaluated(
        group,
        "IMO_DRAFT",
        "Draft limit",
        criteria_ref::LOAD_LINE,
        results.draft_m,
        max_draft,
        margin_draft,
        format!("Draft {:.2} m, max {:.2} m, margin {:+.2} m", results.draft_m, max_draft, margin_draft),
    );

    vec![gm, trim_line, draft]
}

fn livestock_criteria(ship: &Ship, results: &ConditionResults, gm_eff: f64, limits: &StabilityLimits) -> Vec<CriterionLine> {
    let breadth = ship.breadth_m.max(EPS);
    let group = CriterionGroup::Livestock;
    let mut lines = Vec::with_capacity(3);

    let margin_gm = gm_eff - limits.min_gm_livestock_m;
    lines.push(CriterionLine::evaluated(
        group,
        "LIV_GM",
        "Livestock minimum GM",
        criteria_ref::AMSA_IMO_LIVESTOCK,
        gm_eff,
        limits.min_gm_livestock_m,
        margin_gm,
        format!("GM {:.3} m, min {} m, margin {:+.3} m", gm_eff, limits.min_gm_livestock_m, margin_gm),
    ));

    if gm_eff > EPS {
        let period = roll_period_s(breadth, gm_eff);
        let margin = limits.max_roll_period_s - period;
        lines.push(CriterionLine::evaluated(
            group,
            "LIV_ROLL",
            "Roll period (animal welfare)",
            criteria_ref::AMSA_MO43,
            period,
            limits.max_roll_period_s,
            margin,
            format!("Roll period {:.1} s, max {} s, margin {:+.1} s", period, limits.max_roll_period_s, margin),
        ));
    } else {
        lines.push(CriterionLine {
            code: "LIV_ROLL".to_string(),
            name: "Roll period (animal welfare)".to_string(),
            reference: criteria_ref::AMSA_MO43.to_string(),
            result: CriterionResult::NA,
            value: None,
            limit: Some(limits.max_roll_period_s),
            margin: None,
            message: "N/A (GM too low)".to_string(),
            group,
        });
    }

    let depth = ship.depth_m.max(EPS);
    let freeboard = depth - results.draft_m - 0.5 * results.trim_m.abs();
    let margin_fb = freeboard - limits.min_freeboard_m;
    lines.push(CriterionLine::evaluated(
        group,
        "LIV_FREEBORD",
        "Minimum freeboard (no deck immersion)",
        criteria_ref::AMSA_MO43,
        freeboard,
        limits.min_freeboard_m,
        margin_fb,
        format!("Freeboard {:.2} m, min {} m, margin {:+.2} m", freeboard, limits.min_freeboard_m, margin_fb),
    ));

    lines
}

fn ancillary_criteria(ancillary: &AncillaryResults, limits: &StabilityLimits) -> Vec<CriterionLine> {
    let group = CriterionGroup::Ancillary;
    let gz_ok = ancillary.gz_criteria_ok;

    let gz = CriterionLine {
        code: "GZ_STATUS".to_string(),
        name: "GZ Criteria Status".to_string(),
        reference: criteria_ref::IS_CODE_CH2.to_string(),
        result: if gz_ok { CriterionResult::Pass } else { CriterionResult::Fail },
        value: Some(if gz_ok { 1.0 } else { 0.0 }),
        limit: Some(1.0),
        margin: Some(if gz_ok { 0.0 } else { -1.0 }),
        message: if gz_ok { "PASS".to_string() } else { "FAIL (GM or heel)".to_string() },
        group,
    };

    let prop = ancillary.prop_immersion_pct;
    let visibility = ancillary.visibility_m;
    let air = ancillary.air_draft_m;

    vec![
        gz,
        CriterionLine::evaluated(
            group,
            "PROP_IMM",
            "Propeller immersion",
            criteria_ref::OPERATIONAL,
            prop,
            limits.min_prop_immersion_pct,
            prop - limits.min_prop_immersion_pct,
            format!("Prop immersion {:.1}%, min {}%", prop, limits.min_prop_immersion_pct),
        ),
        CriterionLine::evaluated(
            group,
            "VISIBILITY",
            "Visibility",
            criteria_ref::SOLAS,
            visibility,
            limits.min_visibility_m,
            visibility - limits.min_visibility_m,
            format!("Visibility {:.1} m, min {} m", visibility, limits.min_visibility_m),
        ),
        CriterionLine::evaluated(
            group,
            "AIR_DRAFT",
            "Air draft",
            criteria_ref::OPERATIONAL,
            air,
            limits.min_air_draft_m,
            air - limits.min_air_draft_m,
            format!("Air draft {:.1} m, min {} m", air, limits.min_air_draft_m),
        ),
    ]
}

/// Evaluate every criterion with default limits.
pub fn evaluate_all_criteria(
    ship: &Ship,
    results: &ConditionResults,
    tanks: &[Tank],
    volumes: &BTreeMap<TankId, f64>,
    tank_fsm: Option<&BTreeMap<TankId, f64>>,
) -> CriteriaEvaluation {
    evaluate_all_criteria_with_limits(ship, results, tanks, volumes, tank_fsm, &StabilityLimits::default())
}

/// Evaluate every criterion.
pub fn evaluate_all_criteria_with_limits(
    ship: &Ship,
    results: &ConditionResults,
    tanks: &[Tank],
    volumes: &BTreeMap<TankId, f64>,
    tank_fsm: Option<&BTreeMap<TankId, f64>>,
    limits: &StabilityLimits,
) -> CriteriaEvaluation {
    let gm_eff = effective_gm(results, tanks, volumes, tank_fsm);

    let mut lines = imo_criteria(ship, results, gm_eff, limits);
    lines.extend(livestock_criteria(ship, results, gm_eff, limits));
    if let Some(ancillary) = &results.ancillary {
        lines.extend(ancillary_criteria(ancillary, limits));
    }
    CriteriaEvaluation::from_lines(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::validation::ValidationResult;

    fn ship() -> Ship {
        Ship::new("Test", 150.0, 25.0, 15.0, 10.0)
    }

    fn loaded(gm_m: f64) -> ConditionResults {
        ConditionResults {
            displacement_t: 12_000.0,
            draft_m: 5.0,
            draft_aft_m: 5.0,
            draft_fwd_m: 5.0,
            gm_m,
            ancillary: Some(AncillaryResults {
                prop_immersion_pct: 90.0,
                visibility_m: 150.0,
                air_draft_m: 22.0,
                gz_criteria_ok: gm_m >= 0.15,
            }),
            ..ConditionResults::zero()
        }
    }

    #[test]
    fn test_all_pass() {
        let none = BTreeMap::new();
        let evaluation = evaluate_all_criteria(&ship(), &loaded(4.0), &[], &none, None);
        assert_eq!(evaluation.lines.len(), 10);
        assert_eq!(evaluation.passed, 10);
        assert!(evaluation.all_passed());
        assert_eq!(evaluation.lines_in_group(CriterionGroup::Imo).count(), 3);
        assert_eq!(evaluation.lines_in_group(CriterionGroup::Livestock).count(), 3);
        assert_eq!(evaluation.lines_in_group(CriterionGroup::Ancillary).count(), 4);

        let gm = evaluation.line("IMO_GM").unwrap();
        assert_eq!(gm.message, "GM 4.000 m, min 0.15 m, margin +3.850 m");
        assert_eq!(gm.reference, "IS Code Ch.2");
    }

    #[test]
    fn test_counts_are_consistent() {
        let none = BTreeMap::new();
        for gm in [0.0, 0.1, 0.18, 0.5, 3.0] {
            let mut results = loaded(gm);
            for with_ancillary in [true, false] {
                if !with_ancillary {
                    results.ancillary = None;
                }
                let evaluation = evaluate_all_criteria(&ship(), &results, &[], &none, None);
                assert_eq!(evaluation.passed + evaluation.failed + evaluation.n_a, evaluation.lines.len());
                assert_eq!(evaluation.all_passed(), evaluation.failed == 0);
            }
        }
    }

    #[test]
    fn test_roll_period_not_applicable_at_zero_gm() {
        let none = BTreeMap::new();
        let evaluation = evaluate_all_criteria(&ship(), &loaded(0.0), &[], &none, None);
        let roll = evaluation.line("LIV_ROLL").unwrap();
        assert_eq!(roll.result, CriterionResult::NA);
        assert_eq!(roll.message, "N/A (GM too low)");
        assert!(roll.value.is_none());
        assert_eq!(evaluation.n_a, 1);

        let gz = evaluation.line("GZ_STATUS").unwrap();
        assert_eq!(gz.margin, Some(-1.0));
        assert_eq!(gz.message, "FAIL (GM or heel)");
        assert!(!evaluation.all_passed());
    }

    #[test]
    fn test_livestock_gm_between_limits() {
        let none = BTreeMap::new();
        let evaluation = evaluate_all_criteria(&ship(), &loaded(0.18), &[], &none, None);
        assert_eq!(evaluation.line("IMO_GM").unwrap().result, CriterionResult::Pass);
        assert_eq!(evaluation.line("LIV_GM").unwrap().result, CriterionResult::Fail);
    }

    #[test]
    fn test_roll_period_limit() {
        // Small GM on a broad ship gives a slow roll
        let period = roll_period_s(25.0, 0.3);
        assert!(period > 15.0);
        let none = BTreeMap::new();
        let evaluation = evaluate_all_criteria(&ship(), &loaded(0.3), &[], &none, None);
        let roll = evaluation.line("LIV_ROLL").unwrap();
        assert_eq!(roll.result, CriterionResult::Fail);
        assert!(roll.margin.unwrap() < 0.0);
    }

    #[test]
    fn test_maximum_type_margins_positive_when_met() {
        let none = BTreeMap::new();
        let mut results = loaded(2.0);
        results.trim_m = -1.0;
        let evaluation = evaluate_all_criteria(&ship(), &results, &[], &none, None);
        let trim = evaluation.line("IMO_TRIM").unwrap();
        assert_eq!(trim.value, Some(1.0));
        assert!((trim.margin.unwrap() - 2.0).abs() < 1e-12);
        assert!(trim.is_maximum());

        let freeboard = evaluation.line("LIV_FREEBORD").unwrap();
        assert!((freeboard.value.unwrap() - 9.5).abs() < 1e-12);
        assert!(!freeboard.is_maximum());
    }

    #[test]
    fn test_attached_validation_gm_is_used() {
        let none = BTreeMap::new();
        let mut results = loaded(2.0);
        results.validation = Some(ValidationResult {
            valid: false,
            gm_effective_m: 0.05,
            free_surface_correction_m: 1.95,
            issues: Vec::new(),
        });
        let evaluation = evaluate_all_criteria(&ship(), &results, &[], &none, None);
        assert_eq!(evaluation.line("IMO_GM").unwrap().value, Some(0.05));
    }
}
