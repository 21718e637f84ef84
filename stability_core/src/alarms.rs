//! # Alarm Rows
//!
//! Flattens a computed condition into the numbered status rows shown on an
//! alarms panel: overall calculation status, available deadweight, strength
//! percentages and one row per criterion line.

use serde::{Deserialize, Serialize};

use crate::calculations::condition::ConditionResults;
use crate::calculations::criteria::CriterionResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlarmStatus {
    Pass,
    Fail,
    Warn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmType {
    Requirement,
    Recommendation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmRow {
    /// 1-based row number
    pub no: usize,
    pub status: AlarmStatus,
    pub description: String,
    pub attained: String,
    pub pass_if: String,
    pub alarm_type: AlarmType,
}

/// Build the alarm rows from results with validation and criteria attached.
///
/// Missing validation counts as OK; strength rows appear only when a
/// strength result is present.
pub fn build_alarm_rows(results: &ConditionResults) -> Vec<AlarmRow> {
    let mut rows = Vec::new();
    let mut push = |status: AlarmStatus, description: &str, attained: String, pass_if: String| {
        rows.push(AlarmRow {
            no: rows.len() + 1,
            status,
            description: description.to_string(),
            attained,
            pass_if,
            alarm_type: AlarmType::Requirement,
        });
    };

    let (status, attained, pass_if) = match &results.validation {
        Some(v) if v.has_errors() => (AlarmStatus::Fail, "FAILED", "No errors"),
        Some(v) if v.has_warnings() => (AlarmStatus::Warn, "WARNING", "No warnings"),
        _ => (AlarmStatus::Pass, "OK", "OK"),
    };
    push(status, "Calculation Status", attained.to_string(), pass_if.to_string());

    // Displacement stands in for deadweight until a deadweight scale exists
    let available_dwt = results.displacement_t.max(0.0);
    push(
        AlarmStatus::Pass,
        "Avail Deadweight",
        format!("{:.2} MT", available_dwt),
        "AvDWT >= 0.00 MT".to_string(),
    );

    if let Some(strength) = &results.strength {
        let within = |pct: f64| if (-100.0..=100.0).contains(&pct) { AlarmStatus::Pass } else { AlarmStatus::Fail };
        push(
            within(strength.bm_pct_allow),
            "Max BMom %Allow",
            format!("{:.2}%", strength.bm_pct_allow),
            "-100.00 <= BM% <= 100.00".to_string(),
        );
        push(
            within(strength.sf_pct_allow),
            "Max Shear %Allow",
            format!("{:.2}%", strength.sf_pct_allow),
            "-100.00 <= SF% <= 100.00".to_string(),
        );
    }

    if let Some(criteria) = &results.criteria {
        for line in &criteria.lines {
            let status = match line.result {
                CriterionResult::Pass => AlarmStatus::Pass,
                CriterionResult::Fail => AlarmStatus::Fail,
                CriterionResult::NA => AlarmStatus::Warn,
            };
            let attained = line.value.map(|v| format!("{:.3}", v)).unwrap_or_else(|| "N/A".to_string());
            let pass_if = match line.limit {
                Some(limit) if line.is_maximum() => format!("<= {:.3}", limit),
                Some(limit) => format!(">= {:.3}", limit),
                None => "N/A".to_string(),
            };
            push(status, &line.name, attained, pass_if);
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::criteria::evaluate_all_criteria;
    use crate::calculations::strength::StrengthResult;
    use crate::calculations::validation::{IssueCode, Severity, ValidationIssue, ValidationResult};
    use crate::model::Ship;
    use std::collections::BTreeMap;

    #[test]
    fn test_minimal_rows() {
        let rows = build_alarm_rows(&ConditionResults::zero());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].description, "Calculation Status");
        assert_eq!(rows[0].status, AlarmStatus::Pass);
        assert_eq!(rows[1].attained, "0.00 MT");
        assert_eq!(rows[1].no, 2);
    }

    #[test]
    fn test_warning_status_and_strength_rows() {
        let results = ConditionResults {
            displacement_t: 1000.0,
            strength: Some(StrengthResult {
                bm_pct_allow: 120.0,
                sf_pct_allow: 12.5,
                ..StrengthResult::default()
            }),
            validation: Some(ValidationResult {
                valid: true,
                gm_effective_m: 1.0,
                free_surface_correction_m: 0.0,
                issues: vec![ValidationIssue {
                    code: IssueCode::GmMarginal,
                    severity: Severity::Warning,
                    message: "GM marginal".to_string(),
                    value: Some(0.2),
                    limit: Some(0.225),
                }],
            }),
            ..ConditionResults::zero()
        };
        let rows = build_alarm_rows(&results);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].status, AlarmStatus::Warn);
        assert_eq!(rows[0].attained, "WARNING");
        assert_eq!(rows[2].status, AlarmStatus::Fail);
        assert_eq!(rows[2].attained, "120.00%");
        assert_eq!(rows[3].status, AlarmStatus::Pass);
    }

    #[test]
    fn test_criteria_rows() {
        let ship = Ship::new("Test", 150.0, 25.0, 15.0, 10.0);
        let mut results = ConditionResults {
            displacement_t: 12_000.0,
            draft_m: 5.0,
            ..ConditionResults::zero()
        };
        let none = BTreeMap::new();
        results.criteria = Some(evaluate_all_criteria(&ship, &results, &[], &none, None));

        let rows = build_alarm_rows(&results);
        // Status, deadweight, then six criteria lines without ancillary results
        assert_eq!(rows.len(), 8);
        let trim = rows.iter().find(|r| r.description == "Trim limit").unwrap();
        assert_eq!(trim.pass_if, "<= 3.000");
        let roll = rows.iter().find(|r| r.description.starts_with("Roll period")).unwrap();
        assert_eq!(roll.status, AlarmStatus::Warn);
        assert_eq!(roll.attained, "N/A");
        let gm = rows.iter().find(|r| r.description == "Minimum GM").unwrap();
        assert_eq!(gm.pass_if, ">= 0.150");
        assert_eq!(gm.status, AlarmStatus::Fail);
    }
}
