//! # Calculation Traceability
//!
//! A snapshot of what went into a condition computation and what came out,
//! stamped with an id and UTC time so a printed result can be traced back
//! to its inputs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::condition::ConditionResults;
use crate::calculations::criteria::CriteriaEvaluation;
use crate::model::{LoadingCondition, PenId, TankId};

/// Inputs recorded in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotInputs {
    pub tank_volumes_m3: BTreeMap<TankId, f64>,
    pub pen_loadings: BTreeMap<PenId, u32>,
    pub cargo_density_t_per_m3: f64,
}

/// Headline outputs recorded in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotOutputs {
    pub displacement_t: f64,
    pub draft_m: f64,
    pub trim_m: f64,
    pub gm_m: f64,
    pub kg_m: f64,
    pub km_m: f64,
    /// Present once validation has run
    pub gm_effective_m: Option<f64>,
}

/// Traceability record of one computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationSnapshot {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub condition_name: String,
    pub ship_name: String,
    pub inputs: SnapshotInputs,
    pub outputs: SnapshotOutputs,
    /// `Criteria: N passed, M failed`, empty when criteria were not evaluated
    pub criteria_summary: String,
}

/// Build a snapshot from a condition, its results and optional criteria.
pub fn create_snapshot(
    condition: &LoadingCondition,
    ship_name: &str,
    cargo_density: f64,
    results: &ConditionResults,
    criteria: Option<&CriteriaEvaluation>,
) -> CalculationSnapshot {
    let criteria_summary = criteria
        .map(|c| format!("Criteria: {} passed, {} failed", c.passed, c.failed))
        .unwrap_or_default();

    CalculationSnapshot {
        id: Uuid::new_v4(),
        timestamp: Utc::now(),
        condition_name: condition.name.clone(),
        ship_name: ship_name.to_string(),
        inputs: SnapshotInputs {
            tank_volumes_m3: condition.tank_volumes_m3.clone(),
            pen_loadings: condition.pen_loadings.clone(),
            cargo_density_t_per_m3: cargo_density,
        },
        outputs: SnapshotOutputs {
            displacement_t: results.displacement_t,
            draft_m: results.draft_m,
            trim_m: results.trim_m,
            gm_m: results.gm_m,
            kg_m: results.kg_m,
            km_m: results.km_m,
            gm_effective_m: results.validation.as_ref().map(|v| v.gm_effective_m),
        },
        criteria_summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::criteria::{CriterionGroup, CriterionLine, CriterionResult};
    use crate::calculations::validation::ValidationResult;

    fn line(result: CriterionResult) -> CriterionLine {
        CriterionLine {
            code: "X".to_string(),
            name: "X".to_string(),
            reference: String::new(),
            result,
            value: None,
            limit: None,
            margin: None,
            message: String::new(),
            group: CriterionGroup::Imo,
        }
    }

    #[test]
    fn test_snapshot_contents() {
        let condition = LoadingCondition::new("Arrival").with_tank_volume(3, 45.0).with_pen_loading(1, 20);
        let mut results = ConditionResults {
            displacement_t: 4200.0,
            gm_m: 1.2,
            ..ConditionResults::zero()
        };

        let snapshot = create_snapshot(&condition, "MV Test", 1.025, &results, None);
        assert_eq!(snapshot.condition_name, "Arrival");
        assert_eq!(snapshot.inputs.tank_volumes_m3.get(&3), Some(&45.0));
        assert_eq!(snapshot.outputs.displacement_t, 4200.0);
        assert!(snapshot.outputs.gm_effective_m.is_none());
        assert!(snapshot.criteria_summary.is_empty());

        results.validation = Some(ValidationResult {
            valid: true,
            gm_effective_m: 1.1,
            free_surface_correction_m: 0.1,
            issues: Vec::new(),
        });
        let criteria = CriteriaEvaluation {
            lines: vec![line(CriterionResult::Pass), line(CriterionResult::Fail), line(CriterionResult::NA)],
            passed: 1,
            failed: 1,
            n_a: 1,
        };
        let snapshot = create_snapshot(&condition, "MV Test", 1.025, &results, Some(&criteria));
        assert_eq!(snapshot.outputs.gm_effective_m, Some(1.1));
        assert_eq!(snapshot.criteria_summary, "Criteria: 1 passed, 1 failed");
    }

    #[test]
    fn test_snapshot_serializes() {
        let condition = LoadingCondition::new("Ballast");
        let snapshot = create_snapshot(&condition, "MV Test", 1.0, &ConditionResults::zero(), None);
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: CalculationSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, snapshot.id);
        assert_eq!(back.timestamp, snapshot.timestamp);
    }
}
