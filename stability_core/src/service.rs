//! # Condition Service
//!
//! Runs the full evaluation of a loading condition:
//!
//! 1. Reject volumes a tank cannot hold
//! 2. Compute the condition
//! 3. Validate and attach the validation result
//! 4. Evaluate criteria and attach them
//! 5. Attach a traceability snapshot
//!
//! ## Example
//!
//! ```rust
//! use stability_core::calculations::condition::LoadingInput;
//! use stability_core::model::{LoadingCondition, Ship, Tank};
//! use stability_core::service::evaluate_condition;
//!
//! let ship = Ship::new("MV Example", 150.0, 25.0, 15.0, 10.0);
//! let tanks = vec![Tank::new(1, "DB1", 12_000.0, 0.5, 3.0)];
//! let condition = LoadingCondition::new("Departure").with_tank_volume(1, 12_000.0);
//!
//! let results = evaluate_condition(&LoadingInput::new(&ship, &tanks, &condition), None)?;
//! assert!(results.validation.is_some());
//! assert!(results.criteria.as_ref().unwrap().all_passed());
//! # Ok::<(), stability_core::StabilityError>(())
//! ```

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::calculations::condition::{compute_condition, ConditionResults, LoadingInput};
use crate::calculations::criteria::evaluate_all_criteria_with_limits;
use crate::calculations::validation::validate_condition_with_limits;
use crate::errors::{StabResult, StabilityError};
use crate::model::{Tank, TankId};
use crate::settings::StabilityLimits;
use crate::traceability::create_snapshot;

/// Fill tolerance over nominal capacity
pub const CAPACITY_TOLERANCE: f64 = 1.05;

/// Reject negative volumes and volumes over 105 % of capacity.
pub fn check_tank_limits(tanks: &[Tank], volumes: &BTreeMap<TankId, f64>) -> StabResult<()> {
    for tank in tanks {
        let volume = volumes.get(&tank.id).copied().unwrap_or(0.0);
        if volume < 0.0 {
            return Err(StabilityError::invalid_input(
                format!("tank[{}].volume_m3", tank.id),
                volume.to_string(),
                format!("Negative volume in tank {} is not allowed", tank.name),
            ));
        }
        if volume > tank.capacity_m3 * CAPACITY_TOLERANCE {
            return Err(StabilityError::invalid_input(
                format!("tank[{}].volume_m3", tank.id),
                volume.to_string(),
                format!("Volume in tank {} exceeds capacity {} m³", tank.name, tank.capacity_m3),
            ));
        }
    }
    Ok(())
}

/// Compute, validate and evaluate a condition.
///
/// # Errors
///
/// `InvalidInput` when the condition has neither tank volumes nor pen
/// loadings, or a tank volume fails [`check_tank_limits`].
pub fn evaluate_condition(input: &LoadingInput<'_>, tank_fsm: Option<&BTreeMap<TankId, f64>>) -> StabResult<ConditionResults> {
    let condition = input.condition;
    let volumes = &condition.tank_volumes_m3;
    let has_heads = input
        .pen_loadings
        .unwrap_or(&condition.pen_loadings)
        .values()
        .any(|&h| h > 0);
    if volumes.is_empty() && !has_heads {
        return Err(StabilityError::invalid_input(
            "condition",
            condition.name.clone(),
            "No tank volumes or pen loadings provided",
        ));
    }
    check_tank_limits(input.tanks, volumes)?;

    let default_limits = StabilityLimits::default();
    let limits = input.limits.unwrap_or(&default_limits);

    let mut results = compute_condition(input);
    debug!(
        condition = %condition.name,
        displacement_t = results.displacement_t,
        gm_m = results.gm_m,
        "condition computed"
    );

    let validation = validate_condition_with_limits(input.ship, &results, input.tanks, volumes, tank_fsm, limits);
    results.validation = Some(validation);

    let criteria = evaluate_all_criteria_with_limits(input.ship, &results, input.tanks, volumes, tank_fsm, limits);
    let snapshot = create_snapshot(condition, &input.ship.name, input.cargo_density, &results, Some(&criteria));
    info!(condition = %condition.name, "{}", snapshot.criteria_summary);
    results.criteria = Some(criteria);
    results.snapshot = Some(snapshot);

    Ok(results)
}
