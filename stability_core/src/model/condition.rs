//! Named loading conditions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::pen::PenId;
use super::tank::TankId;
use crate::calculations::condition::ConditionResults;

/// A named loading condition: tank fill volumes and pen head counts.
///
/// The `last_*` fields cache the most recent computation so condition lists
/// can be displayed without recomputing. Ids not present on the ship are
/// tolerated here and reported during validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoadingCondition {
    pub id: Option<u32>,
    pub name: String,
    pub tank_volumes_m3: BTreeMap<TankId, f64>,
    pub pen_loadings: BTreeMap<PenId, u32>,

    pub last_displacement_t: f64,
    pub last_draft_m: f64,
    pub last_trim_m: f64,
    pub last_gm_m: f64,
}

impl LoadingCondition {
    pub fn new(name: impl Into<String>) -> Self {
        LoadingCondition {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style tank volume setter.
    pub fn with_tank_volume(mut self, tank_id: TankId, volume_m3: f64) -> Self {
        self.tank_volumes_m3.insert(tank_id, volume_m3);
        self
    }

    /// Builder-style pen head count setter.
    pub fn with_pen_loading(mut self, pen_id: PenId, heads: u32) -> Self {
        self.pen_loadings.insert(pen_id, heads);
        self
    }

    /// Total head count over all pens.
    pub fn total_heads(&self) -> u64 {
        self.pen_loadings.values().map(|&h| u64::from(h)).sum()
    }

    /// Cache the headline figures of a computation.
    ///
    /// GM is the free-surface corrected value when validation has run.
    pub fn record_results(&mut self, results: &ConditionResults) {
        self.last_displacement_t = results.displacement_t;
        self.last_draft_m = results.draft_m;
        self.last_trim_m = results.trim_m;
        self.last_gm_m = results.gm_effective_m();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_heads() {
        let condition = LoadingCondition::new("Departure")
            .with_tank_volume(1, 120.0)
            .with_pen_loading(10, 40)
            .with_pen_loading(11, 35);
        assert_eq!(condition.tank_volumes_m3.get(&1), Some(&120.0));
        assert_eq!(condition.total_heads(), 75);
    }

    #[test]
    fn test_integer_keys_roundtrip() {
        let condition = LoadingCondition::new("Arrival").with_tank_volume(7, 33.5);
        let json = serde_json::to_string(&condition).unwrap();
        assert!(json.contains("\"7\":33.5"));
        let back: LoadingCondition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, condition);
    }
}
