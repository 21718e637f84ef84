//! # Project Data Structures
//!
//! The `Project` struct is the root container for one vessel: its particulars,
//! tanks, pens, calibration data and saved loading conditions. Projects
//! serialize to `.stab` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Project
//! ├── meta: ProjectMetadata (version, preparer, timestamps)
//! ├── settings: ProjectSettings (densities, livestock defaults, limits)
//! ├── ship, tanks, pens, cargo_type
//! ├── sounding_tables, hydrostatic_curves (optional calibration data)
//! └── conditions: Vec<StoredCondition>
//! ```
//!
//! Stored conditions keep their tank volumes and pen loadings as JSON text.
//! Decoding is permissive: a corrupted blob yields an empty map and a
//! logged warning, never an error.
//!
//! ## Example
//!
//! ```rust
//! use stability_core::model::{LoadingCondition, Ship, Tank};
//! use stability_core::project::Project;
//!
//! let ship = Ship::new("MV Example", 150.0, 25.0, 15.0, 10.0);
//! let mut project = Project::new(ship, "Chief Officer");
//! project.tanks.push(Tank::new(1, "DB1", 12_000.0, 0.5, 3.0));
//! project.save_condition(&LoadingCondition::new("Departure").with_tank_volume(1, 12_000.0));
//!
//! let results = project.evaluate("Departure").unwrap();
//! assert!(results.criteria.unwrap().all_passed());
//! assert_eq!(project.condition("Departure").unwrap().last_displacement_t, 12_000.0);
//! ```

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::calculations::condition::{ConditionResults, LoadingInput};
use crate::errors::{StabResult, StabilityError};
use crate::hydrostatics::HydrostaticCurves;
use crate::model::{CargoType, LivestockPen, LoadingCondition, PenId, Ship, Tank, TankId};
use crate::service::evaluate_condition;
use crate::settings::{ProjectSettings, ReferenceVessel};
use crate::sounding::{derive_tank_overrides, SoundingTable};

/// Current schema version for .stab files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root project container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub meta: ProjectMetadata,
    pub settings: ProjectSettings,
    pub ship: Ship,
    #[serde(default)]
    pub tanks: Vec<Tank>,
    #[serde(default)]
    pub pens: Vec<LivestockPen>,
    /// Livestock carried; overrides the settings' mass per head and VCG offset
    #[serde(default)]
    pub cargo_type: Option<CargoType>,
    #[serde(default)]
    pub sounding_tables: Vec<SoundingTable>,
    /// Tabulated hydrostatics from the stability booklet
    #[serde(default)]
    pub hydrostatic_curves: Option<HydrostaticCurves>,
    #[serde(default)]
    pub conditions: Vec<StoredCondition>,
}

impl Project {
    /// Create a project for a ship.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stability_core::model::Ship;
    /// use stability_core::project::{Project, SCHEMA_VERSION};
    ///
    /// let project = Project::new(Ship::new("MV Example", 120.0, 20.0, 10.0, 7.5), "Master");
    /// assert_eq!(project.meta.version, SCHEMA_VERSION);
    /// assert!(project.conditions.is_empty());
    /// ```
    pub fn new(ship: Ship, prepared_by: impl Into<String>) -> Self {
        let now = Utc::now();
        Project {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                prepared_by: prepared_by.into(),
                created: now,
                modified: now,
            },
            settings: ProjectSettings::default(),
            ship,
            tanks: Vec::new(),
            pens: Vec::new(),
            cargo_type: None,
            sounding_tables: Vec::new(),
            hydrostatic_curves: None,
            conditions: Vec::new(),
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    /// Store a condition, replacing any stored condition with the same name.
    ///
    /// Returns the id of the stored record.
    pub fn save_condition(&mut self, condition: &LoadingCondition) -> Uuid {
        let stored = StoredCondition::from_condition(condition);
        let id = match self.conditions.iter_mut().find(|c| c.name == condition.name) {
            Some(existing) => {
                let id = existing.id;
                *existing = StoredCondition { id, ..stored };
                id
            }
            None => {
                let id = stored.id;
                self.conditions.push(stored);
                id
            }
        };
        self.touch();
        id
    }

    /// Remove a stored condition by name.
    pub fn remove_condition(&mut self, name: &str) -> Option<StoredCondition> {
        let index = self.conditions.iter().position(|c| c.name == name)?;
        self.touch();
        Some(self.conditions.remove(index))
    }

    /// Decode a stored condition by name.
    pub fn condition(&self, name: &str) -> Option<LoadingCondition> {
        self.conditions.iter().find(|c| c.name == name).map(StoredCondition::to_condition)
    }

    /// Names of stored conditions in storage order.
    pub fn condition_names(&self) -> Vec<&str> {
        self.conditions.iter().map(|c| c.name.as_str()).collect()
    }

    /// Evaluate a stored condition and record its headline results.
    ///
    /// Sounding tables supply tank CoG overrides and free-surface moments at
    /// the condition's volumes. The cargo type, when set, supplies the mass
    /// per head and VCG offset.
    ///
    /// # Errors
    ///
    /// * `NotFound` - No stored condition has this name
    /// * `MissingField` / `InvalidInput` - The ship record is incomplete
    /// * Any error from [`evaluate_condition`]
    pub fn evaluate(&mut self, name: &str) -> StabResult<ConditionResults> {
        let mut condition = self.condition(name).ok_or_else(|| StabilityError::not_found("condition", name))?;
        self.ship.validate()?;

        let overrides = derive_tank_overrides(&self.sounding_tables, &condition.tank_volumes_m3);
        let curves = self.hydrostatic_curves.clone().map(HydrostaticCurves::sanitized);
        let reference = ReferenceVessel::default();
        let (mass_per_head_t, vcg_from_deck_m) = match &self.cargo_type {
            Some(cargo) => (cargo.mass_per_head_t(), cargo.vcg_from_deck_m),
            None => (self.settings.mass_per_head_t, self.settings.vcg_from_deck_m),
        };

        let mut input = LoadingInput::new(&self.ship, &self.tanks, &condition)
            .with_pens(&self.pens)
            .with_cargo_density(self.settings.cargo_density_t_per_m3)
            .with_livestock(mass_per_head_t, vcg_from_deck_m)
            .with_limits(&self.settings.limits);
        if !overrides.cog.is_empty() {
            input = input.with_tank_cog_override(&overrides.cog);
        }
        if let Some(curves) = &curves {
            input = input.with_curves(curves);
        }
        if self.settings.use_reference_vessel {
            input = input.with_reference(&reference);
        }
        let tank_fsm = (!overrides.fsm_tm.is_empty()).then_some(&overrides.fsm_tm);

        let results = evaluate_condition(&input, tank_fsm)?;

        condition.record_results(&results);
        self.save_condition(&condition);
        Ok(results)
    }
}

/// Project metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Officer or office that prepared the loading conditions
    pub prepared_by: String,

    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// A loading condition as persisted.
///
/// Tank volumes and pen loadings are JSON objects keyed by id, stored as
/// text: `{"1": 120.0, "4": 35.5}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCondition {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub tank_volumes_json: String,
    #[serde(default)]
    pub pen_loadings_json: String,
    #[serde(default)]
    pub last_displacement_t: f64,
    #[serde(default)]
    pub last_draft_m: f64,
    #[serde(default)]
    pub last_trim_m: f64,
    #[serde(default)]
    pub last_gm_m: f64,
}

impl StoredCondition {
    pub fn from_condition(condition: &LoadingCondition) -> Self {
        StoredCondition {
            id: Uuid::new_v4(),
            name: condition.name.clone(),
            tank_volumes_json: encode_map(&condition.tank_volumes_m3),
            pen_loadings_json: encode_map(&condition.pen_loadings),
            last_displacement_t: condition.last_displacement_t,
            last_draft_m: condition.last_draft_m,
            last_trim_m: condition.last_trim_m,
            last_gm_m: condition.last_gm_m,
        }
    }

    pub fn to_condition(&self) -> LoadingCondition {
        LoadingCondition {
            id: None,
            name: self.name.clone(),
            tank_volumes_m3: decode_tank_volumes(&self.tank_volumes_json),
            pen_loadings: decode_pen_loadings(&self.pen_loadings_json),
            last_displacement_t: self.last_displacement_t,
            last_draft_m: self.last_draft_m,
            last_trim_m: self.last_trim_m,
            last_gm_m: self.last_gm_m,
        }
    }
}

fn encode_map<V: Serialize>(map: &BTreeMap<u32, V>) -> String {
    // Integer-keyed maps of plain numbers always serialize
    serde_json::to_string(map).unwrap_or_else(|_| "{}".to_string())
}

/// Decode an id-keyed JSON object, skipping entries that do not parse.
///
/// Malformed JSON gives an empty map.
fn decode_map<K, V>(json: &str, what: &str, value: impl Fn(&serde_json::Value) -> Option<V>) -> BTreeMap<K, V>
where
    K: FromStr + Ord,
{
    if json.trim().is_empty() {
        return BTreeMap::new();
    }
    let raw: BTreeMap<String, serde_json::Value> = match serde_json::from_str(json) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(map = what, error = %e, "stored map is not valid JSON, using empty map");
            return BTreeMap::new();
        }
    };
    raw.iter()
        .filter_map(|(key, v)| match (key.trim().parse::<K>(), value(v)) {
            (Ok(k), Some(v)) => Some((k, v)),
            _ => {
                warn!(map = what, key = %key, "skipping stored entry with invalid key or value");
                None
            }
        })
        .collect()
}

/// Decode stored tank volumes; corrupted data gives an empty map.
pub fn decode_tank_volumes(json: &str) -> BTreeMap<TankId, f64> {
    decode_map(json, "tank_volumes", |v| v.as_f64().filter(|x| x.is_finite()))
}

/// Decode stored pen loadings; corrupted data gives an empty map.
pub fn decode_pen_loadings(json: &str) -> BTreeMap<PenId, u32> {
    decode_map(json, "pen_loadings", |v| v.as_u64().and_then(|h| u32::try_from(h).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::condition::compute_condition;

    fn project() -> Project {
        let mut project = Project::new(Ship::new("MV Test", 150.0, 25.0, 15.0, 10.0), "Chief Officer");
        project.tanks.push(Tank::new(1, "DB1", 12_000.0, 0.5, 3.0));
        project.pens.push(LivestockPen::new(1, "A", 12.0, 75.0, 60.0));
        project
    }

    #[test]
    fn test_project_serialization() {
        let mut project = project();
        project.save_condition(&LoadingCondition::new("Departure").with_tank_volume(1, 500.0).with_pen_loading(1, 30));
        let json = serde_json::to_string_pretty(&project).unwrap();
        assert!(json.contains("Chief Officer"));
        assert!(json.contains(r#""tank_volumes_json": "{\"1\":500.0}""#));

        let roundtrip: Project = serde_json::from_str(&json).unwrap();
        let condition = roundtrip.condition("Departure").unwrap();
        assert_eq!(condition.tank_volumes_m3.get(&1), Some(&500.0));
        assert_eq!(condition.pen_loadings.get(&1), Some(&30));
    }

    #[test]
    fn test_save_condition_replaces_by_name() {
        let mut project = project();
        let first = project.save_condition(&LoadingCondition::new("Arrival").with_tank_volume(1, 10.0));
        let second = project.save_condition(&LoadingCondition::new("Arrival").with_tank_volume(1, 20.0));
        assert_eq!(first, second);
        assert_eq!(project.condition_names(), vec!["Arrival"]);
        assert_eq!(project.condition("Arrival").unwrap().tank_volumes_m3[&1], 20.0);

        assert!(project.remove_condition("Arrival").is_some());
        assert!(project.remove_condition("Arrival").is_none());
    }

    #[test]
    fn test_corrupted_volumes_give_empty_map() {
        assert!(decode_tank_volumes("{not json").is_empty());
        assert!(decode_tank_volumes("").is_empty());
        assert!(decode_pen_loadings("[1, 2]").is_empty());

        let partial = decode_tank_volumes(r#"{"1": 10.5, "x": 3.0, "2": "full"}"#);
        assert_eq!(partial, BTreeMap::from([(1, 10.5)]));
        let heads = decode_pen_loadings(r#"{"3": 12, "4": -1}"#);
        assert_eq!(heads, BTreeMap::from([(3, 12)]));

        // Orchestrator still produces a zero-load result
        let stored = StoredCondition {
            tank_volumes_json: "%%%".to_string(),
            pen_loadings_json: "null".to_string(),
            ..StoredCondition::from_condition(&LoadingCondition::new("Broken"))
        };
        let condition = stored.to_condition();
        assert!(condition.tank_volumes_m3.is_empty());
        let ship = Ship::new("MV Test", 150.0, 25.0, 15.0, 10.0);
        let results = compute_condition(&LoadingInput::new(&ship, &[], &condition));
        assert_eq!(results.displacement_t, 0.0);
        assert_eq!(results.draft_m, 0.0);
    }

    #[test]
    fn test_evaluate_records_results() {
        let mut project = project();
        project.save_condition(&LoadingCondition::new("Departure").with_tank_volume(1, 12_000.0));
        let results = project.evaluate("Departure").unwrap();

        let stored = project.condition("Departure").unwrap();
        assert_eq!(stored.last_displacement_t, results.displacement_t);
        assert_eq!(stored.last_gm_m, results.gm_effective_m());
        assert!(results.snapshot.is_some());

        let missing = project.evaluate("Nope").unwrap_err();
        assert_eq!(missing.error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_evaluate_uses_cargo_type_and_sounding_tables() {
        use crate::sounding::SoundingRow;

        let mut project = project();
        project.cargo_type = Some(CargoType {
            avg_weight_per_head_kg: 600.0,
            vcg_from_deck_m: 2.0,
            ..CargoType::default()
        });
        project.sounding_tables.push(SoundingTable::new(
            1,
            vec![
                SoundingRow {
                    volume_m3: 0.0,
                    vcg_m: 0.0,
                    lcg_m: 75.0,
                    fsm_tm: Some(0.0),
                    ..Default::default()
                },
                SoundingRow {
                    volume_m3: 12_000.0,
                    vcg_m: 8.0,
                    lcg_m: 75.0,
                    fsm_tm: Some(9_000.0),
                    ..Default::default()
                },
            ],
        ));
        project.save_condition(&LoadingCondition::new("Half").with_tank_volume(1, 6_000.0).with_pen_loading(1, 100));
        let results = project.evaluate("Half").unwrap();

        // 6000 t liquid + 100 head at 0.6 t
        assert!((results.displacement_t - 6_060.0).abs() < 1e-9);
        // KG from the sounding table (4.0 m) and pens at 12 + 2 m
        let expected_kg = (6_000.0 * 4.0 + 60.0 * 14.0) / 6_060.0;
        assert!((results.kg_m - expected_kg).abs() < 1e-9);
        let validation = results.validation.unwrap();
        assert!((validation.free_surface_correction_m - 4_500.0 / 6_060.0).abs() < 1e-9);
    }

    #[test]
    fn test_evaluate_rejects_incomplete_ship() {
        let mut project = Project::new(Ship::new("", 150.0, 25.0, 15.0, 10.0), "Master");
        project.save_condition(&LoadingCondition::new("Any").with_pen_loading(1, 1));
        assert_eq!(project.evaluate("Any").unwrap_err().error_code(), "MISSING_FIELD");
    }
}
