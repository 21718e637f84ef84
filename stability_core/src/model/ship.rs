//! Ship principal particulars.

use serde::{Deserialize, Serialize};

use crate::errors::{StabResult, StabilityError};
use crate::settings::ReferenceVessel;

/// Principal dimensions and lightship state of a vessel.
///
/// A partially configured ship (zero dimensions) is still a valid input to the
/// engine; every formula degrades to zero rather than failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Ship {
    pub id: Option<u32>,
    pub name: String,
    pub imo_number: String,
    pub flag: String,

    /// Length overall (m); longitudinal fractions are relative to this
    pub length_overall_m: f64,
    pub breadth_m: f64,
    pub depth_m: f64,
    pub design_draft_m: f64,

    /// Mean draft of the empty ship (m), 0 when unknown
    pub lightship_draft_m: f64,

    /// Lightship displacement (t), 0 when unknown
    pub lightship_displacement_t: f64,

    /// Optional geometry for propeller, bridge and mast checks
    pub ancillary: AncillaryGeometry,
}

impl Ship {
    /// Create a ship from its principal dimensions.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stability_core::model::Ship;
    ///
    /// let ship = Ship::new("MV Example", 150.0, 25.0, 15.0, 10.0);
    /// assert_eq!(ship.breadth_m, 25.0);
    /// assert_eq!(ship.lightship_displacement_t, 0.0);
    /// ```
    pub fn new(name: impl Into<String>, length_overall_m: f64, breadth_m: f64, depth_m: f64, design_draft_m: f64) -> Self {
        Ship {
            name: name.into(),
            length_overall_m,
            breadth_m,
            depth_m,
            design_draft_m,
            ..Default::default()
        }
    }

    /// Builder-style lightship setter.
    pub fn with_lightship(mut self, displacement_t: f64, draft_m: f64) -> Self {
        self.lightship_displacement_t = displacement_t;
        self.lightship_draft_m = draft_m;
        self
    }

    /// Fill zero dimensions and lightship data from a reference vessel.
    pub fn completed_from(&self, reference: &ReferenceVessel) -> Ship {
        fn or_ref(value: f64, fallback: f64) -> f64 {
            if value > 0.0 {
                value
            } else {
                fallback
            }
        }

        let mut ship = self.clone();
        ship.length_overall_m = or_ref(ship.length_overall_m, reference.length_overall_m);
        ship.breadth_m = or_ref(ship.breadth_m, reference.breadth_m);
        ship.depth_m = or_ref(ship.depth_m, reference.depth_m);
        ship.design_draft_m = or_ref(ship.design_draft_m, reference.design_draft_m);
        if ship.lightship_displacement_t <= 0.0 {
            ship.lightship_displacement_t = reference.lightship_displacement_t;
            ship.lightship_draft_m = or_ref(ship.lightship_draft_m, reference.lightship_draft_m);
        }
        ship
    }

    /// Check the fields a saved ship record must carry.
    pub fn validate(&self) -> StabResult<()> {
        if self.name.trim().is_empty() {
            return Err(StabilityError::missing_field("ship.name"));
        }
        if self.length_overall_m <= 0.0 {
            return Err(StabilityError::invalid_input(
                "ship.length_overall_m",
                self.length_overall_m.to_string(),
                "Length overall must be positive",
            ));
        }
        if self.breadth_m < 0.0 || self.depth_m < 0.0 || self.design_draft_m < 0.0 {
            return Err(StabilityError::invalid_input(
                "ship.dimensions",
                format!("B={} D={} T={}", self.breadth_m, self.depth_m, self.design_draft_m),
                "Dimensions cannot be negative",
            ));
        }
        Ok(())
    }
}

/// Overrides for the ancillary check geometry. `None` selects the default
/// proportion of the principal dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AncillaryGeometry {
    /// Propeller shaft centre above baseline (m), default 5% of depth
    pub prop_centre_height_m: Option<f64>,
    /// Propeller diameter (m), default 3% of length overall
    pub prop_diameter_m: Option<f64>,
    /// Bridge front from the aft perpendicular (m), default 85% of length
    pub bridge_from_ap_m: Option<f64>,
    /// Eye height above baseline (m), default depth
    pub bridge_height_m: Option<f64>,
    /// Highest fixed point above baseline (m), default 1.8 x depth
    pub mast_height_m: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_name_and_length() {
        let ship = Ship::new("", 100.0, 20.0, 10.0, 6.0);
        assert_eq!(ship.validate().unwrap_err().error_code(), "MISSING_FIELD");

        let ship = Ship::new("Unnamed", 0.0, 20.0, 10.0, 6.0);
        assert_eq!(ship.validate().unwrap_err().error_code(), "INVALID_INPUT");

        assert!(Ship::new("Ok", 100.0, 20.0, 10.0, 6.0).validate().is_ok());
    }

    #[test]
    fn test_completed_from_reference_keeps_known_values() {
        let reference = ReferenceVessel::default();
        let ship = Ship::new("Partial", 120.0, 0.0, 0.0, 0.0).completed_from(&reference);
        assert_eq!(ship.length_overall_m, 120.0);
        assert_eq!(ship.breadth_m, reference.breadth_m);
        assert_eq!(ship.lightship_displacement_t, reference.lightship_displacement_t);

        let own = Ship::new("Own", 120.0, 20.0, 10.0, 7.0)
            .with_lightship(4000.0, 3.5)
            .completed_from(&reference);
        assert_eq!(own.lightship_displacement_t, 4000.0);
        assert_eq!(own.lightship_draft_m, 3.5);
    }

    #[test]
    fn test_ship_json_defaults() {
        let ship: Ship = serde_json::from_str(r#"{"name": "Sparse", "length_overall_m": 90.0}"#).unwrap();
        assert_eq!(ship.breadth_m, 0.0);
        assert!(ship.ancillary.prop_diameter_m.is_none());
    }
}
