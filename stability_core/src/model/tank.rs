//! Tanks and their longitudinal position.

use serde::{Deserialize, Serialize};

/// Tank identity, unique within a ship.
pub type TankId = u32;

/// Positions above this value in legacy records are metres from the AP.
pub const LEGACY_METRES_THRESHOLD: f64 = 1.5;

/// Tank contents classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TankType {
    #[default]
    Cargo,
    Ballast,
    Fuel,
    FreshWater,
    Other,
}

/// Longitudinal centre of a tank, with its unit made explicit.
///
/// Serialized as `{"fraction": 0.3}` or `{"metres": 42.0}`. Records written
/// before the unit was stored hold a bare number; those are migrated through
/// [`LongitudinalPosition::from_legacy`] on load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "PositionRepr")]
pub enum LongitudinalPosition {
    /// 0 = aft perpendicular, 1 = forward end of length overall
    Fraction(f64),
    /// Metres from the aft perpendicular
    Metres(f64),
}

impl LongitudinalPosition {
    /// Classify a unit-less legacy value.
    ///
    /// TODO: drop once stored tank records have been rewritten with an
    /// explicit unit; the 1.5 threshold misreads tanks within 1.5 m of the AP.
    pub fn from_legacy(value: f64) -> Self {
        if value > LEGACY_METRES_THRESHOLD {
            LongitudinalPosition::Metres(value)
        } else {
            LongitudinalPosition::Fraction(value)
        }
    }

    /// Position as a fraction of `length_m`, clamped to [0, 1].
    pub fn fraction_of(&self, length_m: f64) -> f64 {
        let fraction = match *self {
            LongitudinalPosition::Fraction(f) => f,
            LongitudinalPosition::Metres(m) => m / length_m.max(1e-6),
        };
        fraction.clamp(0.0, 1.0)
    }

    /// Position in metres from the aft perpendicular.
    pub fn metres_from_ap(&self, length_m: f64) -> f64 {
        self.fraction_of(length_m) * length_m.max(0.0)
    }
}

impl Default for LongitudinalPosition {
    fn default() -> Self {
        LongitudinalPosition::Fraction(0.5)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PositionRepr {
    Tagged(TaggedPosition),
    Legacy(f64),
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum TaggedPosition {
    Fraction(f64),
    Metres(f64),
}

impl From<PositionRepr> for LongitudinalPosition {
    fn from(repr: PositionRepr) -> Self {
        match repr {
            PositionRepr::Tagged(TaggedPosition::Fraction(f)) => LongitudinalPosition::Fraction(f),
            PositionRepr::Tagged(TaggedPosition::Metres(m)) => LongitudinalPosition::Metres(m),
            PositionRepr::Legacy(value) => LongitudinalPosition::from_legacy(value),
        }
    }
}

/// A tank definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Tank {
    pub id: TankId,
    pub name: String,
    pub tank_type: TankType,

    /// Loading-condition grouping label (e.g. "Water Ballast")
    pub category: String,

    /// Usable capacity (m³)
    pub capacity_m3: f64,

    /// Design density of the contents (t/m³)
    pub density_t_per_m3: f64,

    /// VCG above baseline when no sounding data is available (m)
    pub kg_m: f64,

    /// TCG, positive to starboard (m)
    pub tcg_m: f64,

    pub longitudinal_position: LongitudinalPosition,
}

impl Tank {
    /// Create a tank at a fractional longitudinal position.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stability_core::model::Tank;
    ///
    /// let tank = Tank::new(1, "DB 1", 250.0, 0.3, 1.2);
    /// assert!((tank.longitudinal_position.fraction_of(100.0) - 0.3).abs() < 1e-12);
    /// ```
    pub fn new(id: TankId, name: impl Into<String>, capacity_m3: f64, position_fraction: f64, kg_m: f64) -> Self {
        Tank {
            id,
            name: name.into(),
            capacity_m3,
            density_t_per_m3: 1.025,
            kg_m,
            longitudinal_position: LongitudinalPosition::Fraction(position_fraction),
            ..Default::default()
        }
    }

    /// Fill ratio for a volume, guarded against zero capacity.
    pub fn fill_ratio(&self, volume_m3: f64) -> f64 {
        volume_m3 / self.capacity_m3.max(1e-9)
    }
}

/// Centre of gravity of a tank's contents from sounding tables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct TankCog {
    pub vcg_m: f64,
    /// Metres from the aft perpendicular
    pub lcg_m: f64,
    pub tcg_m: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_threshold() {
        assert_eq!(LongitudinalPosition::from_legacy(0.75), LongitudinalPosition::Fraction(0.75));
        assert_eq!(LongitudinalPosition::from_legacy(1.5), LongitudinalPosition::Fraction(1.5));
        assert_eq!(LongitudinalPosition::from_legacy(42.0), LongitudinalPosition::Metres(42.0));
    }

    #[test]
    fn test_fraction_resolution() {
        let metres = LongitudinalPosition::Metres(30.0);
        assert!((metres.fraction_of(120.0) - 0.25).abs() < 1e-12);
        assert!((metres.metres_from_ap(120.0) - 30.0).abs() < 1e-9);

        // Out-of-range values are clamped to the hull
        assert_eq!(LongitudinalPosition::Metres(200.0).fraction_of(120.0), 1.0);
        assert_eq!(LongitudinalPosition::Fraction(1.4).fraction_of(120.0), 1.0);
        assert_eq!(LongitudinalPosition::Fraction(-0.2).fraction_of(120.0), 0.0);
    }

    #[test]
    fn test_position_deserialization() {
        let tagged: LongitudinalPosition = serde_json::from_str(r#"{"metres": 12.5}"#).unwrap();
        assert_eq!(tagged, LongitudinalPosition::Metres(12.5));

        let legacy_fraction: LongitudinalPosition = serde_json::from_str("0.4").unwrap();
        assert_eq!(legacy_fraction, LongitudinalPosition::Fraction(0.4));

        let legacy_metres: LongitudinalPosition = serde_json::from_str("55.0").unwrap();
        assert_eq!(legacy_metres, LongitudinalPosition::Metres(55.0));

        let json = serde_json::to_string(&LongitudinalPosition::Fraction(0.25)).unwrap();
        assert_eq!(json, r#"{"fraction":0.25}"#);
    }

    #[test]
    fn test_fill_ratio_zero_capacity() {
        let tank = Tank::new(1, "Void", 0.0, 0.5, 1.0);
        assert!(tank.fill_ratio(1.0) > 1e6);
        assert_eq!(tank.fill_ratio(0.0), 0.0);
    }
}
