//! Livestock pens and cargo types.

use serde::{Deserialize, Serialize};

use crate::settings::DEFAULT_MASS_PER_HEAD_T;

/// Pen identity, unique within a ship.
pub type PenId = u32;

/// A livestock pen on one deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LivestockPen {
    pub id: PenId,
    pub name: String,
    pub deck: String,

    /// Pen deck VCG above baseline (m)
    pub vcg_m: f64,
    /// Metres from the aft perpendicular
    pub lcg_m: f64,
    pub tcg_m: f64,

    pub area_m2: f64,
    pub capacity_head: Option<u32>,
}

impl LivestockPen {
    pub fn new(id: PenId, deck: impl Into<String>, vcg_m: f64, lcg_m: f64, area_m2: f64) -> Self {
        let deck = deck.into();
        LivestockPen {
            id,
            name: format!("{}-{}", deck, id),
            deck,
            vcg_m,
            lcg_m,
            area_m2,
            ..Default::default()
        }
    }

    /// Head capacity, falling back to deck area per head.
    pub fn head_capacity(&self, cargo: &CargoType) -> u32 {
        match self.capacity_head {
            Some(capacity) => capacity,
            None if cargo.deck_area_per_head_m2 > 0.0 => (self.area_m2 / cargo.deck_area_per_head_m2).floor() as u32,
            None => 0,
        }
    }
}

/// Livestock cargo type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CargoType {
    pub name: String,
    pub avg_weight_per_head_kg: f64,
    /// Height of the animals' centre of gravity above the pen deck (m)
    pub vcg_from_deck_m: f64,
    pub deck_area_per_head_m2: f64,
}

impl CargoType {
    /// Mass per head in tonnes.
    pub fn mass_per_head_t(&self) -> f64 {
        if self.avg_weight_per_head_kg > 0.0 {
            self.avg_weight_per_head_kg / 1000.0
        } else {
            DEFAULT_MASS_PER_HEAD_T
        }
    }
}

impl Default for CargoType {
    fn default() -> Self {
        CargoType {
            name: "Cattle".to_string(),
            avg_weight_per_head_kg: 520.0,
            vcg_from_deck_m: 1.5,
            deck_area_per_head_m2: 1.85,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mass_per_head() {
        assert!((CargoType::default().mass_per_head_t() - 0.52).abs() < 1e-12);
        let unknown = CargoType {
            avg_weight_per_head_kg: 0.0,
            ..Default::default()
        };
        assert_eq!(unknown.mass_per_head_t(), DEFAULT_MASS_PER_HEAD_T);
    }

    #[test]
    fn test_head_capacity_from_area() {
        let mut pen = LivestockPen::new(3, "B", 12.0, 40.0, 38.0);
        assert_eq!(pen.name, "B-3");
        assert_eq!(pen.head_capacity(&CargoType::default()), 20);

        pen.capacity_head = Some(18);
        assert_eq!(pen.head_capacity(&CargoType::default()), 18);
    }
}
