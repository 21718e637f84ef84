//! # GZ Curve
//!
//! Righting arm from cross curves: `GZ(θ) = KN(θ) − KG · sin θ`, sampled on
//! a fixed angle grid. The raw series is kept as computed, negative values
//! included.

use serde::{Deserialize, Serialize};

use super::kn_table::KnRow;

/// Default sampling step (degrees)
pub const DEFAULT_ANGLE_STEP_DEG: f64 = 0.25;

/// Default last sampled angle (degrees)
pub const DEFAULT_ANGLE_MAX_DEG: f64 = 90.0;

/// Most samples a single curve may hold
pub const MAX_GZ_SAMPLES: usize = 100_000;

/// GZ above which stability counts as positive (m)
pub const GZ_POSITIVE_THRESHOLD_M: f64 = 0.02;

/// Sampled righting-arm curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GzCurve {
    pub angles_deg: Vec<f64>,
    pub gz_m: Vec<f64>,
}

/// Summary figures of a GZ curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct GzCurveStats {
    /// Largest sampled GZ (m)
    pub max_gz_m: f64,
    /// First angle at which the largest GZ occurs (degrees)
    pub angle_at_max_gz_deg: f64,
    /// Area under the curve from 0° to the range of positive stability (m·rad)
    pub area_m_rad: f64,
    /// Last angle with GZ above the positive threshold (degrees)
    pub range_positive_deg: f64,
}

/// Sample GZ from 0° to `angle_max_deg` every `angle_step_deg`.
///
/// Returns an empty curve for a non-positive step, a negative maximum, or a
/// grid of more than [`MAX_GZ_SAMPLES`] points.
pub fn compute_gz_curve(kg_m: f64, row: &KnRow, angle_step_deg: f64, angle_max_deg: f64) -> GzCurve {
    if angle_step_deg <= 0.0 || angle_max_deg < 0.0 {
        return GzCurve::default();
    }
    let steps = (angle_max_deg / angle_step_deg).round();
    if !steps.is_finite() || steps >= MAX_GZ_SAMPLES as f64 {
        return GzCurve::default();
    }
    let n = steps as usize + 1;
    let mut curve = GzCurve {
        angles_deg: Vec::with_capacity(n),
        gz_m: Vec::with_capacity(n),
    };
    for i in 0..n {
        let angle = i as f64 * angle_step_deg;
        if angle > angle_max_deg {
            break;
        }
        curve.angles_deg.push(angle);
        curve.gz_m.push(row.kn_at(angle) - kg_m * angle.to_radians().sin());
    }
    curve
}

impl GzCurve {
    pub fn len(&self) -> usize {
        self.angles_deg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles_deg.is_empty()
    }

    /// Max GZ, its angle, area and range of positive stability.
    ///
    /// The maximum is the first arg-max over the samples. Area is the
    /// trapezoidal integral over radians up to and including the last
    /// sample above [`GZ_POSITIVE_THRESHOLD_M`]; zero when no sample is.
    pub fn stats(&self) -> GzCurveStats {
        if self.is_empty() {
            return GzCurveStats::default();
        }

        let mut i_max = 0;
        for (i, &gz) in self.gz_m.iter().enumerate() {
            if gz > self.gz_m[i_max] {
                i_max = i;
            }
        }

        let Some(last_positive) = self.gz_m.iter().rposition(|&gz| gz > GZ_POSITIVE_THRESHOLD_M) else {
            return GzCurveStats {
                max_gz_m: self.gz_m[i_max],
                angle_at_max_gz_deg: self.angles_deg[i_max],
                ..GzCurveStats::default()
            };
        };

        let area = (1..=last_positive)
            .map(|i| {
                let dx = self.angles_deg[i].to_radians() - self.angles_deg[i - 1].to_radians();
                0.5 * (self.gz_m[i] + self.gz_m[i - 1]) * dx
            })
            .sum();

        GzCurveStats {
            max_gz_m: self.gz_m[i_max],
            angle_at_max_gz_deg: self.angles_deg[i_max],
            area_m_rad: area,
            range_positive_deg: self.angles_deg[last_positive],
        }
    }
}
