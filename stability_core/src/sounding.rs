//! # Tank Sounding Tables
//!
//! Per-tank calibration rows: sounding, volume and the centre of gravity of
//! the liquid at that volume, with optional ullage and free-surface moment.
//!
//! Rows are kept sorted by volume. Lookups interpolate linearly between the
//! bracketing rows and clamp to the first or last row outside the table.
//!
//! ## Example
//!
//! ```rust
//! use stability_core::sounding::{SoundingRow, SoundingTable};
//!
//! let table = SoundingTable::new(
//!     1,
//!     vec![
//!         SoundingRow { volume_m3: 0.0, vcg_m: 0.2, lcg_m: 40.0, ..Default::default() },
//!         SoundingRow { volume_m3: 100.0, vcg_m: 1.2, lcg_m: 40.0, ..Default::default() },
//!     ],
//! );
//!
//! let cog = table.cog_at_volume(50.0).unwrap();
//! assert!((cog.vcg_m - 0.7).abs() < 1e-12);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{TankCog, TankId};

/// Volume difference below which two rows count as the same volume
const VOLUME_EPS: f64 = 1e-12;

/// One calibration row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SoundingRow {
    pub sounding_m: f64,
    pub volume_m3: f64,
    pub vcg_m: f64,
    /// From the aft perpendicular
    pub lcg_m: f64,
    pub tcg_m: f64,
    pub ullage_m: Option<f64>,
    /// Free-surface moment (t·m)
    pub fsm_tm: Option<f64>,
}

/// Ullage and free-surface moment at a volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UllageFsm {
    pub ullage_m: f64,
    pub fsm_tm: f64,
}

/// Sounding table of one tank, rows sorted by volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SoundingTableRepr")]
pub struct SoundingTable {
    pub tank_id: TankId,
    rows: Vec<SoundingRow>,
}

#[derive(Deserialize)]
struct SoundingTableRepr {
    tank_id: TankId,
    rows: Vec<SoundingRow>,
}

impl From<SoundingTableRepr> for SoundingTable {
    fn from(repr: SoundingTableRepr) -> Self {
        SoundingTable::new(repr.tank_id, repr.rows)
    }
}

impl SoundingTable {
    pub fn new(tank_id: TankId, mut rows: Vec<SoundingRow>) -> Self {
        rows.sort_by(|a, b| a.volume_m3.total_cmp(&b.volume_m3));
        SoundingTable { tank_id, rows }
    }

    pub fn rows(&self) -> &[SoundingRow] {
        &self.rows
    }

    /// True when every row carries a free-surface moment.
    pub fn has_fsm(&self) -> bool {
        !self.rows.is_empty() && self.rows.iter().all(|r| r.fsm_tm.is_some())
    }

    /// Bracketing rows and the interpolation factor for a volume.
    ///
    /// Rows with equal volume resolve to the upper row (t = 1).
    fn bracket(&self, volume_m3: f64) -> Option<(&SoundingRow, &SoundingRow, f64)> {
        let first = self.rows.first()?;
        let last = self.rows.last()?;
        if volume_m3 <= first.volume_m3 {
            return Some((first, first, 0.0));
        }
        if volume_m3 >= last.volume_m3 {
            return Some((last, last, 0.0));
        }
        self.rows
            .windows(2)
            .find(|w| w[0].volume_m3 <= volume_m3 && volume_m3 <= w[1].volume_m3)
            .map(|w| {
                let (r0, r1) = (&w[0], &w[1]);
                let dv = r1.volume_m3 - r0.volume_m3;
                let t = if dv.abs() < VOLUME_EPS { 1.0 } else { (volume_m3 - r0.volume_m3) / dv };
                (r0, r1, t)
            })
    }

    /// Liquid centre of gravity at a volume; `None` for an empty table.
    pub fn cog_at_volume(&self, volume_m3: f64) -> Option<TankCog> {
        let (r0, r1, t) = self.bracket(volume_m3)?;
        let lerp = |a: f64, b: f64| a + t * (b - a);
        Some(TankCog {
            vcg_m: finite_or_zero(lerp(r0.vcg_m, r1.vcg_m)),
            lcg_m: finite_or_zero(lerp(r0.lcg_m, r1.lcg_m)),
            tcg_m: finite_or_zero(lerp(r0.tcg_m, r1.tcg_m)),
        })
    }

    /// Ullage and FSM at a volume; missing row values count as zero.
    pub fn ullage_fsm_at_volume(&self, volume_m3: f64) -> Option<UllageFsm> {
        let (r0, r1, t) = self.bracket(volume_m3)?;
        let lerp = |a: Option<f64>, b: Option<f64>| {
            let (a, b) = (a.unwrap_or(0.0), b.unwrap_or(0.0));
            a + t * (b - a)
        };
        Some(UllageFsm {
            ullage_m: lerp(r0.ullage_m, r1.ullage_m),
            fsm_tm: lerp(r0.fsm_tm, r1.fsm_tm),
        })
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Per-tank values derived from sounding tables for one condition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TankOverrides {
    /// Liquid centre of gravity by tank
    pub cog: BTreeMap<TankId, TankCog>,
    /// Free-surface moment by tank (t·m)
    pub fsm_tm: BTreeMap<TankId, f64>,
}

impl TankOverrides {
    pub fn is_empty(&self) -> bool {
        self.cog.is_empty() && self.fsm_tm.is_empty()
    }
}

/// Interpolate every tank that has a sounding table at its condition volume.
///
/// Tanks without a table, or not present in `volumes`, are left out so the
/// computation falls back to the tank's stored position and KG.
pub fn derive_tank_overrides(tables: &[SoundingTable], volumes: &BTreeMap<TankId, f64>) -> TankOverrides {
    let mut overrides = TankOverrides::default();
    for table in tables {
        let Some(&volume) = volumes.get(&table.tank_id) else {
            continue;
        };
        if let Some(cog) = table.cog_at_volume(volume) {
            overrides.cog.insert(table.tank_id, cog);
        }
        if table.has_fsm() {
            if let Some(values) = table.ullage_fsm_at_volume(volume) {
                overrides.fsm_tm.insert(table.tank_id, values.fsm_tm);
            }
        }
    }
    overrides
}
