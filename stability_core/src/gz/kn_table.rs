//! # KN Tables
//!
//! Cross-curve data: KN (m) tabulated against displacement (rows) and heel
//! angle (columns), one table per trim sheet.
//!
//! Construction through [`KnTable::new`] normalises the data once:
//!
//! - rows with a non-finite displacement or no KN values are dropped
//! - rows are sorted by displacement, columns by angle, duplicate angles removed
//! - gaps in a column are filled by interpolating over displacement
//! - a 0° column with KN = 0 is added when the data starts above 0°
//!
//! ## Low-angle rule
//!
//! Tabulated KN is not trusted below 10°. For θ < 10° the value is scaled
//! from the 10° value: `KN(θ) = KN(10°) · θ / 10`.
//!
//! ## Example
//!
//! ```rust
//! use stability_core::gz::KnTable;
//!
//! let table = KnTable::new(
//!     vec![4000.0, 8000.0],
//!     vec![10.0, 20.0, 30.0],
//!     vec![vec![2.0, 4.0, 6.0], vec![1.8, 3.6, 5.4]],
//! )
//! .unwrap();
//!
//! let row = table.row_for_displacement(6000.0);
//! assert!((row.kn_at(20.0) - 3.8).abs() < 1e-12);
//! assert_eq!(row.kn_at(5.0), row.kn_at(10.0) * 0.5);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{StabResult, StabilityError};
use crate::hydrostatics::curves::interpolate;

/// Lowest heel angle at which tabulated KN is used directly (degrees)
pub const KN_ANGLE_MIN_DEG: f64 = 10.0;

/// Largest heel angle accepted as a column (degrees)
pub const KN_ANGLE_MAX_DEG: f64 = 90.0;

/// Tolerance when matching an angle to a column (degrees)
const ANGLE_MATCH_TOL_DEG: f64 = 0.01;

// =============================================================================
// Angle labels
// =============================================================================

/// Canonical column label for an angle: `10°`, `20.5°`.
pub fn angle_label(angle_deg: f64) -> String {
    if angle_deg.fract() == 0.0 {
        format!("{}°", angle_deg as i64)
    } else {
        format!("{}°", angle_deg)
    }
}

/// Markers of a heel-angle column header, matched case-insensitively
const ANGLE_HINTS: [&str; 4] = ["kn", "kz", "deg", "°"];

/// Parse a column header such as `10°` or `KN 20.0 deg. Starb.` to an angle.
///
/// The header must carry one of `kn`, `kz`, `deg` or `°`; the angle is the
/// first number in it. Returns `None` otherwise or when the angle is outside
/// 0-90°.
pub fn parse_angle_label(label: &str) -> Option<f64> {
    let lower = label.to_lowercase();
    if !ANGLE_HINTS.iter().any(|hint| lower.contains(hint)) {
        return None;
    }
    let angle = first_number(label)?;
    (0.0..=KN_ANGLE_MAX_DEG).contains(&angle).then_some(angle)
}

/// First digit run with at most one decimal point, signed by a directly preceding `-`.
fn first_number(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let mut end = start;
    let mut seen_point = false;
    for (i, c) in text[start..].char_indices() {
        match c {
            '0'..='9' => end = start + i + 1,
            '.' if !seen_point => seen_point = true,
            _ => break,
        }
    }
    let value: f64 = text[start..end].parse().ok()?;
    Some(if text[..start].ends_with('-') { -value } else { value })
}

// =============================================================================
// KnTable
// =============================================================================

/// KN surface for one trim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnTable {
    /// Ascending displacement rows (t)
    displacements_t: Vec<f64>,
    /// Ascending heel angles (degrees), starting at 0
    angles_deg: Vec<f64>,
    /// `kn_m[row][column]`
    kn_m: Vec<Vec<f64>>,
}

impl KnTable {
    /// Build a normalised table.
    ///
    /// Missing KN values may be passed as `f64::NAN`.
    ///
    /// # Errors
    ///
    /// `InvalidTable` when the matrix shape does not match the axes, an angle
    /// is outside 0-90°, or no usable row or column remains.
    pub fn new(displacements_t: Vec<f64>, angles_deg: Vec<f64>, kn_m: Vec<Vec<f64>>) -> StabResult<Self> {
        if angles_deg.is_empty() {
            return Err(StabilityError::invalid_table("kn", "No heel angle columns"));
        }
        if kn_m.len() != displacements_t.len() {
            return Err(StabilityError::invalid_table(
                "kn",
                format!("{} KN rows for {} displacements", kn_m.len(), displacements_t.len()),
            ));
        }
        if let Some(row) = kn_m.iter().find(|r| r.len() != angles_deg.len()) {
            return Err(StabilityError::invalid_table(
                "kn",
                format!("KN row has {} values for {} angles", row.len(), angles_deg.len()),
            ));
        }
        if let Some(bad) = angles_deg.iter().find(|a| !(0.0..=KN_ANGLE_MAX_DEG).contains(*a)) {
            return Err(StabilityError::invalid_table("kn", format!("Heel angle {} outside 0-90°", bad)));
        }

        // Usable rows, sorted by displacement
        let mut rows: Vec<(f64, Vec<f64>)> = displacements_t
            .into_iter()
            .zip(kn_m)
            .filter(|(d, kn)| d.is_finite() && kn.iter().any(|v| v.is_finite()))
            .collect();
        if rows.is_empty() {
            return Err(StabilityError::invalid_table("kn", "No rows with KN values"));
        }
        rows.sort_by(|a, b| a.0.total_cmp(&b.0));

        // Columns sorted by angle; first occurrence of a repeated angle wins
        let mut order: Vec<usize> = (0..angles_deg.len()).collect();
        order.sort_by(|&a, &b| angles_deg[a].total_cmp(&angles_deg[b]));
        order.dedup_by(|b, a| angles_deg[*a] == angles_deg[*b]);

        let displacements: Vec<f64> = rows.iter().map(|(d, _)| *d).collect();
        let mut angles = Vec::with_capacity(order.len() + 1);
        let mut columns: Vec<Vec<f64>> = Vec::with_capacity(order.len() + 1);
        for j in order {
            let column: Vec<f64> = rows.iter().map(|(_, kn)| kn[j]).collect();
            match fill_column_gaps(&displacements, column) {
                Some(filled) => {
                    angles.push(angles_deg[j]);
                    columns.push(filled);
                }
                None => debug!(angle = angles_deg[j], "dropping KN column with no values"),
            }
        }
        if angles.is_empty() {
            return Err(StabilityError::invalid_table("kn", "No columns with KN values"));
        }
        if angles[0] > 0.0 {
            angles.insert(0, 0.0);
            columns.insert(0, vec![0.0; displacements.len()]);
        }

        let kn_m = (0..displacements.len())
            .map(|i| columns.iter().map(|c| c[i]).collect())
            .collect();

        Ok(KnTable {
            displacements_t: displacements,
            angles_deg: angles,
            kn_m,
        })
    }

    pub fn displacements_t(&self) -> &[f64] {
        &self.displacements_t
    }

    pub fn angles_deg(&self) -> &[f64] {
        &self.angles_deg
    }

    /// KN row interpolated to a displacement.
    ///
    /// Each angle column is interpolated linearly between the two rows that
    /// bracket `displacement_t`; outside the tabulated range the first or
    /// last row is used.
    pub fn row_for_displacement(&self, displacement_t: f64) -> KnRow {
        let last = self.displacements_t.len() - 1;
        let kn_m = if displacement_t <= self.displacements_t[0] {
            self.kn_m[0].clone()
        } else if displacement_t >= self.displacements_t[last] {
            self.kn_m[last].clone()
        } else {
            let i1 = self.displacements_t.partition_point(|&d| d < displacement_t);
            let i0 = i1.saturating_sub(1);
            let (d0, d1) = (self.displacements_t[i0], self.displacements_t[i1]);
            if i0 == i1 || d1 <= d0 {
                self.kn_m[i0].clone()
            } else {
                let t = (displacement_t - d0) / (d1 - d0);
                self.kn_m[i0]
                    .iter()
                    .zip(&self.kn_m[i1])
                    .map(|(a, b)| (1.0 - t) * a + t * b)
                    .collect()
            }
        };
        KnRow {
            angles_deg: self.angles_deg.clone(),
            kn_m,
        }
    }
}

/// Fill non-finite entries by interpolation over displacement.
///
/// Returns `None` for a column with no finite value.
fn fill_column_gaps(displacements: &[f64], column: Vec<f64>) -> Option<Vec<f64>> {
    if column.iter().all(|v| v.is_finite()) {
        return Some(column);
    }
    let (xs, ys): (Vec<f64>, Vec<f64>) = displacements
        .iter()
        .zip(&column)
        .filter(|(_, v)| v.is_finite())
        .map(|(d, v)| (*d, *v))
        .unzip();
    if xs.is_empty() {
        return None;
    }
    Some(
        displacements
            .iter()
            .zip(column)
            .map(|(d, v)| if v.is_finite() { v } else { interpolate(*d, &xs, &ys) })
            .collect(),
    )
}

/// Bilinear KN: displacement rows first, then angle columns.
pub fn kn_bilinear(table: &KnTable, displacement_t: f64, angle_deg: f64) -> f64 {
    table.row_for_displacement(displacement_t).kn_at(angle_deg)
}

// =============================================================================
// KnRow
// =============================================================================

/// KN against heel angle at one displacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnRow {
    pub angles_deg: Vec<f64>,
    pub kn_m: Vec<f64>,
}

impl KnRow {
    /// KN at a heel angle.
    ///
    /// Linear between bracketing columns, clamped outside the tabulated
    /// range, and scaled from KN(10°) below 10°.
    pub fn kn_at(&self, angle_deg: f64) -> f64 {
        if angle_deg < KN_ANGLE_MIN_DEG {
            return self.kn_at(KN_ANGLE_MIN_DEG) * (angle_deg / KN_ANGLE_MIN_DEG);
        }
        if self.angles_deg.is_empty() || self.angles_deg.len() != self.kn_m.len() {
            return 0.0;
        }
        let last = self.angles_deg.len() - 1;
        if angle_deg <= self.angles_deg[0] {
            return self.kn_m[0];
        }
        if angle_deg >= self.angles_deg[last] {
            return self.kn_m[last];
        }
        let j1 = self.angles_deg.partition_point(|&a| a < angle_deg);
        let j0 = j1.saturating_sub(1);
        let (a0, a1) = (self.angles_deg[j0], self.angles_deg[j1]);
        if j0 == j1 || a1 <= a0 {
            return self.kn_m[j0];
        }
        let t = (angle_deg - a0) / (a1 - a0);
        (1.0 - t) * self.kn_m[j0] + t * self.kn_m[j1]
    }

    /// Tabulated KN for a column label such as `"10°"`.
    pub fn kn_by_label(&self, label: &str) -> Option<f64> {
        let angle = parse_angle_label(label)?;
        self.angles_deg
            .iter()
            .position(|a| (a - angle).abs() < ANGLE_MATCH_TOL_DEG)
            .map(|j| self.kn_m[j])
    }

    /// Column labels in angle order.
    pub fn labels(&self) -> Vec<String> {
        self.angles_deg.iter().map(|&a| angle_label(a)).collect()
    }
}

// =============================================================================
// Workbook
// =============================================================================

/// KN table for one trim; the name is normally the trim in metres.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnSheet {
    pub name: String,
    pub table: KnTable,
}

/// KN tables for several trims.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct KnWorkbook {
    pub sheets: Vec<KnSheet>,
}

impl KnWorkbook {
    /// Sheet whose name is numerically nearest to `trim_m`.
    ///
    /// Names that are not numbers are skipped; when none parse, the first
    /// sheet is returned. `None` only for an empty workbook.
    pub fn sheet_for_trim(&self, trim_m: f64) -> Option<&KnSheet> {
        let mut best = self.sheets.first()?;
        let mut best_diff = f64::INFINITY;
        for sheet in &self.sheets {
            if let Ok(sheet_trim) = sheet.name.trim().parse::<f64>() {
                let diff = (sheet_trim - trim_m).abs();
                if diff < best_diff {
                    best_diff = diff;
                    best = sheet;
                }
            }
        }
        Some(best)
    }

    /// KN row for a displacement on the sheet nearest to `trim_m`.
    pub fn row_for(&self, displacement_t: f64, trim_m: f64) -> Option<KnRow> {
        self.sheet_for_trim(trim_m).map(|s| s.table.row_for_displacement(displacement_t))
    }

    /// Parse the JSON workbook layout.
    ///
    /// ```json
    /// { "sheets": [ { "name": "0.0",
    ///     "rows": [ { "displacement_t": 4000.0, "kn": { "10°": 1.9, "20°": 3.7 } } ] } ] }
    /// ```
    ///
    /// Column labels that do not read as an angle are skipped; `null` or
    /// absent values are filled from neighbouring rows.
    pub fn from_json(json: &str) -> StabResult<Self> {
        let file: WorkbookFile = serde_json::from_str(json)?;
        let mut sheets = Vec::with_capacity(file.sheets.len());
        for sheet in file.sheets {
            let table = sheet_to_table(&sheet).map_err(|e| match e {
                StabilityError::InvalidTable { reason, .. } => StabilityError::invalid_table(format!("kn sheet '{}'", sheet.name), reason),
                other => other,
            })?;
            sheets.push(KnSheet { name: sheet.name, table });
        }
        if sheets.is_empty() {
            return Err(StabilityError::invalid_table("kn", "Workbook has no sheets"));
        }
        Ok(KnWorkbook { sheets })
    }
}

#[derive(Deserialize)]
struct WorkbookFile {
    sheets: Vec<SheetFile>,
}

#[derive(Deserialize)]
struct SheetFile {
    name: String,
    rows: Vec<RowFile>,
}

#[derive(Deserialize)]
struct RowFile {
    displacement_t: f64,
    kn: BTreeMap<String, Option<f64>>,
}

fn sheet_to_table(sheet: &SheetFile) -> StabResult<KnTable> {
    let mut columns: BTreeMap<&str, f64> = BTreeMap::new();
    for row in &sheet.rows {
        for label in row.kn.keys() {
            if columns.contains_key(label.as_str()) {
                continue;
            }
            match parse_angle_label(label) {
                Some(angle) => {
                    columns.insert(label.as_str(), angle);
                }
                None => warn!(sheet = %sheet.name, column = %label, "skipping KN column without a heel angle"),
            }
        }
    }

    let angles: Vec<f64> = columns.values().copied().collect();
    let displacements = sheet.rows.iter().map(|r| r.displacement_t).collect();
    let kn = sheet
        .rows
        .iter()
        .map(|row| {
            columns
                .keys()
                .map(|label| row.kn.get(*label).copied().flatten().unwrap_or(f64::NAN))
                .collect()
        })
        .collect();
    KnTable::new(displacements, angles, kn)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> KnTable {
        KnTable::new(
            vec![8000.0, 4000.0],
            vec![30.0, 10.0, 20.0],
            vec![vec![5.4, 1.8, 3.6], vec![6.0, 2.0, 4.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_normalisation() {
        let table = table();
        assert_eq!(table.displacements_t(), &[4000.0, 8000.0]);
        assert_eq!(table.angles_deg(), &[0.0, 10.0, 20.0, 30.0]);
        let row = table.row_for_displacement(4000.0);
        assert_eq!(row.kn_m, vec![0.0, 2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_zero_column_not_duplicated() {
        let table = KnTable::new(vec![1000.0], vec![0.0, 10.0, 10.0], vec![vec![0.0, 1.0, 9.0]]).unwrap();
        assert_eq!(table.angles_deg(), &[0.0, 10.0]);
        assert_eq!(table.row_for_displacement(1000.0).kn_at(10.0), 1.0);
    }

    #[test]
    fn test_shape_errors() {
        assert!(KnTable::new(vec![1000.0], vec![], vec![vec![]]).is_err());
        assert!(KnTable::new(vec![1000.0, 2000.0], vec![10.0], vec![vec![1.0]]).is_err());
        assert!(KnTable::new(vec![1000.0], vec![10.0, 20.0], vec![vec![1.0]]).is_err());
        assert!(KnTable::new(vec![1000.0], vec![95.0], vec![vec![1.0]]).is_err());
        assert!(KnTable::new(vec![f64::NAN], vec![10.0], vec![vec![1.0]]).is_err());
    }

    #[test]
    fn test_gaps_filled_over_displacement() {
        let table = KnTable::new(
            vec![1000.0, 2000.0, 3000.0],
            vec![10.0],
            vec![vec![1.0], vec![f64::NAN], vec![3.0]],
        )
        .unwrap();
        assert!((table.row_for_displacement(2000.0).kn_at(10.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_displacement_interpolation_and_clamping() {
        let table = table();
        let row = table.row_for_displacement(6000.0);
        assert!((row.kn_at(10.0) - 1.9).abs() < 1e-12);
        assert_eq!(table.row_for_displacement(100.0), table.row_for_displacement(4000.0));
        assert_eq!(table.row_for_displacement(1e6), table.row_for_displacement(8000.0));
        assert!((kn_bilinear(&table, 6000.0, 25.0) - 0.5 * (3.8 + 5.7)).abs() < 1e-12);
    }

    #[test]
    fn test_low_angle_rule() {
        let row = table().row_for_displacement(5000.0);
        assert_eq!(row.kn_at(5.0), row.kn_at(10.0) * 0.5);
        assert_eq!(row.kn_at(0.0), 0.0);
        // Tabulated angle clamp above the last column
        assert_eq!(row.kn_at(60.0), row.kn_at(30.0));

        // Table starting at 20°: KN(10°) is interpolated towards the 0° column
        let sparse = KnTable::new(vec![1000.0], vec![20.0], vec![vec![4.0]]).unwrap();
        let row = sparse.row_for_displacement(1000.0);
        assert!((row.kn_at(10.0) - 2.0).abs() < 1e-12);
        assert_eq!(row.kn_at(5.0), row.kn_at(10.0) * 0.5);
    }

    #[test]
    fn test_labels() {
        assert_eq!(angle_label(10.0), "10°");
        assert_eq!(angle_label(20.5), "20.5°");
        assert_eq!(parse_angle_label("KN 20.0 deg. Starb."), Some(20.0));
        assert_eq!(parse_angle_label("KN 7.5 deg. Starb."), Some(7.5));
        assert_eq!(parse_angle_label("kz 40"), Some(40.0));
        assert_eq!(parse_angle_label("15 DEG"), Some(15.0));
        assert_eq!(parse_angle_label("Draft"), None);
        assert_eq!(parse_angle_label("120°"), None);
        assert_eq!(parse_angle_label("-10°"), None);

        // A number without an angle marker is not a KN column
        assert_eq!(parse_angle_label("Draft 5"), None);
        assert_eq!(parse_angle_label("30"), None);

        let row = table().row_for_displacement(4000.0);
        assert_eq!(row.kn_by_label("20°"), Some(4.0));
        assert_eq!(row.kn_by_label("25°"), None);
        assert_eq!(row.labels(), vec!["0°", "10°", "20°", "30°"]);
    }

    #[test]
    fn test_sheet_for_trim() {
        let json = r#"{
            "sheets": [
                { "name": "Notes", "rows": [ { "displacement_t": 1000.0, "kn": { "10°": 9.0 } } ] },
                { "name": "0.0", "rows": [ { "displacement_t": 1000.0, "kn": { "10°": 1.0 } } ] },
                { "name": "1.0", "rows": [ { "displacement_t": 1000.0, "kn": { "10°": 2.0, "Remark": null } } ] }
            ]
        }"#;
        let workbook = KnWorkbook::from_json(json).unwrap();
        assert_eq!(workbook.sheet_for_trim(0.2).map(|s| s.name.as_str()), Some("0.0"));
        assert_eq!(workbook.sheet_for_trim(0.8).map(|s| s.name.as_str()), Some("1.0"));
        // Tie goes to the first numeric sheet
        assert_eq!(workbook.sheet_for_trim(0.5).map(|s| s.name.as_str()), Some("0.0"));
        assert_eq!(workbook.row_for(1000.0, 5.0).and_then(|r| r.kn_by_label("10°")), Some(2.0));

        let names_only = KnWorkbook {
            sheets: vec![workbook.sheets[0].clone()],
        };
        assert_eq!(names_only.sheet_for_trim(3.0).map(|s| s.name.as_str()), Some("Notes"));
        assert!(KnWorkbook::default().sheet_for_trim(0.0).is_none());
    }

    #[test]
    fn test_workbook_reads_only_angle_columns() {
        let json = r#"{
            "sheets": [ { "name": "0.0", "rows": [
                { "displacement_t": 1000.0, "kn": { "KN 10.0 deg. Starb.": 1.0, "KN 20.0 deg. Starb.": 2.0, "Draft 5": 4.2 } }
            ] } ]
        }"#;
        let workbook = KnWorkbook::from_json(json).unwrap();
        let angles = workbook.sheets[0].table.angles_deg();
        assert!(angles.contains(&10.0));
        assert!(angles.contains(&20.0));
        assert!(!angles.contains(&5.0));

        let row = workbook.row_for(1000.0, 0.0).unwrap();
        assert_eq!(row.kn_by_label("20°"), Some(2.0));
    }

    #[test]
    fn test_from_json_errors() {
        assert!(KnWorkbook::from_json("not json").is_err());
        assert!(KnWorkbook::from_json(r#"{ "sheets": [] }"#).is_err());
        let err = KnWorkbook::from_json(r#"{ "sheets": [ { "name": "0", "rows": [] } ] }"#).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_TABLE");
    }
}
