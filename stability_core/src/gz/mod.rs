//! # Righting-Arm (GZ) Engine
//!
//! - [`kn_table`] - KN cross curves by displacement and heel angle, per trim sheet
//! - [`curve`] - GZ curve sampling and curve statistics
//! - [`cache`] - Modification-time aware cache of KN workbooks loaded from disk
//!
//! ## Example
//!
//! ```rust
//! use stability_core::gz::{compute_gz_curve, KnTable, DEFAULT_ANGLE_MAX_DEG, DEFAULT_ANGLE_STEP_DEG};
//!
//! let table = KnTable::new(vec![5000.0], vec![10.0, 30.0, 60.0], vec![vec![1.2, 3.3, 5.0]]).unwrap();
//! let row = table.row_for_displacement(5000.0);
//! let curve = compute_gz_curve(4.0, &row, DEFAULT_ANGLE_STEP_DEG, DEFAULT_ANGLE_MAX_DEG);
//!
//! let stats = curve.stats();
//! assert!(stats.max_gz_m > 0.0);
//! ```

pub mod cache;
pub mod curve;
pub mod kn_table;

pub use cache::{load_kn_workbook, KnTableCache};
pub use curve::{compute_gz_curve, GzCurve, GzCurveStats, DEFAULT_ANGLE_MAX_DEG, DEFAULT_ANGLE_STEP_DEG, GZ_POSITIVE_THRESHOLD_M, MAX_GZ_SAMPLES};
pub use kn_table::{angle_label, kn_bilinear, parse_angle_label, KnRow, KnSheet, KnTable, KnWorkbook, KN_ANGLE_MIN_DEG};
