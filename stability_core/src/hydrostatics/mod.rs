//! # Hydrostatics
//!
//! Draft, buoyancy and metacentric properties of the hull.
//!
//! ## Modules
//!
//! - [`formulas`] - Closed-form box approximations used when no tabulated data exists
//! - [`curves`] - Tabulated hydrostatic curves with forward and inverse interpolation
//! - [`solver`] - Mean draft and trim from displacement and LCG
//!
//! ## Conventions
//!
//! - **Longitudinal positions**: 0-1 fraction of length overall, 0 at the aft perpendicular
//! - **Trim**: positive when G lies forward of B; aft mark = draft + trim/2
//! - **Vertical positions**: metres above baseline

pub mod curves;
pub mod formulas;
pub mod solver;

pub use curves::{build_curves_from_formulas, HydrostaticCurves};
pub use solver::{solve_draft_and_trim, DraftTrimSolution, HydroMethod};
