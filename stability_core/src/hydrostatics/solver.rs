//! # Draft and Trim Solver
//!
//! Solves the mean draft at which the hull supports a displacement and the
//! trim produced by the separation of LCG and LCB.
//!
//! Tabulated curves are preferred; every value falls back to the closed-form
//! formulas when the curves are missing, invalid or lack the needed column.
//! Each result records which path produced it in a [`HydroMethod`] so the
//! fallback chain can be asserted on.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::curves::HydrostaticCurves;
use super::formulas::{self, draft_from_displacement, kb_from_draft, transverse_bm};

/// Which source produced a hydrostatic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HydroMethod {
    /// Interpolated from hydrostatic curves
    Curves,
    /// Closed-form box approximation
    Formula,
    /// Not computed (degenerate input)
    Skipped,
}

/// Mean draft and trim for a displacement and LCG.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DraftTrimSolution {
    pub draft_m: f64,
    /// Positive when LCG lies forward of LCB
    pub trim_m: f64,
    /// LCB used for the trim balance
    pub lcb_norm: f64,
    pub draft_method: HydroMethod,
    pub trim_method: HydroMethod,
}

impl DraftTrimSolution {
    fn skipped() -> Self {
        DraftTrimSolution {
            draft_m: 0.0,
            trim_m: 0.0,
            lcb_norm: 0.5,
            draft_method: HydroMethod::Skipped,
            trim_method: HydroMethod::Skipped,
        }
    }
}

/// Solve mean draft and trim.
///
/// `lcg_norm` is expected to be clamped to [0.001, 0.999] by the caller.
///
/// # Example
///
/// ```rust
/// use stability_core::hydrostatics::{solve_draft_and_trim, HydroMethod};
///
/// let solution = solve_draft_and_trim(10_000.0, 150.0, 25.0, 0.5, 1.025, 0.63, None);
/// assert_eq!(solution.draft_method, HydroMethod::Formula);
/// assert_eq!(solution.trim_m, 0.0);
/// ```
pub fn solve_draft_and_trim(
    displacement_t: f64,
    length_m: f64,
    breadth_m: f64,
    lcg_norm: f64,
    density: f64,
    block_coefficient: f64,
    curves: Option<&HydrostaticCurves>,
) -> DraftTrimSolution {
    if displacement_t <= 0.0 || length_m <= 0.0 || breadth_m <= 0.0 {
        return DraftTrimSolution::skipped();
    }

    let curves = match curves {
        Some(c) if c.is_valid() => c,
        _ => {
            debug!("no valid hydrostatic curves, solving draft and trim from formulas");
            let draft = draft_from_displacement(displacement_t, length_m, breadth_m, block_coefficient, density);
            let trim = formulas::trim_from_lcg_lcb(displacement_t, lcg_norm, length_m, breadth_m, density, 0.5);
            return DraftTrimSolution {
                draft_m: draft,
                trim_m: trim,
                lcb_norm: 0.5,
                draft_method: HydroMethod::Formula,
                trim_method: HydroMethod::Formula,
            };
        }
    };

    let mut draft = curves.draft_for_displacement(displacement_t);
    let mut draft_method = HydroMethod::Curves;
    if curves.max_displacement().is_some_and(|max| displacement_t > max) {
        debug!(displacement_t, "displacement beyond hydrostatic curves, using formula draft");
        draft = draft_from_displacement(displacement_t, length_m, breadth_m, block_coefficient, density);
        draft_method = HydroMethod::Formula;
    } else if draft <= 0.0 {
        debug!(displacement_t, "curve draft not positive, using formula draft");
        draft = draft_from_displacement(displacement_t, length_m, breadth_m, block_coefficient, density);
        draft_method = HydroMethod::Formula;
    }

    let lcb_norm = curves.lcb_at(draft).unwrap_or(0.5);

    // Curve inertia is only read inside the tabulated range
    let i_l = curves.i_l_at(draft).filter(|_| draft_method == HydroMethod::Curves);
    let (trim, trim_method) = match i_l {
        Some(i_l) if density > 0.0 => {
            let bm_l = i_l / (displacement_t / density);
            (formulas::trim_from_bm_l(displacement_t, lcg_norm, lcb_norm, length_m, bm_l), HydroMethod::Curves)
        }
        _ => {
            debug!("curves have no longitudinal inertia, using formula trim");
            (
                formulas::trim_from_lcg_lcb(displacement_t, lcg_norm, length_m, breadth_m, density, lcb_norm),
                HydroMethod::Formula,
            )
        }
    };

    DraftTrimSolution {
        draft_m: draft,
        trim_m: trim,
        lcb_norm,
        draft_method,
        trim_method,
    }
}

/// KB at a draft from curves, falling back to the formula.
pub fn kb_at_draft(draft_m: f64, curves: Option<&HydrostaticCurves>) -> (f64, HydroMethod) {
    match curves.filter(|c| c.is_valid()).and_then(|c| c.kb_at(draft_m)) {
        Some(kb) => (kb, HydroMethod::Curves),
        None => (kb_from_draft(draft_m), HydroMethod::Formula),
    }
}

/// Transverse BM from the curve waterplane inertia, falling back to the formula.
pub fn transverse_bm_at(
    draft_m: f64,
    displacement_t: f64,
    length_m: f64,
    breadth_m: f64,
    density: f64,
    curves: Option<&HydrostaticCurves>,
) -> (f64, HydroMethod) {
    if displacement_t > 0.0 && density > 0.0 {
        if let Some(i_t) = curves.filter(|c| c.is_valid()).and_then(|c| c.i_t_at(draft_m)) {
            return (i_t / (displacement_t / density), HydroMethod::Curves);
        }
    }
    (transverse_bm(displacement_t, length_m, breadth_m, density), HydroMethod::Formula)
}
