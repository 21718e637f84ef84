//! # Stability Calculations
//!
//! The condition pipeline, in the order a condition is evaluated:
//!
//! - [`condition`] - Weights, draft, trim, KG/KM/GM, heel
//! - [`strength`] - Still-water bending moment and shear estimate
//! - [`ancillary`] - Propeller immersion, visibility, air draft
//! - [`validation`] - Free-surface correction and rule checks
//! - [`criteria`] - IMO, livestock and ancillary criteria lines
//!
//! Every step is a pure function of its input. All inputs and results are
//! JSON-serializable.

pub mod ancillary;
pub mod condition;
pub mod criteria;
pub mod strength;
pub mod validation;

// Re-export commonly used types
pub use ancillary::{compute_ancillary, AncillaryResults};
pub use condition::{compute_condition, ComputationPath, ConditionResults, CurveSource, LightshipSource, LoadingInput};
pub use criteria::{evaluate_all_criteria, CriteriaEvaluation, CriterionGroup, CriterionLine, CriterionResult};
pub use strength::{compute_strength, StrengthInput, StrengthResult};
pub use validation::{compute_free_surface_correction, validate_condition, IssueCode, Severity, ValidationIssue, ValidationResult};
