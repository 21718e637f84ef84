//! # stability_core - Livestock Carrier Stability Engine
//!
//! `stability_core` computes the intact stability of a livestock carrier for a
//! loading condition: displacement, draft and trim, KG, KM and GM, longitudinal
//! strength, ancillary checks (propeller immersion, bridge visibility, air
//! draft), validation issues and the IMO / livestock criteria set. GZ curves
//! come from KN cross curves loaded per trim sheet.
//!
//! ## Design Philosophy
//!
//! - **Total**: the numerical core never fails; degenerate inputs give zero results
//! - **JSON-First**: inputs and results implement Serialize/Deserialize
//! - **Traceable**: every evaluated condition carries an id-stamped snapshot
//!
//! ## Quick Start
//!
//! ```rust
//! use stability_core::{evaluate_condition, LoadingInput};
//! use stability_core::model::{LivestockPen, LoadingCondition, Ship, Tank};
//!
//! let ship = Ship::new("MV Example", 150.0, 25.0, 15.0, 10.0);
//! let tanks = vec![Tank::new(1, "DB1", 12_000.0, 0.5, 3.0)];
//! let pens = vec![LivestockPen::new(1, "A", 12.0, 75.0, 60.0)];
//! let condition = LoadingCondition::new("Departure")
//!     .with_tank_volume(1, 12_000.0)
//!     .with_pen_loading(1, 30);
//!
//! let results = evaluate_condition(&LoadingInput::new(&ship, &tanks, &condition).with_pens(&pens), None)?;
//! assert!((results.displacement_t - 12_015.0).abs() < 1e-9);
//! println!("{}", serde_json::to_string_pretty(&results).unwrap());
//! # Ok::<(), stability_core::StabilityError>(())
//! ```
//!
//! ## Modules
//!
//! - [`model`] - Ship, tank, pen and loading-condition records
//! - [`hydrostatics`] - Box-hull formulas, hydrostatic curves and the equilibrium solver
//! - [`calculations`] - Condition pipeline, strength, ancillary checks, validation, criteria
//! - [`gz`] - KN tables and GZ curves
//! - [`sounding`] - Tank sounding tables
//! - [`service`] - Full evaluation with validation, criteria and snapshot
//! - [`alarms`] - Status rows for an alarms panel
//! - [`traceability`] - Calculation snapshots
//! - [`project`] - Project container and stored conditions
//! - [`settings`] - Constants, limits and the reference vessel
//! - [`errors`] - Structured error types
//! - `file_io` - Atomic saves and file locking (native targets only)

pub mod alarms;
pub mod calculations;
pub mod errors;
#[cfg(not(target_arch = "wasm32"))]
pub mod file_io;
pub mod gz;
pub mod hydrostatics;
pub mod model;
pub mod project;
pub mod service;
pub mod settings;
pub mod sounding;
pub mod traceability;

// Re-export commonly used types at crate root for convenience
pub use calculations::condition::{compute_condition, ConditionResults, LoadingInput};
pub use errors::{StabResult, StabilityError};
#[cfg(not(target_arch = "wasm32"))]
pub use file_io::{load_project, save_project, FileLock};
pub use project::{Project, ProjectMetadata};
pub use service::evaluate_condition;
