//! # Vessel and Loading Data Model
//!
//! Plain records consumed by the stability engine. They are produced by the
//! setup and persistence layers and are never mutated by a computation.
//!
//! ```text
//! Ship ─┬─ Tank (capacity, CoG, LongitudinalPosition)
//!       ├─ LivestockPen (deck, area, CoG)
//!       └─ LoadingCondition (tank id → m³, pen id → head)
//! ```

pub mod condition;
pub mod pen;
pub mod ship;
pub mod tank;

pub use condition::LoadingCondition;
pub use pen::{CargoType, LivestockPen, PenId};
pub use ship::{AncillaryGeometry, Ship};
pub use tank::{LongitudinalPosition, Tank, TankCog, TankId, TankType};
