//! Controllable asset models attached to houses.
//!
//! Each asset follows the same per-timestep contract: `compute_bounds`
//! writes a feasible `[min, max]` power range without touching state,
//! policies then assign `consumption[t]`, and `integrate_response` advances
//! internal state and validates the assignment. Consumption is in kW,
//! positive toward the grid (load), negative away from it (generation).

pub mod battery;
pub mod ev;
pub mod heatpump;
pub mod pv;
pub mod thermal;
pub mod types;

pub use battery::Battery;
pub use ev::{EvInstallation, EvSessionData};
pub use heatpump::{HeatPump, HeatPumpParams, cop};
pub use pv::PvInstallation;
pub use thermal::{ThermalModelData, ThermalNetwork, ZONE_NODE};
pub use types::{AssetKind, BOUND_TOLERANCE};
