//! Common types shared by the asset models.

use std::fmt;

/// Absolute tolerance applied to every bound and state check.
///
/// Policies are allowed to land exactly on a bound; comparisons use this
/// slack so that floating-point integration noise at the fourth decimal
/// does not abort a run.
pub const BOUND_TOLERANCE: f64 = 1e-4;

/// The four controllable asset variants attached to a house.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Pv,
    Ev,
    Battery,
    Heatpump,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetKind::Pv => "PV installation",
            AssetKind::Ev => "EV",
            AssetKind::Battery => "battery",
            AssetKind::Heatpump => "heat pump",
        };
        write!(f, "{name}")
    }
}
