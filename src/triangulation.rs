//! Distance and height of the object from the reference height and the two tilt angles.

use crate::error::GeometryFault;
use std::f64::consts::FRAC_PI_2;

/// An accepted triangulation, in metres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    pub distance: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ComputeOutcome {
    Measured(Measurement),
    /// Neither positive nor explained by the angle ordering (equal angles, for one).
    /// Nothing is reported to the user in this case.
    Inconclusive,
}

/// Triangulates the object from the reference height `h` and the angles captured at its
/// base and top. Checks run in a fixed order: a positive result wins, then the base-above-top
/// ordering, then the top-above-base ordering; anything left over is inconclusive.
pub fn triangulate(
    h: f64,
    base_angle: f64,
    top_angle: f64,
) -> Result<ComputeOutcome, GeometryFault> {
    let distance = h * base_angle.tan();
    let angle_above_horizon = top_angle - FRAC_PI_2;
    let height = h + distance * angle_above_horizon.tan();

    if height > 0.0 && distance > 0.0 {
        Ok(ComputeOutcome::Measured(Measurement { distance, height }))
    } else if base_angle > top_angle {
        Err(GeometryFault::BaseAboveTop)
    } else if top_angle > base_angle {
        Err(GeometryFault::ObjectBaseAboveReference)
    } else {
        Ok(ComputeOutcome::Inconclusive)
    }
}
