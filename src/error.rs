//! Error taxonomy shared by every action of the estimator.

use thiserror::Error;

/// Why a triangulation was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryFault {
    /// The base angle was captured above the top angle.
    BaseAboveTop,
    /// The object's base sits above the observer's reference base.
    ObjectBaseAboveReference,
}

impl GeometryFault {
    /// Text shown to the user when the fault is alerted.
    pub fn message(self) -> &'static str {
        match self {
            GeometryFault::BaseAboveTop => "Base level should not be higher than top level",
            GeometryFault::ObjectBaseAboveReference => {
                "Object's base level cannot be higher than the referenced height's base level"
            }
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EstimateError {
    #[error("orientation unavailable: {0}")]
    OrientationUnavailable(String),

    #[error("invalid height: {0:?}")]
    InvalidHeightInput(String),

    #[error("height input cancelled")]
    HeightInputCancelled,

    #[error("invalid geometry: {}", .0.message())]
    InvalidGeometry(GeometryFault),

    #[error("both base and top angles must be captured before computing")]
    NotReady,

    #[error("smoothing window must hold at least one sample")]
    InvalidWindow,
}

pub type Result<T> = std::result::Result<T, EstimateError>;
