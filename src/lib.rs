//! Estimates the height of, and distance to, a remote object from a known reference
//! height and two tilt angles read off the device's orientation sensor.
//!
//! Orientation reads are averaged by the [`smoother`], turned into a tilt angle by
//! [`tilt`], and captured as base/top angles by a [`session::Session`], which gates and
//! runs the [`triangulation`].

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod height_input;
pub mod orientation;
pub mod session;
pub mod sink;
pub mod smoother;
pub mod state;
pub mod tilt;
pub mod triangulation;

pub use config::EngineConfig;
pub use error::{EstimateError, GeometryFault};
pub use orientation::{Aimable, OrientationSource, Quaternion, SimulatedSource};
pub use session::Session;
pub use triangulation::{ComputeOutcome, Measurement};
