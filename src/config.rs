use crate::constants::{DEFAULT_REFERENCE_HEIGHT_METERS, DEFAULT_WINDOW_SIZE};

/// Tunables of a measuring session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Reads averaged into each tilt reading.
    pub window_size: usize,
    /// Reference height (metres) in effect before the user enters one.
    pub initial_height: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            initial_height: DEFAULT_REFERENCE_HEIGHT_METERS,
        }
    }
}
