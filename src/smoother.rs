//! Smoothing of the raw orientation readings.
//!
//! A reading is the component-wise mean of a fixed count of consecutive reads of the
//! source. The count is not tied to time: the reads happen back to back, so this only
//! approximates a temporal moving average. The mean of unit quaternions is generally
//! not unit-norm and is deliberately left unnormalized.

use crate::error::{EstimateError, Result};
use crate::orientation::{OrientationSource, Quaternion};
use fixed_deque::Deque;

pub struct Smoother {
    window_size: usize,
    window: Deque<Quaternion>,
}

impl Smoother {
    pub fn new(window_size: usize) -> Result<Self> {
        if window_size == 0 {
            return Err(EstimateError::InvalidWindow);
        }
        Ok(Smoother {
            window_size,
            window: Deque::new(window_size),
        })
    }

    /// Reads the source `window_size` times and returns the mean quaternion. The first
    /// failed read aborts the pass.
    pub fn average<S: OrientationSource + ?Sized>(&mut self, source: &mut S) -> Result<Quaternion> {
        self.window.clear();
        for _ in 0..self.window_size {
            self.window.push_back(source.quaternion()?);
        }

        let sum = self
            .window
            .iter()
            .fold(Quaternion::default(), |acc, q| acc + *q);
        let mean = sum * (1.0 / self.window.len() as f64);

        tracing::debug!(samples = self.window.len(), ?mean, "orientation averaged");
        Ok(mean)
    }
}
