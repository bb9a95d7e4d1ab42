//! Orientation sources: anything that can report the device attitude as a quaternion.

use crate::error::{EstimateError, Result};
use std::ops::{Add, Mul};

/// Device attitude as reported by the orientation sensor, `(x, y, z, e)` with `e` the
/// scalar part.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub e: f64,
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        e: 1.0,
    };

    pub fn new(x: f64, y: f64, z: f64, e: f64) -> Self {
        Quaternion { x, y, z, e }
    }

    /// Unit quaternion for a rotation of `angle` radians about the device x axis,
    /// i.e. a device pitched forward by `angle`.
    pub fn from_tilt(angle: f64) -> Self {
        let half = angle / 2.0;
        Quaternion {
            x: half.sin(),
            y: 0.0,
            z: 0.0,
            e: half.cos(),
        }
    }

    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.e * self.e).sqrt()
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0 && self.e == 0.0
    }
}

impl Add for Quaternion {
    type Output = Quaternion;

    fn add(self, rhs: Quaternion) -> Quaternion {
        Quaternion {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
            e: self.e + rhs.e,
        }
    }
}

impl Mul<f64> for Quaternion {
    type Output = Quaternion;

    fn mul(self, k: f64) -> Quaternion {
        Quaternion {
            x: self.x * k,
            y: self.y * k,
            z: self.z * k,
            e: self.e * k,
        }
    }
}

/// A live attitude sensor. The current value is read on demand; a source that has not
/// been started, or has failed, answers with `OrientationUnavailable`.
pub trait OrientationSource {
    fn start(&mut self) -> Result<()>;
    fn quaternion(&mut self) -> Result<Quaternion>;

    /// The source as something that can be pointed by hand, if it is one.
    fn as_aimable(&mut self) -> Option<&mut dyn Aimable> {
        None
    }
}

/// A source whose attitude is set by the user rather than measured.
pub trait Aimable {
    /// Points the device at `tilt` radians of forward pitch.
    fn aim(&mut self, tilt: f64);
}

impl<S: OrientationSource + ?Sized> OrientationSource for Box<S> {
    fn start(&mut self) -> Result<()> {
        (**self).start()
    }

    fn quaternion(&mut self) -> Result<Quaternion> {
        (**self).quaternion()
    }

    fn as_aimable(&mut self) -> Option<&mut dyn Aimable> {
        (**self).as_aimable()
    }
}

/// Stand-in sensor used when no hardware is attached. It reports whatever attitude it
/// was last aimed at.
#[derive(Debug, Clone)]
pub struct SimulatedSource {
    attitude: Quaternion,
    started: bool,
    failure: Option<String>,
    reads: usize,
}

impl SimulatedSource {
    pub fn new(attitude: Quaternion) -> Self {
        SimulatedSource {
            attitude,
            started: false,
            failure: None,
            reads: 0,
        }
    }

    /// A simulated device already pitched to `tilt` radians.
    pub fn pitched(tilt: f64) -> Self {
        Self::new(Quaternion::from_tilt(tilt))
    }
}

#[cfg(test)]
impl SimulatedSource {
    /// Every read after this call fails with `reason` until `recover` is called.
    pub fn fail(&mut self, reason: &str) {
        self.failure = Some(reason.to_string());
    }

    pub fn recover(&mut self) {
        self.failure = None;
    }

    /// Number of successful reads so far.
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl OrientationSource for SimulatedSource {
    fn start(&mut self) -> Result<()> {
        self.started = true;
        Ok(())
    }

    fn quaternion(&mut self) -> Result<Quaternion> {
        if !self.started {
            return Err(EstimateError::OrientationUnavailable("sensor not started".into()));
        }
        if let Some(reason) = &self.failure {
            return Err(EstimateError::OrientationUnavailable(reason.clone()));
        }
        self.reads += 1;
        Ok(self.attitude)
    }

    fn as_aimable(&mut self) -> Option<&mut dyn Aimable> {
        Some(self)
    }
}

impl Aimable for SimulatedSource {
    fn aim(&mut self, tilt: f64) {
        self.attitude = Quaternion::from_tilt(tilt);
    }
}

#[cfg(feature = "bno055")]
pub use hardware::Bno055Source;

#[cfg(feature = "bno055")]
mod hardware {
    use super::{OrientationSource, Quaternion};
    use crate::error::{EstimateError, Result};
    use bno055::{BNO055OperationMode, Bno055};
    use linux_embedded_hal::{Delay, I2cdev};

    /// Absolute orientation from a BNO055 fusion chip on the Linux I2C bus.
    pub struct Bno055Source {
        bus_path: String,
        sensor: Option<Bno055<I2cdev>>,
    }

    impl Bno055Source {
        pub fn new(bus_path: &str) -> Self {
            Bno055Source {
                bus_path: bus_path.to_string(),
                sensor: None,
            }
        }
    }

    fn unavailable(what: &str, e: impl std::fmt::Debug) -> EstimateError {
        EstimateError::OrientationUnavailable(format!("{what}: {e:?}"))
    }

    impl OrientationSource for Bno055Source {
        fn start(&mut self) -> Result<()> {
            if self.sensor.is_some() {
                return Ok(());
            }
            let mut delay = Delay;
            let i2c = I2cdev::new(&self.bus_path)
                .map_err(|e| unavailable("failed to open I2C device", e))?;

            let mut sensor = Bno055::new(i2c);
            sensor
                .init(&mut delay)
                .map_err(|e| unavailable("failed to initialize BNO055", e))?;
            // NDOF fuses accelerometer, gyroscope and magnetometer into an absolute quaternion.
            sensor
                .set_mode(BNO055OperationMode::NDOF, &mut delay)
                .map_err(|e| unavailable("failed to enter NDOF mode", e))?;

            tracing::info!(bus = %self.bus_path, "BNO055 initialized");
            self.sensor = Some(sensor);
            Ok(())
        }

        fn quaternion(&mut self) -> Result<Quaternion> {
            let sensor = self.sensor.as_mut().ok_or_else(|| {
                EstimateError::OrientationUnavailable("sensor not started".into())
            })?;
            let q = sensor
                .quaternion()
                .map_err(|e| unavailable("failed to read quaternion", e))?;
            Ok(Quaternion::new(q.v.x as f64, q.v.y as f64, q.v.z as f64, q.s as f64))
        }
    }
}
