//! Constants used throughout the program.

/// Number of orientation reads averaged into one tilt reading:
pub const DEFAULT_WINDOW_SIZE: usize = 1000;

/// Reference height (metres) used until the user enters one:
pub const DEFAULT_REFERENCE_HEIGHT_METERS: f64 = 1.0;

/// How long a "recorded" acknowledgement stays on screen:
pub const ACKNOWLEDGEMENT_TIMEOUT_MS: u64 = 2000;

/// Baud rate of the serial display link:
pub const SERIAL_BAUD_RATE: u32 = 9600;
pub const SERIAL_TIMEOUT_MS: u64 = 1000;

/// Delay between readings in monitor mode:
pub const MONITOR_PERIOD_MS: u64 = 50;

pub const I2C_BUS_PATH: &str = "/dev/i2c-1";

pub const HEIGHT_PROMPT: &str = "Enter Your Height in metres (Reference Height): ";
