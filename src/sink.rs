//! Where results go. The session only hands out structured values; sinks decide how to
//! show them.

use crate::constants::{ACKNOWLEDGEMENT_TIMEOUT_MS, SERIAL_BAUD_RATE, SERIAL_TIMEOUT_MS};
use crate::triangulation::Measurement;
use chrono::{DateTime, Utc};
use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

/// A value for one of the result fields.
#[derive(Clone, Debug, PartialEq)]
pub enum DisplayUpdate {
    /// Live tilt, radians.
    CurrentTilt(f64),
    /// The sensor could not be read; shown in place of the live tilt.
    TiltUnavailable,
    BaseAngle(f64),
    TopAngle(f64),
    /// Reference height exactly as the user entered it.
    ReferenceHeight(String),
    Measurement(Measurement),
}

impl fmt::Display for DisplayUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayUpdate::CurrentTilt(beta) => write!(f, "beta: {:.0}°", beta.to_degrees()),
            DisplayUpdate::TiltUnavailable => write!(f, "beta: error"),
            DisplayUpdate::BaseAngle(angle) => write!(f, "base angle: {:.2}°", angle.to_degrees()),
            DisplayUpdate::TopAngle(angle) => write!(f, "top angle: {:.2}°", angle.to_degrees()),
            DisplayUpdate::ReferenceHeight(text) => write!(f, "reference height: {text}m"),
            DisplayUpdate::Measurement(m) => write!(
                f,
                "distance of object: {:.2}m, height of object: {:.2}m",
                m.distance, m.height
            ),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcknowledgementKind {
    HeightRecorded,
    BaseRecorded,
    TopRecorded,
}

impl AcknowledgementKind {
    pub fn message(self) -> &'static str {
        match self {
            AcknowledgementKind::HeightRecorded => "Height Recorded",
            AcknowledgementKind::BaseRecorded => "Base Angle Recorded",
            AcknowledgementKind::TopRecorded => "Top Angle Recorded",
        }
    }
}

/// Transient "recorded" notice.
#[derive(Clone, Debug, PartialEq)]
pub struct Acknowledgement {
    pub kind: AcknowledgementKind,
    pub recorded_at: DateTime<Utc>,
    pub timeout: Duration,
}

impl Acknowledgement {
    pub fn now(kind: AcknowledgementKind) -> Self {
        Acknowledgement {
            kind,
            recorded_at: Utc::now(),
            timeout: Duration::from_millis(ACKNOWLEDGEMENT_TIMEOUT_MS),
        }
    }
}

pub trait ResultSink {
    fn display(&mut self, update: &DisplayUpdate);
    fn acknowledge(&mut self, ack: &Acknowledgement);
    /// A message the user has to see, e.g. a rejected triangulation.
    fn alert(&mut self, message: &str);
}

pub trait ComputeGate {
    fn set_compute_enabled(&mut self, enabled: bool);
}

/// Renders every event as one text line on any writer: stdout, or the serial link to a
/// handheld display.
pub struct LineSink<W: Write> {
    writer: W,
}

impl<W: Write> LineSink<W> {
    pub fn new(writer: W) -> Self {
        LineSink { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, line: fmt::Arguments<'_>) {
        let result = self
            .writer
            .write_fmt(line)
            .and_then(|_| self.writer.write_all(b"\n"))
            .and_then(|_| self.writer.flush());
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to write result line");
        }
    }
}

impl LineSink<io::Stdout> {
    pub fn stdout() -> Self {
        LineSink::new(io::stdout())
    }
}

#[cfg(unix)]
impl LineSink<serialport::TTYPort> {
    pub fn serial(path: &str) -> Result<Self, serialport::Error> {
        let port = serialport::new(path, SERIAL_BAUD_RATE)
            .timeout(Duration::from_millis(SERIAL_TIMEOUT_MS))
            .open_native()?;
        Ok(LineSink::new(port))
    }
}

impl<W: Write> ResultSink for LineSink<W> {
    fn display(&mut self, update: &DisplayUpdate) {
        self.write_line(format_args!("{update}"));
    }

    fn acknowledge(&mut self, ack: &Acknowledgement) {
        self.write_line(format_args!(
            "[{}] {}",
            ack.recorded_at.format("%H:%M:%S"),
            ack.kind.message()
        ));
    }

    fn alert(&mut self, message: &str) {
        self.write_line(format_args!("!! {message}"));
    }
}

impl<W: Write> ComputeGate for LineSink<W> {
    fn set_compute_enabled(&mut self, enabled: bool) {
        let label = if enabled { "enabled" } else { "disabled" };
        self.write_line(format_args!("calculate: {label}"));
    }
}

/// Keeps everything it receives, for inspection in tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub displays: Vec<DisplayUpdate>,
    pub acknowledgements: Vec<AcknowledgementKind>,
    pub alerts: Vec<String>,
    pub gate: Vec<bool>,
}

#[cfg(test)]
impl RecordingSink {
    pub fn gate_enabled(&self) -> bool {
        self.gate.last().copied().unwrap_or(false)
    }
}

#[cfg(test)]
impl ResultSink for RecordingSink {
    fn display(&mut self, update: &DisplayUpdate) {
        self.displays.push(update.clone());
    }

    fn acknowledge(&mut self, ack: &Acknowledgement) {
        self.acknowledgements.push(ack.kind);
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

#[cfg(test)]
impl ComputeGate for RecordingSink {
    fn set_compute_enabled(&mut self, enabled: bool) {
        self.gate.push(enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn display_precision_per_field() {
        assert_eq!(DisplayUpdate::CurrentTilt(0.5).to_string(), "beta: 29°");
        assert_eq!(DisplayUpdate::BaseAngle(FRAC_PI_4).to_string(), "base angle: 45.00°");
        assert_eq!(DisplayUpdate::TopAngle(2.0).to_string(), "top angle: 114.59°");
        assert_eq!(
            DisplayUpdate::ReferenceHeight("1.80".into()).to_string(),
            "reference height: 1.80m"
        );
        let measurement = Measurement {
            distance: 0.999999,
            height: 2.004,
        };
        assert_eq!(
            DisplayUpdate::Measurement(measurement).to_string(),
            "distance of object: 1.00m, height of object: 2.00m"
        );
    }

    #[test]
    fn line_sink_writes_one_line_per_event() {
        let mut sink = LineSink::new(Vec::new());
        sink.display(&DisplayUpdate::TiltUnavailable);
        sink.acknowledge(&Acknowledgement::now(AcknowledgementKind::TopRecorded));
        sink.alert("Base level should not be higher than top level");
        sink.set_compute_enabled(true);

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "beta: error");
        assert!(lines[1].ends_with("] Top Angle Recorded"));
        assert_eq!(lines[2], "!! Base level should not be higher than top level");
        assert_eq!(lines[3], "calculate: enabled");
    }

    #[test]
    fn acknowledgements_expire_after_two_seconds() {
        let ack = Acknowledgement::now(AcknowledgementKind::HeightRecorded);
        assert_eq!(ack.timeout, Duration::from_millis(2000));
        assert_eq!(ack.kind.message(), "Height Recorded");
    }
}
