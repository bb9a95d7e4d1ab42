//! Command line front end: argument parsing and the interactive measuring loop.

use crate::config::EngineConfig;
use crate::constants::{DEFAULT_REFERENCE_HEIGHT_METERS, DEFAULT_WINDOW_SIZE, MONITOR_PERIOD_MS};
use crate::error::EstimateError;
use crate::height_input::StdinHeightPrompt;
use crate::orientation::OrientationSource;
use crate::session::Session;
use crate::sink::{ComputeGate, ResultSink};
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{BufRead, Write};
use std::str::FromStr;
use std::thread;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "tilt-height")]
#[command(about = "Estimate an object's height and distance from two tilt readings")]
#[command(version)]
pub struct Args {
    /// Orientation reads averaged into one tilt reading
    #[arg(long, default_value_t = DEFAULT_WINDOW_SIZE)]
    pub window: usize,

    /// Reference height in metres before one is entered
    #[arg(long, default_value_t = DEFAULT_REFERENCE_HEIGHT_METERS)]
    pub height: f64,

    /// Where orientation comes from
    #[arg(long, value_enum, default_value = "simulated")]
    pub sensor: SensorKind,

    /// Send results to this serial port instead of stdout
    #[arg(long)]
    pub serial: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SensorKind {
    Simulated,
    Bno055,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Interactive measuring session (default)
    Run,
    /// Print the live tilt reading repeatedly
    Monitor {
        #[arg(long, default_value_t = MONITOR_PERIOD_MS)]
        period_ms: u64,
        /// Stop after this many readings
        #[arg(long)]
        count: Option<u64>,
    },
}

impl Args {
    pub fn engine_config(&self) -> Result<EngineConfig> {
        if self.window == 0 {
            anyhow::bail!("--window must be at least 1");
        }
        if !self.height.is_finite() || self.height < 0.0 {
            anyhow::bail!("--height must be a nonnegative number, got {}", self.height);
        }
        Ok(EngineConfig {
            window_size: self.window,
            initial_height: self.height,
        })
    }
}

/// One line typed at the interactive prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    /// Point the simulated device, degrees.
    Aim(f64),
    Tilt,
    Base,
    Top,
    /// `height` alone prompts; `height <value>` sets directly.
    Height(Option<String>),
    Compute,
    Status,
    Help,
    Quit,
}

impl FromStr for UserCommand {
    type Err = String;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default().to_ascii_lowercase();
        let rest: Vec<&str> = words.collect();

        match (command.as_str(), rest.as_slice()) {
            ("aim", [degrees]) => degrees
                .parse()
                .map(UserCommand::Aim)
                .map_err(|_| format!("not an angle: {degrees}")),
            ("tilt", []) => Ok(UserCommand::Tilt),
            ("base", []) => Ok(UserCommand::Base),
            ("top", []) => Ok(UserCommand::Top),
            ("height", []) => Ok(UserCommand::Height(None)),
            ("height", [value]) => Ok(UserCommand::Height(Some(value.to_string()))),
            ("compute" | "calculate", []) => Ok(UserCommand::Compute),
            ("status", []) => Ok(UserCommand::Status),
            ("help" | "?", []) => Ok(UserCommand::Help),
            ("quit" | "exit", []) => Ok(UserCommand::Quit),
            _ => Err(format!("unknown command: {}", line.trim())),
        }
    }
}

const HELP: &str = "commands: aim <deg>, tilt, base, top, height [m], compute, status, quit";

/// Runs the measuring session against `input`: the startup height prompt, then one
/// command per line until `quit` or end of input. Failed actions are reported and the
/// session carries on.
pub fn run_interactive<S, K, R, W>(
    session: &mut Session<S, K>,
    mut input: R,
    mut output: W,
) -> Result<()>
where
    S: OrientationSource,
    K: ResultSink + ComputeGate,
    R: BufRead,
    W: Write,
{
    let mut prompt = StdinHeightPrompt::new(&mut input, &mut output);
    let startup = session.prompt_reference_height(&mut prompt, true);
    if let Err(EstimateError::HeightInputCancelled) = startup {
        return Ok(());
    }
    writeln!(output, "{HELP}")?;

    let mut line = String::new();
    loop {
        line.clear();
        // The live reading follows the sensor between commands; failures show as the
        // error marker.
        let _ = session.current_tilt();
        write!(output, "> ")?;
        output.flush()?;
        if input.read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<UserCommand>() {
            Ok(command) => command,
            Err(message) => {
                writeln!(output, "{message}")?;
                continue;
            }
        };

        let result = match command {
            UserCommand::Aim(degrees) => {
                match session.source_mut().as_aimable() {
                    Some(device) => device.aim(degrees.to_radians()),
                    None => writeln!(output, "aim only works with the simulated sensor")?,
                }
                Ok(())
            }
            UserCommand::Tilt => session.current_tilt().map(|_| ()),
            UserCommand::Base => session.capture_base().map(|_| ()),
            UserCommand::Top => session.capture_top().map(|_| ()),
            UserCommand::Height(Some(value)) => session.set_reference_height(&value),
            UserCommand::Height(None) => {
                let mut prompt = StdinHeightPrompt::new(&mut input, &mut output);
                session.prompt_reference_height(&mut prompt, false)
            }
            UserCommand::Compute => session.compute().map(|_| ()),
            UserCommand::Status => {
                let angles = session.angles();
                writeln!(
                    output,
                    "state: {}, base: {:?}, top: {:?}, reference height: {}m",
                    session.state.name(),
                    angles.base.map(f64::to_degrees),
                    angles.top.map(f64::to_degrees),
                    session.reference_height().text
                )?;
                Ok(())
            }
            UserCommand::Help => {
                writeln!(output, "{HELP}")?;
                Ok(())
            }
            UserCommand::Quit => break,
        };

        match result {
            // Geometry faults were already alerted through the sink.
            Ok(()) | Err(EstimateError::InvalidGeometry(_)) => {}
            Err(e) => writeln!(output, "{e}")?,
        }
    }
    Ok(())
}

/// Publishes the live tilt every `period`, `count` times or forever.
pub fn run_monitor<S, K>(session: &mut Session<S, K>, period: Duration, count: Option<u64>)
where
    S: OrientationSource,
    K: ResultSink + ComputeGate,
{
    let mut readings = 0;
    while count.is_none_or(|limit| readings < limit) {
        // Failures are already shown as the error marker.
        let _ = session.current_tilt();
        readings += 1;
        thread::sleep(period);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::SimulatedSource;
    use crate::sink::{DisplayUpdate, RecordingSink};
    use std::io::Cursor;

    fn session() -> Session<SimulatedSource, RecordingSink> {
        let config = EngineConfig {
            window_size: 5,
            ..EngineConfig::default()
        };
        Session::new(&config, SimulatedSource::pitched(0.0), RecordingSink::default()).unwrap()
    }

    #[test]
    fn parses_commands() {
        assert_eq!("aim 45".parse::<UserCommand>(), Ok(UserCommand::Aim(45.0)));
        assert_eq!(" BASE ".parse::<UserCommand>(), Ok(UserCommand::Base));
        assert_eq!("height".parse::<UserCommand>(), Ok(UserCommand::Height(None)));
        assert_eq!(
            "height 1.8".parse::<UserCommand>(),
            Ok(UserCommand::Height(Some("1.8".into())))
        );
        assert_eq!("calculate".parse::<UserCommand>(), Ok(UserCommand::Compute));
        assert!("aim high".parse::<UserCommand>().is_err());
        assert!("jump".parse::<UserCommand>().is_err());
    }

    #[test]
    fn args_map_onto_engine_config() {
        let args = Args::parse_from([
            "tilt-height",
            "--window",
            "50",
            "--height",
            "1.7",
            "monitor",
        ]);
        assert_eq!(
            args.engine_config().unwrap(),
            EngineConfig {
                window_size: 50,
                initial_height: 1.7,
            }
        );
        assert!(matches!(args.command, Some(Command::Monitor { period_ms: 50, count: None })));

        let args = Args::parse_from(["tilt-height", "--window", "0"]);
        assert!(args.engine_config().is_err());
    }

    #[test]
    fn scripted_measurement() {
        let mut s = session();
        let script = "1.5\naim 60\nbase\naim 90\ntop\ncompute\nquit\n";
        let mut output = Vec::new();
        run_interactive(&mut s, Cursor::new(script), &mut output).unwrap();

        let measurement = s.sink().displays.iter().find_map(|d| match d {
            DisplayUpdate::Measurement(m) => Some(*m),
            _ => None,
        });
        let Some(m) = measurement else {
            panic!("no measurement in {:?}", s.sink().displays);
        };
        approx::assert_relative_eq!(m.distance, 1.5 * 3f64.sqrt(), epsilon = 1e-6);
        approx::assert_relative_eq!(m.height, 1.5, epsilon = 1e-6);
        assert_eq!(s.state.name(), "Computed");
    }

    #[test]
    fn live_tilt_refreshes_before_every_prompt() {
        let mut s = session();
        let script = "1.5\naim 30\nstatus\nquit\n";
        let mut output = Vec::new();
        run_interactive(&mut s, Cursor::new(script), &mut output).unwrap();

        let readings: Vec<f64> = s
            .sink()
            .displays
            .iter()
            .filter_map(|d| match d {
                DisplayUpdate::CurrentTilt(beta) => Some(*beta),
                _ => None,
            })
            .collect();
        // One reading per prompt: before `aim`, `status` and `quit`.
        assert_eq!(readings.len(), 3);
        approx::assert_relative_eq!(readings[0], 0.0, epsilon = 1e-9);
        approx::assert_relative_eq!(readings[2], 30f64.to_radians(), epsilon = 1e-9);
    }

    #[test]
    fn aim_is_refused_for_hardware_sources() {
        struct Fixed;
        impl OrientationSource for Fixed {
            fn start(&mut self) -> crate::error::Result<()> {
                Ok(())
            }
            fn quaternion(&mut self) -> crate::error::Result<crate::orientation::Quaternion> {
                Ok(crate::orientation::Quaternion::IDENTITY)
            }
        }

        let config = EngineConfig::default();
        let mut s = Session::new(&config, Fixed, RecordingSink::default()).unwrap();
        let mut output = Vec::new();
        run_interactive(&mut s, Cursor::new("1.5\naim 30\nquit\n"), &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("aim only works with the simulated sensor"));
    }

    #[test]
    fn errors_are_reported_and_loop_continues() {
        let mut s = session();
        let script = "\ncompute\nheight -3\nwobble\nstatus\n";
        let mut output = Vec::new();
        run_interactive(&mut s, Cursor::new(script), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains(&EstimateError::NotReady.to_string()));
        assert!(text.contains("invalid height"));
        assert!(text.contains("unknown command: wobble"));
        assert!(text.contains("state: Idle"));
    }

    #[test]
    fn cancelled_startup_prompt_ends_session() {
        let mut s = session();
        let mut output = Vec::new();
        run_interactive(&mut s, Cursor::new(""), &mut output).unwrap();
        assert_eq!(s.reference_height().text, "1");
    }

    #[test]
    fn monitor_publishes_each_reading() {
        let mut s = session();
        run_monitor(&mut s, Duration::ZERO, Some(3));
        let readings = s
            .sink()
            .displays
            .iter()
            .filter(|d| matches!(d, DisplayUpdate::CurrentTilt(_)))
            .count();
        assert_eq!(readings, 3);
    }
}
