use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::time::Duration;
use tilt_height::cli::{Args, Command, SensorKind, run_interactive, run_monitor};
use tilt_height::orientation::{OrientationSource, SimulatedSource};
use tilt_height::session::Session;
use tilt_height::sink::{ComputeGate, LineSink, ResultSink};
use tilt_height::EngineConfig;
use tracing::{info, warn};

fn main() -> Result<()> {
    // Diagnostics go to stderr so they never interleave with result lines.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tilt_height=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = args.engine_config()?;
    let source = open_source(args.sensor);

    match &args.serial {
        Some(path) => {
            let sink = open_serial(path)?;
            run(&args, &config, source, sink)
        }
        None => run(&args, &config, source, LineSink::stdout()),
    }
}

fn run<K: ResultSink + ComputeGate>(
    args: &Args,
    config: &EngineConfig,
    source: Box<dyn OrientationSource>,
    sink: K,
) -> Result<()> {
    let mut session = Session::new(config, source, sink).context("failed to start session")?;
    info!(window = config.window_size, "session started");

    match args.command.clone().unwrap_or(Command::Run) {
        Command::Run => run_interactive(&mut session, io::stdin().lock(), io::stdout()),
        Command::Monitor { period_ms, count } => {
            run_monitor(&mut session, Duration::from_millis(period_ms), count);
            Ok(())
        }
    }
}

/// The requested sensor, or the simulated one when it is not available.
fn open_source(kind: SensorKind) -> Box<dyn OrientationSource> {
    match kind {
        SensorKind::Simulated => Box::new(SimulatedSource::pitched(0.0)),
        SensorKind::Bno055 => hardware_source().unwrap_or_else(|| {
            warn!("BNO055 not available, using simulated sensor");
            Box::new(SimulatedSource::pitched(0.0))
        }),
    }
}

#[cfg(feature = "bno055")]
fn hardware_source() -> Option<Box<dyn OrientationSource>> {
    use tilt_height::constants::I2C_BUS_PATH;
    use tilt_height::orientation::Bno055Source;

    let mut source = Bno055Source::new(I2C_BUS_PATH);
    match source.start() {
        Ok(()) => Some(Box::new(source)),
        Err(e) => {
            warn!(error = %e, "BNO055 failed to start");
            None
        }
    }
}

#[cfg(not(feature = "bno055"))]
fn hardware_source() -> Option<Box<dyn OrientationSource>> {
    warn!("built without the bno055 feature");
    None
}

#[cfg(unix)]
fn open_serial(path: &str) -> Result<LineSink<serialport::TTYPort>> {
    LineSink::serial(path).with_context(|| format!("failed to open serial port {path}"))
}

#[cfg(not(unix))]
fn open_serial(path: &str) -> Result<LineSink<io::Stdout>> {
    anyhow::bail!("serial output to {path} is only supported on unix")
}
