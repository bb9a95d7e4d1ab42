use crate::config::EngineConfig;
use crate::error::{EstimateError, Result};
use crate::height_input::{HeightInputProvider, ReferenceHeight, parse_height};
use crate::orientation::OrientationSource;
use crate::sink::{Acknowledgement, AcknowledgementKind, ComputeGate, DisplayUpdate, ResultSink};
use crate::smoother::Smoother;
use crate::state::{CaptureEvent, CaptureState, CapturedAngles};
use crate::tilt::tilt;
use crate::triangulation::{ComputeOutcome, triangulate};
use tracing::{info, warn};

/// One measuring session: the sensor, what has been captured so far, and where results go.
/// Every action takes `&mut self`, so a smoothing pass always runs to completion before
/// anything else can touch the captured angles.
pub struct Session<S: OrientationSource, K: ResultSink + ComputeGate> {
    pub state: CaptureState,
    source: S,
    smoother: Smoother,
    sink: K,
    angles: CapturedAngles,
    reference_height: ReferenceHeight,
}

impl<S: OrientationSource, K: ResultSink + ComputeGate> Session<S, K> {
    /// Starts the source and publishes the initial reference height. A source that fails
    /// to start leaves the session usable; reads will report the sensor as unavailable.
    /// An invalid config is rejected before anything reaches the sink.
    pub fn new(config: &EngineConfig, mut source: S, mut sink: K) -> Result<Self> {
        let smoother = Smoother::new(config.window_size)?;

        if let Err(e) = source.start() {
            warn!(error = %e, "orientation source failed to start");
            sink.display(&DisplayUpdate::TiltUnavailable);
        }

        let reference_height = ReferenceHeight::from_meters(config.initial_height);
        sink.display(&DisplayUpdate::ReferenceHeight(reference_height.text.clone()));
        sink.set_compute_enabled(false);

        Ok(Session {
            state: CaptureState::default(),
            source,
            smoother,
            sink,
            angles: CapturedAngles::default(),
            reference_height,
        })
    }

    pub fn angles(&self) -> CapturedAngles {
        self.angles
    }

    pub fn reference_height(&self) -> &ReferenceHeight {
        &self.reference_height
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Smoothed tilt of the device right now, also published as the live reading.
    /// Called whenever the sensor has a new reading.
    pub fn current_tilt(&mut self) -> Result<f64> {
        match self.smoother.average(&mut self.source) {
            Ok(q) => {
                let beta = tilt(&q);
                self.sink.display(&DisplayUpdate::CurrentTilt(beta));
                Ok(beta)
            }
            Err(e) => {
                self.report_sensor_error(&e);
                Err(e)
            }
        }
    }

    /// Sensor error notification: the live reading is replaced by the error marker.
    pub fn report_sensor_error(&mut self, error: &EstimateError) {
        warn!(%error, "orientation reading failed");
        self.sink.display(&DisplayUpdate::TiltUnavailable);
    }

    pub fn capture_base(&mut self) -> Result<f64> {
        let beta = self.current_tilt()?;
        self.angles.base = Some(beta);
        info!(degrees = beta.to_degrees(), "base angle captured");

        self.sink.display(&DisplayUpdate::BaseAngle(beta));
        self.sink.acknowledge(&Acknowledgement::now(AcknowledgementKind::BaseRecorded));
        self.handle_event(CaptureEvent::BaseCaptured);
        Ok(beta)
    }

    pub fn capture_top(&mut self) -> Result<f64> {
        let beta = self.current_tilt()?;
        self.angles.top = Some(beta);
        info!(degrees = beta.to_degrees(), "top angle captured");

        self.sink.display(&DisplayUpdate::TopAngle(beta));
        self.sink.acknowledge(&Acknowledgement::now(AcknowledgementKind::TopRecorded));
        self.handle_event(CaptureEvent::TopCaptured);
        Ok(beta)
    }

    /// Replaces the reference height with `input`. Captured angles are kept.
    pub fn set_reference_height(&mut self, input: &str) -> Result<()> {
        let height = parse_height(input)?;
        self.apply_height(height, true);
        Ok(())
    }

    /// Asks `provider` for a height until it answers with a valid one or cancels. The
    /// startup prompt (`first_time`) is not acknowledged.
    pub fn prompt_reference_height<P: HeightInputProvider + ?Sized>(
        &mut self,
        provider: &mut P,
        first_time: bool,
    ) -> Result<()> {
        loop {
            let Some(answer) = provider.request_height(&self.reference_height.text) else {
                info!("height entry cancelled");
                return Err(EstimateError::HeightInputCancelled);
            };
            match parse_height(&answer) {
                Ok(height) => {
                    self.apply_height(height, !first_time);
                    return Ok(());
                }
                Err(e) => {
                    warn!(error = %e, "rejected height entry");
                    self.sink.alert("invalid height");
                }
            }
        }
    }

    fn apply_height(&mut self, height: ReferenceHeight, acknowledge: bool) {
        info!(meters = height.meters, "reference height set");
        self.sink.display(&DisplayUpdate::ReferenceHeight(height.text.clone()));
        self.reference_height = height;
        if acknowledge {
            self.sink.acknowledge(&Acknowledgement::now(AcknowledgementKind::HeightRecorded));
        }
        self.handle_event(CaptureEvent::HeightSet);
    }

    /// Triangulates the object from the captured angles. Whatever the outcome, the compute
    /// gate is closed afterwards until new input arrives.
    pub fn compute(&mut self) -> Result<ComputeOutcome> {
        let Some((base, top)) = self.angles.both() else {
            return Err(EstimateError::NotReady);
        };

        let result = triangulate(self.reference_height.meters, base, top);
        match &result {
            Ok(ComputeOutcome::Measured(m)) => {
                info!(distance = m.distance, height = m.height, "object triangulated");
                self.sink.display(&DisplayUpdate::Measurement(*m));
            }
            Ok(ComputeOutcome::Inconclusive) => {
                info!(base, top, "triangulation inconclusive");
            }
            Err(fault) => {
                warn!(base, top, fault = fault.message(), "triangulation rejected");
                self.sink.alert(fault.message());
            }
        }

        self.handle_event(CaptureEvent::ComputeAttempted);
        result.map_err(EstimateError::InvalidGeometry)
    }

    fn handle_event(&mut self, event: CaptureEvent) {
        let was_enabled = self.state.compute_enabled();
        if let Some(new_state) = self.state.should_transition(&event, &self.angles) {
            tracing::debug!(
                from = self.state.name(),
                to = new_state.name(),
                "capture state changed"
            );
            self.state = new_state;
        }
        let enabled = self.state.compute_enabled();
        if enabled != was_enabled || event == CaptureEvent::ComputeAttempted {
            self.sink.set_compute_enabled(enabled);
        }
    }
}
