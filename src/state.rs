/// Base and top tilt angles captured so far, in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CapturedAngles {
    pub base: Option<f64>,
    pub top: Option<f64>,
}

impl CapturedAngles {
    pub fn both(&self) -> Option<(f64, f64)> {
        Some((self.base?, self.top?))
    }

    pub fn count(&self) -> usize {
        self.base.is_some() as usize + self.top.is_some() as usize
    }
}

/// Something that happened to the session, fed to the state machine after the session
/// has updated its angles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureEvent {
    BaseCaptured,
    TopCaptured,
    HeightSet,
    /// A compute ran, whatever its outcome.
    ComputeAttempted,
}

pub trait State {
    /// Determines if the state should transition to another state after `event`.
    fn should_transition(
        &self,
        event: &CaptureEvent,
        angles: &CapturedAngles,
    ) -> Option<CaptureState>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum CaptureState {
    Idle(IdleState),
    OneCaptured(OneCapturedState),
    BothCaptured(BothCapturedState),
    Computed(ComputedState),
}

#[derive(Clone, Debug, PartialEq)]
pub struct IdleState {}

#[derive(Clone, Debug, PartialEq)]
pub struct OneCapturedState {}

#[derive(Clone, Debug, PartialEq)]
pub struct BothCapturedState {}

/// A compute was attempted; the gate stays closed until the inputs change.
#[derive(Clone, Debug, PartialEq)]
pub struct ComputedState {}

impl Default for CaptureState {
    fn default() -> Self {
        CaptureState::Idle(IdleState {})
    }
}

impl CaptureState {
    pub fn name(&self) -> &'static str {
        match self {
            CaptureState::Idle(_) => "Idle",
            CaptureState::OneCaptured(_) => "OneCaptured",
            CaptureState::BothCaptured(_) => "BothCaptured",
            CaptureState::Computed(_) => "Computed",
        }
    }

    /// The pre-compute state matching how many angles are present.
    fn for_angles(angles: &CapturedAngles) -> CaptureState {
        match angles.count() {
            0 => CaptureState::Idle(IdleState {}),
            1 => CaptureState::OneCaptured(OneCapturedState {}),
            _ => CaptureState::BothCaptured(BothCapturedState {}),
        }
    }

    /// Whether the compute action is currently offered to the user.
    pub fn compute_enabled(&self) -> bool {
        matches!(self, CaptureState::BothCaptured(_))
    }

    pub fn should_transition(
        &self,
        event: &CaptureEvent,
        angles: &CapturedAngles,
    ) -> Option<CaptureState> {
        match self {
            CaptureState::Idle(state) => state.should_transition(event, angles),
            CaptureState::OneCaptured(state) => state.should_transition(event, angles),
            CaptureState::BothCaptured(state) => state.should_transition(event, angles),
            CaptureState::Computed(state) => state.should_transition(event, angles),
        }
    }
}

fn is_capture(event: &CaptureEvent) -> bool {
    matches!(event, CaptureEvent::BaseCaptured | CaptureEvent::TopCaptured)
}

impl State for IdleState {
    fn should_transition(
        &self,
        event: &CaptureEvent,
        angles: &CapturedAngles,
    ) -> Option<CaptureState> {
        if is_capture(event) && angles.count() > 0 {
            Some(CaptureState::for_angles(angles))
        } else {
            None
        }
    }
}

impl State for OneCapturedState {
    fn should_transition(
        &self,
        event: &CaptureEvent,
        angles: &CapturedAngles,
    ) -> Option<CaptureState> {
        // Recapturing the same angle keeps us here.
        if is_capture(event) && angles.count() == 2 {
            Some(CaptureState::BothCaptured(BothCapturedState {}))
        } else {
            None
        }
    }
}

impl State for BothCapturedState {
    fn should_transition(&self, event: &CaptureEvent, _: &CapturedAngles) -> Option<CaptureState> {
        match event {
            CaptureEvent::ComputeAttempted => Some(CaptureState::Computed(ComputedState {})),
            _ => None,
        }
    }
}

impl State for ComputedState {
    fn should_transition(
        &self,
        event: &CaptureEvent,
        angles: &CapturedAngles,
    ) -> Option<CaptureState> {
        match event {
            CaptureEvent::BaseCaptured | CaptureEvent::TopCaptured | CaptureEvent::HeightSet => {
                Some(CaptureState::for_angles(angles))
            }
            CaptureEvent::ComputeAttempted => None,
        }
    }
}
