use bevy::prelude::*;

use crate::city_params::FlowParams;

/// How an event ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlowMode {
    /// Runs for a fixed duration, ramping in and out.
    Transient { duration: f32 },
    /// Holds at a steady level until `stop()` is called.
    Persistent,
}

/// Lifecycle phase. `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowPhase {
    Spawning,
    Active,
    Fading,
    Done,
}

/// Color/intensity class used by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowIntensity {
    /// Short "just changed" connector.
    Pulse,
    /// The "currently being worked on" stream.
    Stream,
}

/// Timing constants captured when an event is created, so later parameter
/// changes do not disturb events already in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FlowTiming {
    ramp_fraction: f32,
    fade_in: f32,
    fade_out: f32,
    steady: f32,
    pulse_speed: f32,
}

impl FlowTiming {
    fn from_params(params: &FlowParams) -> Self {
        Self {
            ramp_fraction: params.ramp_fraction.clamp(0.0, 0.5),
            fade_in: params.stream_fade_in_secs.max(0.0),
            fade_out: params.stream_fade_out_secs.max(0.0),
            steady: params.stream_steady_opacity.clamp(0.0, 1.0),
            pulse_speed: params.pulse_speed,
        }
    }
}

/// One animated connector from the hub to a target item.
///
/// Transitions are driven purely by [`FlowEvent::advance`]; there are no
/// timers to cancel, so dropping an event at any point is safe.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowEvent {
    pub id: u64,
    pub target: String,
    pub source: Vec3,
    pub destination: Vec3,
    pub intensity: FlowIntensity,
    mode: FlowMode,
    phase: FlowPhase,
    timing: FlowTiming,
    /// Seconds since spawn.
    age: f32,
    /// Set once `stop()` is called: (seconds since stop, opacity at stop,
    /// fade length).
    fade: Option<(f32, f32, f32)>,
    /// Travelling pulse position in `[0, 1)`.
    travel: f32,
}

impl FlowEvent {
    pub fn transient(
        id: u64,
        target: impl Into<String>,
        source: Vec3,
        destination: Vec3,
        params: &FlowParams,
    ) -> Self {
        Self::new(
            id,
            target.into(),
            source,
            destination,
            FlowMode::Transient {
                duration: params.transient_duration_secs.max(f32::EPSILON),
            },
            FlowIntensity::Pulse,
            params,
        )
    }

    pub fn persistent(
        id: u64,
        target: impl Into<String>,
        source: Vec3,
        destination: Vec3,
        params: &FlowParams,
    ) -> Self {
        Self::new(
            id,
            target.into(),
            source,
            destination,
            FlowMode::Persistent,
            FlowIntensity::Stream,
            params,
        )
    }

    fn new(
        id: u64,
        target: String,
        source: Vec3,
        destination: Vec3,
        mode: FlowMode,
        intensity: FlowIntensity,
        params: &FlowParams,
    ) -> Self {
        Self {
            id,
            target,
            source,
            destination,
            intensity,
            mode,
            phase: FlowPhase::Spawning,
            timing: FlowTiming::from_params(params),
            age: 0.0,
            fade: None,
            travel: 0.0,
        }
    }

    pub fn mode(&self) -> FlowMode {
        self.mode
    }

    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    pub fn is_persistent(&self) -> bool {
        self.mode == FlowMode::Persistent
    }

    pub fn is_done(&self) -> bool {
        self.phase == FlowPhase::Done
    }

    /// Fading or done: no longer counts as the live stream.
    pub fn is_stopping(&self) -> bool {
        matches!(self.phase, FlowPhase::Fading | FlowPhase::Done)
    }

    /// Travelling pulse position in `[0, 1)`.
    pub fn pulse(&self) -> f32 {
        self.travel
    }

    /// Normalized progress in `[0, 1]`.
    ///
    /// Transient events progress over their whole duration. Persistent
    /// events report fade-in progress, then fade-out progress once stopped.
    pub fn progress(&self) -> f32 {
        if let Some((elapsed, _, length)) = self.fade {
            return ratio(elapsed, length);
        }
        match self.mode {
            FlowMode::Transient { duration } => ratio(self.age, duration),
            FlowMode::Persistent => ratio(self.age, self.timing.fade_in),
        }
    }

    /// Current opacity in `[0, 1]`.
    pub fn opacity(&self) -> f32 {
        if self.phase == FlowPhase::Done {
            return 0.0;
        }
        if let Some((elapsed, start, length)) = self.fade {
            return start * (1.0 - ratio(elapsed, length));
        }
        match self.mode {
            FlowMode::Transient { .. } => {
                let p = self.progress();
                let ramp = self.timing.ramp_fraction;
                if ramp <= 0.0 {
                    1.0
                } else if p < ramp {
                    p / ramp
                } else if p > 1.0 - ramp {
                    (1.0 - p) / ramp
                } else {
                    1.0
                }
            }
            FlowMode::Persistent => self.timing.steady * self.progress(),
        }
    }

    /// Begin fading from the current opacity. Persistent events fade over
    /// the configured fade-out; transient events over their ramp length.
    /// No effect once fading or done.
    pub fn stop(&mut self) {
        if self.is_stopping() {
            return;
        }
        let length = match self.mode {
            FlowMode::Transient { duration } => duration * self.timing.ramp_fraction,
            FlowMode::Persistent => self.timing.fade_out,
        };
        self.fade = Some((0.0, self.opacity(), length));
        self.phase = if length > 0.0 {
            FlowPhase::Fading
        } else {
            FlowPhase::Done
        };
    }

    /// Advance by `dt` seconds and recompute the phase.
    pub fn advance(&mut self, dt: f32) {
        if self.phase == FlowPhase::Done {
            return;
        }
        let dt = dt.max(0.0);
        self.age += dt;
        self.travel = (self.travel + dt * self.timing.pulse_speed).rem_euclid(1.0);

        if let Some((elapsed, _, length)) = self.fade.as_mut() {
            *elapsed += dt;
            if *elapsed >= *length {
                self.phase = FlowPhase::Done;
            }
            return;
        }

        self.phase = match self.mode {
            FlowMode::Transient { .. } => {
                let p = self.progress();
                let ramp = self.timing.ramp_fraction;
                if p >= 1.0 {
                    FlowPhase::Done
                } else if p >= 1.0 - ramp {
                    FlowPhase::Fading
                } else if p >= ramp {
                    FlowPhase::Active
                } else {
                    FlowPhase::Spawning
                }
            }
            FlowMode::Persistent => {
                if self.age >= self.timing.fade_in {
                    FlowPhase::Active
                } else {
                    FlowPhase::Spawning
                }
            }
        };
    }
}

fn ratio(elapsed: f32, length: f32) -> f32 {
    if length <= 0.0 {
        1.0
    } else {
        (elapsed / length).clamp(0.0, 1.0)
    }
}
