use std::time::{SystemTime, UNIX_EPOCH};

use bevy::prelude::*;

use crate::city_params::{ActivityParams, CityParams};

use super::signal::ActivitySignal;

/// Lifecycle notifications produced by one poll.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum ActivityEvent {
    Started {
        project: Option<String>,
        action: Option<String>,
    },
    Updated {
        project: Option<String>,
        action: Option<String>,
    },
    Stopped,
    TargetChanged {
        previous: Option<String>,
        current: Option<String>,
    },
}

/// Everything one poll reported, lifecycle first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityTransitions {
    pub events: Vec<ActivityEvent>,
}

impl ActivityTransitions {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn started(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, ActivityEvent::Started { .. }))
    }

    pub fn updated(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, ActivityEvent::Updated { .. }))
    }

    pub fn stopped(&self) -> bool {
        self.events.contains(&ActivityEvent::Stopped)
    }

    /// New target, when this poll changed it.
    pub fn target_changed(&self) -> Option<Option<&str>> {
        self.events.iter().find_map(|e| match e {
            ActivityEvent::TargetChanged { current, .. } => Some(current.as_deref()),
            _ => None,
        })
    }
}

/// Polling state machine over the activity signal.
///
/// Start, update and stop are mutually exclusive per poll. A target change
/// is judged separately and can accompany either a start or an update. The
/// last seen target is remembered across a stop, so resuming work on the
/// same project starts the stream again without a target change.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ActivityAdapter {
    idle_timeout_ms: f64,
    active: bool,
    last_target: Option<String>,
}

impl Default for ActivityAdapter {
    fn default() -> Self {
        Self::new(&ActivityParams::default())
    }
}

impl FromWorld for ActivityAdapter {
    fn from_world(world: &mut World) -> Self {
        let params = world
            .get_resource::<CityParams>()
            .map(|p| p.activity.clone())
            .unwrap_or_default();
        Self::new(&params)
    }
}

impl ActivityAdapter {
    pub fn new(params: &ActivityParams) -> Self {
        Self {
            idle_timeout_ms: params.idle_timeout_ms,
            active: false,
            last_target: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn last_target(&self) -> Option<&str> {
        self.last_target.as_deref()
    }

    pub fn poll(&mut self, signal: Option<&ActivitySignal>, now_ms: f64) -> ActivityTransitions {
        let mut transitions = ActivityTransitions::default();

        let live = signal.filter(|s| s.is_live(now_ms, self.idle_timeout_ms));
        let Some(signal) = live else {
            if self.active {
                self.active = false;
                transitions.events.push(ActivityEvent::Stopped);
            }
            return transitions;
        };

        let project = signal.target().map(str::to_string);
        let action = signal.action.clone();
        transitions.events.push(if self.active {
            ActivityEvent::Updated {
                project: project.clone(),
                action,
            }
        } else {
            ActivityEvent::Started {
                project: project.clone(),
                action,
            }
        });
        self.active = true;

        if project != self.last_target {
            transitions.events.push(ActivityEvent::TargetChanged {
                previous: self.last_target.take(),
                current: project.clone(),
            });
            self.last_target = project;
        }
        transitions
    }
}

/// Latest activity reading, for overlays.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct ActivityStatus {
    pub active: bool,
    pub project: Option<String>,
    pub action: Option<String>,
    pub last_ping_ms: Option<f64>,
}

/// Millisecond clock the adapter compares `lastPing` against.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub enum ActivityClock {
    /// Wall clock, milliseconds since the Unix epoch.
    #[default]
    System,
    /// Fixed reading, for tests and replays.
    Fixed(f64),
}

impl ActivityClock {
    pub fn now_ms(&self) -> f64 {
        match self {
            ActivityClock::System => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs_f64() * 1000.0)
                .unwrap_or(0.0),
            ActivityClock::Fixed(ms) => *ms,
        }
    }
}
