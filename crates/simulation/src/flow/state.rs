use bevy::prelude::*;

use super::event::{FlowIntensity, FlowPhase};

/// Discrete system state driving the global visual tone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SystemState {
    #[default]
    Idle,
    Streaming,
    BulkUpdate,
    Error,
}

impl SystemState {
    /// Count-based classification. A persistent stream wins over the count;
    /// `Error` is never derived here, only asserted from outside.
    pub fn classify(has_persistent: bool, transient_count: usize, bulk_threshold: usize) -> Self {
        if has_persistent {
            SystemState::Streaming
        } else if transient_count == 0 {
            SystemState::Idle
        } else if transient_count < bulk_threshold.max(1) {
            SystemState::Streaming
        } else {
            SystemState::BulkUpdate
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SystemState::Idle => "IDLE",
            SystemState::Streaming => "STREAMING",
            SystemState::BulkUpdate => "BULK_UPDATE",
            SystemState::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for SystemState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Read-only view of one live event, as handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowEventView {
    pub id: u64,
    pub target: String,
    pub source: Vec3,
    pub destination: Vec3,
    pub intensity: FlowIntensity,
    pub phase: FlowPhase,
    pub opacity: f32,
    pub progress: f32,
    pub pulse: f32,
    /// True only for the current (non-retiring) persistent stream.
    pub streaming: bool,
}

/// Per-tick flow output: every live event plus the derived state.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct FlowSnapshot {
    pub events: Vec<FlowEventView>,
    pub state: SystemState,
    /// Reason given with the current error override, if any.
    pub error: Option<String>,
    /// Target of the current persistent stream.
    pub stream_target: Option<String>,
}

impl FlowSnapshot {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
