use std::collections::{HashMap, VecDeque};

use bevy::prelude::*;

use crate::city_params::{CityParams, FlowParams};

use super::event::FlowEvent;
use super::state::{FlowEventView, FlowSnapshot, SystemState};

/// Owns every live flow event.
///
/// - Transient events live in a FIFO queue capped at `capacity`; when full,
///   the oldest is dropped immediately (no fade) to make room.
/// - At most one persistent stream exists. A replaced or stopped stream
///   moves to `retiring` and fades there; it no longer counts as the stream.
/// - Triggers for one target inside the debounce window are ignored. The
///   debounce memory is pruned on every tick so it stays bounded.
#[derive(Resource, Debug, Clone)]
pub struct FlowEventManager {
    params: FlowParams,
    transients: VecDeque<FlowEvent>,
    persistent: Option<FlowEvent>,
    retiring: Vec<FlowEvent>,
    /// Target id → time (seconds) of its last accepted trigger.
    last_trigger: HashMap<String, f64>,
    error: Option<String>,
    next_id: u64,
}

impl Default for FlowEventManager {
    fn default() -> Self {
        Self::new(FlowParams::default())
    }
}

impl FromWorld for FlowEventManager {
    fn from_world(world: &mut World) -> Self {
        let params = world
            .get_resource::<CityParams>()
            .map(|p| p.flow.clone())
            .unwrap_or_default();
        Self::new(params)
    }
}

impl FlowEventManager {
    pub fn new(params: FlowParams) -> Self {
        Self {
            params,
            transients: VecDeque::new(),
            persistent: None,
            retiring: Vec::new(),
            last_trigger: HashMap::new(),
            error: None,
            next_id: 0,
        }
    }

    pub fn params(&self) -> &FlowParams {
        &self.params
    }

    /// New parameters apply to events created afterward.
    pub fn set_params(&mut self, params: FlowParams) {
        self.params = params;
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id = self.next_id.wrapping_add(1);
        self.next_id
    }

    /// Start a transient event from `source` to `destination`.
    ///
    /// Returns `None` when the same target was accepted less than the
    /// debounce window before `now` (seconds on the caller's clock).
    pub fn trigger(
        &mut self,
        target: &str,
        source: Vec3,
        destination: Vec3,
        now: f64,
    ) -> Option<&FlowEvent> {
        if let Some(&last) = self.last_trigger.get(target) {
            if now - last < self.params.debounce_secs {
                debug!("Flow trigger for '{}' debounced", target);
                return None;
            }
        }
        self.last_trigger.insert(target.to_string(), now);

        let capacity = self.params.capacity.max(1);
        while self.transients.len() >= capacity {
            if let Some(evicted) = self.transients.pop_front() {
                debug!(
                    "Flow capacity {} reached, evicting event {} for '{}'",
                    capacity, evicted.id, evicted.target
                );
            }
        }

        let id = self.allocate_id();
        let event = FlowEvent::transient(id, target, source, destination, &self.params);
        self.transients.push_back(event);
        self.transients.back()
    }

    /// Make `target` the persistent stream. Returns false when it already
    /// is; otherwise the previous stream (if any) starts fading.
    pub fn start_persistent_stream(
        &mut self,
        target: &str,
        source: Vec3,
        destination: Vec3,
    ) -> bool {
        if self
            .persistent
            .as_ref()
            .is_some_and(|stream| stream.target == target)
        {
            return false;
        }
        self.retire_stream();
        let id = self.allocate_id();
        self.persistent = Some(FlowEvent::persistent(
            id,
            target,
            source,
            destination,
            &self.params,
        ));
        true
    }

    /// Fade out the persistent stream. Returns false when there was none.
    pub fn stop_persistent_stream(&mut self) -> bool {
        self.retire_stream()
    }

    fn retire_stream(&mut self) -> bool {
        match self.persistent.take() {
            Some(mut stream) => {
                stream.stop();
                self.retiring.push(stream);
                true
            }
            None => false,
        }
    }

    /// Advance every live event by `dt` seconds and drop finished ones.
    /// `elapsed` is the caller's clock, used to prune debounce memory.
    pub fn tick(&mut self, dt: f32, elapsed: f64) {
        for event in self.transients.iter_mut() {
            event.advance(dt);
        }
        self.transients.retain(|e| !e.is_done());

        for event in self.retiring.iter_mut() {
            event.advance(dt);
        }
        self.retiring.retain(|e| !e.is_done());

        if let Some(stream) = self.persistent.as_mut() {
            stream.advance(dt);
        }

        let window = self.params.debounce_secs;
        self.last_trigger.retain(|_, t| elapsed - *t < window);
    }

    /// Assert or clear the externally driven error state. It takes
    /// precedence over the count-based classification.
    pub fn set_error_override(&mut self, reason: Option<String>) {
        match (&self.error, &reason) {
            (None, Some(r)) => warn!("Flow error state raised: {}", r),
            (Some(_), None) => info!("Flow error state cleared"),
            _ => {}
        }
        self.error = reason;
    }

    pub fn error_reason(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn current_state(&self) -> SystemState {
        if self.error.is_some() {
            return SystemState::Error;
        }
        SystemState::classify(
            self.persistent.is_some(),
            self.transients.len(),
            self.params.bulk_threshold,
        )
    }

    /// Drop every event and all debounce memory immediately.
    pub fn dispose(&mut self) {
        self.transients.clear();
        self.persistent = None;
        self.retiring.clear();
        self.last_trigger.clear();
    }

    /// Point every live event for `target` at a new destination. Returns
    /// the number of events moved.
    pub fn retarget(&mut self, target: &str, destination: Vec3) -> usize {
        let mut moved = 0;
        for event in self.events_mut().filter(|e| e.target == target) {
            event.destination = destination;
            moved += 1;
        }
        moved
    }

    /// Drop every live event aimed at `target`, the current stream included,
    /// without a fade. Returns the number of events removed.
    pub fn drop_target(&mut self, target: &str) -> usize {
        let before = self.live_count();
        self.transients.retain(|e| e.target != target);
        self.retiring.retain(|e| e.target != target);
        if self.persistent_target() == Some(target) {
            self.persistent = None;
        }
        before - self.live_count()
    }

    /// Move the source end of every live event.
    pub fn move_source(&mut self, source: Vec3) {
        for event in self.events_mut() {
            event.source = source;
        }
    }

    pub fn transient_count(&self) -> usize {
        self.transients.len()
    }

    pub fn live_count(&self) -> usize {
        self.transients.len() + self.retiring.len() + usize::from(self.persistent.is_some())
    }

    pub fn persistent(&self) -> Option<&FlowEvent> {
        self.persistent.as_ref()
    }

    pub fn persistent_target(&self) -> Option<&str> {
        self.persistent.as_ref().map(|s| s.target.as_str())
    }

    /// Streams that were replaced or stopped and are still fading.
    pub fn retiring(&self) -> &[FlowEvent] {
        &self.retiring
    }

    /// Transient events, oldest first.
    pub fn transients(&self) -> impl Iterator<Item = &FlowEvent> {
        self.transients.iter()
    }

    /// Every live event: transients (oldest first), retiring streams, then
    /// the current stream.
    pub fn events(&self) -> impl Iterator<Item = &FlowEvent> {
        self.transients
            .iter()
            .chain(self.retiring.iter())
            .chain(self.persistent.iter())
    }

    fn events_mut(&mut self) -> impl Iterator<Item = &mut FlowEvent> {
        self.transients
            .iter_mut()
            .chain(self.retiring.iter_mut())
            .chain(self.persistent.iter_mut())
    }

    /// Distinct targets of all live events.
    pub fn targets(&self) -> Vec<String> {
        let mut targets: Vec<String> = self.events().map(|e| e.target.clone()).collect();
        targets.sort();
        targets.dedup();
        targets
    }

    /// Number of targets currently remembered for debouncing.
    pub fn debounce_entries(&self) -> usize {
        self.last_trigger.len()
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        let current = self.persistent.as_ref().map(|s| s.id);
        FlowSnapshot {
            events: self
                .events()
                .map(|e| FlowEventView {
                    id: e.id,
                    target: e.target.clone(),
                    source: e.source,
                    destination: e.destination,
                    intensity: e.intensity,
                    phase: e.phase(),
                    opacity: e.opacity(),
                    progress: e.progress(),
                    pulse: e.pulse(),
                    streaming: Some(e.id) == current,
                })
                .collect(),
            state: self.current_state(),
            error: self.error.clone(),
            stream_target: self.persistent_target().map(str::to_string),
        }
    }
}
