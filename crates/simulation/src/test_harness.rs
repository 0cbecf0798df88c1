//! # TestCity: headless integration test harness
//!
//! Wraps a `bevy::app::App` with `MinimalPlugins` + `SimulationPlugin` and a
//! manual clock, so tests can load items, send events and step time
//! deterministically without a window or renderer.

use std::time::Duration;

use bevy::app::App;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use crate::activity::{ActivityClock, ActivitySignal, ActivitySource, SharedActivityChannel};
use crate::city_params::CityParams;
use crate::flow::{ErrorSignal, FlowEventManager, FlowSnapshot, FlowTrigger, StreamCommand};
use crate::interaction::LayoutEdit;
use crate::items::{ItemRecord, ItemStore};
use crate::layout::{CityLayout, LayoutOverrides, LayoutResult};
use crate::SimulationPlugin;

/// Length of one `tick()`.
pub const TICK: Duration = Duration::from_millis(100);

/// A headless Bevy App wrapping `SimulationPlugin` for integration testing.
pub struct TestCity {
    app: App,
    activity: SharedActivityChannel,
}

impl TestCity {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// An empty city with default parameters.
    pub fn new() -> Self {
        Self::with_params(CityParams::default())
    }

    pub fn with_params(params: CityParams) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(TICK));
        app.insert_resource(params);
        app.add_plugins(SimulationPlugin);

        let activity = SharedActivityChannel::new();
        app.insert_resource(ActivitySource::new(activity.clone()));
        app.insert_resource(ActivityClock::Fixed(0.0));

        // First update runs Startup and primes the clock (zero delta).
        app.update();
        Self { app, activity }
    }

    // -----------------------------------------------------------------------
    // Setup (builder pattern, consumes and returns Self)
    // -----------------------------------------------------------------------

    /// Replace the item store and run one tick so the layout rebuilds.
    pub fn with_items(mut self, items: Vec<ItemRecord>) -> Self {
        self.set_items(items);
        self
    }

    pub fn with_overrides(mut self, overrides: LayoutOverrides) -> Self {
        self.app.insert_resource(overrides);
        self.tick(1);
        self
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    pub fn set_items(&mut self, items: Vec<ItemRecord>) {
        self.app
            .world_mut()
            .resource_mut::<ItemStore>()
            .replace_all(items);
        self.tick(1);
    }

    /// Send a flow trigger; it is processed on the next tick.
    pub fn trigger(&mut self, target: &str) {
        self.app.world_mut().send_event(FlowTrigger::new(target));
    }

    pub fn stream(&mut self, command: StreamCommand) {
        self.app.world_mut().send_event(command);
    }

    pub fn error(&mut self, signal: ErrorSignal) {
        self.app.world_mut().send_event(signal);
    }

    pub fn edit(&mut self, edit: LayoutEdit) {
        self.app.world_mut().send_event(edit);
    }

    /// Put a reading on the activity channel (or clear it).
    pub fn set_activity(&mut self, signal: Option<ActivitySignal>) {
        self.activity.set(signal);
    }

    /// Set the millisecond clock the activity adapter compares against.
    pub fn set_wall_clock_ms(&mut self, ms: f64) {
        self.app.insert_resource(ActivityClock::Fixed(ms));
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    /// Advance `n` updates of [`TICK`] each.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.update();
        }
    }

    /// Advance at least `secs` of simulated time.
    pub fn run_for_secs(&mut self, secs: f32) {
        let n = (secs / TICK.as_secs_f32()).ceil() as u32;
        self.tick(n);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    /// Access the app, e.g. to add a probe system.
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    pub fn layout(&self) -> &LayoutResult {
        self.resource::<CityLayout>().result()
    }

    pub fn layout_revision(&self) -> u64 {
        self.resource::<CityLayout>().revision()
    }

    pub fn flow(&self) -> &FlowEventManager {
        self.resource::<FlowEventManager>()
    }

    pub fn snapshot(&self) -> &FlowSnapshot {
        self.resource::<FlowSnapshot>()
    }

    pub fn overrides(&self) -> &LayoutOverrides {
        self.resource::<LayoutOverrides>()
    }

    /// Events of type `E` still buffered (sent during the last two updates).
    pub fn events<E: Event + Clone>(&self) -> Vec<E> {
        let events = self.app.world().resource::<Events<E>>();
        let mut cursor = events.get_cursor();
        cursor.read(events).cloned().collect()
    }
}

impl Default for TestCity {
    fn default() -> Self {
        Self::new()
    }
}
