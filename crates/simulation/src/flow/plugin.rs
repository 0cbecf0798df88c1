use bevy::prelude::*;

use crate::city_params::CityParams;
use crate::layout::{CityLayout, LayoutRebuilt};
use crate::simulation_sets::CitySet;

use super::manager::FlowEventManager;
use super::state::FlowSnapshot;

/// "This item just changed": fire a transient connector to it.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct FlowTrigger {
    pub target: String,
}

impl FlowTrigger {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

/// Start or stop the persistent "being worked on" stream.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum StreamCommand {
    Start(String),
    Stop,
}

/// External error assertion (for example a failed build).
#[derive(Event, Debug, Clone, PartialEq)]
pub enum ErrorSignal {
    Raise(String),
    Clear,
}

pub fn sync_flow_params(params: Res<CityParams>, mut manager: ResMut<FlowEventManager>) {
    if params.is_changed() && !params.is_added() {
        manager.set_params(params.flow.clone());
    }
}

pub fn apply_error_signals(
    mut signals: EventReader<ErrorSignal>,
    mut manager: ResMut<FlowEventManager>,
) {
    for signal in signals.read() {
        match signal {
            ErrorSignal::Raise(reason) => manager.set_error_override(Some(reason.clone())),
            ErrorSignal::Clear => manager.set_error_override(None),
        }
    }
}

/// Resolve triggers against the current layout. Unknown targets are
/// logged and skipped.
pub fn handle_flow_triggers(
    mut triggers: EventReader<FlowTrigger>,
    layout: Res<CityLayout>,
    time: Res<Time>,
    mut manager: ResMut<FlowEventManager>,
) {
    let result = layout.result();
    let hub = result.hub_position();
    let now = time.elapsed_secs_f64();
    for trigger in triggers.read() {
        let Some(destination) = result.item(&trigger.target).and_then(|i| i.roof_point()) else {
            warn!("Flow trigger for unknown item '{}' ignored", trigger.target);
            continue;
        };
        manager.trigger(&trigger.target, hub, destination, now);
    }
}

/// Unknown targets warn once until a different target is requested, since
/// live activity repeats the start on every poll.
pub fn handle_stream_commands(
    mut commands: EventReader<StreamCommand>,
    layout: Res<CityLayout>,
    mut manager: ResMut<FlowEventManager>,
    mut last_unknown: Local<Option<String>>,
) {
    let result = layout.result();
    for command in commands.read() {
        match command {
            StreamCommand::Start(target) => {
                let Some(destination) = result.item(target).and_then(|i| i.roof_point()) else {
                    if last_unknown.as_deref() != Some(target.as_str()) {
                        warn!("Stream start for unknown item '{}' ignored", target);
                        *last_unknown = Some(target.clone());
                    }
                    continue;
                };
                *last_unknown = None;
                if manager.start_persistent_stream(target, result.hub_position(), destination) {
                    debug!("Persistent stream now targets '{}'", target);
                }
            }
            StreamCommand::Stop => {
                *last_unknown = None;
                manager.stop_persistent_stream();
            }
        }
    }
}

/// Keep live connectors attached after the layout moves. Connectors to
/// items that left the layout are dropped.
pub fn retarget_on_layout_rebuild(
    mut rebuilt: EventReader<LayoutRebuilt>,
    layout: Res<CityLayout>,
    mut manager: ResMut<FlowEventManager>,
) {
    if rebuilt.read().last().is_none() {
        return;
    }
    let result = layout.result();
    manager.move_source(result.hub_position());
    for target in manager.targets() {
        match result.item(&target).and_then(|i| i.roof_point()) {
            Some(destination) => {
                manager.retarget(&target, destination);
            }
            None => {
                let dropped = manager.drop_target(&target);
                debug!("Dropped {dropped} connectors to removed item '{target}'");
            }
        }
    }
}

pub fn tick_flow_events(time: Res<Time>, mut manager: ResMut<FlowEventManager>) {
    manager.tick(time.delta_secs(), time.elapsed_secs_f64());
}

pub fn publish_flow_snapshot(manager: Res<FlowEventManager>, mut snapshot: ResMut<FlowSnapshot>) {
    *snapshot = manager.snapshot();
}

pub struct FlowPlugin;

impl Plugin for FlowPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FlowEventManager>()
            .init_resource::<FlowSnapshot>()
            .add_event::<FlowTrigger>()
            .add_event::<StreamCommand>()
            .add_event::<ErrorSignal>()
            .add_systems(
                Update,
                (
                    sync_flow_params,
                    apply_error_signals,
                    retarget_on_layout_rebuild,
                    handle_flow_triggers,
                    handle_stream_commands,
                    tick_flow_events,
                )
                    .chain()
                    .in_set(CitySet::Flow),
            )
            .add_systems(Update, publish_flow_snapshot.in_set(CitySet::Publish));
    }
}
