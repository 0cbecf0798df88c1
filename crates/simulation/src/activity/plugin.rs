use bevy::prelude::*;

use crate::city_params::CityParams;
use crate::flow::StreamCommand;
use crate::simulation_sets::CitySet;

use super::adapter::{ActivityAdapter, ActivityClock, ActivityEvent, ActivityStatus};
use super::channel::ActivitySource;

/// Poll cadence, independent of the frame rate.
#[derive(Resource, Debug, Clone)]
pub struct ActivityPollTimer(pub Timer);

impl FromWorld for ActivityPollTimer {
    fn from_world(world: &mut World) -> Self {
        let secs = world
            .get_resource::<CityParams>()
            .map(|p| p.activity.poll_interval_secs)
            .unwrap_or(crate::config::ACTIVITY_POLL_SECS);
        Self(Timer::from_seconds(secs.max(0.01), TimerMode::Repeating))
    }
}

pub fn poll_activity(
    time: Res<Time>,
    mut timer: ResMut<ActivityPollTimer>,
    source: Option<Res<ActivitySource>>,
    clock: Res<ActivityClock>,
    mut adapter: ResMut<ActivityAdapter>,
    mut status: ResMut<ActivityStatus>,
    mut events: EventWriter<ActivityEvent>,
) {
    if !timer.0.tick(time.delta()).just_finished() {
        return;
    }
    let signal = source.and_then(|s| s.read());
    let transitions = adapter.poll(signal.as_ref(), clock.now_ms());

    let next = ActivityStatus {
        active: adapter.is_active(),
        project: signal
            .as_ref()
            .filter(|_| adapter.is_active())
            .and_then(|s| s.target().map(str::to_string)),
        action: signal
            .as_ref()
            .filter(|_| adapter.is_active())
            .and_then(|s| s.action.clone()),
        last_ping_ms: signal.as_ref().map(|s| s.last_ping),
    };
    status.set_if_neq(next);

    for event in transitions.events {
        match &event {
            ActivityEvent::Started { project, .. } => {
                info!("Activity started on {:?}", project);
            }
            ActivityEvent::Stopped => info!("Activity stopped"),
            ActivityEvent::TargetChanged { previous, current } => {
                debug!("Activity target {:?} -> {:?}", previous, current);
            }
            ActivityEvent::Updated { .. } => {}
        }
        events.send(event);
    }
}

/// Start/target change ⇒ start the stream on the project; stop ⇒ stop it.
///
/// Live updates re-send the start, so a project that enters the layout
/// after activity began still gets its stream. Starting the current target
/// again is a no-op.
pub fn route_activity_to_streams(
    mut events: EventReader<ActivityEvent>,
    mut commands: EventWriter<StreamCommand>,
) {
    for event in events.read() {
        match event {
            ActivityEvent::Started {
                project: Some(project),
                ..
            }
            | ActivityEvent::Updated {
                project: Some(project),
                ..
            }
            | ActivityEvent::TargetChanged {
                current: Some(project),
                ..
            } => {
                commands.send(StreamCommand::Start(project.clone()));
            }
            ActivityEvent::TargetChanged { current: None, .. } => {
                commands.send(StreamCommand::Stop);
            }
            ActivityEvent::Stopped => {
                commands.send(StreamCommand::Stop);
            }
            ActivityEvent::Started { project: None, .. }
            | ActivityEvent::Updated { project: None, .. } => {}
        }
    }
}

pub struct ActivityPlugin;

impl Plugin for ActivityPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActivityAdapter>()
            .init_resource::<ActivityStatus>()
            .init_resource::<ActivityClock>()
            .init_resource::<ActivityPollTimer>()
            .add_event::<ActivityEvent>()
            .add_systems(
                Update,
                (poll_activity, route_activity_to_streams)
                    .chain()
                    .in_set(CitySet::Ingest),
            );
    }
}
