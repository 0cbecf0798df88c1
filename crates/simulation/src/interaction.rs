//! Drag interaction as an explicit state machine.
//!
//! The input layer feeds ground-plane points in and gets discrete
//! [`PositionDelta`] commands out; the layout never sees cursor state.

use bevy::prelude::*;

use crate::layout::{LayoutOverrides, PositionDelta};
use crate::simulation_sets::CitySet;
use crate::zones::ZoneKey;

#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub enum InteractionMode {
    #[default]
    Idle,
    DraggingZone {
        key: ZoneKey,
        /// Last ground point a delta was emitted for.
        origin: Vec2,
        /// Sum of every delta emitted during this drag.
        total: Vec2,
    },
    DraggingItem {
        id: String,
        origin: Vec2,
        total: Vec2,
    },
}

impl InteractionMode {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionMode::Idle)
    }

    /// Returns false (and changes nothing) if a drag is already running.
    pub fn begin_zone_drag(&mut self, key: ZoneKey, point: Vec2) -> bool {
        if !self.is_idle() {
            return false;
        }
        *self = InteractionMode::DraggingZone {
            key,
            origin: point,
            total: Vec2::ZERO,
        };
        true
    }

    /// Returns false (and changes nothing) if a drag is already running.
    pub fn begin_item_drag(&mut self, id: impl Into<String>, point: Vec2) -> bool {
        if !self.is_idle() {
            return false;
        }
        *self = InteractionMode::DraggingItem {
            id: id.into(),
            origin: point,
            total: Vec2::ZERO,
        };
        true
    }

    /// Move the cursor to `point`. Yields the delta since the previous
    /// point, or `None` when idle or the point did not move.
    pub fn drag_to(&mut self, point: Vec2) -> Option<PositionDelta> {
        match self {
            InteractionMode::Idle => None,
            InteractionMode::DraggingZone { key, origin, total } => {
                let delta = point - *origin;
                if delta == Vec2::ZERO {
                    return None;
                }
                *origin = point;
                *total += delta;
                Some(PositionDelta::Zone {
                    key: key.clone(),
                    delta,
                })
            }
            InteractionMode::DraggingItem { id, origin, total } => {
                let delta = point - *origin;
                if delta == Vec2::ZERO {
                    return None;
                }
                *origin = point;
                *total += delta;
                Some(PositionDelta::Item {
                    id: id.clone(),
                    delta,
                })
            }
        }
    }

    /// Finish the drag. True when it moved anything.
    pub fn end_drag(&mut self) -> bool {
        let moved = match self {
            InteractionMode::Idle => false,
            InteractionMode::DraggingZone { total, .. }
            | InteractionMode::DraggingItem { total, .. } => *total != Vec2::ZERO,
        };
        *self = InteractionMode::Idle;
        moved
    }

    /// Abort the drag. Returns the delta that undoes everything it moved.
    pub fn cancel(&mut self) -> Option<PositionDelta> {
        let undo = match std::mem::take(self) {
            InteractionMode::Idle => None,
            InteractionMode::DraggingZone { key, total, .. } => {
                Some(PositionDelta::Zone { key, delta: -total })
            }
            InteractionMode::DraggingItem { id, total, .. } => {
                Some(PositionDelta::Item { id, delta: -total })
            }
        };
        undo.filter(|d| match d {
            PositionDelta::Zone { delta, .. } | PositionDelta::Item { delta, .. } => {
                *delta != Vec2::ZERO
            }
        })
    }
}

/// Edits to the saved overrides.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum LayoutEdit {
    Move(PositionDelta),
    /// A drag finished; the overrides are worth persisting.
    Commit,
    /// Drop every manual adjustment.
    ResetAll,
}

/// Overrides changed in a way that should be written to disk.
#[derive(Event, Debug, Clone, Copy, Default, PartialEq)]
pub struct OverridesDirty;

pub fn apply_layout_edits(
    mut edits: EventReader<LayoutEdit>,
    mut overrides: ResMut<LayoutOverrides>,
    mut dirty: EventWriter<OverridesDirty>,
) {
    for edit in edits.read() {
        match edit {
            LayoutEdit::Move(delta) => overrides.apply_delta(delta),
            LayoutEdit::Commit => {
                dirty.send(OverridesDirty);
            }
            LayoutEdit::ResetAll => {
                if !overrides.is_empty() {
                    info!("Clearing all manual layout adjustments");
                    overrides.clear();
                    dirty.send(OverridesDirty);
                }
            }
        }
    }
}

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InteractionMode>()
            .add_event::<LayoutEdit>()
            .add_event::<OverridesDirty>()
            .add_systems(Update, apply_layout_edits.in_set(CitySet::Ingest));
    }
}
