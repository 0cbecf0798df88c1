//! Mouse and keyboard input for rearranging the city.
//!
//! Left-drag on a building moves that item, left-drag on a zone plate moves
//! the whole zone. Esc cancels a drag in progress, R resets every manual
//! adjustment.

use bevy::prelude::*;

use simulation::interaction::{InteractionMode, LayoutEdit};
use simulation::layout::CityLayout;

/// Cursor position projected onto the y = 0 ground plane.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct CursorGround(pub Option<Vec2>);

/// Where a ray meets the ground plane, as (x, z). `None` when the ray is
/// parallel to the ground or points away from it.
pub fn ground_hit(origin: Vec3, direction: Vec3) -> Option<Vec2> {
    if direction.y.abs() <= 0.001 {
        return None;
    }
    let t = -origin.y / direction.y;
    if t <= 0.0 {
        return None;
    }
    let hit = origin + direction * t;
    Some(Vec2::new(hit.x, hit.z))
}

pub fn update_cursor_ground(
    windows: Query<&Window>,
    camera_q: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    mut cursor: ResMut<CursorGround>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Ok((camera, cam_transform)) = camera_q.get_single() else {
        return;
    };

    let hit = window
        .cursor_position()
        .and_then(|screen_pos| camera.viewport_to_world(cam_transform, screen_pos).ok())
        .and_then(|ray| ground_hit(ray.origin, *ray.direction));
    cursor.set_if_neq(CursorGround(hit));
}

/// Drive the drag state machine from the left mouse button.
pub fn drag_layout(
    buttons: Res<ButtonInput<MouseButton>>,
    cursor: Res<CursorGround>,
    layout: Res<CityLayout>,
    mut mode: ResMut<InteractionMode>,
    mut edits: EventWriter<LayoutEdit>,
) {
    if buttons.just_pressed(MouseButton::Left) {
        if let Some(point) = cursor.0 {
            let result = layout.result();
            if let Some(item) = result.item_at(point) {
                mode.begin_item_drag(item.id.clone(), point);
            } else if let Some(zone) = result.zone_at(point) {
                mode.begin_zone_drag(zone.key.clone(), point);
            }
        }
    }

    if buttons.pressed(MouseButton::Left) && !mode.is_idle() {
        if let Some(delta) = cursor.0.and_then(|point| mode.drag_to(point)) {
            edits.send(LayoutEdit::Move(delta));
        }
    }

    if buttons.just_released(MouseButton::Left) && mode.end_drag() {
        edits.send(LayoutEdit::Commit);
    }
}

pub fn layout_keyboard(
    keys: Res<ButtonInput<KeyCode>>,
    mut mode: ResMut<InteractionMode>,
    mut edits: EventWriter<LayoutEdit>,
) {
    if keys.just_pressed(KeyCode::Escape) {
        if let Some(undo) = mode.cancel() {
            edits.send(LayoutEdit::Move(undo));
        }
    }
    if keys.just_pressed(KeyCode::KeyR) && mode.is_idle() {
        edits.send(LayoutEdit::ResetAll);
    }
}
