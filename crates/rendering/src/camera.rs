use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use simulation::city_params::CityParams;
use simulation::layout::{CityLayout, LayoutRebuilt, ZoneBounds};

/// Arrow-key pan rate in screen pixels per second.
const KEY_PAN_SPEED: f32 = 600.0;
const ZOOM_SPEED: f32 = 0.15;
const MIN_DISTANCE: f32 = 10.0;
const MAX_DISTANCE: f32 = 2000.0;
const MIN_PITCH: f32 = 10.0 * std::f32::consts::PI / 180.0;
const MAX_PITCH: f32 = 85.0 * std::f32::consts::PI / 180.0;
const ORBIT_SENSITIVITY: f32 = 0.005;
/// Vertical field of view of the default perspective projection.
const FOV: f32 = std::f32::consts::FRAC_PI_4;

/// Orbital camera model: camera orbits around a focus point on the ground.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    /// Ground point the camera looks at
    pub focus: Vec3,
    /// Horizontal rotation in radians
    pub yaw: f32,
    /// Elevation angle in radians (clamped between MIN_PITCH and MAX_PITCH)
    pub pitch: f32,
    /// Distance from focus point
    pub distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            focus: Vec3::ZERO,
            yaw: 0.6,
            pitch: 50.0_f32.to_radians(),
            distance: 120.0,
        }
    }
}

impl OrbitCamera {
    /// Center on `bounds` and back off far enough to see all of it.
    pub fn fit(&mut self, bounds: &ZoneBounds) {
        let center = bounds.center();
        self.focus = Vec3::new(center.x, 0.0, center.y);
        let radius = 0.5 * (bounds.width * bounds.width + bounds.depth * bounds.depth).sqrt();
        self.distance = (radius / (FOV * 0.5).sin()).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}

/// The mouse button currently steering the camera. Left is reserved for
/// layout drags.
#[derive(Resource, Debug, Default)]
pub struct CameraGesture {
    pub button: Option<MouseButton>,
    pub last_pos: Vec2,
}

pub fn setup_camera(mut commands: Commands) {
    let orbit = OrbitCamera::default();
    let (pos, look_at) = orbit_to_transform(&orbit);

    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(pos).looking_at(look_at, Vec3::Y),
    ));
    commands.insert_resource(orbit);
}

fn orbit_to_transform(orbit: &OrbitCamera) -> (Vec3, Vec3) {
    // Spherical to cartesian offset from focus
    let x = orbit.distance * orbit.pitch.cos() * orbit.yaw.sin();
    let y = orbit.distance * orbit.pitch.sin();
    let z = orbit.distance * orbit.pitch.cos() * orbit.yaw.cos();
    (orbit.focus + Vec3::new(x, y, z), orbit.focus)
}

/// Re-fit the camera after a full layout rebuild. Override-only rebuilds
/// (drags) leave the view alone.
pub fn fit_camera_to_layout(
    mut rebuilt: EventReader<LayoutRebuilt>,
    layout: Res<CityLayout>,
    params: Res<CityParams>,
    mut orbit: ResMut<OrbitCamera>,
) {
    if !rebuilt.read().any(|e| e.full) {
        return;
    }
    if let Some(bounds) = layout.result().bounds(params.layout.camera_margin) {
        orbit.fit(&bounds);
    }
}

/// System: apply OrbitCamera state to the actual camera Transform each frame.
pub fn apply_orbit_camera(
    orbit: Res<OrbitCamera>,
    mut query: Query<&mut Transform, With<Camera3d>>,
) {
    if !orbit.is_changed() {
        return;
    }
    let (pos, look_at) = orbit_to_transform(&orbit);
    let Ok(mut transform) = query.get_single_mut() else {
        return;
    };
    *transform = Transform::from_translation(pos).looking_at(look_at, Vec3::Y);
}

/// Ground-plane offset for a screen-space pan of `screen` pixels.
/// Dragging right moves the view right, so the focus moves left.
fn pan_offset(yaw: f32, distance: f32, screen: Vec2) -> Vec2 {
    let (sin, cos) = yaw.sin_cos();
    let scale = distance / 1000.0;
    Vec2::new(
        -screen.x * cos - screen.y * sin,
        screen.x * sin - screen.y * cos,
    ) * scale
}

fn orbit_by(orbit: &mut OrbitCamera, screen: Vec2) {
    orbit.yaw += screen.x * ORBIT_SENSITIVITY;
    orbit.pitch = (orbit.pitch - screen.y * ORBIT_SENSITIVITY).clamp(MIN_PITCH, MAX_PITCH);
}

fn zoom_by(orbit: &mut OrbitCamera, lines: f32) {
    let factor = 1.0 - lines * ZOOM_SPEED;
    orbit.distance = (orbit.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
}

/// Middle drag pans, right drag orbits.
pub fn camera_mouse(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    mut gesture: ResMut<CameraGesture>,
    mut orbit: ResMut<OrbitCamera>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let cursor = window.cursor_position();

    if let Some(button) = gesture.button {
        if buttons.just_released(button) {
            gesture.button = None;
        }
    }
    if gesture.button.is_none() {
        let pressed = [MouseButton::Middle, MouseButton::Right]
            .into_iter()
            .find(|b| buttons.just_pressed(*b));
        if let (Some(button), Some(pos)) = (pressed, cursor) {
            gesture.button = Some(button);
            gesture.last_pos = pos;
        }
        return;
    }

    let Some(pos) = cursor else {
        return;
    };
    let delta = pos - gesture.last_pos;
    gesture.last_pos = pos;
    if delta == Vec2::ZERO {
        return;
    }
    match gesture.button {
        Some(MouseButton::Middle) => {
            let offset = pan_offset(orbit.yaw, orbit.distance, delta);
            orbit.focus += Vec3::new(offset.x, 0.0, offset.y);
        }
        Some(MouseButton::Right) => orbit_by(&mut orbit, delta),
        _ => {}
    }
}

/// Arrow keys pan. Letter keys belong to the layout shortcuts.
pub fn camera_keys(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut orbit: ResMut<OrbitCamera>,
) {
    let mut dir = Vec2::ZERO;
    for (key, step) in [
        (KeyCode::ArrowUp, Vec2::NEG_Y),
        (KeyCode::ArrowDown, Vec2::Y),
        (KeyCode::ArrowLeft, Vec2::NEG_X),
        (KeyCode::ArrowRight, Vec2::X),
    ] {
        if keys.pressed(key) {
            dir += step;
        }
    }
    if dir == Vec2::ZERO {
        return;
    }
    // Same direction convention as a drag, reversed: keys move the view.
    let pixels = -dir.normalize() * KEY_PAN_SPEED * time.delta_secs();
    let offset = pan_offset(orbit.yaw, orbit.distance, pixels);
    orbit.focus += Vec3::new(offset.x, 0.0, offset.y);
}

pub fn camera_zoom(mut wheel: EventReader<MouseWheel>, mut orbit: ResMut<OrbitCamera>) {
    for event in wheel.read() {
        let lines = match event.unit {
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y / 100.0,
        };
        zoom_by(&mut orbit, lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_centers_on_bounds() {
        let mut orbit = OrbitCamera::default();
        orbit.fit(&ZoneBounds::new(10.0, -20.0, 40.0, 20.0));
        assert_eq!(orbit.focus, Vec3::new(30.0, 0.0, -10.0));
    }

    #[test]
    fn test_fit_sees_whole_city() {
        let mut orbit = OrbitCamera::default();
        let bounds = ZoneBounds::new(0.0, 0.0, 120.0, 80.0);
        orbit.fit(&bounds);
        let radius = 0.5 * (120.0f32.powi(2) + 80.0f32.powi(2)).sqrt();
        // The enclosing sphere fits inside the view cone.
        assert!(orbit.distance * (FOV * 0.5).sin() >= radius - 1e-3);
    }

    #[test]
    fn test_fit_distance_is_clamped() {
        let mut orbit = OrbitCamera::default();
        orbit.fit(&ZoneBounds::new(0.0, 0.0, 0.5, 0.5));
        assert_eq!(orbit.distance, MIN_DISTANCE);
        orbit.fit(&ZoneBounds::new(0.0, 0.0, 1.0e5, 1.0e5));
        assert_eq!(orbit.distance, MAX_DISTANCE);
    }

    #[test]
    fn test_pan_follows_yaw() {
        // Facing down -Z (yaw 0), a drag to the right slides focus to -X.
        let offset = pan_offset(0.0, 1000.0, Vec2::new(10.0, 0.0));
        assert!((offset - Vec2::new(-10.0, 0.0)).length() < 1e-4);

        let turned = pan_offset(std::f32::consts::FRAC_PI_2, 1000.0, Vec2::new(10.0, 0.0));
        assert!((turned - Vec2::new(0.0, 10.0)).length() < 1e-4);
    }

    #[test]
    fn test_pan_scales_with_distance() {
        let near = pan_offset(0.3, 100.0, Vec2::new(4.0, 7.0));
        let far = pan_offset(0.3, 400.0, Vec2::new(4.0, 7.0));
        assert!((far - near * 4.0).length() < 1e-4);
    }

    #[test]
    fn test_orbit_pitch_is_clamped() {
        let mut orbit = OrbitCamera::default();
        orbit_by(&mut orbit, Vec2::new(100.0, -10_000.0));
        assert_eq!(orbit.pitch, MAX_PITCH);
        assert!((orbit.yaw - (0.6 + 100.0 * ORBIT_SENSITIVITY)).abs() < 1e-5);
        orbit_by(&mut orbit, Vec2::new(0.0, 10_000.0));
        assert_eq!(orbit.pitch, MIN_PITCH);
    }

    #[test]
    fn test_zoom_in_and_out_stays_in_range() {
        let mut orbit = OrbitCamera::default();
        zoom_by(&mut orbit, 1.0);
        assert!(orbit.distance < 120.0);
        for _ in 0..200 {
            zoom_by(&mut orbit, 3.0);
        }
        assert_eq!(orbit.distance, MIN_DISTANCE);
        for _ in 0..200 {
            zoom_by(&mut orbit, -3.0);
        }
        assert_eq!(orbit.distance, MAX_DISTANCE);
    }

    #[test]
    fn test_orbit_transform_looks_at_focus() {
        let orbit = OrbitCamera {
            focus: Vec3::new(5.0, 0.0, 5.0),
            yaw: 0.0,
            pitch: std::f32::consts::FRAC_PI_4,
            distance: 10.0,
        };
        let (pos, look_at) = orbit_to_transform(&orbit);
        assert_eq!(look_at, orbit.focus);
        assert!((pos.distance(orbit.focus) - 10.0).abs() < 1e-4);
        assert!(pos.y > 0.0);
    }
}
