use bevy::prelude::*;

use simulation::simulation_sets::CitySet;

pub mod camera;
pub mod city_render;
pub mod flow_render;
pub mod input;
pub mod palette;

use camera::CameraGesture;
use input::CursorGround;

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraGesture>()
            .init_resource::<CursorGround>()
            .insert_resource(ClearColor(palette::GROUND_COLOR))
            .add_systems(
                Startup,
                (
                    camera::setup_camera,
                    setup_lighting,
                    city_render::setup_city_assets,
                ),
            )
            // Input feeds the simulation's ingest stage.
            .add_systems(
                Update,
                (
                    input::update_cursor_ground,
                    input::drag_layout,
                    input::layout_keyboard,
                )
                    .chain()
                    .before(CitySet::Ingest),
            )
            .add_systems(
                Update,
                (camera::camera_mouse, camera::camera_keys, camera::camera_zoom),
            )
            .add_systems(
                Update,
                (
                    camera::fit_camera_to_layout,
                    camera::apply_orbit_camera,
                    city_render::sync_city_visuals,
                    city_render::highlight_stream_target,
                    flow_render::draw_flow_connectors,
                )
                    .chain()
                    .after(CitySet::Publish),
            );
    }
}

fn setup_lighting(mut commands: Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.9, 0.9, 1.0),
        brightness: 300.0,
    });

    // Directional light (sun) angled from above
    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::XYZ,
            -std::f32::consts::FRAC_PI_4,
            std::f32::consts::FRAC_PI_6,
            0.0,
        )),
    ));
}
