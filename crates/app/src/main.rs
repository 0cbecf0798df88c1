use std::path::PathBuf;

use bevy::prelude::*;
use bevy::window::PresentMode;
use bevy::winit::{UpdateMode, WinitSettings};

use save::{OverridesPath, SaveOverridesEvent};
use simulation::activity::{ActivitySource, FileActivityChannel};
use simulation::city_params::CityParams;
use simulation::items::{demo_items, ItemStore};
use simulation::simulation_sets::CitySet;

mod manifest_watch;

use manifest_watch::{poll_manifest, ManifestWatch};

const DEMO_SEED: u64 = 7;
const DEMO_COUNT: usize = 40;

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Project City".to_string(),
            resolution: (1280.0, 720.0).into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }))
    .insert_resource(WinitSettings {
        focused_mode: UpdateMode::Continuous,
        unfocused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(100)),
    });

    // Logging is up once DefaultPlugins is built.
    let params = match env_path("PROJECT_CITY_CONFIG") {
        Some(path) => CityParams::load_or_default(&path),
        None => CityParams::default(),
    };
    app.insert_resource(params);

    if let Some(path) = env_path("PROJECT_CITY_OVERRIDES") {
        app.insert_resource(OverridesPath(path));
    }

    app.add_plugins((
        simulation::SimulationPlugin,
        rendering::RenderingPlugin,
        save::SavePlugin,
    ));

    match env_path("PROJECT_CITY_ITEMS") {
        Some(path) => {
            info!("Watching item manifest {}", path.display());
            app.insert_resource(ManifestWatch::new(path))
                .add_systems(Update, poll_manifest.before(CitySet::Ingest));
        }
        None => {
            info!("PROJECT_CITY_ITEMS not set; showing {DEMO_COUNT} demo items");
            app.insert_resource(ItemStore::from_records(demo_items(DEMO_SEED, DEMO_COUNT)));
        }
    }

    match env_path("PROJECT_CITY_ACTIVITY") {
        Some(path) => {
            info!("Reading activity from {}", path.display());
            app.insert_resource(ActivitySource::new(FileActivityChannel::new(path)));
        }
        None => debug!("PROJECT_CITY_ACTIVITY not set; activity streams disabled"),
    }

    app.add_systems(Update, save_shortcut);
    app.run();
}

/// Ctrl+S writes the overrides immediately.
fn save_shortcut(keys: Res<ButtonInput<KeyCode>>, mut save: EventWriter<SaveOverridesEvent>) {
    let ctrl = keys.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]);
    if ctrl && keys.just_pressed(KeyCode::KeyS) {
        save.send(SaveOverridesEvent);
    }
}
