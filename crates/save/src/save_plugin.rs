use std::path::PathBuf;

use bevy::prelude::*;
use simulation::interaction::OverridesDirty;
use simulation::layout::{CityLayout, LayoutOverrides};
use simulation::simulation_sets::CitySet;

use crate::overrides_file::{load_overrides, save_overrides};

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

pub const DEFAULT_OVERRIDES_FILE: &str = "project_city_overrides.bin";

/// Where the manual layout overrides are stored.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct OverridesPath(pub PathBuf);

impl Default for OverridesPath {
    fn default() -> Self {
        Self(PathBuf::from(DEFAULT_OVERRIDES_FILE))
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Explicit request to write the overrides now.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct SaveOverridesEvent;

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// A missing or unreadable file leaves the overrides empty.
pub fn load_overrides_on_startup(
    path: Res<OverridesPath>,
    mut overrides: ResMut<LayoutOverrides>,
) {
    match load_overrides(&path.0) {
        Ok(Some(loaded)) => {
            info!(
                "Loaded layout overrides from {}: {} zones, {} items",
                path.0.display(),
                loaded.zone_offsets.len(),
                loaded.item_offsets.len()
            );
            *overrides = loaded;
        }
        Ok(None) => {
            debug!("No layout overrides at {}", path.0.display());
        }
        Err(e) => {
            warn!(
                "Ignoring unreadable layout overrides at {}: {e}",
                path.0.display()
            );
        }
    }
}

/// Write the overrides after a finished drag, a reset or an explicit save.
///
/// Offsets for zones and items that no longer exist are dropped from the
/// written copy, but only once a layout has been computed.
pub fn save_dirty_overrides(
    mut dirty: EventReader<OverridesDirty>,
    mut requested: EventReader<SaveOverridesEvent>,
    path: Res<OverridesPath>,
    overrides: Res<LayoutOverrides>,
    layout: Res<CityLayout>,
) {
    let wanted = dirty.read().count() + requested.read().count();
    if wanted == 0 {
        return;
    }

    let mut to_write = overrides.clone();
    if !layout.base().is_empty() {
        let pruned = to_write.prune(layout.base());
        if pruned > 0 {
            debug!("Pruned {pruned} stale layout overrides");
        }
    }

    match save_overrides(&path.0, &to_write) {
        Ok(()) => info!("Saved layout overrides to {}", path.0.display()),
        Err(e) => error!(
            "Failed to save layout overrides to {}: {e}",
            path.0.display()
        ),
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OverridesPath>()
            .init_resource::<LayoutOverrides>()
            .add_event::<SaveOverridesEvent>()
            .add_event::<OverridesDirty>()
            .add_systems(Startup, load_overrides_on_startup)
            .add_systems(Update, save_dirty_overrides.in_set(CitySet::Publish));
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::Duration;

    use bevy::time::TimeUpdateStrategy;
    use simulation::interaction::LayoutEdit;
    use simulation::items::{ItemRecord, ItemStore, Stage};
    use simulation::layout::PositionDelta;
    use simulation::zones::ZoneKey;
    use simulation::SimulationPlugin;

    use super::*;
    use crate::overrides_file::encode_overrides;

    fn test_dir(name: &str) -> PathBuf {
        let dir = PathBuf::from(format!("/tmp/project_city_save_plugin_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn app_with(path: PathBuf) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)));
        app.insert_resource(OverridesPath(path));
        app.add_plugins((SimulationPlugin, SavePlugin));
        app.update();
        app
    }

    fn web_key() -> ZoneKey {
        ZoneKey::new(Stage::Active, "web")
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = test_dir("missing");
        let app = app_with(dir.join("overrides.bin"));
        assert!(app.world().resource::<LayoutOverrides>().is_empty());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = test_dir("corrupt");
        let path = dir.join("overrides.bin");
        fs::write(&path, b"PCTY but not really").unwrap();

        let app = app_with(path);
        assert!(app.world().resource::<LayoutOverrides>().is_empty());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_startup_loads_saved_overrides() {
        let dir = test_dir("startup");
        let path = dir.join("overrides.bin");
        let mut saved = LayoutOverrides::default();
        saved.apply_delta(&PositionDelta::Zone {
            key: web_key(),
            delta: Vec2::new(5.0, 0.0),
        });
        fs::write(&path, encode_overrides(&saved)).unwrap();

        let app = app_with(path);
        assert_eq!(*app.world().resource::<LayoutOverrides>(), saved);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_commit_writes_pruned_overrides() {
        let dir = test_dir("commit");
        let path = dir.join("overrides.bin");
        let mut app = app_with(path.clone());
        app.world_mut()
            .resource_mut::<ItemStore>()
            .replace_all(vec![ItemRecord::new("a", "web")]);
        app.update();

        app.world_mut().send_event(LayoutEdit::Move(PositionDelta::Item {
            id: "a".to_string(),
            delta: Vec2::new(2.0, 1.0),
        }));
        app.world_mut().send_event(LayoutEdit::Move(PositionDelta::Item {
            id: "gone".to_string(),
            delta: Vec2::new(9.0, 9.0),
        }));
        app.world_mut().send_event(LayoutEdit::Commit);
        app.update();

        let written = load_overrides(&path).unwrap().expect("file written");
        assert_eq!(written.item_offset("a"), Vec2::new(2.0, 1.0));
        assert!(!written.item_offsets.contains_key("gone"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_explicit_save_without_layout_keeps_everything() {
        let dir = test_dir("explicit");
        let path = dir.join("overrides.bin");
        let mut app = app_with(path.clone());
        app.world_mut()
            .resource_mut::<LayoutOverrides>()
            .apply_delta(&PositionDelta::Zone {
                key: web_key(),
                delta: Vec2::new(1.0, 1.0),
            });
        app.world_mut().send_event(SaveOverridesEvent);
        app.update();

        let written = load_overrides(&path).unwrap().expect("file written");
        assert_eq!(written.zone_offset(&web_key()), Vec2::new(1.0, 1.0));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_no_events_writes_nothing() {
        let dir = test_dir("idle");
        let path = dir.join("overrides.bin");
        let mut app = app_with(path.clone());
        app.update();
        app.update();
        assert!(!path.exists());
        let _ = fs::remove_dir_all(&dir);
    }
}
