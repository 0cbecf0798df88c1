//! Polls the item manifest and feeds changes into the city.
//!
//! When the file's modification time moves, it is re-parsed, the
//! `ItemStore` is replaced, and every new or freshly modified item gets a
//! flow trigger. The first load only populates the store.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use bevy::prelude::*;

use simulation::flow::FlowTrigger;
use simulation::items::{load_manifest, records_from_raw, ItemRecord, ItemStore};

pub const MANIFEST_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Resource, Debug)]
pub struct ManifestWatch {
    pub path: PathBuf,
    timer: Timer,
    modified: Option<SystemTime>,
    loaded: bool,
}

impl ManifestWatch {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timer: Timer::new(MANIFEST_POLL_INTERVAL, TimerMode::Repeating),
            modified: None,
            loaded: false,
        }
    }
}

/// Replace the store with `records`. Returns the ids to trigger: empty on
/// the initial load, otherwise every new or advanced item.
pub fn apply_manifest(
    store: &mut ItemStore,
    records: Vec<ItemRecord>,
    initial: bool,
) -> Vec<String> {
    let changed = if initial {
        Vec::new()
    } else {
        store.changed_ids(&records)
    };
    store.replace_all(records);
    changed
}

pub fn poll_manifest(
    time: Res<Time>,
    mut watch: ResMut<ManifestWatch>,
    mut store: ResMut<ItemStore>,
    mut triggers: EventWriter<FlowTrigger>,
) {
    // The first poll runs immediately.
    if !watch.timer.tick(time.delta()).just_finished() && watch.loaded {
        return;
    }

    let modified = std::fs::metadata(&watch.path)
        .and_then(|m| m.modified())
        .ok();
    if watch.loaded && modified == watch.modified {
        return;
    }

    let raws = match load_manifest(&watch.path) {
        Ok(raws) => raws,
        Err(e) => {
            // Keep the current city; try again when the file changes.
            if watch.modified != modified || !watch.loaded {
                warn!("Could not read manifest {}: {e}", watch.path.display());
            }
            watch.modified = modified;
            watch.loaded = true;
            return;
        }
    };
    watch.modified = modified;

    let initial = !watch.loaded;
    watch.loaded = true;
    let changed = apply_manifest(&mut store, records_from_raw(&raws), initial);
    info!(
        "Manifest {} loaded: {} items, {} changed",
        watch.path.display(),
        store.len(),
        changed.len()
    );
    for id in changed {
        triggers.send(FlowTrigger::new(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, modified: u64) -> ItemRecord {
        let mut r = ItemRecord::new(id, "web");
        r.last_modified = modified;
        r
    }

    #[test]
    fn test_initial_load_triggers_nothing() {
        let mut store = ItemStore::default();
        let changed = apply_manifest(&mut store, vec![record("a", 1), record("b", 1)], true);
        assert!(changed.is_empty());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_reload_triggers_new_and_advanced() {
        let mut store = ItemStore::from_records(vec![record("a", 1), record("b", 5)]);
        let changed = apply_manifest(
            &mut store,
            vec![record("a", 2), record("b", 5), record("c", 0)],
            false,
        );
        assert_eq!(changed, vec!["a".to_string(), "c".to_string()]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_removed_items_leave_the_store() {
        let mut store = ItemStore::from_records(vec![record("a", 1), record("b", 1)]);
        let changed = apply_manifest(&mut store, vec![record("a", 1)], false);
        assert!(changed.is_empty());
        assert!(!store.contains("b"));
    }
}
