//! Per-frame ordering via `SystemSet` phases.
//!
//! Every city system runs in `Update` and belongs to exactly one phase:
//!
//! ```text
//! Ingest  →  Layout  →  Flow  →  Publish
//! ```
//!
//! * **Ingest** – Item store replacement, activity polling, interaction
//!   commands. Anything that turns outside input into state changes.
//! * **Layout** – Rebuilding `CityLayout` from the item store and overrides.
//! * **Flow** – Resolving triggers and stream commands against the fresh
//!   layout and advancing every live flow event.
//! * **Publish** – Read-only snapshots for the rendering adapter.
//!
//! Rendering systems run after `Publish` so they never observe a layout that
//! has not yet been paired with its flow snapshot.

use bevy::prelude::*;

/// Ordered phases for systems running in the `Update` schedule.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CitySet {
    Ingest,
    Layout,
    Flow,
    Publish,
}

pub(crate) fn configure_city_sets(app: &mut App) {
    app.configure_sets(
        Update,
        (
            CitySet::Ingest,
            CitySet::Layout,
            CitySet::Flow,
            CitySet::Publish,
        )
            .chain(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Systems record their phase into this log so ordering can be asserted.
    #[derive(Resource, Default)]
    struct PhaseLog(Vec<&'static str>);

    #[test]
    fn phases_run_in_declared_order() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        configure_city_sets(&mut app);
        app.init_resource::<PhaseLog>();
        // Registered in reverse to prove the set chain, not insertion order,
        // decides the sequence.
        app.add_systems(
            Update,
            (
                (|mut log: ResMut<PhaseLog>| log.0.push("publish")).in_set(CitySet::Publish),
                (|mut log: ResMut<PhaseLog>| log.0.push("flow")).in_set(CitySet::Flow),
                (|mut log: ResMut<PhaseLog>| log.0.push("layout")).in_set(CitySet::Layout),
                (|mut log: ResMut<PhaseLog>| log.0.push("ingest")).in_set(CitySet::Ingest),
            ),
        );
        app.update();
        assert_eq!(
            app.world().resource::<PhaseLog>().0,
            vec!["ingest", "layout", "flow", "publish"]
        );
    }
}
