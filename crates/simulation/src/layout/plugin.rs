use bevy::prelude::*;

use crate::city_params::CityParams;
use crate::items::ItemStore;
use crate::simulation_sets::CitySet;

use super::engine::SpatialLayoutEngine;
use super::overrides::LayoutOverrides;
use super::types::LayoutResult;

/// The layout the rest of the app reads: the engine's output with saved
/// overrides applied.
#[derive(Resource, Debug, Default)]
pub struct CityLayout {
    /// Engine output, untouched by overrides.
    base: LayoutResult,
    current: LayoutResult,
    /// Incremented on every rebuild.
    revision: u64,
}

impl CityLayout {
    pub fn result(&self) -> &LayoutResult {
        &self.current
    }

    pub fn base(&self) -> &LayoutResult {
        &self.base
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn set_base(&mut self, base: LayoutResult, overrides: &LayoutOverrides) {
        self.base = base;
        self.reapply(overrides);
    }

    pub(crate) fn reapply(&mut self, overrides: &LayoutOverrides) {
        self.current = self.base.with_overrides(overrides);
        self.revision = self.revision.wrapping_add(1);
    }
}

/// Fired after `CityLayout` changes.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct LayoutRebuilt {
    pub items: usize,
    pub zones: usize,
    /// False when only overrides changed.
    pub full: bool,
}

/// Recompute the layout when the item store changes, or just reapply
/// overrides when only they changed.
pub fn rebuild_city_layout(
    store: Res<ItemStore>,
    overrides: Res<LayoutOverrides>,
    params: Res<CityParams>,
    mut layout: ResMut<CityLayout>,
    mut rebuilt: EventWriter<LayoutRebuilt>,
) {
    let full = store.is_changed() || params.is_changed();
    if !full && !overrides.is_changed() {
        return;
    }

    if full {
        let engine = SpatialLayoutEngine::new(params.layout.clone());
        let result = engine.layout(&store.records());
        info!(
            "Layout rebuilt: {} items in {} zones",
            result.items.len(),
            result.zones.len()
        );
        layout.set_base(result, &overrides);
    } else {
        layout.reapply(&overrides);
    }

    rebuilt.send(LayoutRebuilt {
        items: layout.result().items.len(),
        zones: layout.result().zones.len(),
        full,
    });
}

pub struct LayoutPlugin;

impl Plugin for LayoutPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ItemStore>()
            .init_resource::<LayoutOverrides>()
            .init_resource::<CityLayout>()
            .add_event::<LayoutRebuilt>()
            .add_systems(Update, rebuild_city_layout.in_set(CitySet::Layout));
    }
}
