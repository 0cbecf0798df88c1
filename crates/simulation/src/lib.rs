use bevy::prelude::*;

pub mod activity;
pub mod city_params;
pub mod config;
pub mod flow;
pub mod interaction;
pub mod items;
pub mod layout;
pub mod simulation_sets;
pub mod zones;

#[cfg(test)]
pub mod test_harness;

use city_params::CityParams;

/// Headless core of the project city: item arena, layout, flow and
/// activity engines, and the drag interaction machine.
///
/// Insert a `CityParams` resource before adding the plugin to override
/// the defaults.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CityParams>();
        simulation_sets::configure_city_sets(app);

        app.add_plugins((
            layout::LayoutPlugin,
            flow::FlowPlugin,
            activity::ActivityPlugin,
            interaction::InteractionPlugin,
        ));
    }
}
