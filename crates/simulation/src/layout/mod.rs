mod engine;
mod overrides;
mod plugin;
pub mod types;

pub use engine::{footprint_for_scope, height_for_priority, SpatialLayoutEngine};
pub use overrides::{LayoutOverrides, PositionDelta};
pub use plugin::{rebuild_city_layout, CityLayout, LayoutPlugin, LayoutRebuilt};
pub use types::{LayoutResult, Zone, ZoneBounds};
