//! Colors for buildings, zone plates and flow connectors.

use bevy::prelude::*;

use simulation::flow::{FlowIntensity, SystemState};
use simulation::items::ItemStatus;

/// Zone plate hues, one per lane. Lanes wrap if there are more than 10.
const LANE_HUES: [[f32; 3]; 10] = [
    [0.30, 0.55, 0.95],
    [0.95, 0.55, 0.20],
    [0.30, 0.80, 0.45],
    [0.85, 0.30, 0.40],
    [0.60, 0.40, 0.85],
    [0.20, 0.80, 0.75],
    [0.90, 0.80, 0.20],
    [0.70, 0.35, 0.20],
    [0.55, 0.75, 0.30],
    [0.80, 0.45, 0.70],
];

pub const HUB_COLOR: Color = Color::srgb(0.92, 0.92, 0.98);
pub const GROUND_COLOR: Color = Color::srgb(0.12, 0.13, 0.16);

pub fn status_color(status: ItemStatus) -> Color {
    match status {
        ItemStatus::Active => Color::srgb(0.35, 0.62, 0.95),
        ItemStatus::Blocked => Color::srgb(0.90, 0.32, 0.28),
        ItemStatus::Paused => Color::srgb(0.62, 0.62, 0.66),
        ItemStatus::Complete => Color::srgb(0.38, 0.78, 0.45),
    }
}

/// Muted lane color for a zone ground plate.
pub fn lane_color(lane: u32) -> Color {
    let [r, g, b] = LANE_HUES[lane as usize % LANE_HUES.len()];
    Color::srgba(r * 0.45, g * 0.45, b * 0.45, 0.85)
}

/// Global tint for flow connectors.
pub fn state_tint(state: SystemState) -> Color {
    match state {
        SystemState::Idle => Color::srgb(0.55, 0.60, 0.70),
        SystemState::Streaming => Color::srgb(0.30, 0.85, 1.00),
        SystemState::BulkUpdate => Color::srgb(1.00, 0.75, 0.25),
        SystemState::Error => Color::srgb(1.00, 0.20, 0.20),
    }
}

/// Connector color: the state tint, brightened for streams, with `opacity`
/// as alpha.
pub fn connector_color(state: SystemState, intensity: FlowIntensity, opacity: f32) -> Color {
    let base = state_tint(state).to_srgba();
    let boost = match intensity {
        FlowIntensity::Pulse => 1.0,
        FlowIntensity::Stream => 1.2,
    };
    Color::srgba(
        (base.red * boost).min(1.0),
        (base.green * boost).min(1.0),
        (base.blue * boost).min(1.0),
        opacity.clamp(0.0, 1.0),
    )
}
