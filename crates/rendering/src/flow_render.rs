//! Flow connectors drawn as gizmo arcs from the hub to their targets.
//!
//! Each live event is one arc whose alpha is the event's opacity, with a
//! dot travelling along it. The whole set is tinted by the system state.

use bevy::prelude::*;

use simulation::flow::{FlowEventView, FlowIntensity, FlowSnapshot};

use crate::palette::connector_color;

/// Segments per arc.
const ARC_SEGMENTS: usize = 24;
/// Arc apex height above the straight line, as a fraction of its length.
const ARC_LIFT: f32 = 0.2;
const PULSE_RADIUS: f32 = 0.35;
const STREAM_PULSE_RADIUS: f32 = 0.55;

/// Point at `t` in `[0, 1]` on the arc from `source` to `destination`.
pub fn arc_point(source: Vec3, destination: Vec3, t: f32) -> Vec3 {
    let t = t.clamp(0.0, 1.0);
    let lift = source.distance(destination) * ARC_LIFT;
    let control = source.lerp(destination, 0.5) + Vec3::Y * lift * 2.0;
    // Quadratic Bezier; the apex sits `lift` above the chord midpoint.
    let a = source.lerp(control, t);
    let b = control.lerp(destination, t);
    a.lerp(b, t)
}

fn arc_points(event: &FlowEventView) -> impl Iterator<Item = Vec3> + '_ {
    (0..=ARC_SEGMENTS)
        .map(move |i| arc_point(event.source, event.destination, i as f32 / ARC_SEGMENTS as f32))
}

pub fn draw_flow_connectors(snapshot: Res<FlowSnapshot>, mut gizmos: Gizmos) {
    for event in &snapshot.events {
        if event.opacity <= 0.0 {
            continue;
        }
        let color = connector_color(snapshot.state, event.intensity, event.opacity);
        gizmos.linestrip(arc_points(event), color);

        let radius = match event.intensity {
            FlowIntensity::Pulse => PULSE_RADIUS,
            FlowIntensity::Stream => STREAM_PULSE_RADIUS,
        };
        let dot = arc_point(event.source, event.destination, event.pulse);
        gizmos.sphere(Isometry3d::from_translation(dot), radius, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arc_endpoints() {
        let src = Vec3::new(0.0, 12.0, 0.0);
        let dst = Vec3::new(30.0, 4.0, 10.0);
        assert!(arc_point(src, dst, 0.0).distance(src) < 1e-5);
        assert!(arc_point(src, dst, 1.0).distance(dst) < 1e-5);
    }

    #[test]
    fn test_arc_rises_above_chord() {
        let src = Vec3::ZERO;
        let dst = Vec3::new(20.0, 0.0, 0.0);
        let mid = arc_point(src, dst, 0.5);
        assert!((mid.y - 20.0 * ARC_LIFT).abs() < 1e-4);
        assert!((mid.x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_arc_clamps_parameter() {
        let src = Vec3::ZERO;
        let dst = Vec3::X;
        assert_eq!(arc_point(src, dst, -1.0), arc_point(src, dst, 0.0));
        assert_eq!(arc_point(src, dst, 2.0), arc_point(src, dst, 1.0));
    }
}
