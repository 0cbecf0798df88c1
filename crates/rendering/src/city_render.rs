//! Meshes for the laid-out city: one cuboid per item, a ground plate per
//! zone and the hub marker flow connectors start from.
//!
//! Visuals are rebuilt from scratch whenever `CityLayout` changes. The
//! persistent stream's target swaps to an emissive material.

use std::collections::HashMap;

use bevy::prelude::*;

use simulation::flow::FlowSnapshot;
use simulation::items::{ItemRecord, ItemStatus};
use simulation::layout::{CityLayout, Zone};
use simulation::zones::ZoneKey;

use crate::palette::{lane_color, status_color, HUB_COLOR};

/// Thickness of a zone ground plate.
const PLATE_THICKNESS: f32 = 0.1;
const HUB_RADIUS: f32 = 1.2;

/// Marker for an item's building mesh.
#[derive(Component, Debug, Clone)]
pub struct BuildingVisual {
    pub id: String,
    pub status: ItemStatus,
}

#[derive(Component, Debug, Clone)]
pub struct ZonePlate {
    pub key: ZoneKey,
}

#[derive(Component)]
pub struct HubMarker;

/// Shared meshes and materials for city visuals.
#[derive(Resource)]
pub struct CityAssets {
    pub unit_cube: Handle<Mesh>,
    pub hub_mesh: Handle<Mesh>,
    pub status_materials: HashMap<ItemStatus, Handle<StandardMaterial>>,
    /// Lane index → plate material, created on demand.
    pub lane_materials: HashMap<u32, Handle<StandardMaterial>>,
    pub glow_material: Handle<StandardMaterial>,
    pub hub_material: Handle<StandardMaterial>,
}

impl CityAssets {
    fn status_material(&self, status: ItemStatus) -> Handle<StandardMaterial> {
        self.status_materials
            .get(&status)
            .cloned()
            .unwrap_or_default()
    }
}

pub fn setup_city_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let status_materials = [
        ItemStatus::Active,
        ItemStatus::Blocked,
        ItemStatus::Paused,
        ItemStatus::Complete,
    ]
    .into_iter()
    .map(|status| {
        let handle = materials.add(StandardMaterial {
            base_color: status_color(status),
            perceptual_roughness: 0.8,
            ..default()
        });
        (status, handle)
    })
    .collect();

    let glow = Color::srgb(0.45, 0.9, 1.0);
    commands.insert_resource(CityAssets {
        unit_cube: meshes.add(Cuboid::new(1.0, 1.0, 1.0)),
        hub_mesh: meshes.add(Sphere::new(HUB_RADIUS)),
        status_materials,
        lane_materials: HashMap::new(),
        glow_material: materials.add(StandardMaterial {
            base_color: glow,
            emissive: glow.to_linear() * 2.0,
            ..default()
        }),
        hub_material: materials.add(StandardMaterial {
            base_color: HUB_COLOR,
            emissive: HUB_COLOR.to_linear(),
            unlit: true,
            ..default()
        }),
    });
}

/// Cuboid transform for a laid-out item, resting on the ground.
pub fn building_transform(item: &ItemRecord) -> Option<Transform> {
    let p = item.position?;
    let d = item.dimensions?;
    Some(Transform::from_xyz(p.x, d.y * 0.5, p.y).with_scale(d))
}

pub fn plate_transform(zone: &Zone) -> Transform {
    let c = zone.bounds.center();
    Transform::from_xyz(c.x, PLATE_THICKNESS * 0.5, c.y).with_scale(Vec3::new(
        zone.bounds.width,
        PLATE_THICKNESS,
        zone.bounds.depth,
    ))
}

pub fn sync_city_visuals(
    mut commands: Commands,
    layout: Res<CityLayout>,
    snapshot: Res<FlowSnapshot>,
    mut assets: ResMut<CityAssets>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    existing: Query<Entity, Or<(With<BuildingVisual>, With<ZonePlate>, With<HubMarker>)>>,
) {
    if !layout.is_changed() {
        return;
    }
    for entity in &existing {
        commands.entity(entity).despawn();
    }

    let result = layout.result();
    for zone in result.zones.values() {
        let material = assets
            .lane_materials
            .entry(zone.lane)
            .or_insert_with(|| {
                materials.add(StandardMaterial {
                    base_color: lane_color(zone.lane),
                    alpha_mode: AlphaMode::Blend,
                    perceptual_roughness: 1.0,
                    ..default()
                })
            })
            .clone();
        commands.spawn((
            ZonePlate {
                key: zone.key.clone(),
            },
            Mesh3d(assets.unit_cube.clone()),
            MeshMaterial3d(material),
            plate_transform(zone),
        ));
    }

    let target = snapshot.stream_target.as_deref();
    for item in &result.items {
        let Some(transform) = building_transform(item) else {
            continue;
        };
        let material = if target == Some(item.id.as_str()) {
            assets.glow_material.clone()
        } else {
            assets.status_material(item.status)
        };
        commands.spawn((
            BuildingVisual {
                id: item.id.clone(),
                status: item.status,
            },
            Mesh3d(assets.unit_cube.clone()),
            MeshMaterial3d(material),
            transform,
        ));
    }

    if !result.is_empty() {
        commands.spawn((
            HubMarker,
            Mesh3d(assets.hub_mesh.clone()),
            MeshMaterial3d(assets.hub_material.clone()),
            Transform::from_translation(result.hub_position()),
        ));
    }
}

/// Swap the glow material onto the persistent stream's target building.
pub fn highlight_stream_target(
    snapshot: Res<FlowSnapshot>,
    assets: Res<CityAssets>,
    mut buildings: Query<(&BuildingVisual, &mut MeshMaterial3d<StandardMaterial>)>,
) {
    if !snapshot.is_changed() {
        return;
    }
    let target = snapshot.stream_target.as_deref();
    for (visual, mut material) in &mut buildings {
        let wanted = if target == Some(visual.id.as_str()) {
            assets.glow_material.clone()
        } else {
            assets.status_material(visual.status)
        };
        if material.0 != wanted {
            material.0 = wanted;
        }
    }
}
