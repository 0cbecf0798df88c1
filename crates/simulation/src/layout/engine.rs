use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::city_params::LayoutParams;
use crate::items::{ItemRecord, Priority, Stage};
use crate::zones::{ZoneAllocator, ZoneKey};

use super::types::{LayoutResult, Zone, ZoneBounds};

/// Footprint side for an item of the given scope.
///
/// `sqrt(scope) * size_factor`, clamped to `[min_footprint, max_footprint]`.
/// Non-finite or non-positive scope yields the minimum.
pub fn footprint_for_scope(scope: f32, params: &LayoutParams) -> f32 {
    let raw = if scope.is_finite() && scope > 0.0 {
        scope.sqrt() * params.size_factor
    } else {
        0.0
    };
    raw.clamp(params.min_footprint, params.max_footprint.max(params.min_footprint))
}

/// Quantized building height: story count for the tier times story height.
pub fn height_for_priority(priority: Priority, params: &LayoutParams) -> f32 {
    params.height_tiers()[priority.tier_index()]
}

fn snap_up(value: f32, unit: f32) -> f32 {
    if unit > 0.0 {
        (value / unit).ceil() * unit
    } else {
        value
    }
}

/// Total order used to place a zone's members. Ids are unique in the item
/// store, but the remaining fields keep placement independent of input
/// order even if a caller passes duplicates.
fn placement_order(a: &ItemRecord, b: &ItemRecord) -> std::cmp::Ordering {
    a.id.cmp(&b.id)
        .then_with(|| a.title.cmp(&b.title))
        .then_with(|| a.scope.total_cmp(&b.scope))
        .then_with(|| a.last_modified.cmp(&b.last_modified))
        .then_with(|| a.priority.cmp(&b.priority))
}

/// A zone whose size is known but whose anchor is not yet decided.
struct ZonePlan<'a> {
    key: ZoneKey,
    lane: u32,
    members: Vec<&'a ItemRecord>,
    pitch: f32,
    width: f32,
    depth: f32,
}

/// Converts an unordered item collection into zones and positioned,
/// sized buildings.
///
/// Guarantees, for any input:
/// - zones padded by half the clearance on each side never overlap, even
///   when two categories hash into the same lane;
/// - items in one zone, grown by half the spacing, never overlap;
/// - output is a pure function of the item set, not of its order.
#[derive(Debug, Clone, Default)]
pub struct SpatialLayoutEngine {
    params: LayoutParams,
}

impl SpatialLayoutEngine {
    pub fn new(params: LayoutParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    pub fn layout(&self, items: &[ItemRecord]) -> LayoutResult {
        let p = &self.params;
        let allocator = ZoneAllocator::new(p);

        let mut groups: BTreeMap<ZoneKey, Vec<&ItemRecord>> = BTreeMap::new();
        for item in items {
            groups
                .entry(ZoneKey::new(item.stage, item.category.clone()))
                .or_default()
                .push(item);
        }

        let mut plans: Vec<ZonePlan> = groups
            .into_iter()
            .map(|(key, members)| self.plan_zone(&allocator, key, members))
            .collect();
        // Within a column zones are stacked by lane; category breaks ties
        // between colliding lanes.
        plans.sort_by(|a, b| {
            a.key
                .stage
                .cmp(&b.key.stage)
                .then(a.lane.cmp(&b.lane))
                .then_with(|| a.key.category.cmp(&b.key.category))
        });

        let mut zones = BTreeMap::new();
        let mut placed = Vec::with_capacity(items.len());
        let mut previous_column_end: Option<f32> = None;

        for stage in Stage::ALL {
            let column: Vec<&ZonePlan> = plans.iter().filter(|z| z.key.stage == stage).collect();
            if column.is_empty() {
                continue;
            }

            let mut x = allocator.stage_offset(stage);
            if let Some(end) = previous_column_end {
                x = x.max(end + p.clearance);
            }

            let mut previous_zone_end: Option<f32> = None;
            let mut column_width: f32 = 0.0;
            for plan in column {
                let mut z = allocator.lane_offset(plan.lane);
                if let Some(end) = previous_zone_end {
                    z = z.max(end + p.clearance);
                }
                let bounds = ZoneBounds::new(x, z, plan.width, plan.depth);
                previous_zone_end = Some(bounds.max_z());
                column_width = column_width.max(plan.width);

                placed.extend(self.place_members(plan, &bounds));
                zones.insert(
                    plan.key.clone(),
                    Zone {
                        key: plan.key.clone(),
                        lane: plan.lane,
                        bounds,
                        members: plan.members.iter().map(|m| m.id.clone()).collect(),
                    },
                );
            }
            previous_column_end = Some(x + column_width);
        }

        LayoutResult::new(placed, zones, p.hub_height)
    }

    fn plan_zone<'a>(
        &self,
        allocator: &ZoneAllocator,
        key: ZoneKey,
        mut members: Vec<&'a ItemRecord>,
    ) -> ZonePlan<'a> {
        let p = &self.params;
        members.sort_by(|a, b| placement_order(a, b));

        let largest = members
            .iter()
            .map(|m| footprint_for_scope(m.scope, p))
            .fold(p.min_footprint, f32::max);
        let pitch = snap_up(largest + p.spacing, p.snap_unit);
        let columns = p.columns.max(1);
        let rows = members.len().div_ceil(columns);

        let width = p.zone_size.max(p.padding * 2.0 + columns as f32 * pitch);
        let depth = p.zone_size.max(p.padding * 2.0 + rows as f32 * pitch);

        ZonePlan {
            lane: allocator.lane(&key.category),
            key,
            members,
            pitch,
            width,
            depth,
        }
    }

    fn place_members(&self, plan: &ZonePlan, bounds: &ZoneBounds) -> Vec<ItemRecord> {
        let p = &self.params;
        let columns = p.columns.max(1);
        plan.members
            .iter()
            .enumerate()
            .map(|(i, member)| {
                let col = (i % columns) as f32;
                let row = (i / columns) as f32;
                let center = Vec2::new(
                    bounds.x + p.padding + col * plan.pitch + plan.pitch * 0.5,
                    bounds.z + p.padding + row * plan.pitch + plan.pitch * 0.5,
                );
                let footprint = footprint_for_scope(member.scope, p);
                let mut record = (*member).clone();
                record.position = Some(center);
                record.dimensions = Some(Vec3::new(
                    footprint,
                    height_for_priority(member.priority, p),
                    footprint,
                ));
                record
            })
            .collect()
    }
}
