use std::collections::{BTreeMap, HashMap};

use bevy::prelude::*;

use crate::items::ItemRecord;
use crate::zones::ZoneKey;

/// Tolerance for edge comparisons; touching rectangles do not intersect.
const EDGE_EPSILON: f32 = 1e-4;

/// Axis-aligned rectangle on the ground plane. `(x, z)` is the minimum
/// corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ZoneBounds {
    pub x: f32,
    pub z: f32,
    pub width: f32,
    pub depth: f32,
}

impl ZoneBounds {
    pub fn new(x: f32, z: f32, width: f32, depth: f32) -> Self {
        Self { x, z, width, depth }
    }

    /// Rectangle of the given size centered on `center`.
    pub fn centered(center: Vec2, width: f32, depth: f32) -> Self {
        Self::new(
            center.x - width * 0.5,
            center.y - depth * 0.5,
            width,
            depth,
        )
    }

    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    pub fn max_z(&self) -> f32 {
        self.z + self.depth
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.z + self.depth * 0.5)
    }

    /// Grow by `margin` on every side.
    pub fn padded(&self, margin: f32) -> Self {
        Self::new(
            self.x - margin,
            self.z - margin,
            self.width + margin * 2.0,
            self.depth + margin * 2.0,
        )
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        Self::new(self.x + delta.x, self.z + delta.y, self.width, self.depth)
    }

    /// True when the interiors overlap. Shared edges do not count.
    pub fn intersects(&self, other: &ZoneBounds) -> bool {
        self.x < other.max_x() - EDGE_EPSILON
            && other.x < self.max_x() - EDGE_EPSILON
            && self.z < other.max_z() - EDGE_EPSILON
            && other.z < self.max_z() - EDGE_EPSILON
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.x - EDGE_EPSILON
            && p.x <= self.max_x() + EDGE_EPSILON
            && p.y >= self.z - EDGE_EPSILON
            && p.y <= self.max_z() + EDGE_EPSILON
    }

    pub fn contains(&self, other: &ZoneBounds) -> bool {
        other.x >= self.x - EDGE_EPSILON
            && other.z >= self.z - EDGE_EPSILON
            && other.max_x() <= self.max_x() + EDGE_EPSILON
            && other.max_z() <= self.max_z() + EDGE_EPSILON
    }

    pub fn union(&self, other: &ZoneBounds) -> Self {
        let x = self.x.min(other.x);
        let z = self.z.min(other.z);
        Self::new(
            x,
            z,
            self.max_x().max(other.max_x()) - x,
            self.max_z().max(other.max_z()) - z,
        )
    }
}

/// The rectangle owned by one (stage, category) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub key: ZoneKey,
    /// Coarse lane the category hashed into; used for district coloring.
    pub lane: u32,
    pub bounds: ZoneBounds,
    /// Member ids in placement (row-major) order.
    pub members: Vec<String>,
}

/// Output of one layout run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutResult {
    /// Every input item with `position` and `dimensions` filled in, in
    /// zone order then placement order.
    pub items: Vec<ItemRecord>,
    pub zones: BTreeMap<ZoneKey, Zone>,
    /// Id → index into `items`.
    pub(crate) index: HashMap<String, usize>,
    pub(crate) hub_height: f32,
}

impl LayoutResult {
    pub(crate) fn new(
        items: Vec<ItemRecord>,
        zones: BTreeMap<ZoneKey, Zone>,
        hub_height: f32,
    ) -> Self {
        let index = items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.id.clone(), i))
            .collect();
        Self {
            items,
            zones,
            index,
            hub_height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, id: &str) -> Option<&ItemRecord> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    pub(crate) fn item_mut(&mut self, id: &str) -> Option<&mut ItemRecord> {
        let i = *self.index.get(id)?;
        self.items.get_mut(i)
    }

    pub fn zone_of(&self, id: &str) -> Option<&Zone> {
        let item = self.item(id)?;
        self.zones
            .get(&ZoneKey::new(item.stage, item.category.clone()))
    }

    /// Ground footprint of a laid-out item.
    pub fn item_footprint(&self, id: &str) -> Option<ZoneBounds> {
        footprint_of(self.item(id)?)
    }

    /// Bounds enclosing every zone and item, grown by `margin`. `None` for
    /// an empty layout. This is what the camera fits to.
    pub fn bounds(&self, margin: f32) -> Option<ZoneBounds> {
        let zones = self.zones.values().map(|z| z.bounds);
        let items = self.items.iter().filter_map(footprint_of);
        zones
            .chain(items)
            .reduce(|a, b| a.union(&b))
            .map(|b| b.padded(margin))
    }

    /// Point every flow connector starts from: above the center of the
    /// city.
    pub fn hub_position(&self) -> Vec3 {
        match self.bounds(0.0) {
            Some(b) => {
                let c = b.center();
                Vec3::new(c.x, self.hub_height, c.y)
            }
            None => Vec3::new(0.0, self.hub_height, 0.0),
        }
    }

    /// Zone whose bounds contain `point`, if any.
    pub fn zone_at(&self, point: Vec2) -> Option<&Zone> {
        self.zones.values().find(|z| z.bounds.contains_point(point))
    }

    /// Item whose footprint contains `point`, if any.
    pub fn item_at(&self, point: Vec2) -> Option<&ItemRecord> {
        self.items
            .iter()
            .find(|item| footprint_of(item).is_some_and(|f| f.contains_point(point)))
    }
}

pub(crate) fn footprint_of(item: &ItemRecord) -> Option<ZoneBounds> {
    let p = item.position?;
    let d = item.dimensions?;
    Some(ZoneBounds::centered(p, d.x, d.z))
}
