//! User-adjusted positions layered over a computed layout.
//!
//! Overrides are applied to a fresh copy of the engine's output, never to an
//! already-adjusted layout, so reapplying them is idempotent. Every zone an
//! override touches has its bounds refit to enclose its members afterward.
//! Manual moves can make zones overlap; that is the user's call and the
//! no-overlap guarantee covers computed layouts only.

use std::collections::{BTreeMap, BTreeSet};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::zones::ZoneKey;

use super::types::{footprint_of, LayoutResult};

/// A discrete move produced by the interaction state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionDelta {
    /// Shift a whole zone (and its members) by `delta` on the ground plane.
    Zone { key: ZoneKey, delta: Vec2 },
    /// Shift one item by `delta`.
    Item { id: String, delta: Vec2 },
}

/// Saved manual adjustments, keyed by stable identities so they survive a
/// full re-parse of the item metadata.
#[derive(
    Resource,
    Debug,
    Clone,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
pub struct LayoutOverrides {
    /// Zone key string (`"<stage>/<category>"`) → (dx, dz).
    pub zone_offsets: BTreeMap<String, [f32; 2]>,
    /// Item id → (dx, dz) relative to the computed position.
    pub item_offsets: BTreeMap<String, [f32; 2]>,
}

impl LayoutOverrides {
    pub fn is_empty(&self) -> bool {
        self.zone_offsets.is_empty() && self.item_offsets.is_empty()
    }

    pub fn clear(&mut self) {
        self.zone_offsets.clear();
        self.item_offsets.clear();
    }

    pub fn zone_offset(&self, key: &ZoneKey) -> Vec2 {
        self.zone_offsets
            .get(&key.as_string())
            .map(|o| Vec2::from_array(*o))
            .unwrap_or(Vec2::ZERO)
    }

    pub fn item_offset(&self, id: &str) -> Vec2 {
        self.item_offsets
            .get(id)
            .map(|o| Vec2::from_array(*o))
            .unwrap_or(Vec2::ZERO)
    }

    /// Accumulate a move into the stored offsets.
    pub fn apply_delta(&mut self, delta: &PositionDelta) {
        match delta {
            PositionDelta::Zone { key, delta } => {
                let total = self.zone_offset(key) + *delta;
                self.zone_offsets.insert(key.as_string(), total.to_array());
            }
            PositionDelta::Item { id, delta } => {
                let total = self.item_offset(id) + *delta;
                self.item_offsets.insert(id.clone(), total.to_array());
            }
        }
    }

    /// Drop offsets whose zone or item no longer exists in `layout`.
    /// Returns how many were removed.
    pub fn prune(&mut self, layout: &LayoutResult) -> usize {
        let before = self.zone_offsets.len() + self.item_offsets.len();
        self.zone_offsets.retain(|key, _| {
            ZoneKey::parse(key).is_some_and(|k| layout.zones.contains_key(&k))
        });
        self.item_offsets.retain(|id, _| layout.item(id).is_some());
        before - (self.zone_offsets.len() + self.item_offsets.len())
    }
}

impl LayoutResult {
    /// Copy of this layout with `overrides` applied. Unknown keys are
    /// ignored.
    pub fn with_overrides(&self, overrides: &LayoutOverrides) -> LayoutResult {
        let mut out = self.clone();
        if overrides.is_empty() {
            return out;
        }
        let mut touched: BTreeSet<ZoneKey> = BTreeSet::new();

        for (key_str, offset) in &overrides.zone_offsets {
            let Some(key) = ZoneKey::parse(key_str) else {
                continue;
            };
            let delta = Vec2::from_array(*offset);
            let Some(zone) = out.zones.get_mut(&key) else {
                continue;
            };
            zone.bounds = zone.bounds.translated(delta);
            let members = zone.members.clone();
            for id in &members {
                if let Some(item) = out.item_mut(id) {
                    item.position = item.position.map(|p| p + delta);
                }
            }
            touched.insert(key);
        }

        for (id, offset) in &overrides.item_offsets {
            let delta = Vec2::from_array(*offset);
            let Some(item) = out.item_mut(id) else {
                continue;
            };
            item.position = item.position.map(|p| p + delta);
            touched.insert(ZoneKey::new(item.stage, item.category.clone()));
        }

        for key in touched {
            out.refit_zone(&key);
        }
        out
    }

    /// Grow a zone's bounds so they enclose every member footprint.
    pub(crate) fn refit_zone(&mut self, key: &ZoneKey) {
        let Some(zone) = self.zones.get(key) else {
            return;
        };
        let mut bounds = zone.bounds;
        for id in &zone.members {
            if let Some(fp) = self.item(id).and_then(footprint_of) {
                bounds = bounds.union(&fp);
            }
        }
        if let Some(zone) = self.zones.get_mut(key) {
            zone.bounds = bounds;
        }
    }
}
