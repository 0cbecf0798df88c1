//! Category → lane and stage → column mapping.
//!
//! The lane hash is a best-effort spreading function, not a perfect hash.
//! Two categories may share a lane; the layout engine keeps their zones
//! apart regardless, so lanes only decide coarse placement and district
//! color.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::city_params::LayoutParams;
use crate::items::Stage;

/// Rolling `hash * 31 + code_unit` over UTF-16 code units, wrapped to 32
/// bits, reduced modulo `lane_count`. Always in `0..lane_count`.
pub fn lane_for_category(category: &str, lane_count: u32) -> u32 {
    let lanes = lane_count.max(1) as i32;
    let mut hash: i32 = 0;
    for unit in category.encode_utf16() {
        hash = hash.wrapping_mul(31).wrapping_add(unit as i32);
    }
    // |hash % lanes| < lanes, so abs() cannot overflow here.
    (hash % lanes).unsigned_abs()
}

/// Nominal x offset of a stage column.
pub fn stage_offset(stage: Stage, stage_span: f32) -> f32 {
    stage.order() as f32 * stage_span
}

/// Nominal z offset of a lane.
pub fn lane_offset(lane: u32, lane_span: f32) -> f32 {
    lane as f32 * lane_span
}

/// Identity of a zone: every item sharing stage and category lives in it.
///
/// Ordered by stage first, then category, so iteration over a
/// `BTreeMap<ZoneKey, _>` walks the city column by column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoneKey {
    pub stage: Stage,
    pub category: String,
}

impl ZoneKey {
    pub fn new(stage: Stage, category: impl Into<String>) -> Self {
        Self {
            stage,
            category: category.into(),
        }
    }

    /// Stable textual key, `"<stage>/<category>"`. Used to key saved
    /// manual offsets across layout runs.
    pub fn as_string(&self) -> String {
        format!("{}/{}", self.stage.label(), self.category)
    }

    /// Inverse of [`ZoneKey::as_string`]. The category may itself contain
    /// `/`; only the first separator splits.
    pub fn parse(key: &str) -> Option<Self> {
        let (stage, category) = key.split_once('/')?;
        Some(Self::new(Stage::parse(stage)?, category))
    }
}

impl fmt::Display for ZoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.stage.label(), self.category)
    }
}

/// Lane and anchor computation bound to one set of layout parameters.
#[derive(Debug, Clone)]
pub struct ZoneAllocator {
    lane_count: u32,
    stage_span: f32,
    lane_span: f32,
}

impl ZoneAllocator {
    pub fn new(params: &LayoutParams) -> Self {
        Self {
            lane_count: params.lane_count.max(1),
            stage_span: params.stage_span,
            lane_span: params.lane_span,
        }
    }

    pub fn lane_count(&self) -> u32 {
        self.lane_count
    }

    pub fn lane(&self, category: &str) -> u32 {
        lane_for_category(category, self.lane_count)
    }

    pub fn stage_offset(&self, stage: Stage) -> f32 {
        stage_offset(stage, self.stage_span)
    }

    pub fn lane_offset(&self, lane: u32) -> f32 {
        lane_offset(lane, self.lane_span)
    }

    /// Nominal `(x, z)` anchor of a zone before collision displacement.
    pub fn nominal_anchor(&self, key: &ZoneKey) -> (f32, f32) {
        (
            self.stage_offset(key.stage),
            self.lane_offset(self.lane(&key.category)),
        )
    }
}
