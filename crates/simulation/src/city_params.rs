//! Data-driven city parameters.
//!
//! Collects the layout, flow and activity tunables into a single
//! [`CityParams`] resource. Defaults come from [`crate::config`]; a JSON file
//! may override any subset of fields because every section is
//! `#[serde(default)]`.
//!
//! The debounce window and the activity idle timeout are independent knobs.
//! Neither is derived from the other.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::*;

// ---------------------------------------------------------------------------
// Layout parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    pub zone_size: f32,
    pub columns: usize,
    pub lane_count: u32,
    pub stage_span: f32,
    pub lane_span: f32,
    pub clearance: f32,
    pub padding: f32,
    pub min_footprint: f32,
    pub max_footprint: f32,
    pub size_factor: f32,
    pub spacing: f32,
    pub snap_unit: f32,
    pub story_height: f32,
    /// Stories for critical, high, medium and low priority, in that order.
    pub priority_stories: [u32; 4],
    pub camera_margin: f32,
    pub hub_height: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            zone_size: ZONE_SIZE,
            columns: GRID_COLUMNS,
            lane_count: LANE_COUNT,
            stage_span: STAGE_SPAN,
            lane_span: LANE_SPAN,
            clearance: ZONE_CLEARANCE,
            padding: ZONE_PADDING,
            min_footprint: MIN_FOOTPRINT,
            max_footprint: MAX_FOOTPRINT,
            size_factor: SIZE_FACTOR,
            spacing: ITEM_SPACING,
            snap_unit: SNAP_UNIT,
            story_height: STORY_HEIGHT,
            priority_stories: PRIORITY_STORIES,
            camera_margin: CAMERA_FIT_MARGIN,
            hub_height: HUB_HEIGHT,
        }
    }
}

impl LayoutParams {
    /// The four heights an item can have, tallest first.
    pub fn height_tiers(&self) -> [f32; 4] {
        self.priority_stories
            .map(|stories| stories as f32 * self.story_height)
    }
}

// ---------------------------------------------------------------------------
// Flow parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowParams {
    pub debounce_secs: f64,
    pub capacity: usize,
    pub transient_duration_secs: f32,
    pub ramp_fraction: f32,
    pub stream_fade_in_secs: f32,
    pub stream_fade_out_secs: f32,
    pub stream_steady_opacity: f32,
    pub pulse_speed: f32,
    pub bulk_threshold: usize,
}

impl Default for FlowParams {
    fn default() -> Self {
        Self {
            debounce_secs: DEBOUNCE_SECS,
            capacity: FLOW_CAPACITY,
            transient_duration_secs: TRANSIENT_DURATION_SECS,
            ramp_fraction: RAMP_FRACTION,
            stream_fade_in_secs: STREAM_FADE_IN_SECS,
            stream_fade_out_secs: STREAM_FADE_OUT_SECS,
            stream_steady_opacity: STREAM_STEADY_OPACITY,
            pulse_speed: PULSE_SPEED,
            bulk_threshold: BULK_UPDATE_THRESHOLD,
        }
    }
}

// ---------------------------------------------------------------------------
// Activity parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityParams {
    pub idle_timeout_ms: f64,
    pub poll_interval_secs: f32,
}

impl Default for ActivityParams {
    fn default() -> Self {
        Self {
            idle_timeout_ms: IDLE_TIMEOUT_MS,
            poll_interval_secs: ACTIVITY_POLL_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// CityParams resource
// ---------------------------------------------------------------------------

/// All runtime-tunable parameters, read once at startup.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityParams {
    pub layout: LayoutParams,
    pub flow: FlowParams,
    pub activity: ActivityParams,
}

impl CityParams {
    /// Parse parameters from JSON text, then sanitize them.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let params: CityParams = serde_json::from_str(text)?;
        Ok(params.sanitized())
    }

    /// Load parameters from `path`.
    ///
    /// A missing file yields the defaults. An unreadable or malformed file
    /// also yields the defaults, with a warning; startup never fails here.
    pub fn load_or_default(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No city config at {}, using defaults", path.display());
                return Self::default();
            }
            Err(e) => {
                warn!(
                    "Failed to read city config {}: {}; using defaults",
                    path.display(),
                    e
                );
                return Self::default();
            }
        };
        match Self::from_json(&text) {
            Ok(params) => {
                info!("Loaded city config from {}", path.display());
                params
            }
            Err(e) => {
                warn!(
                    "Malformed city config {}: {}; using defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Replace values that would break the engines with usable minimums.
    pub fn sanitized(mut self) -> Self {
        let layout_defaults = LayoutParams::default();
        let l = &mut self.layout;
        if l.columns == 0 {
            warn!("layout.columns must be at least 1; using 1");
            l.columns = 1;
        }
        if l.lane_count == 0 {
            warn!("layout.lane_count must be at least 1; using 1");
            l.lane_count = 1;
        }
        if !(l.min_footprint > 0.0) {
            warn!(
                "layout.min_footprint must be positive; using {}",
                layout_defaults.min_footprint
            );
            l.min_footprint = layout_defaults.min_footprint;
        }
        if !(l.max_footprint >= l.min_footprint) {
            warn!(
                "layout.max_footprint {} is below min_footprint {}; raising it",
                l.max_footprint, l.min_footprint
            );
            l.max_footprint = l.min_footprint;
        }
        if !(l.snap_unit > 0.0) {
            warn!("layout.snap_unit must be positive; using {}", SNAP_UNIT);
            l.snap_unit = SNAP_UNIT;
        }
        if !(l.story_height > 0.0) {
            warn!("layout.story_height must be positive; using {}", STORY_HEIGHT);
            l.story_height = STORY_HEIGHT;
        }
        for field in [
            &mut l.zone_size,
            &mut l.stage_span,
            &mut l.lane_span,
            &mut l.clearance,
            &mut l.padding,
            &mut l.size_factor,
            &mut l.spacing,
            &mut l.camera_margin,
        ] {
            if !(*field >= 0.0) {
                *field = 0.0;
            }
        }

        let f = &mut self.flow;
        if f.capacity == 0 {
            warn!("flow.capacity must be at least 1; using 1");
            f.capacity = 1;
        }
        if !(f.debounce_secs >= 0.0) {
            f.debounce_secs = 0.0;
        }
        if !(f.transient_duration_secs > 0.0) {
            warn!(
                "flow.transient_duration_secs must be positive; using {}",
                TRANSIENT_DURATION_SECS
            );
            f.transient_duration_secs = TRANSIENT_DURATION_SECS;
        }
        f.ramp_fraction = if f.ramp_fraction.is_finite() {
            f.ramp_fraction.clamp(0.0, 0.5)
        } else {
            RAMP_FRACTION
        };
        f.stream_steady_opacity = if f.stream_steady_opacity.is_finite() {
            f.stream_steady_opacity.clamp(0.0, 1.0)
        } else {
            STREAM_STEADY_OPACITY
        };
        for field in [
            &mut f.stream_fade_in_secs,
            &mut f.stream_fade_out_secs,
            &mut f.pulse_speed,
        ] {
            if !(*field >= 0.0) {
                *field = 0.0;
            }
        }
        if f.bulk_threshold == 0 {
            f.bulk_threshold = 1;
        }

        let a = &mut self.activity;
        if !(a.idle_timeout_ms >= 0.0) {
            warn!("activity.idle_timeout_ms must not be negative; using default");
            a.idle_timeout_ms = IDLE_TIMEOUT_MS;
        }
        if !(a.poll_interval_secs > 0.0) {
            warn!("activity.poll_interval_secs must be positive; using default");
            a.poll_interval_secs = ACTIVITY_POLL_SECS;
        }
        self
    }
}
