// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Nominal side length of a zone in world units. Zones grow past this only
/// when their members do not fit.
pub const ZONE_SIZE: f32 = 20.0;
/// Columns in the per-zone item grid (row-major placement).
pub const GRID_COLUMNS: usize = 5;
/// Number of coarse lanes a category can hash into.
pub const LANE_COUNT: u32 = 10;
/// Distance between neighbouring stage columns along x.
pub const STAGE_SPAN: f32 = 40.0;
/// Distance between neighbouring lanes along z.
pub const LANE_SPAN: f32 = 30.0;
/// Empty border required between any two zones.
pub const ZONE_CLEARANCE: f32 = 4.0;
/// Inset between a zone's edge and its outermost grid cell.
pub const ZONE_PADDING: f32 = 1.0;
/// Smallest footprint (width = depth) an item may have; keeps every
/// building large enough to click.
pub const MIN_FOOTPRINT: f32 = 2.0;
/// Largest footprint an item may have.
pub const MAX_FOOTPRINT: f32 = 8.0;
/// Multiplier applied to `sqrt(scope)` to obtain the footprint.
pub const SIZE_FACTOR: f32 = 0.5;
/// Gap added between neighbouring grid cells inside a zone.
pub const ITEM_SPACING: f32 = 1.5;
/// Grid cell pitch is rounded up to a multiple of this.
pub const SNAP_UNIT: f32 = 0.5;
/// Height of one building story.
pub const STORY_HEIGHT: f32 = 2.0;
/// Stories per priority tier: critical, high, medium, low.
pub const PRIORITY_STORIES: [u32; 4] = [4, 3, 2, 1];
/// Margin added around the city when fitting the camera.
pub const CAMERA_FIT_MARGIN: f32 = 10.0;
/// Height of the hub that flow connectors start from.
pub const HUB_HEIGHT: f32 = 12.0;

// ---------------------------------------------------------------------------
// Flow
// ---------------------------------------------------------------------------

/// Seconds during which repeated triggers for one target are ignored.
pub const DEBOUNCE_SECS: f64 = 0.5;
/// Maximum number of live transient flow events.
pub const FLOW_CAPACITY: usize = 20;
/// Lifetime of a transient flow event in seconds.
pub const TRANSIENT_DURATION_SECS: f32 = 2.4;
/// Fraction of a transient lifetime spent ramping in (and again ramping out).
pub const RAMP_FRACTION: f32 = 0.2;
/// Ramp-in time of a persistent stream.
pub const STREAM_FADE_IN_SECS: f32 = 0.6;
/// Fade-out time of a persistent stream after it is stopped.
pub const STREAM_FADE_OUT_SECS: f32 = 0.8;
/// Opacity a persistent stream holds while active.
pub const STREAM_STEADY_OPACITY: f32 = 0.85;
/// Pulse cycles per second along a connector.
pub const PULSE_SPEED: f32 = 0.75;
/// Live transient count at which the city is considered in bulk update.
pub const BULK_UPDATE_THRESHOLD: usize = 5;

// ---------------------------------------------------------------------------
// Activity
// ---------------------------------------------------------------------------

/// Milliseconds since the last ping after which activity is considered idle.
pub const IDLE_TIMEOUT_MS: f64 = 10_000.0;
/// Seconds between polls of the activity status channel.
pub const ACTIVITY_POLL_SECS: f32 = 1.0;
