pub mod allocator;


pub use allocator::{lane_for_category, lane_offset, stage_offset, ZoneAllocator, ZoneKey};
