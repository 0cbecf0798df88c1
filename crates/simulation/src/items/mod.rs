mod demo;
mod manifest;
mod parse;
mod store;
pub mod types;

pub use demo::{demo_items, DEMO_CATEGORIES};
pub use manifest::{load_manifest, parse_manifest, ManifestError};
pub use parse::{FieldFallback, ParsedItem, RawItemRecord, DEFAULT_CATEGORY};
pub use store::{records_from_raw, ItemStore};
pub use types::{ItemRecord, ItemStatus, Priority, Stage};
