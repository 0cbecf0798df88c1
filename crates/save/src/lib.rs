pub mod atomic_write;
pub mod file_header;
pub mod overrides_file;
pub mod save_error;
mod save_plugin;

pub use overrides_file::{decode_overrides, encode_overrides, load_overrides, save_overrides};
pub use save_error::SaveError;
pub use save_plugin::{
    load_overrides_on_startup, save_dirty_overrides, OverridesPath, SaveOverridesEvent,
    SavePlugin, DEFAULT_OVERRIDES_FILE,
};
