use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use bevy::prelude::*;

use super::signal::ActivitySignal;

/// Where activity signals come from. A channel that is absent, unreadable
/// or malformed reads as `None`, which the adapter treats as idle.
pub trait ActivityChannel: Send + Sync + 'static {
    fn read(&self) -> Option<ActivitySignal>;
}

/// JSON status file written by an external tool.
#[derive(Debug, Clone)]
pub struct FileActivityChannel {
    path: PathBuf,
}

impl FileActivityChannel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ActivityChannel for FileActivityChannel {
    fn read(&self) -> Option<ActivitySignal> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                debug!("Activity file {} unreadable: {}", self.path.display(), e);
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(signal) => Some(signal),
            Err(e) => {
                debug!("Activity file {} malformed: {}", self.path.display(), e);
                None
            }
        }
    }
}

/// In-memory channel; clones share one slot.
#[derive(Debug, Clone, Default)]
pub struct SharedActivityChannel {
    slot: Arc<Mutex<Option<ActivitySignal>>>,
}

impl SharedActivityChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, signal: Option<ActivitySignal>) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = signal;
        }
    }
}

impl ActivityChannel for SharedActivityChannel {
    fn read(&self) -> Option<ActivitySignal> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

/// The channel the activity plugin polls. Without one the adapter stays
/// idle.
#[derive(Resource)]
pub struct ActivitySource(pub Box<dyn ActivityChannel>);

impl ActivitySource {
    pub fn new(channel: impl ActivityChannel) -> Self {
        Self(Box::new(channel))
    }

    pub fn read(&self) -> Option<ActivitySignal> {
        self.0.read()
    }
}
