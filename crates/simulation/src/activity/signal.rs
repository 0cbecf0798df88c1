use serde::{Deserialize, Serialize};

/// One reading of the external status channel.
///
/// `{ "active": true, "project": "...", "action": "...", "lastPing": 1700000000000 }`
/// with `lastPing` in milliseconds since the Unix epoch. Every field is
/// optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActivitySignal {
    pub active: bool,
    pub project: Option<String>,
    pub action: Option<String>,
    pub last_ping: f64,
}

impl ActivitySignal {
    pub fn new(project: impl Into<String>, last_ping: f64) -> Self {
        Self {
            active: true,
            project: Some(project.into()),
            action: None,
            last_ping,
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// The project id with surrounding whitespace removed, or `None` when
    /// blank.
    pub fn target(&self) -> Option<&str> {
        self.project
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    /// Active and pinged within `timeout_ms` of `now_ms`.
    pub fn is_live(&self, now_ms: f64, timeout_ms: f64) -> bool {
        self.active && self.last_ping.is_finite() && now_ms - self.last_ping <= timeout_ms
    }
}
