use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Workflow status of an item. Drives building color, not placement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemStatus {
    #[default]
    Active,
    Blocked,
    Paused,
    Complete,
}

impl ItemStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Blocked => "blocked",
            Self::Paused => "paused",
            Self::Complete => "complete",
        }
    }
}

/// Priority tier. Each tier maps to a fixed story count.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Priority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Critical,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    /// Index into per-tier tables (critical = 0 ... low = 3).
    pub fn tier_index(self) -> usize {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Coarse pipeline stage. Stages occupy separate columns along x, ordered
/// backlog < active < paused < complete.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Stage {
    Backlog,
    #[default]
    Active,
    Paused,
    Complete,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Backlog, Stage::Active, Stage::Paused, Stage::Complete];

    /// Position of the stage in the total order.
    pub fn order(self) -> usize {
        match self {
            Self::Backlog => 0,
            Self::Active => 1,
            Self::Paused => 2,
            Self::Complete => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Complete => "complete",
        }
    }
}

/// One tracked work item.
///
/// `position` (x, z on the ground plane) and `dimensions` (width, height,
/// depth) stay `None` until the layout engine fills them in.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    pub id: String,
    pub title: String,
    pub status: ItemStatus,
    pub priority: Priority,
    pub stage: Stage,
    pub category: String,
    /// Positive complexity proxy.
    pub scope: f32,
    /// Milliseconds since the Unix epoch.
    pub last_modified: u64,
    pub position: Option<Vec2>,
    pub dimensions: Option<Vec3>,
}

impl ItemRecord {
    /// A record with default enums, scope 1 and no layout data.
    pub fn new(id: impl Into<String>, category: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            status: ItemStatus::default(),
            priority: Priority::default(),
            stage: Stage::default(),
            category: category.into(),
            scope: 1.0,
            last_modified: 0,
            position: None,
            dimensions: None,
        }
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: ItemStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_scope(mut self, scope: f32) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_last_modified(mut self, last_modified: u64) -> Self {
        self.last_modified = last_modified;
        self
    }

    /// World-space center of the building at ground level, if laid out.
    pub fn ground_point(&self) -> Option<Vec3> {
        self.position.map(|p| Vec3::new(p.x, 0.0, p.y))
    }

    /// World-space point on the roof, where flow connectors land.
    pub fn roof_point(&self) -> Option<Vec3> {
        let p = self.position?;
        let height = self.dimensions.map(|d| d.y).unwrap_or(0.0);
        Some(Vec3::new(p.x, height, p.y))
    }
}
