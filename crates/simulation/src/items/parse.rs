//! Conversion from the metadata reader's loose record shape into
//! [`ItemRecord`]s.
//!
//! Unknown or missing enum strings never fail a record. They fall back to
//! active status, medium priority and active stage, and every fallback is
//! reported so the caller can log it.

use serde::{Deserialize, Serialize};

use super::types::{ItemRecord, ItemStatus, Priority, Stage};

/// Category used when a record carries none.
pub const DEFAULT_CATEGORY: &str = "uncategorized";

/// Record shape produced by the external metadata reader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawItemRecord {
    pub id: Option<String>,
    pub title: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub stage: Option<String>,
    pub category: Option<String>,
    pub scope: Option<f64>,
    pub last_modified: Option<f64>,
}

/// A field whose raw value could not be used as given.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFallback {
    pub field: &'static str,
    /// The raw value, or `None` when the field was missing.
    pub raw: Option<String>,
    /// Label of the value used instead.
    pub used: String,
}

/// A converted record plus the fallbacks applied to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedItem {
    pub record: ItemRecord,
    pub fallbacks: Vec<FieldFallback>,
}

fn normalize(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace(['_', ' '], "-")
}

impl ItemStatus {
    /// Strict-ish parse: case-insensitive with common aliases.
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize(raw).as_str() {
            "active" | "in-progress" | "wip" | "ongoing" => Some(Self::Active),
            "blocked" | "stuck" => Some(Self::Blocked),
            "paused" | "on-hold" | "hold" => Some(Self::Paused),
            "complete" | "completed" | "done" | "shipped" => Some(Self::Complete),
            _ => None,
        }
    }
}

impl Priority {
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize(raw).as_str() {
            "critical" | "urgent" | "p0" => Some(Self::Critical),
            "high" | "p1" => Some(Self::High),
            "medium" | "normal" | "p2" => Some(Self::Medium),
            "low" | "p3" => Some(Self::Low),
            _ => None,
        }
    }
}

impl Stage {
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize(raw).as_str() {
            "backlog" | "todo" | "planned" | "idea" => Some(Self::Backlog),
            "active" | "in-progress" | "wip" | "ongoing" => Some(Self::Active),
            "paused" | "on-hold" | "hold" | "blocked" => Some(Self::Paused),
            "complete" | "completed" | "done" | "shipped" => Some(Self::Complete),
            _ => None,
        }
    }
}

fn parse_field<T: Copy + Default>(
    field: &'static str,
    raw: Option<&str>,
    parse: fn(&str) -> Option<T>,
    label: fn(T) -> &'static str,
    fallbacks: &mut Vec<FieldFallback>,
) -> T {
    if let Some(value) = raw.and_then(parse) {
        return value;
    }
    let used = T::default();
    fallbacks.push(FieldFallback {
        field,
        raw: raw.map(str::to_string),
        used: label(used).to_string(),
    });
    used
}

impl ItemRecord {
    /// Convert a raw record. Returns `None` only when the record has
    /// neither an id nor a title to identify it by.
    pub fn from_raw(raw: &RawItemRecord) -> Option<ParsedItem> {
        let id = [raw.id.as_deref(), raw.title.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())?
            .to_string();

        let mut fallbacks = Vec::new();
        let status = parse_field(
            "status",
            raw.status.as_deref(),
            ItemStatus::parse,
            ItemStatus::label,
            &mut fallbacks,
        );
        let priority = parse_field(
            "priority",
            raw.priority.as_deref(),
            Priority::parse,
            Priority::label,
            &mut fallbacks,
        );
        let stage = parse_field(
            "stage",
            raw.stage.as_deref(),
            Stage::parse,
            Stage::label,
            &mut fallbacks,
        );

        let category = match raw.category.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            other => {
                fallbacks.push(FieldFallback {
                    field: "category",
                    raw: other.map(str::to_string),
                    used: DEFAULT_CATEGORY.to_string(),
                });
                DEFAULT_CATEGORY.to_string()
            }
        };

        let scope = match raw.scope {
            // Saturate rather than overflow to infinity in f32.
            Some(s) if s.is_finite() && s > 0.0 => {
                s.clamp(f64::from(f32::MIN_POSITIVE), f64::from(f32::MAX)) as f32
            }
            other => {
                fallbacks.push(FieldFallback {
                    field: "scope",
                    raw: other.map(|s| s.to_string()),
                    used: "1".to_string(),
                });
                1.0
            }
        };

        let last_modified = raw
            .last_modified
            .filter(|t| t.is_finite() && *t >= 0.0)
            .map(|t| t as u64)
            .unwrap_or(0);

        let title = raw
            .title
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(id.as_str())
            .to_string();

        Some(ParsedItem {
            record: ItemRecord {
                id,
                title,
                status,
                priority,
                stage,
                category,
                scope,
                last_modified,
                position: None,
                dimensions: None,
            },
            fallbacks,
        })
    }
}
