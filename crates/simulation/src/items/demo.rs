//! Seeded demo city used when no manifest is configured.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::types::{ItemRecord, ItemStatus, Priority, Stage};

pub const DEMO_CATEGORIES: &[&str] = &[
    "tooling",
    "web",
    "research",
    "infra",
    "games",
    "writing",
    "hardware",
];

const STATUSES: [ItemStatus; 4] = [
    ItemStatus::Active,
    ItemStatus::Blocked,
    ItemStatus::Paused,
    ItemStatus::Complete,
];

/// Generate `count` items deterministically from `seed`.
pub fn demo_items(seed: u64, count: usize) -> Vec<ItemRecord> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let category = DEMO_CATEGORIES.choose(&mut rng).copied().unwrap_or("misc");
            let stage = Stage::ALL[rng.gen_range(0..Stage::ALL.len())];
            let priority = Priority::ALL[rng.gen_range(0..Priority::ALL.len())];
            let status = if stage == Stage::Complete {
                ItemStatus::Complete
            } else {
                STATUSES[rng.gen_range(0..STATUSES.len() - 1)]
            };
            let mut record = ItemRecord::new(format!("demo-{i:03}"), category)
                .with_stage(stage)
                .with_priority(priority)
                .with_status(status)
                .with_scope(rng.gen_range(1.0..200.0))
                .with_last_modified(1_700_000_000_000 + rng.gen_range(0..30_000_000));
            record.title = format!("{} project {}", category, i);
            record
        })
        .collect()
}
