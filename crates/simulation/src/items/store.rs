use std::collections::BTreeMap;

use bevy::prelude::*;

use super::parse::RawItemRecord;
use super::types::ItemRecord;

/// Arena of item records keyed by stable id.
///
/// The layout and flow engines refer to items only by id; nothing outside
/// this store holds a live handle to a record. Every full re-parse of the
/// source metadata replaces the whole arena.
#[derive(Resource, Debug, Default, Clone)]
pub struct ItemStore {
    items: BTreeMap<String, ItemRecord>,
    /// Bumped on every replacement so observers can tell rebuilds apart.
    generation: u64,
}

impl ItemStore {
    pub fn from_records(records: impl IntoIterator<Item = ItemRecord>) -> Self {
        let mut store = Self::default();
        store.replace_all(records);
        store
    }

    /// Replace every record. On duplicate ids the later record wins.
    /// Returns the number of duplicates dropped.
    pub fn replace_all(&mut self, records: impl IntoIterator<Item = ItemRecord>) -> usize {
        let mut items = BTreeMap::new();
        let mut duplicates = 0;
        for record in records {
            if let Some(previous) = items.insert(record.id.clone(), record) {
                duplicates += 1;
                warn!("Duplicate item id '{}'; keeping the later record", previous.id);
            }
        }
        self.items = items;
        self.generation = self.generation.wrapping_add(1);
        duplicates
    }

    /// Convert raw records (logging each fallback) and replace the arena.
    /// Records without any identity are skipped. Returns the number kept.
    pub fn replace_from_raw(&mut self, raws: &[RawItemRecord]) -> usize {
        self.replace_all(records_from_raw(raws));
        self.items.len()
    }

    /// Ids in `incoming` that are new to the store or whose
    /// `last_modified` advanced, in id order.
    pub fn changed_ids(&self, incoming: &[ItemRecord]) -> Vec<String> {
        let mut changed: Vec<String> = incoming
            .iter()
            .filter(|record| {
                self.items
                    .get(&record.id)
                    .is_none_or(|old| record.last_modified > old.last_modified)
            })
            .map(|record| record.id.clone())
            .collect();
        changed.sort();
        changed.dedup();
        changed
    }

    pub fn get(&self, id: &str) -> Option<&ItemRecord> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    /// Records in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ItemRecord> {
        self.items.values()
    }

    pub fn records(&self) -> Vec<ItemRecord> {
        self.items.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Convert raw records, logging every fallback. Records without any
/// identity are skipped.
pub fn records_from_raw(raws: &[RawItemRecord]) -> Vec<ItemRecord> {
    let mut records = Vec::with_capacity(raws.len());
    for raw in raws {
        let Some(parsed) = ItemRecord::from_raw(raw) else {
            warn!("Skipping item record with neither id nor title");
            continue;
        };
        for fallback in &parsed.fallbacks {
            warn!(
                "Item '{}': {} {:?} not recognized, using '{}'",
                parsed.record.id, fallback.field, fallback.raw, fallback.used
            );
        }
        records.push(parsed.record);
    }
    records
}
