use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use unisearch_common::University;

/// Rows of one page together with when they were fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPage {
    pub rows: Vec<University>,
    pub fetched_at: DateTime<Utc>,
}

/// Page number → rows for the full listing.
///
/// A page, once inserted, is never replaced or mutated. `clear` starts a new
/// epoch; fetches begun in an earlier epoch must not be inserted.
#[derive(Debug, Default)]
pub struct PageCache {
    pages: BTreeMap<u32, CachedPage>,
    epoch: u64,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, page: u32) -> Option<&CachedPage> {
        self.pages.get(&page)
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains_key(&page)
    }

    /// Store `rows` under `page` unless it is already cached; returns the
    /// entry that is cached afterwards.
    pub fn insert(&mut self, page: u32, rows: Vec<University>) -> &CachedPage {
        self.pages.entry(page).or_insert_with(|| CachedPage {
            rows,
            fetched_at: Utc::now(),
        })
    }

    pub fn pages(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn clear(&mut self) {
        self.pages.clear();
        self.epoch += 1;
    }
}
