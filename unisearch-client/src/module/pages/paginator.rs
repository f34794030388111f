use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info};
use unisearch_common::University;

use super::cache::PageCache;
use crate::api::DirectoryApi;
use crate::error::Result;
use crate::module::csv::decode_universities;

pub const FIRST_PAGE: u32 = 1;

/// Page cursor and page cache for the full listing.
///
/// Each page is fetched at most once for the lifetime of the cache. There is
/// no known last page: `next` is unbounded and a short or empty page is just
/// rendered as such.
pub struct Paginator {
    api: Arc<dyn DirectoryApi>,
    page_size: u32,
    page: AtomicU32,
    cache: RwLock<PageCache>,
}

impl Paginator {
    pub fn new(api: Arc<dyn DirectoryApi>, page_size: u32) -> Self {
        Self {
            api,
            page_size: page_size.max(1),
            page: AtomicU32::new(FIRST_PAGE),
            cache: RwLock::new(PageCache::new()),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn current_page(&self) -> u32 {
        self.page.load(Ordering::SeqCst)
    }

    /// Advance one page. No upper bound is enforced.
    pub fn next(&self) -> u32 {
        self.step(|page| page.saturating_add(1))
    }

    /// Go back one page, never below page 1.
    pub fn prev(&self) -> u32 {
        self.step(|page| page.saturating_sub(1).max(FIRST_PAGE))
    }

    fn step(&self, f: impl Fn(u32) -> u32) -> u32 {
        let previous = self
            .page
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |page| Some(f(page)))
            .unwrap_or_else(|page| page);
        f(previous)
    }

    /// Drop every cached page and return to page 1.
    pub async fn reset(&self) {
        let mut cache = self.cache.write().await;
        if !cache.is_empty() {
            debug!("Discarding {} cached pages", cache.len());
        }
        cache.clear();
        self.page.store(FIRST_PAGE, Ordering::SeqCst);
    }

    pub async fn cached_pages(&self) -> Vec<u32> {
        self.cache.read().await.pages().collect()
    }

    /// Rows of page `page`, from the cache when present, otherwise fetched,
    /// decoded and cached.
    pub async fn resolve_page(&self, page: u32) -> Result<Vec<University>> {
        let page = page.max(FIRST_PAGE);

        let epoch = {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(page) {
                debug!(
                    "Page {} served from cache (fetched at {})",
                    page, cached.fetched_at
                );
                return Ok(cached.rows.clone());
            }
            cache.epoch()
        };

        let body = self.api.page_csv(page, self.page_size).await?;
        let rows = decode_universities(&body)?;
        info!("Fetched page {} ({} rows)", page, rows.len());

        let mut cache = self.cache.write().await;
        if cache.epoch() != epoch {
            debug!("Cache was reset while page {} was in flight, not storing it", page);
            return Ok(rows);
        }
        Ok(cache.insert(page, rows).rows.clone())
    }
}
