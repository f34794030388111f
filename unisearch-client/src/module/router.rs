use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, error, info};
use unisearch_common::{CountryRequest, QueryMode, SuggestRequest, University};

use super::export::{ExportOutcome, Exporter};
use super::pages::{FIRST_PAGE, Paginator};
use crate::api::DirectoryApi;
use crate::error::{ExportError, Result};

/// What became of one fetch triggered by navigation or paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Rows were fetched (or read from the page cache) and are now displayed
    Applied(usize),
    /// A newer navigation superseded this one; its result was dropped
    Stale,
    /// The fetch failed; the displayed set was emptied
    Failed,
    /// No mode active, nothing fetched
    Idle,
}

#[derive(Debug)]
struct ViewState {
    mode: QueryMode,
    rows: Vec<University>,
    /// Listing page the displayed rows came from
    page: u32,
}

/// Result table state: routes the location query to one acquisition mode and
/// holds the single live result set.
///
/// Every navigation or page change takes a new generation number. A fetch
/// that completes after a newer one was issued is discarded, so the last
/// issued request always decides what is displayed.
pub struct ResultView {
    api: Arc<dyn DirectoryApi>,
    paginator: Paginator,
    exporter: Exporter,
    state: RwLock<ViewState>,
    generation: AtomicU64,
    loading: AtomicBool,
}

/// Lowers the loading flag when its fetch ends, unless a newer fetch owns it.
struct LoadingGuard<'a> {
    view: &'a ResultView,
    token: u64,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.view.is_current(self.token) {
            self.view.loading.store(false, Ordering::SeqCst);
        }
    }
}

impl ResultView {
    pub fn new(api: Arc<dyn DirectoryApi>, page_size: u32, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            paginator: Paginator::new(api.clone(), page_size),
            exporter: Exporter::new(api.clone(), export_dir),
            api,
            state: RwLock::new(ViewState {
                mode: QueryMode::Inactive,
                rows: Vec::new(),
                page: FIRST_PAGE,
            }),
            generation: AtomicU64::new(0),
            loading: AtomicBool::new(false),
        }
    }

    pub async fn mode(&self) -> QueryMode {
        self.state.read().await.mode.clone()
    }

    /// Label shown next to "Result :"
    pub async fn label(&self) -> Option<String> {
        self.state.read().await.mode.label().map(str::to_string)
    }

    pub async fn rows(&self) -> Vec<University> {
        self.state.read().await.rows.clone()
    }

    pub async fn export_visible(&self) -> bool {
        self.state.read().await.mode.export_visible()
    }

    pub fn current_page(&self) -> u32 {
        self.paginator.current_page()
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn is_downloading(&self) -> bool {
        self.exporter.is_downloading()
    }

    fn is_current(&self, token: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == token
    }

    /// Apply a new location query string, e.g. `?search=MIT`.
    pub async fn navigate(&self, query: &str) -> FetchOutcome {
        let mode = QueryMode::from_query(query);
        info!("Navigating to {}", mode);

        let token = {
            let mut state = self.state.write().await;
            if state.mode.is_all() && !mode.is_all() {
                self.paginator.reset().await;
            }
            if state.mode != mode {
                state.rows.clear();
                state.page = self.paginator.current_page();
            }
            state.mode = mode.clone();
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        self.run(token, mode).await
    }

    /// Re-run the fetch for the current mode and page.
    pub async fn refresh(&self) -> FetchOutcome {
        let (token, mode) = {
            let state = self.state.read().await;
            (self.generation.fetch_add(1, Ordering::SeqCst) + 1, state.mode.clone())
        };
        self.run(token, mode).await
    }

    /// Next page of the full listing. Outside All mode this does nothing.
    pub async fn next_page(&self) -> FetchOutcome {
        if !self.state.read().await.mode.is_all() {
            return FetchOutcome::Idle;
        }
        self.paginator.next();
        self.refresh().await
    }

    /// Previous page of the full listing, never below page 1.
    pub async fn prev_page(&self) -> FetchOutcome {
        if !self.state.read().await.mode.is_all() {
            return FetchOutcome::Idle;
        }
        self.paginator.prev();
        self.refresh().await
    }

    async fn run(&self, token: u64, mode: QueryMode) -> FetchOutcome {
        if mode == QueryMode::Inactive {
            // an in-flight fetch superseded by this token can no longer lower the flag
            if self.is_current(token) {
                self.loading.store(false, Ordering::SeqCst);
            }
            return FetchOutcome::Idle;
        }

        self.loading.store(true, Ordering::SeqCst);
        let _guard = LoadingGuard { view: self, token };

        let page = self.paginator.current_page();
        let result = self.fetch(&mode, page).await;

        let mut state = self.state.write().await;
        if !self.is_current(token) {
            debug!("Dropping stale result for {}", mode);
            return FetchOutcome::Stale;
        }

        match result {
            Ok(rows) => {
                let count = rows.len();
                state.rows = rows;
                state.page = page;
                FetchOutcome::Applied(count)
            }
            Err(e) => {
                error!("Fetch for {} failed: {}", mode, e);
                state.rows.clear();
                state.page = page;
                FetchOutcome::Failed
            }
        }
    }

    async fn fetch(&self, mode: &QueryMode, page: u32) -> Result<Vec<University>> {
        match mode {
            QueryMode::Country(country) => {
                let request = CountryRequest {
                    countries: vec![country.clone()],
                };
                let response = self.api.universities_by_country(&request).await?;
                Ok(response.into_universities())
            }
            QueryMode::All => self.paginator.resolve_page(page).await,
            QueryMode::Search(term) => {
                let response = self.api.suggest(&SuggestRequest::query(term.as_str())).await?;
                Ok(response.into_universities())
            }
            QueryMode::Inactive => Ok(Vec::new()),
        }
    }

    /// Type-ahead candidates for `prefix`. Failures yield no candidates.
    pub async fn suggest_names(&self, prefix: &str) -> Vec<String> {
        if prefix.trim().is_empty() {
            return Vec::new();
        }

        match self.api.suggest(&SuggestRequest::autocomplete(prefix)).await {
            Ok(response) => response
                .suggestions
                .unwrap_or_default()
                .iter()
                .map(|entry| entry.name().to_string())
                .collect(),
            Err(e) => {
                error!("Search error: {}", e);
                Vec::new()
            }
        }
    }

    /// Save the current view as CSV, choosing the strategy from the same mode
    /// that drove the fetch.
    pub async fn export_current(&self) -> std::result::Result<ExportOutcome, ExportError> {
        let (mode, rows, page) = {
            let state = self.state.read().await;
            (state.mode.clone(), state.rows.clone(), state.page)
        };

        self.exporter.export_current(&mode, &rows, page).await
    }
}
