//! In-memory directory used by unit tests.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use unisearch_common::{
    CountryRequest, CountryResponse, SuggestRequest, SuggestResponse, SuggestionEntry, University,
};

use super::{ChunkStream, DirectoryApi, ExportTarget};
use crate::error::{DirectoryError, Result};

#[derive(Default)]
pub struct MockDirectory {
    pages: HashMap<u32, String>,
    page_delays: HashMap<u32, Duration>,
    suggestions: HashMap<String, Vec<SuggestionEntry>>,
    countries: HashMap<String, Vec<University>>,
    export_chunks: Vec<Vec<u8>>,
    fail: bool,
    page_requests: Mutex<Vec<(u32, u32)>>,
    suggest_requests: Mutex<Vec<SuggestRequest>>,
    country_requests: Mutex<Vec<CountryRequest>>,
    export_requests: Mutex<Vec<ExportTarget>>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: u32, csv: &str) -> Self {
        self.pages.insert(page, csv.to_string());
        self
    }

    pub fn with_page_delay(mut self, page: u32, delay: Duration) -> Self {
        self.page_delays.insert(page, delay);
        self
    }

    pub fn with_suggestions(mut self, q: &str, rows: Vec<SuggestionEntry>) -> Self {
        self.suggestions.insert(q.to_string(), rows);
        self
    }

    pub fn with_country(mut self, country: &str, rows: Vec<University>) -> Self {
        self.countries.insert(country.to_string(), rows);
        self
    }

    pub fn with_export_chunks(mut self, chunks: Vec<Vec<u8>>) -> Self {
        self.export_chunks = chunks;
        self
    }

    /// Every call answers HTTP 500.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn page_requests(&self) -> Vec<(u32, u32)> {
        self.page_requests.lock().unwrap().clone()
    }

    pub fn suggest_requests(&self) -> Vec<SuggestRequest> {
        self.suggest_requests.lock().unwrap().clone()
    }

    pub fn country_requests(&self) -> Vec<CountryRequest> {
        self.country_requests.lock().unwrap().clone()
    }

    pub fn export_requests(&self) -> Vec<ExportTarget> {
        self.export_requests.lock().unwrap().clone()
    }

    fn check(&self, url: &str) -> Result<()> {
        if self.fail {
            return Err(DirectoryError::Status {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                url: url.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DirectoryApi for MockDirectory {
    async fn suggest(&self, request: &SuggestRequest) -> Result<SuggestResponse> {
        self.suggest_requests.lock().unwrap().push(request.clone());
        self.check("/search/suggest")?;
        Ok(SuggestResponse {
            suggestions: self.suggestions.get(&request.q).cloned(),
        })
    }

    async fn universities_by_country(&self, request: &CountryRequest) -> Result<CountryResponse> {
        self.country_requests.lock().unwrap().push(request.clone());
        self.check("/crawl/universities")?;
        let universities = request
            .countries
            .iter()
            .filter_map(|c| self.countries.get(c))
            .flatten()
            .cloned()
            .collect();
        Ok(CountryResponse {
            universities: Some(universities),
        })
    }

    async fn page_csv(&self, page: u32, page_size: u32) -> Result<String> {
        self.page_requests.lock().unwrap().push((page, page_size));
        if let Some(delay) = self.page_delays.get(&page) {
            tokio::time::sleep(*delay).await;
        }
        self.check("/export/all_universities_pagination")?;
        Ok(self.pages.get(&page).cloned().unwrap_or_default())
    }

    async fn open_export(&self, target: &ExportTarget) -> Result<ChunkStream> {
        self.export_requests.lock().unwrap().push(target.clone());
        self.check(&target.path_and_query())?;
        let chunks: Vec<Result<Bytes>> = self
            .export_chunks
            .iter()
            .map(|chunk| Ok(Bytes::from(chunk.clone())))
            .collect();
        Ok(futures::stream::iter(chunks).boxed())
    }
}
