///! Remote directory service
///!
///! `DirectoryApi` is the seam between the result pipeline and the network.
///! `HttpDirectoryClient` is the production implementation; tests swap in
///! in-memory ones.

pub mod client;
#[cfg(test)]
pub(crate) mod mock;

pub use client::HttpDirectoryClient;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use unisearch_common::{CountryRequest, CountryResponse, SuggestRequest, SuggestResponse};

use crate::error::Result;

/// Body of a streamed export, delivered chunk by chunk in arrival order.
pub type ChunkStream = BoxStream<'static, Result<Bytes>>;

/// Server-rendered CSV resources that can be streamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// `GET /export/search?q=<term>`
    Search(String),
    /// `GET /export/country?country=<name>`
    Country(String),
}

impl ExportTarget {
    pub fn path_and_query(&self) -> String {
        match self {
            ExportTarget::Search(term) => {
                format!("/export/search?q={}", urlencoding::encode(term))
            }
            ExportTarget::Country(country) => {
                format!("/export/country?country={}", urlencoding::encode(country))
            }
        }
    }
}

#[async_trait]
pub trait DirectoryApi: Send + Sync {
    /// `POST /search/suggest`
    async fn suggest(&self, request: &SuggestRequest) -> Result<SuggestResponse>;

    /// `POST /crawl/universities`
    async fn universities_by_country(&self, request: &CountryRequest) -> Result<CountryResponse>;

    /// `GET /export/all_universities_pagination`, returned as raw CSV text.
    async fn page_csv(&self, page: u32, page_size: u32) -> Result<String>;

    /// Open a streamed export without buffering its body.
    async fn open_export(&self, target: &ExportTarget) -> Result<ChunkStream>;
}
