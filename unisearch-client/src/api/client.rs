//! reqwest-backed directory client

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use unisearch_common::{CountryRequest, CountryResponse, SuggestRequest, SuggestResponse};

use super::{ChunkStream, DirectoryApi, ExportTarget};
use crate::config::ClientConfig;
use crate::error::{DirectoryError, Result};

const USER_AGENT: &str = concat!("unisearch/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT_SECONDS: u64 = 10;

/// HTTP client for the university directory service.
///
/// JSON and page requests use the configured timeout. Streamed exports are
/// only bounded by the connect timeout, since their bodies may be large.
#[derive(Clone)]
pub struct HttpDirectoryClient {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl HttpDirectoryClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECONDS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| DirectoryError::Transport {
                url: base_url.clone(),
                source,
            })?;

        Ok(Self {
            client,
            base_url,
            request_timeout,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(
            &config.base_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .timeout(self.request_timeout)
            .json(body)
            .send()
            .await
            .map_err(|source| DirectoryError::Transport {
                url: url.clone(),
                source,
            })?;
        let response = check_status(response, &url)?;

        let bytes = response
            .bytes()
            .await
            .map_err(|source| DirectoryError::Transport {
                url: url.clone(),
                source,
            })?;

        serde_json::from_slice(&bytes).map_err(|source| DirectoryError::Json { url, source })
    }

    async fn get(&self, url: &str, timeout: Option<Duration>) -> Result<Response> {
        tracing::debug!("GET {}", url);

        let mut request = self.client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|source| DirectoryError::Transport {
                url: url.to_string(),
                source,
            })?;
        check_status(response, url)
    }
}

fn check_status(response: Response, url: &str) -> Result<Response> {
    let status = response.status();
    if !status.is_success() {
        return Err(DirectoryError::Status {
            status,
            url: url.to_string(),
        });
    }
    Ok(response)
}

#[async_trait]
impl DirectoryApi for HttpDirectoryClient {
    async fn suggest(&self, request: &SuggestRequest) -> Result<SuggestResponse> {
        self.post_json("/search/suggest", request).await
    }

    async fn universities_by_country(&self, request: &CountryRequest) -> Result<CountryResponse> {
        self.post_json("/crawl/universities", request).await
    }

    async fn page_csv(&self, page: u32, page_size: u32) -> Result<String> {
        let url = self.url(&format!(
            "/export/all_universities_pagination?page={}&page_size={}",
            page, page_size
        ));
        let response = self.get(&url, Some(self.request_timeout)).await?;

        response
            .text()
            .await
            .map_err(|source| DirectoryError::Transport { url, source })
    }

    async fn open_export(&self, target: &ExportTarget) -> Result<ChunkStream> {
        let url = self.url(&target.path_and_query());
        let response = self.get(&url, None).await?;

        let stream = response.bytes_stream().map(move |chunk| {
            chunk.map_err(|e| DirectoryError::Stream {
                url: url.clone(),
                reason: e.to_string(),
            })
        });
        Ok(stream.boxed())
    }
}
