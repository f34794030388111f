use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};
use unisearch_common::{QueryMode, University};

use super::stream::assemble_chunks;
use crate::api::{DirectoryApi, ExportTarget};
use crate::error::ExportError;
use crate::module::csv::encode_universities;

/// How the CSV document was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStrategy {
    /// Built from the rows on screen
    InMemory,
    /// Streamed from a server-rendered resource
    Streamed(ExportTarget),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub bytes: usize,
    pub strategy: ExportStrategy,
}

/// File name for an export of `mode` shown at `page`.
pub fn export_file_name(mode: &QueryMode, page: u32) -> Option<String> {
    match mode {
        QueryMode::All => Some(format!("universities_page_{}.csv", page)),
        QueryMode::Search(label) | QueryMode::Country(label) => {
            Some(format!("{}_results.csv", sanitize_file_stem(label)))
        }
        QueryMode::Inactive => None,
    }
}

fn sanitize_file_stem(label: &str) -> String {
    label
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Saves the current view as a CSV file.
///
/// At most one export runs at a time; `Idle → Downloading → Idle` whether the
/// export succeeds or fails. An in-flight transfer is never cancelled.
pub struct Exporter {
    api: Arc<dyn DirectoryApi>,
    export_dir: PathBuf,
    downloading: AtomicBool,
}

/// Clears the downloading flag on every exit path.
struct DownloadingGuard<'a>(&'a AtomicBool);

impl Drop for DownloadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Exporter {
    pub fn new(api: Arc<dyn DirectoryApi>, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            api,
            export_dir: export_dir.into(),
            downloading: AtomicBool::new(false),
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    pub fn is_downloading(&self) -> bool {
        self.downloading.load(Ordering::SeqCst)
    }

    /// Export what `mode` currently shows.
    ///
    /// `rows` and `page` are only read in All mode; search and country
    /// exports stream the server's own CSV.
    pub async fn export_current(
        &self,
        mode: &QueryMode,
        rows: &[University],
        page: u32,
    ) -> Result<ExportOutcome, ExportError> {
        let file_name = export_file_name(mode, page).ok_or(ExportError::NoSearchTerm)?;

        if self
            .downloading
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ExportError::InProgress);
        }
        let _guard = DownloadingGuard(&self.downloading);

        let (body, strategy) = match mode {
            QueryMode::All => (encode_universities(rows)?, ExportStrategy::InMemory),
            QueryMode::Search(term) => {
                self.stream(ExportTarget::Search(term.clone())).await?
            }
            QueryMode::Country(country) => {
                self.stream(ExportTarget::Country(country.clone())).await?
            }
            QueryMode::Inactive => return Err(ExportError::NoSearchTerm),
        };

        let path = self.save(&file_name, &body).await?;
        info!("Exported {} bytes to {}", body.len(), path.display());

        Ok(ExportOutcome {
            path,
            bytes: body.len(),
            strategy,
        })
    }

    async fn stream(&self, target: ExportTarget) -> Result<(Vec<u8>, ExportStrategy), ExportError> {
        info!("Streaming export from {}", target.path_and_query());

        let stream = self.api.open_export(&target).await.inspect_err(|e| {
            warn!("Export request failed: {}", e);
        })?;
        let body = assemble_chunks(stream).await.inspect_err(|e| {
            warn!("Export transfer failed: {}", e);
        })?;

        Ok((body, ExportStrategy::Streamed(target)))
    }

    async fn save(&self, file_name: &str, body: &[u8]) -> Result<PathBuf, ExportError> {
        let io_error = |path: &Path, source| ExportError::Io {
            path: path.display().to_string(),
            source,
        };

        tokio::fs::create_dir_all(&self.export_dir)
            .await
            .map_err(|e| io_error(&self.export_dir, e))?;

        let path = self.export_dir.join(file_name);
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| io_error(&path, e))?;

        Ok(path)
    }
}
