use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use unisearch_client::api::HttpDirectoryClient;
use unisearch_client::command::{Command, HELP};
use unisearch_client::config::{self, ClientConfig};
use unisearch_client::logging;
use unisearch_client::module::{FetchOutcome, ResultView};
use unisearch_client::render;
use unisearch_common::QueryMode;

const LOADING_HINT_AFTER: Duration = Duration::from_millis(150);

/// Search the university directory from the terminal
#[derive(Debug, Parser)]
#[command(name = "unisearch", version)]
struct Args {
    /// TOML configuration file; defaults apply when it does not exist
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the directory service URL from the configuration
    #[arg(long)]
    base_url: Option<String>,

    /// Initial location query, e.g. "?search=MIT" or "?country=Japan"
    query: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut client_config = ClientConfig::load_or_default(&args.config)?;
    if let Some(base_url) = args.base_url {
        client_config.base_url = base_url.trim_end_matches('/').to_string();
    }
    let client_config = config::init_config(client_config);

    let _logging_guard = logging::init_logging(
        &client_config.log_dir,
        "unisearch",
        &client_config.log_level,
    )
    .context("Failed to initialize logging")?;

    tracing::info!("unisearch starting against {}", client_config.base_url);

    let api = HttpDirectoryClient::from_config(client_config)
        .context("Failed to build directory client")?;
    let view = ResultView::new(
        Arc::new(api),
        client_config.page_size,
        &client_config.export_dir,
    );

    if let Some(query) = args.query {
        let outcome = load(&view, view.navigate(&query)).await;
        show(&view, outcome).await;
    }

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Quit => break,
            Command::Help => println!("{}", HELP),
            Command::Invalid(message) => {
                if !message.is_empty() {
                    println!("{}", message);
                }
            }
            Command::Open(query) => {
                let outcome = load(&view, view.navigate(&query)).await;
                show(&view, outcome).await;
            }
            Command::Search(term) => {
                let outcome = load(&view, view.navigate(&QueryMode::Search(term).to_query())).await;
                show(&view, outcome).await;
            }
            Command::Country(country) => {
                let outcome = load(&view, view.navigate(&QueryMode::Country(country).to_query())).await;
                show(&view, outcome).await;
            }
            Command::All => {
                let outcome = load(&view, view.navigate(&QueryMode::All.to_query())).await;
                show(&view, outcome).await;
            }
            Command::Next => {
                let outcome = load(&view, view.next_page()).await;
                show(&view, outcome).await;
            }
            Command::Prev => {
                let outcome = load(&view, view.prev_page()).await;
                show(&view, outcome).await;
            }
            Command::Export => export(&view).await,
            Command::Suggest(prefix) => {
                for name in view.suggest_names(&prefix).await {
                    println!("  {}", name);
                }
            }
            Command::Detail(row) => match view.rows().await.get(row - 1) {
                Some(uni) => {
                    println!("{}", uni.name);
                    println!("  detail:  {}", uni.detail_link());
                    println!("  country: {}", uni.country_link());
                }
                None => println!("No row {}", row),
            },
        }
    }

    tracing::info!("unisearch exiting");
    Ok(())
}

/// Await a fetch, printing a loading line if it is still running after a
/// short delay.
async fn load(view: &ResultView, fetch: impl Future<Output = FetchOutcome>) -> FetchOutcome {
    tokio::pin!(fetch);
    tokio::select! {
        outcome = &mut fetch => return outcome,
        _ = tokio::time::sleep(LOADING_HINT_AFTER) => {}
    }

    if view.is_loading() {
        println!("Loading...");
    }
    fetch.await
}

async fn show(view: &ResultView, outcome: FetchOutcome) {
    if outcome == FetchOutcome::Idle && view.label().await.is_none() {
        return;
    }

    let mode = view.mode().await;
    let page = mode.is_all().then(|| view.current_page());
    let label = view.label().await;
    println!(
        "{}",
        render::result_screen(label.as_deref(), &view.rows().await, page)
    );
}

async fn export(view: &ResultView) {
    if !view.export_visible().await {
        println!("Export is not offered for country listings");
        return;
    }

    println!("Downloading...");
    match view.export_current().await {
        Ok(outcome) => println!("Saved {} ({} bytes)", outcome.path.display(), outcome.bytes),
        Err(e) => {
            tracing::error!("Export failed: {}", e);
            println!("Alert: {}", e);
        }
    }
}
