//! CodeCount CLI - lines-of-code statistics for repository pages
//!
//! The `codecount` command resolves a repository page URL the same way the
//! page overlay does: a byte-based estimate first, then precise counts.
//!
//! ## Commands
//!
//! - `show`: Resolve one page URL
//! - `follow`: Treat each stdin line as a navigation to a new page URL
//! - `estimate`: Estimate lines offline from a languages API response body

mod presentation;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use codecount_core::{
    decode_language_bytes, estimate, total_lines, PageFilter, Presenter, ResolutionOutcome,
    Resolver, METRICS, NO_DATA_MESSAGE,
};
use codecount_http::{HttpStatsSource, SourceConfig};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::task::JoinSet;
use tracing::{debug, info, warn, Level};

use crate::presentation::{JsonPresenter, TextPresenter};

#[derive(Parser)]
#[command(name = "codecount")]
#[command(author = "CodeCount Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Lines-of-code statistics for repository pages", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Output format for statistics
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Base URL of the languages API
    #[arg(long, global = true)]
    github_api: Option<String>,

    /// Base URL of the LOC API
    #[arg(long, global = true)]
    loc_api: Option<String>,

    /// Repository host to match page URLs against
    #[arg(long, global = true, default_value = codecount_core::domain::DEFAULT_HOST)]
    host: String,

    /// Sub-page to skip (repeatable, replaces the default set)
    #[arg(long = "exclude", global = true)]
    exclude: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve statistics for one repository page
    Show {
        /// Page URL, e.g. https://github.com/rust-lang/cargo
        url: String,
    },

    /// Read page URLs from stdin, one navigation per line
    Follow,

    /// Estimate lines from a languages API body (file or stdin)
    Estimate {
        /// JSON file with a language → bytes object (default: stdin)
        file: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    codecount_core::init_tracing(cli.json, level);

    let presenter = build_presenter(cli.format);

    let result = match &cli.command {
        Commands::Show { url } => cmd_show(&cli, presenter, url).await,
        Commands::Follow => cmd_follow(&cli, presenter).await,
        Commands::Estimate { file } => cmd_estimate(presenter, file.as_deref()).await,
    };

    METRICS.flush();
    result
}

fn build_presenter(format: OutputFormat) -> Arc<dyn Presenter> {
    match format {
        OutputFormat::Text => Arc::new(TextPresenter::new(std::io::stdout())),
        OutputFormat::Json => Arc::new(JsonPresenter::new(std::io::stdout())),
    }
}

fn build_resolver(cli: &Cli, presenter: Arc<dyn Presenter>) -> Result<Resolver> {
    let mut config = SourceConfig::from_env();
    if let Some(url) = &cli.github_api {
        config = config.with_languages_api(url);
    }
    if let Some(url) = &cli.loc_api {
        config = config.with_loc_api(url);
    }
    debug!(
        languages_api = %config.languages_api,
        loc_api = %config.loc_api,
        authenticated = config.github_token.is_some(),
        "source configuration"
    );
    let source = HttpStatsSource::new(config).context("Failed to set up HTTP client")?;

    let mut filter = PageFilter::default();
    if cli.host != filter.host() {
        filter = PageFilter::new(&cli.host, filter.excluded().to_vec());
    }
    if !cli.exclude.is_empty() {
        filter = filter.with_excluded(cli.exclude.clone());
    }

    Ok(Resolver::new(Arc::new(source), presenter, filter))
}

fn report(url: &str, outcome: &ResolutionOutcome) {
    match outcome {
        ResolutionOutcome::Skipped(reason) => info!(url, reason = %reason, "page skipped"),
        ResolutionOutcome::Settled { state, error } => match error {
            Some(e) if e.fetch_error().is_some() => {
                warn!(url, state = %state, error = %e, "resolution settled with error")
            }
            _ => info!(url, state = %state, "resolution settled"),
        },
        ResolutionOutcome::Superseded => debug!(url, "resolution superseded"),
        ResolutionOutcome::Rejected(e) => warn!(url, error = %e, "resolution rejected"),
    }
}

async fn cmd_show(cli: &Cli, presenter: Arc<dyn Presenter>, url: &str) -> Result<()> {
    let resolver = build_resolver(cli, presenter)?;
    let outcome = resolver.navigate(url).await;
    report(url, &outcome);
    Ok(())
}

async fn cmd_follow(cli: &Cli, presenter: Arc<dyn Presenter>) -> Result<()> {
    let resolver = build_resolver(cli, presenter)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tasks = JoinSet::new();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let url = line.trim().to_string();
        if url.is_empty() {
            continue;
        }
        let resolution = resolver.begin(&url);
        tasks.spawn(async move {
            let outcome = resolution.run().await;
            (url, outcome)
        });
        // Let the new resolution issue its first request before reading on.
        tokio::task::yield_now().await;
    }

    while let Some(joined) = tasks.join_next().await {
        let (url, outcome) = joined.context("Resolution task failed")?;
        report(&url, &outcome);
    }
    Ok(())
}

async fn cmd_estimate(presenter: Arc<dyn Presenter>, file: Option<&Path>) -> Result<()> {
    let body = match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut body = String::new();
            tokio::io::stdin()
                .read_to_string(&mut body)
                .await
                .context("Failed to read stdin")?;
            body
        }
    };

    let bytes = decode_language_bytes(&body).context("Invalid languages body")?;
    let ranked = estimate(&bytes);
    if ranked.is_empty() {
        presenter.render_error(NO_DATA_MESSAGE);
    } else {
        presenter.render_estimate(&ranked, total_lines(&ranked));
        presenter.mark_non_authoritative();
    }
    Ok(())
}
