//! pdfbot CLI - Merge a course unit's topic PDFs into one file.

use anyhow::{Context, Result};
use clap::Parser;
use pdfbot_core::{AppConfig, BundleRequest, PdfBundler, RequestLog, UnitId};
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "pdf-bundle")]
#[command(author, version, about = "Download and merge a unit's topic PDFs", long_about = None)]
struct Args {
    /// Unit identifier on the learning platform
    #[arg(short, long)]
    unit: String,

    /// Student access token (forwarded as a bearer token)
    #[arg(short, long, env = "PDFBOT_ACCESS_TOKEN", hide_env_values = true)]
    token: String,

    /// Output PDF file (default: unit-<id>.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Topics API base URL
    #[arg(long, env = "PDFBOT_API_BASE")]
    api_base: Option<String>,

    /// Maximum concurrent PDF downloads
    #[arg(long, env = "PDFBOT_FETCH_CONCURRENCY")]
    fetch_concurrency: Option<usize>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path).context("Failed to load config file")?
    } else {
        AppConfig::load()
    };

    if let Some(api_base) = args.api_base {
        config.api.api_base = api_base;
    }
    if let Some(concurrency) = args.fetch_concurrency {
        config.api.fetch_concurrency = concurrency;
    }

    let request = BundleRequest::new(Some(&args.token), UnitId::new(args.unit.as_str()))
        .context("Both --unit and --token must be non-empty")?;

    let bundler = PdfBundler::new(config.api).context("Failed to initialize bundler")?;
    info!(
        "Bundling unit {} from {} ({} concurrent downloads)",
        request.unit_id(),
        bundler.api_info().base_url,
        bundler.config().fetch_concurrency
    );

    let mut log = RequestLog::new();
    let result = bundler.bundle(&request, &mut log).await;

    // CLI output is intentional
    #[allow(clippy::print_stdout)]
    {
        for line in log.lines() {
            println!("{line}");
        }
    }

    let Some(merged) = result.context("Bundle failed")? else {
        anyhow::bail!("No PDFs found to merge");
    };

    let output_path = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("unit-{}.pdf", request.unit_id())));

    let pages = pdfbot_core::page_count(merged.bytes()).unwrap_or(0);
    let documents = merged.document_count();

    std::fs::write(&output_path, merged.into_bytes())
        .context(format!("Failed to write output: {}", output_path.display()))?;

    #[allow(clippy::print_stdout)]
    {
        println!(
            "Merged {documents} documents ({pages} pages) into {}",
            output_path.display()
        );
    }

    Ok(())
}
