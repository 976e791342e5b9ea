//! pdfbot Web - Web server that merges a course unit's topic PDFs.

mod helpers;
mod routes;
mod state;

use anyhow::{Context, Result};
use axum::{Router, extract::DefaultBodyLimit, routing::post};
use clap::Parser;
use pdfbot_core::AppConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use state::AppState;

/// Resolve the static files directory.
///
/// Priority:
/// 1. Explicit path if provided
/// 2. ./public if it exists
/// 3. Crate's built-in public directory
fn resolve_static_dir(explicit_path: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit_path {
        return path;
    }

    let local_public = PathBuf::from("public");
    if local_public.is_dir() {
        return local_public;
    }

    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/public"))
}

/// Build the router: `POST /` merges, every other request is a static file.
fn app(state: Arc<AppState>, static_dir: PathBuf) -> Router {
    let static_files = ServeDir::new(static_dir);

    Router::new()
        // GET / falls through to index.html
        .route(
            "/",
            post(routes::merge_unit).fallback_service(static_files.clone()),
        )
        .fallback_service(static_files)
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Parser, Debug)]
#[command(name = "pdfbot-web")]
#[command(author, version, about = "pdfbot Web Server", long_about = None)]
struct Args {
    /// Host to bind to (default: 0.0.0.0)
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Port to bind to (default: 3000)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Topics API base URL
    #[arg(long, env = "PDFBOT_API_BASE")]
    api_base: Option<String>,

    /// Prefix for topic PDF paths
    #[arg(long, env = "PDFBOT_PDF_BASE")]
    pdf_base: Option<String>,

    /// Upstream request timeout in seconds
    #[arg(long, env = "PDFBOT_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Maximum concurrent PDF downloads per request
    #[arg(long, env = "PDFBOT_FETCH_CONCURRENCY")]
    fetch_concurrency: Option<usize>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Static files directory (defaults to ./public or crate's public dir)
    #[arg(long, env = "STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    /// Apply command-line and environment overrides on top of file config
    fn apply(self, config: &mut AppConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(api_base) = self.api_base {
            config.api.api_base = api_base;
        }
        if let Some(pdf_base) = self.pdf_base {
            config.api.pdf_base = pdf_base;
        }
        if let Some(timeout) = self.timeout_secs {
            config.api.request_timeout_secs = timeout;
        }
        if let Some(concurrency) = self.fetch_concurrency {
            config.api.fetch_concurrency = concurrency;
        }
        if self.static_dir.is_some() {
            config.server.static_dir = self.static_dir;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{default_level},hyper=warn,reqwest=warn")));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path).context("Failed to load config file")?
    } else {
        AppConfig::load()
    };
    args.apply(&mut config);

    let state = Arc::new(
        AppState::new(config.api.clone()).context("Failed to initialize application state")?,
    );
    info!(
        "Upstream: {} (documents from {}, {} concurrent)",
        config.api.api_base, config.api.pdf_base, config.api.fetch_concurrency
    );

    let static_dir = resolve_static_dir(config.server.static_dir.clone());
    info!("Serving static files from {}", static_dir.display());

    let app = app(state, static_dir);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid listen address")?;
    info!("Server is running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[test]
    fn test_args_override_config() {
        let args = Args::parse_from([
            "pdfbot-web",
            "--port",
            "8081",
            "--fetch-concurrency",
            "4",
            "--pdf-base",
            "http://files.local/",
        ]);
        let mut config = AppConfig::default();
        args.apply(&mut config);

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.api.fetch_concurrency, 4);
        assert_eq!(config.api.pdf_url("x.pdf"), "http://files.local/x.pdf");
        assert_eq!(config.api.api_base, pdfbot_core::DEFAULT_API_BASE);
    }

    #[tokio::test]
    async fn test_static_index_served_on_get() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>pdfbot</h1>").unwrap();

        let state = Arc::new(AppState::new(pdfbot_core::ApiConfig::default()).unwrap());
        let response = app(state, dir.path().to_path_buf())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"<h1>pdfbot</h1>");
    }
}
