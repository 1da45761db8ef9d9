//! Inkboard service entrypoint
//!
//! Loads configuration, initializes the OCR engine once and serves the
//! recognition API. The interactive whiteboard session lives in the
//! library and is embedded by drawing-surface frontends.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use inkboard::config::{self, AppConfig, CanvasProfile};
use inkboard::ocr::{EngineProfile, TesseractEngine};
use inkboard::pipeline::RecognitionPipeline;
use inkboard::server::{router, AppState};

/// Inkboard - handwriting recognition service
#[derive(Parser, Debug)]
#[command(name = "inkboard")]
#[command(about = "Handwriting whiteboard recognition service")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured bind address
    #[arg(long)]
    host: Option<String>,

    /// Override the configured port
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Inkboard starting...");

    let mut config = load_or_create_config(args.config.as_deref());
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    // The engine is loaded once and shared read-only across requests;
    // failing to initialize it is the only fatal error.
    let engine = TesseractEngine::new(EngineProfile::from(&config.recognition))
        .context("OCR engine initialization failed")?;
    info!("OCR engine ready");

    let pipeline = Arc::new(RecognitionPipeline::new(Arc::new(engine), &config));
    let state = AppState::new(pipeline, CanvasProfile::from(&config.service));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on http://{addr}");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Load configuration from the given path, the default location, or
/// fall back to defaults.
fn load_or_create_config(path: Option<&Path>) -> AppConfig {
    if let Some(path) = path {
        match config::load_config(path) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", path);
                return config;
            }
            Err(e) => {
                warn!("Could not load {:?}: {e}; using defaults", path);
                return AppConfig::default();
            }
        }
    }

    if let Ok(config_dir) = config::config_dir() {
        let config_path = config_dir.join("config.toml");
        if config_path.exists() {
            if let Ok(config) = config::load_config(&config_path) {
                info!("Loaded configuration from {:?}", config_path);
                return config;
            }
        }
    }

    info!("Using default configuration");
    AppConfig::default()
}
