//! Native entry point for the numerical-methods lab client.
//!
//! Loads configuration, wires up logging (stderr plus the in-app event log),
//! opens the persisted key/value store, builds the application state, and
//! hands control to eframe.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::info;
use nml_client::config::AppConfig;
use nml_client::gui::Gui;
use nml_client::log_capture::{LogBuffer, LogCollector};
use nml_client::state::NmlApp;
use nml_client::storage::Storage;
use std::path::PathBuf;
use std::sync::Arc;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "nml-client")]
#[command(about = "Interactive client for numerical-methods course labs", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "nml-client.toml")]
    config: PathBuf,

    /// Override the stored API base URL for this run
    #[arg(long)]
    api_url: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config).context("Failed to load configuration")?;
    config.validate().map_err(|e| anyhow!(e))?;

    let log_buffer = LogBuffer::new();
    init_logging(&config.application.log_level, log_buffer.clone())?;
    info!("Starting {} v{}", config.application.name, config.versions.client);

    let config = Arc::new(config);
    let storage = Storage::open_default(config.storage.dir.as_deref())
        .context("Failed to open the persisted store")?;

    let app = NmlApp::new(config.clone(), storage)?;
    if let Some(api_url) = cli.api_url.as_deref() {
        app.set_api_url(api_url);
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([800.0, 560.0]),
        ..Default::default()
    };

    eframe::run_native(
        &config.application.name,
        options,
        Box::new(move |cc| Ok(Box::new(Gui::new(cc, app, log_buffer)))),
    )
    .map_err(|e| anyhow!("GUI error: {e}"))
}

/// Installs a combined logger: env_logger formatting on stderr plus the
/// in-app collector feeding the event log panel.
fn init_logging(level: &str, buffer: LogBuffer) -> Result<()> {
    let filter = level.parse::<log::LevelFilter>().unwrap_or(log::LevelFilter::Info);

    let stderr_logger = env_logger::Builder::new().filter_level(filter).build();
    let collector = LogCollector::new(buffer);

    multi_log::MultiLogger::init(
        vec![Box::new(stderr_logger), Box::new(collector)],
        filter.to_level().unwrap_or(log::Level::Info),
    )
    .context("Failed to install the logger")
}
