//! Main application entry point for Clipshelf.

use bridge::TransportConfig;
use clap::Parser;
use serde_json::Value;
use std::path::PathBuf;
use tracing_appender::rolling;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

mod config;

#[derive(Parser)]
#[command(
    name = "clipshelf",
    author,
    version,
    about = "Clipshelf video library manager"
)]
struct Cli {
    /// Override log level (e.g. info, debug)
    #[arg(long)]
    log_level: Option<String>,
    /// Override the backend WebSocket URL
    #[arg(long)]
    backend_url: Option<String>,
    /// Override the library grid page size
    #[arg(long)]
    page_size: Option<usize>,
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let overrides = config::AppConfigOverrides {
        log_level: cli.log_level.clone(),
        backend_url: cli.backend_url.clone(),
        page_size: cli.page_size,
    };
    let cfg = config::AppConfig::load_from(cli.config.clone()).apply_overrides(&overrides);

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".clipshelf");
    std::fs::create_dir_all(&base_dir)?;
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| base_dir.join("config.toml"));

    let file_appender = rolling::daily(&base_dir, "clipshelf.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(cfg.log_level.clone()))
        .with_writer(std::io::stdout.and(file_writer))
        .init();

    println!("🚀 Starting Clipshelf - Video Library Manager");
    println!("📁 Data directory: {:?}", base_dir);

    // Process-wide context objects, constructed exactly once and passed by
    // reference to every consumer.
    let notifications = bridge::NotificationRegistry::new();
    notifications.register(|payload: &Value| {
        tracing::info!(%payload, "backend notification");
    });
    let (notify_tx, notify_rx) = tokio::sync::mpsc::unbounded_channel();
    notifications.register(move |payload: &Value| {
        let _ = notify_tx.send(payload.clone());
    });

    let shortcuts = ui::Shortcuts::standard()?;

    // The socket pumps live on this runtime; it must outlive the UI loop.
    let runtime = tokio::runtime::Runtime::new()?;
    println!("🔌 Connecting to backend at {}", cfg.backend_url);
    let bridge = runtime.block_on(bridge::connect(
        TransportConfig::Socket {
            url: cfg.backend_url.clone(),
        },
        notifications.clone(),
    ))?;
    println!("✅ Connected. Loading interface...");

    ui::run(ui::UiFlags {
        bridge,
        shortcuts,
        notifications: Some(notify_rx),
        config_path,
    })?;

    Ok(())
}
